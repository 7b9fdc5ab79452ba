use std::fmt;

use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;
use rgb::{RGB8, RGBA8};
use serde::Serialize;

use crate::options::FormatRevision;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColorDepth {
    Indexed,
    Grayscale,
    Rgba,
}

impl ColorDepth {
    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            8 => Some(Self::Indexed),
            16 => Some(Self::Grayscale),
            32 => Some(Self::Rgba),
            _ => None,
        }
    }

    pub fn bits(self) -> u16 {
        match self {
            Self::Indexed => 8,
            Self::Grayscale => 16,
            Self::Rgba => 32,
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        usize::from(self.bits() / 8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelRatio {
    pub width: u8,
    pub height: u8,
}

impl fmt::Display for PixelRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Grid {
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
}

/// A fully decoded sprite.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub(crate) file_size: u32,
    pub(crate) frame_count: u16,
    pub(crate) width: u16,
    pub(crate) height: u16,
    pub(crate) color_depth: ColorDepth,
    pub(crate) flags: u32,
    pub(crate) transparent_index: u8,
    pub(crate) num_colors: u16,
    pub(crate) pixel_ratio: PixelRatio,
    pub(crate) grid: Grid,
    pub(crate) color_profile: Option<ColorProfile>,
    pub(crate) palette: Option<Palette>,
    pub(crate) layers: Vec<Layer>,
    pub(crate) tags: Vec<Tag>,
    pub(crate) slices: Vec<Slice>,
    pub(crate) tilesets: Vec<Tileset>,
    pub(crate) frames: Vec<Frame>,
}

impl Document {
    /// File size as declared by the header.
    pub fn file_size(&self) -> u32 {
        self.file_size
    }

    pub fn frame_count(&self) -> u16 {
        self.frame_count
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn color_depth(&self) -> ColorDepth {
        self.color_depth
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }

    /// Palette entry treated as transparent. Only meaningful for indexed sprites.
    pub fn transparent_index(&self) -> u8 {
        self.transparent_index
    }

    /// Number of colors as stored; 0 means 256 for old sprites.
    pub fn num_colors(&self) -> u16 {
        self.num_colors
    }

    pub fn pixel_ratio(&self) -> PixelRatio {
        self.pixel_ratio
    }

    /// Pixel aspect ratio as `"W:H"`.
    pub fn pixel_aspect_ratio(&self) -> String {
        self.pixel_ratio.to_string()
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn color_profile(&self) -> Option<&ColorProfile> {
        self.color_profile.as_ref()
    }

    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn layer_by_name(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    pub fn tilesets(&self) -> &[Tileset] {
        &self.tilesets
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn cel(&self, frame: usize, layer: u16) -> Option<&Cel> {
        self.frame(frame)?.cel(layer)
    }

    /// Views an image cel's payload as RGBA pixels. `None` unless the sprite is 32 bpp.
    pub fn rgba_pixels<'c>(&self, cel: &'c Cel) -> Option<&'c [RGBA8]> {
        if self.color_depth != ColorDepth::Rgba || cel.tilemap.is_some() {
            return None;
        }
        bytemuck::try_cast_slice::<u8, RGBA8>(&cel.payload[..]).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    /// Bytes in this frame, header included.
    pub size: u32,
    /// Duration in milliseconds.
    pub duration: u16,
    pub chunk_count: u32,
    /// Cels in the order their chunks appear, not layer order.
    pub cels: Vec<Cel>,
}

impl Frame {
    pub fn cel(&self, layer: u16) -> Option<&Cel> {
        self.cels.iter().find(|cel| cel.layer_index == layer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CelKind {
    Raw,
    Linked,
    Compressed,
    Tilemap,
}

impl CelKind {
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Self::Raw),
            1 => Some(Self::Linked),
            2 => Some(Self::Compressed),
            3 => Some(Self::Tilemap),
            _ => None,
        }
    }

    pub fn code(self) -> u16 {
        match self {
            Self::Raw => 0,
            Self::Linked => 1,
            Self::Compressed => 2,
            Self::Tilemap => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CelLink {
    pub source_frame: u16,
    /// False when the source could not be found and the cel was left empty.
    pub resolved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TilemapInfo {
    pub bits_per_tile: u16,
    pub tile_id_mask: u32,
    pub x_flip_mask: u32,
    pub y_flip_mask: u32,
    pub rotation_mask: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tile {
    pub id: u32,
    pub x_flip: bool,
    pub y_flip: bool,
    pub rotate_90: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cel {
    pub layer_index: u16,
    pub x: i16,
    pub y: i16,
    pub opacity: u8,
    pub z_index: i16,
    pub kind: CelKind,
    pub width: u16,
    pub height: u16,
    /// Pixels for image cels, tile entries for tilemap cels. Linked cels share
    /// the buffer of their source.
    pub payload: Bytes,
    pub link: Option<CelLink>,
    pub tilemap: Option<TilemapInfo>,
}

impl Cel {
    /// Decodes the tile entries of a tilemap cel, row by row.
    pub fn tiles(&self) -> Option<Vec<Tile>> {
        let info = self.tilemap?;
        let raw: Vec<u32> = match info.bits_per_tile {
            8 => self.payload.iter().copied().map(u32::from).collect(),
            16 => self
                .payload
                .chunks_exact(2)
                .map(|entry| u32::from(LittleEndian::read_u16(entry)))
                .collect(),
            32 => self
                .payload
                .chunks_exact(4)
                .map(LittleEndian::read_u32)
                .collect(),
            _ => return None,
        };
        Some(
            raw.into_iter()
                .map(|value| Tile {
                    id: value & info.tile_id_mask,
                    x_flip: value & info.x_flip_mask != 0,
                    y_flip: value & info.y_flip_mask != 0,
                    rotate_90: value & info.rotation_mask != 0,
                })
                .collect(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LayerFlags(pub u16);

impl LayerFlags {
    pub const VISIBLE: u16 = 1;
    pub const EDITABLE: u16 = 2;
    pub const LOCK_MOVEMENT: u16 = 4;
    pub const BACKGROUND: u16 = 8;
    pub const PREFER_LINKED_CELS: u16 = 16;
    pub const COLLAPSED: u16 = 32;
    pub const REFERENCE: u16 = 64;

    pub fn contains(self, flag: u16) -> bool {
        self.0 & flag == flag
    }

    pub fn is_visible(self) -> bool {
        self.contains(Self::VISIBLE)
    }

    pub fn is_editable(self) -> bool {
        self.contains(Self::EDITABLE)
    }

    pub fn is_background(self) -> bool {
        self.contains(Self::BACKGROUND)
    }

    pub fn is_reference(self) -> bool {
        self.contains(Self::REFERENCE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LayerKind {
    Normal,
    Group,
    Tilemap,
}

impl LayerKind {
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Self::Normal),
            1 => Some(Self::Group),
            2 => Some(Self::Tilemap),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlendMode {
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
    Addition,
    Subtract,
    Divide,
    Unknown(u16),
}

impl From<u16> for BlendMode {
    fn from(code: u16) -> Self {
        match code {
            0 => Self::Normal,
            1 => Self::Multiply,
            2 => Self::Screen,
            3 => Self::Overlay,
            4 => Self::Darken,
            5 => Self::Lighten,
            6 => Self::ColorDodge,
            7 => Self::ColorBurn,
            8 => Self::HardLight,
            9 => Self::SoftLight,
            10 => Self::Difference,
            11 => Self::Exclusion,
            12 => Self::Hue,
            13 => Self::Saturation,
            14 => Self::Color,
            15 => Self::Luminosity,
            16 => Self::Addition,
            17 => Self::Subtract,
            18 => Self::Divide,
            other => Self::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layer {
    pub flags: LayerFlags,
    pub kind: LayerKind,
    /// Nesting depth below the nearest group, 0 at the top level.
    pub child_level: u16,
    pub blend_mode: BlendMode,
    pub opacity: u8,
    pub name: String,
    /// Present only for tilemap layers.
    pub tileset_index: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoopDirection {
    Forward,
    Reverse,
    PingPong,
    PingPongReverse,
}

impl LoopDirection {
    /// Maps the stored direction byte. The legacy layout only knows the first three.
    pub fn from_index(index: u8, revision: FormatRevision) -> Option<Self> {
        match (index, revision) {
            (0, _) => Some(Self::Forward),
            (1, _) => Some(Self::Reverse),
            (2, _) => Some(Self::PingPong),
            (3, FormatRevision::Current) => Some(Self::PingPongReverse),
            _ => None,
        }
    }
}

impl fmt::Display for LoopDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Forward => "Forward",
            Self::Reverse => "Reverse",
            Self::PingPong => "Ping-pong",
            Self::PingPongReverse => "Ping-pong Reverse",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub name: String,
    pub from: u16,
    pub to: u16,
    pub direction: LoopDirection,
    /// 0 repeats forever.
    pub repeat: u16,
    pub color: RGB8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaletteColor {
    pub color: RGBA8,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub size: u32,
    pub first_index: u32,
    pub last_index: u32,
    pub colors: Vec<PaletteColor>,
    /// The header's transparent index, kept for indexed sprites only.
    pub transparent_index: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExternalTileset {
    pub file_id: u32,
    pub tileset_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tileset {
    pub id: u32,
    pub tile_count: u32,
    pub tile_width: u16,
    pub tile_height: u16,
    pub base_index: i16,
    pub name: String,
    pub external: Option<ExternalTileset>,
    /// Tiles stacked vertically, `tile_width x (tile_height * tile_count)` pixels.
    pub atlas: Option<Bytes>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SliceRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pivot {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SliceKey {
    pub frame: u32,
    pub bounds: SliceRect,
    /// Center rectangle, relative to `bounds`.
    pub nine_patch: Option<SliceRect>,
    pub pivot: Option<Pivot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slice {
    pub name: String,
    pub flags: u32,
    pub keys: Vec<SliceKey>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColorProfileKind {
    None,
    Srgb,
    Icc,
}

impl ColorProfileKind {
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::Srgb),
            2 => Some(Self::Icc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorProfile {
    pub kind: ColorProfileKind,
    pub flags: u16,
    /// Only meaningful when bit 0 of `flags` is set.
    pub gamma: f64,
    pub icc: Option<Bytes>,
}

impl ColorProfile {
    pub fn has_fixed_gamma(&self) -> bool {
        self.flags & 1 != 0
    }

    pub fn is_srgb(&self) -> bool {
        self.kind == ColorProfileKind::Srgb && !self.has_fixed_gamma()
            || self.has_fixed_gamma() && (self.gamma - 2.2).abs() < 0.0001
    }
}
