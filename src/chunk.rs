use std::fmt;

use bytes::Bytes;
use parsing::{ByteCursor, ReadBytes};
use rgb::{RGB8, RGBA8};
use tracing::trace;

use crate::ase_file as wire;
use crate::document::{
    Cel, CelKind, CelLink, ColorDepth, ColorProfile, ColorProfileKind, ExternalTileset, Layer,
    LayerFlags, LayerKind, LoopDirection, Palette, PaletteColor, Pivot, Slice, SliceKey,
    SliceRect, Tag, TilemapInfo, Tileset,
};
use crate::error::{ErrorKind, Fault};
use crate::inflate::Decompressor;
use crate::options::{DecodeOptions, FormatRevision};

/// Name given to palette entries that carry none.
pub const UNNAMED_COLOR: &str = "none";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkType {
    OldPalette,
    OldPaletteSmall,
    Layer,
    Cel,
    CelExtra,
    ColorProfile,
    ExternalFiles,
    Mask,
    Path,
    Tags,
    Palette,
    UserData,
    Slice,
    Tileset,
    Unknown(u16),
}

impl From<u16> for ChunkType {
    fn from(code: u16) -> Self {
        match code {
            0x0004 => Self::OldPalette,
            0x0011 => Self::OldPaletteSmall,
            0x2004 => Self::Layer,
            0x2005 => Self::Cel,
            0x2006 => Self::CelExtra,
            0x2007 => Self::ColorProfile,
            0x2008 => Self::ExternalFiles,
            0x2016 => Self::Mask,
            0x2017 => Self::Path,
            0x2018 => Self::Tags,
            0x2019 => Self::Palette,
            0x2020 => Self::UserData,
            0x2022 => Self::Slice,
            0x2023 => Self::Tileset,
            other => Self::Unknown(other),
        }
    }
}

impl ChunkType {
    pub fn code(self) -> u16 {
        match self {
            Self::OldPalette => 0x0004,
            Self::OldPaletteSmall => 0x0011,
            Self::Layer => 0x2004,
            Self::Cel => 0x2005,
            Self::CelExtra => 0x2006,
            Self::ColorProfile => 0x2007,
            Self::ExternalFiles => 0x2008,
            Self::Mask => 0x2016,
            Self::Path => 0x2017,
            Self::Tags => 0x2018,
            Self::Palette => 0x2019,
            Self::UserData => 0x2020,
            Self::Slice => 0x2022,
            Self::Tileset => 0x2023,
            Self::Unknown(code) => code,
        }
    }

    /// Chunk types the format still writes but this decoder deliberately ignores.
    pub fn is_deprecated(self) -> bool {
        matches!(
            self,
            Self::OldPalette | Self::OldPaletteSmall | Self::Mask | Self::Path | Self::UserData
        )
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OldPalette => "Old palette",
            Self::OldPaletteSmall => "Old palette (small)",
            Self::Layer => "Layer",
            Self::Cel => "Cel",
            Self::CelExtra => "Cel extra",
            Self::ColorProfile => "Color profile",
            Self::ExternalFiles => "External files",
            Self::Mask => "Mask",
            Self::Path => "Path",
            Self::Tags => "Tags",
            Self::Palette => "Palette",
            Self::UserData => "User data",
            Self::Slice => "Slice",
            Self::Tileset => "Tileset",
            Self::Unknown(_) => "Unknown",
        };
        write!(f, "{name} ({:#06x})", self.code())
    }
}

/// One decoded chunk, ready to be folded into the document.
#[derive(Debug)]
pub(crate) enum Chunk {
    Layer(Layer),
    Cel(Cel),
    ColorProfile(ColorProfile),
    Tags(Vec<Tag>),
    Palette(Palette),
    Slice(Slice),
    Tileset(Tileset),
    Skipped(ChunkType),
}

/// Document-wide state the chunk decoders depend on.
pub(crate) struct ChunkContext<'a> {
    pub color_depth: ColorDepth,
    pub transparent_index: u8,
    pub options: &'a DecodeOptions,
    pub decompressor: &'a dyn Decompressor,
}

/// Decodes a chunk body. `body` is bounded to the chunk, and the caller checks
/// that it was fully consumed.
pub(crate) fn decode_chunk(
    chunk_type: ChunkType,
    body: &mut ByteCursor<'_>,
    ctx: &ChunkContext<'_>,
) -> Result<Chunk, Fault> {
    let chunk = match chunk_type {
        ChunkType::Layer => Chunk::Layer(decode_layer(body)?),
        ChunkType::Cel => Chunk::Cel(decode_cel(body, ctx)?),
        ChunkType::ColorProfile => Chunk::ColorProfile(decode_color_profile(body, ctx)?),
        ChunkType::Tags => Chunk::Tags(decode_tags(body, ctx)?),
        ChunkType::Palette => Chunk::Palette(decode_palette(body, ctx)?),
        ChunkType::Slice => Chunk::Slice(decode_slice(body)?),
        ChunkType::Tileset => Chunk::Tileset(decode_tileset(body, ctx)?),
        ChunkType::OldPalette
        | ChunkType::OldPaletteSmall
        | ChunkType::CelExtra
        | ChunkType::ExternalFiles
        | ChunkType::Mask
        | ChunkType::Path
        | ChunkType::UserData
        | ChunkType::Unknown(_) => {
            let skipped = body.read_rest().len();
            if chunk_type.is_deprecated() {
                trace!(%chunk_type, skipped, "skipping deprecated chunk");
            } else {
                trace!(%chunk_type, skipped, "skipping unsupported chunk");
            }
            Chunk::Skipped(chunk_type)
        }
    };
    Ok(chunk)
}

fn decode_layer(body: &mut ByteCursor<'_>) -> Result<Layer, Fault> {
    let start = body.position();
    let raw: wire::LayerChunk = body.read_type_le()?;
    let kind = LayerKind::from_code(raw.layer_type)
        .ok_or_else(|| Fault::unsupported(start + 2, "layer type", raw.layer_type))?;

    Ok(Layer {
        flags: LayerFlags(raw.flags),
        kind,
        child_level: raw.child_level,
        blend_mode: raw.blend_mode.into(),
        opacity: raw.opacity,
        name: raw.layer_name,
        tileset_index: raw.tileset_index,
    })
}

fn decode_cel(body: &mut ByteCursor<'_>, ctx: &ChunkContext<'_>) -> Result<Cel, Fault> {
    let start = body.position();
    let raw: wire::CelChunk = body.read_type_le()?;
    let kind = CelKind::from_code(raw.cel_type)
        .ok_or_else(|| Fault::unsupported(start + 7, "cel type", raw.cel_type))?;

    let mut cel = Cel {
        layer_index: raw.layer_ind,
        x: raw.x_pos,
        y: raw.y_pos,
        opacity: raw.opacity,
        z_index: raw.z_ind,
        kind,
        width: 0,
        height: 0,
        payload: Bytes::new(),
        link: None,
        tilemap: None,
    };
    let bpp = ctx.color_depth.bytes_per_pixel();

    match kind {
        CelKind::Raw => {
            let size: wire::CelSize = body.read_type_le()?;
            let offset = body.position();
            let pixels = body.read_rest();
            let expected = pixel_len(size.width, size.height, bpp);
            check_len(offset, expected, pixels.len())?;
            cel.width = size.width;
            cel.height = size.height;
            cel.payload = Bytes::copy_from_slice(pixels);
        }
        CelKind::Linked => {
            let link: wire::LinkedCel = body.read_type_le()?;
            cel.link = Some(CelLink {
                source_frame: link.frame_pos,
                resolved: false,
            });
        }
        CelKind::Compressed => {
            let size: wire::CelSize = body.read_type_le()?;
            let offset = body.position();
            let compressed = body.read_rest();
            let expected = pixel_len(size.width, size.height, bpp);
            cel.width = size.width;
            cel.height = size.height;
            cel.payload = inflate_exact(ctx, compressed, offset, expected)?.into();
        }
        CelKind::Tilemap => {
            let info_offset = body.position();
            let info: wire::TilemapCel = body.read_type_le()?;
            if info.bits_per_tile == 0 || info.bits_per_tile % 8 != 0 {
                return Err(Fault::unsupported(
                    info_offset + 4,
                    "bits per tile",
                    info.bits_per_tile,
                ));
            }
            let offset = body.position();
            let compressed = body.read_rest();
            let expected = pixel_len(
                info.width,
                info.height,
                usize::from(info.bits_per_tile / 8),
            );
            cel.width = info.width;
            cel.height = info.height;
            cel.payload = inflate_exact(ctx, compressed, offset, expected)?.into();
            cel.tilemap = Some(TilemapInfo {
                bits_per_tile: info.bits_per_tile,
                tile_id_mask: info.tile_id_mask,
                x_flip_mask: info.x_flip_mask,
                y_flip_mask: info.y_flip_mask,
                rotation_mask: info.rotation_mask,
            });
        }
    }
    Ok(cel)
}

fn decode_color_profile(
    body: &mut ByteCursor<'_>,
    ctx: &ChunkContext<'_>,
) -> Result<ColorProfile, Fault> {
    let start = body.position();
    let raw: wire::ColorProfileChunk = body.read_type_le()?;
    let kind = ColorProfileKind::from_code(raw.typ)
        .ok_or_else(|| Fault::unsupported(start, "color profile type", raw.typ))?;

    let icc = raw
        .icc
        .filter(|_| ctx.options.retain_icc_profile)
        .map(|blob| Bytes::from(blob.bytes));
    Ok(ColorProfile {
        kind,
        flags: raw.flags,
        gamma: raw.fixed_gamma.to_f64(),
        icc,
    })
}

fn decode_tags(body: &mut ByteCursor<'_>, ctx: &ChunkContext<'_>) -> Result<Vec<Tag>, Fault> {
    let revision = ctx.options.revision;
    let header: wire::TagsChunk = body.read_type_le()?;
    let mut tags = Vec::new();
    for _ in 0..header.num_tags {
        let start = body.position();
        let raw: wire::Tag = match revision {
            FormatRevision::Current => body.read_type_le()?,
            FormatRevision::Legacy => body.read_type_le::<wire::LegacyTag>()?.into(),
        };
        let direction = LoopDirection::from_index(raw.direction, revision)
            .ok_or_else(|| Fault::unsupported(start + 4, "loop direction", raw.direction))?;
        let [r, g, b] = raw.color;
        tags.push(Tag {
            name: raw.tag_name,
            from: raw.start_ind,
            to: raw.end_ind,
            direction,
            repeat: raw.repeat,
            color: RGB8::new(r, g, b),
        });
    }
    Ok(tags)
}

fn decode_palette(body: &mut ByteCursor<'_>, ctx: &ChunkContext<'_>) -> Result<Palette, Fault> {
    let raw: wire::PaletteChunk = body.read_type_le()?;
    let colors = raw
        .entries
        .into_iter()
        .map(|entry| PaletteColor {
            color: RGBA8::new(entry.red, entry.green, entry.blue, entry.alpha),
            name: entry.name.unwrap_or_else(|| UNNAMED_COLOR.to_owned()),
        })
        .collect();

    Ok(Palette {
        size: raw.new_palette_size,
        first_index: raw.first_ind,
        last_index: raw.last_ind,
        colors,
        transparent_index: (ctx.color_depth == ColorDepth::Indexed)
            .then_some(ctx.transparent_index),
    })
}

fn decode_slice(body: &mut ByteCursor<'_>) -> Result<Slice, Fault> {
    let raw: wire::SliceChunk = body.read_type_le()?;
    let mut keys = Vec::new();
    for _ in 0..raw.num_keys {
        let key: wire::SliceKey = body.read_type_le()?;
        let nine_patch = if raw.flags & wire::SLICE_NINE_PATCH != 0 {
            Some(slice_rect(body.read_type_le()?))
        } else {
            None
        };
        let pivot = if raw.flags & wire::SLICE_PIVOT != 0 {
            let point: wire::Point = body.read_type_le()?;
            Some(Pivot {
                x: point.x,
                y: point.y,
            })
        } else {
            None
        };
        keys.push(SliceKey {
            frame: key.frame,
            bounds: slice_rect(key.bounds),
            nine_patch,
            pivot,
        });
    }

    Ok(Slice {
        name: raw.name,
        flags: raw.flags,
        keys,
    })
}

fn slice_rect(rect: wire::Rect) -> SliceRect {
    SliceRect {
        x: rect.x,
        y: rect.y,
        width: rect.width,
        height: rect.height,
    }
}

fn decode_tileset(body: &mut ByteCursor<'_>, ctx: &ChunkContext<'_>) -> Result<Tileset, Fault> {
    let raw: wire::TilesetChunk = body.read_type_le()?;
    let atlas = match raw.compressed {
        Some(blob) => {
            // the blob is the last field, so it ends where the cursor is now
            let offset = body.position() - blob.bytes.len();
            let bpp = ctx.color_depth.bytes_per_pixel();
            let expected = pixel_len(raw.tile_width, raw.tile_height, bpp)
                .saturating_mul(raw.num_tiles as usize);
            Some(Bytes::from(inflate_exact(ctx, &blob.bytes, offset, expected)?))
        }
        None => None,
    };

    Ok(Tileset {
        id: raw.id,
        tile_count: raw.num_tiles,
        tile_width: raw.tile_width,
        tile_height: raw.tile_height,
        base_index: raw.base_index,
        name: raw.name,
        external: raw.external.map(|ext| ExternalTileset {
            file_id: ext.file_id,
            tileset_id: ext.tileset_id,
        }),
        atlas,
    })
}

fn pixel_len(width: u16, height: u16, bytes_per_pixel: usize) -> usize {
    usize::from(width)
        .saturating_mul(usize::from(height))
        .saturating_mul(bytes_per_pixel)
}

fn check_len(offset: usize, expected: usize, actual: usize) -> Result<(), Fault> {
    if expected == actual {
        Ok(())
    } else {
        Err(Fault::new(
            offset,
            ErrorKind::PayloadLengthMismatch { expected, actual },
        ))
    }
}

/// Inflates `input` and requires exactly `expected` bytes out. At most one
/// byte past `expected` is ever produced.
fn inflate_exact(
    ctx: &ChunkContext<'_>,
    input: &[u8],
    offset: usize,
    expected: usize,
) -> Result<Vec<u8>, Fault> {
    let out = ctx
        .decompressor
        .decompress(input, expected.saturating_add(1))
        .map_err(|err| Fault::new(offset, ErrorKind::DecompressionFailure(err)))?;
    check_len(offset, expected, out.len())?;
    Ok(out)
}
