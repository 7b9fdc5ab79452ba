use tracing::debug;

use crate::ase_file::{FileHeader, FrameHeader};
use crate::chunk::Chunk;
use crate::document::{
    ColorDepth, ColorProfile, Document, Frame, Grid, Layer, Palette, PixelRatio, Slice, Tag,
    Tileset,
};
use crate::error::{DecodeError, Fault, Section};
use crate::link;
use crate::options::LinkPolicy;

/// Accumulates decoded chunks into a [`Document`].
pub(crate) struct DocumentBuilder {
    header: FileHeader,
    color_depth: ColorDepth,
    color_profile: Option<ColorProfile>,
    palette: Option<Palette>,
    layers: Vec<Layer>,
    tags: Vec<Tag>,
    slices: Vec<Slice>,
    tilesets: Vec<Tileset>,
    frames: Vec<Frame>,
}

impl DocumentBuilder {
    pub fn new(header: FileHeader, color_depth: ColorDepth) -> Self {
        Self {
            header,
            color_depth,
            color_profile: None,
            palette: None,
            layers: Vec::new(),
            tags: Vec::new(),
            slices: Vec::new(),
            tilesets: Vec::new(),
            frames: Vec::new(),
        }
    }

    pub fn begin_frame(&self, header: &FrameHeader) -> Frame {
        Frame {
            size: header.frame_size,
            duration: header.frame_dur_ms,
            chunk_count: header.num_chunks(),
            cels: Vec::new(),
        }
    }

    pub fn absorb(&mut self, chunk: Chunk, frame: &mut Frame) {
        match chunk {
            Chunk::Layer(layer) => self.layers.push(layer),
            Chunk::Cel(cel) => frame.cels.push(cel),
            Chunk::ColorProfile(profile) => self.color_profile = Some(profile),
            Chunk::Tags(tags) => self.tags.extend(tags),
            Chunk::Palette(palette) => {
                if self.palette.is_some() {
                    debug!("palette replaced by a later palette chunk");
                }
                self.palette = Some(palette);
            }
            Chunk::Slice(slice) => self.slices.push(slice),
            Chunk::Tileset(tileset) => self.tilesets.push(tileset),
            Chunk::Skipped(_) => {}
        }
    }

    pub fn push_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Resolves cel links and produces the document. `end_offset` is where
    /// link errors are reported.
    pub fn finish(mut self, policy: LinkPolicy, end_offset: usize) -> Result<Document, DecodeError> {
        let resolved = link::resolve_links(&mut self.frames, policy)
            .map_err(|kind| Fault::new(end_offset, kind).within(Section::CelLinks))?;
        debug!(resolved, "cel links resolved");

        let h = self.header;
        Ok(Document {
            file_size: h.file_size,
            frame_count: h.num_frames,
            width: h.width,
            height: h.height,
            color_depth: self.color_depth,
            flags: h.flags,
            transparent_index: h.transparent_index,
            num_colors: h.color_num,
            pixel_ratio: PixelRatio {
                width: h.pix_width,
                height: h.pix_height,
            },
            grid: Grid {
                x: h.grid_x,
                y: h.grid_y,
                width: h.grid_width,
                height: h.grid_height,
            },
            color_profile: self.color_profile,
            palette: self.palette,
            layers: self.layers,
            tags: self.tags,
            slices: self.slices,
            tilesets: self.tilesets,
            frames: self.frames,
        })
    }
}
