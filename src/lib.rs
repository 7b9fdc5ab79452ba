//! Decoder for Aseprite's binary `.aseprite`/`.ase` format.
//!
//! ```no_run
//! let data = std::fs::read("sprite.aseprite")?;
//! let doc = aseprite_reader::decode(&data)?;
//! for (index, frame) in doc.frames().iter().enumerate() {
//!     println!("frame {index}: {} ms, {} cels", frame.duration, frame.cels.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod ase_file;
mod builder;
mod chunk;
mod decoder;
mod document;
mod error;
mod inflate;
mod link;
mod options;

pub use chunk::{ChunkType, UNNAMED_COLOR};
pub use decoder::{decode, decode_with, is_aseprite, Decoder};
pub use document::{
    BlendMode, Cel, CelKind, CelLink, ColorDepth, ColorProfile, ColorProfileKind, Document,
    ExternalTileset, Frame, Grid, Layer, LayerFlags, LayerKind, LoopDirection, Palette,
    PaletteColor, PixelRatio, Pivot, Slice, SliceKey, SliceRect, Tag, Tile, TilemapInfo, Tileset,
};
pub use error::{DecodeError, ErrorKind, Section};
pub use inflate::{Decompressor, Zlib};
pub use options::{DecodeOptions, FormatRevision, LinkPolicy};
