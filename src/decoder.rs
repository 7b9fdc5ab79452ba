use parsing::{ByteCursor, ReadBytes};
use tracing::{debug, warn};

use crate::ase_file::{
    ChunkHeader, FileHeader, FrameHeader, CHUNK_HEADER_SIZE, FILE_HEADER_SIZE, FILE_MAGIC,
    FILE_MAGIC_OFFSET, FRAME_HEADER_SIZE, FRAME_MAGIC,
};
use crate::builder::DocumentBuilder;
use crate::chunk::{decode_chunk, Chunk, ChunkContext, ChunkType};
use crate::document::{ColorDepth, Document};
use crate::error::{DecodeError, ErrorKind, Fault, Section};
use crate::inflate::{Decompressor, Zlib};
use crate::options::DecodeOptions;

/// Cheap check for the file magic, without decoding anything.
pub fn is_aseprite(data: &[u8]) -> bool {
    ByteCursor::new(data).peek_u16_at(FILE_MAGIC_OFFSET) == Ok(FILE_MAGIC)
}

/// Decodes a whole file with the default options.
pub fn decode(data: &[u8]) -> Result<Document, DecodeError> {
    Decoder::new(DecodeOptions::default()).decode(data)
}

pub fn decode_with(data: &[u8], options: &DecodeOptions) -> Result<Document, DecodeError> {
    Decoder::new(options.clone()).decode(data)
}

/// Configured decoder. The decompressor can be swapped to plug in another
/// inflate implementation.
#[derive(Debug, Clone, Default)]
pub struct Decoder<D = Zlib> {
    options: DecodeOptions,
    decompressor: D,
}

impl Decoder {
    pub fn new(options: DecodeOptions) -> Self {
        Self {
            options,
            decompressor: Zlib,
        }
    }
}

impl<D: Decompressor> Decoder<D> {
    pub fn with_decompressor<N: Decompressor>(self, decompressor: N) -> Decoder<N> {
        Decoder {
            options: self.options,
            decompressor,
        }
    }

    pub fn decode(&self, data: &[u8]) -> Result<Document, DecodeError> {
        let mut cursor = ByteCursor::new(data).with_lossy_strings(self.options.lossy_strings);
        let (header, color_depth) =
            self.read_file_header(&mut cursor).map_err(|f| f.within(Section::FileHeader))?;
        debug!(
            frames = header.num_frames,
            width = header.width,
            height = header.height,
            depth = header.color_depth,
            "decoding sprite"
        );
        if header.file_size as usize != data.len() {
            warn!(
                declared = header.file_size,
                actual = data.len(),
                "file size in header does not match the data"
            );
        }

        let ctx = ChunkContext {
            color_depth,
            transparent_index: header.transparent_index,
            options: &self.options,
            decompressor: &self.decompressor,
        };
        let frame_count = header.num_frames;
        let mut builder = DocumentBuilder::new(header, color_depth);

        for index in 0..usize::from(frame_count) {
            let frame_start = cursor.position();
            let frame_header = self
                .read_frame_header(&mut cursor)
                .map_err(|f| f.within(Section::FrameHeader { frame: index }))?;
            let mut frame = builder.begin_frame(&frame_header);
            debug!(
                frame = index,
                chunks = frame.chunk_count,
                duration = frame.duration,
                "frame"
            );

            for _ in 0..frame.chunk_count {
                let chunk_header: ChunkHeader = cursor
                    .read_type_le()
                    .map_err(|e| Fault::from(e).within(Section::ChunkHeader { frame: index }))?;
                let chunk_type = ChunkType::from(chunk_header.chunk_type);
                let section = Section::Chunk {
                    frame: index,
                    chunk_type,
                };
                let chunk = read_chunk(&mut cursor, chunk_header, chunk_type, &ctx)
                    .map_err(|f| f.within(section))?;
                builder.absorb(chunk, &mut frame);
            }

            let consumed = cursor.position() - frame_start;
            if consumed != frame.size as usize {
                warn!(
                    frame = index,
                    declared = frame.size,
                    consumed,
                    "frame size does not match its chunks"
                );
            }
            builder.push_frame(frame);
        }

        builder.finish(self.options.link_policy, cursor.position())
    }

    fn read_file_header(
        &self,
        cursor: &mut ByteCursor<'_>,
    ) -> Result<(FileHeader, ColorDepth), Fault> {
        if self.options.verify_magic {
            let found = cursor.peek_u16_at(FILE_MAGIC_OFFSET)?;
            if found != FILE_MAGIC {
                return Err(Fault::new(
                    FILE_MAGIC_OFFSET,
                    ErrorKind::BadMagic {
                        expected: FILE_MAGIC,
                        found,
                    },
                ));
            }
        }
        let header: FileHeader = cursor.take(FILE_HEADER_SIZE)?.read_type_le()?;
        let color_depth = ColorDepth::from_bits(header.color_depth)
            .ok_or_else(|| Fault::unsupported(12, "color depth", header.color_depth))?;
        Ok((header, color_depth))
    }

    fn read_frame_header(&self, cursor: &mut ByteCursor<'_>) -> Result<FrameHeader, Fault> {
        let start = cursor.position();
        let header: FrameHeader = cursor.take(FRAME_HEADER_SIZE)?.read_type_le()?;
        if self.options.verify_magic && header.magic != FRAME_MAGIC {
            return Err(Fault::new(
                start + 4,
                ErrorKind::BadMagic {
                    expected: FRAME_MAGIC,
                    found: header.magic,
                },
            ));
        }
        Ok(header)
    }
}

/// Reads one chunk body and checks that its decoder consumed exactly the
/// declared size.
fn read_chunk(
    cursor: &mut ByteCursor<'_>,
    header: ChunkHeader,
    chunk_type: ChunkType,
    ctx: &ChunkContext<'_>,
) -> Result<Chunk, Fault> {
    let start = cursor.position() - CHUNK_HEADER_SIZE;
    let declared = header.size as usize;
    let Some(body_len) = declared.checked_sub(CHUNK_HEADER_SIZE) else {
        return Err(Fault::new(
            start,
            ErrorKind::ChunkSizeMismatch {
                declared,
                consumed: CHUNK_HEADER_SIZE,
            },
        ));
    };
    let mut body = cursor.take(body_len)?;
    let body_start = body.position();
    debug!(%chunk_type, offset = start, size = declared, "chunk");

    // the body is bounded by the declared size, so running out of it means the
    // chunk claims fewer bytes than its fields need
    let chunk = match decode_chunk(chunk_type, &mut body, ctx) {
        Err(Fault {
            offset,
            kind: ErrorKind::BufferUnderrun { need, .. },
        }) => {
            return Err(Fault::new(
                offset,
                ErrorKind::ChunkSizeMismatch {
                    declared,
                    consumed: CHUNK_HEADER_SIZE + (offset - body_start) + need,
                },
            ));
        }
        other => other?,
    };
    if !body.is_empty() {
        return Err(Fault::new(
            body.position(),
            ErrorKind::ChunkSizeMismatch {
                declared,
                consumed: CHUNK_HEADER_SIZE + body.consumed(),
            },
        ));
    }
    Ok(chunk)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_is_peeked_at_offset_four() {
        let mut data = [0_u8; 8];
        assert!(!is_aseprite(&data));
        data[4..6].copy_from_slice(&FILE_MAGIC.to_le_bytes());
        assert!(is_aseprite(&data));
        assert!(!is_aseprite(&data[..5]));
    }

    #[test]
    fn short_input_is_an_underrun_in_the_file_header() {
        let mut data = vec![0_u8; 40];
        data[4..6].copy_from_slice(&FILE_MAGIC.to_le_bytes());
        let err = decode(&data).unwrap_err();
        assert_eq!(err.section, Section::FileHeader);
        assert_eq!(err.offset, 0);
        assert!(matches!(
            err.kind,
            ErrorKind::BufferUnderrun { need: FILE_HEADER_SIZE, have: 40 }
        ));
    }

    #[test]
    fn frame_header_is_read_as_one_block() {
        let mut data = vec![0_u8; 128 + 10];
        data[4..6].copy_from_slice(&FILE_MAGIC.to_le_bytes());
        data[6] = 1;
        data[12] = 32;
        let err = decode(&data).unwrap_err();
        assert_eq!(err.section, Section::FrameHeader { frame: 0 });
        assert_eq!(err.offset, 128);
        assert!(matches!(
            err.kind,
            ErrorKind::BufferUnderrun { need: FRAME_HEADER_SIZE, have: 10 }
        ));
    }

    #[test]
    fn bad_magic_is_reported() {
        let data = vec![0_u8; 128];
        let err = decode(&data).unwrap_err();
        assert_eq!(err.offset, FILE_MAGIC_OFFSET);
        assert!(matches!(
            err.kind,
            ErrorKind::BadMagic {
                expected: FILE_MAGIC,
                found: 0
            }
        ));
    }
}
