use std::fmt;
use std::io;
use std::str::Utf8Error;

use crate::chunk::ChunkType;

/// Part of the file that was being decoded when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    FileHeader,
    FrameHeader { frame: usize },
    ChunkHeader { frame: usize },
    Chunk { frame: usize, chunk_type: ChunkType },
    CelLinks,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::FileHeader => f.write_str("file header"),
            Section::FrameHeader { frame } => write!(f, "header of frame {frame}"),
            Section::ChunkHeader { frame } => write!(f, "chunk header in frame {frame}"),
            Section::Chunk { frame, chunk_type } => write!(f, "{chunk_type} chunk in frame {frame}"),
            Section::CelLinks => f.write_str("cel link resolution"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("unexpected end of data: need {need} bytes, have {have}")]
    BufferUnderrun { need: usize, have: usize },
    #[error("chunk declares {declared} bytes but {consumed} were consumed")]
    ChunkSizeMismatch { declared: usize, consumed: usize },
    #[error("zlib stream could not be inflated")]
    DecompressionFailure(#[source] io::Error),
    #[error("payload is {actual} bytes, expected {expected}")]
    PayloadLengthMismatch { expected: usize, actual: usize },
    #[error("cel on layer {layer} in frame {frame} links to frame {source_frame}, which has no usable cel")]
    UnresolvedCelLink {
        frame: usize,
        layer: u16,
        source_frame: u16,
    },
    #[error("bad magic number {found:#06x}, expected {expected:#06x}")]
    BadMagic { expected: u16, found: u16 },
    #[error("string is not valid UTF-8")]
    InvalidString(#[source] Utf8Error),
    #[error("unsupported {field} value {value}")]
    UnsupportedValue { field: &'static str, value: u32 },
}

/// Error returned by the decoder. There are no partial results.
#[derive(Debug, thiserror::Error)]
#[error("{kind} at offset {offset:#x} ({section})")]
pub struct DecodeError {
    pub offset: usize,
    pub section: Section,
    #[source]
    pub kind: ErrorKind,
}

/// An error that knows where it happened but not yet in which section.
#[derive(Debug)]
pub(crate) struct Fault {
    pub offset: usize,
    pub kind: ErrorKind,
}

impl Fault {
    pub fn new(offset: usize, kind: ErrorKind) -> Self {
        Self { offset, kind }
    }

    pub fn unsupported(offset: usize, field: &'static str, value: impl Into<u32>) -> Self {
        Self::new(
            offset,
            ErrorKind::UnsupportedValue {
                field,
                value: value.into(),
            },
        )
    }

    pub fn within(self, section: Section) -> DecodeError {
        DecodeError {
            offset: self.offset,
            section,
            kind: self.kind,
        }
    }
}

impl From<parsing::Error> for Fault {
    fn from(err: parsing::Error) -> Self {
        match err {
            parsing::Error::BufferUnderrun { offset, need, have } => {
                Fault::new(offset, ErrorKind::BufferUnderrun { need, have })
            }
            parsing::Error::InvalidString { offset, source } => {
                Fault::new(offset, ErrorKind::InvalidString(source))
            }
        }
    }
}
