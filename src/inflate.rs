use std::io::{self, Read};

use flate2::read::ZlibDecoder;

/// Inflates compressed cel and tileset payloads.
pub trait Decompressor {
    /// Decompresses `input`, producing at most `limit` bytes.
    fn decompress(&self, input: &[u8], limit: usize) -> io::Result<Vec<u8>>;
}

/// zlib-wrapped DEFLATE, the only scheme the format uses.
#[derive(Debug, Clone, Copy, Default)]
pub struct Zlib;

impl Decompressor for Zlib {
    fn decompress(&self, input: &[u8], limit: usize) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        ZlibDecoder::new(input)
            .take(limit as u64)
            .read_to_end(&mut out)?;
        Ok(out)
    }
}

impl<D: Decompressor + ?Sized> Decompressor for &D {
    fn decompress(&self, input: &[u8], limit: usize) -> io::Result<Vec<u8>> {
        (**self).decompress(input, limit)
    }
}
