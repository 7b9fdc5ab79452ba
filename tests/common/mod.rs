//! Writes synthetic sprites byte by byte for the integration tests.
#![allow(dead_code)]

use std::io::Write;

use bytes::BufMut;
use flate2::write::ZlibEncoder;
use flate2::Compression;

pub const LAYER: u16 = 0x2004;
pub const CEL: u16 = 0x2005;
pub const COLOR_PROFILE: u16 = 0x2007;
pub const TAGS: u16 = 0x2018;
pub const PALETTE: u16 = 0x2019;
pub const USER_DATA: u16 = 0x2020;
pub const SLICE: u16 = 0x2022;
pub const TILESET: u16 = 0x2023;

pub fn put_str(buf: &mut Vec<u8>, s: &str) {
    buf.put_u16_le(s.len() as u16);
    buf.put_slice(s.as_bytes());
}

pub fn compress(data: &[u8]) -> Vec<u8> {
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

/// Wraps a body in a chunk header.
pub fn chunk(chunk_type: u16, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 6);
    out.put_u32_le(body.len() as u32 + 6);
    out.put_u16_le(chunk_type);
    out.put_slice(body);
    out
}

pub fn frame(duration: u16, chunks: &[Vec<u8>]) -> Vec<u8> {
    let body: Vec<u8> = chunks.concat();
    let mut out = Vec::new();
    out.put_u32_le(body.len() as u32 + 16);
    out.put_u16_le(0xF1FA);
    out.put_u16_le(chunks.len().min(0xFFFF) as u16);
    out.put_u16_le(duration);
    out.put_bytes(0, 2);
    out.put_u32_le(chunks.len() as u32);
    out.put_slice(&body);
    out
}

pub struct Sprite {
    pub width: u16,
    pub height: u16,
    pub depth: u16,
    pub transparent_index: u8,
    pub num_colors: u16,
    pub pixel_ratio: (u8, u8),
    pub frames: Vec<Vec<u8>>,
}

impl Sprite {
    pub fn new(depth: u16, width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            depth,
            transparent_index: 0,
            num_colors: 32,
            pixel_ratio: (1, 1),
            frames: Vec::new(),
        }
    }

    pub fn frame(mut self, duration: u16, chunks: &[Vec<u8>]) -> Self {
        self.frames.push(frame(duration, chunks));
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let body: Vec<u8> = self.frames.concat();
        let mut out = Vec::with_capacity(128 + body.len());
        out.put_u32_le(128 + body.len() as u32);
        out.put_u16_le(0xA5E0);
        out.put_u16_le(self.frames.len() as u16);
        out.put_u16_le(self.width);
        out.put_u16_le(self.height);
        out.put_u16_le(self.depth);
        out.put_u32_le(1);
        out.put_u16_le(100);
        out.put_bytes(0, 8);
        out.put_u8(self.transparent_index);
        out.put_bytes(0, 3);
        out.put_u16_le(self.num_colors);
        out.put_u8(self.pixel_ratio.0);
        out.put_u8(self.pixel_ratio.1);
        out.put_i16_le(0);
        out.put_i16_le(0);
        out.put_u16_le(16);
        out.put_u16_le(16);
        out.put_bytes(0, 84);
        debug_assert_eq!(out.len(), 128);
        out.put_slice(&body);
        out
    }
}

pub fn layer(kind: u16, name: &str, tileset: Option<u32>) -> Vec<u8> {
    let mut body = Vec::new();
    body.put_u16_le(1 | 2);
    body.put_u16_le(kind);
    body.put_u16_le(0);
    body.put_u16_le(0);
    body.put_u16_le(0);
    body.put_u16_le(0);
    body.put_u8(255);
    body.put_bytes(0, 3);
    put_str(&mut body, name);
    if let Some(index) = tileset {
        body.put_u32_le(index);
    }
    chunk(LAYER, &body)
}

fn cel_header(layer: u16, cel_type: u16) -> Vec<u8> {
    let mut body = Vec::new();
    body.put_u16_le(layer);
    body.put_i16_le(3);
    body.put_i16_le(-2);
    body.put_u8(200);
    body.put_u16_le(cel_type);
    body.put_i16_le(0);
    body.put_bytes(0, 5);
    body
}

pub fn raw_cel(layer: u16, width: u16, height: u16, pixels: &[u8]) -> Vec<u8> {
    let mut body = cel_header(layer, 0);
    body.put_u16_le(width);
    body.put_u16_le(height);
    body.put_slice(pixels);
    chunk(CEL, &body)
}

pub fn linked_cel(layer: u16, source_frame: u16) -> Vec<u8> {
    let mut body = cel_header(layer, 1);
    body.put_u16_le(source_frame);
    chunk(CEL, &body)
}

pub fn compressed_cel(layer: u16, width: u16, height: u16, pixels: &[u8]) -> Vec<u8> {
    let mut body = cel_header(layer, 2);
    body.put_u16_le(width);
    body.put_u16_le(height);
    body.put_slice(&compress(pixels));
    chunk(CEL, &body)
}

pub fn tilemap_cel(layer: u16, width: u16, height: u16, tiles: &[u32]) -> Vec<u8> {
    let mut body = cel_header(layer, 3);
    body.put_u16_le(width);
    body.put_u16_le(height);
    body.put_u16_le(32);
    body.put_u32_le(0x1FFF_FFFF);
    body.put_u32_le(0x2000_0000);
    body.put_u32_le(0x4000_0000);
    body.put_u32_le(0x8000_0000);
    body.put_bytes(0, 10);
    let entries: Vec<u8> = tiles.iter().flat_map(|t| t.to_le_bytes()).collect();
    body.put_slice(&compress(&entries));
    chunk(CEL, &body)
}

pub struct TagRecord<'a> {
    pub from: u16,
    pub to: u16,
    pub direction: u8,
    pub repeat: u16,
    pub color: [u8; 3],
    pub name: &'a str,
}

pub fn tags(records: &[TagRecord<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    body.put_u16_le(records.len() as u16);
    body.put_bytes(0, 8);
    for tag in records {
        body.put_u16_le(tag.from);
        body.put_u16_le(tag.to);
        body.put_u8(tag.direction);
        body.put_u16_le(tag.repeat);
        body.put_bytes(0, 6);
        body.put_slice(&tag.color);
        body.put_u8(0);
        put_str(&mut body, tag.name);
    }
    chunk(TAGS, &body)
}

pub fn palette(entries: &[([u8; 4], Option<&str>)]) -> Vec<u8> {
    let mut body = Vec::new();
    body.put_u32_le(entries.len() as u32);
    body.put_u32_le(0);
    body.put_u32_le(entries.len().saturating_sub(1) as u32);
    body.put_bytes(0, 8);
    for (rgba, name) in entries {
        body.put_u16_le(u16::from(name.is_some()));
        body.put_slice(rgba);
        if let Some(name) = name {
            put_str(&mut body, name);
        }
    }
    chunk(PALETTE, &body)
}

pub fn icc_profile(icc: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.put_u16_le(2);
    body.put_u16_le(0);
    body.put_i32_le(0);
    body.put_bytes(0, 8);
    body.put_u32_le(icc.len() as u32);
    body.put_slice(icc);
    chunk(COLOR_PROFILE, &body)
}

pub fn srgb_profile_with_gamma(gamma_fixed: i32) -> Vec<u8> {
    let mut body = Vec::new();
    body.put_u16_le(1);
    body.put_u16_le(1);
    body.put_i32_le(gamma_fixed);
    body.put_bytes(0, 8);
    chunk(COLOR_PROFILE, &body)
}

pub fn embedded_tileset(id: u32, tile_w: u16, tile_h: u16, pixels: &[u8], count: u32) -> Vec<u8> {
    let mut body = Vec::new();
    body.put_u32_le(id);
    body.put_u32_le(2);
    body.put_u32_le(count);
    body.put_u16_le(tile_w);
    body.put_u16_le(tile_h);
    body.put_i16_le(1);
    body.put_bytes(0, 14);
    put_str(&mut body, "terrain");
    let compressed = compress(pixels);
    body.put_u32_le(compressed.len() as u32);
    body.put_slice(&compressed);
    chunk(TILESET, &body)
}

pub fn external_tileset(id: u32, file_id: u32, tileset_id: u32) -> Vec<u8> {
    let mut body = Vec::new();
    body.put_u32_le(id);
    body.put_u32_le(1);
    body.put_u32_le(0);
    body.put_u16_le(8);
    body.put_u16_le(8);
    body.put_i16_le(1);
    body.put_bytes(0, 14);
    put_str(&mut body, "shared");
    body.put_u32_le(file_id);
    body.put_u32_le(tileset_id);
    chunk(TILESET, &body)
}

pub fn slice(name: &str, keys: &[(u32, [i32; 2], [u32; 2])], pivot: Option<[i32; 2]>) -> Vec<u8> {
    let mut body = Vec::new();
    body.put_u32_le(keys.len() as u32);
    body.put_u32_le(if pivot.is_some() { 2 } else { 0 });
    body.put_u32_le(0);
    put_str(&mut body, name);
    for (frame, [x, y], [w, h]) in keys {
        body.put_u32_le(*frame);
        body.put_i32_le(*x);
        body.put_i32_le(*y);
        body.put_u32_le(*w);
        body.put_u32_le(*h);
        if let Some([px, py]) = pivot {
            body.put_i32_le(px);
            body.put_i32_le(py);
        }
    }
    chunk(SLICE, &body)
}
