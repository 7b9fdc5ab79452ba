use parsing::{Fixed, Parse};

pub type Byte = u8;
pub type Word = u16;
pub type Short = i16;
pub type Dword = u32;
pub type Long = i32;

pub const FILE_MAGIC: Word = 0xA5E0;
pub const FRAME_MAGIC: Word = 0xF1FA;

pub const FILE_HEADER_SIZE: usize = 128;
pub const FRAME_HEADER_SIZE: usize = 16;
pub const CHUNK_HEADER_SIZE: usize = 6;

/// Offset of the magic number inside the file header.
pub const FILE_MAGIC_OFFSET: usize = 4;

pub const TILESET_EXTERNAL_FILE: Dword = 1;
pub const TILESET_EMBEDDED: Dword = 2;

pub const SLICE_NINE_PATCH: Dword = 1;
pub const SLICE_PIVOT: Dword = 2;

parsing::parsable_struct! {
    #[derive(Clone, PartialEq, Debug)]
    pub struct FileHeader {
        pub file_size: Dword,
        // magic, checked by peeking before the header is parsed
        [[ignore: Word]]
        pub num_frames: Word,
        pub width: Word,
        pub height: Word,
        /// 32=RGBA, 16=Grayscale, 8=Indexed
        pub color_depth: Word,
        pub flags: Dword,
        // frame speed, deprecated: now on each frame
        [[ignore: Word]]
        [[ignore: Dword]]
        [[ignore: Dword]]
        pub transparent_index: Byte,
        [[padding_bytes = 3]]
        /// 0 means 256 for old sprites
        pub color_num: Word,
        pub pix_width: Byte,
        pub pix_height: Byte,
        pub grid_x: Short,
        pub grid_y: Short,
        pub grid_width: Word,
        pub grid_height: Word,
        [[padding_bytes = 84]]
    }
}

parsing::parsable_struct! {
    #[derive(Clone, PartialEq, Debug)]
    pub struct FrameHeader {
        pub frame_size: Dword,
        pub magic: Word,
        old_num_chunks: Word,
        pub frame_dur_ms: Word,
        [[padding_bytes = 2]]
        new_num_chunks: Dword,
    }
}

impl FrameHeader {
    pub fn num_chunks(&self) -> u32 {
        if self.new_num_chunks == 0 {
            u32::from(self.old_num_chunks)
        } else {
            self.new_num_chunks
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Parse)]
pub struct ChunkHeader {
    pub size: Dword,
    pub chunk_type: Word,
}

parsing::parsable_struct! {
    #[derive(Clone, PartialEq, Eq, Debug)]
    pub struct Blob {
        [[param: Dword = len]]
        #[parse(sized_buf = len)]
        pub bytes: Vec<u8>,
    }
}

parsing::parsable_struct! {
    #[derive(Clone, PartialEq, Eq, Debug)]
    pub struct LayerChunk {
        pub flags: Word,
        pub layer_type: Word,
        pub child_level: Word,
        [[ignore: Word]]
        [[ignore: Word]]
        pub blend_mode: Word,
        pub opacity: Byte,
        [[padding_bytes = 3]]
        #[parse(string)]
        pub layer_name: String,
        #[parse(option_if: Dword = layer_type == 2)]
        pub tileset_index: Option<Dword>,
    }
}

parsing::parsable_struct! {
    #[derive(Clone, PartialEq, Eq, Debug)]
    pub struct CelChunk {
        pub layer_ind: Word,
        pub x_pos: Short,
        pub y_pos: Short,
        pub opacity: Byte,
        pub cel_type: Word,
        pub z_ind: Short,
        [[padding_bytes = 5]]
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Parse)]
pub struct LinkedCel {
    pub frame_pos: Word,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Parse)]
pub struct CelSize {
    pub width: Word,
    pub height: Word,
}

parsing::parsable_struct! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct TilemapCel {
        pub width: Word,
        pub height: Word,
        pub bits_per_tile: Word,
        pub tile_id_mask: Dword,
        pub x_flip_mask: Dword,
        pub y_flip_mask: Dword,
        pub rotation_mask: Dword,
        [[padding_bytes = 10]]
    }
}

parsing::parsable_struct! {
    #[derive(Clone, PartialEq, Debug)]
    pub struct ColorProfileChunk {
        pub typ: Word,
        pub flags: Word,
        pub fixed_gamma: Fixed,
        [[padding_bytes = 8]]
        #[parse(option_if: Blob = typ == 2)]
        pub icc: Option<Blob>,
    }
}

parsing::parsable_struct! {
    #[derive(Clone, PartialEq, Eq, Debug)]
    pub struct TagsChunk {
        pub num_tags: Word,
        [[padding_bytes = 8]]
    }
}

parsing::parsable_struct! {
    #[derive(Clone, PartialEq, Eq, Debug)]
    pub struct Tag {
        pub start_ind: Word,
        pub end_ind: Word,
        pub direction: Byte,
        pub repeat: Word,
        [[padding_bytes = 6]]
        pub color: [Byte; 3],
        [[padding_bytes = 1]]
        #[parse(string)]
        pub tag_name: String,
    }
}

parsing::parsable_struct! {
    /// Tag layout written before the repeat field existed.
    #[derive(Clone, PartialEq, Eq, Debug)]
    pub struct LegacyTag {
        pub start_ind: Word,
        pub end_ind: Word,
        pub direction: Byte,
        [[padding_bytes = 8]]
        pub color: [Byte; 3],
        [[padding_bytes = 1]]
        #[parse(string)]
        pub tag_name: String,
    }
}

impl From<LegacyTag> for Tag {
    fn from(tag: LegacyTag) -> Self {
        Tag {
            start_ind: tag.start_ind,
            end_ind: tag.end_ind,
            direction: tag.direction,
            repeat: 0,
            color: tag.color,
            tag_name: tag.tag_name,
        }
    }
}

parsing::parsable_struct! {
    #[derive(Clone, PartialEq, Eq, Debug)]
    pub struct PaletteChunk {
        pub new_palette_size: Dword,
        pub first_ind: Dword,
        pub last_ind: Dword,
        [[padding_bytes = 8]]
        #[parse(collection: PaletteEntry = new_palette_size)]
        pub entries: Vec<PaletteEntry>,
    }
}

parsing::parsable_struct! {
    #[derive(Clone, PartialEq, Eq, Debug)]
    pub struct PaletteEntry {
        [[param: Word = flags]]
        pub red: Byte,
        pub green: Byte,
        pub blue: Byte,
        pub alpha: Byte,
        #[parse(string, option_if: String = (flags & 1) != 0)]
        pub name: Option<String>,
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Parse)]
pub struct ExternalTilesetRef {
    pub file_id: Dword,
    pub tileset_id: Dword,
}

parsing::parsable_struct! {
    #[derive(Clone, PartialEq, Eq, Debug)]
    pub struct TilesetChunk {
        pub id: Dword,
        [[param: Dword = flags]]
        pub num_tiles: Dword,
        pub tile_width: Word,
        pub tile_height: Word,
        pub base_index: Short,
        [[padding_bytes = 14]]
        #[parse(string)]
        pub name: String,
        #[parse(option_if: ExternalTilesetRef = (flags & TILESET_EXTERNAL_FILE) != 0)]
        pub external: Option<ExternalTilesetRef>,
        #[parse(option_if: Blob = (flags & TILESET_EMBEDDED) != 0)]
        pub compressed: Option<Blob>,
    }
}

parsing::parsable_struct! {
    #[derive(Clone, PartialEq, Eq, Debug)]
    pub struct SliceChunk {
        pub num_keys: Dword,
        pub flags: Dword,
        [[ignore: Dword]]
        #[parse(string)]
        pub name: String,
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Parse)]
pub struct Rect {
    pub x: Long,
    pub y: Long,
    pub width: Dword,
    pub height: Dword,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Parse)]
pub struct SliceKey {
    pub frame: Dword,
    pub bounds: Rect,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Parse)]
pub struct Point {
    pub x: Long,
    pub y: Long,
}
