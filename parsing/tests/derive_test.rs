#![allow(dead_code)]

use parsing::{ByteCursor, Error, ReadBytes};

#[test]
fn test_derive() {
    parsing::parsable_struct! {
        #[derive(Debug)]
        pub struct Header {
            item1: u64,
            [[ignore: u8]]
            [[padding_bytes = 3]]
            item2: u32,
        }
    }

    let mut bytes = [0_u8; 16];
    bytes[0] = 1;
    bytes[8] = u8::MAX;
    bytes[12] = 7;

    let mut b = ByteCursor::new(&bytes);
    let h: Header = b.read_type_le().unwrap();
    assert_eq!(h.item1, 1);
    assert_eq!(h.item2, 7);
    assert!(b.is_empty());

    let mut b = ByteCursor::new(&bytes);
    let h: Header = b.read_type_be().unwrap();
    assert_eq!(h.item1, 72057594037927936);
    assert_eq!(h.item2, 0x0700_0000);

    let mut b = ByteCursor::new(&bytes[..15]);
    let err = b.read_type_le::<Header>().unwrap_err();
    assert_eq!(
        err,
        Error::BufferUnderrun {
            offset: 12,
            need: 4,
            have: 3
        }
    );
}

#[test]
fn test_derive_with_string() {
    parsing::parsable_struct! {
        #[derive(Debug)]
        pub struct Header {
            something: u32,
            #[parse(string)]
            s: String,
            [[padding_bytes = 2]]
            something_else: u16,
        }
    }

    const MSG: &str = "hello my name is bob";
    let mut bytes = vec![5, 0, 0, 0];
    bytes.extend_from_slice(&(MSG.len() as u16).to_le_bytes());
    bytes.extend_from_slice(MSG.as_bytes());
    bytes.extend_from_slice(&[0, 0, 9, 0]);

    let mut b = ByteCursor::new(&bytes);
    let h: Header = b.read_type_le().unwrap();
    assert_eq!(h.something, 5);
    assert_eq!(h.s, MSG);
    assert_eq!(h.something_else, 9);
}

#[test]
fn test_derive_with_invalid_string() {
    parsing::parsable_struct! {
        #[derive(Debug)]
        pub struct Header {
            #[parse(string)]
            s: String,
        }
    }

    let bytes = [2, 0, 0xC3, 0x28];
    let mut b = ByteCursor::new(&bytes);
    let err = b.read_type_le::<Header>().unwrap_err();
    assert!(matches!(err, Error::InvalidString { offset: 2, .. }));
}

#[test]
fn test_derive_with_buf() {
    parsing::parsable_struct! {
        #[derive(Debug)]
        pub struct Header {
            [[param: u8 = buf_size]]
            something: u32,
            #[parse(sized_buf = buf_size)]
            s: Vec<u8>,
        }
    }

    const MSG: [u8; 10] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
    let mut bytes = [0_u8; 1 + 4 + MSG.len()];

    bytes[0] = MSG.len() as u8;
    bytes[1..5].copy_from_slice(&[5, 0, 0, 0]);
    bytes[5..].copy_from_slice(&MSG);

    let mut b = ByteCursor::new(&bytes);
    let h: Header = b.read_type_le().unwrap();
    assert_eq!(h.something, 5);
    assert_eq!(h.s, MSG);
}

#[test]
fn test_derive_with_collection() {
    parsing::parsable_struct! {
        #[derive(Debug)]
        pub struct Item {
            [[param: u8 = buf_size]]
            #[parse(sized_buf = buf_size)]
            buf: Vec<u8>,
        }
    }

    parsing::parsable_struct! {
        #[derive(Debug)]
        pub struct Header {
            [[param: u8 = num_items]]
            something: u32,
            #[parse(collection: Item = num_items)]
            items: Vec<Item>,
        }
    }

    const MSG: [u8; 17] = [
        3, 0, 0, 0, 0, //header
        5, 1, 2, 3, 4, 5, //item1
        1, 6, //item2
        3, 7, 8, 9, //item3
    ];

    let mut b = ByteCursor::new(&MSG);
    let h: Header = b.read_type_le().unwrap();
    assert_eq!(h.items.len(), 3);
    assert_eq!(h.items[0].buf, [1, 2, 3, 4, 5]);
    assert_eq!(h.items[1].buf, [6]);
    assert_eq!(h.items[2].buf, [7, 8, 9]);
    assert!(b.is_empty());
}

#[test]
fn test_derive_with_option() {
    parsing::parsable_struct! {
        #[derive(Debug)]
        pub struct Entry {
            flags: u16,
            #[parse(option_if: u32 = (flags & 1) != 0)]
            extra: Option<u32>,
            #[parse(string, option_if: String = (flags & 2) != 0)]
            name: Option<String>,
        }
    }

    let bytes = [0, 0];
    let mut b = ByteCursor::new(&bytes);
    let e: Entry = b.read_type_le().unwrap();
    assert_eq!(e.extra, None);
    assert_eq!(e.name, None);

    let bytes = [3, 0, 0x2A, 0, 0, 0, 2, 0, b'o', b'k'];
    let mut b = ByteCursor::new(&bytes);
    let e: Entry = b.read_type_le().unwrap();
    assert_eq!(e.extra, Some(42));
    assert_eq!(e.name.as_deref(), Some("ok"));
    assert!(b.is_empty());
}

#[test]
fn test_plain_derive() {
    #[derive(Debug, PartialEq, parsing::Parse)]
    struct Point {
        x: i32,
        y: i32,
    }

    let mut bytes = (-3_i32).to_le_bytes().to_vec();
    bytes.extend_from_slice(&4_i32.to_le_bytes());
    let mut b = ByteCursor::new(&bytes);
    let p: Point = b.read_type_le().unwrap();
    assert_eq!(p, Point { x: -3, y: 4 });
}
