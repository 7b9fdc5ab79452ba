mod common;

use aseprite_reader::{decode, decode_with, CelKind, DecodeOptions};
use common::*;
use proptest::prelude::*;

proptest! {
    #[test]
    fn frame_count_and_durations_survive(durations in prop::collection::vec(any::<u16>(), 0..12)) {
        let mut sprite = Sprite::new(32, 4, 4);
        for &duration in &durations {
            sprite = sprite.frame(duration, &[]);
        }
        let doc = decode(&sprite.to_bytes()).unwrap();
        prop_assert_eq!(doc.frames().len(), durations.len());
        let decoded: Vec<u16> = doc.frames().iter().map(|f| f.duration).collect();
        prop_assert_eq!(decoded, durations);
    }

    // each chunk advances exactly by its declared size, so whatever follows
    // an opaque chunk is still found
    #[test]
    fn chunks_advance_by_declared_size(
        bodies in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 0..6),
        name in "[a-z]{0,12}",
    ) {
        let mut chunks: Vec<Vec<u8>> = bodies.iter().map(|b| chunk(0x7F00, b)).collect();
        chunks.push(layer(0, &name, None));
        chunks.push(raw_cel(0, 1, 1, &[9, 8, 7, 6]));
        let doc = decode(&Sprite::new(32, 1, 1).frame(100, &chunks).to_bytes()).unwrap();
        prop_assert_eq!(&doc.layers()[0].name, &name);
        prop_assert_eq!(&doc.cel(0, 0).unwrap().payload[..], &[9, 8, 7, 6]);
        prop_assert_eq!(doc.frames()[0].chunk_count as usize, chunks.len());
    }

    #[test]
    fn linked_cels_match_their_source(
        pixels in prop::collection::vec(any::<u8>(), 1..32),
        links in 1_usize..6,
        compressed in any::<bool>(),
    ) {
        let width = pixels.len() as u16;
        let source = if compressed {
            compressed_cel(0, width, 1, &pixels)
        } else {
            raw_cel(0, width, 1, &pixels)
        };
        let mut sprite = Sprite::new(8, width, 1).frame(100, &[source]);
        for frame in 0..links {
            sprite = sprite.frame(100, &[linked_cel(0, frame as u16)]);
        }
        let doc = decode(&sprite.to_bytes()).unwrap();
        let source = doc.cel(0, 0).unwrap();
        for frame in 1..=links {
            let cel = doc.cel(frame, 0).unwrap();
            prop_assert_eq!(cel.kind, CelKind::Linked);
            prop_assert_eq!(cel.width, source.width);
            prop_assert_eq!(cel.height, source.height);
            prop_assert_eq!(&cel.payload, &source.payload);
        }
    }

    #[test]
    fn arbitrary_input_never_panics(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = decode(&data);
        let options = DecodeOptions { verify_magic: false, ..DecodeOptions::default() };
        let _ = decode_with(&data, &options);
    }

    #[test]
    fn corrupted_sprites_never_panic(index in 0_usize..400, value in any::<u8>()) {
        let mut data = Sprite::new(8, 2, 2)
            .frame(100, &[
                layer(0, "base", None),
                palette(&[([1, 2, 3, 4], Some("a")), ([5, 6, 7, 8], None)]),
                compressed_cel(0, 2, 2, &[1, 2, 3, 4]),
            ])
            .frame(50, &[linked_cel(0, 0)])
            .to_bytes();
        let index = index % data.len();
        data[index] = value;
        let _ = decode(&data);
    }
}
