//! Property tests for copy fidelity and reported lengths

use proptest::prelude::*;
use teeio::*;

fn charsets() -> impl Strategy<Value = Charset> {
    prop_oneof![
        Just(Charset::utf_8()),
        Just(Charset::utf_16le()),
        Just(Charset::utf_16be()),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_default_round_trip(text in "\\PC*") {
        let buffer = SharedBuffer::new();
        Tee::from_text(text.as_str(), buffer.clone()).consume().unwrap();
        prop_assert_eq!(Charset::utf_8().decode(&buffer.contents()), text);
    }

    #[test]
    fn prop_length_equals_encoded_size(text in "\\PC*", charset in charsets()) {
        let buffer = SharedBuffer::new();
        let length = Tee::from_text_with(text.as_str(), buffer.clone(), charset)
            .unwrap()
            .consume()
            .unwrap();
        let encoded = charset.encode(&text);
        prop_assert_eq!(length, encoded.len() as u64);
        prop_assert_eq!(buffer.contents(), encoded);
    }

    #[test]
    fn prop_name_equals_object(text in "\\PC{0,200}", charset in charsets()) {
        let by_object = SharedBuffer::new();
        let by_name = SharedBuffer::new();
        Tee::from_text_with(text.as_str(), by_object.clone(), charset).unwrap().consume().unwrap();
        Tee::from_text_with(text.as_str(), by_name.clone(), charset.name()).unwrap().consume().unwrap();
        prop_assert_eq!(by_object.contents(), by_name.contents());
    }

    #[test]
    fn prop_bytes_pass_through(data in proptest::collection::vec(any::<u8>(), 0..20_000), chunk in 1usize..512) {
        let buffer = SharedBuffer::new();
        let mut tee = Tee::from_bytes(data.clone(), buffer.clone())
            .with_options(TeeOptions::default().chunk_size(chunk));
        let mut seen = Vec::new();
        while let Some(piece) = tee.next_chunk().unwrap() {
            prop_assert!(piece.len() <= chunk);
            seen.extend(piece);
        }
        prop_assert_eq!(&seen, &data);
        prop_assert_eq!(buffer.contents(), data);
    }
}
