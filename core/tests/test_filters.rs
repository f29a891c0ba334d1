#[cfg(test)]
mod tests {
    use samplink_core::codec::{compress, decompress, Encoder};
    use samplink_core::constants::tags::{COMPRESS_START, COMPRESS_STOP};
    use samplink_core::constants::{CODE_BITS, TERMINATOR_CODE};
    use samplink_core::filters::{
        CompressionFilter, DecompressionFilter, ErrorFilter, Filter, FilterChain, FilterError, TagDetector,
    };

    fn framed(payload: &[u8]) -> Vec<u8> {
        let mut wire = COMPRESS_START.to_vec();
        wire.extend_from_slice(&compress(payload));
        wire.extend_from_slice(COMPRESS_STOP);
        wire
    }

    /// Pack codes MSB-first, zero padded, the way the encoder lays them out.
    fn pack(codes: &[u16]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut acc = 0u32;
        let mut bits = 0u32;
        for &code in codes {
            acc = (acc << CODE_BITS) | code as u32;
            bits += CODE_BITS as u32;
            while bits >= 8 {
                bits -= 8;
                out.push((acc >> bits) as u8);
            }
            acc &= (1 << bits) - 1;
        }
        if bits > 0 {
            out.push((acc << (8 - bits)) as u8);
        }
        out
    }

    #[test]
    fn delimiter_framing_yields_payload_only() {
        let payload = b"\x01\x01\x01\x02\x02\x03\x03\x03\x03 <cmp> inside payload".repeat(40);
        let mut chain = FilterChain::new();
        chain.add_filter(DecompressionFilter::new());
        chain.write_all(&framed(&payload)).unwrap();
        assert_eq!(chain.drain().as_ref(), payload.as_slice());
    }

    #[test]
    fn delimiter_framing_byte_by_byte() {
        let payload = b"hello hello hello".to_vec();
        let mut chain = FilterChain::new();
        chain.add_filter(DecompressionFilter::new());
        for b in framed(&payload) {
            chain.write(b).unwrap();
        }
        assert_eq!(chain.drain().as_ref(), payload.as_slice());
    }

    #[test]
    fn consecutive_regions_use_fresh_dictionaries() {
        let mut wire = framed(b"first region first region");
        wire.extend_from_slice(b"|plain|");
        wire.extend_from_slice(&framed(b"second"));

        let mut chain = FilterChain::new();
        chain.add_filter(DecompressionFilter::new());
        chain.write_all(&wire).unwrap();
        assert_eq!(chain.drain().as_ref(), b"first region first region|plain|second");
    }

    #[test]
    fn false_start_of_start_tag_is_preserved() {
        let input = b"<c<cm<cmx>abc</cmp>";
        let mut chain = FilterChain::new();
        chain.add_filter(DecompressionFilter::new());
        chain.write_all(input).unwrap();
        // Outside a region the stop tag is plain data.
        assert_eq!(chain.drain().as_ref(), input);
    }

    #[test]
    fn error_extraction_then_rest_forwarded() {
        let mut chain = FilterChain::new();
        chain.add_filter(ErrorFilter::new());

        let err = chain.write_all(b"<err>boom</err>").unwrap_err();
        assert_eq!(err, FilterError::Protocol { message: "boom".into() });
        assert!(err.is_recoverable());
        assert!(!chain.data_ready());

        chain.write_all(b"rest").unwrap();
        assert_eq!(chain.drain().as_ref(), b"rest");
    }

    #[test]
    fn error_and_data_in_one_burst() {
        let mut chain = FilterChain::new();
        chain.add_filter(ErrorFilter::new());
        let err = chain.write_all(b"ab<err>boom</err>rest").unwrap_err();
        assert_eq!(err, FilterError::Protocol { message: "boom".into() });
        assert_eq!(chain.drain().as_ref(), b"abrest");
    }

    #[test]
    fn false_start_of_error_tag_is_preserved() {
        let mut chain = FilterChain::new();
        chain.add_filter(ErrorFilter::new());
        chain.write_all(b"<e<er<err!x").unwrap();
        assert_eq!(chain.drain().as_ref(), b"<e<er<err!x");
    }

    #[test]
    fn session_order_error_then_decompression() {
        let mut wire = b"<err>no trigger</err>".to_vec();
        wire.extend_from_slice(&framed(b"samples samples samples"));

        let mut chain = FilterChain::new();
        chain.add_filter(ErrorFilter::new()).add_filter(DecompressionFilter::new());
        let err = chain.write_all(&wire).unwrap_err();
        assert_eq!(err, FilterError::Protocol { message: "no trigger".into() });
        assert_eq!(chain.drain().as_ref(), b"samples samples samples");
    }

    #[test]
    fn corrupt_region_is_fatal() {
        let mut wire = COMPRESS_START.to_vec();
        wire.extend_from_slice(&[0xFF, 0xF0, 0x00]);

        let mut chain = FilterChain::new();
        chain.add_filter(DecompressionFilter::new());
        let err = chain.write_all(&wire).unwrap_err();
        assert!(!err.is_recoverable());
        assert!(matches!(err, FilterError::Codec(_)));
    }

    #[test]
    fn output_before_corrupt_region_is_kept() {
        let mut chain = FilterChain::new();
        chain.add_filter(DecompressionFilter::new());
        let err = chain.write_all(b"abc<cmp>\xFF\xF0").unwrap_err();
        assert!(matches!(err, FilterError::Codec(_)));
        assert_eq!(chain.drain().as_ref(), b"abc");

        // The stop tag still closes the broken region.
        chain.write_all(b"junk</cmp>hello").unwrap();
        assert_eq!(chain.drain().as_ref(), b"hello");
    }

    #[test]
    fn corrupt_region_and_trailing_data_in_one_burst() {
        let mut chain = FilterChain::new();
        chain.add_filter(DecompressionFilter::new());
        let err = chain.write_all(b"abc<cmp>\xFF\xF0</cmp>hello").unwrap_err();
        assert!(matches!(err, FilterError::Codec(_)));
        assert_eq!(chain.drain().as_ref(), b"abchello");
    }

    #[test]
    fn stop_tag_false_start_inside_payload() {
        // 4001 zero literals push the next codes to a bit offset where
        // 0, 30, 758, 1666 pack into the bytes "</cA".
        let mut codes = vec![0u16; 4001];
        codes.extend_from_slice(&[0, 30, 758, 1666, TERMINATOR_CODE]);
        let payload = pack(&codes);
        assert!(payload.windows(4).any(|w| w == b"</cA"));
        assert!(!payload.windows(COMPRESS_STOP.len()).any(|w| w == COMPRESS_STOP));

        // Every entry built from a zero run is "\0\0".
        let mut expected = vec![0u8; 4002];
        expected.push(30);
        expected.extend_from_slice(&[0; 4]);
        assert_eq!(decompress(&payload).unwrap(), expected);

        let mut wire = b"pre".to_vec();
        wire.extend_from_slice(COMPRESS_START);
        wire.extend_from_slice(&payload);
        wire.extend_from_slice(COMPRESS_STOP);
        wire.extend_from_slice(b"post");

        let mut chain = FilterChain::new();
        chain.add_filter(DecompressionFilter::new());
        chain.write_all(&wire).unwrap();

        let mut want = b"pre".to_vec();
        want.extend_from_slice(&expected);
        want.extend_from_slice(b"post");
        assert_eq!(chain.drain().as_ref(), want.as_slice());

        // Byte at a time takes the same path.
        let mut chain = FilterChain::new();
        chain.add_filter(DecompressionFilter::new());
        for &b in &wire {
            chain.write(b).unwrap();
        }
        assert_eq!(chain.drain().as_ref(), want.as_slice());
    }

    #[test]
    fn compression_then_decompression_round_trip() {
        let payload = b"0101010101010101 steady steady steady".repeat(20);

        let mut out_chain = FilterChain::new();
        out_chain.add_filter(CompressionFilter::enabled());
        out_chain.write_all(&payload).unwrap();
        out_chain.flush().unwrap();
        let wire = out_chain.drain();
        assert!(wire.starts_with(COMPRESS_START));
        assert!(wire.ends_with(COMPRESS_STOP));

        let mut in_chain = FilterChain::new();
        in_chain.add_filter(DecompressionFilter::new());
        in_chain.write_all(&wire).unwrap();
        assert_eq!(in_chain.drain().as_ref(), payload.as_slice());
    }

    #[test]
    fn compression_mode_toggles_inside_chain() {
        let filter = CompressionFilter::new();
        let mode = filter.mode();
        let mut chain = FilterChain::new();
        chain.add_filter(filter);

        chain.write_all(b"plain-").unwrap();
        mode.set_enabled(true);
        chain.write_all(b"packed").unwrap();
        mode.set_enabled(false);
        chain.write_all(b"-plain").unwrap();

        let mut expected = b"plain-".to_vec();
        let mut enc = Encoder::new();
        expected.extend_from_slice(COMPRESS_START);
        enc.encode_all(b"packed", &mut expected);
        enc.finish(&mut expected);
        expected.extend_from_slice(COMPRESS_STOP);
        expected.extend_from_slice(b"-plain");
        assert_eq!(chain.drain().as_ref(), expected.as_slice());
    }

    #[test]
    fn detector_instances_are_independent() {
        let mut a = TagDetector::new();
        let mut b = TagDetector::new();
        let mut sink = |_: u8| Ok::<(), ()>(());
        assert_eq!(a.matches(b"<err>", b'<', &mut sink), Ok(true));
        assert_eq!(b.matches(b"<err>", b'x', &mut sink), Ok(false));
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 0);
    }

    #[test]
    fn filter_names() {
        assert_eq!(ErrorFilter::new().name(), "error");
        assert_eq!(DecompressionFilter::new().name(), "decompression");
        assert_eq!(CompressionFilter::new().name(), "compression");
    }
}
