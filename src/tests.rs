use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rand::{Rng, RngCore};

use crate::{DecodeError, Engine, Kernel, decode, decode_strict, encode, scalar};

fn engines() -> Vec<Engine> {
    Kernel::available().into_iter().map(Engine::new).collect()
}

#[test]
fn test_encode_decode_empty() {
    assert_eq!(encode(b""), "");
    assert_eq!(decode(b"").unwrap(), b"");
    assert_eq!(decode_strict(b"").unwrap(), b"");
}

#[test]
fn test_encode_decode_hello_world() {
    let data = b"Hello, World!";
    let encoded = encode(data);
    assert_eq!(encoded, "SGVsbG8sIFdvcmxkIQ==");
    assert_eq!(decode_strict(encoded.as_bytes()).unwrap(), data);
}

#[test]
fn test_matches_reference_for_every_short_length() {
    let data: Vec<u8> = (0..300).map(|i| (i * 13 + 5) as u8).collect();
    for engine in engines() {
        for len in 0..300 {
            let input = &data[..len];
            let expected = STANDARD.encode(input);
            let encoded = engine.encode(input);
            assert_eq!(encoded, expected, "{} len {}", engine.kernel(), len);
            assert_eq!(engine.decode_strict(encoded.as_bytes()).unwrap(), input);
            assert_eq!(engine.decode(encoded.as_bytes()).unwrap(), input);
        }
    }
}

#[test]
fn test_matches_reference_on_random_input() {
    let mut rng = rand::rng();
    for _ in 0..50 {
        let len = rng.random_range(0..20_000);
        let mut data = vec![0u8; len];
        rng.fill_bytes(&mut data);
        let expected = STANDARD.encode(&data);
        for engine in engines() {
            let encoded = engine.encode(&data);
            assert_eq!(encoded, expected, "{} len {}", engine.kernel(), len);
            assert_eq!(engine.decode_strict(encoded.as_bytes()).unwrap(), data);
        }
    }
}

#[test]
fn test_encode_is_total_over_byte_values_and_positions() {
    for engine in engines() {
        for pos in 0..48 {
            for value in 0..=255u8 {
                let mut data = [0x3Cu8; 96];
                data[pos] = value;
                let encoded = engine.encode(&data);
                assert_eq!(encoded, STANDARD.encode(data), "{} pos {}", engine.kernel(), pos);
            }
        }
    }
}

#[test]
fn test_every_kernel_produces_identical_output() {
    let mut data = vec![0u8; 4099];
    rand::rng().fill_bytes(&mut data);
    let reference = scalar::encode(&data, true);
    for engine in engines() {
        assert_eq!(engine.encode_with_newline(&data, true), reference, "{}", engine.kernel());
    }
}

#[test]
fn test_strict_decode_rejects_what_reference_rejects() {
    let valid = STANDARD.encode([0xC3u8; 200]);
    for engine in engines() {
        for pos in [0, 17, 63, 64, 150, valid.len() - 1] {
            for bad in [b'*', b'-', b'_', b' ', 0x00, 0x80, 0xFF] {
                let mut text = valid.clone().into_bytes();
                text[pos] = bad;
                assert!(STANDARD.decode(&text).is_err());
                assert_eq!(
                    engine.decode_strict(&text),
                    Err(DecodeError::InvalidCharacter {
                        byte: bad,
                        position: pos
                    }),
                    "{} pos {}",
                    engine.kernel(),
                    pos
                );
            }
        }
    }
}

#[test]
fn test_lenient_decode_ignores_interleaved_junk() {
    let mut data = vec![0u8; 1000];
    rand::rng().fill_bytes(&mut data);
    let clean = STANDARD.encode(&data);
    let mut noisy = Vec::new();
    for (i, c) in clean.bytes().enumerate() {
        noisy.push(c);
        if i % 37 == 0 {
            noisy.extend_from_slice(b" \n\t!");
        }
    }
    for engine in engines() {
        assert_eq!(engine.decode(&noisy).unwrap(), data);
    }
}

#[test]
fn test_padding_inside_first_block_stops_lenient_decode() {
    // "TQ==" completes a quad; everything after it is ignored
    let mut text = b"TQ==".to_vec();
    text.extend_from_slice(STANDARD.encode([9u8; 96]).as_bytes());
    for engine in engines() {
        assert_eq!(engine.decode(&text).unwrap(), b"M");
        assert_eq!(
            engine.decode_strict(&text),
            Err(DecodeError::ExcessData { position: 4 })
        );
    }
}
