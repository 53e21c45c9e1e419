//! Consistent Overhead Byte Stuffing.
//!
//! Encoding replaces every `0x00` with a length prefix so the output is free
//! of the frame delimiter. A run of 254 non-zero bytes is emitted as a full
//! block (`0xFF` code) with no implied zero.
//!
//! ```text
//! 11 22 00 33  ->  03 11 22 02 33
//! ```

use heapless::Vec;

use crate::error::CobsError;

/// Longest run of non-zero bytes covered by one code byte.
pub const MAX_BLOCK_SIZE: usize = 254;

const FULL_BLOCK_CODE: u8 = 0xFF;

/// Worst-case encoded size for an input of `len` bytes.
pub const fn max_encoded_size(len: usize) -> usize {
    len + len / MAX_BLOCK_SIZE + 1
}

/// Encode `input` into `output`, replacing its previous contents.
///
/// Fails with [`CobsError::OutOfBounds`] when `output` cannot hold
/// [`max_encoded_size`] of the input; `output` is left empty in that case.
pub fn encode<const N: usize>(input: &[u8], output: &mut Vec<u8, N>) -> Result<(), CobsError> {
    output.clear();
    let needed = max_encoded_size(input.len());
    if needed > N {
        return Err(CobsError::OutOfBounds {
            needed,
            capacity: N,
        });
    }
    output
        .resize(needed, 0)
        .map_err(|_| CobsError::OutOfBounds {
            needed,
            capacity: N,
        })?;

    let encoded = output.as_mut_slice();
    let mut write_index = 1;
    let mut code_index = 0;
    let mut code: u8 = 1;

    for &byte in input {
        if byte == 0 {
            encoded[code_index] = code;
            code = 1;
            code_index = write_index;
            write_index += 1;
            continue;
        }

        encoded[write_index] = byte;
        write_index += 1;
        code += 1;

        if code == FULL_BLOCK_CODE {
            encoded[code_index] = code;
            code = 1;
            code_index = write_index;
            write_index += 1;
        }
    }
    encoded[code_index] = code;

    output.truncate(write_index);
    Ok(())
}

/// Decode `input` into `output`, replacing its previous contents.
///
/// An empty input decodes to an empty output. On error `output` is left
/// empty.
pub fn decode<const N: usize>(input: &[u8], output: &mut Vec<u8, N>) -> Result<(), CobsError> {
    output.clear();
    let result = decode_into(input, output);
    if result.is_err() {
        output.clear();
    }
    result
}

fn decode_into<const N: usize>(input: &[u8], output: &mut Vec<u8, N>) -> Result<(), CobsError> {
    let mut read_index = 0;

    while read_index < input.len() {
        let code = input[read_index];
        let block_end = read_index + usize::from(code);
        if block_end > input.len() && code != 1 {
            return Err(CobsError::Malformed { offset: read_index });
        }
        read_index += 1;

        if code > 1 {
            output
                .extend_from_slice(&input[read_index..block_end])
                .map_err(|_| CobsError::Overflow { capacity: N })?;
            read_index = block_end;
        }

        if code != FULL_BLOCK_CODE && read_index != input.len() {
            output
                .push(0)
                .map_err(|_| CobsError::Overflow { capacity: N })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded<const N: usize>(input: &[u8]) -> Vec<u8, N> {
        let mut out = Vec::new();
        encode(input, &mut out).unwrap();
        out
    }

    fn decoded<const N: usize>(input: &[u8]) -> Vec<u8, N> {
        let mut out = Vec::new();
        decode(input, &mut out).unwrap();
        out
    }

    #[test]
    fn test_encode_known_vectors() {
        assert_eq!(encoded::<8>(b"").as_slice(), b"\x01");
        assert_eq!(encoded::<8>(b"\x00").as_slice(), b"\x01\x01");
        assert_eq!(encoded::<8>(b"\x00\x00").as_slice(), b"\x01\x01\x01");
        assert_eq!(
            encoded::<8>(b"\x11\x22\x00\x33").as_slice(),
            b"\x03\x11\x22\x02\x33"
        );
        assert_eq!(
            encoded::<8>(b"\x11\x22\x33\x44").as_slice(),
            b"\x05\x11\x22\x33\x44"
        );
        assert_eq!(
            encoded::<8>(b"\x11\x00\x00\x00").as_slice(),
            b"\x02\x11\x01\x01\x01"
        );
        assert_eq!(
            encoded::<8>(b"\x6e\xd7\xf1\x00\xf7\xab").as_slice(),
            b"\x04\x6e\xd7\xf1\x03\xf7\xab"
        );
        assert_eq!(
            encoded::<16>(b"Hello World").as_slice(),
            b"\x0cHello World"
        );
    }

    #[test]
    fn test_encode_253_bytes() {
        let input = [10u8; 253];
        let out = encoded::<256>(&input);
        assert_eq!(out.len(), 254);
        assert_eq!(out[0], 0xFE);
        assert!(out[1..].iter().all(|&b| b == 10));
    }

    #[test]
    fn test_encode_trailing_zero() {
        let mut input = [10u8; 253];
        input[252] = 0;
        let out = encoded::<256>(&input);
        assert_eq!(out.len(), 254);
        assert_eq!(out[0], 0xFD);
        assert!(out[1..253].iter().all(|&b| b == 10));
        assert_eq!(out[253], 0x01);
    }

    #[test]
    fn test_encode_full_block() {
        let input = [10u8; 254];
        let out = encoded::<256>(&input);
        assert_eq!(out.len(), 256);
        assert_eq!(out[0], 0xFF);
        assert!(out[1..255].iter().all(|&b| b == 10));
        assert_eq!(out[255], 0x01);
    }

    #[test]
    fn test_encode_past_full_block() {
        let input = [10u8; 255];
        let out = encoded::<257>(&input);
        assert_eq!(out.len(), 257);
        assert_eq!(out[0], 0xFF);
        assert_eq!(out[255], 0x02);
        assert_eq!(out[256], 10);
    }

    #[test]
    fn test_encode_output_too_small() {
        let mut out: Vec<u8, 4> = Vec::new();
        let err = encode(b"\x01\x02\x03\x04", &mut out).unwrap_err();
        assert_eq!(
            err,
            CobsError::OutOfBounds {
                needed: 5,
                capacity: 4
            }
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_encode_exact_capacity() {
        let mut out: Vec<u8, 5> = Vec::new();
        encode(b"\x01\x02\x03\x04", &mut out).unwrap();
        assert_eq!(out.as_slice(), b"\x05\x01\x02\x03\x04");
    }

    #[test]
    fn test_encoded_output_has_no_delimiter() {
        let input: std::vec::Vec<u8> = (0..=255u8).cycle().take(600).collect();
        let out = encoded::<700>(&input);
        assert!(!out.contains(&0));
    }

    #[test]
    fn test_decode_known_vectors() {
        assert!(decoded::<8>(b"").is_empty());
        assert_eq!(decoded::<8>(b"\x01").as_slice(), b"");
        assert_eq!(decoded::<8>(b"\x01\x01").as_slice(), b"\x00");
        assert_eq!(decoded::<8>(b"\x01\x01\x01").as_slice(), b"\x00\x00");
        assert_eq!(
            decoded::<8>(b"\x03\x11\x22\x02\x33").as_slice(),
            b"\x11\x22\x00\x33"
        );
        assert_eq!(
            decoded::<8>(b"\x05\x11\x22\x33\x44").as_slice(),
            b"\x11\x22\x33\x44"
        );
        assert_eq!(decoded::<8>(b"\x02x").as_slice(), b"x");
        assert_eq!(decoded::<8>(b"\x03xy").as_slice(), b"xy");
        assert_eq!(
            decoded::<16>(b"\x0cHello World").as_slice(),
            b"Hello World"
        );
    }

    #[test]
    fn test_decode_replaces_previous_contents() {
        let mut out: Vec<u8, 8> = Vec::from_slice(b"\x01\x02\x03").unwrap();
        decode(b"\x03\x9f\x8c\x01\x03\x21\xe8", &mut out).unwrap();
        assert_eq!(out.as_slice(), b"\x9f\x8c\x00\x00\x21\xe8");
    }

    #[test]
    fn test_decode_full_block() {
        let mut input = [10u8; 256];
        input[0] = 0xFF;
        input[255] = 0x01;
        let out = decoded::<254>(&input);
        assert_eq!(out.len(), 254);
        assert!(out.iter().all(|&b| b == 10));
    }

    #[test]
    fn test_decode_malformed_length_byte() {
        let mut out: Vec<u8, 8> = Vec::new();
        let err = decode(b"\x05\x11\x22", &mut out).unwrap_err();
        assert_eq!(err, CobsError::Malformed { offset: 0 });
        assert!(out.is_empty());
    }

    #[test]
    fn test_decode_output_overflow() {
        let mut input = [10u8; 257];
        input[0] = 0xFF;
        input[255] = 0x02;
        let mut out: Vec<u8, 254> = Vec::new();
        let err = decode(&input, &mut out).unwrap_err();
        assert_eq!(err, CobsError::Overflow { capacity: 254 });
        assert!(out.is_empty());
    }

    #[test]
    fn test_roundtrip_up_to_capacity() {
        for len in [0usize, 1, 2, 100, 253, 254] {
            let input: std::vec::Vec<u8> = (0..len).map(|i| (i % 7) as u8).collect();
            let enc = encoded::<256>(&input);
            let dec = decoded::<254>(&enc);
            assert_eq!(dec.as_slice(), input.as_slice(), "length {len}");
        }
    }
}
