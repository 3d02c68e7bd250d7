//! Small byte-wrangling helpers shared by the demos and tests.

use base64::{engine::general_purpose, Engine as _};

/// XOR `a` against `mask`, repeating the mask when it runs short.
pub fn xor_bytes(a: &[u8], mask: &[u8]) -> Vec<u8> {
    a.iter()
        .enumerate()
        .map(|(i, &byte)| byte ^ mask[i % mask.len()])
        .collect()
}

/// PKCS#7: always appends at least one byte, so aligned input grows by a
/// whole block.
pub fn pkcs7_pad(input: &[u8], block: usize) -> Vec<u8> {
    let fill = block - input.len() % block;
    let mut padded = input.to_vec();
    padded.resize(input.len() + fill, fill as u8);
    padded
}

pub fn bytes_to_b64_str(input: &[u8]) -> String {
    general_purpose::STANDARD.encode(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xor_cycles_the_shorter_input() {
        assert_eq!(xor_bytes(&[1, 2, 3, 4], &[1]), vec![0, 3, 2, 5]);
        assert_eq!(xor_bytes(&[0xff, 0x00], &[0x0f, 0xf0]), vec![0xf0, 0xf0]);
    }

    #[test]
    fn pad_test() {
        let input = b"YELLOW SUBMARINE";
        let target = b"YELLOW SUBMARINE\x04\x04\x04\x04";

        assert_eq!(&pkcs7_pad(input, 20), target);
        // A block-aligned input still gains a full block of padding
        assert_eq!(pkcs7_pad(input, 16).len(), 32);
    }
}
