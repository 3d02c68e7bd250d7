//! GHASH, the universal hash inside GCM.
//!
//! The whole MAC is one polynomial evaluation in GF(2^128):
//!
//! ```text
//! a0*h^(n+1) + ... + c0*h^2 + len*h
//! ```
//!
//! computed Horner-style as `tag = (tag + block) * h` over the associated
//! data, then the ciphertext, then a final block holding both bit lengths.
//! The streaming interface buffers partial blocks so callers can feed
//! ciphertext at whatever alignment they produce it; the zero-padding of the
//! last partial block happens in exactly one place (`finalize`), which the
//! forgery code in `recover` relies on matching.

use byteorder::{BigEndian, WriteBytesExt};
use thiserror::Error;

use crate::field::FieldElement;

pub const BLOCK_SIZE: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GhashError {
    #[error("update called after finalize")]
    AlreadyFinalized,
}

pub struct Ghash {
    auth_tag: FieldElement,
    auth_key: FieldElement,
    ad_bitlen: u64,
    ct_bitlen: u64,
    pending: Vec<u8>,
    finalized: bool,
}

impl Ghash {
    /// Start a hash under `auth_key`, absorbing all associated data up
    /// front. Ciphertext follows via `update`.
    pub fn new(associated_data: &[u8], auth_key: FieldElement) -> Ghash {
        let mut hasher = Ghash {
            auth_tag: FieldElement::ZERO,
            auth_key,
            ad_bitlen: associated_data.len() as u64 * 8,
            ct_bitlen: 0,
            pending: Vec::with_capacity(BLOCK_SIZE),
            finalized: false,
        };
        for block in associated_data.chunks(BLOCK_SIZE) {
            hasher.absorb(block);
        }
        hasher
    }

    /// Fold one block into the tag, zero-padding a short one.
    fn absorb(&mut self, block: &[u8]) {
        let mut padded = [0u8; BLOCK_SIZE];
        padded[..block.len()].copy_from_slice(block);
        self.auth_tag = (self.auth_tag + padded.into()) * self.auth_key;
    }

    fn extend(&mut self, ciphertext: &[u8]) {
        // The length block counts real ciphertext bits, never padding.
        self.ct_bitlen += ciphertext.len() as u64 * 8;
        self.pending.extend_from_slice(ciphertext);
        while self.pending.len() >= BLOCK_SIZE {
            let block: Vec<u8> = self.pending.drain(..BLOCK_SIZE).collect();
            self.absorb(&block);
        }
    }

    /// Feed more ciphertext. Whole blocks are absorbed immediately, the
    /// remainder waits in the pending buffer.
    pub fn update(&mut self, ciphertext: &[u8]) -> Result<(), GhashError> {
        if self.finalized {
            return Err(GhashError::AlreadyFinalized);
        }
        self.extend(ciphertext);
        Ok(())
    }

    /// Absorb the leftover partial block and the length block, and return
    /// the tag in GCM byte order. Idempotent; updates are rejected
    /// afterwards.
    pub fn finalize(&mut self) -> [u8; BLOCK_SIZE] {
        if !self.finalized {
            if !self.pending.is_empty() {
                let last = std::mem::take(&mut self.pending);
                self.absorb(&last);
            }

            let mut length = Vec::with_capacity(BLOCK_SIZE);
            length.write_u64::<BigEndian>(self.ad_bitlen).unwrap();
            length.write_u64::<BigEndian>(self.ct_bitlen).unwrap();
            self.absorb(&length);

            self.finalized = true;
        }
        self.auth_tag.to_gcm_bytes()
    }
}

/// One-shot GHASH over a complete ciphertext.
pub fn ghash(ciphertext: &[u8], associated_data: &[u8], auth_key: FieldElement) -> [u8; BLOCK_SIZE] {
    let mut hasher = Ghash::new(associated_data, auth_key);
    hasher.extend(ciphertext);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{thread_rng, Rng};

    /// The textbook evaluation: pad everything out to blocks, append the
    /// length block, then run the plain Horner recurrence.
    fn reference_ghash(ciphertext: &[u8], associated_data: &[u8], h: FieldElement) -> [u8; 16] {
        let mut blocks: Vec<FieldElement> = vec![];
        for data in [associated_data, ciphertext] {
            for chunk in data.chunks(16) {
                let mut padded = [0u8; 16];
                padded[..chunk.len()].copy_from_slice(chunk);
                blocks.push(padded.into());
            }
        }
        let mut length = [0u8; 16];
        length[..8].copy_from_slice(&(associated_data.len() as u64 * 8).to_be_bytes());
        length[8..].copy_from_slice(&(ciphertext.len() as u64 * 8).to_be_bytes());
        blocks.push(length.into());

        let mut tag = FieldElement::ZERO;
        for block in blocks {
            tag = (tag + block) * h;
        }
        tag.to_gcm_bytes()
    }

    #[test]
    fn known_vector() {
        // SP 800-38D test case 2: H for the all-zero key, one ciphertext
        // block, no associated data.
        let h = FieldElement::from_gcm_bytes(
            &hex::decode("66e94bd4ef8a2c3b884cfa59ca342b2e").unwrap(),
        )
        .unwrap();
        let ciphertext = hex::decode("0388dace60b6a392f328c2b971b2fe78").unwrap();

        assert_eq!(
            ghash(&ciphertext, &[], h).to_vec(),
            hex::decode("f38cbb1ad69223dcc3457ae5b6b0f885").unwrap()
        );
    }

    #[test]
    fn matches_reference_for_unaligned_lengths() {
        let mut rng = thread_rng();
        let h = FieldElement::random(&mut rng);
        for (ct_len, ad_len) in [(0, 0), (16, 0), (33, 7), (48, 20), (5, 16), (64, 64)] {
            let mut ciphertext = vec![0u8; ct_len];
            rng.fill(&mut ciphertext[..]);
            let mut associated_data = vec![0u8; ad_len];
            rng.fill(&mut associated_data[..]);

            assert_eq!(
                ghash(&ciphertext, &associated_data, h),
                reference_ghash(&ciphertext, &associated_data, h),
            );
        }
    }

    #[test]
    fn chunking_does_not_change_the_tag() {
        let mut rng = thread_rng();
        let h = FieldElement::random(&mut rng);
        let mut ciphertext = vec![0u8; 61];
        rng.fill(&mut ciphertext[..]);
        let associated_data = b"header";

        let whole = ghash(&ciphertext, associated_data, h);
        for chunk_size in [1, 3, 7, 16, 23] {
            let mut hasher = Ghash::new(associated_data, h);
            for chunk in ciphertext.chunks(chunk_size) {
                hasher.update(chunk).unwrap();
            }
            assert_eq!(hasher.finalize(), whole);
        }
    }

    #[test]
    fn update_after_finalize_is_rejected() {
        let mut rng = thread_rng();
        let mut hasher = Ghash::new(b"ad", FieldElement::random(&mut rng));
        hasher.update(b"some ciphertext").unwrap();
        let tag = hasher.finalize();

        assert_eq!(hasher.update(b"more"), Err(GhashError::AlreadyFinalized));
        // A second finalize is a no-op.
        assert_eq!(hasher.finalize(), tag);
    }
}
