//! AES-128-GCM encryption and tag generation.
//!
//! CTR mode for confidentiality, GHASH for authenticity. The counter chain
//! starts from `Y0`: for the common 12-byte nonce it is `nonce || 1`, for any
//! other length it is GHASH of the nonce itself. `E_K(Y0)` never touches the
//! plaintext; it is reserved as the mask XORed into the tag, which is exactly
//! the value the nonce-reuse attack in `recover` washes out.
//!
//! Encryption only. Decrypting (and verifying a tag) is somebody else's
//! problem, deliberately.

use anyhow::Result;
use byteorder::{BigEndian, ByteOrder};

use crate::cipher::{Aes128, BlockEncrypt};
use crate::field::FieldElement;
use crate::ghash::{ghash, Ghash, BLOCK_SIZE};

/// What the encryptor hands back: everything a receiver would see on the
/// wire. The tag is opaque to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionResult {
    pub ciphertext: Vec<u8>,
    pub associated_data: Vec<u8>,
    pub auth_tag: [u8; BLOCK_SIZE],
}

pub struct Encryptor<C: BlockEncrypt> {
    cipher: C,
    auth_key: FieldElement,
    y0: [u8; BLOCK_SIZE],
    tag_mask: [u8; BLOCK_SIZE],
    ghash: Ghash,
    keystream: [u8; BLOCK_SIZE],
    used: usize,
    counter: u32,
}

impl<C: BlockEncrypt> Encryptor<C> {
    pub fn new(cipher: C, nonce: &[u8], associated_data: &[u8]) -> Result<Encryptor<C>> {
        let auth_key = FieldElement::from(cipher.encrypt_block(&[0; BLOCK_SIZE])?);

        let y0 = if nonce.len() == 12 {
            let mut block = [0u8; BLOCK_SIZE];
            block[..12].copy_from_slice(nonce);
            block[15] = 1;
            block
        } else {
            ghash(nonce, &[], auth_key)
        };
        let tag_mask = cipher.encrypt_block(&y0)?;

        Ok(Encryptor {
            cipher,
            auth_key,
            y0,
            tag_mask,
            ghash: Ghash::new(associated_data, auth_key),
            keystream: [0; BLOCK_SIZE],
            // An exhausted buffer, so the first byte generates Y_1.
            used: BLOCK_SIZE,
            counter: 0,
        })
    }

    /// `Y_i`: `Y0` with its final 32-bit word incremented by `offset`,
    /// wrapping within that word only.
    fn counter_block(&self, offset: u32) -> [u8; BLOCK_SIZE] {
        let mut block = self.y0;
        let counter = BigEndian::read_u32(&block[12..]).wrapping_add(offset);
        BigEndian::write_u32(&mut block[12..], counter);
        block
    }

    fn keystream_byte(&mut self) -> Result<u8> {
        if self.used == BLOCK_SIZE {
            self.counter = self.counter.wrapping_add(1);
            self.keystream = self
                .cipher
                .encrypt_block(&self.counter_block(self.counter))?;
            self.used = 0;
        }
        let byte = self.keystream[self.used];
        self.used += 1;
        Ok(byte)
    }

    /// Encrypt the next stretch of plaintext, feeding the ciphertext into
    /// the tag computation.
    pub fn update(&mut self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut ciphertext = Vec::with_capacity(plaintext.len());
        for &byte in plaintext {
            ciphertext.push(byte ^ self.keystream_byte()?);
        }
        self.ghash.update(&ciphertext)?;
        Ok(ciphertext)
    }

    /// `T = GHASH(C, AD, H) ^ E_K(Y0)`.
    pub fn finalize(&mut self) -> [u8; BLOCK_SIZE] {
        let mut tag = self.ghash.finalize();
        for (t, m) in tag.iter_mut().zip(self.tag_mask) {
            *t ^= m;
        }
        tag
    }

    /// The first counter block, exposed for diagnostics.
    pub fn y0(&self) -> [u8; BLOCK_SIZE] {
        self.y0
    }

    /// The GHASH key `H = E_K(0^128)`, exposed for diagnostics.
    pub fn h(&self) -> FieldElement {
        self.auth_key
    }
}

/// One-shot AES-128-GCM encryption.
pub fn aes_128_gcm_encrypt(
    key: [u8; BLOCK_SIZE],
    nonce: &[u8],
    associated_data: &[u8],
    plaintext: &[u8],
) -> Result<EncryptionResult> {
    let mut encryptor = Encryptor::new(Aes128::new(key), nonce, associated_data)?;
    let ciphertext = encryptor.update(plaintext)?;
    Ok(EncryptionResult {
        ciphertext,
        associated_data: associated_data.to_vec(),
        auth_tag: encryptor.finalize(),
    })
}
