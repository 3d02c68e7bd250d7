//! The block-cipher boundary.
//!
//! Everything GCM needs from AES is "encrypt one block under a fixed key";
//! the mode never decrypts. Keeping that behind a trait keeps the key out of
//! the rest of the crate and lets tests substitute a toy cipher.

use anyhow::Result;
use openssl::symm::{Cipher, Crypter, Mode};

/// A 128-bit block cipher, encrypt direction only.
pub trait BlockEncrypt {
    fn encrypt_block(&self, block: &[u8; 16]) -> Result<[u8; 16]>;
}

/// AES-128 via openssl, driven block-at-a-time in ECB mode with padding
/// disabled.
pub struct Aes128 {
    key: [u8; 16],
}

impl Aes128 {
    pub fn new(key: [u8; 16]) -> Aes128 {
        Aes128 { key }
    }
}

impl BlockEncrypt for Aes128 {
    fn encrypt_block(&self, block: &[u8; 16]) -> Result<[u8; 16]> {
        let mut crypter = Crypter::new(Cipher::aes_128_ecb(), Mode::Encrypt, &self.key, None)?;
        crypter.pad(false);
        // Crypter insists on an extra block of headroom in the output.
        let mut out = vec![0u8; 32];
        let count = crypter.update(block, &mut out)?;
        anyhow::ensure!(count == 16, "expected one ECB block, got {count} bytes");
        Ok(out[..16].try_into()?)
    }
}
