//! Client side: byte-by-byte CBC plaintext recovery against a remote
//! padding oracle.
//!
//! For byte index i (working right to left) we want the decrypted block to
//! end in the padding byte p = 16 - i. Bytes after i are already known, so
//! we force them to p; byte i sweeps all 256 candidates in a single batched
//! round trip. Whichever candidate the oracle accepts satisfies
//! D(C)[i] = candidate ^ p.
//!
//! The one wrinkle sits at i = 15: a padding byte of 1 validates no matter
//! what the rest of the block looks like, so a candidate might be
//! piggybacking on a longer run like ... 02 02. Re-probing the candidate
//! with every earlier byte forced to 0xff breaks any longer pattern while a
//! true trailing 01 still validates.

use std::io::{Read, Write};
use std::net::TcpStream;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use indicatif::ProgressBar;
use thiserror::Error;

use super::{Block, BLOCK_SIZE};

#[derive(Debug, Error)]
pub enum AttackError {
    #[error("ciphertext length {0} is not a positive multiple of the block size")]
    InvalidLength(usize),
    #[error("no candidate byte produced valid padding")]
    OracleFailure,
    #[error("oracle transport failed")]
    Transport(#[from] std::io::Error),
}

/// Demonstrates the padding-oracle attack against a TCP server.
pub struct PaddingOracleAttack {
    hostname: String,
    port: u16,
}

impl PaddingOracleAttack {
    pub fn new(hostname: &str, port: u16) -> PaddingOracleAttack {
        PaddingOracleAttack {
            hostname: hostname.to_string(),
            port,
        }
    }

    /// Recover the full plaintext for a ciphertext. Each block costs one
    /// oracle session; CBC then turns the recovered D(C) blocks into
    /// plaintext by XOR with the previous ciphertext block (the IV for the
    /// first).
    pub fn recover_plaintext(&self, iv: &Block, ciphertext: &[u8]) -> Result<Vec<u8>, AttackError> {
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(AttackError::InvalidLength(ciphertext.len()));
        }

        let progress = ProgressBar::new(ciphertext.len() as u64);
        let mut cleartext = Vec::with_capacity(ciphertext.len());
        let mut previous = *iv;
        for chunk in ciphertext.chunks(BLOCK_SIZE) {
            let mut block = [0u8; BLOCK_SIZE];
            block.copy_from_slice(chunk);

            let mut recovered = self.recover_raw_block(&block)?;
            for (byte, prev) in recovered.iter_mut().zip(previous) {
                *byte ^= prev;
            }
            cleartext.extend_from_slice(&recovered);

            previous = block;
            progress.inc(BLOCK_SIZE as u64);
        }
        progress.finish_and_clear();
        Ok(cleartext)
    }

    /// Recover D(C) for one ciphertext block over a fresh oracle session.
    /// This is not yet plaintext; CBC has not been applied.
    fn recover_raw_block(&self, block: &Block) -> Result<Block, AttackError> {
        let mut oracle = TcpStream::connect((self.hostname.as_str(), self.port))?;
        oracle.write_all(block)?;

        let mut raw_recovered = [0u8; BLOCK_SIZE];
        for index in (0..BLOCK_SIZE).rev() {
            let byte = self.recover_byte(&mut oracle, index, &raw_recovered)?;
            raw_recovered[index] = byte;
        }
        oracle.write_u16::<LittleEndian>(0)?;
        Ok(raw_recovered)
    }

    /// Recover D(C) at `index`. All bytes after `index` in `raw_recovered`
    /// must already hold valid recovered values.
    fn recover_byte(
        &self,
        oracle: &mut TcpStream,
        index: usize,
        raw_recovered: &Block,
    ) -> Result<u8, AttackError> {
        // One batch of every possible byte value.
        oracle.write_u16::<LittleEndian>(256)?;

        let padding_byte = (BLOCK_SIZE - index) as u8;
        let mut payload = [0u8; BLOCK_SIZE];
        // Pin the already-recovered tail to the target padding value.
        for i in index + 1..BLOCK_SIZE {
            payload[i] = padding_byte ^ raw_recovered[i];
        }

        for candidate in 0..=255u8 {
            payload[index] = candidate;
            oracle.write_all(&payload)?;
        }

        let mut responses = [0u8; 256];
        oracle.read_exact(&mut responses)?;

        for candidate in 0..=255u8 {
            let mut valid_padding = responses[candidate as usize] == 1;
            if valid_padding && padding_byte == 1 {
                // Could be a longer padding run in disguise; scorch the rest
                // of the block and ask again.
                let mut validator = [0xff_u8; BLOCK_SIZE];
                validator[BLOCK_SIZE - 1] = candidate;
                oracle.write_u16::<LittleEndian>(1)?;
                oracle.write_all(&validator)?;
                valid_padding = oracle.read_u8()? == 1;
            }
            if valid_padding {
                return Ok(candidate ^ padding_byte);
            }
        }
        Err(AttackError::OracleFailure)
    }
}
