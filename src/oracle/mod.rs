//! The CBC padding-oracle attack, client and server side.
//!
//! The wire protocol, per fresh TCP connection:
//!
//! 1. client: 16 bytes of target ciphertext
//! 2. while count > 0:
//!    1. client: u16 little-endian count
//!    2. client: count * 16-byte Q blocks
//!    3. server: count bytes, 1 where the Q block produced valid PKCS#7
//!       padding, 0 otherwise
//!
//! A count of zero ends the session. No further framing, no checksums;
//! transport errors surface as read/write failures.

pub mod attack;
pub mod server;

pub use attack::{AttackError, PaddingOracleAttack};
pub use server::XorCbcServer;

pub const BLOCK_SIZE: usize = 16;

pub type Block = [u8; BLOCK_SIZE];
