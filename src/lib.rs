//! A cryptanalysis toolbox around AES-GCM.
//!
//! The load-bearing pieces are the algebra: GF(2^128) with GCM's reduction
//! polynomial (`field`), the polynomial ring over it (`poly`), and a
//! Cantor-Zassenhaus root finder (`factor`). On top sit the GCM pipeline
//! itself (`ghash`, `cipher`, `gcm`), the nonce-reuse auth-tag forgery
//! (`recover`), and a CBC padding-oracle client and server (`oracle`).
//!
//! Attacks only: encryption and tag *generation* are implemented because
//! the forgeries need them; nothing here verifies a tag or decrypts GCM.

pub mod cipher;
pub mod factor;
pub mod field;
pub mod gcm;
pub mod ghash;
pub mod oracle;
pub mod poly;
pub mod recover;
pub mod utils;
