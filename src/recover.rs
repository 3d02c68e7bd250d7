//! Recovering the GHASH key from a repeated nonce, and forging tags with it.
//!
//! Two messages under the same (key, nonce) share the mask E_K(Y0). Writing
//! each tag as the GHASH polynomial evaluated at the auth key H plus that
//! mask, the XOR of the two equations washes the mask out and leaves a known
//! polynomial with H among its roots. Factoring it hands us a short list of
//! candidates; a third tagged message picks the real one, and from there any
//! ciphertext gets a valid tag.

use rand::Rng;
use thiserror::Error;

use crate::factor::zeros;
use crate::field::FieldElement;
use crate::gcm::EncryptionResult;
use crate::ghash::{ghash, BLOCK_SIZE};
use crate::poly::Polynomial;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecoveryError {
    #[error("no auth key candidate matched; inputs inconsistent or nonce not reused")]
    NoCandidates,
    #[error("multiple auth key candidates validate the reference message")]
    AmbiguousRecovery,
}

/// The GHASH input sequence as field elements: associated data first, then
/// ciphertext, each block zero-padded, then the length block. Element `j`
/// of the result is multiplied by H^(len - j) during hashing.
pub fn ghash_coefficients(ciphertext: &[u8], associated_data: &[u8]) -> Vec<FieldElement> {
    let mut blocks = vec![];
    for data in [associated_data, ciphertext] {
        for chunk in data.chunks(BLOCK_SIZE) {
            let mut padded = [0u8; BLOCK_SIZE];
            padded[..chunk.len()].copy_from_slice(chunk);
            blocks.push(padded.into());
        }
    }

    let mut length = [0u8; BLOCK_SIZE];
    length[..8].copy_from_slice(&(associated_data.len() as u64 * 8).to_be_bytes());
    length[8..].copy_from_slice(&(ciphertext.len() as u64 * 8).to_be_bytes());
    blocks.push(length.into());
    blocks
}

/// Build f with f(H) = 0 from two messages encrypted under the same
/// (key, nonce). Each message contributes its own GHASH polynomial, with
/// block `j` of `n` at X^(n - j); the XOR of the two tags lands in the
/// constant term. Messages of different lengths simply overlap where their
/// exponents do.
pub fn forgery_poly(msg1: &EncryptionResult, msg2: &EncryptionResult) -> Polynomial {
    let mut f = Polynomial::zero();
    *f.coefficient_mut(0) =
        FieldElement::from(msg1.auth_tag) + FieldElement::from(msg2.auth_tag);

    for msg in [msg1, msg2] {
        let blocks = ghash_coefficients(&msg.ciphertext, &msg.associated_data);
        let count = blocks.len();
        for (j, block) in blocks.into_iter().enumerate() {
            *f.coefficient_mut(count - j) += block;
        }
    }
    f.ensure_normalized();
    f
}

/// The E_K(Y0) mask a candidate auth key implies for a tagged message.
fn auth_tag_mask(msg: &EncryptionResult, auth_key: FieldElement) -> [u8; BLOCK_SIZE] {
    let mut mask = ghash(&msg.ciphertext, &msg.associated_data, auth_key);
    for (m, t) in mask.iter_mut().zip(msg.auth_tag) {
        *m ^= t;
    }
    mask
}

/// The tag `auth_key` would produce for (ciphertext, associated_data),
/// given the mask implied by `reference`.
fn gen_auth_tag(
    reference: &EncryptionResult,
    ciphertext: &[u8],
    associated_data: &[u8],
    auth_key: FieldElement,
) -> [u8; BLOCK_SIZE] {
    let mut tag = ghash(ciphertext, associated_data, auth_key);
    for (t, m) in tag.iter_mut().zip(auth_tag_mask(reference, auth_key)) {
        *t ^= m;
    }
    tag
}

/// Forge the auth tag for (ciphertext, associated_data), given three tagged
/// messages all encrypted under one repeated (key, nonce). The first two
/// yield the candidate auth keys, the third selects the unique candidate
/// that reproduces its tag.
pub fn recover_auth_tag(
    msg1: &EncryptionResult,
    msg2: &EncryptionResult,
    msg3: &EncryptionResult,
    ciphertext: &[u8],
    associated_data: &[u8],
    rng: &mut impl Rng,
) -> Result<[u8; BLOCK_SIZE], RecoveryError> {
    let f = forgery_poly(msg1, msg2);
    let candidates = zeros(f, rng);

    let mut survivors = candidates
        .into_iter()
        .filter(|&h| gen_auth_tag(msg1, &msg3.ciphertext, &msg3.associated_data, h) == msg3.auth_tag);

    let auth_key = survivors.next().ok_or(RecoveryError::NoCandidates)?;
    if survivors.next().is_some() {
        return Err(RecoveryError::AmbiguousRecovery);
    }

    Ok(gen_auth_tag(msg1, ciphertext, associated_data, auth_key))
}
