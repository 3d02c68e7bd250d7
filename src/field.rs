//! Arithmetic in GF(2^128) as used by GCM.
//!
//! Elements are polynomials over GF(2) reduced by x^128 + x^7 + x^2 + x + 1.
//! Addition is XOR, multiplication is a carry-less multiply followed by
//! reduction, and inversion falls out of Lagrange: a^(2^128 - 2) = a^(-1).
//!
//! The bit layout is the part that bites. NIST SP 800-38D orders the
//! coefficients so that the *most* significant bit of byte 0 is the
//! coefficient of x^0, the LSB of byte 0 is x^7, and so on down to x^127 at
//! the LSB of byte 15. We store the 16 GCM bytes as a big-endian u128, so bit
//! (127 - i) of the integer is the coefficient of x^i, the multiplicative
//! identity is 1 << 127, and multiplying by x shifts the integer *down*.
//! All byte conversions go through `from_gcm_bytes`/`to_gcm_bytes`; nothing
//! else in the crate touches the raw layout.

use rand::Rng;
use thiserror::Error;

/// x^128 = x^7 + x^2 + x + 1, expressed in the shifted-down representation.
const REDUCTION_POLYNOMIAL: u128 = 0xE1 << 120;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("GCM block must be exactly 16 bytes, got {0}")]
    InvalidLength(usize),
    #[error("exponent {0} out of range for GF(2^128)")]
    InvalidExponent(u8),
}

/// An element of GF(2^128). Immutable value type; all arithmetic returns new
/// elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FieldElement(u128);

impl FieldElement {
    pub const ZERO: FieldElement = FieldElement(0);
    /// The polynomial "1", i.e. only the coefficient of x^0 set.
    pub const ONE: FieldElement = FieldElement(1 << 127);

    /// Interpret 16 bytes in the NIST ordering (byte 0's MSB is the
    /// coefficient of x^0).
    pub fn from_gcm_bytes(gcm_bytes: &[u8]) -> Result<FieldElement, FieldError> {
        let block: [u8; 16] = gcm_bytes
            .try_into()
            .map_err(|_| FieldError::InvalidLength(gcm_bytes.len()))?;
        Ok(FieldElement(u128::from_be_bytes(block)))
    }

    pub fn to_gcm_bytes(self) -> [u8; 16] {
        self.0.to_be_bytes()
    }

    /// Build an element with a 1 coefficient at every listed exponent.
    pub fn from_exponents(exponents: &[u8]) -> Result<FieldElement, FieldError> {
        let mut value = 0u128;
        for &exponent in exponents {
            if exponent >= 128 {
                return Err(FieldError::InvalidExponent(exponent));
            }
            value |= 1 << (127 - exponent);
        }
        Ok(FieldElement(value))
    }

    /// The exponents with nonzero coefficient, ascending.
    pub fn to_exponents(self) -> Vec<u8> {
        (0u8..128)
            .filter(|&i| self.0 & (1 << (127 - i)) != 0)
            .collect()
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Square-and-multiply over the binary expansion of the exponent.
    pub fn pow(self, mut exponent: u128) -> FieldElement {
        let mut result = FieldElement::ONE;
        let mut base = self;
        while exponent != 0 {
            if exponent & 1 != 0 {
                result *= base;
            }
            base *= base;
            exponent >>= 1;
        }
        result
    }

    /// a^(-1) = a^(2^128 - 2). Zero has no inverse and maps to zero.
    pub fn inverse(self) -> FieldElement {
        self.pow(u128::MAX - 1)
    }

    /// A uniformly random element. Fine for cryptanalysis, not key material.
    pub fn random(rng: &mut impl Rng) -> FieldElement {
        FieldElement(rng.gen())
    }
}

/// Same conversion as `from_gcm_bytes`, for callers that already hold a
/// full block.
impl From<[u8; 16]> for FieldElement {
    fn from(block: [u8; 16]) -> FieldElement {
        FieldElement(u128::from_be_bytes(block))
    }
}

impl std::ops::Add for FieldElement {
    type Output = FieldElement;

    fn add(self, rhs: FieldElement) -> FieldElement {
        FieldElement(self.0 ^ rhs.0)
    }
}

impl std::ops::AddAssign for FieldElement {
    fn add_assign(&mut self, rhs: FieldElement) {
        self.0 ^= rhs.0;
    }
}

// Characteristic 2: subtraction is addition.
impl std::ops::Sub for FieldElement {
    type Output = FieldElement;

    fn sub(self, rhs: FieldElement) -> FieldElement {
        self + rhs
    }
}

impl std::ops::SubAssign for FieldElement {
    fn sub_assign(&mut self, rhs: FieldElement) {
        *self += rhs;
    }
}

impl std::ops::Mul for FieldElement {
    type Output = FieldElement;

    /// Bit-serial carry-less multiply, interleaved with the reduction.
    /// Consumes `rhs` from the x^0 end while stepping `self` up one exponent
    /// per round; a set x^127 coefficient folds back in as the reduction
    /// polynomial.
    fn mul(self, rhs: FieldElement) -> FieldElement {
        let mut product = 0u128;
        let mut a = self.0;
        let mut b = rhs.0;
        while a != 0 && b != 0 {
            // b's coefficient of x^0 lives at the integer's top bit.
            if b & (1 << 127) != 0 {
                product ^= a;
            }
            b <<= 1;

            let reduce = a & 1 != 0;
            a >>= 1;
            if reduce {
                a ^= REDUCTION_POLYNOMIAL;
            }
        }
        FieldElement(product)
    }
}

impl std::ops::MulAssign for FieldElement {
    fn mul_assign(&mut self, rhs: FieldElement) {
        *self = *self * rhs;
    }
}

impl std::ops::Div for FieldElement {
    type Output = FieldElement;

    fn div(self, rhs: FieldElement) -> FieldElement {
        self * rhs.inverse()
    }
}

impl std::ops::DivAssign for FieldElement {
    fn div_assign(&mut self, rhs: FieldElement) {
        *self = *self / rhs;
    }
}

impl std::fmt::Display for FieldElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.to_gcm_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::thread_rng;

    fn from_hex(s: &str) -> FieldElement {
        FieldElement::from_gcm_bytes(&hex::decode(s).unwrap()).unwrap()
    }

    #[test]
    fn gcm_bytes_round_trip() {
        let gcm_bytes = hex::decode("f0f0f0f00f0f0f0ff0f0f0f00f0f0f0f").unwrap();
        let element = FieldElement::from_gcm_bytes(&gcm_bytes).unwrap();

        // The high nibble of a byte holds that byte's low exponents.
        let mut expected = vec![];
        for base in [0u8, 8, 16, 24, 64, 72, 80, 88] {
            expected.extend(base..base + 4);
        }
        for base in [36u8, 44, 52, 60, 100, 108, 116, 124] {
            expected.extend(base..base + 4);
        }
        expected.sort();
        assert_eq!(element.to_exponents(), expected);

        assert_eq!(element.to_gcm_bytes().to_vec(), gcm_bytes);
        assert_eq!(
            FieldElement::from_exponents(&element.to_exponents()).unwrap(),
            element
        );
    }

    #[test]
    fn bad_lengths_are_rejected() {
        assert_eq!(
            FieldElement::from_gcm_bytes(&[0; 15]),
            Err(FieldError::InvalidLength(15))
        );
        assert_eq!(
            FieldElement::from_gcm_bytes(&[0; 17]),
            Err(FieldError::InvalidLength(17))
        );
        assert_eq!(
            FieldElement::from_exponents(&[0, 128]),
            Err(FieldError::InvalidExponent(128))
        );
    }

    #[test]
    fn one_is_the_first_gcm_bit() {
        assert_eq!(
            FieldElement::ONE.to_gcm_bytes().to_vec(),
            hex::decode("80000000000000000000000000000000").unwrap()
        );
        assert_eq!(FieldElement::ONE.to_exponents(), vec![0]);
    }

    #[test]
    fn addition_is_xor() {
        let a = FieldElement::from_exponents(&[0, 1, 2, 3, 10, 11, 12, 13, 125, 126, 127]).unwrap();
        let b = FieldElement::from_exponents(&[1, 2, 4, 11, 12, 13, 32, 127]).unwrap();
        let expected = FieldElement::from_exponents(&[0, 3, 4, 10, 32, 125, 126]).unwrap();

        assert_eq!(a + b, expected);
        assert_eq!(a + a, FieldElement::ZERO);
        assert_eq!(a - b, a + b);
    }

    #[test]
    fn multiply_by_alpha() {
        let a = from_hex("fdbadcb514af3c8e7436ab83ac71aea6");
        let alpha = FieldElement::from_exponents(&[1]).unwrap();

        assert_eq!(a * alpha, from_hex("7edd6e5a8a579e473a1b55c1d638d753"));
        assert_eq!(
            a * alpha * alpha,
            from_hex("de6eb72d452bcf239d0daae0eb1c6ba9")
        );
    }

    #[test]
    fn multiplicative_identity() {
        let mut rng = thread_rng();
        for _ in 0..32 {
            let a = FieldElement::random(&mut rng);
            assert_eq!(a * FieldElement::ONE, a);
            assert_eq!(FieldElement::ONE * a, a);
            assert_eq!(a * FieldElement::ZERO, FieldElement::ZERO);
        }
    }

    #[test]
    fn known_inverse() {
        let a = from_hex("fdbadcb514af3c8e7436ab83ac71aea6");
        let inv = from_hex("2eca9f04beb1572f52e0c5e279ba7d7c");

        assert_eq!(a.inverse(), inv);
        assert_eq!(a * inv, FieldElement::ONE);
    }

    #[test]
    fn inverse_round_trip() {
        let mut rng = thread_rng();
        for _ in 0..16 {
            let a = FieldElement::random(&mut rng);
            if a.is_zero() {
                continue;
            }
            assert_eq!(a * a.inverse(), FieldElement::ONE);
            let b = FieldElement::random(&mut rng);
            assert_eq!(a * b / b, a);
        }
    }

    #[test]
    fn distributivity() {
        let mut rng = thread_rng();
        for _ in 0..16 {
            let a = FieldElement::random(&mut rng);
            let b = FieldElement::random(&mut rng);
            let c = FieldElement::random(&mut rng);
            assert_eq!(a * (b + c), a * b + a * c);
            assert_eq!(a * b + a * b, FieldElement::ZERO);
        }
    }

    #[test]
    fn pow_matches_repeated_multiplication() {
        let mut rng = thread_rng();
        let a = FieldElement::random(&mut rng);
        let mut expected = FieldElement::ONE;
        for n in 0..20u128 {
            assert_eq!(a.pow(n), expected);
            expected *= a;
        }
    }

    #[test]
    fn gcm_bytes_of_sum_is_xor_of_gcm_bytes() {
        let mut rng = thread_rng();
        for _ in 0..16 {
            let a = FieldElement::random(&mut rng);
            let b = FieldElement::random(&mut rng);
            let xored: Vec<u8> = a
                .to_gcm_bytes()
                .iter()
                .zip(b.to_gcm_bytes())
                .map(|(x, y)| x ^ y)
                .collect();
            assert_eq!((a + b).to_gcm_bytes().to_vec(), xored);
        }
    }
}
