//! Polynomials with coefficients in GF(2^128).
//!
//! Don't get confused: elements of the field are themselves polynomials over
//! GF(2), but here we build polynomials *over the field*, the ring the GCM
//! MAC evaluates in. The representation is just a vector of coefficients,
//! `coeffs[i]` multiplying X^i, kept normalized so the leading coefficient is
//! nonzero (the zero polynomial is the empty vector).

use rand::Rng;

use crate::field::FieldElement;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Polynomial {
    coeffs: Vec<FieldElement>,
}

impl Polynomial {
    pub fn new(coeffs: Vec<FieldElement>) -> Polynomial {
        Polynomial { coeffs }
    }

    pub fn zero() -> Polynomial {
        Polynomial { coeffs: vec![] }
    }

    /// The constant polynomial 1.
    pub fn one() -> Polynomial {
        Polynomial {
            coeffs: vec![FieldElement::ONE],
        }
    }

    /// By convention the empty polynomial has degree 0; use `is_empty` to
    /// tell it apart from a nonzero constant.
    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn coefficient(&self, index: usize) -> FieldElement {
        self.coeffs.get(index).copied().unwrap_or(FieldElement::ZERO)
    }

    pub fn coefficient_mut(&mut self, index: usize) -> &mut FieldElement {
        if index >= self.coeffs.len() {
            self.coeffs.resize(index + 1, FieldElement::ZERO);
        }
        &mut self.coeffs[index]
    }

    /// Strip trailing zero coefficients. Every mutating operation finishes
    /// with the polynomial in this form.
    pub fn ensure_normalized(&mut self) {
        while self.coeffs.last() == Some(&FieldElement::ZERO) {
            self.coeffs.pop();
        }
    }

    /// Normalize and divide through by the leading coefficient, leaving it 1.
    pub fn ensure_monic(&mut self) {
        self.ensure_normalized();
        if let Some(&top) = self.coeffs.last() {
            for coeff in &mut self.coeffs {
                *coeff /= top;
            }
        }
    }

    /// Long division: returns `(quotient, remainder)` with
    /// `self = quotient * divisor + remainder` and
    /// `deg(remainder) < deg(divisor)`.
    pub fn divmod(&self, divisor: &Polynomial) -> (Polynomial, Polynomial) {
        assert!(!divisor.is_empty(), "division by the zero polynomial");
        if self.degree() < divisor.degree() {
            return (Polynomial::zero(), self.clone());
        }

        let mut quotient = Polynomial::zero();
        let mut remainder = self.clone();
        while !remainder.is_empty() && remainder.degree() >= divisor.degree() {
            let shift = remainder.degree() - divisor.degree();
            let leading =
                remainder.coefficient(remainder.degree()) / divisor.coefficient(divisor.degree());
            *quotient.coefficient_mut(shift) += leading;
            let factor = Polynomial::new(vec![leading]) << shift;
            remainder += factor * divisor.clone();
        }
        quotient.ensure_normalized();
        remainder.ensure_normalized();
        debug_assert_eq!(quotient.clone() * divisor.clone() + remainder.clone(), *self);
        (quotient, remainder)
    }

    /// `self^exponent mod modulus`, square-and-multiply with a reduction
    /// after every step. Exponents go up to 128 bits.
    pub fn pow_mod(&self, mut exponent: u128, modulus: &Polynomial) -> Polynomial {
        let mut result = Polynomial::one();
        let mut base = self.divmod(modulus).1;
        while exponent != 0 {
            if exponent & 1 != 0 {
                result = (result * base.clone()).divmod(modulus).1;
            }
            base = (base.clone() * base).divmod(modulus).1;
            exponent >>= 1;
        }
        result
    }

    /// A polynomial of the given degree with uniformly random coefficients.
    pub fn random(degree: usize, rng: &mut impl Rng) -> Polynomial {
        let coeffs = (0..=degree).map(|_| FieldElement::random(rng)).collect();
        Polynomial { coeffs }
    }
}

impl std::ops::Add for Polynomial {
    type Output = Polynomial;

    fn add(mut self, rhs: Polynomial) -> Polynomial {
        self += rhs;
        self
    }
}

impl std::ops::AddAssign for Polynomial {
    fn add_assign(&mut self, rhs: Polynomial) {
        if self.coeffs.len() < rhs.coeffs.len() {
            self.coeffs.resize(rhs.coeffs.len(), FieldElement::ZERO);
        }
        for (i, coeff) in rhs.coeffs.into_iter().enumerate() {
            self.coeffs[i] += coeff;
        }
        self.ensure_normalized();
    }
}

// Coefficients live in characteristic 2, so subtraction is addition.
impl std::ops::Sub for Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: Polynomial) -> Polynomial {
        self + rhs
    }
}

impl std::ops::SubAssign for Polynomial {
    fn sub_assign(&mut self, rhs: Polynomial) {
        *self += rhs;
    }
}

impl std::ops::Mul for Polynomial {
    type Output = Polynomial;

    /// Schoolbook multiplication.
    fn mul(self, rhs: Polynomial) -> Polynomial {
        if self.is_empty() || rhs.is_empty() {
            return Polynomial::zero();
        }
        let mut out = Polynomial {
            coeffs: vec![FieldElement::ZERO; self.degree() + rhs.degree() + 1],
        };
        for (i, &a) in self.coeffs.iter().enumerate() {
            for (j, &b) in rhs.coeffs.iter().enumerate() {
                out.coeffs[i + j] += a * b;
            }
        }
        out.ensure_normalized();
        out
    }
}

/// Multiplication by X^amount: prepend `amount` zero coefficients.
impl std::ops::Shl<usize> for Polynomial {
    type Output = Polynomial;

    fn shl(mut self, amount: usize) -> Polynomial {
        if self.is_empty() {
            return self;
        }
        self.coeffs.splice(0..0, vec![FieldElement::ZERO; amount]);
        self
    }
}

impl std::fmt::Display for Polynomial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "0");
        }
        let terms: Vec<String> = self
            .coeffs
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{c}*X^{i}"))
            .collect();
        write!(f, "{}", terms.join(" + "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::thread_rng;

    fn from_hex(s: &str) -> FieldElement {
        FieldElement::from_gcm_bytes(&hex::decode(s).unwrap()).unwrap()
    }

    /// A quartic with four known roots; `factor.rs` tests the same fixture.
    fn quartic_fixture() -> Polynomial {
        Polynomial::new(vec![
            from_hex("7a9c3400001a584bb29b0a03b7971984"),
            from_hex("1b81c000000000a9d95c170026d05960"),
            from_hex("f43800000000000000c45e91cfdc121e"),
            from_hex("000000000000000000000000de6df8f8"),
            FieldElement::ONE,
        ])
    }

    fn linear_factor() -> Polynomial {
        Polynomial::new(vec![
            from_hex("00000000000000000000000000c0ffee"),
            FieldElement::ONE,
        ])
    }

    fn cubic_factor() -> Polynomial {
        Polynomial::new(vec![
            from_hex("05df80000000000019464ea44524eaf9"),
            from_hex("e8180000000000000000bf66d09ce402"),
            from_hex("000000000000000000000000dead0716"),
            FieldElement::ONE,
        ])
    }

    #[test]
    fn addition_resizes_and_normalizes() {
        let a = Polynomial::new(vec![FieldElement::ONE, FieldElement::ONE]);
        let b = Polynomial::new(vec![FieldElement::ZERO, FieldElement::ONE]);
        let sum = a.clone() + b;
        assert_eq!(sum, Polynomial::one());

        // Cancelling the leading term must strip it entirely.
        assert_eq!(a.clone() + a, Polynomial::zero());
    }

    #[test]
    fn known_product_and_divmod() {
        let product = linear_factor() * cubic_factor();
        assert_eq!(product, quartic_fixture());

        let (quotient, remainder) = quartic_fixture().divmod(&linear_factor());
        assert_eq!(quotient, cubic_factor());
        assert!(remainder.is_empty());
    }

    #[test]
    fn divmod_round_trip() {
        let mut rng = thread_rng();
        for _ in 0..8 {
            let a = Polynomial::random(6, &mut rng);
            let b = Polynomial::random(2, &mut rng);
            let (q, r) = a.divmod(&b);
            assert_eq!(q * b.clone() + r.clone(), a);
            assert!(r.is_empty() || r.degree() < b.degree());
        }
    }

    #[test]
    fn divmod_of_smaller_degree_is_identity_remainder() {
        let a = Polynomial::new(vec![FieldElement::ONE]);
        let b = quartic_fixture();
        let (q, r) = a.divmod(&b);
        assert!(q.is_empty());
        assert_eq!(r, a);
    }

    #[test]
    fn shift_multiplies_by_x() {
        let mut rng = thread_rng();
        let p = Polynomial::random(3, &mut rng);
        let x = Polynomial::new(vec![FieldElement::ZERO, FieldElement::ONE]);
        assert_eq!(p.clone() << 1, p.clone() * x.clone());
        assert_eq!(p.clone() << 3, p * (x.clone() * x.clone() * x));
    }

    #[test]
    fn ensure_monic_scales_every_coefficient() {
        let mut rng = thread_rng();
        let mut p = Polynomial::random(4, &mut rng);
        let original = p.clone();
        p.ensure_monic();
        assert_eq!(p.coefficient(p.degree()), FieldElement::ONE);
        // Same polynomial up to the unit it was divided by.
        let unit = original.coefficient(original.degree());
        assert_eq!(p * Polynomial::new(vec![unit]), original);
    }

    #[test]
    fn pow_mod_small_exponents() {
        let mut rng = thread_rng();
        let base = Polynomial::random(2, &mut rng);
        let modulus = quartic_fixture();

        assert_eq!(base.pow_mod(0, &modulus), Polynomial::one());
        assert_eq!(base.pow_mod(1, &modulus), base.divmod(&modulus).1);
        let squared = (base.clone() * base.clone()).divmod(&modulus).1;
        assert_eq!(base.pow_mod(2, &modulus), squared);
        let cubed = (squared * base.clone()).divmod(&modulus).1;
        assert_eq!(base.pow_mod(3, &modulus), cubed);
    }
}
