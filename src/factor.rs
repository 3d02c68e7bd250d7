//! Root-finding in GF(2^128)[X] via Cantor-Zassenhaus, specialized to what
//! the tag-forgery needs: "give me every root of this polynomial". The
//! distinct-degree step first strips everything except the product of the
//! linear factors, then equal-degree splitting takes that product apart.
//!
//! The trick: 2^128 - 1 is divisible by 3, so raising a random polynomial to
//! (2^128 - 1)/3 modulo f pushes it into the cube-roots-of-unity subgroup of
//! each residue field implicitly defined by f's factors. Subtracting one
//! zeroes a third of those components, and the gcd with the factor being
//! split then picks off a random nontrivial subset of its roots. A split
//! attempt fails with constant probability, so the caller just retries with
//! fresh randomness.

use rand::Rng;

use crate::field::FieldElement;
use crate::poly::Polynomial;

/// (2^128 - 1) / 3.
const CUBE_COSET_EXPONENT: u128 = 0x5555_5555_5555_5555_5555_5555_5555_5555;

/// Euclidean gcd. The result is only defined up to a unit; callers wanting a
/// canonical answer apply `ensure_monic`.
pub fn gcd(mut a: Polynomial, mut b: Polynomial) -> Polynomial {
    while !b.is_empty() {
        let (_, remainder) = a.divmod(&b);
        a = b;
        b = remainder;
    }
    a
}

/// One probabilistic split attempt: try to break `p`, a factor of `f`, into
/// two nontrivial monic factors. `None` is not an error, just bad luck with
/// the random polynomial; the caller retries.
pub fn cz_split(
    f: &Polynomial,
    p: &Polynomial,
    rng: &mut impl Rng,
) -> Option<(Polynomial, Polynomial)> {
    let h = Polynomial::random(f.degree() - 1, rng);
    // In characteristic 2 adding one *is* subtracting one.
    let g = h.pow_mod(CUBE_COSET_EXPONENT, f) + Polynomial::one();

    let mut q = gcd(p.clone(), g);
    q.ensure_monic();
    let mut p = p.clone();
    p.ensure_monic();

    if q == Polynomial::one() || q == p {
        return None;
    }
    let (mut other, remainder) = p.divmod(&q);
    debug_assert!(remainder.is_empty(), "gcd must divide its argument");
    other.ensure_monic();
    Some((q, other))
}

/// The product of the distinct linear factors of `f`: gcd(f, X^q - X) with
/// q = 2^128, since X^q - X is exactly the product of all monic linear
/// polynomials over the field. X^q mod f falls out of 128 successive
/// squarings. This is the distinct-degree step that keeps the splitting
/// loop away from irreducible factors it could never break.
fn linear_factor_product(f: &Polynomial) -> Polynomial {
    let x = Polynomial::new(vec![FieldElement::ZERO, FieldElement::ONE]);
    let mut frobenius = x.divmod(f).1;
    for _ in 0..128 {
        frobenius = (frobenius.clone() * frobenius).divmod(f).1;
    }
    // Characteristic 2: X^q - X = X^q + X.
    let mut linear_part = gcd(f.clone(), frobenius + x);
    linear_part.ensure_monic();
    linear_part
}

/// All roots of `f` in GF(2^128). The linear factors are sliced out first,
/// then split off a worklist until each stands alone; a monic linear factor
/// X + r contributes the root r (we are in characteristic 2, so no sign to
/// flip).
pub fn zeros(mut f: Polynomial, rng: &mut impl Rng) -> Vec<FieldElement> {
    f.ensure_monic();
    if f.is_empty() || f.degree() == 0 {
        return vec![];
    }
    let f = linear_factor_product(&f);
    let mut worklist = vec![f.clone()];
    let mut roots = vec![];

    while let Some(factor) = worklist.pop() {
        if factor.is_empty() || factor.degree() == 0 {
            continue;
        }
        if factor.degree() == 1 {
            roots.push(factor.coefficient(0));
            continue;
        }
        loop {
            if let Some((a, b)) = cz_split(&f, &factor, rng) {
                worklist.push(a);
                worklist.push(b);
                break;
            }
        }
    }
    roots
}
