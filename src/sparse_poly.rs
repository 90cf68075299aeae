use std::collections::BTreeMap;
use std::ops::{Add, Mul, Neg};

use itertools::{EitherOrBoth, Itertools};

use crate::util;

/// Struct to store a sparse integer polynomial.
///
/// The data for the polynomial is a map from exponent to coefficient where
/// only nonzero coefficients are stored. Exponents may be negative, in which
/// case the polynomial is a Laurent polynomial; the balanced coders shift
/// their output so that stored exponents are non-negative and the fractional
/// shift is carried separately as a digit.
///
/// The polynomial supports termwise addition and convolution multiplication,
/// which mirror the homomorphic operations of an HE scheme acting on a
/// plaintext polynomial, as well as the per-modulus reduction and CRT
/// recomposition used by the multi-modulus coders.
///
/// See [SparseMultiPoly] for the per-slot vector variant.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct SparsePoly {
    coeffs: BTreeMap<i64, i64>,
}

impl SparsePoly {

    /// Creates an empty polynomial.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a polynomial from the given terms. Zero coefficients are dropped.
    pub fn from_terms(terms: BTreeMap<i64, i64>) -> Self {
        let coeffs = terms.into_iter().filter(|&(_, v)| v != 0).collect();
        SparsePoly { coeffs }
    }

    /// Creates a polynomial from a dense coefficient vector, index as exponent.
    pub fn from_expanded(expanded: &[i64]) -> Self {
        let coeffs = expanded.iter().enumerate()
            .filter(|&(_, &v)| v != 0)
            .map(|(k, &v)| (k as i64, v))
            .collect();
        SparsePoly { coeffs }
    }

    /// The coefficient at the given exponent. Zero when the term is absent.
    pub fn coeff(&self, i: i64) -> i64 {
        self.coeffs.get(&i).copied().unwrap_or(0)
    }

    /// Sets the coefficient at the given exponent, removing the term when
    /// the coefficient is zero.
    pub fn set_coeff(&mut self, i: i64, value: i64) {
        if value == 0 {
            self.coeffs.remove(&i);
        } else {
            self.coeffs.insert(i, value);
        }
    }

    /// The largest stored exponent. Zero for the empty polynomial.
    pub fn degree(&self) -> i64 {
        self.coeffs.keys().next_back().copied().unwrap_or(0)
    }

    /// The smallest stored exponent, or None for the empty polynomial.
    pub fn first_exponent(&self) -> Option<i64> {
        self.coeffs.keys().next().copied()
    }

    /// The number of stored terms.
    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    /// Does the polynomial store no terms?
    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Iterate over (exponent, coefficient) pairs in ascending exponent order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.coeffs.iter().map(|(&k, &v)| (k, v))
    }

    /// Does any stored term have a negative exponent?
    pub fn is_laurent(&self) -> bool {
        self.coeffs.keys().next().map_or(false, |&k| k < 0)
    }

    /// Expand into a dense coefficient vector of length `degree + 1`.
    pub fn expand(&self) -> Vec<i64> {
        if self.is_laurent() {
            panic!("[Logic error] Cannot expand a Laurent polynomial.");
        }
        let mut expanded = vec![0; self.degree() as usize + 1];
        for (k, v) in self.iter() {
            expanded[k as usize] = v;
        }
        expanded
    }

    /// Add `i` to every stored exponent.
    pub fn shift(&self, i: i64) -> Self {
        let coeffs = self.coeffs.iter().map(|(&k, &v)| (k + i, v)).collect();
        SparsePoly { coeffs }
    }

    /// Negates all coefficients in place.
    pub fn negate(&mut self) {
        self.coeffs.values_mut().for_each(|v| *v = -*v);
    }

    /// Truncated per-coefficient remainder. The remainders keep the sign of
    /// the coefficients; terms reduced to zero are dropped.
    pub fn rem_mod(&self, p: i64) -> Self {
        if p < 2 {
            panic!("[Invalid argument] Modulus must be at least 2.");
        }
        Self::from_terms(self.coeffs.iter().map(|(&k, &v)| (k, v % p)).collect())
    }

    /// Correct coefficients in `[0, q)` to the symmetric range `(-q/2, q/2]`.
    pub fn center_lift(&self, q: i64) -> Self {
        let coeffs = self.coeffs.iter()
            .map(|(&k, &v)| (k, if v > q / 2 {v - q} else {v}))
            .collect();
        SparsePoly { coeffs }
    }

    /// Per-exponent CRT recomposition of two residue polynomials. Walks the
    /// union of both exponent sets, since a term may be reduced to zero
    /// modulo one of the two moduli and still be present modulo the other.
    pub fn recomp_crt(am: (&SparsePoly, i64), bn: (&SparsePoly, i64)) -> SparsePoly {
        let (a_poly, m) = am;
        let (b_poly, n) = bn;
        let mut recomp = SparsePoly::new();
        let merged = a_poly.coeffs.iter()
            .merge_join_by(b_poly.coeffs.iter(), |x, y| x.0.cmp(y.0));
        for entry in merged {
            let (k, a, b) = match entry {
                EitherOrBoth::Both((&k, &a), (_, &b)) => (k, a, b),
                EitherOrBoth::Left((&k, &a)) => (k, a, 0),
                EitherOrBoth::Right((&k, &b)) => (k, 0, b),
            };
            recomp.set_coeff(k, util::recomp_crt((a, m), (b, n)));
        }
        recomp
    }

}

impl Add for &SparsePoly {
    type Output = SparsePoly;
    fn add(self, other: &SparsePoly) -> SparsePoly {
        let merged = self.coeffs.iter()
            .merge_join_by(other.coeffs.iter(), |x, y| x.0.cmp(y.0));
        let mut res = SparsePoly::new();
        for entry in merged {
            let (k, v) = match entry {
                EitherOrBoth::Both((&k, &a), (_, &b)) => (k, a + b),
                EitherOrBoth::Left((&k, &a)) => (k, a),
                EitherOrBoth::Right((&k, &b)) => (k, b),
            };
            res.set_coeff(k, v);
        }
        res
    }
}

impl Add for SparsePoly {
    type Output = SparsePoly;
    fn add(self, other: SparsePoly) -> SparsePoly {
        &self + &other
    }
}

impl Mul for &SparsePoly {
    type Output = SparsePoly;
    fn mul(self, other: &SparsePoly) -> SparsePoly {
        let mut acc: BTreeMap<i64, i64> = BTreeMap::new();
        for (&k1, &v1) in &self.coeffs {
            for (&k2, &v2) in &other.coeffs {
                *acc.entry(k1 + k2).or_insert(0) += v1 * v2;
            }
        }
        SparsePoly::from_terms(acc)
    }
}

impl Mul for SparsePoly {
    type Output = SparsePoly;
    fn mul(self, other: SparsePoly) -> SparsePoly {
        &self * &other
    }
}

impl Neg for SparsePoly {
    type Output = SparsePoly;
    fn neg(mut self) -> SparsePoly {
        self.negate();
        self
    }
}

impl std::fmt::Display for SparsePoly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.iter().map(|(k, v)| format!("{}x^{}", v, k)).join(" + "))
    }
}

impl<'de> serde::Deserialize<'de> for SparsePoly {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where D: serde::Deserializer<'de>
    {
        // Re-establish the nonzero-coefficient invariant on load.
        #[derive(serde::Deserialize)]
        struct Raw { coeffs: BTreeMap<i64, i64> }
        let raw = Raw::deserialize(deserializer)?;
        Ok(SparsePoly::from_terms(raw.coeffs))
    }
}

/// Struct to store one sparse polynomial per plaintext slot.
///
/// Mirrors a batched plaintext: operations apply slotwise, so a vector of
/// encoded numbers can be manipulated as a single object the way SIMD
/// plaintexts are in an HE scheme.
///
/// See [SparsePoly] for the scalar variant.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SparseMultiPoly {
    slots: Vec<SparsePoly>,
}

impl SparseMultiPoly {

    /// Creates a multi polynomial with the given slots.
    pub fn from_slots(slots: Vec<SparsePoly>) -> Self {
        SparseMultiPoly { slots }
    }

    /// The slots.
    pub fn slots(&self) -> &[SparsePoly] {
        &self.slots
    }

    /// The number of slots.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn check_same_slot_count(&self, other: &Self) {
        if self.slots.len() != other.slots.len() {
            panic!("[Invalid argument] Operands must have the same number of slots.");
        }
    }

    /// Negates all slots in place.
    pub fn negate(&mut self) {
        self.slots.iter_mut().for_each(|slot| slot.negate());
    }

    /// Truncated per-coefficient remainder, applied slotwise.
    pub fn rem_mod(&self, p: i64) -> Self {
        let slots = self.slots.iter().map(|slot| slot.rem_mod(p)).collect();
        SparseMultiPoly { slots }
    }

    /// Correct coefficients to the symmetric range, applied slotwise.
    pub fn center_lift(&self, q: i64) -> Self {
        let slots = self.slots.iter().map(|slot| slot.center_lift(q)).collect();
        SparseMultiPoly { slots }
    }

    /// Shift each slot by its own exponent offset.
    pub fn shift(&self, is: &[i64]) -> Self {
        if self.slots.len() != is.len() {
            panic!("[Invalid argument] One shift per slot is required.");
        }
        let slots = self.slots.iter().zip(is.iter())
            .map(|(slot, &i)| slot.shift(i))
            .collect();
        SparseMultiPoly { slots }
    }

    /// Per-exponent CRT recomposition, applied slotwise.
    pub fn recomp_crt(am: (&SparseMultiPoly, i64), bn: (&SparseMultiPoly, i64)) -> SparseMultiPoly {
        let (a_poly, m) = am;
        let (b_poly, n) = bn;
        a_poly.check_same_slot_count(b_poly);
        let slots = a_poly.slots.iter().zip(b_poly.slots.iter())
            .map(|(a, b)| SparsePoly::recomp_crt((a, m), (b, n)))
            .collect();
        SparseMultiPoly { slots }
    }

    /// Given a slot mask, pick slots from `self` where the mask is set and
    /// from `other` where it is not. Returns the selected multi polynomial
    /// and its complement.
    pub fn select(&self, other: &Self, select_mask: &[i64]) -> (Self, Self) {
        self.check_same_slot_count(other);
        if self.slots.len() != select_mask.len() {
            panic!("[Invalid argument] One mask entry per slot is required.");
        }
        let mut selected = Vec::with_capacity(select_mask.len());
        let mut complementary = Vec::with_capacity(select_mask.len());
        for (i, &mask) in select_mask.iter().enumerate() {
            selected.push(if mask != 0 {self.slots[i].clone()} else {other.slots[i].clone()});
            complementary.push(if mask != 0 {other.slots[i].clone()} else {self.slots[i].clone()});
        }
        (SparseMultiPoly::from_slots(selected), SparseMultiPoly::from_slots(complementary))
    }

}

impl Add for &SparseMultiPoly {
    type Output = SparseMultiPoly;
    fn add(self, other: &SparseMultiPoly) -> SparseMultiPoly {
        self.check_same_slot_count(other);
        let slots = self.slots.iter().zip(other.slots.iter())
            .map(|(a, b)| a + b)
            .collect();
        SparseMultiPoly { slots }
    }
}

impl Add for SparseMultiPoly {
    type Output = SparseMultiPoly;
    fn add(self, other: SparseMultiPoly) -> SparseMultiPoly {
        &self + &other
    }
}

impl Mul for &SparseMultiPoly {
    type Output = SparseMultiPoly;
    fn mul(self, other: &SparseMultiPoly) -> SparseMultiPoly {
        self.check_same_slot_count(other);
        let slots = self.slots.iter().zip(other.slots.iter())
            .map(|(a, b)| a * b)
            .collect();
        SparseMultiPoly { slots }
    }
}

impl Mul for SparseMultiPoly {
    type Output = SparseMultiPoly;
    fn mul(self, other: SparseMultiPoly) -> SparseMultiPoly {
        &self * &other
    }
}

impl Neg for SparseMultiPoly {
    type Output = SparseMultiPoly;
    fn neg(mut self) -> SparseMultiPoly {
        self.negate();
        self
    }
}

impl std::fmt::Display for SparseMultiPoly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for slot in &self.slots {
            writeln!(f, "{}", slot)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use super::*;

    fn terms(pairs: &[(i64, i64)]) -> BTreeMap<i64, i64> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_zero_poly() {
        let poly = SparsePoly::new();
        assert_eq!(poly.degree(), 0);
        assert_eq!(poly.coeff(0), 0);
        assert!(poly.is_empty());
        assert_eq!(poly.to_string(), "");
    }

    #[test]
    fn test_assign_terms() {
        let map = terms(&[(2, 2), (3, 1), (5, 3)]);
        let poly = SparsePoly::from_terms(map.clone());
        assert_eq!(poly.degree(), 5);
        for (&k, &v) in &map {
            assert_eq!(poly.coeff(k), v);
        }
        assert_eq!(poly.first_exponent(), Some(2));
    }

    #[test]
    fn test_zero_terms_dropped() {
        let poly = SparsePoly::from_terms(terms(&[(0, 0), (2, 2), (4, 0)]));
        assert_eq!(poly.len(), 1);
        let mut poly = SparsePoly::from_terms(terms(&[(2, 2), (3, 1)]));
        poly.set_coeff(2, 0);
        assert_eq!(poly.len(), 1);
        assert_eq!(poly.coeff(2), 0);
    }

    #[test]
    fn test_to_string() {
        let poly = SparsePoly::from_terms(terms(&[(2, 2), (3, 1), (5, 3)]));
        assert_eq!(poly.to_string(), "2x^2 + 1x^3 + 3x^5");
    }

    #[test]
    fn test_addition() {
        let p1 = SparsePoly::from_terms(terms(&[(2, 2), (3, 1), (5, 3)]));
        let p2 = SparsePoly::from_terms(terms(&[(2, 4), (1, 1)]));
        let sum = &p1 + &p2;
        assert_eq!(sum.to_string(), "1x^1 + 6x^2 + 1x^3 + 3x^5");
        // Cancelling terms must not leave zero entries behind.
        let p3 = SparsePoly::from_terms(terms(&[(2, -2)]));
        let sum = &p1 + &p3;
        assert_eq!(sum.coeff(2), 0);
        assert_eq!(sum.len(), 2);
    }

    #[test]
    fn test_multiplication_one_term() {
        let p1 = SparsePoly::from_terms(terms(&[(2, 2), (3, 1), (5, 3)]));
        let p2 = SparsePoly::from_terms(terms(&[(2, 4)]));
        let prod = &p1 * &p2;
        assert_eq!(prod.to_string(), "8x^4 + 4x^5 + 12x^7");
    }

    #[test]
    fn test_multiplication() {
        let p1 = SparsePoly::from_terms(terms(&[(2, 2), (3, 1), (5, 3)]));
        let p2 = SparsePoly::from_terms(terms(&[(2, 4), (1, 1)]));
        let prod = &p1 * &p2;
        assert_eq!(prod.to_string(), "2x^3 + 9x^4 + 4x^5 + 3x^6 + 12x^7");
    }

    #[test]
    fn test_is_laurent() {
        assert!(SparsePoly::from_terms(terms(&[(-2, 2), (3, 1), (5, 3)])).is_laurent());
        assert!(!SparsePoly::from_terms(terms(&[(2, 2), (3, 1), (5, 3)])).is_laurent());
    }

    #[test]
    fn test_expand() {
        let poly = SparsePoly::from_terms(terms(&[(2, 2), (3, 1), (5, 3)]));
        let expanded = poly.expand();
        assert_eq!(expanded.len(), 6);
        for (i, &v) in expanded.iter().enumerate() {
            assert_eq!(v, poly.coeff(i as i64));
        }
        assert_eq!(SparsePoly::from_expanded(&expanded), poly);
    }

    #[test]
    #[should_panic(expected = "[Logic error] Cannot expand a Laurent polynomial")]
    fn test_expand_laurent() {
        SparsePoly::from_terms(terms(&[(-2, 2), (3, 1)])).expand();
    }

    #[test]
    fn test_shift() {
        let poly = SparsePoly::from_terms(terms(&[(0, -1), (3, 1)]));
        let shifted = poly.shift(2);
        assert_eq!(shifted.coeff(2), -1);
        assert_eq!(shifted.coeff(5), 1);
        assert_eq!(shifted.shift(-2), poly);
    }

    #[test]
    fn test_rem_mod_and_center_lift() {
        let poly = SparsePoly::from_terms(terms(&[(0, 7), (1, -7), (2, 3), (3, -3), (4, 5)]));
        let reduced = poly.rem_mod(5);
        assert_eq!(reduced.coeff(0), 2);
        assert_eq!(reduced.coeff(1), -2);
        assert_eq!(reduced.coeff(2), 3);
        assert_eq!(reduced.coeff(3), -3);
        // 5 % 5 drops the term entirely.
        assert_eq!(reduced.coeff(4), 0);
        assert_eq!(reduced.len(), 4);

        let lifted = SparsePoly::from_terms(terms(&[(0, 40348), (1, 3), (2, 20175)])).center_lift(40349);
        assert_eq!(lifted.coeff(0), -1);
        assert_eq!(lifted.coeff(1), 3);
        assert_eq!(lifted.coeff(2), 20175 - 40349);
    }

    #[test]
    fn test_recomp_crt_walks_both_exponent_sets() {
        // 5 vanishes mod 5 but not mod 7; the term must still recompose.
        let value = SparsePoly::from_terms(terms(&[(0, 5), (2, 3)]));
        let hi = value.rem_mod(5);
        let lo = value.rem_mod(7);
        assert_eq!(hi.len(), 1);
        assert_eq!(lo.len(), 2);
        let recomposed = SparsePoly::recomp_crt((&hi, 5), (&lo, 7));
        assert_eq!(recomposed.coeff(0), 5);
        assert_eq!(recomposed.coeff(2), 3);
    }

    #[test]
    fn test_multi_poly_ops() {
        let a = SparseMultiPoly::from_slots(vec![
            SparsePoly::from_terms(terms(&[(0, 1), (2, 1)])),
            SparsePoly::from_terms(terms(&[(1, -1)])),
        ]);
        let b = SparseMultiPoly::from_slots(vec![
            SparsePoly::from_terms(terms(&[(0, 1)])),
            SparsePoly::from_terms(terms(&[(1, 1), (3, 2)])),
        ]);
        let sum = &a + &b;
        assert_eq!(sum.slots()[0].to_string(), "2x^0 + 1x^2");
        assert_eq!(sum.slots()[1].to_string(), "2x^3");
        let prod = &a * &b;
        assert_eq!(prod.slots()[0].to_string(), "1x^0 + 1x^2");
        assert_eq!(prod.slots()[1].to_string(), "-1x^2 + -2x^4");

        let (selected, complementary) = a.select(&b, &[1, 0]);
        assert_eq!(selected.slots()[0], a.slots()[0]);
        assert_eq!(selected.slots()[1], b.slots()[1]);
        assert_eq!(complementary.slots()[0], b.slots()[0]);
        assert_eq!(complementary.slots()[1], a.slots()[1]);
    }

    #[test]
    #[should_panic(expected = "[Invalid argument] Operands must have the same number of slots")]
    fn test_multi_poly_slot_mismatch() {
        let a = SparseMultiPoly::from_slots(vec![SparsePoly::new()]);
        let b = SparseMultiPoly::from_slots(vec![SparsePoly::new(), SparsePoly::new()]);
        let _ = &a + &b;
    }

    #[test]
    fn test_serde_round_trip() {
        let poly = SparsePoly::from_terms(terms(&[(0, -1), (14, 1), (36, 1)]));
        let bytes = bincode::serialize(&poly).unwrap();
        let back: SparsePoly = bincode::deserialize(&bytes).unwrap();
        assert_eq!(poly, back);
    }

    #[test]
    fn test_deserialize_drops_zero_coeffs() {
        // A peer that does not hold the invariant may serialize zero terms;
        // they must not survive the load.
        #[derive(serde::Serialize)]
        struct Raw { coeffs: BTreeMap<i64, i64> }
        let raw = Raw { coeffs: terms(&[(0, 0), (2, 3), (5, 0)]) };
        let bytes = bincode::serialize(&raw).unwrap();
        let poly: SparsePoly = bincode::deserialize(&bytes).unwrap();
        assert_eq!(poly.len(), 1);
        assert_eq!(poly.coeff(2), 3);
    }
}
