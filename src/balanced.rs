use std::ops::{Add, Mul, Neg};

use crate::{
    encoding_parameters::{BalancedParams, ParmsID},
    gap::gap,
    sparse_poly::SparsePoly,
    ValCheck,
};

/// A single real number encoded as a balanced sparse polynomial.
///
/// The raw expansion of a number with a fractional part is a Laurent
/// polynomial. Since a plaintext polynomial cannot carry negative exponents,
/// the expansion is shifted up so its smallest exponent is zero, and the
/// shift is remembered as the (non-positive) `digit`. Addition re-aligns the
/// digits of its operands; multiplication adds them, exactly as exponents of
/// the implicit factor `rw^digit` demand.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BalancedEncodedPoly {
    poly: SparsePoly,
    digit: i64,
    parms_id: ParmsID,
}

impl BalancedEncodedPoly {

    pub(crate) fn from_members(poly: SparsePoly, digit: i64, parms_id: ParmsID) -> Self {
        BalancedEncodedPoly { poly, digit, parms_id }
    }

    /// The shifted polynomial.
    pub fn poly(&self) -> &SparsePoly {
        &self.poly
    }

    /// The fractional shift. Non-positive.
    pub fn digit(&self) -> i64 {
        self.digit
    }

    /// The [ParmsID] of the parameters this poly was encoded under.
    pub fn parms_id(&self) -> &ParmsID {
        &self.parms_id
    }

    /// Reduce every coefficient modulo `p`, keeping digit and parameters.
    /// The remainders keep the sign of the coefficients.
    pub fn rem_mod(&self, p: i64) -> Self {
        BalancedEncodedPoly {
            poly: self.poly.rem_mod(p),
            digit: self.digit,
            parms_id: self.parms_id,
        }
    }

    fn check_same_parms(&self, other: &Self) {
        if self.parms_id != other.parms_id {
            panic!("[Invalid argument] Operands were encoded under different parameters.");
        }
    }

}

impl Add for BalancedEncodedPoly {
    type Output = BalancedEncodedPoly;
    fn add(self, other: BalancedEncodedPoly) -> BalancedEncodedPoly {
        self.check_same_parms(&other);
        // Align on the smaller digit before summing termwise.
        let (poly, digit) = if self.digit < other.digit {
            (&self.poly + &other.poly.shift(other.digit - self.digit), self.digit)
        } else {
            (&other.poly + &self.poly.shift(self.digit - other.digit), other.digit)
        };
        BalancedEncodedPoly { poly, digit, parms_id: self.parms_id }
    }
}

impl Mul for BalancedEncodedPoly {
    type Output = BalancedEncodedPoly;
    fn mul(self, other: BalancedEncodedPoly) -> BalancedEncodedPoly {
        self.check_same_parms(&other);
        BalancedEncodedPoly {
            poly: &self.poly * &other.poly,
            digit: self.digit + other.digit,
            parms_id: self.parms_id,
        }
    }
}

impl Neg for BalancedEncodedPoly {
    type Output = BalancedEncodedPoly;
    fn neg(mut self) -> BalancedEncodedPoly {
        self.poly.negate();
        self
    }
}

/// Encodes single real numbers as balanced sparse polynomials.
///
/// Provides functionality for encoding a real number into a sparse polynomial
/// with coefficients in `{-1, +1}` over powers of a non-integer base `rw`,
/// such that evaluating the polynomial at `rw` recovers the number to within
/// `epsil`. The encoded form supports addition and multiplication that
/// mirror the corresponding operations on the numbers, which is what makes
/// it usable as an HE plaintext encoding: the polynomial coefficients can be
/// placed into plaintext slots and operated on homomorphically.
///
/// ## Mathematical background
/// Each encoding round records the closest power of `rw` to the running
/// remainder and continues with the signed difference. Balanced rounding
/// keeps the residual minimal at every step, which for bases close to 1
/// yields very sparse expansions whose coefficients never exceed one in
/// magnitude; this bounds the coefficient growth of sums and products, the
/// scarce resource of any plaintext modulus the encoding is reduced into.
///
/// - See [BalancedSlotsCoder](crate::BalancedSlotsCoder) for the slot-wise
///   variant.
/// - See [DualCoder](crate::DualCoder) and [NCoder](crate::NCoder) for
///   operating modulo several coprime moduli with CRT recomposition.
pub struct BalancedCoder {
    params: BalancedParams,
}

impl BalancedCoder {

    /// Creates a coder for the given parameters.
    pub fn new(params: BalancedParams) -> Self {
        BalancedCoder { params }
    }

    /// The coder parameters.
    pub fn params(&self) -> &BalancedParams {
        &self.params
    }

    /// Encodes a real number.
    /// ```rust
    /// use nibnaf::{BalancedCoder, BalancedParams};
    /// let coder = BalancedCoder::new(BalancedParams::new(1.2, 1e-8));
    /// let encoded = coder.encode(546.789);
    /// let decoded = coder.decode(&encoded);
    /// assert!((decoded - 546.789).abs() < 1e-8);
    /// ```
    pub fn encode(&self, num: f64) -> BalancedEncodedPoly {
        let a = gap(num, self.params.rw(), self.params.epsil());
        let digit = a.first_exponent().map_or(0, |k| k.min(0));
        BalancedEncodedPoly {
            poly: a.shift(-digit),
            digit,
            parms_id: *self.params.parms_id(),
        }
    }

    /// Encodes an integer constant exactly, as a degree-0 poly with digit 0.
    pub fn constant(&self, value: i64) -> BalancedEncodedPoly {
        let mut poly = SparsePoly::new();
        poly.set_coeff(0, value);
        BalancedEncodedPoly { poly, digit: 0, parms_id: *self.params.parms_id() }
    }

    /// Decodes an encoded poly by evaluating it at the base.
    pub fn decode(&self, encoded: &BalancedEncodedPoly) -> f64 {
        if encoded.parms_id() != self.params.parms_id() {
            panic!("[Invalid argument] Encoded poly was produced under different parameters.");
        }
        if !encoded.is_valid() {
            panic!("[Invalid argument] Encoded poly is not valid for decoding.");
        }
        let rw = self.params.rw();
        let digit = encoded.digit();
        encoded.poly().iter()
            .map(|(k, v)| v as f64 * rw.powi((k + digit) as i32))
            .sum()
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_near(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() < tol, "{} vs {} (tol {})", a, b, tol);
    }

    fn default_coder() -> BalancedCoder {
        BalancedCoder::new(BalancedParams::new(1.2, 1e-8))
    }

    #[test]
    fn test_compare_original_to_decoded_encoded() {
        let coder = default_coder();
        for original in [0.0, 546.0, 546.789, 23.456, 0.2345, 1.0, 2.5, 567.68, 1008.01, -1.0, -256.16] {
            let encoded = coder.encode(original);
            let decoded = coder.decode(&encoded);
            assert_near(original, decoded, coder.params().epsil());
        }
    }

    #[test]
    fn test_encoded_shape() {
        let coder = default_coder();
        for original in [546.789, 0.2563, 0.0023, 12.765, -256.16] {
            let encoded = coder.encode(original);
            assert!(encoded.digit() <= 0);
            assert!(!encoded.poly().is_laurent());
            if encoded.digit() < 0 {
                assert_eq!(encoded.poly().first_exponent(), Some(0));
            }
            assert!(encoded.poly().iter().all(|(_, v)| v == 1 || v == -1));
        }
    }

    #[test]
    fn test_integer_keeps_zero_digit() {
        let coder = BalancedCoder::new(BalancedParams::new(2.0, 1e-8));
        let encoded = coder.encode(8.0);
        assert_eq!(encoded.digit(), 0);
        assert_eq!(encoded.poly().coeff(3), 1);
        assert_eq!(encoded.poly().len(), 1);
    }

    #[test]
    fn test_zero_encodes_empty() {
        let coder = default_coder();
        let encoded = coder.encode(0.0);
        assert!(encoded.poly().is_empty());
        assert_eq!(encoded.digit(), 0);
        assert_eq!(coder.decode(&encoded), 0.0);
    }

    #[test]
    fn test_balanced_addition() {
        let coder = default_coder();
        let closure = |num1: f64, num2: f64| {
            let encoded1 = coder.encode(num1);
            let encoded2 = coder.encode(num2);
            let decoded = coder.decode(&(encoded1 + encoded2));
            assert_near(num1 + num2, decoded, 2.0 * coder.params().epsil());
        };
        closure(234.0, 241.0);
        closure(12.765, 0.2563);
        closure(0.0023, 0.0000021);
        closure(-1.115, 20.20);
        closure(0.0, 546.789);
        closure(546.789, -546.789);
    }

    #[test]
    fn test_balanced_multiplication() {
        let coder = default_coder();
        let closure = |num1: f64, num2: f64| {
            let encoded1 = coder.encode(num1);
            let encoded2 = coder.encode(num2);
            let decoded = coder.decode(&(encoded1 * encoded2));
            assert_near(num1 * num2, decoded, coder.params().epsil() * (num1.abs() + num2.abs()));
        };
        closure(234.0, 241.0);
        closure(12.765, 0.2563);
        closure(-1.115, 20.20);
        closure(2.5, -1.0);
    }

    #[test]
    fn test_negation() {
        let coder = default_coder();
        let encoded = coder.encode(546.789);
        assert_near(coder.decode(&(-encoded)), -546.789, coder.params().epsil());
    }

    #[test]
    fn test_constant() {
        let coder = default_coder();
        assert_eq!(coder.decode(&coder.constant(2)), 2.0);
        assert_eq!(coder.decode(&coder.constant(0)), 0.0);
        let two = coder.constant(2);
        let x = coder.encode(0.7);
        assert_near(coder.decode(&(two + (-x))), 2.0 - 0.7, coder.params().epsil());
    }

    #[test]
    fn test_rem_mod_keeps_sign_coefficients() {
        let coder = default_coder();
        let encoded = coder.encode(567.68);
        let reduced = encoded.rem_mod(127);
        // Coefficients are already within (-p, p), so nothing changes.
        assert_eq!(reduced.poly(), encoded.poly());
        assert_eq!(reduced.digit(), encoded.digit());
    }

    #[test]
    #[should_panic(expected = "[Invalid argument] Operands were encoded under different parameters")]
    fn test_mixed_parameters_rejected() {
        let coder1 = default_coder();
        let coder2 = BalancedCoder::new(BalancedParams::new(2.0, 1e-8));
        let _ = coder1.encode(1.5) + coder2.encode(1.5);
    }

    #[test]
    #[should_panic(expected = "[Invalid argument] Encoded poly was produced under different parameters")]
    fn test_decode_with_wrong_coder_rejected() {
        let coder1 = default_coder();
        let coder2 = BalancedCoder::new(BalancedParams::new(2.0, 1e-8));
        coder2.decode(&coder1.encode(1.5));
    }

    #[test]
    fn test_serde_round_trip() {
        let coder = default_coder();
        let encoded = coder.encode(546.789);
        let bytes = bincode::serialize(&encoded).unwrap();
        let back: BalancedEncodedPoly = bincode::deserialize(&bytes).unwrap();
        assert_eq!(encoded, back);
        assert_near(coder.decode(&back), 546.789, coder.params().epsil());
    }
}
