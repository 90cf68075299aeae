use std::ops::{Add, Mul, Neg};

use crate::{
    encoding_parameters::{BalancedSlotsParams, ParmsID},
    gap::gap,
    sparse_poly::{SparseMultiPoly, SparsePoly},
    ValCheck,
};

/// A vector of real numbers encoded as one balanced sparse polynomial per
/// plaintext slot, each slot carrying its own fractional-shift digit.
///
/// Operations apply slotwise; see
/// [BalancedEncodedPoly](crate::BalancedEncodedPoly) for the digit rules.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BalancedSlotsEncodedPoly {
    poly: SparseMultiPoly,
    digits: Vec<i64>,
    parms_id: ParmsID,
}

impl BalancedSlotsEncodedPoly {

    /// The per-slot polynomials.
    pub fn poly(&self) -> &SparseMultiPoly {
        &self.poly
    }

    /// The per-slot fractional shifts. Non-positive.
    pub fn digits(&self) -> &[i64] {
        &self.digits
    }

    /// The [ParmsID] of the parameters this poly was encoded under.
    pub fn parms_id(&self) -> &ParmsID {
        &self.parms_id
    }

    /// Reduce every coefficient modulo `p`, keeping digits and parameters.
    pub fn rem_mod(&self, p: i64) -> Self {
        BalancedSlotsEncodedPoly {
            poly: self.poly.rem_mod(p),
            digits: self.digits.clone(),
            parms_id: self.parms_id,
        }
    }

    fn check_compatible(&self, other: &Self) {
        if self.parms_id != other.parms_id {
            panic!("[Invalid argument] Operands were encoded under different parameters.");
        }
        if self.digits.len() != other.digits.len() {
            panic!("[Invalid argument] Operands must have the same number of slots.");
        }
    }

}

impl Add for BalancedSlotsEncodedPoly {
    type Output = BalancedSlotsEncodedPoly;
    fn add(self, other: BalancedSlotsEncodedPoly) -> BalancedSlotsEncodedPoly {
        self.check_compatible(&other);
        // Slotwise digit alignment, as for single numbers.
        let mut slots = Vec::with_capacity(self.digits.len());
        let mut digits = Vec::with_capacity(self.digits.len());
        let pairs = self.poly.slots().iter().zip(self.digits.iter())
            .zip(other.poly.slots().iter().zip(other.digits.iter()));
        for ((lpoly, &ldigit), (rpoly, &rdigit)) in pairs {
            if ldigit < rdigit {
                slots.push(lpoly + &rpoly.shift(rdigit - ldigit));
                digits.push(ldigit);
            } else {
                slots.push(rpoly + &lpoly.shift(ldigit - rdigit));
                digits.push(rdigit);
            }
        }
        BalancedSlotsEncodedPoly {
            poly: SparseMultiPoly::from_slots(slots),
            digits,
            parms_id: self.parms_id,
        }
    }
}

impl Mul for BalancedSlotsEncodedPoly {
    type Output = BalancedSlotsEncodedPoly;
    fn mul(self, other: BalancedSlotsEncodedPoly) -> BalancedSlotsEncodedPoly {
        self.check_compatible(&other);
        let digits = self.digits.iter().zip(other.digits.iter())
            .map(|(&l, &r)| l + r)
            .collect();
        BalancedSlotsEncodedPoly {
            poly: &self.poly * &other.poly,
            digits,
            parms_id: self.parms_id,
        }
    }
}

impl Neg for BalancedSlotsEncodedPoly {
    type Output = BalancedSlotsEncodedPoly;
    fn neg(mut self) -> BalancedSlotsEncodedPoly {
        self.poly.negate();
        self
    }
}

/// Encodes vectors of real numbers slotwise as balanced sparse polynomials.
///
/// The slot-wise counterpart of [BalancedCoder](crate::BalancedCoder): every
/// input number occupies one plaintext slot, and operations on the encoded
/// vectors act slotwise, mirroring the SIMD behaviour of batched HE
/// plaintexts.
pub struct BalancedSlotsCoder {
    params: BalancedSlotsParams,
}

impl BalancedSlotsCoder {

    /// Creates a coder for the given parameters.
    pub fn new(params: BalancedSlotsParams) -> Self {
        BalancedSlotsCoder { params }
    }

    /// The coder parameters.
    pub fn params(&self) -> &BalancedSlotsParams {
        &self.params
    }

    /// Encodes a vector of real numbers, one per slot.
    pub fn encode(&self, nums: &[f64]) -> BalancedSlotsEncodedPoly {
        let mut slots = Vec::with_capacity(nums.len());
        let mut digits = Vec::with_capacity(nums.len());
        for &num in nums {
            let a = gap(num, self.params.rw(), self.params.epsil());
            let digit = a.first_exponent().map_or(0, |k| k.min(0));
            slots.push(a.shift(-digit));
            digits.push(digit);
        }
        BalancedSlotsEncodedPoly {
            poly: SparseMultiPoly::from_slots(slots),
            digits,
            parms_id: *self.params.parms_id(),
        }
    }

    /// Encodes the same integer constant into every slot of an encoded poly
    /// with the given slot count.
    pub fn constant(&self, value: i64, slot_count: usize) -> BalancedSlotsEncodedPoly {
        let mut poly = SparsePoly::new();
        poly.set_coeff(0, value);
        BalancedSlotsEncodedPoly {
            poly: SparseMultiPoly::from_slots(vec![poly; slot_count]),
            digits: vec![0; slot_count],
            parms_id: *self.params.parms_id(),
        }
    }

    /// Decodes an encoded poly back into one number per slot.
    pub fn decode(&self, encoded: &BalancedSlotsEncodedPoly) -> Vec<f64> {
        if encoded.parms_id() != self.params.parms_id() {
            panic!("[Invalid argument] Encoded poly was produced under different parameters.");
        }
        if !encoded.is_valid() {
            panic!("[Invalid argument] Encoded poly is not valid for decoding.");
        }
        let rw = self.params.rw();
        encoded.poly().slots().iter().zip(encoded.digits().iter())
            .map(|(slot, &digit)| {
                slot.iter().map(|(k, v)| v as f64 * rw.powi((k + digit) as i32)).sum()
            })
            .collect()
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_near(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() < tol, "{} vs {} (tol {})", a, b, tol);
    }

    fn default_coder() -> BalancedSlotsCoder {
        BalancedSlotsCoder::new(BalancedSlotsParams::new(1.2, 1e-8))
    }

    #[test]
    fn test_compare_original_to_decoded_encoded() {
        let coder = default_coder();
        let cases: &[&[f64]] = &[
            &[0.0, 1.2, 0.235, 12.3, 546.0, 546.789],
            &[21.0, 2.987, 5.678],
            &[0.000000001, 12345.0, 2345.987],
        ];
        for original in cases {
            let encoded = coder.encode(original);
            let decoded = coder.decode(&encoded);
            assert_eq!(decoded.len(), original.len());
            for (i, (&o, &d)) in original.iter().zip(decoded.iter()).enumerate() {
                assert_near(o, d, coder.params().epsil());
                assert!(encoded.digits()[i] <= 0);
            }
        }
    }

    #[test]
    fn test_slotwise_addition_aligns_digits() {
        let coder = default_coder();
        let a = [0.0, 1.2, 0.235, 12.3, 546.789];
        let b = [546.789, -1.2, 5.678, 0.0023, -256.16];
        let encoded = coder.encode(&a) + coder.encode(&b);
        let decoded = coder.decode(&encoded);
        for i in 0..a.len() {
            assert_near(a[i] + b[i], decoded[i], 2.0 * coder.params().epsil());
        }
    }

    #[test]
    fn test_slotwise_multiplication() {
        let coder = default_coder();
        let a = [1.0, 1.2, 0.235, 12.3, -546.789];
        let b = [546.789, -1.2, 5.678, 0.0023, 0.0];
        let encoded = coder.encode(&a) * coder.encode(&b);
        let decoded = coder.decode(&encoded);
        for i in 0..a.len() {
            assert_near(a[i] * b[i], decoded[i], coder.params().epsil() * (a[i].abs() + b[i].abs()));
        }
    }

    #[test]
    fn test_constant_and_negation() {
        let coder = default_coder();
        let x = coder.encode(&[0.3, 0.7, 0.9]);
        let two = coder.constant(2, 3);
        let decoded = coder.decode(&(two + (-x)));
        for (i, expected) in [1.7, 1.3, 1.1].iter().enumerate() {
            assert_near(decoded[i], *expected, 2.0 * coder.params().epsil());
        }
    }

    #[test]
    #[should_panic(expected = "[Invalid argument] Operands must have the same number of slots")]
    fn test_slot_count_mismatch_rejected() {
        let coder = default_coder();
        let _ = coder.encode(&[1.0, 2.0]) + coder.encode(&[1.0]);
    }

    #[test]
    fn test_serde_round_trip() {
        let coder = default_coder();
        let encoded = coder.encode(&[21.0, 2.987, 5.678]);
        let bytes = bincode::serialize(&encoded).unwrap();
        let back: BalancedSlotsEncodedPoly = bincode::deserialize(&bytes).unwrap();
        assert_eq!(encoded, back);
    }
}
