use std::collections::BTreeMap;
use std::ops::{Add, Mul, Neg};

use crate::{
    encoding_parameters::{FractionalParams, ParmsID},
    gap::gap,
    sparse_poly::SparsePoly,
    ValCheck,
};

// Fold exponents into [0, n) through x^n = -1, flipping the coefficient sign
// once per wrap. Folded terms landing on the same exponent accumulate.
fn reduce_negacyclic(poly: &SparsePoly, n: i64) -> SparsePoly {
    let mut acc: BTreeMap<i64, i64> = BTreeMap::new();
    for (k, v) in poly.iter() {
        let (mut k, mut v) = (k, v);
        while k >= n {
            k -= n;
            v = -v;
        }
        while k < 0 {
            k += n;
            v = -v;
        }
        *acc.entry(k).or_insert(0) += v;
    }
    SparsePoly::from_terms(acc)
}

/// A single real number encoded with its negative exponents folded into the
/// top of a power-of-two ring of degree `frac_degree`.
///
/// Where the balanced representation carries the fractional shift beside the
/// poly as a digit, this representation stores `x^-i` as `-x^(frac_degree - i)`,
/// the way a power-of-two cyclotomic ring folds negative powers. There is no
/// extra metadata to align, so addition is plain termwise addition; products
/// reduce through `x^frac_degree = -1`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FractionalEncodedPoly {
    poly: SparsePoly,
    frac_degree: i64,
    parms_id: ParmsID,
}

impl FractionalEncodedPoly {

    /// The folded polynomial. All exponents lie in `[0, frac_degree)`.
    pub fn poly(&self) -> &SparsePoly {
        &self.poly
    }

    /// The ring degree the fractional part is folded into.
    pub fn frac_degree(&self) -> i64 {
        self.frac_degree
    }

    /// The [ParmsID] of the parameters this poly was encoded under.
    pub fn parms_id(&self) -> &ParmsID {
        &self.parms_id
    }

    /// Reduce every coefficient modulo `p`, keeping parameters.
    pub fn rem_mod(&self, p: i64) -> Self {
        FractionalEncodedPoly {
            poly: self.poly.rem_mod(p),
            frac_degree: self.frac_degree,
            parms_id: self.parms_id,
        }
    }

    fn check_same_parms(&self, other: &Self) {
        if self.parms_id != other.parms_id {
            panic!("[Invalid argument] Operands were encoded under different parameters.");
        }
    }

}

impl Add for FractionalEncodedPoly {
    type Output = FractionalEncodedPoly;
    fn add(self, other: FractionalEncodedPoly) -> FractionalEncodedPoly {
        self.check_same_parms(&other);
        FractionalEncodedPoly {
            poly: &self.poly + &other.poly,
            frac_degree: self.frac_degree,
            parms_id: self.parms_id,
        }
    }
}

impl Mul for FractionalEncodedPoly {
    type Output = FractionalEncodedPoly;
    fn mul(self, other: FractionalEncodedPoly) -> FractionalEncodedPoly {
        self.check_same_parms(&other);
        FractionalEncodedPoly {
            poly: reduce_negacyclic(&(&self.poly * &other.poly), self.frac_degree),
            frac_degree: self.frac_degree,
            parms_id: self.parms_id,
        }
    }
}

impl Neg for FractionalEncodedPoly {
    type Output = FractionalEncodedPoly;
    fn neg(mut self) -> FractionalEncodedPoly {
        self.poly.negate();
        self
    }
}

/// Encodes single real numbers with the fractional part folded into the top
/// coefficients of a power-of-two ring.
///
/// The polynomial representation for fractional decoding: where a power-of-two
/// cyclotomic of degree N is the plaintext ring, `x^-i` is replaced by
/// `-x^(N - i)`. This matches the ring an HE plaintext actually lives in, so
/// the encoded poly can be carried into plaintext coefficients without any
/// side channel for the fractional shift. The price is that integer and
/// fractional parts share the coefficient range and must not meet in the
/// middle: the representation is only faithful while the expansion stays
/// clear of the `N/2` midpoint.
///
/// See [BalancedCoder](crate::BalancedCoder) for the digit-carrying
/// alternative.
pub struct FractionalCoder {
    params: FractionalParams,
}

impl FractionalCoder {

    /// Creates a coder for the given parameters.
    pub fn new(params: FractionalParams) -> Self {
        FractionalCoder { params }
    }

    /// The coder parameters.
    pub fn params(&self) -> &FractionalParams {
        &self.params
    }

    /// Encodes a real number.
    /// ```rust
    /// use nibnaf::{FractionalCoder, FractionalParams};
    /// let coder = FractionalCoder::new(FractionalParams::new(1.2, 1e-8, 4096));
    /// let encoded = coder.encode(23.456);
    /// assert!((coder.decode(&encoded) - 23.456).abs() < 1e-8);
    /// ```
    pub fn encode(&self, num: f64) -> FractionalEncodedPoly {
        let a = gap(num, self.params.rw(), self.params.epsil());
        FractionalEncodedPoly {
            poly: reduce_negacyclic(&a, self.params.frac_degree()),
            frac_degree: self.params.frac_degree(),
            parms_id: *self.params.parms_id(),
        }
    }

    /// Decodes an encoded poly. Exponents above the midpoint are read back
    /// as folded negative powers.
    pub fn decode(&self, encoded: &FractionalEncodedPoly) -> f64 {
        if encoded.parms_id() != self.params.parms_id() {
            panic!("[Invalid argument] Encoded poly was produced under different parameters.");
        }
        if !encoded.is_valid() {
            panic!("[Invalid argument] Encoded poly is not valid for decoding.");
        }
        let rw = self.params.rw();
        let frac_degree = self.params.frac_degree();
        let midpoint = frac_degree / 2;
        encoded.poly().iter()
            .map(|(k, v)| {
                if k > midpoint {
                    -(v as f64) * rw.powi((k - frac_degree) as i32)
                } else {
                    v as f64 * rw.powi(k as i32)
                }
            })
            .sum()
    }

}
