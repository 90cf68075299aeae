use std::ops::{Add, Mul, Neg};

use crate::{
    balanced::{BalancedCoder, BalancedEncodedPoly},
    encoding_parameters::BalancedParams,
    sparse_poly::SparsePoly,
    util,
};

/// A pair of encoded polys carrying the same number reduced modulo two
/// different moduli.
///
/// The decomposition happens at encoding time, so every operation is simply
/// applied to both halves; the halves only meet again at decoding, where the
/// coefficients are recomposed through the CRT. The wrapper is generic over
/// the encoded type so that anything with `+`, `*` and negation can ride in
/// it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DualPoly<E> {
    hi: E,
    lo: E,
}

impl<E> DualPoly<E> {

    /// Wraps two encoded polys.
    pub fn new(hi: E, lo: E) -> Self {
        DualPoly { hi, lo }
    }

    /// The two halves.
    pub fn polys(&self) -> (&E, &E) {
        (&self.hi, &self.lo)
    }

    /// Consumes the pair into its halves.
    pub fn into_polys(self) -> (E, E) {
        (self.hi, self.lo)
    }

}

impl<E: Add<Output = E>> Add for DualPoly<E> {
    type Output = DualPoly<E>;
    fn add(self, other: DualPoly<E>) -> DualPoly<E> {
        DualPoly {
            hi: self.hi + other.hi,
            lo: self.lo + other.lo,
        }
    }
}

impl<E: Mul<Output = E>> Mul for DualPoly<E> {
    type Output = DualPoly<E>;
    fn mul(self, other: DualPoly<E>) -> DualPoly<E> {
        DualPoly {
            hi: self.hi * other.hi,
            lo: self.lo * other.lo,
        }
    }
}

impl<E: Neg<Output = E>> Neg for DualPoly<E> {
    type Output = DualPoly<E>;
    fn neg(self) -> DualPoly<E> {
        DualPoly {
            hi: -self.hi,
            lo: -self.lo,
        }
    }
}

/// Encodes single real numbers into residue pairs modulo two coprime moduli.
///
/// Wraps a [BalancedCoder]: a number is encoded once and its coefficients are
/// reduced modulo each of the two moduli, giving one encoded poly per
/// modulus. This is the two-modulus composition that lets an encoding span
/// two plaintext spaces too small to hold it alone, the coefficients living
/// in the product range `m * n` through the CRT.
///
/// Decoding recomposes each coefficient from its residues, lifts it into the
/// symmetric range around zero, and evaluates. The moduli are validated to be
/// pairwise coprime at construction.
pub struct DualCoder {
    coder: BalancedCoder,
    mods: (i64, i64),
}

impl DualCoder {

    /// Creates a coder for the given parameters and modulus pair.
    pub fn new(params: BalancedParams, mods: (i64, i64)) -> Result<Self, String> {
        util::validate_crt_moduli(&[mods.0, mods.1])?;
        Ok(DualCoder {
            coder: BalancedCoder::new(params),
            mods,
        })
    }

    /// The coder parameters.
    pub fn params(&self) -> &BalancedParams {
        self.coder.params()
    }

    /// The modulus pair.
    pub fn mods(&self) -> (i64, i64) {
        self.mods
    }

    /// Encodes a real number into a residue pair.
    pub fn encode(&self, num: f64) -> DualPoly<BalancedEncodedPoly> {
        let whole_encoded = self.coder.encode(num);
        DualPoly::new(
            whole_encoded.rem_mod(self.mods.0),
            whole_encoded.rem_mod(self.mods.1),
        )
    }

    /// Encodes an integer constant into a residue pair.
    pub fn constant(&self, value: i64) -> DualPoly<BalancedEncodedPoly> {
        let whole_encoded = self.coder.constant(value);
        DualPoly::new(
            whole_encoded.rem_mod(self.mods.0),
            whole_encoded.rem_mod(self.mods.1),
        )
    }

    /// Recomposes the residue pair and decodes the result.
    pub fn decode(&self, dual_poly: &DualPoly<BalancedEncodedPoly>) -> f64 {
        self.coder.decode(&self.recompose(dual_poly))
    }

    fn recompose(&self, dual_poly: &DualPoly<BalancedEncodedPoly>) -> BalancedEncodedPoly {
        let (hi_encoded, lo_encoded) = dual_poly.polys();
        if hi_encoded.digit() != lo_encoded.digit() {
            panic!("[Logic error] Digits were not equal while recomposing.");
        }
        let (m, n) = self.mods;
        let recomposed = SparsePoly::recomp_crt((hi_encoded.poly(), m), (lo_encoded.poly(), n))
            .center_lift(m * n);
        BalancedEncodedPoly::from_members(recomposed, hi_encoded.digit(), *hi_encoded.parms_id())
    }

}
