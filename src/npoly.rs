use std::ops::{Add, Mul, Neg};

use crate::{
    balanced::{BalancedCoder, BalancedEncodedPoly},
    encoding_parameters::BalancedParams,
    sparse_poly::SparsePoly,
    util,
};

/// A vector of encoded polys carrying the same number reduced modulo each
/// member of a CRT basis.
///
/// The N-modulus generalization of [DualPoly](crate::DualPoly): operations
/// apply to every component, and decoding folds the components back together
/// one modulus at a time.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NPoly<E> {
    polys: Vec<E>,
}

impl<E> NPoly<E> {

    /// Wraps one encoded poly per modulus.
    pub fn new(polys: Vec<E>) -> Self {
        NPoly { polys }
    }

    /// The components.
    pub fn polys(&self) -> &[E] {
        &self.polys
    }

    /// The number of components.
    pub fn len(&self) -> usize {
        self.polys.len()
    }

    /// Does the wrapper hold no components?
    pub fn is_empty(&self) -> bool {
        self.polys.is_empty()
    }

    fn check_same_len(&self, other: &Self) {
        if self.polys.len() != other.polys.len() {
            panic!("[Invalid argument] Operands must have the same number of components.");
        }
    }

}

impl<E: Add<Output = E>> Add for NPoly<E> {
    type Output = NPoly<E>;
    fn add(self, other: NPoly<E>) -> NPoly<E> {
        self.check_same_len(&other);
        let polys = self.polys.into_iter().zip(other.polys)
            .map(|(a, b)| a + b)
            .collect();
        NPoly { polys }
    }
}

impl<E: Mul<Output = E>> Mul for NPoly<E> {
    type Output = NPoly<E>;
    fn mul(self, other: NPoly<E>) -> NPoly<E> {
        self.check_same_len(&other);
        let polys = self.polys.into_iter().zip(other.polys)
            .map(|(a, b)| a * b)
            .collect();
        NPoly { polys }
    }
}

impl<E: Neg<Output = E>> Neg for NPoly<E> {
    type Output = NPoly<E>;
    fn neg(self) -> NPoly<E> {
        NPoly { polys: self.polys.into_iter().map(|p| -p).collect() }
    }
}

/// Encodes single real numbers into residue vectors over a CRT basis of
/// pairwise coprime moduli.
///
/// Generalizes [DualCoder](crate::DualCoder) from a modulus pair to any
/// basis size. A basis of one modulus degenerates to the plain
/// [BalancedCoder] representation.
pub struct NCoder {
    coder: BalancedCoder,
    mods: Vec<i64>,
}

impl NCoder {

    /// Creates a coder for the given parameters and CRT basis.
    pub fn new(params: BalancedParams, mods: Vec<i64>) -> Result<Self, String> {
        util::validate_crt_moduli(&mods)?;
        Ok(NCoder {
            coder: BalancedCoder::new(params),
            mods,
        })
    }

    /// The coder parameters.
    pub fn params(&self) -> &BalancedParams {
        self.coder.params()
    }

    /// The CRT basis.
    pub fn mods(&self) -> &[i64] {
        &self.mods
    }

    /// Encodes a real number into one residue poly per modulus.
    pub fn encode(&self, num: f64) -> NPoly<BalancedEncodedPoly> {
        let whole_encoded = self.coder.encode(num);
        let polys = self.mods.iter()
            .map(|&p| whole_encoded.rem_mod(p))
            .collect();
        NPoly::new(polys)
    }

    /// Encodes an integer constant into one residue poly per modulus.
    pub fn constant(&self, value: i64) -> NPoly<BalancedEncodedPoly> {
        let whole_encoded = self.coder.constant(value);
        let polys = self.mods.iter()
            .map(|&p| whole_encoded.rem_mod(p))
            .collect();
        NPoly::new(polys)
    }

    /// Recomposes the residue vector and decodes the result.
    pub fn decode(&self, npoly: &NPoly<BalancedEncodedPoly>) -> f64 {
        self.coder.decode(&self.recompose(npoly))
    }

    fn recompose(&self, npoly: &NPoly<BalancedEncodedPoly>) -> BalancedEncodedPoly {
        let encoded_polys = npoly.polys();
        if encoded_polys.len() != self.mods.len() {
            panic!("[Invalid argument] One component per modulus is required.");
        }
        let front = &encoded_polys[0];
        if encoded_polys.iter().any(|poly| poly.digit() != front.digit()) {
            panic!("[Logic error] Digits were not equal while recomposing.");
        }
        let mut recomposed_poly = front.poly().clone();
        let mut recomposed_mod = self.mods[0];
        for i in 1..self.mods.len() {
            recomposed_poly = SparsePoly::recomp_crt(
                (&recomposed_poly, recomposed_mod),
                (encoded_polys[i].poly(), self.mods[i]),
            );
            recomposed_mod *= self.mods[i];
        }
        let recomposed_poly = recomposed_poly.center_lift(recomposed_mod);
        BalancedEncodedPoly::from_members(recomposed_poly, front.digit(), *front.parms_id())
    }

}
