use crate::gap::validate_rw_epsil;
use crate::util::hash;

/// A unique identifier for a set of coder parameters.
///
/// Encoded polys carry the ParmsID of the parameter set they were produced
/// under; arithmetic between polys from different parameter sets, or decoding
/// with the wrong coder, is rejected. Two numbers expanded over different
/// bases have no common representation, so mixing them silently would decode
/// to nonsense.
pub type ParmsID = hash::HashBlock;

/// The all-zero ParmsID. Reserved, never assigned to a valid parameter set.
pub const PARMS_ID_ZERO: ParmsID = hash::HASH_ZERO_BLOCK;

/// Describes the coder family a parameter set belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum CoderType {
    /// Fallback. Not valid for encoding.
    #[default]
    None,
    /// Single number per encoded poly, fractional shift carried as a digit.
    Balanced,
    /// One number per slot, fractional shifts carried as per-slot digits.
    BalancedSlots,
    /// Single number, negative exponents folded into the top of a
    /// power-of-two ring.
    Fractional,
}

fn compute_parms_id(coder_type: CoderType, rw: f64, epsil: f64, frac_degree: i64) -> ParmsID {
    let param_data = [
        coder_type as u64,
        rw.to_bits(),
        epsil.to_bits(),
        frac_degree as u64,
    ];
    let mut parms_id = PARMS_ID_ZERO;
    hash::hash(&param_data, &mut parms_id);
    // The zero block is reserved to mean "no parameters".
    if parms_id == PARMS_ID_ZERO {
        panic!("[Logic error] Parms id cannot be zero.");
    }
    parms_id
}

/// Parameters of the balanced coder: the non-integer base `rw > 1` and the
/// termination precision `epsil > 0`.
///
/// A small base close to 1 gives a very sparse expansion with large
/// exponents; a larger base packs the expansion into low degrees at the cost
/// of more terms. See [BalancedCoder](crate::BalancedCoder).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BalancedParams {
    rw: f64,
    epsil: f64,
    parms_id: ParmsID,
}

impl BalancedParams {

    /// Creates a validated parameter set.
    pub fn new(rw: f64, epsil: f64) -> Self {
        validate_rw_epsil(rw, epsil);
        let parms_id = compute_parms_id(CoderType::Balanced, rw, epsil, 0);
        BalancedParams { rw, epsil, parms_id }
    }

    /// The expansion base.
    pub fn rw(&self) -> f64 {self.rw}
    /// The termination precision.
    pub fn epsil(&self) -> f64 {self.epsil}
    /// The unique identifier for the parameter set.
    pub fn parms_id(&self) -> &ParmsID {&self.parms_id}

}

/// Parameters of the slot-wise balanced coder.
/// See [BalancedSlotsCoder](crate::BalancedSlotsCoder).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BalancedSlotsParams {
    rw: f64,
    epsil: f64,
    parms_id: ParmsID,
}

impl BalancedSlotsParams {

    /// Creates a validated parameter set.
    pub fn new(rw: f64, epsil: f64) -> Self {
        validate_rw_epsil(rw, epsil);
        let parms_id = compute_parms_id(CoderType::BalancedSlots, rw, epsil, 0);
        BalancedSlotsParams { rw, epsil, parms_id }
    }

    /// The expansion base.
    pub fn rw(&self) -> f64 {self.rw}
    /// The termination precision.
    pub fn epsil(&self) -> f64 {self.epsil}
    /// The unique identifier for the parameter set.
    pub fn parms_id(&self) -> &ParmsID {&self.parms_id}

}

/// Parameters of the fractional coder: base, precision and the degree of the
/// power-of-two ring the negative exponents are folded into.
/// See [FractionalCoder](crate::FractionalCoder).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FractionalParams {
    rw: f64,
    epsil: f64,
    frac_degree: i64,
    parms_id: ParmsID,
}

impl FractionalParams {

    /// Creates a validated parameter set. The fold mirrors a power-of-two
    /// cyclotomic ring, so `frac_degree` must be a power of two.
    pub fn new(rw: f64, epsil: f64, frac_degree: i64) -> Self {
        validate_rw_epsil(rw, epsil);
        if frac_degree < 2 || !(frac_degree as u64).is_power_of_two() {
            panic!("[Invalid argument] The fractional degree must be a power of two of at least 2.");
        }
        let parms_id = compute_parms_id(CoderType::Fractional, rw, epsil, frac_degree);
        FractionalParams { rw, epsil, frac_degree, parms_id }
    }

    /// The expansion base.
    pub fn rw(&self) -> f64 {self.rw}
    /// The termination precision.
    pub fn epsil(&self) -> f64 {self.epsil}
    /// The ring degree that negative exponents are folded into.
    pub fn frac_degree(&self) -> i64 {self.frac_degree}
    /// The unique identifier for the parameter set.
    pub fn parms_id(&self) -> &ParmsID {&self.parms_id}

}
