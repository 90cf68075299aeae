//! Balanced non-adjacent-form plaintext encoding for homomorphic arithmetic
//! on real numbers.
//!
//! An HE scheme computes on polynomials with small integer coefficients, not
//! on reals. This crate maps arbitrary real numbers onto sparse polynomials
//! with coefficients in `{-1, 0, +1}` over powers of a non-integer base
//! (NIBNAF: Non-Integer-Base Non-Adjacent-Form), so that the numbers can be
//! placed into plaintext coefficients, manipulated through polynomial
//! addition and multiplication, and recovered by evaluating at the base.
//!
//! Four representations are provided:
//! - [BalancedCoder]: one number per poly, the fractional shift carried
//!   beside the poly as a digit.
//! - [BalancedSlotsCoder]: one number per plaintext slot with per-slot
//!   digits, mirroring SIMD batching.
//! - [FractionalCoder]: the fractional part folded into the top of a
//!   power-of-two ring, the way a cyclotomic plaintext ring folds negative
//!   powers.
//! - [DualCoder] / [NCoder]: the balanced representation reduced modulo two
//!   or more coprime moduli, recomposed through the Chinese Remainder
//!   Theorem at decoding; this lets encodings span plaintext spaces too
//!   small to hold them alone.
//!
//! [goldschmidt] runs iterative division over any of the encoded forms.
//!
//! ```rust
//! use nibnaf::{BalancedCoder, BalancedParams};
//! let coder = BalancedCoder::new(BalancedParams::new(1.2, 1e-8));
//! let a = coder.encode(12.765);
//! let b = coder.encode(0.2563);
//! let product = coder.decode(&(a * b));
//! assert!((product - 12.765 * 0.2563).abs() < 1e-6);
//! ```
#![warn(missing_docs)]

mod sparse_poly;
mod gap;
mod encoding_parameters;
mod balanced;
mod balanced_slots;
mod fractional;
mod dual_poly;
mod npoly;
mod goldschmidt;
mod valcheck;
pub mod util;

pub use sparse_poly::{SparsePoly, SparseMultiPoly};
pub use gap::gap;
pub use encoding_parameters::{
    CoderType, ParmsID, PARMS_ID_ZERO,
    BalancedParams, BalancedSlotsParams, FractionalParams,
};
pub use balanced::{BalancedCoder, BalancedEncodedPoly};
pub use balanced_slots::{BalancedSlotsCoder, BalancedSlotsEncodedPoly};
pub use fractional::{FractionalCoder, FractionalEncodedPoly};
pub use dual_poly::{DualCoder, DualPoly};
pub use npoly::{NCoder, NPoly};
pub use goldschmidt::goldschmidt;
pub use valcheck::ValCheck;
