use crate::SparsePoly;

// Bounds the expansion loop. Each round shrinks the remainder by a factor of
// at least (rw - 1) / 2 relative to the previous one, so for any sane (rw,
// epsil) pair the loop ends far earlier.
const GAP_ROUNDS_MAX: usize = 4096;

#[inline]
pub(crate) fn signum(x: f64) -> f64 {
    ((x > 0.0) as i64 - ((x < 0.0) as i64)) as f64
}

pub(crate) fn validate_rw_epsil(rw: f64, epsil: f64) {
    if !rw.is_finite() || rw <= 1.0 {
        panic!("[Invalid argument] Base rw must be finite and greater than 1.");
    }
    if !epsil.is_finite() || epsil <= 0.0 {
        panic!("[Invalid argument] Precision epsil must be finite and positive.");
    }
}

/// Expand a real number into a sparse Laurent polynomial over powers of a
/// non-integer base, with coefficients in `{-1, +1}`.
///
/// At each round the closest power of `rw` to the running remainder is
/// recorded (balanced rounding, which keeps the residual smallest) and the
/// signed difference becomes the next remainder; the loop ends once the
/// remainder drops below `epsil`. Evaluating the result at `rw` recovers the
/// input to within `epsil`.
///
/// A number smaller than `epsil` in magnitude, including zero, expands to the
/// empty polynomial. Exponents are negative for the fractional part; see
/// [BalancedCoder](crate::BalancedCoder) and
/// [FractionalCoder](crate::FractionalCoder) for the representations that
/// make the result usable as a plaintext polynomial.
pub fn gap(theta: f64, rw: f64, epsil: f64) -> SparsePoly {
    validate_rw_epsil(rw, epsil);
    if !theta.is_finite() {
        panic!("[Invalid argument] Cannot encode a non-finite number.");
    }
    let log_rw = rw.ln();
    let mut a = SparsePoly::new();
    let mut t = theta.abs();
    let mut sigma = signum(theta);
    let mut rounds = 0;
    while t >= epsil {
        if rounds >= GAP_ROUNDS_MAX {
            panic!("[Logic error] Balanced expansion did not converge.");
        }
        let mut r = (t.ln() / log_rw).ceil() as i64;
        // Balanced rounding: prefer the lower power when it is closer.
        if rw.powi(r as i32) - t > t - rw.powi(r as i32 - 1) {
            r -= 1;
        }
        a.set_coeff(r, sigma as i64);
        let t_minus_po = t - rw.powi(r as i32);
        sigma *= signum(t_minus_po);
        t = t_minus_po.abs();
        rounds += 1;
    }
    a
}
