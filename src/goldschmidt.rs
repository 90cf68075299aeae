use std::ops::{Add, Mul, Neg};

/// Goldschmidt iterative division over encoded operands.
///
/// Starting from a numerator `N` and divisor `D`, every round multiplies both
/// by `F = 2 - D`, so the fraction `N/D` is unchanged while `D` converges to
/// one quadratically whenever `|1 - D| < 1`. After enough rounds `N` itself
/// approximates the quotient. Because only additions and multiplications are
/// used, the same iteration runs on plain encoded polys, residue pairs and
/// ciphertexts alike; `two` supplies the constant in the operand
/// representation (see the `constant` methods of the coders).
///
/// Returns the transformed `(N, D)` pair so the caller can inspect how far
/// the divisor is from one.
pub fn goldschmidt<T>(numerator: &T, divisor: &T, two: &T, iterations: i64) -> (T, T)
where T: Clone + Add<Output = T> + Mul<Output = T> + Neg<Output = T>
{
    if iterations < 0 {
        panic!(
            "[Invalid argument] goldschmidt must be passed a non-negative iteration count, not {}.",
            iterations
        );
    }
    let mut n = numerator.clone();
    let mut d = divisor.clone();
    // N/D numerator and divisor
    // F_i = 2 - D_i
    // N_i+1/D_i+1 = N_i/D_i * F_i/F_i
    for _ in 0..iterations {
        let f = -d.clone() + two.clone();
        n = n * f.clone();
        d = d * f;
    }
    (n, d)
}
