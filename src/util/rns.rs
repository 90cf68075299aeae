use crate::util::number_theory::{are_coprime, xgcd};

/// Check that the given moduli form a valid CRT basis:
/// all at least 2 and pairwise coprime.
pub fn validate_crt_moduli(moduli: &[i64]) -> Result<(), String> {
    if moduli.is_empty() {
        return Err("[Invalid argument] CRT basis cannot be empty.".to_string());
    }
    for (i, &m) in moduli.iter().enumerate() {
        if m < 2 {
            return Err("[Invalid argument] CRT moduli must be at least 2.".to_string());
        }
        for &n in moduli.iter().take(i) {
            if !are_coprime(m, n) {
                return Err("[Invalid argument] CRT moduli must be pairwise coprime.".to_string());
            }
        }
    }
    Ok(())
}

/// Decompose a number into its remainders modulo each member of the basis.
/// The remainders keep the sign of the input.
pub fn decomp_crt(num: i64, moduli: &[i64]) -> Vec<i64> {
    moduli.iter().map(|&m| num % m).collect()
}

/// Recompose the unique value in `[0, m * n)` from its residues modulo the
/// coprime pair `m, n`, through the Bezout coefficients of the moduli.
pub fn recomp_crt(am: (i64, i64), bn: (i64, i64)) -> i64 {
    let (a, m) = am;
    let (b, n) = bn;
    let (cd, x, y) = xgcd(m, n);
    if cd != 1 {
        panic!("[Invalid argument] CRT moduli must be coprime, gcd({}, {}) is {}.", m, n, cd);
    }
    let big_mod = (m as i128) * (n as i128);
    // m * x + n * y == 1, so a * n * y recovers a mod m and b * m * x recovers b mod n.
    let recompose = (a as i128) * (n as i128) * (y as i128) + (b as i128) * (m as i128) * (x as i128);
    recompose.rem_euclid(big_mod) as i64
}
