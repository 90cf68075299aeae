use rand::Rng;

const IS_PRIME_NUM_ROUNDS: usize = 40;

pub fn gcd(x: u64, y: u64) -> u64 {
    if x < y {
        gcd(y, x)
    } else if y == 0 {
        x
    } else {
        let f = x % y;
        if f == 0 { y } else { gcd(y, f) }
    }
}

/** Extended GCD:
Returns (gcd, x, y) where gcd is the greatest common divisor of a and b.
The numbers x, y are such that gcd = ax + by. The gcd is non-negative
for any signs of the inputs.
*/
pub fn xgcd(a: i64, b: i64) -> (i64, i64, i64) {
    if b == 0 {
        return (a.abs(), if a < 0 {-1} else {1}, 0);
    }
    let (mut old_r, mut r) = (a, b);
    let (mut old_s, mut s) = (1_i64, 0_i64);
    let (mut old_t, mut t) = (0_i64, 1_i64);
    while r != 0 {
        let q = old_r / r;
        (old_r, r) = (r, old_r - q * r);
        (old_s, s) = (s, old_s - q * s);
        (old_t, t) = (t, old_t - q * t);
    }
    (
        old_r.abs(),
        (if a < 0 {-1} else {1}) * old_s,
        (if b < 0 {-1} else {1}) * old_t,
    )
}

pub fn are_coprime(x: i64, y: i64) -> bool {
    gcd(x.unsigned_abs(), y.unsigned_abs()) <= 1
}

/// Returns the inverse of value modulo modulus, or None when no inverse exists.
pub fn try_invert_i64_mod(value: i64, modulus: i64) -> Option<i64> {
    if modulus < 2 {
        panic!("[Invalid argument] Modulus must be at least 2.");
    }
    let reduced = value.rem_euclid(modulus);
    if reduced == 0 {return None;}
    let (cd, x, _) = xgcd(reduced, modulus);
    if cd != 1 {
        None
    } else {
        Some(x.rem_euclid(modulus))
    }
}

pub fn multiply_u64_mod(a: u64, b: u64, modulus: u64) -> u64 {
    ((a as u128 * b as u128) % modulus as u128) as u64
}

pub fn exponentiate_u64_mod(base: u64, mut exponent: u64, modulus: u64) -> u64 {
    let mut power = base % modulus;
    let mut result = 1 % modulus;
    while exponent > 0 {
        if exponent & 1 != 0 {
            result = multiply_u64_mod(result, power, modulus);
        }
        power = multiply_u64_mod(power, power, modulus);
        exponent >>= 1;
    }
    result
}

pub fn is_prime(value: u64) -> bool {
    // First check the simplest cases.
    if value < 2 {return false;}
    if value == 2 {return true;}
    if value % 2 == 0 {return false;}
    if value == 3 {return true;}
    if value % 3 == 0 {return false;}
    if value == 5 {return true;}
    if value % 5 == 0 {return false;}
    if value == 7 {return true;}
    if value % 7 == 0 {return false;}
    if value == 11 {return true;}
    if value % 11 == 0 {return false;}
    if value == 13 {return true;}
    if value % 13 == 0 {return false;}
    // Second, Miller-Rabin test.
    // Find r and odd d that satisfy value = 2^r * d + 1.
    let mut d = value - 1;
    let mut r = 0;
    while (d & 1) == 0 {d >>= 1; r += 1;}
    if r == 0 {return false;}
    // 1) Pick a = 2, check a^(value - 1).
    // 2) Pick a randomly from [3, value - 1], check a^(value - 1).
    // 3) Repeat 2) for another num_rounds - 2 times.
    let mut random_generator = rand::thread_rng();
    for i in 0..IS_PRIME_NUM_ROUNDS {
        let a = if i == 0 {2} else {random_generator.gen_range(3..value)};
        let mut x = exponentiate_u64_mod(a, d, value);
        if x == 1 || x == value - 1 {continue;}
        let mut count = 0;
        loop {
            x = multiply_u64_mod(x, x, value);
            count += 1;
            if (x == value - 1) || (count >= r - 1) {break;}
        }
        if x != value - 1 {return false;}
    }
    true
}

/// Find `count` distinct primes with the given bit length, largest first.
/// Suitable for building a pairwise coprime CRT basis.
pub fn get_primes(bit_size: usize, mut count: usize) -> Vec<u64> {
    if !(2..=62).contains(&bit_size) {
        panic!("[Invalid argument] Bit size is invalid.");
    }
    let mut destination = vec![];
    // Start with the largest odd number of bit_size bits.
    let mut value = (0x1u64 << bit_size) - 1;
    let lower_bound = 0x1u64 << (bit_size - 1);
    while count > 0 && value > lower_bound {
        if is_prime(value) {
            destination.push(value);
            count -= 1;
        }
        value -= 2;
    }
    if count > 0 {
        panic!("[Logic error] Failed to find enough qualifying primes.");
    }
    destination
}

#[allow(unused)]
pub fn get_prime(bit_size: usize) -> u64 {
    let ret = get_primes(bit_size, 1);
    ret.into_iter().next().unwrap()
}
