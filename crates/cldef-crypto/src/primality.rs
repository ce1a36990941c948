//! Probabilistic primality testing.

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, ToPrimitive, Zero};
use rand::RngCore;

/// Primes below 1000, used for trial division before Miller-Rabin.
pub const SMALL_PRIMES: [u32; 168] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43,
    47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97, 101, 103, 107,
    109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181,
    191, 193, 197, 199, 211, 223, 227, 229, 233, 239, 241, 251, 257, 263,
    269, 271, 277, 281, 283, 293, 307, 311, 313, 317, 331, 337, 347, 349,
    353, 359, 367, 373, 379, 383, 389, 397, 401, 409, 419, 421, 431, 433,
    439, 443, 449, 457, 461, 463, 467, 479, 487, 491, 499, 503, 509, 521,
    523, 541, 547, 557, 563, 569, 571, 577, 587, 593, 599, 601, 607, 613,
    617, 619, 631, 641, 643, 647, 653, 659, 661, 673, 677, 683, 691, 701,
    709, 719, 727, 733, 739, 743, 751, 757, 761, 769, 773, 787, 797, 809,
    811, 821, 823, 827, 829, 839, 853, 857, 859, 863, 877, 881, 883, 887,
    907, 911, 919, 929, 937, 941, 947, 953, 967, 971, 977, 983, 991, 997,
];

/// Squares of numbers below this bound are fully decided by trial division.
const TRIAL_DIVISION_LIMIT: u64 = 997 * 997;

/// Whether `n` has no factor among [`SMALL_PRIMES`] (other than itself).
pub fn passes_trial_division(n: &BigUint) -> bool {
    if let Some(small) = n.to_u32() {
        if SMALL_PRIMES.binary_search(&small).is_ok() {
            return true;
        }
    }
    SMALL_PRIMES.iter().all(|&p| !(n % p).is_zero())
}

/// Miller-Rabin test with `rounds` random bases.
///
/// A composite survives a single round with probability at most 1/4, so
/// 64 rounds bound the false-positive rate by 2^-128.
pub fn is_probable_prime<R: RngCore + ?Sized>(n: &BigUint, rounds: u32, rng: &mut R) -> bool {
    if let Some(small) = n.to_u64() {
        if small < 2 {
            return false;
        }
        if small <= u32::MAX as u64 && SMALL_PRIMES.binary_search(&(small as u32)).is_ok() {
            return true;
        }
    }
    if !passes_trial_division(n) {
        return false;
    }
    if n.to_u64().is_some_and(|v| v < TRIAL_DIVISION_LIMIT) {
        return true;
    }

    let one = BigUint::one();
    let two = BigUint::from(2u32);
    let n_minus_one = n - &one;
    // n is odd here, so s >= 1
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;

    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, &n_minus_one);
        let mut x = a.modpow(&d, n);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
            if x == one {
                return false;
            }
        }
        return false;
    }
    true
}
