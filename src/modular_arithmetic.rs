//! Exact modular arithmetic over a prime field Z_p
//!
//! Field elements are stored as `u64` in the standard representation [0, p).
//! Products and sums are formed in `u128`, so every modulus in [2, 2^64) is
//! handled without overflow and without a Barrett or Montgomery domain.
//!
//! The free functions take the modulus explicitly; [`ModularArithmetic`]
//! binds a validated modulus once and is what the transforms carry around.

use crate::error::{NttError, Result};

/// An integer in [0, p) for the modulus p in use
pub type FieldElement = u64;

/// Computes (a + b) mod p, normalized into [0, p)
#[inline]
pub fn add(a: u64, b: u64, p: u64) -> u64 {
    ((a as u128 + b as u128) % p as u128) as u64
}

/// Computes (a - b) mod p, normalized into [0, p)
///
/// Operands do not need to be reduced beforehand.
#[inline]
pub fn sub(a: u64, b: u64, p: u64) -> u64 {
    let a = a % p;
    let b = b % p;
    if a >= b {
        a - b
    } else {
        p - (b - a)
    }
}

/// Computes (a * b) mod p, normalized into [0, p)
#[inline]
pub fn mul(a: u64, b: u64, p: u64) -> u64 {
    ((a as u128 * b as u128) % p as u128) as u64
}

/// Computes (-a) mod p
#[inline]
pub fn neg(a: u64, p: u64) -> u64 {
    sub(0, a, p)
}

/// Computes base^exp mod p by binary exponentiation
///
/// `pow(x, 0, p)` is 1 for every p > 1, including x = 0.
pub fn pow(base: u64, exp: u64, p: u64) -> u64 {
    if p == 1 {
        return 0;
    }

    let mut result = 1u64;
    let mut base = base % p;
    let mut exp = exp;

    while exp > 0 {
        if exp & 1 == 1 {
            result = mul(result, base, p);
        }
        exp >>= 1;
        base = mul(base, base, p);
    }

    result
}

/// Computes a^{-1} mod p by Fermat's little theorem: a^(p-2) mod p
///
/// # Errors
/// * `NoInverse` if a ≡ 0 (mod p)
/// * `InvalidModulus` if p < 2
///
/// The result is only meaningful when p is prime. Primality is not checked
/// here; [`crate::ntt::NttParams`] checks it once at its construction.
pub fn inverse(a: u64, p: u64) -> Result<u64> {
    if p < 2 {
        return Err(NttError::InvalidModulus { modulus: p });
    }
    let a = a % p;
    if a == 0 {
        return Err(NttError::NoInverse { value: a, modulus: p });
    }
    Ok(pow(a, p - 2, p))
}

/// Maps a signed integer onto its representative in [0, p)
#[inline]
pub fn reduce_signed(a: i64, p: u64) -> u64 {
    (a as i128).rem_euclid(p as i128) as u64
}

/// Deterministic Miller-Rabin primality test for the full u64 range
///
/// The first twelve primes as witnesses are sufficient for every n < 2^64.
pub fn is_prime(n: u64) -> bool {
    const WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

    if n < 2 {
        return false;
    }
    for &p in &WITNESSES {
        if n % p == 0 {
            return n == p;
        }
    }

    // Write n-1 as d * 2^r where d is odd
    let mut d = n - 1;
    let mut r = 0u32;
    while d % 2 == 0 {
        d /= 2;
        r += 1;
    }

    'witness: for &a in &WITNESSES {
        let mut x = pow(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..r {
            x = mul(x, x, n);
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }

    true
}

/// Returns true if `root` is a primitive `order`-th root of unity modulo p
///
/// `order` must be a power of two. Every proper divisor of a power of two
/// divides order/2, so primitivity reduces to root^order ≡ 1 and
/// root^(order/2) ≢ 1.
pub fn is_primitive_root(root: u64, order: usize, p: u64) -> bool {
    if p < 2 || !order.is_power_of_two() {
        return false;
    }
    if pow(root, order as u64, p) != 1 {
        return false;
    }
    order == 1 || pow(root, (order / 2) as u64, p) != 1
}

/// Modular arithmetic context bound to a single modulus
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModularArithmetic {
    modulus: u64,
}

impl ModularArithmetic {
    /// Creates a context for the given modulus
    ///
    /// # Errors
    /// `InvalidModulus` if the modulus is 0 or 1. Primality is left to the
    /// caller; see [`is_prime`].
    pub fn new(modulus: u64) -> Result<Self> {
        if modulus < 2 {
            return Err(NttError::InvalidModulus { modulus });
        }
        Ok(Self { modulus })
    }

    #[inline]
    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    #[inline]
    pub fn reduce(&self, a: u64) -> u64 {
        a % self.modulus
    }

    #[inline]
    pub fn add_mod(&self, a: u64, b: u64) -> u64 {
        add(a, b, self.modulus)
    }

    #[inline]
    pub fn sub_mod(&self, a: u64, b: u64) -> u64 {
        sub(a, b, self.modulus)
    }

    #[inline]
    pub fn mul_mod(&self, a: u64, b: u64) -> u64 {
        mul(a, b, self.modulus)
    }

    #[inline]
    pub fn neg_mod(&self, a: u64) -> u64 {
        neg(a, self.modulus)
    }

    #[inline]
    pub fn pow_mod(&self, base: u64, exp: u64) -> u64 {
        pow(base, exp, self.modulus)
    }

    pub fn inv_mod(&self, a: u64) -> Result<u64> {
        inverse(a, self.modulus)
    }

    /// Computes the inverse of a transform length n, used for INTT scaling
    pub fn inv_len(&self, n: usize) -> Result<u64> {
        inverse((n as u128 % self.modulus as u128) as u64, self.modulus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_basic_operations() {
        assert_eq!(add(15, 5, 17), 3);
        assert_eq!(sub(2, 5, 17), 14);
        assert_eq!(sub(5, 2, 17), 3);
        assert_eq!(mul(16, 16, 17), 1);
        assert_eq!(neg(0, 17), 0);
        assert_eq!(neg(1, 17), 16);
    }

    #[test]
    fn test_unreduced_operands() {
        // Operands at or above the modulus are still normalized
        assert_eq!(add(20, 20, 17), 6);
        assert_eq!(sub(18, 35, 17), 0);
        assert_eq!(sub(3, 40, 17), 14);
        assert_eq!(mul(18, 19, 17), 2);
    }

    #[test]
    fn test_large_modulus_no_overflow() {
        let p = u64::MAX - 58; // 2^64 - 59, the largest 64-bit prime
        assert!(is_prime(p));
        assert_eq!(add(p - 1, p - 1, p), p - 2);
        assert_eq!(mul(p - 1, p - 1, p), 1);
        assert_eq!(sub(0, p - 1, p), 1);
    }

    #[test]
    fn test_pow() {
        assert_eq!(pow(3, 0, 17), 1);
        assert_eq!(pow(0, 0, 17), 1);
        assert_eq!(pow(3, 15, 17), 6);
        assert_eq!(pow(3, 16, 17), 1);
        assert_eq!(pow(2, 10, 1_000_003), 1024);
        assert_eq!(pow(5, 3, 1), 0);
    }

    #[test]
    fn test_inverse() {
        assert_eq!(inverse(3, 17).unwrap(), 6);
        assert_eq!(inverse(4, 17).unwrap(), 13);
        assert_eq!(inverse(1, 17).unwrap(), 1);
        assert_eq!(inverse(20, 17).unwrap(), 6);
    }

    #[test]
    fn test_inverse_of_zero_fails() {
        assert_eq!(
            inverse(0, 17),
            Err(NttError::NoInverse { value: 0, modulus: 17 })
        );
        assert_eq!(
            inverse(34, 17),
            Err(NttError::NoInverse { value: 0, modulus: 17 })
        );
        assert!(matches!(inverse(1, 1), Err(NttError::InvalidModulus { modulus: 1 })));
    }

    #[test]
    fn test_reduce_signed() {
        assert_eq!(reduce_signed(-1, 17), 16);
        assert_eq!(reduce_signed(-18, 17), 16);
        assert_eq!(reduce_signed(35, 17), 1);
        assert_eq!(reduce_signed(i64::MIN, 17), ((i64::MIN as i128).rem_euclid(17)) as u64);
    }

    #[test]
    fn test_is_prime() {
        let primes = [2u64, 3, 5, 17, 97, 257, 7681, 12289, 65537, 998_244_353];
        for &p in &primes {
            assert!(is_prime(p), "{} should be prime", p);
        }

        let composites = [0u64, 1, 4, 15, 91, 561, 1105, 65535, 3_215_031_751];
        for &c in &composites {
            assert!(!is_prime(c), "{} should be composite", c);
        }
    }

    #[test]
    fn test_is_primitive_root() {
        // 3 generates Z_17^*, so it has order 16
        assert!(is_primitive_root(3, 16, 17));
        assert!(!is_primitive_root(3, 4, 17));

        // 4 has order 4 modulo 17
        assert!(is_primitive_root(4, 4, 17));
        assert!(!is_primitive_root(4, 8, 17));

        // 16 ≡ -1 has order 2
        assert!(is_primitive_root(16, 2, 17));
        assert!(!is_primitive_root(1, 2, 17));

        // Every element is a primitive 1st root only if it equals 1
        assert!(is_primitive_root(1, 1, 17));
        assert!(!is_primitive_root(5, 1, 17));

        // Order must be a power of two
        assert!(!is_primitive_root(3, 6, 17));
    }

    #[test]
    fn test_context_rejects_small_modulus() {
        assert!(ModularArithmetic::new(0).is_err());
        assert!(ModularArithmetic::new(1).is_err());
        let arith = ModularArithmetic::new(17).unwrap();
        assert_eq!(arith.modulus(), 17);
        assert_eq!(arith.inv_len(4).unwrap(), 13);
    }

    #[test]
    fn test_inv_len_when_modulus_divides_length() {
        let arith = ModularArithmetic::new(2).unwrap();
        assert_eq!(arith.inv_len(1).unwrap(), 1);
        assert!(matches!(arith.inv_len(2), Err(NttError::NoInverse { .. })));
    }

    proptest! {
        #[test]
        fn test_field_axioms(
            p in prop::sample::select(vec![17u64, 97, 257, 7681, 12289, 65537, 998_244_353]),
            a in any::<u64>(),
            b in any::<u64>(),
            c in any::<u64>(),
        ) {
            let arith = ModularArithmetic::new(p).unwrap();
            let (a, b, c) = (arith.reduce(a), arith.reduce(b), arith.reduce(c));

            prop_assert_eq!(arith.add_mod(a, b), arith.add_mod(b, a));
            prop_assert_eq!(arith.mul_mod(a, b), arith.mul_mod(b, a));
            prop_assert_eq!(
                arith.add_mod(arith.add_mod(a, b), c),
                arith.add_mod(a, arith.add_mod(b, c))
            );
            prop_assert_eq!(
                arith.mul_mod(a, arith.add_mod(b, c)),
                arith.add_mod(arith.mul_mod(a, b), arith.mul_mod(a, c))
            );
            prop_assert_eq!(arith.add_mod(arith.sub_mod(a, b), b), a);
            prop_assert_eq!(arith.add_mod(a, arith.neg_mod(a)), 0);
        }

        #[test]
        fn test_inverse_roundtrip(
            p in prop::sample::select(vec![17u64, 97, 257, 7681, 12289, 65537, 998_244_353]),
            a in 1u64..u64::MAX,
        ) {
            prop_assume!(a % p != 0);
            let inv = inverse(a, p).unwrap();
            prop_assert!(inv < p);
            prop_assert_eq!(mul(a, inv, p), 1);
        }

        #[test]
        fn test_pow_matches_repeated_multiplication(
            base in any::<u64>(),
            exp in 0u64..64,
        ) {
            let p = 65537u64;
            let mut expected = 1u64;
            for _ in 0..exp {
                expected = mul(expected, base, p);
            }
            prop_assert_eq!(pow(base, exp, p), expected);
        }
    }
}
