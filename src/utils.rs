/// [Szudzik pairing function][szudzik-pairing].
///
/// ```text
/// (a, b) -> if (a<b) then (b^2 + a) else (a^2 + a + b)
/// ```
///
/// Arithmetic wraps: the result is only used to pick a bucket, and keys are compared in full.
///
/// [szudzik-pairing]: http://szudzik.com/ElegantPairing.pdf
pub fn pairing2(a: u64, b: u64) -> u64 {
    if a < b {
        b.wrapping_mul(b).wrapping_add(a)
    } else {
        a.wrapping_mul(a).wrapping_add(a).wrapping_add(b)
    }
}

/// Pairing function for three `u64` values.
pub fn pairing3(a: u64, b: u64, c: u64) -> u64 {
    pairing2(pairing2(a, b), c)
}

/// Hash used to place keys into the unique table and the computed table.
pub trait MyHash {
    fn hash(&self) -> u64;
}

impl MyHash for u64 {
    fn hash(&self) -> u64 {
        *self
    }
}

impl MyHash for (u64, u64) {
    fn hash(&self) -> u64 {
        pairing2(self.0, self.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_szudzik() {
        // a\b  0  1  2  3  4
        // ------------------
        // 0    0  1  4  9 16
        // 1    2  3  5 10 17
        // 2    6  7  8 11 18
        // 4   20 21 22 23 24
        assert_eq!(pairing2(0, 0), 0);
        assert_eq!(pairing2(0, 1), 1);
        assert_eq!(pairing2(1, 0), 2);
        assert_eq!(pairing2(1, 1), 3);
        assert_eq!(pairing2(1, 2), 5);
        assert_eq!(pairing2(2, 1), 7);
        assert_eq!(pairing2(0, 4), 16);
        assert_eq!(pairing2(4, 0), 20);
        assert_eq!(pairing2(4, 4), 24);
    }

    #[test]
    fn test_pairing3_is_nested() {
        assert_eq!(pairing3(1, 2, 3), pairing2(5, 3));
        assert_ne!(pairing3(1, 2, 3), pairing3(3, 2, 1));
    }

    #[test]
    fn test_large_values_wrap() {
        let h = pairing2(u64::MAX, u64::MAX - 1);
        assert_eq!(h, pairing2(u64::MAX, u64::MAX - 1));
    }
}
