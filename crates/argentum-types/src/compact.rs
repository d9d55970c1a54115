//! Compact difficulty codec.
//!
//! `bits` is a 32-bit float-like encoding inherited from the reference
//! client: the high byte is a base-256 exponent, the low 24 bits the
//! mantissa. Bit 23 of the mantissa is a sign bit, so the encoder keeps
//! the mantissa below `0x800000` by shifting and bumping the exponent.
//!
//! Two decode modes exist. The unsigned mode reads the full 24-bit
//! mantissa and is used wherever a hash is compared against a target.
//! The signed mode honours the sign bit and is what the retarget
//! arithmetic operates on.

use num_bigint::{BigInt, BigUint};
use num_traits::Zero;

/// Decode `bits` to an unsigned 256-bit target.
pub fn decode_compact(bits: u32) -> BigUint {
    let exponent = (bits >> 24) as usize;
    let mantissa = BigUint::from(bits & 0x00ff_ffff);
    if exponent <= 3 {
        mantissa >> (8 * (3 - exponent))
    } else {
        mantissa << (8 * (exponent - 3))
    }
}

/// Decode `bits` honouring the mantissa sign bit.
pub fn decode_compact_signed(bits: u32) -> BigInt {
    let exponent = (bits >> 24) as usize;
    let magnitude = BigUint::from(bits & 0x007f_ffff);
    let magnitude = if exponent <= 3 {
        magnitude >> (8 * (3 - exponent))
    } else {
        magnitude << (8 * (exponent - 3))
    };
    if bits & 0x0080_0000 != 0 {
        -BigInt::from(magnitude)
    } else {
        BigInt::from(magnitude)
    }
}

/// Encode a target back to compact form.
///
/// The mantissa is re-normalized below the sign bit and the value is
/// clamped to 256 bits, so any retarget result round-trips:
/// `decode(encode(t))` loses only the precision the format itself drops.
pub fn encode_compact(target: &BigUint) -> u32 {
    let max = (BigUint::from(1u8) << 256u16) - 1u8;
    let target = if *target > max { &max } else { target };

    if target.is_zero() {
        return 0;
    }

    let mut size = (target.bits() as usize + 7) / 8;
    let mut compact: u32 = if size <= 3 {
        let low = target.iter_u32_digits().next().unwrap_or(0);
        low << (8 * (3 - size))
    } else {
        let shifted = target >> (8 * (size - 3));
        shifted.iter_u32_digits().next().unwrap_or(0) & 0x00ff_ffff
    };

    if compact & 0x0080_0000 != 0 {
        compact >>= 8;
        size += 1;
    }

    compact | ((size as u32) << 24)
}

/// Expected work for a block at this difficulty:
/// `floor(2^256 / (target + 1))`.
pub fn work_from_bits(bits: u32) -> BigUint {
    let target = decode_compact(bits);
    (BigUint::from(1u8) << 256u16) / (target + 1u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn decode_pow_limit() {
        let target = decode_compact(0x1d00ffff);
        assert_eq!(target, BigUint::from(0xffffu32) << 208u16);
    }

    #[test]
    fn decode_small_exponent() {
        // Exponent below 3 shifts the mantissa down.
        assert_eq!(decode_compact(0x01003456), BigUint::zero());
        assert_eq!(decode_compact(0x01123456), BigUint::from(0x12u32));
        assert_eq!(decode_compact(0x02123456), BigUint::from(0x1234u32));
        assert_eq!(decode_compact(0x03123456), BigUint::from(0x123456u32));
        assert_eq!(decode_compact(0x04123456), BigUint::from(0x12345600u32));
    }

    #[test]
    fn signed_decode_honours_sign_bit() {
        assert_eq!(decode_compact_signed(0x04923456), BigInt::from(-0x12345600i64));
        assert_eq!(decode_compact_signed(0x04123456), BigInt::from(0x12345600i64));
    }

    #[test]
    fn encode_round_trips_canonical_bits() {
        for bits in [0x1d00ffffu32, 0x1c7fff80, 0x1b0404cb, 0x207fffff, 0x1c00ffff] {
            assert_eq!(encode_compact(&decode_compact(bits)), bits, "bits {bits:#010x}");
        }
    }

    #[test]
    fn encode_renormalizes_high_mantissa() {
        // 0xffff << 200 has its top mantissa bit set at size 28; the
        // encoder shifts down and bumps the exponent.
        let value = BigUint::from(0xffffu32) << 208u16;
        assert_eq!(encode_compact(&value), 0x1d00ffff);
    }

    #[test]
    fn encode_clamps_above_256_bits() {
        let oversized = BigUint::from(1u8) << 300u16;
        let max = (BigUint::from(1u8) << 256u16) - 1u8;
        assert_eq!(encode_compact(&oversized), encode_compact(&max));
    }

    #[test]
    fn work_known_values() {
        // Target 0 means every hash is expected to take 2^256 attempts.
        assert_eq!(work_from_bits(0x01000000), BigUint::from(1u8) << 256u16);
        // The easiest mainnet target.
        let expected = (BigUint::from(1u8) << 256u16)
            / ((BigUint::from(0xffffu32) << 208u16) + 1u8);
        assert_eq!(work_from_bits(0x1d00ffff), expected);
    }

    #[test]
    fn work_monotonically_non_increasing() {
        // Easier target (numerically larger) never means more work.
        let harder = work_from_bits(0x1b0404cb);
        let easier = work_from_bits(0x1d00ffff);
        assert!(harder > easier);
    }

    proptest! {
        #[test]
        fn round_trip_law(bytes in prop::collection::vec(any::<u8>(), 1..32)) {
            // Any bits value produced by the encoder survives a
            // decode/encode cycle unchanged.
            let target = BigUint::from_bytes_be(&bytes);
            let bits = encode_compact(&target);
            prop_assert_eq!(encode_compact(&decode_compact(bits)), bits);
        }

        #[test]
        fn work_ordering(a in prop::collection::vec(any::<u8>(), 1..32),
                         b in prop::collection::vec(any::<u8>(), 1..32)) {
            let ta = BigUint::from_bytes_be(&a);
            let tb = BigUint::from_bytes_be(&b);
            let (bits_a, bits_b) = (encode_compact(&ta), encode_compact(&tb));
            if decode_compact(bits_a) <= decode_compact(bits_b) {
                prop_assert!(work_from_bits(bits_a) >= work_from_bits(bits_b));
            }
        }
    }
}
