//! Lossy packing of floats and small enums into bit runs.

use std::f32::consts::{FRAC_PI_2, PI};

use crate::error::SerdeErr;

fn check_bits(bits: u8) -> Result<(), SerdeErr> {
    if bits == 0 || bits > 30 {
        return Err(SerdeErr::InvalidQuantization {
            reason: "bit count must be between 1 and 30",
        });
    }
    Ok(())
}

fn max_pattern(bits: u8) -> u32 {
    (1u32 << bits) - 1
}

/// Maps `value` from `[min, max]` onto `0..=2^bits - 1`, clamping out of range input.
pub fn quantize(min: f32, max: f32, bits: u8, value: f32) -> Result<u32, SerdeErr> {
    check_bits(bits)?;
    if max <= min {
        return Err(SerdeErr::InvalidQuantization {
            reason: "range maximum must be greater than minimum",
        });
    }
    let clamped = if value.is_nan() { min } else { value.clamp(min, max) };
    let scaled = (clamped - min) * max_pattern(bits) as f32 / (max - min);
    Ok((scaled.round() as u32).min(max_pattern(bits)))
}

pub fn dequantize(min: f32, max: f32, bits: u8, pattern: u32) -> f32 {
    min + pattern as f32 * (max - min) / max_pattern(bits) as f32
}

pub fn unsigned_fixed_point(integer_bits: u8, fraction_bits: u8, value: f32) -> Result<u32, SerdeErr> {
    let total = integer_bits + fraction_bits;
    if integer_bits == 0 || total > 32 {
        return Err(SerdeErr::InvalidQuantization {
            reason: "fixed point needs at least one integer bit and at most 32 bits in total",
        });
    }
    let max = if total == 32 { u32::MAX } else { (1u32 << total) - 1 };
    let scaled = (f64::from(value) * f64::from(1u32 << fraction_bits)).floor();
    Ok(scaled.clamp(0.0, f64::from(max)) as u32)
}

pub fn from_unsigned_fixed_point(fraction_bits: u8, pattern: u32) -> f32 {
    (f64::from(pattern) / f64::from(1u32 << fraction_bits)) as f32
}

/// Signed variant: the integer range `[-k, k - 1]` is shifted to `[0, 2k - 1]`.
pub fn signed_fixed_point(integer_bits: u8, fraction_bits: u8, value: f32) -> Result<u32, SerdeErr> {
    let offset = (1u32 << integer_bits.saturating_sub(1)) as f32;
    unsigned_fixed_point(integer_bits, fraction_bits, value + offset)
}

pub fn from_signed_fixed_point(integer_bits: u8, fraction_bits: u8, pattern: u32) -> f32 {
    let offset = (1u32 << integer_bits.saturating_sub(1)) as f32;
    from_unsigned_fixed_point(fraction_bits, pattern) - offset
}

/// Folds `(value, max)` pairs into a mixed radix integer. Each value must be below its max.
pub fn arithmetic_encode(values: &[(u32, u32)]) -> Result<u32, SerdeErr> {
    let mut packed: u64 = 0;
    for (value, max) in values {
        if *max == 0 || value >= max {
            return Err(SerdeErr::InvalidQuantization {
                reason: "arithmetic encoded value must be below its maximum",
            });
        }
        packed = packed * u64::from(*max) + u64::from(*value);
    }
    u32::try_from(packed).map_err(|_| SerdeErr::InvalidQuantization {
        reason: "arithmetic encoded values overflow 32 bits",
    })
}

pub fn arithmetic_decode(mut packed: u32, maxes: &[u32]) -> Result<Vec<u32>, SerdeErr> {
    if maxes.contains(&0) {
        return Err(SerdeErr::InvalidQuantization {
            reason: "arithmetic encoded maximum must be nonzero",
        });
    }
    let mut values = vec![0; maxes.len()];
    for (slot, max) in values.iter_mut().zip(maxes.iter()).skip(1).rev() {
        *slot = packed % max;
        packed /= max;
    }
    if let Some(first) = values.first_mut() {
        *first = packed;
    }
    Ok(values)
}

/// Azimuth (yaw, around +Y) and inclination (pitch) of a unit vector.
pub fn to_spherical(x: f32, y: f32, z: f32) -> (f32, f32) {
    let azimuth = x.atan2(z);
    let inclination = (-y).clamp(-1.0, 1.0).asin();
    (azimuth, inclination)
}

pub fn from_spherical(azimuth: f32, inclination: f32) -> (f32, f32, f32) {
    let cos_inclination = inclination.cos();
    (
        cos_inclination * azimuth.sin(),
        -inclination.sin(),
        cos_inclination * azimuth.cos(),
    )
}

pub const YAW_RANGE: (f32, f32) = (-PI, PI);
pub const PITCH_RANGE: (f32, f32) = (-FRAC_PI_2, FRAC_PI_2);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantize_covers_range_endpoints() {
        assert_eq!(quantize(0.0, PI, 10, 0.0).unwrap(), 0);
        assert_eq!(quantize(0.0, PI, 10, PI).unwrap(), 1023);
        assert_eq!(quantize(0.0, PI, 10, 100.0).unwrap(), 1023);
        assert_eq!(quantize(0.0, PI, 10, -1.0).unwrap(), 0);
    }

    #[test]
    fn dequantize_is_within_one_step() {
        let step = PI / 1023.0;
        for value in [0.1f32, 1.0, 2.5, 3.0] {
            let pattern = quantize(0.0, PI, 10, value).unwrap();
            assert!((dequantize(0.0, PI, 10, pattern) - value).abs() <= step);
        }
    }

    #[test]
    fn signed_fixed_point_round_trip() {
        for value in [-1000.5f32, -1.25, 0.0, 3.75, 1023.0] {
            let pattern = signed_fixed_point(11, 8, value).unwrap();
            let back = from_signed_fixed_point(11, 8, pattern);
            assert!((back - value).abs() < 1.0 / 256.0, "{} -> {}", value, back);
        }
    }

    #[test]
    fn arithmetic_round_trip() {
        let packed = arithmetic_encode(&[(2, 3), (3, 4)]).unwrap();
        assert_eq!(packed, 2 * 4 + 3);
        assert_eq!(arithmetic_decode(packed, &[3, 4]).unwrap(), vec![2, 3]);

        let maxes = [3, 4, 3, 3, 2];
        let values = [(1, 3), (2, 4), (0, 3), (2, 3), (1, 2)];
        let packed = arithmetic_encode(&values).unwrap();
        assert!(packed < 256);
        assert_eq!(arithmetic_decode(packed, &maxes).unwrap(), vec![1, 2, 0, 2, 1]);
    }

    #[test]
    fn arithmetic_rejects_value_at_max() {
        assert!(arithmetic_encode(&[(3, 3)]).is_err());
    }

    #[test]
    fn spherical_round_trip() {
        let (x, y, z) = (0.6f32, 0.0, 0.8);
        let (azimuth, inclination) = to_spherical(x, y, z);
        let (bx, by, bz) = from_spherical(azimuth, inclination);
        assert!((bx - x).abs() < 1e-5);
        assert!((by - y).abs() < 1e-5);
        assert!((bz - z).abs() < 1e-5);
    }
}
