//! Fixed point encodings of rotations and vectors
//!
//! A compressed quaternion drops its largest component, which is rebuilt from the unit length.
//! The 48 bit little-endian value holds the index of the dropped component in bits 45 and 46,
//! followed by the other three components as 15 bit values covering `-1/sqrt(2)..=1/sqrt(2)`.

use glam::{Quat, Vec3};

const ONE_DIV_SQRT2: f64 = 0.70710678118;
const SQRT2: f64 = 1.41421356237;
const SQRT2_DIV_32767: f64 = 0.00004315969;
const COMPONENT_MASK: u64 = 0x7FFF;

fn bits_of(bytes: &[u8; 6]) -> u64 {
    bytes
        .iter()
        .enumerate()
        .fold(0u64, |bits, (i, byte)| bits | u64::from(*byte) << (8 * i))
}

/// Expand a 6 byte quaternion
///
/// ```
/// use glam::Quat;
///
/// let identity = lol_anm::compress::decompress_quat(&[0x00, 0x40, 0x00, 0x20, 0x00, 0x70]);
/// assert!(identity.abs_diff_eq(Quat::IDENTITY, 1e-4));
/// ```
pub fn decompress_quat(bytes: &[u8; 6]) -> Quat {
    let bits = bits_of(bytes);
    let max_index = (bits >> 45) & 3;
    let component = |shift: u32| ((bits >> shift) & COMPONENT_MASK) as f64 * SQRT2_DIV_32767 - ONE_DIV_SQRT2;
    let a = component(30);
    let b = component(15);
    let c = component(0);
    let d = (1.0 - (a * a + b * b + c * c)).max(0.0).sqrt();

    let [x, y, z, w] = match max_index {
        0 => [d, a, b, c],
        1 => [a, d, b, c],
        2 => [a, b, d, c],
        _ => [a, b, c, d],
    };
    Quat::from_xyzw(x as f32, y as f32, z as f32, w as f32)
}

/// Pack a unit quaternion into 6 bytes
pub fn compress_quat(quat: Quat) -> [u8; 6] {
    let mut values = quat.to_array().map(f64::from);
    let magnitudes = values.map(f64::abs);

    // ties keep the earliest of x, y, z and fall back to w
    let max_index = (0..3)
        .find(|&i| (0..4).all(|j| magnitudes[i] >= magnitudes[j]))
        .unwrap_or(3);
    if values[max_index] < 0.0 {
        values = values.map(|value| -value);
    }

    let mut bits = (max_index as u64) << 45;
    let mut shift: u32 = 30;
    for (i, value) in values.iter().enumerate() {
        if i == max_index {
            continue;
        }
        let quantized = (16383.5 * (SQRT2 * value + 1.0)).round_ties_even() as u64;
        bits |= (quantized & COMPONENT_MASK) << shift;
        shift = shift.saturating_sub(15);
    }

    let mut bytes = [0u8; 6];
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte = (bits >> (8 * i)) as u8;
    }
    bytes
}

/// Expand a 6 byte vector quantized inside the box `min..=max`
pub fn decompress_vec3(min: Vec3, max: Vec3, bytes: &[u8; 6]) -> Vec3 {
    let fraction = |i: usize| f32::from(u16::from_le_bytes([bytes[2 * i], bytes[2 * i + 1]])) / 65535.0;
    Vec3::new(
        (max.x - min.x) * fraction(0) + min.x,
        (max.y - min.y) * fraction(1) + min.y,
        (max.z - min.z) * fraction(2) + min.z,
    )
}

#[cfg(test)]
mod test {
    use glam::{Quat, Vec3};
    use pretty_assertions::{assert_eq, assert_str_eq};
    use quickcheck::{QuickCheck, TestResult};

    use super::*;

    #[test]
    fn identity() {
        let bytes = compress_quat(Quat::IDENTITY);
        assert_str_eq!(
            format!("{:02X?}", bytes),
            "[00, 40, 00, 20, 00, 70]"
        );
    }

    #[test]
    fn sign_is_canonical() {
        let quat = Quat::from_xyzw(0.1, -0.9, 0.2, 0.3).normalize();
        assert_eq!(compress_quat(quat), compress_quat(-quat));

        let decompressed = decompress_quat(&compress_quat(quat));
        assert!(decompressed.y > 0.0);
        assert!(decompressed.abs_diff_eq(-quat, 1e-4));
    }

    #[test]
    fn round_trip_random_quaternions() {
        fn round_trip(x: f32, y: f32, z: f32, w: f32) -> TestResult {
            let raw = Quat::from_xyzw(x, y, z, w);
            if !raw.is_finite() || raw.length() < 1e-3 || raw.length() > 1e18 {
                return TestResult::discard();
            }
            let quat = raw.normalize();
            let decompressed = decompress_quat(&compress_quat(quat));
            let close = |q: Quat| (q - decompressed).to_array().iter().all(|d| d.abs() < 1e-4);
            TestResult::from_bool(close(quat) || close(-quat))
        }

        QuickCheck::new()
            .tests(10_000)
            .max_tests(100_000)
            .quickcheck(round_trip as fn(f32, f32, f32, f32) -> TestResult);
    }

    #[test]
    fn vector_ranges() {
        #[rustfmt::skip]
        let bytes = [
            0x00, 0x00,
            0xFF, 0xFF,
            0x00, 0x80,
        ];
        let vector = decompress_vec3(Vec3::new(-1.0, 0.0, 10.0), Vec3::new(1.0, 4.0, 20.0), &bytes);
        assert!(vector.abs_diff_eq(Vec3::new(-1.0, 4.0, 15.0), 1e-3));
    }
}
