//! Sharing poses between frames when writing
//!
//! Vectors and rotations are keyed by their components printed with a fixed number of
//! significant digits, 4 for vectors and 7 for quaternions. Poses that print the same share one
//! bank slot, and the bank stores the printed value.

use glam::{Quat, Vec3};
use indexmap::IndexSet;
use tracing::debug;

use crate::{
    error::{Error, Result},
    types::DensePose,
};

const VECTOR_DIGITS: usize = 4;
const QUATERNION_DIGITS: usize = 7;

/// Largest number of entries a bank can index
pub const MAX_BANK_SIZE: usize = u16::MAX as usize;

/// Format `value` with `precision` significant digits the way C's `%g` does
///
/// ```
/// use lol_anm::bank::format_g;
///
/// assert_eq!(format_g(0.333333, 4), "0.3333");
/// assert_eq!(format_g(123456.0, 4), "1.235e+05");
/// assert_eq!(format_g(100.0, 7), "100");
/// ```
pub fn format_g(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "nan".to_owned();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_owned();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_owned();
    }

    let precision = precision.max(1);
    let scientific = format!("{:.*e}", precision - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= precision as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{sign}{:02}",
            trim_fraction(mantissa),
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_owned()
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

fn vector_key(vector: Vec3) -> String {
    vector
        .to_array()
        .map(|value| format_g(f64::from(value), VECTOR_DIGITS))
        .join(" ")
}

fn quaternion_key(quat: Quat) -> String {
    quat.to_array()
        .map(|value| format_g(f64::from(value), QUATERNION_DIGITS))
        .join(" ")
}

fn parse_key<const N: usize>(key: &str) -> Result<[f32; N]> {
    let mut values = [0.0; N];
    let mut parts = key.split(' ');
    for value in values.iter_mut() {
        *value = parts
            .next()
            .and_then(|part| part.parse().ok())
            .ok_or_else(|| Error::CustomError(format!("malformed pose key {key:?}")))?;
    }
    Ok(values)
}

/// Deduplicated vectors and rotations plus the per frame indices into them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseBanks {
    /// Translations and scales
    pub vectors: Vec<Vec3>,
    pub quaternions: Vec<Quat>,
    /// `[translate, scale, rotate]` for frame `f` and track `t` at `f * track_count + t`
    pub frames: Vec<[u16; 3]>,
}

impl PoseBanks {
    /// Bank the dense poses of every track, each holding `frame_count` poses
    pub fn build(tracks: &[Vec<DensePose>], frame_count: usize) -> Result<PoseBanks> {
        let track_count = tracks.len();
        let mut vector_keys = IndexSet::new();
        let mut quaternion_keys = IndexSet::new();
        let mut indices = vec![[0usize; 3]; frame_count * track_count];

        for (t, poses) in tracks.iter().enumerate() {
            for (f, pose) in poses.iter().take(frame_count).enumerate() {
                let (translate, _) = vector_keys.insert_full(vector_key(pose.translate));
                let (scale, _) = vector_keys.insert_full(vector_key(pose.scale));
                let (rotate, _) = quaternion_keys.insert_full(quaternion_key(pose.rotate));
                indices[f * track_count + t] = [translate, scale, rotate];
            }
        }

        if vector_keys.len() > MAX_BANK_SIZE {
            return Err(Error::BankOverflow {
                bank: "vector",
                size: vector_keys.len(),
            });
        }
        if quaternion_keys.len() > MAX_BANK_SIZE {
            return Err(Error::BankOverflow {
                bank: "quaternion",
                size: quaternion_keys.len(),
            });
        }
        debug!(
            "{} vectors and {} quaternions shared by {} poses",
            vector_keys.len(),
            quaternion_keys.len(),
            indices.len()
        );

        Ok(PoseBanks {
            vectors: vector_keys
                .iter()
                .map(|key| parse_key::<3>(key).map(Vec3::from_array))
                .collect::<Result<_>>()?,
            quaternions: quaternion_keys
                .iter()
                .map(|key| parse_key::<4>(key).map(Quat::from_array))
                .collect::<Result<_>>()?,
            // bank sizes were checked, every index fits
            frames: indices
                .into_iter()
                .map(|frame| frame.map(|index| index as u16))
                .collect(),
        })
    }
}
