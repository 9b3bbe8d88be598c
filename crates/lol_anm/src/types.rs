//! Types describing a skeletal animation

use std::{cmp::Ordering, collections::BTreeMap, fmt};

use glam::{Quat, Vec3};

/// Signature of compressed animations
pub const COMPRESSED_SIGNATURE: &[u8; 8] = b"r3d2canm";

/// Signature of frame based animations
pub const UNCOMPRESSED_SIGNATURE: &[u8; 8] = b"r3d2anmd";

/// Version every written animation uses
pub const WRITE_VERSION: u32 = 5;

/// Layout family of an animation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AnmKind {
    /// Keys quantized into 10 byte frames
    Compressed,
    /// Pose banks indexed per frame and track
    #[default]
    Uncompressed,
}

impl AnmKind {
    pub fn signature(&self) -> &'static [u8; 8] {
        match self {
            AnmKind::Compressed => COMPRESSED_SIGNATURE,
            AnmKind::Uncompressed => UNCOMPRESSED_SIGNATURE,
        }
    }

    pub fn from_signature(signature: &[u8]) -> Option<AnmKind> {
        match signature {
            s if s == COMPRESSED_SIGNATURE => Some(AnmKind::Compressed),
            s if s == UNCOMPRESSED_SIGNATURE => Some(AnmKind::Uncompressed),
            _ => None,
        }
    }
}

impl fmt::Display for AnmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnmKind::Compressed => write!(f, "compressed"),
            AnmKind::Uncompressed => write!(f, "uncompressed"),
        }
    }
}

/// Quantization error allowed for one channel of a compressed animation
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ErrorMetric {
    pub margin: f32,
    pub discontinuity_threshold: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ErrorMetrics {
    pub rotate: ErrorMetric,
    pub translate: ErrorMetric,
    pub scale: ErrorMetric,
}

/// Time of a key in frames, ordered by [`f32::total_cmp`]
///
/// Compressed animations store keys at fractional frames; everything else is keyed by integer
/// frame numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameTime(pub f32);

impl PartialEq for FrameTime {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrameTime {}

impl PartialOrd for FrameTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrameTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<usize> for FrameTime {
    fn from(frame: usize) -> Self {
        FrameTime(frame as f32)
    }
}

impl fmt::Display for FrameTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for FrameTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Transform of a joint at one key, any channel may be missing
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Pose {
    pub translate: Option<Vec3>,
    pub rotate: Option<Quat>,
    pub scale: Option<Vec3>,
}

/// Transform with every channel present
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensePose {
    pub translate: Vec3,
    pub rotate: Quat,
    pub scale: Vec3,
}

impl Default for DensePose {
    fn default() -> Self {
        DensePose {
            translate: Vec3::ZERO,
            rotate: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl From<DensePose> for Pose {
    fn from(pose: DensePose) -> Self {
        Pose {
            translate: Some(pose.translate),
            rotate: Some(pose.rotate),
            scale: Some(pose.scale),
        }
    }
}

/// Keys of one joint
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Track {
    /// ELF hash of the joint name
    pub joint_hash: u32,
    pub poses: BTreeMap<FrameTime, Pose>,
}

impl Track {
    pub fn new(joint_hash: u32) -> Self {
        Track {
            joint_hash,
            poses: BTreeMap::new(),
        }
    }

    /// Key at `time`, created empty when missing
    pub fn pose_mut(&mut self, time: impl Into<FrameTime>) -> &mut Pose {
        self.poses.entry(time.into()).or_default()
    }
}

/// A skeletal animation
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Anm {
    pub kind: AnmKind,
    pub version: u32,
    pub file_size: u32,
    pub format_token: u32,
    pub flags1: u32,
    pub flags2: u32,
    /// Length in frames, fractional for compressed animations
    pub duration: f32,
    pub fps: f32,
    /// Present for compressed animations only
    pub error_metrics: Option<ErrorMetrics>,
    pub tracks: Vec<Track>,
}

impl Default for Anm {
    fn default() -> Self {
        Anm {
            kind: AnmKind::Uncompressed,
            version: WRITE_VERSION,
            file_size: 0,
            format_token: 0,
            flags1: 0,
            flags2: 0,
            duration: 0.0,
            fps: 30.0,
            error_metrics: None,
            tracks: Vec::new(),
        }
    }
}

impl Anm {
    /// Number of integer frames written out, the duration truncated
    pub fn frame_count(&self) -> usize {
        self.duration.max(0.0) as usize
    }

    /// Find a track by joint hash
    pub fn track(&self, joint_hash: u32) -> Option<&Track> {
        self.tracks
            .iter()
            .find(|track| track.joint_hash == joint_hash)
    }
}
