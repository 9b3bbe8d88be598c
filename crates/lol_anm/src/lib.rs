//! Reading and writing League of Legends skeletal animations (`.anm`).
//!
//! An animation is a list of tracks, one per joint, each mapping frame times to a pose made of a
//! translation, a rotation and a scale. Joints are identified by the ELF hash of their name.
//!
//! ## Layouts
//!
//! | Signature  | Version | Layout                                                       |
//! |------------|---------|--------------------------------------------------------------|
//! | `r3d2canm` | any     | quantized keys, 10 bytes per channel key                      |
//! | `r3d2anmd` | 5       | vector bank, 48 bit quaternion bank, joint hashes, frames     |
//! | `r3d2anmd` | 4       | vector bank, full quaternion bank, frames naming their joint  |
//! | `r3d2anmd` | 3       | 32 byte joint names, one rotation and translation per frame   |
//!
//! Offsets stored in headers count from byte 12, the end of the signature and version.
//!
//! ## Version 5 Header
//!
//! | Offset | Field                                    |
//! |--------|------------------------------------------|
//! | 0      | `r3d2anmd`                               |
//! | 8      | version                                  |
//! | 12     | file size                                |
//! | 16     | format token, then two flag words        |
//! | 28     | track count                              |
//! | 32     | frame count                              |
//! | 36     | frame duration in seconds                |
//! | 40     | joint hashes offset                      |
//! | 52     | vectors, quaternions and frames offsets  |
//! | 64     | 12 reserved bytes                        |
//!
//! Each frame holds, for every track, three `u16` indices: translation and scale into the vector
//! bank, rotation into the quaternion bank.
//!
//! ## Writing
//!
//! [`Anm::write`] always produces version 5. Tracks are first filled at every integer frame, see
//! the [`interpolate`] module, then poses are shared through the banks described in [`bank`].
//!
//! ```
//! # fn doit() -> lol_anm::error::Result<()>
//! # {
//! use glam::Vec3;
//! use lol_anm::{Anm, Track};
//!
//! let mut track = Track::new(lol_hash::elf("root"));
//! track.pose_mut(0).translate = Some(Vec3::ZERO);
//! track.pose_mut(9).translate = Some(Vec3::new(0.0, 9.0, 0.0));
//!
//! let anm = Anm { duration: 10.0, tracks: vec![track], ..Default::default() };
//! let read = Anm::from_bytes(&anm.to_bytes()?)?;
//! assert_eq!(read.tracks[0].poses.len(), 10);
//! # Ok(())
//! # }
//! # doit().unwrap();
//! ```
//!

pub mod bank;
pub mod compress;
pub mod error;
pub mod interpolate;
pub mod read;
pub mod types;
pub mod write;

pub use bank::{format_g, PoseBanks};
pub use types::{Anm, AnmKind, DensePose, ErrorMetric, ErrorMetrics, FrameTime, Pose, Track};
