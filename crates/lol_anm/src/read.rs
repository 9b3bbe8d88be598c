//! Types for reading animations
//!

use std::{
    io::{Read, Seek},
    path::Path,
};

use glam::{Quat, Vec3};
use lol_hash::elf;
use lol_stream::BytesReader;
use tracing::{debug, instrument, warn};

use crate::{
    compress::{decompress_quat, decompress_vec3},
    error::{Error, Result},
    types::{Anm, AnmKind, ErrorMetric, ErrorMetrics, FrameTime, Pose, Track},
};

/// Header offsets count from the end of the signature and version
const OFFSET_BASE: u64 = 12;

fn section(offset: i32, name: &'static str) -> Result<u64> {
    if offset <= 0 {
        return Err(Error::MissingSection(name));
    }
    Ok(offset as u64 + OFFSET_BASE)
}

fn read_compressed<R: Read + Seek>(bs: &mut BytesReader<R>) -> Result<[u8; 6]> {
    let mut bytes = [0u8; 6];
    bytes.copy_from_slice(&bs.read_bytes(6)?);
    Ok(bytes)
}

fn read_vector<R: Read + Seek>(bs: &mut BytesReader<R>) -> Result<Vec3> {
    Ok(Vec3::from_array(bs.read_vec3()?))
}

fn read_error_metric<R: Read + Seek>(bs: &mut BytesReader<R>) -> Result<ErrorMetric> {
    Ok(ErrorMetric {
        margin: bs.read_f32()?,
        discontinuity_threshold: bs.read_f32()?,
    })
}

/// Index and pose of one frame of a banked track
fn banked_pose(
    vectors: &[Vec3],
    quaternions: &[Quat],
    [translate, scale, rotate]: [u16; 3],
) -> Result<Pose> {
    let vector = |index: u16| {
        vectors
            .get(usize::from(index))
            .copied()
            .ok_or_else(|| Error::CustomError(format!("vector index {index} out of bank")))
    };
    Ok(Pose {
        translate: Some(vector(translate)?),
        scale: Some(vector(scale)?),
        rotate: Some(
            quaternions
                .get(usize::from(rotate))
                .copied()
                .ok_or_else(|| {
                    Error::CustomError(format!("quaternion index {rotate} out of bank"))
                })?,
        ),
    })
}

impl Anm {
    /// Read an animation file
    #[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
    pub fn read(path: impl AsRef<Path>) -> Result<Anm> {
        let mut bs = BytesReader::open(path)?;
        Anm::read_from(&mut bs)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Anm> {
        Anm::read_from(&mut BytesReader::from_bytes(data))
    }

    /// Read an animation starting at the beginning of `bs`
    pub fn read_from<R: Read + Seek>(bs: &mut BytesReader<R>) -> Result<Anm> {
        let signature = bs.read_bytes(8)?;
        let kind = AnmKind::from_signature(&signature).ok_or_else(|| {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(&signature);
            Error::InvalidSignature(bytes)
        })?;
        let version = bs.read_u32()?;
        debug!("{kind} animation version {version}");

        let mut anm = Anm {
            kind,
            version,
            ..Default::default()
        };
        match (kind, version) {
            (AnmKind::Compressed, _) => anm.read_compressed(bs)?,
            (AnmKind::Uncompressed, 5) => anm.read_v5(bs)?,
            (AnmKind::Uncompressed, 4) => anm.read_v4(bs)?,
            (AnmKind::Uncompressed, 3) => anm.read_legacy(bs)?,
            (AnmKind::Uncompressed, version) => return Err(Error::UnsupportedVersion(version)),
        }

        Ok(anm)
    }

    fn read_compressed<R: Read + Seek>(&mut self, bs: &mut BytesReader<R>) -> Result<()> {
        self.file_size = bs.read_u32()?;
        self.format_token = bs.read_u32()?;
        self.flags1 = bs.read_u32()?;
        let track_count = bs.read_u32()? as usize;
        let frame_count = bs.read_u32()?;
        // jump cache count
        bs.pad(4)?;
        let max_time = bs.read_f32()?;
        self.fps = bs.read_f32()?;
        self.duration = max_time * self.fps + 1.0;

        self.error_metrics = Some(ErrorMetrics {
            rotate: read_error_metric(bs)?,
            translate: read_error_metric(bs)?,
            scale: read_error_metric(bs)?,
        });
        let translate_min = read_vector(bs)?;
        let translate_max = read_vector(bs)?;
        let scale_min = read_vector(bs)?;
        let scale_max = read_vector(bs)?;

        let frames_offset = bs.read_i32()?;
        let _jump_caches_offset = bs.read_i32()?;
        let joint_hashes_offset = bs.read_i32()?;
        let frames_offset = section(frames_offset, "frames")?;
        let joint_hashes_offset = section(joint_hashes_offset, "joint hashes")?;

        bs.seek(joint_hashes_offset)?;
        self.tracks = (0..track_count)
            .map(|_| -> Result<Track> { Ok(Track::new(bs.read_u32()?)) })
            .collect::<Result<_>>()?;

        bs.seek(frames_offset)?;
        for _ in 0..frame_count {
            let compressed_time = bs.read_u16()?;
            let bits = bs.read_u16()?;
            let transform = read_compressed(bs)?;

            let Some(track) = self.tracks.get_mut(usize::from(bits & 0x3FFF)) else {
                warn!("frame of unknown joint {}", bits & 0x3FFF);
                continue;
            };
            let time = f32::from(compressed_time) / 65535.0 * max_time * self.fps;
            let pose = track.pose_mut(FrameTime(time));
            match bits >> 14 {
                0 => pose.rotate = Some(decompress_quat(&transform)),
                1 => pose.translate = Some(decompress_vec3(translate_min, translate_max, &transform)),
                2 => pose.scale = Some(decompress_vec3(scale_min, scale_max, &transform)),
                kind => return Err(Error::UnknownTransform(kind)),
            }
        }

        Ok(())
    }

    /// Common header of versions 4 and 5, returning track count, frame count and the six offsets
    fn read_banked_header<R: Read + Seek>(
        &mut self,
        bs: &mut BytesReader<R>,
    ) -> Result<(usize, usize, [i32; 6])> {
        self.file_size = bs.read_u32()?;
        self.format_token = bs.read_u32()?;
        self.flags1 = bs.read_u32()?;
        self.flags2 = bs.read_u32()?;
        let track_count = bs.read_u32()? as usize;
        let frame_count = bs.read_u32()? as usize;
        self.fps = 1.0 / bs.read_f32()?;
        self.duration = frame_count as f32;

        let mut offsets = [0i32; 6];
        for offset in offsets.iter_mut() {
            *offset = bs.read_i32()?;
        }
        Ok((track_count, frame_count, offsets))
    }

    fn read_v5<R: Read + Seek>(&mut self, bs: &mut BytesReader<R>) -> Result<()> {
        let (track_count, frame_count, [joint_hashes, _, _, vectors, quaternions, frames]) =
            self.read_banked_header(bs)?;
        let joint_hashes = section(joint_hashes, "joint hashes")?;
        let vectors = section(vectors, "unique vectors")?;
        let quaternions = section(quaternions, "unique quaternions")?;
        let frames = section(frames, "frames")?;

        // sections follow each other: vectors, quaternions, joint hashes, frames
        let vector_count = vectors.abs_diff(quaternions) / 12;
        let quaternion_count = quaternions.abs_diff(joint_hashes) / 6;

        bs.seek(joint_hashes)?;
        self.tracks = (0..track_count)
            .map(|_| -> Result<Track> { Ok(Track::new(bs.read_u32()?)) })
            .collect::<Result<_>>()?;

        bs.seek(vectors)?;
        let vector_bank = (0..vector_count)
            .map(|_| read_vector(bs))
            .collect::<Result<Vec<_>>>()?;
        bs.seek(quaternions)?;
        let quaternion_bank = (0..quaternion_count)
            .map(|_| -> Result<Quat> { Ok(decompress_quat(&read_compressed(bs)?)) })
            .collect::<Result<Vec<_>>>()?;
        debug!(
            "{} vectors, {} quaternions, {} tracks of {} frames",
            vector_bank.len(),
            quaternion_bank.len(),
            track_count,
            frame_count
        );

        bs.seek(frames)?;
        for frame in 0..frame_count {
            for track in self.tracks.iter_mut() {
                let indices = [bs.read_u16()?, bs.read_u16()?, bs.read_u16()?];
                let pose = banked_pose(&vector_bank, &quaternion_bank, indices)?;
                track.poses.insert(FrameTime::from(frame), pose);
            }
        }

        Ok(())
    }

    fn read_v4<R: Read + Seek>(&mut self, bs: &mut BytesReader<R>) -> Result<()> {
        let (track_count, frame_count, [_, _, _, vectors, quaternions, frames]) =
            self.read_banked_header(bs)?;
        let vectors = section(vectors, "unique vectors")?;
        let quaternions = section(quaternions, "unique quaternions")?;
        let frames = section(frames, "frames")?;

        let vector_count = vectors.abs_diff(quaternions) / 12;
        let quaternion_count = quaternions.abs_diff(frames) / 16;

        bs.seek(vectors)?;
        let vector_bank = (0..vector_count)
            .map(|_| read_vector(bs))
            .collect::<Result<Vec<_>>>()?;
        bs.seek(quaternions)?;
        let quaternion_bank = (0..quaternion_count)
            .map(|_| -> Result<Quat> { Ok(Quat::from_array(bs.read_quat()?)) })
            .collect::<Result<Vec<_>>>()?;

        // a track takes the joint of its first frame, later frames are matched by joint hash
        let mut joints: Vec<Option<u32>> = vec![None; track_count];
        let mut tracks: Vec<Track> = vec![Track::default(); track_count];
        bs.seek(frames)?;
        for _ in 0..frame_count {
            for t in 0..track_count {
                let joint_hash = bs.read_u32()?;
                let indices = [bs.read_u16()?, bs.read_u16()?, bs.read_u16()?];
                bs.pad(2)?;

                let target = match joints[t] {
                    None => {
                        joints[t] = Some(joint_hash);
                        Some(t)
                    }
                    Some(hash) if hash == joint_hash => Some(t),
                    Some(_) => joints.iter().position(|joint| *joint == Some(joint_hash)),
                };
                let Some(target) = target else {
                    warn!("frame of unknown joint {joint_hash:08x}");
                    continue;
                };

                let pose = banked_pose(&vector_bank, &quaternion_bank, indices)?;
                let track = &mut tracks[target];
                let next = track.poses.len();
                track.poses.insert(FrameTime::from(next), pose);
            }
        }

        self.tracks = tracks
            .into_iter()
            .zip(joints)
            .map(|(track, joint)| Track {
                joint_hash: joint.unwrap_or_default(),
                ..track
            })
            .collect();
        Ok(())
    }

    fn read_legacy<R: Read + Seek>(&mut self, bs: &mut BytesReader<R>) -> Result<()> {
        // skeleton id
        bs.pad(4)?;
        let track_count = bs.read_u32()? as usize;
        let frame_count = bs.read_u32()? as usize;
        self.fps = bs.read_u32()? as f32;
        self.duration = frame_count as f32;

        self.tracks = Vec::with_capacity(track_count);
        for _ in 0..track_count {
            let name = bs.read_padded_string(32)?;
            // flags
            bs.pad(4)?;
            let mut track = Track::new(elf(&name));
            for frame in 0..frame_count {
                let rotate = Quat::from_array(bs.read_quat()?);
                let translate = read_vector(bs)?;
                track.poses.insert(
                    FrameTime::from(frame),
                    Pose {
                        translate: Some(translate),
                        rotate: Some(rotate),
                        scale: Some(Vec3::ONE),
                    },
                );
            }
            debug!("joint {name} with {frame_count} frames");
            self.tracks.push(track);
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use glam::{Quat, Vec3};
    use lol_hash::elf;
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use crate::{
        error::{Error, Result},
        types::{Anm, AnmKind, FrameTime},
    };

    fn f32s(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|value| value.to_le_bytes()).collect()
    }

    #[traced_test]
    #[test]
    fn legacy() -> Result<()> {
        let mut input = b"r3d2anmd".to_vec();
        input.extend(3u32.to_le_bytes());
        input.extend(0u32.to_le_bytes());
        input.extend(1u32.to_le_bytes());
        input.extend(2u32.to_le_bytes());
        input.extend(30u32.to_le_bytes());
        let mut name = b"Root".to_vec();
        name.resize(32, 0);
        input.extend(name);
        input.extend(0u32.to_le_bytes());
        input.extend(f32s(&[0.0, 0.0, 0.0, 1.0, 1.0, 2.0, 3.0]));
        input.extend(f32s(&[0.0, 1.0, 0.0, 0.0, 4.0, 5.0, 6.0]));

        let anm = Anm::from_bytes(&input)?;
        assert_eq!(anm.version, 3);
        assert_eq!(anm.fps, 30.0);
        assert_eq!(anm.duration, 2.0);
        assert_eq!(anm.tracks.len(), 1);

        let track = &anm.tracks[0];
        assert_eq!(track.joint_hash, elf("Root"));
        let second = track.poses[&FrameTime(1.0)];
        assert_eq!(second.rotate, Some(Quat::from_xyzw(0.0, 1.0, 0.0, 0.0)));
        assert_eq!(second.translate, Some(Vec3::new(4.0, 5.0, 6.0)));
        assert_eq!(second.scale, Some(Vec3::ONE));

        Ok(())
    }

    #[traced_test]
    #[test]
    fn v4_tracks_out_of_order() -> Result<()> {
        let mut input = b"r3d2anmd".to_vec();
        input.extend(4u32.to_le_bytes());
        // file size, format token, flags
        input.extend([0u8; 16]);
        input.extend(2u32.to_le_bytes());
        input.extend(2u32.to_le_bytes());
        input.extend((1.0f32 / 30.0).to_le_bytes());
        // offsets: vectors at 64, quaternions at 88, frames at 104
        for offset in [0i32, 0, 0, 64, 88, 104] {
            input.extend(offset.to_le_bytes());
        }
        input.extend([0u8; 12]);
        input.extend(f32s(&[0.0, 0.0, 0.0, 1.0, 1.0, 1.0]));
        input.extend(f32s(&[0.0, 0.0, 0.0, 1.0]));
        #[rustfmt::skip]
        let frames: [(u32, [u16; 3]); 4] = [
            (0xAAAA, [0, 1, 0]), (0xBBBB, [1, 1, 0]),
            (0xBBBB, [1, 1, 0]), (0xAAAA, [0, 0, 0]),
        ];
        for (joint, indices) in frames {
            input.extend(joint.to_le_bytes());
            for index in indices {
                input.extend(index.to_le_bytes());
            }
            input.extend([0u8; 2]);
        }

        let anm = Anm::from_bytes(&input)?;
        assert!((anm.fps - 30.0).abs() < 1e-3);
        let a = anm.track(0xAAAA).ok_or(Error::CustomError("no track".into()))?;
        let b = anm.track(0xBBBB).ok_or(Error::CustomError("no track".into()))?;
        assert_eq!(a.poses.len(), 2);
        assert_eq!(b.poses.len(), 2);
        assert_eq!(a.poses[&FrameTime(1.0)].scale, Some(Vec3::ZERO));
        assert_eq!(b.poses[&FrameTime(1.0)].translate, Some(Vec3::ONE));

        Ok(())
    }

    #[traced_test]
    #[test]
    fn compressed() -> Result<()> {
        let mut input = b"r3d2canm".to_vec();
        input.extend(1u32.to_le_bytes());
        // file size, format token, flags
        input.extend([0u8; 12]);
        input.extend(1u32.to_le_bytes());
        input.extend(3u32.to_le_bytes());
        input.extend(0u32.to_le_bytes());
        // max time and fps
        input.extend(f32s(&[1.0, 10.0]));
        input.extend(f32s(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6]));
        input.extend(f32s(&[0.0, 0.0, 0.0, 2.0, 2.0, 2.0]));
        input.extend(f32s(&[1.0, 1.0, 1.0, 1.0, 1.0, 1.0]));
        // frames at 120, jump caches, joint hashes at 116
        for offset in [120i32, 0, 116] {
            input.extend(offset.to_le_bytes());
        }
        input.extend(0x1234u32.to_le_bytes());
        #[rustfmt::skip]
        input.extend([
            0x00, 0x00, 0x00, 0x00, 0x00, 0x40, 0x00, 0x20, 0x00, 0x70,
            0xFF, 0xFF, 0x00, 0x40, 0xFF, 0xFF, 0x00, 0x00, 0xFF, 0xFF,
            0xFF, 0xFF, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ]);

        let anm = Anm::from_bytes(&input)?;
        assert_eq!(anm.kind, AnmKind::Compressed);
        assert_eq!(anm.duration, 11.0);
        assert_eq!(
            anm.error_metrics.map(|metrics| metrics.translate.margin),
            Some(0.3)
        );

        let track = &anm.tracks[0];
        assert_eq!(track.joint_hash, 0x1234);
        let start = track.poses[&FrameTime(0.0)];
        assert!(start
            .rotate
            .is_some_and(|rotate| rotate.abs_diff_eq(Quat::IDENTITY, 1e-4)));
        let end = track.poses[&FrameTime(10.0)];
        assert_eq!(end.translate, Some(Vec3::new(2.0, 0.0, 2.0)));
        assert_eq!(end.scale, Some(Vec3::ONE));

        Ok(())
    }

    #[test]
    fn reject_unknown_files() {
        assert!(matches!(
            Anm::from_bytes(b"r3d2sklt\x05\x00\x00\x00"),
            Err(Error::InvalidSignature(_))
        ));
        assert!(matches!(
            Anm::from_bytes(b"r3d2anmd\x02\x00\x00\x00"),
            Err(Error::UnsupportedVersion(2))
        ));
    }
}
