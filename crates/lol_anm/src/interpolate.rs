//! Filling every integer frame of a track
//!
//! Missing channels are interpolated between the nearest keys defining them on either side,
//! linearly for vectors and spherically for rotations. Frames before the first or after the last
//! key repeat that key. A channel no key defines stays at the identity transform.

use glam::{Quat, Vec3};

use crate::types::{Anm, DensePose, FrameTime, Track};

fn sample<T: Copy>(curve: &[(f32, T)], frame: f32, mix: impl Fn(T, T, f32) -> T) -> Option<T> {
    let left = curve.iter().rev().find(|(time, _)| *time <= frame);
    let right = curve.iter().find(|(time, _)| *time >= frame);
    match (left, right) {
        (Some(&(left_time, left)), Some(&(right_time, right))) if right_time > left_time => {
            Some(mix(left, right, (frame - left_time) / (right_time - left_time)))
        }
        (Some(&(_, value)), _) | (None, Some(&(_, value))) => Some(value),
        (None, None) => None,
    }
}

impl Track {
    /// Pose at every integer frame below `frame_count`
    pub fn dense_poses(&self, frame_count: usize) -> Vec<DensePose> {
        let translates: Vec<(f32, Vec3)> = self
            .poses
            .iter()
            .filter_map(|(time, pose)| pose.translate.map(|value| (time.0, value)))
            .collect();
        let rotates: Vec<(f32, Quat)> = self
            .poses
            .iter()
            .filter_map(|(time, pose)| pose.rotate.map(|value| (time.0, value)))
            .collect();
        let scales: Vec<(f32, Vec3)> = self
            .poses
            .iter()
            .filter_map(|(time, pose)| pose.scale.map(|value| (time.0, value)))
            .collect();

        let identity = DensePose::default();
        (0..frame_count)
            .map(|frame| {
                let frame = frame as f32;
                DensePose {
                    translate: sample(&translates, frame, Vec3::lerp)
                        .unwrap_or(identity.translate),
                    rotate: sample(&rotates, frame, Quat::slerp).unwrap_or(identity.rotate),
                    scale: sample(&scales, frame, Vec3::lerp).unwrap_or(identity.scale),
                }
            })
            .collect()
    }

    /// Store a complete pose at every integer frame below `frame_count`
    ///
    /// Keys at fractional times are kept.
    pub fn interpolate(&mut self, frame_count: usize) {
        for (frame, pose) in self.dense_poses(frame_count).into_iter().enumerate() {
            self.poses.insert(FrameTime::from(frame), pose.into());
        }
    }
}

impl Anm {
    /// Fill every integer frame of every track, see [`Track::interpolate`]
    pub fn interpolate(&mut self) {
        let frame_count = self.frame_count();
        for track in self.tracks.iter_mut() {
            track.interpolate(frame_count);
        }
    }
}
