use glam::{Quat, Vec3};
use lol_anm::{error::Result, Anm, FrameTime, Pose, Track};
use pretty_assertions::assert_eq;
use tracing_test::traced_test;

#[traced_test]
#[test]
fn interpolated_tracks_survive_a_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("idle.anm");

    let mut a = Track::new(lol_hash::elf("a"));
    a.poses.insert(
        FrameTime(0.0),
        Pose {
            translate: Some(Vec3::ZERO),
            rotate: Some(Quat::IDENTITY),
            scale: Some(Vec3::ONE),
        },
    );
    a.poses.insert(
        FrameTime(10.0),
        Pose {
            translate: Some(Vec3::new(10.0, 0.0, 0.0)),
            rotate: Some(Quat::IDENTITY),
            scale: Some(Vec3::ONE),
        },
    );
    let mut b = Track::new(lol_hash::elf("b"));
    b.pose_mut(5).translate = Some(Vec3::new(1.0, 2.0, 3.0));

    let anm = Anm {
        duration: 10.0,
        tracks: vec![a, b],
        ..Default::default()
    };
    anm.write(&path)?;
    let read = Anm::read(&path)?;

    assert_eq!(read.frame_count(), 10);
    let a = read.track(lol_hash::elf("a")).map(|track| track.poses.len());
    assert_eq!(a, Some(10));

    let translate = |joint: &str, frame: usize| {
        read.track(lol_hash::elf(joint))
            .and_then(|track| track.poses.get(&FrameTime::from(frame)))
            .and_then(|pose| pose.translate)
    };
    assert_eq!(translate("a", 5), Some(Vec3::new(5.0, 0.0, 0.0)));
    assert_eq!(translate("a", 9), Some(Vec3::new(9.0, 0.0, 0.0)));
    for frame in 0..10 {
        assert_eq!(translate("b", frame), Some(Vec3::new(1.0, 2.0, 3.0)));
    }

    Ok(())
}

#[test]
fn missing_sections_are_reported() {
    let mut input = b"r3d2anmd".to_vec();
    input.extend(5u32.to_le_bytes());
    input.extend([0u8; 64]);

    let error = Anm::from_bytes(&input).map(|_| ());
    assert_eq!(
        error.map_err(|error| error.to_string()),
        Err("file does not contain joint hashes".to_owned())
    );
}
