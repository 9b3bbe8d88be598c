use lol_tex::{error::Result, Tex, TexFormat};
use pretty_assertions::assert_eq;
use tracing_test::traced_test;

#[traced_test]
#[test]
fn texture_on_disk() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("ahri_base_tx_cm.tex");

    let mut tex = Tex::new(8, 8, TexFormat::Dxt1, true, Vec::new());
    tex.data = tex
        .level_sizes()
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(level, size)| vec![level as u8; size])
        .collect();
    tex.write(&path)?;

    let back = Tex::read(&path)?;
    assert_eq!(back.mip_count(), 4);
    assert_eq!(
        back.data.iter().map(Vec::len).collect::<Vec<_>>(),
        [8, 8, 8, 32]
    );
    assert_eq!(back, tex);

    Ok(())
}

#[traced_test]
#[test]
fn unknown_header_bytes_are_normalised() -> Result<()> {
    #[rustfmt::skip]
    let bytes = vec![
        b'T', b'E', b'X', 0,
        0x04, 0x00, 0x02, 0x00,
        0x09, 0x02, 0x05, 0x00, // ETC2_EAC without mipmaps
        1, 2, 3, 4, 5, 6, 7, 8,
    ];
    let tex = Tex::from_bytes(&bytes)?;
    assert_eq!((tex.unknown1, tex.unknown2), (9, 5));

    let written = tex.to_bytes()?;
    assert_eq!(written[8..11], [0x01, 0x02, 0x00]);
    assert_eq!(written[12..], bytes[12..]);

    Ok(())
}
