//! Guessing file extensions of chunks

/// Leading bytes of known file types, checked in order
const SIGNATURES: &[(&[u8], &str)] = &[
    (b"OggS", "ogg"),
    (&[0x00, 0x01, 0x00, 0x00], "ttf"),
    (&[0x1A, 0x45, 0xDF, 0xA3], "webm"),
    (b"true", "ttf"),
    (b"OTTO\0", "otf"),
    (b"\"use strict\";", "min.js"),
    (b"<template ", "template.html"),
    (b"<!-- Elements -->", "template.html"),
    (b"DDS ", "dds"),
    (b"<svg", "svg"),
    (b"PROP", "bin"),
    (b"PTCH", "bin"),
    (b"BKHD", "bnk"),
    (b"r3d2Mesh", "scb"),
    (b"r3d2anmd", "anm"),
    (b"r3d2canm", "anm"),
    (b"r3d2sklt", "skl"),
    (b"r3d2", "wpk"),
    (&[0x33, 0x22, 0x11, 0x00], "skn"),
    (b"PreLoadBuildingBlocks = {", "preload"),
    (b"\x1bLuaQ\x00\x01\x04\x04", "luabin"),
    (b"\x1bLuaQ\x00\x01\x04\x08", "luabin64"),
    (&[0x02, 0x3D, 0x00, 0x28], "troybin"),
    (b"[ObjectBegin]", "sco"),
    (b"OEGM", "mapgeo"),
    (b"TEX\0", "tex"),
    (b"RW", "wad"),
    (&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A], "png"),
    (&[0xFF, 0xD8, 0xFF], "jpg"),
    (b"gimp xcf", "xcf"),
    (b"8BPS", "psd"),
    (b"BLENDER", "blend"),
    (b"Kaydara FBX Binary", "fbx"),
    (b"FOR4", "mb"),
    (b"FOR8", "mb"),
    (b"#MayaIcons", "swatches"),
    (b"#PROP_text", "py"),
    (&[0x5B, 0x0A, 0x20, 0x20], "json"),
    (&[0x7B, 0x0A, 0x20, 0x20], "json"),
];

/// Skeletons of the older layout carry their magic at bytes 4 to 8
const LEGACY_SKELETON_MAGIC: [u8; 4] = [0xC3, 0x4F, 0xFD, 0x22];

/// Guess the extension of chunk content from its first bytes
///
/// ```
/// assert_eq!(lol_wad::guess_extension(b"r3d2canm\x01\x00"), Some("anm"));
/// assert_eq!(lol_wad::guess_extension(b"r3d2\x01\x00\x00\x00"), Some("wpk"));
/// assert_eq!(lol_wad::guess_extension(b"????"), None);
/// ```
pub fn guess_extension(data: &[u8]) -> Option<&'static str> {
    if data.get(4..8) == Some(&LEGACY_SKELETON_MAGIC[..]) {
        return Some("skl");
    }
    SIGNATURES
        .iter()
        .find(|(signature, _)| data.starts_with(signature))
        .map(|(_, extension)| *extension)
}

/// Known extension a path ends with
pub fn extension_of(path: &str) -> Option<&'static str> {
    let path = path.to_lowercase();
    if path.ends_with(".wad.client") {
        return Some("wad");
    }
    SIGNATURES
        .iter()
        .map(|(_, extension)| *extension)
        .find(|extension| {
            path.strip_suffix(extension)
                .is_some_and(|stem| stem.ends_with('.'))
        })
}
