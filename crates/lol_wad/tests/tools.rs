use std::{fs, io::BufReader};

use lol_hash::{xxh64, HashTable, HashTables, PathHash};
use lol_wad::{
    error::Result,
    tools::{pack, unpack, HASHED_FILES},
    Wad, WadCompression, WadWriter, WadWriterOptions,
};
use pretty_assertions::assert_eq;
use tracing_test::traced_test;

fn game_tables(names: &[&str]) -> HashTables {
    let mut table = HashTable::for_file("hashes.game.txt");
    for name in names {
        table.insert(xxh64(name), *name);
    }
    let mut tables = HashTables::new();
    tables.register(table);
    tables
}

#[traced_test]
#[test]
fn pack_then_unpack() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let source = dir.path().join("source");
    fs::create_dir_all(source.join("data"))?;
    fs::create_dir_all(source.join("assets"))?;
    fs::write(source.join("data").join("a.bin"), b"PROP\x01\x00\x00\x00\x00\x00\x00\x00")?;
    fs::write(source.join("assets").join("vo.bnk"), b"BKHD\x00\x00\x00\x00")?;
    fs::write(source.join("0123456789abcdef.dds"), b"DDS \x7c\x00\x00\x00")?;

    let wad_path = dir.path().join("test.wad.client");
    assert_eq!(pack(&source, &wad_path)?, 3);

    let wad = Wad::read(&wad_path)?;
    let bank = wad
        .chunk(xxh64("assets/vo.bnk"))
        .ok_or(lol_wad::error::Error::CustomError("bank chunk missing".into()))?;
    assert_eq!(bank.compression, WadCompression::Raw);
    assert!(wad.chunk(0x0123_4567_89AB_CDEF).is_some());

    let out = dir.path().join("out");
    let tables = game_tables(&["data/a.bin", "assets/vo.bnk"]);
    let report = unpack(&wad_path, &out, &tables)?;
    assert_eq!(report.written, 3);
    assert!(report.hashed_files.is_empty());

    for relative in ["data/a.bin", "assets/vo.bnk", "0123456789abcdef.dds"] {
        assert_eq!(fs::read(out.join(relative))?, fs::read(source.join(relative))?);
    }

    Ok(())
}

#[traced_test]
#[test]
fn long_names_fall_back_to_hashes() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let long_name = format!("data/{}.bin", "x".repeat(300));
    let wad_path = dir.path().join("long.wad.client");

    let mut writer = WadWriter::create(&wad_path, 2, WadWriterOptions::default())?;
    writer.write_data(0, PathHash::from_raw(long_name.as_str()), b"PROP long")?;
    writer.write_data(1, PathHash::from_raw("data/x"), b"plain")?;
    writer.finish()?;

    let out = dir.path().join("out");
    let tables = game_tables(&[long_name.as_str(), "data/x", "data/x/child.bin"]);
    let report = unpack(&wad_path, &out, &tables)?;

    let hashed = format!("{:016x}.bin", xxh64(&long_name));
    assert_eq!(report.hashed_files.get(&hashed), Some(&long_name));
    assert_eq!(fs::read(out.join(&hashed))?, b"PROP long");

    let listed: std::collections::BTreeMap<String, String> =
        serde_json::from_reader(BufReader::new(fs::File::open(out.join(HASHED_FILES))?))?;
    assert_eq!(listed, report.hashed_files);

    // packing the unpacked directory keeps the original hash of the long name
    let repacked = dir.path().join("repacked.wad.client");
    pack(&out, &repacked)?;
    let wad = Wad::read(&repacked)?;
    assert!(wad.chunk(xxh64(&long_name)).is_some());
    assert!(wad.chunk(xxh64("data/x")).is_some());

    Ok(())
}
