//! Unpacking archives into directories and packing them back

use std::{
    collections::{BTreeMap, HashSet},
    fs::{self, File},
    io::BufReader,
    path::{Component, Path, PathBuf},
};

use lol_hash::{HashTables, HashValue, PathHash};
use tracing::{info, instrument, warn};
use walkdir::WalkDir;

use crate::{
    error::Result,
    types::Wad,
    write::{WadWriter, WadWriterOptions},
};

/// Names of chunks written under their hash instead, relative to the output directory
pub const HASHED_FILES: &str = "hashed_files.json";

/// Longest file name most file systems accept
const MAX_FILE_NAME: usize = 255;

/// Outcome of [`unpack`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnpackReport {
    pub written: usize,
    /// Chunks without readable content
    pub skipped: usize,
    /// Hashed file name to the chunk name it stands for
    pub hashed_files: BTreeMap<String, String>,
}

fn is_safe_relative(name: &str) -> bool {
    Path::new(name)
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
}

/// Extract every chunk of `wad_path` into `out_dir`
///
/// Unresolved chunks are named by their hex hash plus the sniffed extension. Chunks whose name
/// is too long, unsafe, or taken by a directory are written as `<hash>.<ext>` at the root of
/// `out_dir` and listed in [`HASHED_FILES`].
#[instrument(skip(tables), err)]
pub fn unpack(wad_path: &Path, out_dir: &Path, tables: &HashTables) -> Result<UnpackReport> {
    let mut wad = Wad::read(wad_path)?;
    wad.un_hash(tables);

    // names that other chunks use as a directory
    let directories: HashSet<String> = wad
        .chunks
        .iter()
        .flat_map(|chunk| {
            let name = chunk.hash.to_string();
            name.match_indices('/')
                .map(|(index, _)| name[..index].to_owned())
                .collect::<Vec<_>>()
        })
        .collect();

    let mut reader = BufReader::new(File::open(wad_path)?);
    let mut report = UnpackReport::default();
    for chunk in wad.chunks.iter_mut() {
        let loaded = chunk.load(&mut reader)?;
        if !loaded.has_data() {
            warn!("{}: no readable data", loaded.hash);
            report.skipped += 1;
            continue;
        }

        let name = loaded.hash.to_string();
        let suffix = loaded
            .extension
            .as_deref()
            .map(|extension| format!(".{extension}"))
            .unwrap_or_default();
        let mut file_path = out_dir.join(&name);
        if !loaded.hash.is_resolved() && !name.ends_with(&suffix) {
            file_path = out_dir.join(format!("{name}{suffix}"));
        }

        let too_long = file_path
            .file_name()
            .is_some_and(|file_name| file_name.len() > MAX_FILE_NAME);
        if too_long
            || !is_safe_relative(&name)
            || directories.contains(&name)
            || file_path.is_dir()
        {
            let hashed = format!("{}{suffix}", loaded.hash.hex());
            file_path = out_dir.join(&hashed);
            report.hashed_files.insert(hashed, name.clone());
        }

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&file_path, loaded.bytes())?;
        report.written += 1;
        info!("unpacked {name}");
    }

    if !report.hashed_files.is_empty() {
        fs::write(
            out_dir.join(HASHED_FILES),
            serde_json::to_string_pretty(&report.hashed_files)?,
        )?;
    }

    Ok(report)
}

/// Chunk hash a file of an unpacked directory stands for
///
/// Files at the root whose stem is a 16 digit hex number are literal hashes, anything else is
/// hashed from its path relative to `root`.
pub fn chunk_hash(root: &Path, file: &Path) -> PathHash {
    let relative = file.strip_prefix(root).unwrap_or(file);
    let relative_name = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");

    if relative.components().count() == 1 {
        let stem = relative_name
            .split('.')
            .next()
            .unwrap_or(relative_name.as_str());
        if u64::is_hash(stem) {
            if let Some(hash) = u64::from_hex(stem) {
                return PathHash::new(hash);
            }
        }
    }
    PathHash::from_raw(relative_name)
}

/// Files of `dir` that [`pack`] stores, in a stable order
pub fn pack_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || entry.file_name() == HASHED_FILES {
            continue;
        }
        files.push(entry.into_path());
    }
    Ok(files)
}

/// Store every file under `dir` into a new archive at `wad_path`, returning the chunk count
#[instrument(err)]
pub fn pack(dir: &Path, wad_path: &Path) -> Result<usize> {
    let files = pack_inputs(dir)?;
    let mut writer = WadWriter::create(wad_path, files.len(), WadWriterOptions::default())?;
    for (id, file) in files.iter().enumerate() {
        let hash = chunk_hash(dir, file);
        let data = fs::read(file)?;
        writer.write_data(id, hash, &data)?;
        info!("packed {}", file.display());
    }
    writer.finish()?;

    Ok(files.len())
}
