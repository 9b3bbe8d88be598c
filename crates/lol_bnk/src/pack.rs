//! Packing a directory of wems into a new audio bank

use std::{
    collections::BTreeMap,
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use tracing::{info, instrument, warn};
use walkdir::WalkDir;

use crate::{
    error::{Error, Result},
    types::{BankHeader, Bnk, Wem, Wpk},
};

/// Container written by [`pack`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BankKind {
    #[default]
    Bnk,
    Wpk,
}

impl BankKind {
    /// Kind matching the extension of `path`, if any
    pub fn from_path(path: &Path) -> Option<BankKind> {
        path.extension()?.to_str()?.parse().ok()
    }
}

impl FromStr for BankKind {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "bnk" => Ok(BankKind::Bnk),
            "wpk" => Ok(BankKind::Wpk),
            _ => Err(Error::CustomError(format!(
                "unknown bank kind {raw:?}, expected bnk or wpk"
            ))),
        }
    }
}

impl fmt::Display for BankKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BankKind::Bnk => write!(f, "bnk"),
            BankKind::Wpk => write!(f, "wpk"),
        }
    }
}

/// `<id>.wem` files anywhere under `dir`, keyed by id
///
/// Files sharing a name keep the one found last, other files are ignored.
pub fn wem_files(dir: &Path) -> Result<BTreeMap<u32, PathBuf>> {
    let mut files = BTreeMap::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|extension| extension.to_str()) != Some("wem") {
            continue;
        }
        let id = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .and_then(|stem| stem.parse::<u32>().ok());
        match id {
            Some(id) => {
                if let Some(previous) = files.insert(id, entry.into_path()) {
                    warn!("{} is replaced by a later file", previous.display());
                }
            }
            None => warn!("skipping {}, not named <id>.wem", path.display()),
        }
    }
    Ok(files)
}

/// Write every wem under `dir` into a new bank at `out_path`, ordered by id
///
/// Returns the number of wems packed.
#[instrument(err)]
pub fn pack(dir: &Path, out_path: &Path, kind: BankKind) -> Result<usize> {
    let files = wem_files(dir)?;
    let payloads = files
        .values()
        .map(fs::read)
        .collect::<std::io::Result<Vec<_>>>()?;
    let ids = files.keys().copied();

    match kind {
        BankKind::Bnk => Bnk::audio(BankHeader::default(), ids).write(out_path, &payloads)?,
        BankKind::Wpk => Wpk {
            wems: ids
                .map(|id| Wem {
                    id,
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
        .write(out_path, &payloads)?,
    }
    info!("packed {} wems into {}", files.len(), out_path.display());

    Ok(files.len())
}
