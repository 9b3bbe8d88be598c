use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use clap::Args;
use lol_bin::{Bin, ExtractedHashes};
use lol_wad::Wad;
use miette::{Context, IntoDiagnostic, Result};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::{hash_dirs::HashDirs, report::BatchReport};

#[derive(Args)]
pub struct ExtractArgs {
    /// Files or directories to search for `.bin` and `.wad.client` files
    #[arg(required = true, value_name = "PATH")]
    paths: Vec<PathBuf>,

    #[command(flatten)]
    hashes: HashDirs,
}

/// Hashes of every document stored in an archive
fn extract_wad(path: &Path, extracted: &mut ExtractedHashes) -> Result<()> {
    let mut reader = BufReader::new(File::open(path).into_diagnostic()?);
    let mut wad = Wad::read_from(&mut reader)?;
    for chunk in wad.chunks.iter_mut() {
        let loaded = chunk.load(&mut reader)?;
        if loaded.extension.as_deref() != Some("bin") {
            continue;
        }
        match Bin::from_bytes(loaded.bytes()) {
            Ok(bin) => extracted.extend(&bin.extract_hashes()),
            Err(error) => debug!("skipping chunk {}: {error}", loaded.hash),
        }
    }
    Ok(())
}

fn extract_file(path: &Path, extracted: &mut ExtractedHashes) -> Result<bool> {
    let name = path.to_string_lossy();
    if name.ends_with(".wad.client") {
        extract_wad(path, extracted).context(format!("reading {}", path.display()))?;
    } else if name.ends_with(".bin") {
        let bin = Bin::read(path).context(format!("reading {}", path.display()))?;
        extracted.extend(&bin.extract_hashes());
    } else {
        return Ok(false);
    }
    info!("extracted hashes from {}", path.display());
    Ok(true)
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let mut extracted = ExtractedHashes::default();
        let mut report = BatchReport::new();
        for root in &self.paths {
            for entry in WalkDir::new(root).sort_by_file_name() {
                let entry = entry.into_diagnostic()?;
                if !entry.file_type().is_file() {
                    continue;
                }
                match extract_file(entry.path(), &mut extracted) {
                    Ok(false) => {}
                    result => report.record(entry.path(), result),
                }
            }
        }

        let tiers = self.hashes.tiers();
        for table in [&extracted.game, &extracted.entries] {
            let combined = tiers
                .merge_extracted(table)
                .context(format!("saving {}", table.file_name))?;
            info!(
                "{}: {} extracted, {} combined",
                table.file_name,
                table.len(),
                combined.len()
            );
        }

        report.finish()
    }
}
