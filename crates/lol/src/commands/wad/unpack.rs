use std::path::{Path, PathBuf};

use clap::Args;
use lol_hash::{HashTables, WAD_TABLES};
use miette::{Context, IntoDiagnostic, Result};
use tracing::info;
use walkdir::WalkDir;

use crate::{
    commands::{append_suffix, check_overwrite, replace_suffix},
    hash_dirs::HashDirs,
    report::BatchReport,
};

#[derive(Args)]
pub struct UnpackArgs {
    /// An input WAD file, or a directory searched for `.wad.client` files
    #[arg(short, long, value_name = "PATH")]
    file: PathBuf,

    /// A target directory, next to the archive by default
    #[arg(short, long, value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,

    #[command(flatten)]
    hashes: HashDirs,
}

/// `Aatrox.wad.client` unpacks into `Aatrox.wad`
fn default_directory(file: &Path) -> PathBuf {
    replace_suffix(file, ".wad.client", ".wad").unwrap_or_else(|| append_suffix(file, ".unpacked"))
}

fn unpack_one(file: &Path, directory: &Path, overwrite: bool, tables: &HashTables) -> Result<()> {
    check_overwrite(directory, overwrite)?;
    let report = lol_wad::tools::unpack(file, directory, tables)
        .context(format!("unpacking {}", file.display()))?;
    info!(
        "unpacked {} chunks of {} into {}, {} skipped, {} written by hash",
        report.written,
        file.display(),
        directory.display(),
        report.skipped,
        report.hashed_files.len()
    );
    Ok(())
}

impl UnpackArgs {
    pub fn handle(&self) -> Result<()> {
        let tables = self.hashes.tables(&WAD_TABLES)?;

        if !self.file.is_dir() {
            let directory = self
                .directory
                .clone()
                .unwrap_or_else(|| default_directory(&self.file));
            let result = unpack_one(&self.file, &directory, self.overwrite, &tables);
            tables.free();
            return result;
        }

        let mut report = BatchReport::new();
        for entry in WalkDir::new(&self.file).sort_by_file_name() {
            let entry = entry.into_diagnostic()?;
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(default) = replace_suffix(path, ".wad.client", ".wad") else {
                continue;
            };
            let directory = match &self.directory {
                Some(root) => root.join(
                    default
                        .strip_prefix(&self.file)
                        .into_diagnostic()?,
                ),
                None => default,
            };
            report.record(path, unpack_one(path, &directory, self.overwrite, &tables));
        }
        tables.free();

        report.finish()
    }
}
