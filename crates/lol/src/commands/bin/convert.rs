use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use clap::Args;
use lol_bin::Bin;
use lol_hash::{HashTables, BIN_TABLES};
use lol_wad::guess_extension;
use miette::{miette, Context, IntoDiagnostic, Result};
use tracing::info;
use walkdir::WalkDir;

use crate::{
    commands::{append_suffix, replace_suffix},
    hash_dirs::HashDirs,
    report::BatchReport,
};

/// Text documents converted from files without a `.bin` name
const CDTB_SUFFIX: &str = ".cdtb.py";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    ToText,
    ToBinary,
}

#[derive(Args)]
pub struct ConvertArgs {
    /// A `.bin` or `.py` file, or a directory to convert every document of
    #[arg(short, long, value_name = "PATH")]
    path: PathBuf,

    /// A target file, derived from the input name by default
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Convert the text documents of a directory back to binary
    #[arg(long, default_value_t = false)]
    to_bin: bool,

    #[command(flatten)]
    hashes: HashDirs,
}

fn is_binary_document(path: &Path) -> Result<bool> {
    let mut head = Vec::with_capacity(20);
    File::open(path)
        .into_diagnostic()?
        .take(20)
        .read_to_end(&mut head)
        .into_diagnostic()?;
    Ok(guess_extension(&head) == Some("bin"))
}

/// Direction and default target of a conversion, `None` for files that are not documents
///
/// `a.py` and `a.bin` convert into each other. Binary documents without the extension convert
/// to `<name>.cdtb.py`, which converts back to `<name>`.
fn conversion(path: &Path) -> Result<Option<(Direction, PathBuf)>> {
    if let Some(target) = replace_suffix(path, CDTB_SUFFIX, "") {
        return Ok(Some((Direction::ToBinary, target)));
    }
    if let Some(target) = replace_suffix(path, ".py", ".bin") {
        return Ok(Some((Direction::ToBinary, target)));
    }
    if let Some(target) = replace_suffix(path, ".bin", ".py") {
        return Ok(Some((Direction::ToText, target)));
    }
    if is_binary_document(path)? {
        return Ok(Some((Direction::ToText, append_suffix(path, CDTB_SUFFIX))));
    }
    Ok(None)
}

fn convert(source: &Path, target: &Path, direction: Direction, tables: &HashTables) -> Result<()> {
    match direction {
        Direction::ToText => {
            let mut bin = Bin::read(source).context(format!("reading {}", source.display()))?;
            bin.un_hash(tables);
            bin.write_text(target)
                .context(format!("writing {}", target.display()))?;
        }
        Direction::ToBinary => {
            Bin::read_text(source)
                .context(format!("parsing {}", source.display()))?
                .write(target)
                .context(format!("writing {}", target.display()))?;
        }
    }
    info!("converted {} to {}", source.display(), target.display());
    Ok(())
}

impl ConvertArgs {
    pub fn handle(&self) -> Result<()> {
        let tables = self.hashes.tables(&BIN_TABLES)?;

        if !self.path.is_dir() {
            let (direction, target) = conversion(&self.path)?
                .ok_or_else(|| miette!("{} is not a property document", self.path.display()))?;
            let target = self.output.clone().unwrap_or(target);
            let result = convert(&self.path, &target, direction, &tables);
            tables.free();
            return result;
        }

        let wanted = if self.to_bin {
            Direction::ToBinary
        } else {
            Direction::ToText
        };
        let mut report = BatchReport::new();
        for entry in WalkDir::new(&self.path).sort_by_file_name() {
            let entry = entry.into_diagnostic()?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            match conversion(path) {
                Ok(Some((direction, target))) if direction == wanted => {
                    report.record(path, convert(path, &target, direction, &tables));
                }
                Ok(_) => {}
                Err(error) => report.record(path, Err::<(), _>(error)),
            }
        }
        tables.free();

        report.finish()
    }
}
