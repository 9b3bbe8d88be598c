use std::path::{Path, PathBuf};

use clap::Args;
use lol_bnk::Bank;
use miette::{Context, Result};
use tracing::{info, warn};

use crate::commands::{append_suffix, check_overwrite};

#[derive(Args)]
pub struct ExtractArgs {
    /// An input BNK or WPK holding the wems
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// The events bank describing the wems, `*_events.bnk` next to the input by default
    #[arg(short, long, value_name = "FILE")]
    events: Option<PathBuf>,

    /// A BIN document naming the events
    #[arg(short, long, value_name = "FILE")]
    bin: Option<PathBuf>,

    /// A target directory, the input without its extension by default
    #[arg(short, long, value_name = "DIR")]
    directory: Option<PathBuf>,

    /// Write every wem directly into the target, ignoring events
    #[arg(long, default_value_t = false)]
    flat: bool,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

/// `vo_audio.wpk` and `vo_audio.bnk` are described by `vo_events.bnk`
fn events_sibling(file: &Path) -> Option<PathBuf> {
    let stem = file.file_stem()?.to_str()?;
    if !stem.contains("_audio") {
        return None;
    }
    Some(file.with_file_name(format!("{}.bnk", stem.replace("_audio", "_events"))))
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let directory = self
            .directory
            .clone()
            .unwrap_or_else(|| match self.file.file_stem() {
                Some(stem) => self.file.with_file_name(stem),
                None => append_suffix(&self.file, ".extracted"),
            });
        check_overwrite(&directory, self.overwrite)?;

        let events = self
            .events
            .clone()
            .or_else(|| events_sibling(&self.file).filter(|path| path.is_file()));
        if events.is_none() && self.bin.is_some() {
            warn!("event names need an events bank, the bin is ignored");
        }
        let bin = self.bin.as_deref().filter(|_| events.is_some());

        let bank = Bank::open(&self.file, events.as_deref(), bin)
            .context(format!("opening {}", self.file.display()))?;
        let count = if self.flat {
            bank.unpack(&directory)
        } else {
            bank.extract(&directory)
        }
        .context(format!("extracting into {}", directory.display()))?;

        info!(
            "wrote {count} wems for {} events into {}",
            bank.tree.events.len(),
            directory.display()
        );
        Ok(())
    }
}
