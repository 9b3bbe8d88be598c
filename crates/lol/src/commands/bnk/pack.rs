use std::path::PathBuf;

use clap::Args;
use lol_bnk::BankKind;
use miette::{miette, Context, Result};
use tracing::info;

use crate::commands::{append_suffix, check_overwrite};

#[derive(Args)]
pub struct PackArgs {
    /// An input directory of `<id>.wem` files
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// A target file, `<DIR>.<kind>` by default
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Container to write, taken from the target extension by default
    #[arg(short, long, value_name = "bnk|wpk")]
    kind: Option<BankKind>,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl PackArgs {
    pub fn handle(&self) -> Result<()> {
        if !self.directory.is_dir() {
            return Err(miette!("{} is not a directory", self.directory.display()));
        }
        let kind = self
            .kind
            .or_else(|| self.file.as_deref().and_then(BankKind::from_path))
            .unwrap_or_default();
        let file = self
            .file
            .clone()
            .unwrap_or_else(|| append_suffix(&self.directory, &format!(".{kind}")));
        check_overwrite(&file, self.overwrite)?;

        let count = lol_bnk::pack(&self.directory, &file, kind)
            .context(format!("packing {}", self.directory.display()))?;
        info!("packed {count} wems into {}", file.display());

        Ok(())
    }
}
