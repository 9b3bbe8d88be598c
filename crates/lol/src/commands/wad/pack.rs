use std::path::{Path, PathBuf};

use clap::Args;
use miette::{miette, Context, Result};
use tracing::info;

use crate::commands::{append_suffix, check_overwrite};

#[derive(Args)]
pub struct PackArgs {
    /// An input directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// A target WAD file, `<DIR>.wad.client` by default
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

/// `Aatrox.wad` packs into `Aatrox.wad.client`, any other directory gains `.wad.client`
fn default_file(directory: &Path) -> PathBuf {
    let name = directory
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    if name.ends_with(".wad") {
        append_suffix(directory, ".client")
    } else {
        append_suffix(directory, ".wad.client")
    }
}

impl PackArgs {
    pub fn handle(&self) -> Result<()> {
        if !self.directory.is_dir() {
            return Err(miette!("{} is not a directory", self.directory.display()));
        }
        let file = self
            .file
            .clone()
            .unwrap_or_else(|| default_file(&self.directory));
        check_overwrite(&file, self.overwrite)?;
        let inputs = lol_wad::tools::pack_inputs(&self.directory)
            .context(format!("listing {}", self.directory.display()))?;
        if inputs.is_empty() {
            return Err(miette!("directory is empty"));
        }

        info!("creating {}", file.display());
        let count = lol_wad::tools::pack(&self.directory, &file)
            .context(format!("packing {}", self.directory.display()))?;
        info!("packed {count} files into {}", file.display());

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::path::{Path, PathBuf};

    use pretty_assertions::assert_eq;

    use super::default_file;

    #[test]
    fn default_archive_names() {
        assert_eq!(
            default_file(Path::new("out/Aatrox.wad")),
            PathBuf::from("out/Aatrox.wad.client")
        );
        assert_eq!(
            default_file(Path::new("out/mod")),
            PathBuf::from("out/mod.wad.client")
        );
    }
}
