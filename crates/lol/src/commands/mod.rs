pub mod anm;
pub mod bin;
pub mod bnk;
pub mod hash;
pub mod inspect;
pub mod tex;
pub mod wad;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Handle WAD archives
    Wad {
        #[command(subcommand)]
        command: wad::WadCommands,
    },
    /// Handle BIN property files
    Bin {
        #[command(subcommand)]
        command: bin::BinCommands,
    },
    /// Handle ANM animations
    Anm {
        #[command(subcommand)]
        command: anm::AnmCommands,
    },
    /// Handle BNK and WPK audio banks
    Bnk {
        #[command(subcommand)]
        command: bnk::BnkCommands,
    },
    /// Handle TEX textures
    Tex {
        #[command(subcommand)]
        command: tex::TexCommands,
    },
    /// Manage hash tables
    Hash {
        #[command(subcommand)]
        command: hash::HashCommands,
    },
    /// Dump any supported file as JSON
    Inspect(inspect::InspectArgs),
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Wad { command } => command.handle(),
            Commands::Bin { command } => command.handle(),
            Commands::Anm { command } => command.handle(),
            Commands::Bnk { command } => command.handle(),
            Commands::Tex { command } => command.handle(),
            Commands::Hash { command } => command.handle(),
            Commands::Inspect(inspect) => inspect.handle(),
        }
    }
}

/// `path` with `suffix` at the end of its file name swapped for `replacement`
pub(crate) fn replace_suffix(
    path: &std::path::Path,
    suffix: &str,
    replacement: &str,
) -> Option<std::path::PathBuf> {
    let name = path.file_name()?.to_str()?;
    let stem = name.strip_suffix(suffix)?;
    Some(path.with_file_name(format!("{stem}{replacement}")))
}

/// `path` with `extra` appended to its file name
pub(crate) fn append_suffix(path: &std::path::Path, extra: &str) -> std::path::PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(extra);
    path.with_file_name(name)
}

/// Fail when `path` exists and overwriting was not asked for
pub(crate) fn check_overwrite(path: &std::path::Path, overwrite: bool) -> miette::Result<()> {
    if !overwrite && path.exists() {
        return Err(miette::miette!(
            help = "pass --overwrite to replace it",
            "{} already exists",
            path.display()
        ));
    }
    Ok(())
}
