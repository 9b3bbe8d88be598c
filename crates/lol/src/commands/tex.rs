use std::path::PathBuf;

use clap::Args;
use itertools::Itertools;
use lol_tex::Tex;
use miette::{Context, Result};
use owo_colors::OwoColorize;

#[derive(clap::Subcommand)]
pub enum TexCommands {
    /// Print the header and mip levels of a texture
    Info(InfoArgs),
}

impl TexCommands {
    pub fn handle(&self) -> Result<()> {
        match self {
            TexCommands::Info(info) => info.handle(),
        }
    }
}

#[derive(Args)]
pub struct InfoArgs {
    /// An input TEX file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,
}

impl InfoArgs {
    pub fn handle(&self) -> Result<()> {
        let tex = Tex::read(&self.file).context(format!("reading {}", self.file.display()))?;

        println!("{}", self.file.display().bold());
        println!("  size:    {}x{}", tex.width, tex.height);
        println!("  format:  {}", tex.format);
        println!("  mipmaps: {}", tex.mipmaps);
        if tex.has_levels() {
            println!(
                "  levels:  {}",
                tex.data.iter().map(|level| level.len()).join(", ")
            );
        } else {
            println!("  data:    {} bytes", tex.data.iter().map(Vec::len).sum::<usize>());
        }

        Ok(())
    }
}
