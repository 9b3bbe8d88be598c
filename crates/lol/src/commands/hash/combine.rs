use clap::Args;
use lol_hash::ALL_TABLES;
use miette::{Context, Result};
use tracing::info;

use crate::hash_dirs::HashDirs;

#[derive(Args)]
pub struct CombineArgs {
    #[command(flatten)]
    hashes: HashDirs,
}

impl CombineArgs {
    pub fn handle(&self) -> Result<()> {
        let tiers = self.hashes.tiers();
        for file in ALL_TABLES {
            let table = tiers
                .combine(file)
                .context(format!("combining {file}"))?;
            info!("{file}: {} hashes", table.len());
        }
        Ok(())
    }
}
