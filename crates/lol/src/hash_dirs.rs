//! Where hash tables are looked up

use std::path::PathBuf;

use clap::Args;
use lol_hash::{HashTables, HashTiers};
use miette::{Context, Result};

/// Hash table directories, one per tier
///
/// Lookups only read the custom tier, which `lol hash combine` fills from the other two.
#[derive(Args, Debug, Clone)]
pub struct HashDirs {
    /// Custom hash tables, used for every lookup
    #[arg(
        long = "hashes",
        value_name = "DIR",
        env = "LOL_HASHES_DIR",
        default_value = "hashes/custom_hashes"
    )]
    pub custom: PathBuf,

    /// Tables synced from CommunityDragon
    #[arg(
        long,
        value_name = "DIR",
        env = "LOL_CDTB_HASHES_DIR",
        default_value = "hashes/cdtb_hashes"
    )]
    pub cdtb_hashes: PathBuf,

    /// Tables extracted from local game files
    #[arg(
        long,
        value_name = "DIR",
        env = "LOL_EXTRACTED_HASHES_DIR",
        default_value = "hashes/extracted_hashes"
    )]
    pub extracted_hashes: PathBuf,
}

impl HashDirs {
    /// Load the named tables of the custom tier, skipping missing files
    pub fn tables(&self, files: &[&str]) -> Result<HashTables> {
        HashTables::load(&self.custom, files)
            .context(format!("loading hashes from {}", self.custom.display()))
    }

    pub fn tiers(&self) -> HashTiers {
        HashTiers::builder()
            .cdtb(&self.cdtb_hashes)
            .extracted(&self.extracted_hashes)
            .custom(&self.custom)
            .build()
    }
}
