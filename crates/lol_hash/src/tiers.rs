//! Three-tier hash table merging
//!
//! Tables come from three directories with increasing priority: a vendor-synced tier, a tier of
//! hashes extracted locally from game files, and a user custom tier. Combining writes the merged
//! result back into the custom tier.

use std::{
    fs,
    path::{Path, PathBuf},
};

use bon::Builder;
use tracing::{info, instrument};

use crate::{error::Result, table::HashTable};

/// Locations of the three table tiers
#[derive(Debug, Clone, Builder)]
pub struct HashTiers {
    /// Vendor-synced tables, lowest priority
    #[builder(into)]
    pub cdtb: PathBuf,

    /// Tables extracted from local game files
    #[builder(into)]
    pub extracted: PathBuf,

    /// User custom tables, highest priority and the combine destination
    #[builder(into)]
    pub custom: PathBuf,
}

impl HashTiers {
    fn read_tier(dir: &Path, file_name: &str) -> Result<HashTable> {
        let path = dir.join(file_name);
        if path.is_file() {
            HashTable::read(path)
        } else {
            Ok(HashTable::for_file(file_name))
        }
    }

    /// Merge one table file across the tiers and write it into the custom tier
    #[instrument(skip(self), err)]
    pub fn combine(&self, file_name: &str) -> Result<HashTable> {
        let mut combined = HashTable::for_file(file_name);
        for dir in [&self.cdtb, &self.extracted, &self.custom] {
            combined.extend(&Self::read_tier(dir, file_name)?);
        }

        fs::create_dir_all(&self.custom)?;
        combined.write(self.custom.join(file_name))?;
        info!("combined {} hashes into {file_name}", combined.len());

        Ok(combined)
    }

    /// Add newly extracted hashes to the extracted tier, then combine
    ///
    /// Names already present in the extracted tier are kept.
    #[instrument(skip_all, fields(file = %table.file_name), err)]
    pub fn merge_extracted(&self, table: &HashTable) -> Result<HashTable> {
        let mut merged = HashTable::for_file(&table.file_name);
        merged.extend(table);
        merged.extend(&Self::read_tier(&self.extracted, &table.file_name)?);

        fs::create_dir_all(&self.extracted)?;
        merged.write(self.extracted.join(&table.file_name))?;

        self.combine(&table.file_name)
    }
}
