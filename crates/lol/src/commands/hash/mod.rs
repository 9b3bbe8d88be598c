pub mod combine;
pub mod extract;

#[derive(clap::Subcommand)]
pub enum HashCommands {
    /// Collect hashes from BIN documents and WAD archives into the extracted tier
    Extract(extract::ExtractArgs),
    /// Merge the CDTB, extracted and custom tiers into the custom tier
    Combine(combine::CombineArgs),
}

impl HashCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            HashCommands::Extract(extract) => extract.handle(),
            HashCommands::Combine(combine) => combine.handle(),
        }
    }
}
