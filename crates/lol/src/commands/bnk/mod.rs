pub mod extract;
pub mod pack;

#[derive(clap::Subcommand)]
pub enum BnkCommands {
    /// Extract the wems of a BNK or WPK, sorted by the events that play them
    Extract(extract::ExtractArgs),
    /// Pack a directory of `<id>.wem` files into a BNK or WPK
    Pack(pack::PackArgs),
}

impl BnkCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            BnkCommands::Extract(extract) => extract.handle(),
            BnkCommands::Pack(pack) => pack.handle(),
        }
    }
}
