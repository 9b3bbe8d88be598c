pub mod pack;
pub mod unpack;

#[derive(clap::Subcommand)]
pub enum WadCommands {
    /// Extract a WAD archive, or every archive under a directory
    Unpack(unpack::UnpackArgs),
    /// Pack a directory into a WAD archive
    Pack(pack::PackArgs),
}

impl WadCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            WadCommands::Unpack(unpack) => unpack.handle(),
            WadCommands::Pack(pack) => pack.handle(),
        }
    }
}
