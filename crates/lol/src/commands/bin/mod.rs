pub mod convert;

#[derive(clap::Subcommand)]
pub enum BinCommands {
    /// Convert between binary `.bin` and text `.py` documents
    Convert(convert::ConvertArgs),
}

impl BinCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            BinCommands::Convert(convert) => convert.handle(),
        }
    }
}
