use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use clap::Args;
use lol_anm::Anm;
use lol_bin::Bin;
use lol_bnk::AudioBank;
use lol_hash::{BIN_TABLES, WAD_TABLES};
use lol_tex::Tex;
use lol_wad::{guess_extension, Wad, WadChunk};
use miette::{miette, Context, IntoDiagnostic, Result};
use serde::Serialize;
use tracing::info;

use crate::{commands::append_suffix, hash_dirs::HashDirs};

#[derive(Args)]
pub struct InspectArgs {
    /// A BIN, ANM, BNK, WPK, TEX or WAD file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target JSON file, `<FILE>.json` by default
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    #[command(flatten)]
    hashes: HashDirs,
}

#[derive(Serialize)]
struct ChunkInfo {
    hash: String,
    extension: Option<String>,
    offset: u32,
    compressed_size: u32,
    decompressed_size: u32,
    compression: String,
    duplicated: bool,
    checksum: String,
}

impl From<&WadChunk> for ChunkInfo {
    fn from(chunk: &WadChunk) -> Self {
        ChunkInfo {
            hash: chunk.hash.to_string(),
            extension: chunk.extension.clone(),
            offset: chunk.offset,
            compressed_size: chunk.compressed_size,
            decompressed_size: chunk.decompressed_size,
            compression: chunk.compression.to_string(),
            duplicated: chunk.duplicated,
            checksum: format!("{:016x}", chunk.checksum),
        }
    }
}

#[derive(Serialize)]
struct WadInfo {
    version: String,
    chunks: Vec<ChunkInfo>,
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path).into_diagnostic()?);
    serde_json::to_writer_pretty(&mut writer, value).into_diagnostic()?;
    writer.flush().into_diagnostic()
}

impl InspectArgs {
    fn inspect_wad(&self) -> Result<WadInfo> {
        let tables = self.hashes.tables(&WAD_TABLES)?;
        let mut reader = BufReader::new(File::open(&self.file).into_diagnostic()?);
        let mut wad = Wad::read_from(&mut reader)?;
        wad.un_hash(&tables);
        tables.free();

        // loading sniffs the extensions names could not give
        for chunk in wad.chunks.iter_mut() {
            chunk.load(&mut reader)?;
        }
        Ok(WadInfo {
            version: format!("{}.{}", wad.major, wad.minor),
            chunks: wad.chunks.iter().map(ChunkInfo::from).collect(),
        })
    }

    pub fn handle(&self) -> Result<()> {
        let mut head = Vec::with_capacity(20);
        File::open(&self.file)
            .into_diagnostic()
            .context(format!("opening {}", self.file.display()))?
            .take(20)
            .read_to_end(&mut head)
            .into_diagnostic()?;
        let output = self
            .output
            .clone()
            .unwrap_or_else(|| append_suffix(&self.file, ".json"));

        let context = format!("reading {}", self.file.display());
        match guess_extension(&head) {
            Some("bin") => {
                let tables = self.hashes.tables(&BIN_TABLES)?;
                let mut bin = Bin::read(&self.file).context(context)?;
                bin.un_hash(&tables);
                tables.free();
                write_json(&output, &bin)?;
            }
            Some("anm") => write_json(&output, &Anm::read(&self.file).context(context)?)?,
            Some("bnk" | "wpk") => {
                write_json(&output, &AudioBank::read(&self.file).context(context)?)?
            }
            Some("tex") => write_json(&output, &Tex::read(&self.file).context(context)?)?,
            Some("wad") => write_json(&output, &self.inspect_wad().context(context)?)?,
            _ => {
                return Err(miette!(
                    help = "supported files are bin, anm, bnk, wpk, tex and wad",
                    "{}: unknown file type",
                    self.file.display()
                ))
            }
        }
        info!("wrote {}", output.display());

        Ok(())
    }
}
