//! Opening an audio bank with its events and names, and extracting its wems

use std::{
    fs,
    io::{Read, Seek},
    path::{Path, PathBuf},
};

use lol_bin::Bin;
use lol_stream::BytesReader;
use tracing::{info, instrument};

use crate::{
    error::{Error, Result},
    graph::BankGraph,
    names::event_names,
    read::signature,
    tree::BankTree,
    types::{Bnk, Wem, Wpk},
};

/// The file holding the wems themselves
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AudioBank {
    Bnk(Bnk),
    Wpk(Wpk),
}

impl AudioBank {
    /// Read a BNK or WPK, told apart by their signature
    #[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
    pub fn read(path: impl AsRef<Path>) -> Result<AudioBank> {
        let mut bs = BytesReader::open(path)?;
        AudioBank::read_from(&mut bs)
    }

    pub fn from_bytes(data: &[u8]) -> Result<AudioBank> {
        AudioBank::read_from(&mut BytesReader::from_bytes(data))
    }

    pub fn read_from<R: Read + Seek>(bs: &mut BytesReader<R>) -> Result<AudioBank> {
        match &signature(bs)? {
            b"BKHD" => Ok(AudioBank::Bnk(Bnk::read_from(bs)?)),
            b"r3d2" => Ok(AudioBank::Wpk(Wpk::read_from(bs)?)),
            magic => Err(Error::InvalidSignature(*magic)),
        }
    }

    pub fn wems(&self) -> &[Wem] {
        match self {
            AudioBank::Bnk(bnk) => bnk.wems(),
            AudioBank::Wpk(wpk) => &wpk.wems,
        }
    }

    /// Absolute offset of a wem's data
    pub fn wem_offset(&self, wem: &Wem) -> Result<u64> {
        match self {
            AudioBank::Bnk(bnk) => {
                let data = bnk.data_offset().ok_or(Error::MissingSection("DATA"))?;
                Ok(data + u64::from(wem.offset))
            }
            AudioBank::Wpk(_) => Ok(u64::from(wem.offset)),
        }
    }

    /// Read a wem's data from the stream the bank was read from
    pub fn read_wem<R: Read + Seek>(&self, bs: &mut BytesReader<R>, wem: &Wem) -> Result<Vec<u8>> {
        bs.seek(self.wem_offset(wem)?)?;
        Ok(bs.read_bytes(wem.size as usize)?)
    }
}

/// An audio bank and the tree of its events
#[derive(Debug, Clone)]
pub struct Bank {
    pub path: PathBuf,
    pub audio: AudioBank,
    pub tree: BankTree,
}

impl Bank {
    /// Open an audio bank, optionally with the events bank describing it and a property
    /// document naming those events
    ///
    /// Without events every wem is listed at the top of the tree.
    #[instrument(skip_all, fields(path = %audio_path.as_ref().display()), err)]
    pub fn open(
        audio_path: impl AsRef<Path>,
        events_path: Option<&Path>,
        bin_path: Option<&Path>,
    ) -> Result<Bank> {
        let path = audio_path.as_ref().to_path_buf();
        let audio = AudioBank::read(&path)?;
        if let AudioBank::Bnk(bnk) = &audio {
            if !bnk.sections.iter().any(|section| section.tag() == "DIDX") {
                return Err(Error::MissingSection("DIDX"));
            }
            bnk.data_offset().ok_or(Error::MissingSection("DATA"))?;
        }
        let wems: Vec<u32> = audio.wems().iter().map(|wem| wem.id).collect();

        let mut tree = match events_path {
            Some(events_path) => {
                let graph = BankGraph::from_bnk(&Bnk::read(events_path)?)?;
                BankTree::build(&graph, &wems)
            }
            None => BankTree::orphans(wems),
        };
        if let Some(bin_path) = bin_path {
            tree.resolve_names(&event_names(&Bin::read(bin_path)?));
        }
        tree.sort();

        Ok(Bank { path, audio, tree })
    }

    /// Write every wem to each place the tree lists it under `out_dir`
    ///
    /// Returns the number of files written.
    #[instrument(skip(self), fields(path = %self.path.display()), err)]
    pub fn extract(&self, out_dir: &Path) -> Result<usize> {
        let paths = self.tree.wem_paths();
        let mut bs = BytesReader::open(&self.path)?;
        fs::create_dir_all(out_dir)?;

        let mut written = 0;
        for wem in self.audio.wems() {
            let Some(wem_paths) = paths.get(&wem.id) else {
                continue;
            };
            let data = self.audio.read_wem(&mut bs, wem)?;
            for wem_path in wem_paths {
                let file_path = out_dir.join(wem_path);
                if let Some(parent) = file_path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&file_path, &data)?;
                written += 1;
            }
            info!("extracted [{}] {}.wem", human_size(wem.size), wem.id);
        }

        Ok(written)
    }

    /// Write every wem as `<id>.wem` directly under `out_dir`
    #[instrument(skip(self), fields(path = %self.path.display()), err)]
    pub fn unpack(&self, out_dir: &Path) -> Result<usize> {
        let mut bs = BytesReader::open(&self.path)?;
        fs::create_dir_all(out_dir)?;
        for wem in self.audio.wems() {
            let data = self.audio.read_wem(&mut bs, wem)?;
            fs::write(out_dir.join(format!("{}.wem", wem.id)), data)?;
        }
        Ok(self.audio.wems().len())
    }
}

/// Size with a binary unit, rounded down
pub fn human_size(size: u32) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let step = (size.max(1).ilog2() / 10).min(3);
    format!("{} {}", size >> (step * 10), UNITS[step as usize])
}
