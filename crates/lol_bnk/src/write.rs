//! Types for writing BNK sound banks
//!
//! Wems are laid out again on every write, each starting on a 16 byte boundary of the `DATA`
//! payload. Offsets and sizes stored in `DIDX` are recomputed from the payloads given.

use std::{
    io::{Seek, Write},
    path::Path,
};

use lol_stream::BytesWriter;
use tracing::{debug, instrument};

use crate::{
    error::{Error, Result},
    types::{Bnk, BnkSection, Wem},
};

const WEM_ALIGNMENT: usize = 16;

fn padding(position: usize, alignment: usize) -> usize {
    (alignment - position % alignment) % alignment
}

fn payload_size(payload: &[u8]) -> Result<u32> {
    u32::try_from(payload.len())
        .map_err(|_| Error::CustomError(format!("wem of {} bytes is too large", payload.len())))
}

impl Bnk {
    /// Write the bank with the given wem payloads, in `DIDX` order
    #[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
    pub fn write<P: AsRef<[u8]>>(&self, path: impl AsRef<Path>, payloads: &[P]) -> Result<()> {
        let mut bs = BytesWriter::create(path)?;
        self.write_to(&mut bs, payloads)?;
        bs.finish()?;
        Ok(())
    }

    pub fn to_bytes<P: AsRef<[u8]>>(&self, payloads: &[P]) -> Result<Vec<u8>> {
        let mut bs = BytesWriter::in_memory();
        self.write_to(&mut bs, payloads)?;
        Ok(bs.into_bytes()?)
    }

    /// Index the payloads the way they will be laid out in `DATA`
    pub fn layout<P: AsRef<[u8]>>(&self, payloads: &[P]) -> Result<Vec<Wem>> {
        let wems = self.wems();
        if wems.len() != payloads.len() {
            return Err(Error::PayloadCount {
                expected: wems.len(),
                found: payloads.len(),
            });
        }

        let mut position = 0usize;
        wems.iter()
            .zip(payloads)
            .map(|(wem, payload)| {
                let payload = payload.as_ref();
                position += padding(position, WEM_ALIGNMENT);
                let offset = u32::try_from(position).map_err(|_| {
                    Error::CustomError(format!("wem {} starts past 4 GiB of data", wem.id))
                })?;
                position += payload.len();
                Ok(Wem {
                    id: wem.id,
                    offset,
                    size: payload_size(payload)?,
                })
            })
            .collect()
    }

    /// Write every section in order
    ///
    /// The number of payloads must match the number of indexed wems, a bank with wems also
    /// needs a `DATA` section.
    pub fn write_to<W: Write + Seek, P: AsRef<[u8]>>(
        &self,
        bs: &mut BytesWriter<W>,
        payloads: &[P],
    ) -> Result<()> {
        let layout = self.layout(payloads)?;
        if !layout.is_empty() && self.data_offset().is_none() {
            return Err(Error::MissingSection("DATA"));
        }

        for section in &self.sections {
            bs.write_bytes(section.tag().as_bytes())?;
            let size = bs.reserve_u32()?;
            match section {
                BnkSection::Header(header) => {
                    bs.write_u32(header.version)?;
                    bs.write_u32(header.id)?;
                    bs.write_bytes(&header.extra)?;
                }
                BnkSection::Index(_) => {
                    for wem in &layout {
                        bs.write_u32(wem.id)?;
                        bs.write_u32(wem.offset)?;
                        bs.write_u32(wem.size)?;
                    }
                }
                BnkSection::Data { .. } => {
                    let mut position = 0usize;
                    for (wem, payload) in layout.iter().zip(payloads) {
                        let gap = wem.offset as usize - position;
                        bs.pad(gap)?;
                        bs.write_bytes(payload.as_ref())?;
                        position += gap + payload.as_ref().len();
                    }
                }
                BnkSection::Hierarchy(objects) => {
                    bs.write_u32(objects.len() as u32)?;
                    for object in objects {
                        bs.write_u8(object.kind.into())?;
                        let object_size = u32::try_from(object.payload.len() + 4).map_err(|_| {
                            Error::CustomError(format!("object {} is too large", object.id))
                        })?;
                        bs.write_u32(object_size)?;
                        bs.write_u32(object.id)?;
                        bs.write_bytes(&object.payload)?;
                    }
                }
                BnkSection::Other { data, .. } => bs.write_bytes(data)?,
            }
            bs.close_size(size)?;
        }

        debug!(
            "wrote {} sections with {} wems",
            self.sections.len(),
            layout.len()
        );
        Ok(())
    }
}
