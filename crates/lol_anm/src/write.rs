//! Types for writing animations
//!
//! Every animation is written as an uncompressed version 5 file, whatever it was read from.

use std::{
    io::{Seek, Write},
    path::Path,
};

use lol_stream::BytesWriter;
use tracing::{debug, instrument};

use crate::{
    bank::PoseBanks,
    compress::compress_quat,
    error::{Error, Result},
    types::{Anm, DensePose, UNCOMPRESSED_SIGNATURE, WRITE_VERSION},
};

const FILE_SIZE_FIELD: u64 = 12;
const JOINT_HASHES_FIELD: u64 = 40;
/// Vectors, quaternions and frames offsets follow each other
const BANK_OFFSETS_FIELD: u64 = 52;
const OFFSET_BASE: u64 = 12;

fn offset_u32(offset: u64) -> Result<u32> {
    u32::try_from(offset).map_err(|_| Error::FileTooLarge(offset))
}

impl Anm {
    /// Write the animation to a file
    #[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut bs = BytesWriter::create(path)?;
        self.write_to(&mut bs)?;
        bs.finish()?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bs = BytesWriter::in_memory();
        self.write_to(&mut bs)?;
        Ok(bs.into_bytes()?)
    }

    /// Interpolate, bank and write every integer frame as version 5
    ///
    /// Header flags are written as zero. Fails with [`Error::BankOverflow`] when the distinct
    /// poses do not fit 16 bit bank indices.
    pub fn write_to<W: Write + Seek>(&self, bs: &mut BytesWriter<W>) -> Result<()> {
        let frame_count = self.frame_count();
        let dense: Vec<Vec<DensePose>> = self
            .tracks
            .iter()
            .map(|track| track.dense_poses(frame_count))
            .collect();
        let banks = PoseBanks::build(&dense, frame_count)?;

        let start = bs.tell()?;
        bs.write_bytes(UNCOMPRESSED_SIGNATURE)?;
        bs.write_u32(WRITE_VERSION)?;
        // file size, format token, flags
        for _ in 0..4 {
            bs.write_u32(0)?;
        }
        bs.write_u32(offset_u32(self.tracks.len() as u64)?)?;
        bs.write_u32(offset_u32(frame_count as u64)?)?;
        bs.write_f32(1.0 / self.fps)?;
        // six section offsets and reserved space
        bs.pad(6 * 4 + 12)?;

        let vectors = bs.tell()?;
        for vector in &banks.vectors {
            bs.write_vec3(&vector.to_array())?;
        }
        let quaternions = bs.tell()?;
        for quat in &banks.quaternions {
            bs.write_bytes(&compress_quat(*quat))?;
        }
        let joint_hashes = bs.tell()?;
        for track in &self.tracks {
            bs.write_u32(track.joint_hash)?;
        }
        let frames = bs.tell()?;
        for indices in &banks.frames {
            for index in indices {
                bs.write_u16(*index)?;
            }
        }

        let end = bs.end()?;
        let relative = |offset: u64| offset_u32(offset - start - OFFSET_BASE);
        bs.seek(start + FILE_SIZE_FIELD)?;
        bs.write_u32(offset_u32(end - start)?)?;
        bs.seek(start + JOINT_HASHES_FIELD)?;
        bs.write_u32(relative(joint_hashes)?)?;
        bs.seek(start + BANK_OFFSETS_FIELD)?;
        bs.write_u32(relative(vectors)?)?;
        bs.write_u32(relative(quaternions)?)?;
        bs.write_u32(relative(frames)?)?;
        bs.end()?;

        debug!(
            "wrote {} tracks of {frame_count} frames in {} bytes",
            self.tracks.len(),
            end - start
        );
        Ok(())
    }
}
