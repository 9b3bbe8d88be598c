//! Human editable text form of property documents
//!
//! ```text
//! #PROP_text
//! type: string = "PROP"
//! version: u32 = 3
//! linked: list[string] = {}
//! entries: map[hash,embed] = {
//!     "Characters/Annie" = CharacterRecord {
//!         mCharacterName: string = "Annie"
//!         baseHP: f32 = 524.4
//!     }
//! }
//! ```

mod read;
mod write;

use std::path::Path;

use tracing::instrument;

pub use write::{escape, format_f32, hash_token, type_annotation, TextOptions};

use crate::{error::Result, types::Bin};

impl Bin {
    /// Parse a text document from disk
    #[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
    pub fn read_text(path: impl AsRef<Path>) -> Result<Bin> {
        let text = std::fs::read_to_string(path)?;
        Bin::from_text(&text)
    }

    /// Print the document to disk in its canonical text form
    #[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
    pub fn write_text(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_text()?)?;
        Ok(())
    }
}
