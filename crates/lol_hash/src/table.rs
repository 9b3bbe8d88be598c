//! Hash table files and the lookup context built from them
//!
//! A table file holds one `<hex> <name>` pair per line. The hex column is exactly 8 digits wide for
//! the 32-bit family and 16 digits wide for the 64-bit family.

use std::{
    collections::HashMap,
    fs,
    io::{BufWriter, Write},
    path::Path,
};

use tracing::{debug, info, instrument};

use crate::{
    error::{Error, Result},
    hash::HashValue,
};

/// 32-bit table files, in registration order
pub const BIN_TABLES: [&str; 4] = [
    "hashes.binentries.txt",
    "hashes.binhashes.txt",
    "hashes.bintypes.txt",
    "hashes.binfields.txt",
];

/// 64-bit table files, in registration order
pub const WAD_TABLES: [&str; 2] = ["hashes.game.txt", "hashes.lcu.txt"];

/// Every known table file
pub const ALL_TABLES: [&str; 6] = [
    "hashes.binentries.txt",
    "hashes.binhashes.txt",
    "hashes.bintypes.txt",
    "hashes.binfields.txt",
    "hashes.game.txt",
    "hashes.lcu.txt",
];

/// Hex column width of a table file, from its name
pub fn table_width(file_name: &str) -> usize {
    if WAD_TABLES.contains(&file_name) {
        16
    } else {
        8
    }
}

/// A single hash table file held in memory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashTable {
    pub file_name: String,
    /// Number of hex digits in the key column
    pub width: usize,
    pub entries: HashMap<u64, String>,
}

impl HashTable {
    pub fn new(file_name: impl Into<String>, width: usize) -> Self {
        HashTable {
            file_name: file_name.into(),
            width,
            entries: HashMap::new(),
        }
    }

    /// An empty table whose width is derived from the file name
    pub fn for_file(file_name: &str) -> Self {
        HashTable::new(file_name, table_width(file_name))
    }

    /// Read a table file, the width is derived from the file name
    #[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let text = fs::read_to_string(path).map_err(|source| Error::TableRead {
            path: path.display().to_string(),
            source,
        })?;

        let mut table = HashTable::for_file(&file_name);
        table.parse_lines(&text);
        debug!("read {} hashes from {file_name}", table.len());
        Ok(table)
    }

    /// Add every `<hex> <name>` line of `text`, skipping lines that do not parse
    pub fn parse_lines(&mut self, text: &str) {
        for line in text.lines() {
            let line = line.trim_end_matches('\r');
            let split = if line.len() > self.width && line.as_bytes()[self.width] == b' ' {
                Some((&line[..self.width], &line[self.width + 1..]))
            } else {
                line.split_once(' ')
            };
            let Some((hex, name)) = split else {
                continue;
            };
            if let Ok(hash) = u64::from_str_radix(hex, 16) {
                self.entries.insert(hash, name.to_owned());
            }
        }
    }

    pub fn insert(&mut self, hash: u64, name: impl Into<String>) {
        self.entries.insert(hash, name.into());
    }

    pub fn get(&self, hash: u64) -> Option<&str> {
        self.entries.get(&hash).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add every entry of `other`, overriding existing ones
    pub fn extend(&mut self, other: &HashTable) {
        for (hash, name) in &other.entries {
            self.entries.insert(*hash, name.clone());
        }
    }

    /// Write the table sorted by name
    #[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut sorted: Vec<(&u64, &String)> = self.entries.iter().collect();
        sorted.sort_by(|a, b| a.1.cmp(b.1).then(a.0.cmp(b.0)));

        let mut out = BufWriter::new(fs::File::create(path)?);
        for (hash, name) in sorted {
            writeln!(out, "{hash:0width$x} {name}", width = self.width)?;
        }
        out.flush()?;
        Ok(())
    }
}

/// Lookup context built from any number of tables
///
/// Tables are consulted in reverse registration order so a later table overrides an earlier one.
/// The context is passed by reference into every un-hash operation and released with
/// [`HashTables::free`] or by dropping it.
///
/// ```
/// use lol_hash::{fnv1a, HashTable, HashTables};
///
/// let mut table = HashTable::for_file("hashes.binfields.txt");
/// table.insert(fnv1a("mSpellName") as u64, "mSpellName");
///
/// let mut tables = HashTables::new();
/// tables.register(table);
/// assert_eq!(tables.resolve_bin(fnv1a("mSpellName")), Some("mSpellName"));
/// assert_eq!(tables.hex_to_raw::<u32>("deadbeef"), "deadbeef");
/// ```
#[derive(Debug, Clone, Default)]
pub struct HashTables {
    tables: Vec<HashTable>,
}

impl HashTables {
    pub fn new() -> Self {
        HashTables::default()
    }

    /// Load the named table files from `dir`, missing files are skipped
    #[instrument(skip_all, fields(dir = %dir.as_ref().display()), err)]
    pub fn load(dir: impl AsRef<Path>, files: &[&str]) -> Result<Self> {
        let dir = dir.as_ref();
        let mut tables = HashTables::new();
        for file in files {
            let path = dir.join(file);
            if !path.is_file() {
                debug!("no hash table at {}", path.display());
                continue;
            }
            tables.register(HashTable::read(&path)?);
        }
        info!(
            "loaded {} hashes from {} tables",
            tables.len(),
            tables.tables.len()
        );
        Ok(tables)
    }

    /// Add a table with the highest priority so far
    pub fn register(&mut self, table: HashTable) {
        self.tables.push(table);
    }

    /// Total number of hashes across every table
    pub fn len(&self) -> usize {
        self.tables.iter().map(HashTable::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.iter().all(HashTable::is_empty)
    }

    pub fn tables(&self) -> &[HashTable] {
        &self.tables
    }

    /// Find the name of `hash` in the tables of its family
    pub fn resolve<T: HashValue>(&self, hash: T) -> Option<&str> {
        let key: u64 = hash.into();
        self.tables
            .iter()
            .rev()
            .filter(|table| table.width == T::HEX_DIGITS)
            .find_map(|table| table.get(key))
    }

    /// Name of a 32-bit hash
    pub fn resolve_bin(&self, hash: u32) -> Option<&str> {
        self.resolve(hash)
    }

    /// Name of a 64-bit path hash
    pub fn resolve_path(&self, hash: u64) -> Option<&str> {
        self.resolve(hash)
    }

    /// Name for a hex string, or the hex string unchanged when unknown
    pub fn hex_to_raw<T: HashValue>(&self, hex: &str) -> String {
        T::from_hex(hex)
            .and_then(|hash| self.resolve(hash))
            .map(str::to_owned)
            .unwrap_or_else(|| hex.to_owned())
    }

    /// Release every table
    pub fn free(self) {
        debug!("releasing {} hash tables", self.tables.len());
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use super::*;
    use crate::hash::{fnv1a, xxh64};

    #[test]
    fn parse_fixed_width_lines() {
        let mut table = HashTable::for_file("hashes.binfields.txt");
        table.parse_lines("0000002a name with spaces\r\nffffffff other\nbogus\nzzzzzzzz nope\n");

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0x2a), Some("name with spaces"));
        assert_eq!(table.get(0xffffffff), Some("other"));
    }

    #[test]
    fn widths_from_file_names() {
        assert_eq!(table_width("hashes.game.txt"), 16);
        assert_eq!(table_width("hashes.lcu.txt"), 16);
        assert_eq!(table_width("hashes.bintypes.txt"), 8);
    }

    #[test]
    fn later_tables_win_and_families_stay_apart() {
        let mut first = HashTable::for_file("hashes.binentries.txt");
        first.insert(1, "first");
        let mut second = HashTable::for_file("hashes.binhashes.txt");
        second.insert(1, "second");
        let mut paths = HashTable::for_file("hashes.game.txt");
        paths.insert(1, "path");

        let mut tables = HashTables::new();
        tables.register(first);
        tables.register(second);
        tables.register(paths);

        assert_eq!(tables.resolve_bin(1), Some("second"));
        assert_eq!(tables.resolve_path(1), Some("path"));
        assert_eq!(tables.resolve_bin(2), None);
    }

    #[test]
    fn hex_to_raw_falls_back_to_hex() {
        let mut table = HashTable::for_file("hashes.game.txt");
        table.insert(xxh64("data/a.bin"), "data/a.bin");
        let mut tables = HashTables::new();
        tables.register(table);

        let known = xxh64("data/a.bin").to_hex();
        assert_eq!(tables.hex_to_raw::<u64>(&known), "data/a.bin");
        assert_eq!(
            tables.hex_to_raw::<u64>("0000000000000001"),
            "0000000000000001"
        );
        assert_eq!(tables.hex_to_raw::<u32>("not hex"), "not hex");
    }

    #[traced_test]
    #[test]
    fn write_then_load() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut table = HashTable::for_file("hashes.binfields.txt");
        table.insert(fnv1a("zeta") as u64, "zeta");
        table.insert(fnv1a("alpha") as u64, "alpha");
        table.write(dir.path().join("hashes.binfields.txt"))?;

        let text = fs::read_to_string(dir.path().join("hashes.binfields.txt"))?;
        assert_eq!(
            text,
            format!("{:08x} alpha\n{:08x} zeta\n", fnv1a("alpha"), fnv1a("zeta"))
        );

        let tables = HashTables::load(dir.path(), &ALL_TABLES)?;
        assert_eq!(tables.tables().len(), 1);
        assert_eq!(tables.resolve_bin(fnv1a("alpha")), Some("alpha"));
        tables.free();

        Ok(())
    }
}
