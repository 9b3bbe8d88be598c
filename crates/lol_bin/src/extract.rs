//! Collecting hash table entries from the strings of a document

use lol_hash::{fnv1a, xxh64, HashTable};
use tracing::debug;

use crate::types::{Bin, BinValue};

const GAME_PATH_PREFIXES: [&str; 7] = [
    "assets/",
    "clientstates/",
    "data/",
    "levels/",
    "maps/",
    "uiautoatlas/",
    "ux/",
];

/// Tables filled by [`Bin::extract_hashes`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedHashes {
    /// Game file paths, `hashes.game.txt`
    pub game: HashTable,
    /// Entry keys named after their content, `hashes.binentries.txt`
    pub entries: HashTable,
}

impl Default for ExtractedHashes {
    fn default() -> Self {
        ExtractedHashes {
            game: HashTable::for_file("hashes.game.txt"),
            entries: HashTable::for_file("hashes.binentries.txt"),
        }
    }
}

impl ExtractedHashes {
    /// Add a string if it looks like a game path, along with its derived variants
    pub fn add_path(&mut self, value: &str) {
        let value = value.to_lowercase();
        if !GAME_PATH_PREFIXES
            .iter()
            .any(|prefix| value.starts_with(prefix))
        {
            return;
        }

        if value.ends_with(".dds") {
            let (dir, base) = match value.rsplit_once('/') {
                Some((dir, base)) => (format!("{dir}/"), base),
                None => (String::new(), value.as_str()),
            };
            for scale in ["2x_", "4x_"] {
                let variant = format!("{dir}{scale}{base}");
                self.game.insert(xxh64(&variant), variant);
            }
        } else if let Some(stem) = value.strip_suffix(".bin") {
            let variant = format!("{stem}.py");
            self.game.insert(xxh64(&variant), variant);
        }
        self.game.insert(xxh64(&value), value);
    }

    /// Add everything found in another extraction
    pub fn extend(&mut self, other: &ExtractedHashes) {
        self.game.extend(&other.game);
        self.entries.extend(&other.entries);
    }

    fn add_value(&mut self, value: &BinValue) {
        match value {
            BinValue::String(value) => self.add_path(value),
            BinValue::List { items, .. } | BinValue::List2 { items, .. } => {
                for item in items {
                    self.add_value(item);
                }
            }
            BinValue::Pointer(object) | BinValue::Embed(object) => {
                for field in &object.fields {
                    self.add_value(&field.value);
                }
            }
            BinValue::Option { item: Some(item), .. } => self.add_value(item),
            BinValue::Map { entries, .. } => {
                for (key, value) in entries {
                    self.add_value(key);
                    self.add_value(value);
                }
            }
            _ => {}
        }
    }
}

impl Bin {
    /// Collect path names and named entry keys from this document
    ///
    /// Every string starting with a game directory becomes a path hash. Entries of
    /// `VfxSystemDefinitionData` and `StaticMaterialDef` are keyed by the hash of their
    /// `particlePath` and `name` fields, which recovers their names.
    pub fn extract_hashes(&self) -> ExtractedHashes {
        let mut extracted = ExtractedHashes::default();

        for (class, field) in [
            ("VfxSystemDefinitionData", "particlePath"),
            ("StaticMaterialDef", "name"),
        ] {
            for entry in self.entries_of_class(fnv1a(class)) {
                if let Some(name) = entry.field(fnv1a(field)).and_then(BinValue::as_str) {
                    extracted.entries.insert(entry.hash.hash as u64, name);
                }
            }
        }

        for entry in &self.entries {
            for field in &entry.fields {
                extracted.add_value(&field.value);
            }
        }
        for link in &self.links {
            extracted.add_path(link);
        }

        debug!(
            "extracted {} paths and {} entry names",
            extracted.game.len(),
            extracted.entries.len()
        );
        extracted
    }
}

#[cfg(test)]
mod test {
    use lol_hash::{fnv1a, xxh64, BinHash};
    use pretty_assertions::assert_eq;

    use crate::types::{Bin, BinEntry, BinField, BinType, BinValue};

    #[test]
    fn extract_paths_and_entry_names() {
        let bin = Bin {
            links: vec!["DATA/Shared.bin".into()],
            entries: vec![
                BinEntry {
                    hash: BinHash::new(0xAA),
                    class: BinHash::new(fnv1a("VfxSystemDefinitionData")),
                    fields: vec![
                        BinField::new(
                            BinHash::from_raw("particlePath"),
                            BinValue::String("Characters/Annie/Skins/Base/Particles/Annie_Q".into()),
                        ),
                        BinField::new(
                            BinHash::from_raw("textures"),
                            BinValue::List {
                                value_type: BinType::String,
                                items: vec![
                                    BinValue::String("ASSETS/Characters/Annie/q.dds".into()),
                                    BinValue::String("not/a/game/path.dds".into()),
                                ],
                            },
                        ),
                    ],
                },
            ],
            ..Default::default()
        };

        let extracted = bin.extract_hashes();
        assert_eq!(
            extracted.entries.get(0xAA),
            Some("Characters/Annie/Skins/Base/Particles/Annie_Q")
        );

        let mut paths: Vec<&str> = extracted.game.entries.values().map(String::as_str).collect();
        paths.sort();
        assert_eq!(
            paths,
            vec![
                "assets/characters/annie/2x_q.dds",
                "assets/characters/annie/4x_q.dds",
                "assets/characters/annie/q.dds",
                "data/shared.bin",
                "data/shared.py",
            ]
        );
        assert_eq!(
            extracted.game.get(xxh64("data/shared.py")),
            Some("data/shared.py")
        );
    }
}
