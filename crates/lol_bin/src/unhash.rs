//! Resolving the hashes of a document through a table context

use lol_hash::HashTables;
use tracing::instrument;

use crate::types::{Bin, BinField, BinValue, Embedded};

impl Bin {
    /// Attach names to every hash in the document that `tables` knows
    ///
    /// Numeric values are never modified and names that are already known are kept, so calling
    /// this more than once has no further effect.
    #[instrument(skip_all)]
    pub fn un_hash(&mut self, tables: &HashTables) {
        for entry in &mut self.entries {
            entry.hash.un_hash(tables);
            entry.class.un_hash(tables);
            un_hash_fields(&mut entry.fields, tables);
        }
        for patch in &mut self.patches {
            patch.hash.un_hash(tables);
            un_hash_value(&mut patch.value, tables);
        }
    }
}

fn un_hash_fields(fields: &mut [BinField], tables: &HashTables) {
    for field in fields {
        field.name.un_hash(tables);
        un_hash_value(&mut field.value, tables);
    }
}

fn un_hash_embedded(object: &mut Embedded, tables: &HashTables) {
    if object.is_null() {
        return;
    }
    object.class.un_hash(tables);
    un_hash_fields(&mut object.fields, tables);
}

fn un_hash_value(value: &mut BinValue, tables: &HashTables) {
    match value {
        BinValue::Hash(hash) | BinValue::Link(hash) => hash.un_hash(tables),
        BinValue::File(hash) => hash.un_hash(tables),
        BinValue::List { items, .. } | BinValue::List2 { items, .. } => {
            for item in items {
                un_hash_value(item, tables);
            }
        }
        BinValue::Pointer(object) | BinValue::Embed(object) => un_hash_embedded(object, tables),
        BinValue::Option { item, .. } => {
            if let Some(item) = item {
                un_hash_value(item, tables);
            }
        }
        BinValue::Map { entries, .. } => {
            for (key, value) in entries {
                un_hash_value(key, tables);
                un_hash_value(value, tables);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod test {
    use lol_hash::{fnv1a, xxh64, BinHash, HashTable, HashTables, PathHash};
    use pretty_assertions::assert_eq;

    use crate::types::{Bin, BinEntry, BinField, BinType, BinValue, Embedded};

    fn tables() -> HashTables {
        let mut bin = HashTable::for_file("hashes.binhashes.txt");
        for name in ["Annie", "SkinCharacterDataProperties", "mLink", "Tibbers", "mFiles", "mNested", "Nested"] {
            bin.insert(fnv1a(name) as u64, name);
        }
        let mut game = HashTable::for_file("hashes.game.txt");
        game.insert(xxh64("assets/annie.dds"), "assets/annie.dds");

        let mut tables = HashTables::new();
        tables.register(bin);
        tables.register(game);
        tables
    }

    #[test]
    fn un_hash_walks_every_identifier() {
        let mut bin = Bin {
            entries: vec![BinEntry {
                hash: BinHash::new(fnv1a("Annie")),
                class: BinHash::new(fnv1a("SkinCharacterDataProperties")),
                fields: vec![
                    BinField::new(
                        BinHash::new(fnv1a("mLink")),
                        BinValue::Link(BinHash::new(fnv1a("Tibbers"))),
                    ),
                    BinField::new(
                        BinHash::new(fnv1a("mFiles")),
                        BinValue::Map {
                            key_type: BinType::Hash,
                            value_type: BinType::File,
                            entries: vec![(
                                BinValue::Hash(BinHash::new(0x1234)),
                                BinValue::File(PathHash::new(xxh64("assets/annie.dds"))),
                            )],
                        },
                    ),
                    BinField::new(
                        BinHash::new(fnv1a("mNested")),
                        BinValue::Pointer(Embedded::new(BinHash::new(fnv1a("Nested")), Vec::new())),
                    ),
                ],
            }],
            ..Default::default()
        };

        let tables = tables();
        bin.un_hash(&tables);
        let once = bin.clone();
        bin.un_hash(&tables);
        assert_eq!(bin, once);

        let entry = &bin.entries[0];
        assert_eq!(entry.hash.to_string(), "Annie");
        assert_eq!(entry.class.to_string(), "SkinCharacterDataProperties");
        assert_eq!(
            entry.field(fnv1a("mLink")),
            Some(&BinValue::Link(BinHash {
                hash: fnv1a("Tibbers"),
                name: Some("Tibbers".into())
            }))
        );
        let Some(BinValue::Map { entries, .. }) = entry.field(fnv1a("mFiles")) else {
            panic!("mFiles should be a map");
        };
        assert_eq!(entries[0].0, BinValue::Hash(BinHash::new(0x1234)));
        assert_eq!(
            entries[0].1,
            BinValue::File(PathHash {
                hash: xxh64("assets/annie.dds"),
                name: Some("assets/annie.dds".into())
            })
        );
        assert_eq!(
            entry.field(fnv1a("mNested")).and_then(BinValue::as_embedded).map(|o| o.class.to_string()),
            Some("Nested".to_string())
        );
    }
}
