//! Event names from the audio properties of a property document
//!
//! Skin, feature and map documents list the events of their banks as strings. Events are keyed
//! in banks by the FNV-1 hash of those strings.

use std::collections::BTreeMap;

use lol_bin::{Bin, BinValue, Embedded};
use lol_hash::{fnv1, fnv1a};

fn field<'a>(fields: &'a Embedded, name: &str) -> Option<&'a BinValue> {
    fields.field(fnv1a(name))
}

fn bank_unit_events<'a>(
    bank_units: Option<&'a BinValue>,
) -> impl Iterator<Item = &'a str> + 'a {
    bank_units
        .and_then(BinValue::items)
        .unwrap_or_default()
        .iter()
        .filter_map(BinValue::as_embedded)
        .filter_map(|unit| field(unit, "events").and_then(BinValue::items))
        .flatten()
        .filter_map(BinValue::as_str)
}

/// Every event name found in the document, keyed by its bank id
///
/// Looks at `SkinCharacterDataProperties.skinAudioProperties.bankUnits`,
/// `FeatureAudioDataProperties.bankUnits` and `MapAudioDataProperties.bankUnits`.
pub fn event_names(bin: &Bin) -> BTreeMap<u32, String> {
    let mut names = BTreeMap::new();
    let mut add = |event: &str| {
        names.insert(fnv1(event), event.to_owned());
    };

    for entry in bin.entries_of_class(fnv1a("SkinCharacterDataProperties")) {
        let audio = entry
            .field(fnv1a("skinAudioProperties"))
            .and_then(BinValue::as_embedded);
        if let Some(audio) = audio {
            bank_unit_events(field(audio, "bankUnits")).for_each(&mut add);
        }
    }
    for class in ["FeatureAudioDataProperties", "MapAudioDataProperties"] {
        for entry in bin.entries_of_class(fnv1a(class)) {
            bank_unit_events(entry.field(fnv1a("bankUnits"))).for_each(&mut add);
        }
    }

    names
}
