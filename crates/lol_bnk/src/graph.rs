//! Hierarchy objects of an events bank, keyed by id and kind

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    types::{Action, BankObject, Bnk, HircObject},
};

/// The objects a [`crate::BankTree`] is built from
///
/// Other object kinds are dropped. Events keep their file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BankGraph {
    /// Sound id to wem id
    pub sounds: HashMap<u32, u32>,
    /// Event id to action ids
    pub events: IndexMap<u32, Vec<u32>>,
    pub actions: HashMap<u32, Action>,
    /// Container id to child ids
    pub random_containers: HashMap<u32, Vec<u32>>,
    pub switch_containers: HashMap<u32, Vec<u32>>,
    /// Segment id to music track ids
    pub music_segments: HashMap<u32, Vec<u32>>,
    /// Music track id to wem ids
    pub music_tracks: HashMap<u32, Vec<u32>>,
    pub music_switches: HashMap<u32, Vec<u32>>,
    /// Playlist id to segment ids
    pub music_playlists: HashMap<u32, Vec<u32>>,
}

impl BankGraph {
    /// Build the graph of the `HIRC` section of a bank
    pub fn from_bnk(bnk: &Bnk) -> Result<BankGraph> {
        let objects = bnk.objects().ok_or(Error::MissingSection("HIRC"))?;
        Ok(BankGraph::from_objects(objects))
    }

    /// Objects that fail to decode are skipped with a warning
    pub fn from_objects(objects: &[HircObject]) -> BankGraph {
        let mut graph = BankGraph::default();
        for object in objects {
            match object.decode() {
                Ok(decoded) => graph.insert(object.id, decoded),
                Err(error) => warn!("skipping hierarchy object {}: {error}", object.id),
            }
        }
        debug!(
            "{} events, {} actions, {} sounds",
            graph.events.len(),
            graph.actions.len(),
            graph.sounds.len()
        );
        graph
    }

    pub fn insert(&mut self, id: u32, object: BankObject) {
        match object {
            BankObject::Sound { wem_id } => {
                self.sounds.insert(id, wem_id);
            }
            BankObject::Event { action_ids } => {
                self.events.insert(id, action_ids);
            }
            BankObject::Action(action) => {
                self.actions.insert(id, action);
            }
            BankObject::RandomOrSequenceContainer { child_ids } => {
                self.random_containers.insert(id, child_ids);
            }
            BankObject::SwitchContainer { child_ids } => {
                self.switch_containers.insert(id, child_ids);
            }
            BankObject::MusicSegment { track_ids } => {
                self.music_segments.insert(id, track_ids);
            }
            BankObject::MusicTrack { wem_ids } => {
                self.music_tracks.insert(id, wem_ids);
            }
            BankObject::MusicSwitchContainer { child_ids } => {
                self.music_switches.insert(id, child_ids);
            }
            BankObject::MusicPlaylistContainer { track_ids } => {
                self.music_playlists.insert(id, track_ids);
            }
            BankObject::Other => {}
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use super::BankGraph;
    use crate::{
        error::Result,
        tree::BankTree,
        types::{BankObject, HircObject, ObjectType},
    };

    #[test]
    #[traced_test]
    fn truncated_object_is_skipped() -> Result<()> {
        let objects = [
            HircObject::from_object(1, &BankObject::Sound { wem_id: 7 })?,
            // counts 0x0000FFFF children with a single byte left
            HircObject::new(
                ObjectType::RandomOrSequenceContainer,
                2,
                vec![0xFF, 0xFF, 0x00, 0x00, 0x01],
            ),
        ];
        let graph = BankGraph::from_objects(&objects);

        assert_eq!(graph.sounds.get(&1), Some(&7));
        assert!(graph.random_containers.is_empty());
        assert!(logs_contain("skipping hierarchy object 2"));
        assert_eq!(BankTree::build(&graph, &[7]).wems, vec![7]);

        Ok(())
    }
}
