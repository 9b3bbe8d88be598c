//! The event, container and wem hierarchy of a bank
//!
//! Every play action of an event is followed to the wems it can start:
//!
//! | Target                       | Wems listed under                               |
//! |------------------------------|-------------------------------------------------|
//! | random or sequence container | the container directly holding the sound        |
//! | sound                        | the event, unless a container of it has the wem |
//! | switch container             | its children, as random or sequence containers  |
//! | music playlist               | each segment it plays                           |
//! | music switch container       | each playlist reached through nested switches   |
//!
//! Wems no event reaches are listed at the top of the tree.

use std::{
    collections::{BTreeMap, HashSet},
    path::{Component, Path, PathBuf},
};

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};

use crate::{graph::BankGraph, sort::natural_cmp};

/// A container and the wems it plays
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BankContainer {
    pub id: u32,
    pub wems: Vec<u32>,
}

/// An event with the wems its play actions reach
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BankEvent {
    pub id: u32,
    /// Known once resolved through a property document
    pub name: Option<String>,
    pub containers: Vec<BankContainer>,
    /// Wems played without a container
    pub wems: Vec<u32>,
}

impl BankEvent {
    /// The name when known, the id otherwise
    pub fn label(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.id.to_string())
    }

    /// Directory the event extracts to, its id when the name is not a plain file name
    pub fn dir_name(&self) -> String {
        let label = self.label();
        let mut components = Path::new(&label).components();
        let plain = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if plain {
            label
        } else {
            self.id.to_string()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BankTree {
    pub events: Vec<BankEvent>,
    /// Wems no event reaches
    pub wems: Vec<u32>,
}

struct EventWalk<'a> {
    graph: &'a BankGraph,
    existing: &'a HashSet<u32>,
    found: &'a mut HashSet<u32>,
    visited: HashSet<u32>,
    containers: IndexMap<u32, IndexSet<u32>>,
    wems: IndexSet<u32>,
}

impl EventWalk<'_> {
    fn contained(&mut self, container: u32, wem: u32) {
        if !self.existing.contains(&wem) {
            return;
        }
        self.found.insert(wem);
        self.containers.entry(container).or_default().insert(wem);
        self.wems.shift_remove(&wem);
    }

    fn direct(&mut self, wem: u32) {
        if !self.existing.contains(&wem) {
            return;
        }
        self.found.insert(wem);
        if !self.containers.values().any(|wems| wems.contains(&wem)) {
            self.wems.insert(wem);
        }
    }

    fn random_container(&mut self, id: u32) {
        if !self.visited.insert(id) {
            return;
        }
        let graph = self.graph;
        let Some(children) = graph.random_containers.get(&id) else {
            return;
        };
        for &child in children {
            if graph.random_containers.contains_key(&child) {
                self.random_container(child);
            } else if let Some(switch_children) = graph.switch_containers.get(&child) {
                for &switch_child in switch_children {
                    self.random_container(switch_child);
                }
            } else if let Some(&wem) = graph.sounds.get(&child) {
                self.contained(id, wem);
            }
        }
    }

    /// Segments of a playlist, listed under `container` or under each segment
    fn playlist(&mut self, id: u32, container: Option<u32>) {
        let graph = self.graph;
        for &segment in graph.music_playlists.get(&id).into_iter().flatten() {
            let Some(tracks) = graph.music_segments.get(&segment) else {
                continue;
            };
            for track in tracks {
                for &wem in graph.music_tracks.get(track).into_iter().flatten() {
                    self.contained(container.unwrap_or(segment), wem);
                }
            }
        }
    }

    fn music_switch(&mut self, id: u32) {
        if !self.visited.insert(id) {
            return;
        }
        let graph = self.graph;
        for &child in graph.music_switches.get(&id).into_iter().flatten() {
            if graph.music_switches.contains_key(&child) {
                self.music_switch(child);
            } else if graph.music_playlists.contains_key(&child) {
                self.playlist(child, Some(child));
            }
        }
    }

    fn target(&mut self, target: u32) {
        let graph = self.graph;
        if graph.random_containers.contains_key(&target) {
            self.random_container(target);
        } else if let Some(&wem) = graph.sounds.get(&target) {
            self.direct(wem);
        } else if let Some(children) = graph.switch_containers.get(&target) {
            for &child in children {
                self.random_container(child);
            }
        } else if graph.music_playlists.contains_key(&target) {
            self.playlist(target, None);
        } else if graph.music_switches.contains_key(&target) {
            self.music_switch(target);
        } else {
            trace!("play target {target} is not a known object");
        }
    }
}

impl BankTree {
    /// A tree of wems without events
    pub fn orphans(wems: impl IntoIterator<Item = u32>) -> BankTree {
        let wems: IndexSet<u32> = wems.into_iter().collect();
        BankTree {
            events: Vec::new(),
            wems: wems.into_iter().collect(),
        }
    }

    /// Follow every play action of every event down to the given wems
    ///
    /// Wems missing from `wems` are ignored, events reaching none of them are dropped and the
    /// remaining wems are listed at the top.
    pub fn build(graph: &BankGraph, wems: &[u32]) -> BankTree {
        let existing: HashSet<u32> = wems.iter().copied().collect();
        let mut found = HashSet::new();
        let mut events = Vec::new();

        for (&event_id, action_ids) in &graph.events {
            let mut walk = EventWalk {
                graph,
                existing: &existing,
                found: &mut found,
                visited: HashSet::new(),
                containers: IndexMap::new(),
                wems: IndexSet::new(),
            };
            for action in action_ids.iter().filter_map(|id| graph.actions.get(id)) {
                if action.is_play() {
                    walk.target(action.object_id);
                }
            }

            let EventWalk {
                containers,
                wems: direct,
                ..
            } = walk;
            if containers.is_empty() && direct.is_empty() {
                continue;
            }
            events.push(BankEvent {
                id: event_id,
                name: None,
                containers: containers
                    .into_iter()
                    .map(|(id, wems)| BankContainer {
                        id,
                        wems: wems.into_iter().collect(),
                    })
                    .collect(),
                wems: direct.into_iter().collect(),
            });
        }

        let mut orphans = BankTree::orphans(wems.iter().copied().filter(|id| !found.contains(id)));
        debug!(
            "{} events reach {} wems, {} left over",
            events.len(),
            found.len(),
            orphans.wems.len()
        );
        orphans.events = events;
        orphans
    }

    /// Name events found in `names`
    pub fn resolve_names(&mut self, names: &BTreeMap<u32, String>) {
        for event in self.events.iter_mut() {
            if let Some(name) = names.get(&event.id) {
                event.name = Some(name.clone());
            }
        }
    }

    /// Natural order at every level
    pub fn sort(&mut self) {
        let by_label = |a: &u32, b: &u32| natural_cmp(&a.to_string(), &b.to_string());
        for event in self.events.iter_mut() {
            for container in event.containers.iter_mut() {
                container.wems.sort_by(by_label);
            }
            event
                .containers
                .sort_by(|a, b| by_label(&a.id, &b.id));
            event.wems.sort_by(by_label);
        }
        self.events
            .sort_by(|a, b| natural_cmp(&a.label(), &b.label()));
        self.wems.sort_by(by_label);
    }

    /// Every place a wem is listed, relative to the extraction directory
    ///
    /// `event/container/<wem>.wem`, `event/<wem>.wem` or `<wem>.wem`.
    pub fn wem_paths(&self) -> BTreeMap<u32, Vec<PathBuf>> {
        let mut paths: BTreeMap<u32, Vec<PathBuf>> = BTreeMap::new();
        let file = |wem: u32| format!("{wem}.wem");

        for event in &self.events {
            let event_dir = PathBuf::from(event.dir_name());
            for container in &event.containers {
                let container_dir = event_dir.join(container.id.to_string());
                for &wem in &container.wems {
                    paths
                        .entry(wem)
                        .or_default()
                        .push(container_dir.join(file(wem)));
                }
            }
            for &wem in &event.wems {
                paths
                    .entry(wem)
                    .or_default()
                    .push(event_dir.join(file(wem)));
            }
        }
        for &wem in &self.wems {
            paths.entry(wem).or_default().push(PathBuf::from(file(wem)));
        }

        paths
    }

    /// Every wem listed anywhere in the tree, once
    pub fn listed_wems(&self) -> IndexSet<u32> {
        self.events
            .iter()
            .flat_map(|event| {
                event
                    .containers
                    .iter()
                    .flat_map(|container| container.wems.iter())
                    .chain(event.wems.iter())
            })
            .chain(self.wems.iter())
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod test {
    use std::{collections::BTreeMap, path::PathBuf};

    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use super::{BankContainer, BankEvent, BankTree};
    use crate::{
        graph::BankGraph,
        types::{Action, BankObject, ACTION_PLAY},
    };

    fn play(target: u32) -> BankObject {
        BankObject::Action(Action {
            scope: 0,
            kind: ACTION_PLAY,
            object_id: target,
        })
    }

    fn graph(objects: Vec<(u32, BankObject)>) -> BankGraph {
        let mut graph = BankGraph::default();
        for (id, object) in objects {
            graph.insert(id, object);
        }
        graph
    }

    #[traced_test]
    #[test]
    fn containers_take_precedence() {
        let graph = graph(vec![
            (1, BankObject::Event { action_ids: vec![10, 11, 12] }),
            (10, play(20)),
            (11, play(30)),
            // not a play action
            (
                12,
                BankObject::Action(Action {
                    scope: 0,
                    kind: 1,
                    object_id: 21,
                }),
            ),
            (20, BankObject::Sound { wem_id: 100 }),
            (21, BankObject::Sound { wem_id: 101 }),
            (22, BankObject::Sound { wem_id: 102 }),
            (30, BankObject::RandomOrSequenceContainer { child_ids: vec![20, 22] }),
        ]);
        let tree = BankTree::build(&graph, &[100, 101, 102]);

        assert_eq!(
            tree,
            BankTree {
                events: vec![BankEvent {
                    id: 1,
                    name: None,
                    containers: vec![BankContainer {
                        id: 30,
                        wems: vec![100, 102],
                    }],
                    wems: vec![],
                }],
                wems: vec![101],
            }
        );
    }

    #[test]
    fn nested_and_cyclic_containers() {
        let graph = graph(vec![
            (1, BankObject::Event { action_ids: vec![10] }),
            (10, play(40)),
            (40, BankObject::SwitchContainer { child_ids: vec![30] }),
            (30, BankObject::RandomOrSequenceContainer { child_ids: vec![31, 20] }),
            (31, BankObject::RandomOrSequenceContainer { child_ids: vec![30, 21] }),
            (20, BankObject::Sound { wem_id: 100 }),
            (21, BankObject::Sound { wem_id: 101 }),
        ]);
        let tree = BankTree::build(&graph, &[100, 101]);

        assert_eq!(
            tree.events[0].containers,
            [
                BankContainer {
                    id: 31,
                    wems: vec![101],
                },
                BankContainer {
                    id: 30,
                    wems: vec![100],
                },
            ]
        );
        assert!(tree.wems.is_empty());
    }

    #[test]
    fn music_containers() {
        let graph = graph(vec![
            (1, BankObject::Event { action_ids: vec![10] }),
            (2, BankObject::Event { action_ids: vec![11] }),
            (10, play(50)),
            (11, play(60)),
            (50, BankObject::MusicPlaylistContainer { track_ids: vec![51] }),
            (51, BankObject::MusicSegment { track_ids: vec![52] }),
            (52, BankObject::MusicTrack { wem_ids: vec![100, 101] }),
            (60, BankObject::MusicSwitchContainer { child_ids: vec![61] }),
            (61, BankObject::MusicSwitchContainer { child_ids: vec![60, 50] }),
        ]);
        let tree = BankTree::build(&graph, &[101, 100]);

        let containers = |event: usize| tree.events[event].containers.clone();
        // a playlist played directly lists its segments
        assert_eq!(
            containers(0),
            [BankContainer {
                id: 51,
                wems: vec![100, 101]
            }]
        );
        // through a music switch, the playlist itself
        assert_eq!(
            containers(1),
            [BankContainer {
                id: 50,
                wems: vec![100, 101]
            }]
        );
    }

    #[test]
    fn empty_events_are_dropped() {
        let graph = graph(vec![
            (1, BankObject::Event { action_ids: vec![10] }),
            (10, play(20)),
            (20, BankObject::Sound { wem_id: 999 }),
        ]);
        let tree = BankTree::build(&graph, &[5]);

        assert!(tree.events.is_empty());
        assert_eq!(tree.wems, [5]);
    }

    #[test]
    fn every_wem_listed_once() {
        let graph = graph(vec![
            (1, BankObject::Event { action_ids: vec![10, 11] }),
            (2, BankObject::Event { action_ids: vec![10] }),
            (10, play(20)),
            (11, play(30)),
            (20, BankObject::Sound { wem_id: 100 }),
            (21, BankObject::Sound { wem_id: 101 }),
            (30, BankObject::RandomOrSequenceContainer { child_ids: vec![21] }),
        ]);
        let wems = [100, 101, 102, 103];
        let tree = BankTree::build(&graph, &wems);

        let reached: Vec<u32> = tree
            .events
            .iter()
            .flat_map(|event| {
                event
                    .containers
                    .iter()
                    .flat_map(|container| container.wems.clone())
                    .chain(event.wems.clone())
            })
            .collect();
        for wem in wems {
            assert!(
                reached.contains(&wem) != tree.wems.contains(&wem),
                "wem {wem} listed both or neither"
            );
        }
        assert_eq!(tree.listed_wems().len(), wems.len());
    }

    #[test]
    fn names_sort_and_paths() {
        let graph = graph(vec![
            (7, BankObject::Event { action_ids: vec![10] }),
            (8, BankObject::Event { action_ids: vec![11] }),
            (9, BankObject::Event { action_ids: vec![12] }),
            (10, play(20)),
            (11, play(30)),
            (12, play(21)),
            (20, BankObject::Sound { wem_id: 100 }),
            (21, BankObject::Sound { wem_id: 20 }),
            (22, BankObject::Sound { wem_id: 3 }),
            (30, BankObject::RandomOrSequenceContainer { child_ids: vec![20, 22] }),
        ]);
        let mut tree = BankTree::build(&graph, &[100, 3, 20, 1000, 9]);
        tree.resolve_names(&BTreeMap::from([
            (7, "Play_vo_10".to_owned()),
            (8, "Play_vo_2".to_owned()),
        ]));
        tree.sort();

        let labels: Vec<String> = tree.events.iter().map(BankEvent::label).collect();
        assert_eq!(labels, ["9", "Play_vo_2", "Play_vo_10"]);
        assert_eq!(tree.events[1].containers[0].wems, [3, 100]);
        assert_eq!(tree.wems, [9, 1000]);

        let paths = tree.wem_paths();
        assert_eq!(
            paths[&100],
            [
                PathBuf::from("Play_vo_2").join("30").join("100.wem"),
                PathBuf::from("Play_vo_10").join("100.wem"),
            ]
        );
        assert_eq!(paths[&20], [PathBuf::from("9").join("20.wem")]);
        assert_eq!(paths[&1000], [PathBuf::from("1000.wem")]);
    }

    #[test]
    fn unsafe_event_names() {
        let event = |name: &str| BankEvent {
            id: 5,
            name: Some(name.to_owned()),
            ..Default::default()
        };
        assert_eq!(event("Play_vo").dir_name(), "Play_vo");
        assert_eq!(event("../Play_vo").dir_name(), "5");
        assert_eq!(event("a/b").dir_name(), "5");
    }
}
