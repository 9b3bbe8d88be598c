//! Reading, extracting and packing League of Legends audio banks.
//!
//! Wems, the encoded audio streams, live either in a Wwise sound bank (`.bnk`) or in a WPK
//! package (`.wpk`). A second sound bank, the events bank, holds no audio but the hierarchy of
//! events, actions, containers and sounds that decides which wems an event plays.
//!
//! ## BNK Sections
//!
//! Sections follow each other as a 4 byte tag, a `u32` size and their payload.
//!
//! | Tag    | Payload                                                               |
//! |--------|-----------------------------------------------------------------------|
//! | `BKHD` | `u32` version, `u32` bank id, remaining header fields                  |
//! | `DIDX` | 12 bytes per wem: `u32` id, `u32` offset into `DATA`, `u32` size      |
//! | `DATA` | wem data, each wem on a 16 byte boundary                              |
//! | `HIRC` | `u32` count, objects as `u8` type, `u32` size, `u32` id and payload   |
//!
//! Other sections are kept as they are. The WPK layout is described in [`wpk`].
//!
//! ## Bank Tree
//!
//! [`BankTree`] lists, for every event of the events bank, the containers and wems its play
//! actions reach. Events can be named through the audio properties of a property document, see
//! [`names`]. Extraction writes each wem to every place the tree lists it.
//!
//! ```
//! # fn doit() -> lol_bnk::error::Result<()>
//! # {
//! use lol_bnk::{Action, BankGraph, BankObject, BankTree};
//!
//! let mut graph = BankGraph::default();
//! graph.insert(1, BankObject::Event { action_ids: vec![2] });
//! graph.insert(2, BankObject::Action(Action { scope: 0, kind: 4, object_id: 3 }));
//! graph.insert(3, BankObject::Sound { wem_id: 100 });
//!
//! let tree = BankTree::build(&graph, &[100, 200]);
//! assert_eq!(tree.events[0].wems, [100]);
//! assert_eq!(tree.wems, [200]);
//! # Ok(())
//! # }
//! # doit().unwrap();
//! ```
//!

pub mod bank;
pub mod error;
pub mod graph;
pub mod names;
pub mod pack;
pub mod read;
pub mod sort;
pub mod tree;
pub mod types;
pub mod wpk;
pub mod write;

pub use bank::{AudioBank, Bank};
pub use graph::BankGraph;
pub use names::event_names;
pub use pack::{pack, BankKind};
pub use tree::{BankContainer, BankEvent, BankTree};
pub use types::{
    Action, BankHeader, BankObject, Bnk, BnkSection, HircObject, ObjectType, Wem, Wpk,
};
