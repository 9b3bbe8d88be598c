//! Types describing audio banks and their hierarchy objects

use std::fmt;

use crate::error::{Error, Result};

/// Action kind that starts playback of its target
pub const ACTION_PLAY: u8 = 4;

/// Version written into the header of packed banks
pub const DEFAULT_BANK_VERSION: u32 = 134;

/// An embedded audio stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Wem {
    pub id: u32,
    /// Relative to the `DATA` payload for BNK, absolute for WPK
    pub offset: u32,
    pub size: u32,
}

/// `BKHD` section
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BankHeader {
    pub version: u32,
    pub id: u32,
    /// Remaining header fields, kept as they are
    pub extra: Vec<u8>,
}

impl Default for BankHeader {
    fn default() -> Self {
        BankHeader {
            version: DEFAULT_BANK_VERSION,
            id: 0,
            extra: Vec::new(),
        }
    }
}

/// Type byte of a hierarchy object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ObjectType {
    Settings,
    Sound,
    Action,
    Event,
    RandomOrSequenceContainer,
    SwitchContainer,
    ActorMixer,
    AudioBus,
    LayerContainer,
    MusicSegment,
    MusicTrack,
    MusicSwitchContainer,
    MusicPlaylistContainer,
    Other(u8),
}

impl From<u8> for ObjectType {
    fn from(raw: u8) -> Self {
        match raw {
            1 => ObjectType::Settings,
            2 => ObjectType::Sound,
            3 => ObjectType::Action,
            4 => ObjectType::Event,
            5 => ObjectType::RandomOrSequenceContainer,
            6 => ObjectType::SwitchContainer,
            7 => ObjectType::ActorMixer,
            8 => ObjectType::AudioBus,
            9 => ObjectType::LayerContainer,
            10 => ObjectType::MusicSegment,
            11 => ObjectType::MusicTrack,
            12 => ObjectType::MusicSwitchContainer,
            13 => ObjectType::MusicPlaylistContainer,
            other => ObjectType::Other(other),
        }
    }
}

impl From<ObjectType> for u8 {
    fn from(kind: ObjectType) -> Self {
        match kind {
            ObjectType::Settings => 1,
            ObjectType::Sound => 2,
            ObjectType::Action => 3,
            ObjectType::Event => 4,
            ObjectType::RandomOrSequenceContainer => 5,
            ObjectType::SwitchContainer => 6,
            ObjectType::ActorMixer => 7,
            ObjectType::AudioBus => 8,
            ObjectType::LayerContainer => 9,
            ObjectType::MusicSegment => 10,
            ObjectType::MusicTrack => 11,
            ObjectType::MusicSwitchContainer => 12,
            ObjectType::MusicPlaylistContainer => 13,
            ObjectType::Other(raw) => raw,
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectType::Other(raw) => write!(f, "type {raw}"),
            kind => write!(f, "{kind:?}"),
        }
    }
}

/// One object of the `HIRC` section, its payload left undecoded
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HircObject {
    pub kind: ObjectType,
    pub id: u32,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub payload: Vec<u8>,
}

/// Start of an action payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Action {
    pub scope: u8,
    /// [`ACTION_PLAY`] starts playback
    pub kind: u8,
    /// Object acted upon
    pub object_id: u32,
}

impl Action {
    pub fn is_play(&self) -> bool {
        self.kind == ACTION_PLAY
    }
}

/// The parts of a hierarchy object the bank tree is built from
///
/// | Type | Payload                                               |
/// |------|-------------------------------------------------------|
/// | 2    | `u32` plugin, `u8` stream type, `u32` wem id, ...     |
/// | 3    | `u8` scope, `u8` action type, `u32` target id, ...    |
/// | 4    | `u8` count, `u32` action ids                          |
/// | 5, 6, 10, 11, 12, 13 | `u32` count, `u32` child ids, ...     |
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BankObject {
    Sound { wem_id: u32 },
    Event { action_ids: Vec<u32> },
    Action(Action),
    RandomOrSequenceContainer { child_ids: Vec<u32> },
    SwitchContainer { child_ids: Vec<u32> },
    MusicSegment { track_ids: Vec<u32> },
    MusicTrack { wem_ids: Vec<u32> },
    MusicSwitchContainer { child_ids: Vec<u32> },
    MusicPlaylistContainer { track_ids: Vec<u32> },
    /// Objects that do not take part in the tree
    Other,
}

struct PayloadReader<'a> {
    payload: &'a [u8],
    position: usize,
    kind: u8,
    id: u32,
}

impl PayloadReader<'_> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self
            .payload
            .get(self.position..self.position + N)
            .ok_or(Error::TruncatedObject {
                kind: self.kind,
                id: self.id,
            })?;
        self.position += N;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take::<1>()?[0])
    }

    fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take()?))
    }

    fn ids(&mut self, count: usize) -> Result<Vec<u32>> {
        (0..count).map(|_| self.u32()).collect()
    }

    fn counted_ids(&mut self) -> Result<Vec<u32>> {
        let count = self.u32()? as usize;
        self.ids(count)
    }
}

impl HircObject {
    pub fn new(kind: ObjectType, id: u32, payload: Vec<u8>) -> Self {
        HircObject { kind, id, payload }
    }

    /// Encode `object` with the payload layout [`HircObject::decode`] reads
    pub fn from_object(id: u32, object: &BankObject) -> Result<Self> {
        fn counted(ids: &[u32]) -> Vec<u8> {
            let mut payload = (ids.len() as u32).to_le_bytes().to_vec();
            payload.extend(ids.iter().flat_map(|id| id.to_le_bytes()));
            payload
        }

        let (kind, payload) = match object {
            BankObject::Sound { wem_id } => {
                let mut payload = 0u32.to_le_bytes().to_vec();
                payload.push(0);
                payload.extend(wem_id.to_le_bytes());
                (ObjectType::Sound, payload)
            }
            BankObject::Event { action_ids } => {
                let count = u8::try_from(action_ids.len()).map_err(|_| Error::TooManyActions {
                    id,
                    count: action_ids.len(),
                })?;
                let mut payload = vec![count];
                payload.extend(action_ids.iter().flat_map(|id| id.to_le_bytes()));
                (ObjectType::Event, payload)
            }
            BankObject::Action(action) => {
                let mut payload = vec![action.scope, action.kind];
                payload.extend(action.object_id.to_le_bytes());
                (ObjectType::Action, payload)
            }
            BankObject::RandomOrSequenceContainer { child_ids } => {
                (ObjectType::RandomOrSequenceContainer, counted(child_ids))
            }
            BankObject::SwitchContainer { child_ids } => {
                (ObjectType::SwitchContainer, counted(child_ids))
            }
            BankObject::MusicSegment { track_ids } => (ObjectType::MusicSegment, counted(track_ids)),
            BankObject::MusicTrack { wem_ids } => (ObjectType::MusicTrack, counted(wem_ids)),
            BankObject::MusicSwitchContainer { child_ids } => {
                (ObjectType::MusicSwitchContainer, counted(child_ids))
            }
            BankObject::MusicPlaylistContainer { track_ids } => {
                (ObjectType::MusicPlaylistContainer, counted(track_ids))
            }
            BankObject::Other => (ObjectType::Other(0), Vec::new()),
        };
        Ok(HircObject { kind, id, payload })
    }

    /// Decode the fields the bank tree needs
    pub fn decode(&self) -> Result<BankObject> {
        let mut reader = PayloadReader {
            payload: &self.payload,
            position: 0,
            kind: self.kind.into(),
            id: self.id,
        };
        Ok(match self.kind {
            ObjectType::Sound => {
                // plugin id, stream type
                reader.take::<5>()?;
                BankObject::Sound {
                    wem_id: reader.u32()?,
                }
            }
            ObjectType::Event => {
                let count = usize::from(reader.u8()?);
                BankObject::Event {
                    action_ids: reader.ids(count)?,
                }
            }
            ObjectType::Action => BankObject::Action(Action {
                scope: reader.u8()?,
                kind: reader.u8()?,
                object_id: reader.u32()?,
            }),
            ObjectType::RandomOrSequenceContainer => BankObject::RandomOrSequenceContainer {
                child_ids: reader.counted_ids()?,
            },
            ObjectType::SwitchContainer => BankObject::SwitchContainer {
                child_ids: reader.counted_ids()?,
            },
            ObjectType::MusicSegment => BankObject::MusicSegment {
                track_ids: reader.counted_ids()?,
            },
            ObjectType::MusicTrack => BankObject::MusicTrack {
                wem_ids: reader.counted_ids()?,
            },
            ObjectType::MusicSwitchContainer => BankObject::MusicSwitchContainer {
                child_ids: reader.counted_ids()?,
            },
            ObjectType::MusicPlaylistContainer => BankObject::MusicPlaylistContainer {
                track_ids: reader.counted_ids()?,
            },
            _ => BankObject::Other,
        })
    }
}

/// A section of a BNK file, in file order
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BnkSection {
    /// `BKHD`
    Header(BankHeader),
    /// `DIDX`
    Index(Vec<Wem>),
    /// `DATA`, left on disk
    Data { offset: u64, size: u32 },
    /// `HIRC`
    Hierarchy(Vec<HircObject>),
    /// Any other section, kept byte for byte
    Other {
        tag: String,
        #[cfg_attr(feature = "serde", serde(skip))]
        data: Vec<u8>,
    },
}

impl BnkSection {
    pub fn tag(&self) -> &str {
        match self {
            BnkSection::Header(_) => "BKHD",
            BnkSection::Index(_) => "DIDX",
            BnkSection::Data { .. } => "DATA",
            BnkSection::Hierarchy(_) => "HIRC",
            BnkSection::Other { tag, .. } => tag,
        }
    }
}

/// A Wwise sound bank
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Bnk {
    pub sections: Vec<BnkSection>,
}

impl Bnk {
    pub fn header(&self) -> Option<&BankHeader> {
        self.sections.iter().find_map(|section| match section {
            BnkSection::Header(header) => Some(header),
            _ => None,
        })
    }

    /// Streams listed in `DIDX`, empty without one
    pub fn wems(&self) -> &[Wem] {
        self.sections
            .iter()
            .find_map(|section| match section {
                BnkSection::Index(wems) => Some(wems.as_slice()),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Absolute offset of the `DATA` payload
    pub fn data_offset(&self) -> Option<u64> {
        self.sections.iter().find_map(|section| match section {
            BnkSection::Data { offset, .. } => Some(*offset),
            _ => None,
        })
    }

    /// Objects of `HIRC`, `None` without one
    pub fn objects(&self) -> Option<&[HircObject]> {
        self.sections.iter().find_map(|section| match section {
            BnkSection::Hierarchy(objects) => Some(objects.as_slice()),
            _ => None,
        })
    }

    /// An audio bank holding the given wem ids, in that order
    pub fn audio(header: BankHeader, ids: impl IntoIterator<Item = u32>) -> Bnk {
        Bnk {
            sections: vec![
                BnkSection::Header(header),
                BnkSection::Index(
                    ids.into_iter()
                        .map(|id| Wem {
                            id,
                            ..Default::default()
                        })
                        .collect(),
                ),
                BnkSection::Data { offset: 0, size: 0 },
            ],
        }
    }
}

/// A streamed wem package
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Wpk {
    pub version: u32,
    pub wems: Vec<Wem>,
}

impl Default for Wpk {
    fn default() -> Self {
        Wpk {
            version: 1,
            wems: Vec::new(),
        }
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn decode_encoded_objects() -> Result<()> {
        let objects = [
            BankObject::Sound { wem_id: 77 },
            BankObject::Event {
                action_ids: vec![1, 2],
            },
            BankObject::Action(Action {
                scope: 3,
                kind: ACTION_PLAY,
                object_id: 9,
            }),
            BankObject::RandomOrSequenceContainer {
                child_ids: vec![4, 5, 6],
            },
            BankObject::MusicTrack { wem_ids: vec![] },
        ];
        for object in objects {
            assert_eq!(HircObject::from_object(1, &object)?.decode()?, object);
        }

        Ok(())
    }

    #[test]
    fn play_action_bytes() -> Result<()> {
        #[rustfmt::skip]
        let payload = vec![
            0x03, 0x04,
            0x2A, 0x00, 0x00, 0x00,
            0xFF, 0xFF,
        ];
        let action = HircObject::new(ObjectType::Action, 1, payload).decode()?;
        assert_eq!(
            action,
            BankObject::Action(Action {
                scope: 3,
                kind: 4,
                object_id: 42
            })
        );

        Ok(())
    }

    #[test]
    fn truncated_payload() {
        let sound = HircObject::new(ObjectType::Sound, 5, vec![0, 0, 0, 0, 0, 1]);
        assert!(matches!(
            sound.decode(),
            Err(Error::TruncatedObject { kind: 2, id: 5 })
        ));
    }

    #[test]
    fn event_action_count_fits_a_byte() -> Result<()> {
        let full = BankObject::Event {
            action_ids: (0..255).collect(),
        };
        assert_eq!(HircObject::from_object(8, &full)?.decode()?, full);

        let over = BankObject::Event {
            action_ids: (0..256).collect(),
        };
        assert!(matches!(
            HircObject::from_object(9, &over),
            Err(Error::TooManyActions { id: 9, count: 256 })
        ));

        Ok(())
    }

    #[test]
    fn type_bytes() {
        assert_eq!(ObjectType::from(13), ObjectType::MusicPlaylistContainer);
        assert_eq!(u8::from(ObjectType::from(42)), 42);
        assert_eq!(ObjectType::Other(42).to_string(), "type 42");
    }
}
