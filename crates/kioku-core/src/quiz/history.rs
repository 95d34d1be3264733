//! Answer history
//!
//! A bounded log of graded answers, kept for the length of a session and
//! encoded into the session state blob on suspend.
//!
//! Wire format: `u32` entry count, then per entry one tag byte followed by
//! one (`Correct`, `Unknown`) or two (`Incorrect`) little-endian `u32` ids.

use std::collections::VecDeque;

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

use super::StateError;

/// Default number of entries kept
pub const DEFAULT_HISTORY_CAPACITY: usize = 40;

const TAG_CORRECT: u8 = 0;
const TAG_UNKNOWN: u8 = 1;
const TAG_INCORRECT: u8 = 2;

/// Outcome of one graded answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum HistoryEntry {
    Correct { item_id: u32 },
    Unknown { item_id: u32 },
    Incorrect { correct_id: u32, wrong_id: u32 },
}

impl HistoryEntry {
    /// The item that was asked
    pub fn question_id(&self) -> u32 {
        match *self {
            HistoryEntry::Correct { item_id } | HistoryEntry::Unknown { item_id } => item_id,
            HistoryEntry::Incorrect { correct_id, .. } => correct_id,
        }
    }

    fn encode(&self, buf: &mut impl BufMut) {
        match *self {
            HistoryEntry::Correct { item_id } => {
                buf.put_u8(TAG_CORRECT);
                buf.put_u32_le(item_id);
            }
            HistoryEntry::Unknown { item_id } => {
                buf.put_u8(TAG_UNKNOWN);
                buf.put_u32_le(item_id);
            }
            HistoryEntry::Incorrect {
                correct_id,
                wrong_id,
            } => {
                buf.put_u8(TAG_INCORRECT);
                buf.put_u32_le(correct_id);
                buf.put_u32_le(wrong_id);
            }
        }
    }

    fn decode(buf: &mut impl Buf) -> Result<Self, StateError> {
        match read_u8(buf)? {
            TAG_CORRECT => Ok(HistoryEntry::Correct {
                item_id: read_u32(buf)?,
            }),
            TAG_UNKNOWN => Ok(HistoryEntry::Unknown {
                item_id: read_u32(buf)?,
            }),
            TAG_INCORRECT => Ok(HistoryEntry::Incorrect {
                correct_id: read_u32(buf)?,
                wrong_id: read_u32(buf)?,
            }),
            tag => Err(StateError::UnknownTag(tag)),
        }
    }
}

/// Ring buffer of the most recent answers, oldest first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, discarding the oldest past capacity
    pub fn push(&mut self, entry: HistoryEntry) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Most recent entry
    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u32_le(self.entries.len() as u32);
        for entry in &self.entries {
            entry.encode(buf);
        }
    }

    /// Decode a history stream. Entries beyond `capacity` drop the oldest.
    pub fn decode(buf: &mut impl Buf, capacity: usize) -> Result<Self, StateError> {
        let count = read_u32(buf)?;
        let mut history = History::new(capacity);
        for _ in 0..count {
            history.push(HistoryEntry::decode(buf)?);
        }
        Ok(history)
    }
}

pub(super) fn read_u8(buf: &mut impl Buf) -> Result<u8, StateError> {
    if buf.remaining() < 1 {
        return Err(StateError::Truncated);
    }
    Ok(buf.get_u8())
}

pub(super) fn read_u32(buf: &mut impl Buf) -> Result<u32, StateError> {
    if buf.remaining() < 4 {
        return Err(StateError::Truncated);
    }
    Ok(buf.get_u32_le())
}

// ============================================================================
// TESTS
// ============================================================================
