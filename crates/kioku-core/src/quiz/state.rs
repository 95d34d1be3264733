//! Session state blob for suspend / resume
//!
//! Layout (little endian):
//!
//! | Field            | Encoding                                  |
//! |------------------|-------------------------------------------|
//! | current question | `u8` flag (0/1) + `u32` id                |
//! | current answers  | `u32` count + `u32` ids                   |
//! | correct count    | `u32`                                     |
//! | question count   | `u32`                                     |
//! | history          | see [`History`](super::History)           |

use bytes::{Buf, BufMut, BytesMut};

use super::history::{read_u32, read_u8, History};
use super::StateError;

/// Serializable part of a quiz session
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    pub question_id: Option<u32>,
    pub answer_ids: Vec<u32>,
    pub correct_count: u32,
    pub question_count: u32,
    pub history: History,
}

impl SessionState {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf =
            BytesMut::with_capacity(32 + 4 * self.answer_ids.len() + 9 * self.history.len());

        match self.question_id {
            Some(id) => {
                buf.put_u8(1);
                buf.put_u32_le(id);
            }
            None => {
                buf.put_u8(0);
                buf.put_u32_le(0);
            }
        }

        buf.put_u32_le(self.answer_ids.len() as u32);
        for id in &self.answer_ids {
            buf.put_u32_le(*id);
        }

        buf.put_u32_le(self.correct_count);
        buf.put_u32_le(self.question_count);
        self.history.encode(&mut buf);

        buf.to_vec()
    }

    /// Decode a blob produced by [`SessionState::encode`]
    pub fn decode(data: &[u8], history_capacity: usize) -> Result<Self, StateError> {
        let mut buf = data;

        let has_question = read_u8(&mut buf)?;
        let id = read_u32(&mut buf)?;
        let question_id = match has_question {
            0 => None,
            1 => Some(id),
            flag => return Err(StateError::UnknownTag(flag)),
        };

        let answer_count = read_u32(&mut buf)? as usize;
        if buf.remaining() < answer_count.saturating_mul(4) {
            return Err(StateError::Truncated);
        }
        let mut answer_ids = Vec::with_capacity(answer_count);
        for _ in 0..answer_count {
            answer_ids.push(read_u32(&mut buf)?);
        }

        let correct_count = read_u32(&mut buf)?;
        let question_count = read_u32(&mut buf)?;
        let history = History::decode(&mut buf, history_capacity)?;

        if buf.has_remaining() {
            return Err(StateError::TrailingBytes(buf.remaining()));
        }

        Ok(Self {
            question_id,
            answer_ids,
            correct_count,
            question_count,
            history,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
