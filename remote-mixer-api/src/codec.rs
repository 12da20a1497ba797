//! Newline-delimited JSON framing.
//!
//! One compact JSON object per line, `\n` terminated, no length prefix.

use std::mem;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;


#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("line is not valid UTF-8")]
    Utf8(#[from] std::str::Utf8Error),
}

pub trait Codec {
    fn encode<T: Serialize>(&self, message: &T) -> Result<Vec<u8>, CodecError>;

    fn decode<T: DeserializeOwned>(&self, line: &[u8]) -> Result<T, CodecError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLines;

impl Codec for JsonLines {
    fn encode<T: Serialize>(&self, message: &T) -> Result<Vec<u8>, CodecError> {
        let mut buf = serde_json::to_vec(message)?;
        buf.push(b'\n');
        Ok(buf)
    }

    fn decode<T: DeserializeOwned>(&self, line: &[u8]) -> Result<T, CodecError> {
        let line = std::str::from_utf8(line)?;
        Ok(serde_json::from_str(line.trim_end_matches(['\r', '\n']))?)
    }
}

/// Accumulates raw bytes from a stream and yields complete lines.
///
/// A trailing partial line is kept until the rest of it arrives.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn extend(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// Removes and returns every complete, non-blank line, without terminators.
    pub fn take_lines(&mut self) -> Vec<Vec<u8>> {
        let Some(last_newline) = self.pending.iter().rposition(|b| *b == b'\n') else {
            return vec![];
        };

        let rest = self.pending.split_off(last_newline + 1);
        let complete = mem::replace(&mut self.pending, rest);

        complete.split(|b| *b == b'\n')
                .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
                .filter(|line| line.iter().any(|b| !b.is_ascii_whitespace()))
                .map(<[u8]>::to_vec)
                .collect()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
