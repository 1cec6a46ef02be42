use serde::de::DeserializeOwned;

use crate::{Error, Result};

/// Reassembles newline-delimited JSON records from arbitrarily split chunks.
///
/// The decoder keeps the unterminated tail of the input between calls to
/// [`feed`](Self::feed). Bytes of a UTF-8 character cut by a chunk boundary
/// are held back until the rest of the character arrives.
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    tail: String,
    /// Leading bytes of a UTF-8 sequence that is not complete yet.
    pending: Vec<u8>,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The text received after the last newline.
    pub fn tail(&self) -> &str {
        &self.tail
    }

    /// Appends `chunk` and calls `on_record` for every line it completes.
    ///
    /// The text after the last newline is retained as the new tail. On a
    /// parse failure the remaining complete lines are dropped.
    pub fn feed<T, F>(&mut self, chunk: &[u8], on_record: &mut F) -> Result<()>
    where
        T: DeserializeOwned,
        F: FnMut(T),
    {
        self.push_text(chunk);

        let Some(newline) = self.tail.rfind('\n') else {
            return Ok(());
        };
        let rest = self.tail.split_off(newline + 1);
        let complete = std::mem::replace(&mut self.tail, rest);

        for line in complete.split_terminator('\n') {
            dispatch(line, on_record)?;
        }
        Ok(())
    }

    /// Flushes the tail once the input has ended.
    ///
    /// An incomplete UTF-8 sequence left over at this point is decoded as
    /// U+FFFD. The decoder is empty afterwards.
    pub fn finish<T, F>(&mut self, on_record: &mut F) -> Result<()>
    where
        T: DeserializeOwned,
        F: FnMut(T),
    {
        if !self.pending.is_empty() {
            self.pending.clear();
            self.tail.push(char::REPLACEMENT_CHARACTER);
        }

        let tail = std::mem::take(&mut self.tail);
        dispatch(&tail, on_record)
    }

    fn push_text(&mut self, chunk: &[u8]) {
        let buffered;
        let mut input = if self.pending.is_empty() {
            chunk
        } else {
            self.pending.extend_from_slice(chunk);
            buffered = std::mem::take(&mut self.pending);
            &buffered[..]
        };

        loop {
            match std::str::from_utf8(input) {
                Ok(text) => {
                    self.tail.push_str(text);
                    return;
                }
                Err(err) => {
                    let (valid, rest) = input.split_at(err.valid_up_to());
                    self.tail.push_str(&String::from_utf8_lossy(valid));

                    match err.error_len() {
                        Some(invalid) => {
                            self.tail.push(char::REPLACEMENT_CHARACTER);
                            input = &rest[invalid..];
                        }
                        None => {
                            // truncated sequence, wait for the next chunk
                            self.pending.extend_from_slice(rest);
                            return;
                        }
                    }
                }
            }
        }
    }
}

fn dispatch<T, F>(line: &str, on_record: &mut F) -> Result<()>
where
    T: DeserializeOwned,
    F: FnMut(T),
{
    if line.trim().is_empty() {
        return Ok(());
    }

    let record = serde_json::from_str::<T>(line).map_err(|source| Error::MalformedRecord {
        record: line.to_string(),
        source,
    })?;
    on_record(record);
    Ok(())
}
