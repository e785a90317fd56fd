//! Reassembles newline-delimited records from an HTTP body stream.
//!
//! Network chunks do not respect line boundaries: a single JSON record or
//! SSE event may arrive split across reads, and a read may hold several.

use futures::{Stream, StreamExt};
use ragbot_core::{AppError, AppResult};
use std::collections::VecDeque;
use std::fmt::Display;
use std::pin::Pin;

struct LineState<S> {
    inner: Pin<Box<S>>,
    buffer: Vec<u8>,
    pending: VecDeque<String>,
    exhausted: bool,
}

impl<S> LineState<S> {
    fn drain_complete_lines(&mut self) {
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.push_line(&raw[..raw.len() - 1]);
        }
    }

    fn push_line(&mut self, raw: &[u8]) {
        let line = String::from_utf8_lossy(raw);
        let line = line.trim_end_matches('\r');
        if !line.trim().is_empty() {
            self.pending.push_back(line.to_string());
        }
    }
}

/// Split a byte stream into non-empty lines.
///
/// A transport error is yielded once as `AppError::Streaming` and ends the
/// stream. A trailing line without a final newline is still emitted.
pub fn split_lines<S, B, E>(bytes: S) -> impl Stream<Item = AppResult<String>> + Send
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: Display + Send,
{
    let state = LineState {
        inner: Box::pin(bytes),
        buffer: Vec::new(),
        pending: VecDeque::new(),
        exhausted: false,
    };

    futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(line) = state.pending.pop_front() {
                return Some((Ok(line), state));
            }

            if state.exhausted {
                return None;
            }

            match state.inner.next().await {
                Some(Ok(bytes)) => {
                    state.buffer.extend_from_slice(bytes.as_ref());
                    state.drain_complete_lines();
                }
                Some(Err(e)) => {
                    state.exhausted = true;
                    return Some((
                        Err(AppError::Streaming(format!("Stream error: {}", e))),
                        state,
                    ));
                }
                None => {
                    state.exhausted = true;
                    let tail = std::mem::take(&mut state.buffer);
                    state.push_line(&tail);
                }
            }
        }
    })
}
