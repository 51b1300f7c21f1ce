use anyhow::Result;
use folio_types::StreamEvent;
use futures::{Stream, StreamExt};
use std::fmt::Display;

use crate::buffer_utils::CircularLineBuffer;
use crate::traits::EventStream;

/// Lines carrying a payload start with this prefix
pub const DATA_PREFIX: &str = "data:";

/// Incremental decoder for the newline-framed event stream
///
/// Bytes may arrive split at any position, including mid-frame or
/// mid-character; events come out in exactly the order their frames
/// were completed. Malformed frames are dropped and logged.
pub struct StreamDecoder {
    buffer: CircularLineBuffer,
    decoded: u64,
    dropped: u64,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self {
            buffer: CircularLineBuffer::with_capacity(4096),
            decoded: 0,
            dropped: 0,
        }
    }

    /// Feed a network chunk, returning every event completed by it
    pub fn push(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend(bytes);

        let mut events = Vec::new();
        while let Some(line_result) = self.buffer.next_line() {
            if let Some(event) = self.decode_line(line_result) {
                events.push(event);
            }
        }
        events
    }

    /// End of input: decode a trailing frame that never got its newline
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        self.buffer
            .take_remainder()
            .and_then(|line_result| self.decode_line(line_result))
            .into_iter()
            .collect()
    }

    /// Discard all buffered state and counters
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.decoded = 0;
        self.dropped = 0;
    }

    /// Number of events produced so far
    pub fn decoded(&self) -> u64 {
        self.decoded
    }

    /// Number of malformed frames dropped so far
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    fn decode_line(&mut self, line_result: Result<String>) -> Option<StreamEvent> {
        let line = match line_result {
            Ok(line) => line,
            Err(e) => {
                self.dropped += 1;
                tracing::warn!("Dropping undecodable stream line: {}", e);
                return None;
            }
        };

        // Blank separators, comments and other SSE fields carry nothing for us
        let data = line.strip_prefix(DATA_PREFIX)?.trim();
        if data.is_empty() {
            return None;
        }

        match serde_json::from_str::<StreamEvent>(data) {
            Ok(event) => {
                self.decoded += 1;
                Some(event)
            }
            Err(e) => {
                self.dropped += 1;
                tracing::warn!("Dropping malformed stream frame ({}): {}", e, data);
                None
            }
        }
    }
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a chunked byte stream into stream events
///
/// Transport errors are yielded once and end the stream; decode errors
/// never surface here.
pub fn decode_stream<S, B, E>(byte_stream: S) -> EventStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(byte_stream);
        let mut decoder = StreamDecoder::new();

        while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    for event in decoder.push(bytes.as_ref()) {
                        yield Ok(event);
                    }
                }
                Err(e) => {
                    yield Err(anyhow::anyhow!("Stream error: {}", e));
                    return;
                }
            }
        }

        for event in decoder.finish() {
            yield Ok(event);
        }

        tracing::debug!(
            decoded = decoder.decoded(),
            dropped = decoder.dropped(),
            "Event stream closed"
        );
    })
}
