//! Length-prefixed framing for the stdio transport, plus chunk reassembly
//! for bodies too large to send as one frame (§4.6).
//!
//! Wire shape: 4-byte little-endian unsigned length, then that many bytes
//! of UTF-8 JSON. The reader keeps a growable buffer and only ever emits
//! whole frames; a partial tail is retained across calls to `push`.

use base64::Engine;
use serde::{Deserialize, Serialize};

/// Bodies larger than this are expected to travel as a `ChunkedMessage`
/// sequence rather than one oversized frame.
pub const CHUNK_THRESHOLD_BYTES: usize = 1024 * 1024;

/// One chunk of a message whose serialized body exceeded
/// `CHUNK_THRESHOLD_BYTES` (§4.6). `data` is base64 of the chunk's raw
/// bytes, not the chunk reinterpreted as UTF-8 — splitting on byte
/// boundaries can land inside a multi-byte codepoint, and base64 is the
/// only lossless way to carry that half-codepoint over the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkedMessage {
    pub id: String,
    pub chunk_index: u32,
    pub total_chunks: u32,
    pub data: String,
}

/// Prepends the 4-byte little-endian length prefix to a JSON body.
pub fn frame(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 4);
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(body);
    out
}

/// Splits `body` into `ChunkedMessage` frames of at most
/// `CHUNK_THRESHOLD_BYTES` bytes of payload each, all sharing `id`.
pub fn split_into_chunks(id: &str, body: &str) -> Vec<ChunkedMessage> {
    let bytes = body.as_bytes();
    if bytes.len() <= CHUNK_THRESHOLD_BYTES {
        return vec![ChunkedMessage {
            id: id.to_string(),
            chunk_index: 0,
            total_chunks: 1,
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }];
    }
    let total_chunks = bytes.len().div_ceil(CHUNK_THRESHOLD_BYTES) as u32;
    bytes
        .chunks(CHUNK_THRESHOLD_BYTES)
        .enumerate()
        .map(|(i, chunk)| ChunkedMessage {
            id: id.to_string(),
            chunk_index: i as u32,
            total_chunks,
            data: base64::engine::general_purpose::STANDARD.encode(chunk),
        })
        .collect()
}

/// Accumulates `ChunkedMessage`s by id and reassembles a complete body once
/// every chunk for that id has arrived.
#[derive(Debug, Default)]
pub struct ChunkReassembler {
    pending: std::collections::HashMap<String, Vec<Option<Vec<u8>>>>,
}

impl ChunkReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk in. Returns `Some(body)` once `chunk.id` is complete.
    /// Decodes each chunk's base64 payload before concatenating so a
    /// codepoint split across a chunk boundary is reproduced exactly.
    pub fn push(&mut self, chunk: ChunkedMessage) -> Option<String> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&chunk.data)
            .ok()?;
        let slots = self
            .pending
            .entry(chunk.id.clone())
            .or_insert_with(|| vec![None; chunk.total_chunks as usize]);
        if chunk.chunk_index as usize >= slots.len() {
            return None;
        }
        slots[chunk.chunk_index as usize] = Some(bytes);
        if slots.iter().all(Option::is_some) {
            let slots = self.pending.remove(&chunk.id).unwrap();
            let body: Vec<u8> = slots.into_iter().flat_map(Option::unwrap).collect();
            String::from_utf8(body).ok()
        } else {
            None
        }
    }
}

/// Incremental length-prefixed frame reader over an append-only buffer.
#[derive(Debug, Default)]
pub struct FrameReader {
    buf: Vec<u8>,
}

impl FrameReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends newly-read bytes to the internal buffer.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Pops the next complete frame's body, if the buffer holds one.
    /// Leaves any partial trailing frame in the buffer for the next `feed`.
    pub fn next_frame(&mut self) -> Option<Vec<u8>> {
        if self.buf.len() < 4 {
            return None;
        }
        let len = u32::from_le_bytes(self.buf[0..4].try_into().unwrap()) as usize;
        if self.buf.len() < 4 + len {
            return None;
        }
        let body = self.buf[4..4 + len].to_vec();
        self.buf.drain(0..4 + len);
        Some(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_round_trips_single_message() {
        let body = br#"{"hello":"world"}"#;
        let framed = frame(body);
        let mut reader = FrameReader::new();
        reader.feed(&framed);
        let out = reader.next_frame().unwrap();
        assert_eq!(out, body);
        assert!(reader.next_frame().is_none());
    }

    #[test]
    fn reader_handles_split_across_feed_calls() {
        let body = br#"{"a":1}"#;
        let framed = frame(body);
        let mut reader = FrameReader::new();
        // feed byte-by-byte to simulate a slow stdin pipe
        for b in &framed {
            reader.feed(&[*b]);
        }
        let out = reader.next_frame().unwrap();
        assert_eq!(out, body);
    }

    #[test]
    fn reader_handles_two_messages_in_one_buffer() {
        let a = frame(br#"{"n":1}"#);
        let b = frame(br#"{"n":2}"#);
        let mut combined = a.clone();
        combined.extend_from_slice(&b);

        let mut reader = FrameReader::new();
        reader.feed(&combined);
        assert_eq!(reader.next_frame().unwrap(), br#"{"n":1}"#);
        assert_eq!(reader.next_frame().unwrap(), br#"{"n":2}"#);
        assert!(reader.next_frame().is_none());
    }

    #[test]
    fn chunking_round_trips_large_body() {
        let big = "x".repeat(CHUNK_THRESHOLD_BYTES * 2 + 17);
        let chunks = split_into_chunks("msg-1", &big);
        assert!(chunks.len() > 1);

        let mut reassembler = ChunkReassembler::new();
        let mut result = None;
        // feed out of order to prove ordering is handled by chunk_index
        for chunk in chunks.into_iter().rev() {
            result = reassembler.push(chunk);
        }
        assert_eq!(result.unwrap(), big);
    }

    #[test]
    fn chunking_preserves_codepoint_split_across_boundary() {
        // "€" is 3 UTF-8 bytes; placed so the chunk boundary falls inside it.
        let prefix = "x".repeat(CHUNK_THRESHOLD_BYTES - 1);
        let big = format!("{prefix}€{}", "y".repeat(10));
        let chunks = split_into_chunks("msg-3", &big);
        assert!(chunks.len() > 1);

        let mut reassembler = ChunkReassembler::new();
        let mut result = None;
        for chunk in chunks {
            result = reassembler.push(chunk);
        }
        assert_eq!(result.unwrap(), big);
    }

    #[test]
    fn small_body_is_a_single_chunk() {
        let chunks = split_into_chunks("msg-2", "small");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].total_chunks, 1);
    }

    #[test]
    fn malformed_json_frame_is_dropped_not_fatal() {
        let framed = frame(b"not json");
        let mut reader = FrameReader::new();
        reader.feed(&framed);
        let body = reader.next_frame().unwrap();
        let parsed: Result<serde_json::Value, _> = serde_json::from_slice(&body);
        assert!(parsed.is_err());
        // stream position has advanced past the bad frame regardless
        assert!(reader.next_frame().is_none());
    }
}
