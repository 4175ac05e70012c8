/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Fixed-size datagram carrying one counter value.
//!
//! ```text
//! offset  size  field
//!      0     2  publisher_id       (big-endian)
//!      2     2  writer_group_id    (big-endian)
//!      4     2  dataset_writer_id  (big-endian)
//!      6     8  value              (big-endian)
//! ```

/// Encoded frame length in bytes.
pub const FRAME_LEN: usize = 14;

/// Identifies one published stream.  A reader only accepts frames whose
/// identifiers match the ones it was configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamId {
    pub publisher_id: u16,
    pub writer_group_id: u16,
    pub dataset_writer_id: u16,
}

impl Default for StreamId {
    fn default() -> Self {
        Self {
            publisher_id: 1,
            writer_group_id: 1,
            dataset_writer_id: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub stream: StreamId,
    pub value: u64,
}

impl Frame {
    pub fn encode(&self) -> [u8; FRAME_LEN] {
        let mut buf = [0u8; FRAME_LEN];
        buf[0..2].copy_from_slice(&self.stream.publisher_id.to_be_bytes());
        buf[2..4].copy_from_slice(&self.stream.writer_group_id.to_be_bytes());
        buf[4..6].copy_from_slice(&self.stream.dataset_writer_id.to_be_bytes());
        buf[6..14].copy_from_slice(&self.value.to_be_bytes());
        buf
    }

    /// Decode a datagram; `None` if it is not exactly [`FRAME_LEN`] bytes.
    pub fn decode(buf: &[u8]) -> Option<Self> {
        let buf: &[u8; FRAME_LEN] = buf.try_into().ok()?;
        let u16_at = |i: usize| u16::from_be_bytes([buf[i], buf[i + 1]]);
        let mut value = [0u8; 8];
        value.copy_from_slice(&buf[6..14]);
        Some(Self {
            stream: StreamId {
                publisher_id: u16_at(0),
                writer_group_id: u16_at(2),
                dataset_writer_id: u16_at(4),
            },
            value: u64::from_be_bytes(value),
        })
    }
}
