//! Length-prefixed packet wire format.
//!
//! An encoded chunk is a flat byte buffer of repeated records, each a
//! 4-byte little-endian length immediately followed by that many payload
//! bytes, consumed strictly in order. An exhausted buffer yields flush
//! records (the end-of-stream signal) from then on.
//!
//! Every length header is validated against the remaining buffer before
//! any payload is touched; a header that declares more bytes than remain
//! is a wire error, never an out-of-bounds read.

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use sieve_common::error::WireError;

/// One record from the packet stream.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Packet<'a> {
    /// A compressed packet payload.
    Data(&'a [u8]),
    /// End-of-stream flush (empty packet, size 0).
    Flush,
}

impl<'a> Packet<'a> {
    pub fn is_flush(self) -> bool {
        matches!(self, Packet::Flush)
    }

    /// Payload bytes to feed the decoder; `None` for the flush signal.
    pub fn payload(self) -> Option<&'a [u8]> {
        match self {
            Packet::Data(bytes) => Some(bytes),
            Packet::Flush => None,
        }
    }
}

/// Forward-only cursor over a packet buffer.
#[derive(Debug)]
pub struct PacketCursor<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> PacketCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.offset
    }

    /// Read the next record. Once the buffer is exhausted, every
    /// subsequent call returns [`Packet::Flush`].
    pub fn next_packet(&mut self) -> Result<Packet<'a>, WireError> {
        if self.offset >= self.buf.len() {
            return Ok(Packet::Flush);
        }
        let remaining = self.remaining();
        if remaining < 4 {
            return Err(WireError::TruncatedHeader {
                offset: self.offset,
                remaining,
            });
        }
        let declared = LittleEndian::read_i32(&self.buf[self.offset..self.offset + 4]);
        if declared < 0 {
            return Err(WireError::NegativeLength {
                offset: self.offset,
                declared,
            });
        }
        let len = declared as usize;
        let payload_start = self.offset + 4;
        if len > self.buf.len() - payload_start {
            return Err(WireError::TruncatedPacket {
                offset: self.offset,
                declared: len,
                remaining: self.buf.len() - payload_start,
            });
        }
        self.offset = payload_start + len;
        if len == 0 {
            // An explicit zero-length record is the in-band flush.
            return Ok(Packet::Flush);
        }
        Ok(Packet::Data(&self.buf[payload_start..payload_start + len]))
    }
}

/// Encode packets into the wire form (producer/test helper).
pub fn encode_packets<P: AsRef<[u8]>>(packets: &[P]) -> Vec<u8> {
    let total: usize = packets.iter().map(|p| 4 + p.as_ref().len()).sum();
    let mut out = Vec::with_capacity(total);
    for p in packets {
        let bytes = p.as_ref();
        out.write_i32::<LittleEndian>(bytes.len() as i32).unwrap();
        out.extend_from_slice(bytes);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_packets_in_order() {
        let wire = encode_packets(&[&b"aaa"[..], &b"bb"[..]]);
        let mut cur = PacketCursor::new(&wire);
        assert_eq!(cur.next_packet().unwrap(), Packet::Data(b"aaa"));
        assert_eq!(cur.next_packet().unwrap(), Packet::Data(b"bb"));
        assert_eq!(cur.next_packet().unwrap(), Packet::Flush);
        // Exhausted buffers flush forever.
        assert_eq!(cur.next_packet().unwrap(), Packet::Flush);
    }

    #[test]
    fn zero_length_record_is_flush() {
        let wire = encode_packets(&[&b""[..], &b"x"[..]]);
        let mut cur = PacketCursor::new(&wire);
        assert_eq!(cur.next_packet().unwrap(), Packet::Flush);
        assert_eq!(cur.next_packet().unwrap(), Packet::Data(b"x"));
    }

    #[test]
    fn truncated_header_is_rejected() {
        let wire = [1u8, 0, 0];
        let mut cur = PacketCursor::new(&wire);
        assert_eq!(
            cur.next_packet().unwrap_err(),
            WireError::TruncatedHeader {
                offset: 0,
                remaining: 3
            }
        );
    }

    #[test]
    fn overrunning_length_is_rejected() {
        let mut wire = encode_packets(&[&b"abcd"[..]]);
        wire.truncate(6); // header says 4 bytes, only 2 remain
        let mut cur = PacketCursor::new(&wire);
        assert_eq!(
            cur.next_packet().unwrap_err(),
            WireError::TruncatedPacket {
                offset: 0,
                declared: 4,
                remaining: 2
            }
        );
    }

    #[test]
    fn negative_length_is_rejected() {
        let wire = (-1i32).to_le_bytes();
        let mut cur = PacketCursor::new(&wire);
        assert_eq!(
            cur.next_packet().unwrap_err(),
            WireError::NegativeLength {
                offset: 0,
                declared: -1
            }
        );
    }

    #[test]
    fn empty_buffer_flushes_immediately() {
        let mut cur = PacketCursor::new(&[]);
        assert_eq!(cur.next_packet().unwrap(), Packet::Flush);
        assert!(Packet::Flush.payload().is_none());
    }
}
