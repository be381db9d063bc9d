//! Receive-side frame assembly
//!
//! Bytes arrive one at a time with the wire inversion already undone. The
//! assembler waits for a start byte, reads the length byte, collects the
//! rest of the frame and hands it to [`FrameDecoder`]. Anything that cannot
//! be a frame is dropped and the search restarts at the next start byte
//! inside the rejected bytes, so a frame embedded in garbage is not lost.

use crate::encoding::{FrameDecoder, FRAME_START, LENGTH_INDEX, MAX_FRAME_LEN, MIN_FRAME_LEN};
use crate::packet::Packet;
use tracing::debug;

/// Counters kept by the assembler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssemblerStats {
    /// Frames decoded into packets
    pub frames_decoded: u32,
    /// Candidate frames rejected (bad length, checksum or command)
    pub frames_dropped: u32,
    /// Bytes skipped while looking for a start byte
    pub bytes_discarded: u32,
}

/// State machine reconstructing frames from the inbound byte stream
#[derive(Debug, Clone, Default)]
pub struct ReceiveAssembler {
    buffer: Vec<u8>,
    stats: AssemblerStats,
}

impl ReceiveAssembler {
    /// Create a new assembler
    pub fn new() -> Self {
        ReceiveAssembler {
            buffer: Vec::with_capacity(MAX_FRAME_LEN),
            stats: AssemblerStats::default(),
        }
    }

    /// Drop any partially received frame
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Bytes of the frame currently being assembled
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Counters since construction
    pub fn stats(&self) -> AssemblerStats {
        self.stats
    }

    /// Feed one logical byte, calling `on_packet` for every completed frame
    pub fn push(&mut self, byte: u8, on_packet: &mut dyn FnMut(Packet)) {
        if self.buffer.is_empty() && byte != FRAME_START {
            self.stats.bytes_discarded += 1;
            return;
        }

        self.buffer.push(byte);

        if self.buffer.len() == LENGTH_INDEX + 1 {
            let declared = byte as usize;
            if !(MIN_FRAME_LEN..=MAX_FRAME_LEN).contains(&declared) {
                debug!(length = declared, "dropping frame with implausible length");
                self.resync(on_packet);
                return;
            }
        }

        if self.buffer.len() > LENGTH_INDEX
            && self.buffer.len() == self.buffer[LENGTH_INDEX] as usize
        {
            match FrameDecoder::decode(&self.buffer) {
                Ok(packet) => {
                    self.buffer.clear();
                    self.stats.frames_decoded += 1;
                    on_packet(packet);
                }
                Err(err) => {
                    debug!(error = %err, length = self.buffer.len(), "dropping malformed frame");
                    self.resync(on_packet);
                }
            }
        }
    }

    /// Feed a run of logical bytes and collect the completed packets
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Packet> {
        let mut packets = Vec::new();
        let mut collect = |packet: Packet| packets.push(packet);
        for &byte in bytes {
            self.push(byte, &mut collect);
        }
        packets
    }

    /// Discard the rejected candidate and replay what follows its start byte
    fn resync(&mut self, on_packet: &mut dyn FnMut(Packet)) {
        self.stats.frames_dropped += 1;
        let rejected = std::mem::take(&mut self.buffer);

        match rejected[1..].iter().position(|&b| b == FRAME_START) {
            Some(offset) => {
                self.stats.bytes_discarded += (offset + 1) as u32;
                for &byte in &rejected[offset + 1..] {
                    self.push(byte, on_packet);
                }
            }
            None => self.stats.bytes_discarded += rejected.len() as u32,
        }
    }
}
