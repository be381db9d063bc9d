//! Frame encoding and decoding for the BSB wire format
//!
//! Frame layout (after the physical inversion is undone):
//!
//! ```text
//! ┌──────┬─────────┬─────┬─────┬─────┬──────────┬─────────┬──────────┐
//! │ 0xDC │ SRC|80h │ DST │ LEN │ CMD │ FIELD ID │ PAYLOAD │ CRC16 BE │
//! │ 1B   │ 1B      │ 1B  │ 1B  │ 1B  │ 4B       │ 0-21B   │ 2B       │
//! └──────┴─────────┴─────┴─────┴─────┴──────────┴─────────┴──────────┘
//! ```
//!
//! `LEN` counts the whole frame including start byte and checksum.

use crate::core::{Address, Command, FieldId};
use crate::error::{BusError, Result};
use crate::packet::Packet;

/// Frame synchronization byte
pub const FRAME_START: u8 = 0xDC;

/// Bytes before the payload
pub const HEADER_LEN: usize = 9;

/// Trailing checksum bytes
pub const CRC_LEN: usize = 2;

/// Shortest legal frame (no payload)
pub const MIN_FRAME_LEN: usize = HEADER_LEN + CRC_LEN;

/// Longest legal frame
pub const MAX_FRAME_LEN: usize = 32;

/// Largest payload that fits in a frame
pub const MAX_PAYLOAD_LEN: usize = MAX_FRAME_LEN - MIN_FRAME_LEN;

/// Index of the length byte
pub const LENGTH_INDEX: usize = 3;

/// Physical-layer transform: every byte on the wire is inverted
pub struct WireTransform;

impl WireTransform {
    /// Invert a single byte
    pub fn invert_byte(byte: u8) -> u8 {
        byte ^ 0xFF
    }

    /// Invert a buffer in place
    pub fn invert(buffer: &mut [u8]) {
        for byte in buffer.iter_mut() {
            *byte ^= 0xFF;
        }
    }
}

/// CRC-16/XMODEM (poly 0x1021, init 0x0000)
pub fn crc16(bytes: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &b in bytes {
        crc ^= (b as u16) << 8;
        for _ in 0..8 {
            if (crc & 0x8000) != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

/// Frame encoder
pub struct FrameEncoder;

impl FrameEncoder {
    /// Encode a packet into a logical (non-inverted) frame
    pub fn encode(packet: &Packet) -> Result<Vec<u8>> {
        if packet.payload.len() > MAX_PAYLOAD_LEN {
            return Err(BusError::invalid_length(format!(
                "Payload of {} bytes exceeds maximum of {}",
                packet.payload.len(),
                MAX_PAYLOAD_LEN
            )));
        }

        let frame_len = MIN_FRAME_LEN + packet.payload.len();
        let mut frame = Vec::with_capacity(frame_len);
        frame.push(FRAME_START);
        frame.push(packet.source.to_source_byte());
        frame.push(packet.destination.to_destination_byte());
        frame.push(frame_len as u8);
        frame.push(packet.command.code());
        frame.extend_from_slice(&packet.field_id.to_wire(packet.command));
        frame.extend_from_slice(&packet.payload);

        let crc = crc16(&frame);
        frame.extend_from_slice(&crc.to_be_bytes());

        Ok(frame)
    }

    /// Encode a packet and apply the wire transform, ready for transmission
    pub fn encode_for_wire(packet: &Packet) -> Result<Vec<u8>> {
        let mut frame = Self::encode(packet)?;
        WireTransform::invert(&mut frame);
        Ok(frame)
    }
}

/// Frame decoder
pub struct FrameDecoder;

impl FrameDecoder {
    /// Decode one complete logical (non-inverted) frame
    pub fn decode(frame: &[u8]) -> Result<Packet> {
        if frame.len() < MIN_FRAME_LEN {
            return Err(BusError::invalid_length(format!(
                "Expected at least {} bytes, got {}",
                MIN_FRAME_LEN,
                frame.len()
            )));
        }

        if frame[0] != FRAME_START {
            return Err(BusError::invalid_frame(format!(
                "Expected start byte {:#04X}, got {:#04X}",
                FRAME_START, frame[0]
            )));
        }

        let declared = frame[LENGTH_INDEX] as usize;
        if declared != frame.len() || declared > MAX_FRAME_LEN {
            return Err(BusError::invalid_length(format!(
                "Length byte says {}, frame has {}",
                declared,
                frame.len()
            )));
        }

        let body_len = frame.len() - CRC_LEN;
        let expected = crc16(&frame[..body_len]);
        let actual = u16::from_be_bytes([frame[body_len], frame[body_len + 1]]);
        if expected != actual {
            return Err(BusError::ChecksumMismatch { expected, actual });
        }

        let command = Command::try_from(frame[4])?;
        let field_id = FieldId::from_wire([frame[5], frame[6], frame[7], frame[8]], command);

        Ok(Packet::new(
            Address::from_wire(frame[1]),
            Address::from_wire(frame[2]),
            command,
            field_id,
            frame[HEADER_LEN..body_len].to_vec(),
        ))
    }
}

/// Encode a Get request frame, wire transform applied
pub fn encode_get(source: Address, destination: Address, field_id: FieldId) -> Result<Vec<u8>> {
    FrameEncoder::encode_for_wire(&Packet::get(source, destination, field_id))
}

/// Encode a Set request frame, wire transform applied
pub fn encode_set(
    source: Address,
    destination: Address,
    field_id: FieldId,
    value: &[u8],
    enable_byte: u8,
) -> Result<Vec<u8>> {
    FrameEncoder::encode_for_wire(&Packet::set(source, destination, field_id, value, enable_byte))
}
