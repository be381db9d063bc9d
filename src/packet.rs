//! Decoded telegrams and payload interpretation

use crate::core::{Address, Command, FieldId};
use crate::error::{BusError, Result};

/// Divisor of the on-wire temperature representation (1/64 degree steps)
pub const TEMPERATURE_DIVISOR: f32 = 64.0;

/// Offset of the first value byte in a value-carrying payload
///
/// Byte 0 of an Inf/Ret payload is a status flag.
const VALUE_OFFSET: usize = 1;

/// A single BSB telegram, without framing
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Packet {
    /// Station that sent the telegram
    pub source: Address,
    /// Station the telegram is addressed to
    pub destination: Address,
    /// Message type
    pub command: Command,
    /// Canonical field id
    pub field_id: FieldId,
    /// Operation-specific payload
    pub payload: Vec<u8>,
}

impl Packet {
    /// Create a packet from its parts
    pub fn new(
        source: Address,
        destination: Address,
        command: Command,
        field_id: FieldId,
        payload: Vec<u8>,
    ) -> Self {
        Packet {
            source,
            destination,
            command,
            field_id,
            payload,
        }
    }

    /// Read request for a field
    pub fn get(source: Address, destination: Address, field_id: FieldId) -> Self {
        Packet::new(source, destination, Command::Get, field_id, Vec::new())
    }

    /// Write request: the enable byte followed by the value bytes
    pub fn set(
        source: Address,
        destination: Address,
        field_id: FieldId,
        value: &[u8],
        enable_byte: u8,
    ) -> Self {
        let mut payload = Vec::with_capacity(value.len() + 1);
        payload.push(enable_byte);
        payload.extend_from_slice(value);
        Packet::new(source, destination, Command::Set, field_id, payload)
    }

    /// Information telegram carrying raw payload bytes
    pub fn inf(source: Address, destination: Address, field_id: FieldId, payload: &[u8]) -> Self {
        Packet::new(source, destination, Command::Inf, field_id, payload.to_vec())
    }

    /// Value bytes of an Inf/Ret payload, after the status flag
    fn value_bytes<const N: usize>(&self) -> Result<[u8; N]> {
        self.bytes_at(VALUE_OFFSET)
    }

    fn bytes_at<const N: usize>(&self, offset: usize) -> Result<[u8; N]> {
        self.payload
            .get(offset..offset + N)
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or_else(|| {
                BusError::insufficient_data(format!(
                    "{} needs {} value bytes, payload has {}",
                    self.field_id,
                    N,
                    self.payload.len().saturating_sub(offset)
                ))
            })
    }

    /// Interpret the value as an unsigned byte
    pub fn parse_as_uint8(&self) -> Result<u8> {
        Ok(u8::from_be_bytes(self.value_bytes::<1>()?))
    }

    /// Interpret the value as a signed byte
    pub fn parse_as_int8(&self) -> Result<i8> {
        Ok(i8::from_be_bytes(self.value_bytes::<1>()?))
    }

    /// Interpret the value as a big-endian signed 16-bit integer
    pub fn parse_as_int16(&self) -> Result<i16> {
        Ok(i16::from_be_bytes(self.value_bytes::<2>()?))
    }

    /// Interpret the value as a big-endian signed 32-bit integer
    pub fn parse_as_int32(&self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.value_bytes::<4>()?))
    }

    /// Interpret the value as a temperature in degrees
    pub fn parse_as_temperature(&self) -> Result<f32> {
        Ok(f32::from(self.parse_as_int16()?) / TEMPERATURE_DIVISOR)
    }

    /// Raw room temperature in 1/64 degree steps
    ///
    /// Room units send it as an Inf without the status flag: the value
    /// comes first, followed by a trailing 0x00.
    pub fn parse_as_room_temperature_raw(&self) -> Result<i16> {
        let offset = if self.command == Command::Inf { 0 } else { VALUE_OFFSET };
        Ok(i16::from_be_bytes(self.bytes_at::<2>(offset)?))
    }

    /// Interpret the value as a room temperature in degrees
    pub fn parse_as_room_temperature(&self) -> Result<f32> {
        Ok(f32::from(self.parse_as_room_temperature_raw()?) / TEMPERATURE_DIVISOR)
    }

    /// Interpret the whole payload as text, stopping at the first NUL
    pub fn parse_as_text(&self) -> String {
        let end = self
            .payload
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.payload.len());
        String::from_utf8_lossy(&self.payload[..end]).into_owned()
    }
}

impl std::fmt::Display for Packet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}->{} {} {}",
            self.source, self.destination, self.command, self.field_id
        )?;
        for byte in &self.payload {
            write!(f, " {:02X}", byte)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ret(payload: &[u8]) -> Packet {
        Packet::new(
            Address::new(0x00).unwrap(),
            Address::new(0x42).unwrap(),
            Command::Ret,
            FieldId::new(0x0D3D_0519),
            payload.to_vec(),
        )
    }

    #[test]
    fn test_set_payload_layout() -> Result<()> {
        let packet = Packet::set(
            Address::new(0x42)?,
            Address::new(0x00)?,
            FieldId::new(0x2D3D_058E),
            &[0x05, 0x00],
            0x01,
        );
        assert_eq!(packet.command, Command::Set);
        assert_eq!(packet.payload, vec![0x01, 0x05, 0x00]);
        Ok(())
    }

    #[test]
    fn test_parse_integers() -> Result<()> {
        assert_eq!(ret(&[0x00, 0xFE]).parse_as_uint8()?, 0xFE);
        assert_eq!(ret(&[0x00, 0xFE]).parse_as_int8()?, -2);
        assert_eq!(ret(&[0x00, 0xFF, 0x38]).parse_as_int16()?, -200);
        assert_eq!(ret(&[0x00, 0x00, 0x01, 0x00, 0x00]).parse_as_int32()?, 65536);
        Ok(())
    }

    #[test]
    fn test_parse_temperature() -> Result<()> {
        // 21.5 degrees = 1376 / 64
        assert_eq!(ret(&[0x00, 0x05, 0x60]).parse_as_temperature()?, 21.5);
        assert_eq!(ret(&[0x00, 0xFF, 0xC0]).parse_as_temperature()?, -1.0);
        Ok(())
    }

    #[test]
    fn test_parse_room_temperature() -> Result<()> {
        let inf = Packet::inf(
            Address::new(0x42)?,
            Address::new(0x00)?,
            FieldId::new(0x2D3D_0215),
            &[0x04, 0xE0, 0x00],
        );
        assert_eq!(inf.parse_as_room_temperature()?, 19.5);
        assert_eq!(ret(&[0x00, 0x04, 0xE0]).parse_as_room_temperature()?, 19.5);
        Ok(())
    }

    #[test]
    fn test_parse_short_payload() {
        let err = ret(&[0x00, 0x05]).parse_as_int16().unwrap_err();
        assert!(matches!(err, BusError::InsufficientData(_)));
        assert!(ret(&[]).parse_as_uint8().is_err());
    }

    #[test]
    fn test_parse_text() {
        assert_eq!(ret(b"RVS43.222\0\0\0").parse_as_text(), "RVS43.222");
        assert_eq!(ret(b"").parse_as_text(), "");
        assert_eq!(ret(b" 20C \0").parse_as_text(), " 20C ");
    }

    #[test]
    fn test_display() -> Result<()> {
        let packet = Packet::get(
            Address::new(0x42)?,
            Address::new(0x00)?,
            FieldId::new(0x3D2D_0215),
        );
        assert_eq!(packet.to_string(), "42->00 GET 0x3D2D0215");
        assert_eq!(ret(&[0x00, 0x14]).to_string(), "00->42 RET 0x0D3D0519 00 14");
        Ok(())
    }
}
