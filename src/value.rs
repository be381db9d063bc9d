//! Value kinds and their on-wire representation

use crate::error::Result;
use crate::packet::{Packet, TEMPERATURE_DIVISOR};

/// How a field's value is laid out on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ValueKind {
    /// Unsigned byte
    UInt8,
    /// Signed byte
    Int8,
    /// Big-endian signed 16-bit integer
    Int16,
    /// Big-endian signed 32-bit integer
    Int32,
    /// Signed 16-bit count of 1/64 degree
    Temperature,
    /// Temperature that the controller broadcasts as an information telegram
    RoomTemperature,
}

impl ValueKind {
    /// Number of value bytes on the wire
    pub fn width(&self) -> usize {
        match self {
            ValueKind::UInt8 | ValueKind::Int8 => 1,
            ValueKind::Int16 | ValueKind::Temperature | ValueKind::RoomTemperature => 2,
            ValueKind::Int32 => 4,
        }
    }

    /// Whether the value is scaled by the temperature divisor
    pub fn is_temperature(&self) -> bool {
        matches!(self, ValueKind::Temperature | ValueKind::RoomTemperature)
    }

    /// Decode the value of an Inf/Ret packet in engineering units
    pub fn decode(&self, packet: &Packet) -> Result<f32> {
        Ok(match self {
            ValueKind::UInt8 => f32::from(packet.parse_as_uint8()?),
            ValueKind::Int8 => f32::from(packet.parse_as_int8()?),
            ValueKind::Int16 => f32::from(packet.parse_as_int16()?),
            ValueKind::Int32 => packet.parse_as_int32()? as f32,
            ValueKind::Temperature => packet.parse_as_temperature()?,
            ValueKind::RoomTemperature => packet.parse_as_room_temperature()?,
        })
    }

    /// Raw bit pattern of the value, zero-extended from its wire width
    pub fn decode_bits(&self, packet: &Packet) -> Result<u32> {
        Ok(match self {
            ValueKind::UInt8 | ValueKind::Int8 => u32::from(packet.parse_as_uint8()?),
            ValueKind::Int16 | ValueKind::Temperature => u32::from(packet.parse_as_int16()? as u16),
            ValueKind::RoomTemperature => u32::from(packet.parse_as_room_temperature_raw()? as u16),
            ValueKind::Int32 => packet.parse_as_int32()? as u32,
        })
    }

    /// Raw wire integer for a value in engineering units
    pub fn to_wire(&self, value: f32) -> i32 {
        let raw = if self.is_temperature() {
            value * TEMPERATURE_DIVISOR
        } else {
            value
        };
        let raw = raw.round();
        match self {
            ValueKind::UInt8 => raw.clamp(0.0, f32::from(u8::MAX)) as i32,
            ValueKind::Int8 => raw.clamp(f32::from(i8::MIN), f32::from(i8::MAX)) as i32,
            ValueKind::Int16 | ValueKind::Temperature | ValueKind::RoomTemperature => {
                raw.clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i32
            }
            ValueKind::Int32 => raw as i32,
        }
    }

    /// Big-endian value bytes for a raw wire integer
    pub fn encode(&self, raw: i32) -> Vec<u8> {
        let bytes = raw.to_be_bytes();
        bytes[bytes.len() - self.width()..].to_vec()
    }
}

/// Scaling applied between the decoded value and the published one
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scale {
    /// Multiplier applied on decode
    pub factor: f32,
    /// Divisor applied on decode
    pub divisor: f32,
}

impl Scale {
    /// Identity scaling
    pub const IDENTITY: Scale = Scale {
        factor: 1.0,
        divisor: 1.0,
    };

    /// `raw * factor / divisor`
    pub fn apply(&self, raw: f32) -> f32 {
        raw * self.factor / self.divisor
    }

    /// Inverse of [`Scale::apply`]
    pub fn invert(&self, value: f32) -> f32 {
        value * self.divisor / self.factor
    }
}

impl Default for Scale {
    fn default() -> Self {
        Scale::IDENTITY
    }
}

/// A value handed to the presentation layer
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PointValue {
    /// Numeric reading or setting
    Number(f32),
    /// On/off state
    Bool(bool),
    /// Free text
    Text(String),
    /// Selected enumeration option
    Choice(String),
}

impl std::fmt::Display for PointValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PointValue::Number(value) => write!(f, "{}", value),
            PointValue::Bool(true) => f.write_str("ON"),
            PointValue::Bool(false) => f.write_str("OFF"),
            PointValue::Text(text) | PointValue::Choice(text) => f.write_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Address, Command, FieldId};

    fn ret(payload: &[u8]) -> Packet {
        Packet::new(
            Address::new(0x00).unwrap(),
            Address::new(0x42).unwrap(),
            Command::Ret,
            FieldId::new(1),
            payload.to_vec(),
        )
    }

    #[test]
    fn test_widths() {
        assert_eq!(ValueKind::UInt8.width(), 1);
        assert_eq!(ValueKind::Temperature.width(), 2);
        assert_eq!(ValueKind::Int32.width(), 4);
    }

    #[test]
    fn test_decode_by_kind() -> Result<()> {
        let packet = ret(&[0x00, 0xFF, 0x38, 0x00, 0x00]);
        assert_eq!(ValueKind::UInt8.decode(&packet)?, 255.0);
        assert_eq!(ValueKind::Int8.decode(&packet)?, -1.0);
        assert_eq!(ValueKind::Int16.decode(&packet)?, -200.0);
        assert_eq!(ValueKind::Temperature.decode(&packet)?, -3.125);
        assert_eq!(ValueKind::Int32.decode(&packet)?, -13_107_200.0);
        Ok(())
    }

    #[test]
    fn test_decode_bits_keeps_wire_pattern() -> Result<()> {
        let packet = ret(&[0x00, 0xFF]);
        assert_eq!(ValueKind::Int8.decode_bits(&packet)?, 0xFF);
        let packet = ret(&[0x00, 0x80, 0x01]);
        assert_eq!(ValueKind::Int16.decode_bits(&packet)?, 0x8001);
        Ok(())
    }

    #[test]
    fn test_to_wire_and_encode() {
        assert_eq!(ValueKind::Temperature.to_wire(21.5), 1376);
        assert_eq!(ValueKind::Temperature.encode(1376), vec![0x05, 0x60]);
        assert_eq!(ValueKind::Int8.encode(-2), vec![0xFE]);
        assert_eq!(ValueKind::Int32.encode(65536), vec![0x00, 0x01, 0x00, 0x00]);
        assert_eq!(ValueKind::UInt8.to_wire(300.0), 255);
    }

    #[test]
    fn test_scale_inverts() {
        let scale = Scale {
            factor: 1.0,
            divisor: 10.0,
        };
        assert_eq!(scale.apply(215.0), 21.5);
        assert_eq!(scale.invert(21.5), 215.0);
    }

    #[test]
    fn test_point_value_display() {
        assert_eq!(PointValue::Bool(true).to_string(), "ON");
        assert_eq!(PointValue::Choice("Comfort".into()).to_string(), "Comfort");
    }
}
