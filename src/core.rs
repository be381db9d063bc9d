//! Core wire types for the BSB protocol

use crate::error::{BusError, Result};
use bitfield::bitfield;

bitfield! {
    /// Address byte as it appears on the wire
    ///
    /// Format:
    /// - Bit 7: marker, set on every transmitted source byte
    /// - Bits 6-0: station address
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct AddressByte(u8);
    impl Debug;
    u8;
    pub station, set_station: 6, 0;
    pub marker, set_marker: 7;
}

/// Bus station address (0-127)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Address(u8);

impl Address {
    /// Maximum address value
    pub const MAX: u8 = 0x7F;

    /// Create a new address, validating it fits in 7 bits
    pub fn new(addr: u8) -> Result<Self> {
        if addr > Self::MAX {
            return Err(BusError::invalid_address(format!(
                "Address {:#04X} out of range [0, {:#04X}]",
                addr,
                Self::MAX
            )));
        }
        Ok(Address(addr))
    }

    /// Get the raw address value
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Encode as a source byte (marker bit set)
    pub fn to_source_byte(self) -> u8 {
        let mut byte = AddressByte(0);
        byte.set_station(self.0);
        byte.set_marker(true);
        byte.0
    }

    /// Encode as a destination byte
    pub fn to_destination_byte(self) -> u8 {
        self.0
    }

    /// Decode either address byte, ignoring the marker bit
    pub fn from_wire(byte: u8) -> Self {
        Address(AddressByte(byte).station())
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02X}", self.0)
    }
}

/// Identifier of one logical data point on the remote device
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldId(u32);

impl FieldId {
    /// Create a field id from its canonical value
    pub const fn new(id: u32) -> Self {
        FieldId(id)
    }

    /// Get the canonical value
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Bytes as transmitted for `command`
    ///
    /// Request telegrams carry the two high bytes swapped.
    pub fn to_wire(self, command: Command) -> [u8; 4] {
        let mut bytes = self.0.to_be_bytes();
        if command.swaps_field_id() {
            bytes.swap(0, 1);
        }
        bytes
    }

    /// Canonical field id from the bytes of a `command` telegram
    pub fn from_wire(bytes: [u8; 4], command: Command) -> Self {
        let mut bytes = bytes;
        if command.swaps_field_id() {
            bytes.swap(0, 1);
        }
        FieldId(u32::from_be_bytes(bytes))
    }
}

impl From<u32> for FieldId {
    fn from(id: u32) -> Self {
        FieldId(id)
    }
}

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// Telegram command (message type)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Command {
    /// Request an information telegram
    QueryInf,
    /// Unsolicited information telegram carrying a value
    Inf,
    /// Write request from the controller
    Set,
    /// Positive acknowledgement of a Set
    Ack,
    /// Negative acknowledgement of a Set
    Nack,
    /// Read request from the controller
    Get,
    /// Response to a Get carrying a value
    Ret,
    /// Device reported an error for the request
    Fault,
}

impl Command {
    /// Wire code of the command
    pub fn code(&self) -> u8 {
        match self {
            Command::QueryInf => 0x01,
            Command::Inf => 0x02,
            Command::Set => 0x03,
            Command::Ack => 0x04,
            Command::Nack => 0x05,
            Command::Get => 0x06,
            Command::Ret => 0x07,
            Command::Fault => 0x08,
        }
    }

    /// Whether the field id travels with its two high bytes swapped
    pub fn swaps_field_id(&self) -> bool {
        matches!(self, Command::Get | Command::Set | Command::QueryInf)
    }

    /// Whether the telegram carries a value for the field
    pub fn carries_value(&self) -> bool {
        matches!(self, Command::Inf | Command::Ret)
    }

    /// Whether the telegram answers a Set
    pub fn is_acknowledgement(&self) -> bool {
        matches!(self, Command::Ack | Command::Nack)
    }
}

impl TryFrom<u8> for Command {
    type Error = BusError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x01 => Ok(Command::QueryInf),
            0x02 => Ok(Command::Inf),
            0x03 => Ok(Command::Set),
            0x04 => Ok(Command::Ack),
            0x05 => Ok(Command::Nack),
            0x06 => Ok(Command::Get),
            0x07 => Ok(Command::Ret),
            0x08 => Ok(Command::Fault),
            _ => Err(BusError::UnknownCommand(value)),
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Command::QueryInf => "QINF",
            Command::Inf => "INF",
            Command::Set => "SET",
            Command::Ack => "ACK",
            Command::Nack => "NACK",
            Command::Get => "GET",
            Command::Ret => "RET",
            Command::Fault => "ERR",
        };
        f.write_str(name)
    }
}
