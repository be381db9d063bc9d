//! # BSB Engine
//!
//! A polling and transaction engine for the BSB bus, the half-duplex
//! two-wire serial bus spoken by many heating controllers.
//!
//! The engine sits between a serial port and a presentation layer. It
//! provides:
//!
//! - Frame encoding/decoding, including the inverted physical layer and CRC
//! - A receive assembler that resynchronizes on corrupted input
//! - Data points (sensors, numbers, switches, selects) with per-kind decoding
//! - A priority scheduler issuing at most one request per tick
//! - Retry and backoff bookkeeping for reads and writes
//!
//! ## Features
//!
//! - `serde`: Enable serialization/deserialization support and JSON configuration
//!
//! ## Example
//!
//! ```
//! use bsb_engine::{BusConfig, BusController, DataPoint, Publication, ValueKind};
//!
//! let mut bus = BusController::new(BusConfig::default())?;
//! let outside = bus.register(DataPoint::sensor(0x0D3D_0519u32, ValueKind::Temperature));
//!
//! let mut wire: Vec<u8> = Vec::new();
//! let mut published: Vec<Publication> = Vec::new();
//! let request = bus.tick(0, &mut wire, &mut published)?;
//! assert!(request.is_some());
//! assert!(bus.point(outside).is_some());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod assembler;
pub mod config;
pub mod core;
pub mod dispatch;
pub mod encoding;
pub mod error;
pub mod packet;
pub mod point;
pub mod protocol;
pub mod registry;
pub mod retry;
pub mod scheduler;
pub mod value;

pub use assembler::ReceiveAssembler;
pub use config::BusConfig;
pub use core::{Address, Command, FieldId};
pub use dispatch::{Dispatcher, NullPublisher, Publication, Publisher};
pub use error::{BusError, Result};
pub use packet::Packet;
pub use point::{DataPoint, PointClass, PointKind};
pub use protocol::{BusController, BusControllerBuilder, BusStats};
pub use registry::PointId;
pub use retry::{Operation, RetryPolicy, RetryState};
pub use value::{PointValue, Scale, ValueKind};

/// BSB protocol constants
pub mod bsb {
    /// Highest bus address
    pub const MAX_ADDRESS: u8 = crate::core::Address::MAX;

    /// Longest telegram in bytes
    pub const MAX_FRAME_LEN: usize = crate::encoding::MAX_FRAME_LEN;
}
