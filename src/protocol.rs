//! Bus controller: the engine's entry points
//!
//! The host calls [`BusController::feed`] with whatever bytes the serial
//! port has buffered and [`BusController::tick`] periodically with its
//! monotonic clock. Neither call blocks, and the host must not run them
//! concurrently.

use crate::assembler::ReceiveAssembler;
use crate::config::BusConfig;
use crate::dispatch::{publish_point, Dispatcher, Publisher};
use crate::encoding::{FrameEncoder, WireTransform};
use crate::error::{BusError, Result};
use crate::packet::Packet;
use crate::point::DataPoint;
use crate::registry::{PointId, Registries};
use crate::retry::RetryState;
use crate::scheduler::Scheduler;
use crate::value::PointValue;
use std::io::Write;
use tracing::{debug, info};

/// Traffic counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BusStats {
    /// Requests written to the bus
    pub frames_sent: u32,
    /// Frames decoded from the bus
    pub frames_received: u32,
    /// Candidate frames rejected by the assembler
    pub frames_dropped: u32,
    /// Inbound bytes skipped while resynchronizing
    pub bytes_discarded: u32,
    /// Times any point reached its retry ceiling
    pub exhaustions: u32,
    /// Registered points
    pub points: usize,
}

/// Polling and transaction engine for one bus
#[derive(Debug)]
pub struct BusController {
    config: BusConfig,
    points: Registries,
    scheduler: Scheduler,
    assembler: ReceiveAssembler,
    frames_sent: u32,
}

impl BusController {
    /// Create a controller with no points
    pub fn new(config: BusConfig) -> Result<Self> {
        config.validate()?;
        Ok(BusController {
            scheduler: Scheduler::new(&config)?,
            config,
            points: Registries::default(),
            assembler: ReceiveAssembler::new(),
            frames_sent: 0,
        })
    }

    /// Start building a controller
    pub fn builder() -> BusControllerBuilder {
        BusControllerBuilder::new()
    }

    /// Configuration in effect
    pub fn config(&self) -> &BusConfig {
        &self.config
    }

    /// Register a point; several points may share a field id
    pub fn register(&mut self, mut point: DataPoint) -> PointId {
        point.set_retry_policy(self.config.retry_policy());
        self.points.register(point)
    }

    /// Look up a registered point
    pub fn point(&self, id: PointId) -> Option<&DataPoint> {
        self.points.get(id)
    }

    /// All registered points
    pub fn points(&self) -> &Registries {
        &self.points
    }

    /// Consume inbound bytes as read from the wire
    ///
    /// Returns the number of packets decoded.
    pub fn feed(&mut self, bytes: &[u8], now: u64, publisher: &mut dyn Publisher) -> usize {
        let points = &mut self.points;
        let mut decoded = 0;
        let mut on_packet = |packet: Packet| {
            debug!("<<< {}", packet);
            decoded += 1;
            Dispatcher::dispatch(&packet, now, points, publisher);
        };
        for &byte in bytes {
            self.assembler.push(WireTransform::invert_byte(byte), &mut on_packet);
        }
        decoded
    }

    /// Run one scheduler decision, writing at most one request to `out`
    ///
    /// Returns the request that was sent. When the write fails the point
    /// is left as it was: the attempt is not counted and a broadcast write
    /// stays pending.
    pub fn tick<W: Write>(
        &mut self,
        now: u64,
        out: &mut W,
        publisher: &mut dyn Publisher,
    ) -> Result<Option<Packet>> {
        let Some(transaction) = self.scheduler.poll(now, &mut self.points) else {
            return Ok(None);
        };
        let frame = FrameEncoder::encode_for_wire(&transaction.packet)?;
        out.write_all(&frame)?;
        debug!(">>> {}", transaction.packet);
        self.frames_sent += 1;
        self.scheduler.commit(&transaction, now, &mut self.points, publisher);
        Ok(Some(transaction.packet))
    }

    /// Queue a write of a number and publish it optimistically
    pub fn request_number(
        &mut self,
        id: PointId,
        value: f32,
        publisher: &mut dyn Publisher,
    ) -> Result<()> {
        self.request(id, publisher, |point| point.request_number(value).map(Some))
    }

    /// Queue a write of a switch state and publish it optimistically
    pub fn request_switch(
        &mut self,
        id: PointId,
        on: bool,
        publisher: &mut dyn Publisher,
    ) -> Result<()> {
        self.request(id, publisher, |point| point.request_switch(on).map(Some))
    }

    /// Queue a write of a select option and publish it optimistically
    ///
    /// Unknown options are logged and ignored; nothing is queued or published.
    pub fn request_option(
        &mut self,
        id: PointId,
        option: &str,
        publisher: &mut dyn Publisher,
    ) -> Result<()> {
        self.request(id, publisher, |point| point.request_option(option))
    }

    fn request<F>(&mut self, id: PointId, publisher: &mut dyn Publisher, queue: F) -> Result<()>
    where
        F: FnOnce(&mut DataPoint) -> Result<Option<PointValue>>,
    {
        let point = self
            .points
            .get_mut(id)
            .ok_or_else(|| BusError::unknown_point(id.to_string()))?;
        let Some(value) = queue(point)? else {
            return Ok(());
        };
        debug!(field_id = %point.field_id(), %value, "write queued");
        publish_point(publisher, id, point);
        Ok(())
    }

    /// Counters since construction
    pub fn stats(&self) -> BusStats {
        let assembler = self.assembler.stats();
        let exhaustions: u32 = self
            .points
            .iter()
            .map(|(_, point)| {
                point.get_retry().exhaustions()
                    + point.set_retry().map_or(0, RetryState::exhaustions)
            })
            .sum();
        BusStats {
            frames_sent: self.frames_sent,
            frames_received: assembler.frames_decoded,
            frames_dropped: assembler.frames_dropped,
            bytes_discarded: assembler.bytes_discarded,
            exhaustions,
            points: self.points.len(),
        }
    }

    /// Log the configuration and every registered point
    pub fn log_config(&self) {
        info!(
            source = %format!("{:02X}", self.config.source_address),
            destination = %format!("{:02X}", self.config.destination_address),
            query_interval_ms = self.config.query_interval_ms,
            retry_interval_ms = self.config.retry_interval_ms,
            retry_ceiling = self.config.retry_ceiling,
            get_after_set_delay_ms = self.config.get_after_set_delay_ms,
            "bus"
        );
        for (id, point) in self.points.iter() {
            debug!(point = %id, "registered");
            point.log_config();
        }
    }
}

/// Builder for a [`BusController`]
pub struct BusControllerBuilder {
    config: BusConfig,
    points: Vec<DataPoint>,
}

impl BusControllerBuilder {
    /// Start from the default configuration
    pub fn new() -> Self {
        BusControllerBuilder {
            config: BusConfig::default(),
            points: Vec::new(),
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: BusConfig) -> Self {
        self.config = config;
        self
    }

    /// Set our own bus address
    pub fn with_source_address(mut self, address: u8) -> Self {
        self.config.source_address = address;
        self
    }

    /// Set the address of the device polled
    pub fn with_destination_address(mut self, address: u8) -> Self {
        self.config.destination_address = address;
        self
    }

    /// Set the minimum time between scheduler decisions
    pub fn with_query_interval(mut self, interval_ms: u64) -> Self {
        self.config.query_interval_ms = interval_ms;
        self
    }

    /// Set the wait after retries are exhausted
    pub fn with_retry_interval(mut self, interval_ms: u64) -> Self {
        self.config.retry_interval_ms = interval_ms;
        self
    }

    /// Set the attempts allowed before waiting
    pub fn with_retry_ceiling(mut self, ceiling: u8) -> Self {
        self.config.retry_ceiling = ceiling;
        self
    }

    /// Set the delay before reading back a written value
    pub fn with_get_after_set_delay(mut self, delay_ms: u64) -> Self {
        self.config.get_after_set_delay_ms = delay_ms;
        self
    }

    /// Register a point when the controller is built
    pub fn with_point(mut self, point: DataPoint) -> Self {
        self.points.push(point);
        self
    }

    /// Validate the configuration and build the controller
    pub fn build(self) -> Result<BusController> {
        let mut controller = BusController::new(self.config)?;
        for point in self.points {
            controller.register(point);
        }
        Ok(controller)
    }
}

impl Default for BusControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
