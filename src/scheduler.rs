//! Per-tick choice of the next bus transaction
//!
//! At most one request leaves per decision, picked in a fixed priority
//! order: writable numbers (set before get), then selects, then sensors.
//! Within a registry points are scanned in registration order and the scan
//! stops at the first point that has something to send.
//!
//! Picking a request does not change the point. The caller sends it and
//! then [`Scheduler::commit`]s it, so a request that never reached the
//! wire is neither counted nor completed.

use crate::config::BusConfig;
use crate::core::Address;
use crate::dispatch::{publish_point, Publisher};
use crate::error::Result;
use crate::packet::Packet;
use crate::point::PointClass;
use crate::registry::{PointId, Registries};
use crate::retry::Operation;

/// A request picked for sending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Point the request was built for
    pub point: PointId,
    /// Read or write
    pub operation: Operation,
    /// The request itself
    pub packet: Packet,
}

/// Decision state carried between ticks
#[derive(Debug, Clone)]
pub struct Scheduler {
    source: Address,
    destination: Address,
    query_interval_ms: u64,
    get_after_set_delay_ms: u64,
    next_query_at: u64,
}

impl Scheduler {
    /// Create a scheduler whose first decision is due immediately
    pub fn new(config: &BusConfig) -> Result<Self> {
        Ok(Scheduler {
            source: config.source()?,
            destination: config.destination()?,
            query_interval_ms: config.query_interval_ms,
            get_after_set_delay_ms: config.get_after_set_delay_ms,
            next_query_at: 0,
        })
    }

    /// Earliest time of the next decision
    pub fn next_query_at(&self) -> u64 {
        self.next_query_at
    }

    /// Whether a decision is due at `now`
    pub fn is_due(&self, now: u64) -> bool {
        now >= self.next_query_at
    }

    /// Pick the request to send at `now`, if any
    pub fn poll(&mut self, now: u64, points: &mut Registries) -> Option<Transaction> {
        if !self.is_due(now) {
            return None;
        }
        self.next_query_at = now.saturating_add(self.query_interval_ms);

        self.poll_writable(PointClass::Number, now, points)
            .or_else(|| self.poll_writable(PointClass::Select, now, points))
            .or_else(|| self.poll_sensors(now, points))
    }

    /// Record a request that reached the wire
    ///
    /// The attempt is counted. A broadcast write completes here: the point
    /// is marked clean and its value published. Other writes schedule the
    /// read-back after the verify delay.
    pub fn commit(
        &self,
        transaction: &Transaction,
        now: u64,
        points: &mut Registries,
        publisher: &mut dyn Publisher,
    ) {
        let Some(point) = points.get_mut(transaction.point) else {
            return;
        };
        point.record_attempt(transaction.operation);
        if transaction.operation == Operation::Set {
            if point.is_broadcast() {
                point.reset_dirty();
                publish_point(publisher, transaction.point, point);
            } else {
                point.schedule_next_update(now, self.get_after_set_delay_ms);
            }
        }
    }

    fn poll_writable(
        &self,
        class: PointClass,
        now: u64,
        points: &mut Registries,
    ) -> Option<Transaction> {
        for (index, point) in points.by_class_mut(class).iter_mut() {
            let id = PointId::new(class, index);
            if point.is_ready_to_set(now) {
                return Some(Transaction {
                    point: id,
                    operation: Operation::Set,
                    packet: point.create_request_set(self.source, self.destination)?,
                });
            }
            if point.is_ready_to_update(now) {
                return Some(Transaction {
                    point: id,
                    operation: Operation::Get,
                    packet: point.create_request_get(self.source, self.destination),
                });
            }
        }
        None
    }

    fn poll_sensors(&self, now: u64, points: &mut Registries) -> Option<Transaction> {
        points.sensors.iter_mut().find_map(|(index, point)| {
            point.is_ready(now).then(|| Transaction {
                point: PointId::new(PointClass::Sensor, index),
                operation: Operation::Get,
                packet: point.create_request_get(self.source, self.destination),
            })
        })
    }
}
