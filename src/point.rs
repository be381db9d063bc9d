//! Data points: one observed or controlled field of the remote device
//!
//! A [`DataPoint`] is a shared scheduling base (field id, update interval,
//! get-retry state) plus a [`PointKind`] carrying the kind-specific decode
//! rules. Writable kinds additionally carry a [`WriteState`].

use crate::core::{Address, FieldId};
use crate::error::{BusError, Result};
use crate::packet::Packet;
use crate::retry::{Operation, RetryPolicy, RetryState};
use crate::value::{PointValue, Scale, ValueKind};
use std::collections::{BTreeMap, HashMap};
use tracing::{info, warn};

/// Poll interval used when a point does not configure one (15 minutes)
pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 15 * 60 * 1000;

/// Selector byte sent ahead of the value in a Set
pub const DEFAULT_ENABLE_BYTE: u8 = 0x01;

/// Registry a point belongs to; also its scheduling priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointClass {
    /// Writable numbers and switches, scanned first
    Number,
    /// Enumerated selects, scanned second
    Select,
    /// Read-only sensors, scanned last
    Sensor,
}

/// Bidirectional mapping between wire values and option labels
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionMap {
    by_value: BTreeMap<i8, String>,
    by_label: HashMap<String, i8>,
}

impl OptionMap {
    /// Add or replace a mapping
    pub fn insert(&mut self, value: i8, label: impl Into<String>) {
        let label = label.into();
        if let Some(old) = self.by_value.insert(value, label.clone()) {
            self.by_label.remove(&old);
        }
        self.by_label.insert(label, value);
    }

    /// Label for a wire value
    pub fn label(&self, value: i8) -> Option<&str> {
        self.by_value.get(&value).map(String::as_str)
    }

    /// Wire value for a label
    pub fn value(&self, label: &str) -> Option<i8> {
        self.by_label.get(label).copied()
    }

    /// Whether any mapping is configured
    pub fn is_empty(&self) -> bool {
        self.by_value.is_empty()
    }

    /// Labels in wire-value order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.by_value.values().map(String::as_str)
    }
}

/// Kind-specific configuration of a point
#[derive(Debug, Clone, PartialEq)]
pub enum PointKind {
    /// Numeric reading
    Sensor { kind: ValueKind, scale: Scale },
    /// Text reading, optionally mapped from an enumeration
    TextSensor { options: OptionMap },
    /// On/off reading
    BinarySensor { kind: ValueKind, on_value: u8, off_value: u8 },
    /// Writable numeric setting
    Number { kind: ValueKind, scale: Scale, broadcast: bool },
    /// Writable on/off setting
    Switch { on_value: u8, off_value: u8 },
    /// Writable enumerated setting
    Select { options: OptionMap },
}

impl PointKind {
    /// Registry this kind is kept in
    pub fn class(&self) -> PointClass {
        match self {
            PointKind::Sensor { .. }
            | PointKind::TextSensor { .. }
            | PointKind::BinarySensor { .. } => PointClass::Sensor,
            PointKind::Number { .. } | PointKind::Switch { .. } => PointClass::Number,
            PointKind::Select { .. } => PointClass::Select,
        }
    }

    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            PointKind::Sensor { .. } => "Sensor",
            PointKind::TextSensor { .. } => "Text Sensor",
            PointKind::BinarySensor { .. } => "Binary Sensor",
            PointKind::Number { .. } => "Number",
            PointKind::Switch { .. } => "Switch",
            PointKind::Select { .. } => "Select",
        }
    }
}

/// Pending-write bookkeeping of a writable point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteState {
    dirty: bool,
    pending_raw: i32,
    enable_byte: u8,
    set_retry: RetryState,
}

impl WriteState {
    fn new() -> Self {
        WriteState {
            dirty: false,
            pending_raw: 0,
            enable_byte: DEFAULT_ENABLE_BYTE,
            set_retry: RetryState::new(Operation::Set),
        }
    }

    fn queue(&mut self, raw: i32) {
        self.pending_raw = raw;
        self.dirty = true;
    }
}

/// One registered field representation
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    name: Option<String>,
    field_id: FieldId,
    update_interval_ms: u64,
    retry: RetryPolicy,
    get_retry: RetryState,
    write: Option<WriteState>,
    kind: PointKind,
    value: Option<PointValue>,
}

impl DataPoint {
    fn with_kind(field_id: impl Into<FieldId>, kind: PointKind) -> Self {
        let write = match kind.class() {
            PointClass::Sensor => None,
            PointClass::Number | PointClass::Select => Some(WriteState::new()),
        };
        DataPoint {
            name: None,
            field_id: field_id.into(),
            update_interval_ms: DEFAULT_UPDATE_INTERVAL_MS,
            retry: RetryPolicy::default(),
            get_retry: RetryState::new(Operation::Get),
            write,
            kind,
            value: None,
        }
    }

    /// Numeric sensor
    pub fn sensor(field_id: impl Into<FieldId>, kind: ValueKind) -> Self {
        Self::with_kind(
            field_id,
            PointKind::Sensor {
                kind,
                scale: Scale::IDENTITY,
            },
        )
    }

    /// Text sensor
    pub fn text_sensor(field_id: impl Into<FieldId>) -> Self {
        Self::with_kind(
            field_id,
            PointKind::TextSensor {
                options: OptionMap::default(),
            },
        )
    }

    /// Binary sensor, off = 0x00 and on = 0x01 unless configured otherwise
    pub fn binary_sensor(field_id: impl Into<FieldId>, kind: ValueKind) -> Self {
        Self::with_kind(
            field_id,
            PointKind::BinarySensor {
                kind,
                on_value: 0x01,
                off_value: 0x00,
            },
        )
    }

    /// Writable number
    pub fn number(field_id: impl Into<FieldId>, kind: ValueKind) -> Self {
        Self::with_kind(
            field_id,
            PointKind::Number {
                kind,
                scale: Scale::IDENTITY,
                broadcast: false,
            },
        )
    }

    /// Writable switch
    pub fn switch(field_id: impl Into<FieldId>) -> Self {
        Self::with_kind(
            field_id,
            PointKind::Switch {
                on_value: 0x01,
                off_value: 0x00,
            },
        )
    }

    /// Writable select
    pub fn select(field_id: impl Into<FieldId>) -> Self {
        Self::with_kind(
            field_id,
            PointKind::Select {
                options: OptionMap::default(),
            },
        )
    }

    /// Set a display name used in logs
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the regular poll interval
    pub fn with_update_interval(mut self, interval_ms: u64) -> Self {
        self.update_interval_ms = interval_ms;
        self
    }

    /// Set `factor` and `divisor` of numeric kinds
    pub fn with_scale(mut self, factor: f32, divisor: f32) -> Self {
        if let PointKind::Sensor { scale, .. } | PointKind::Number { scale, .. } = &mut self.kind {
            *scale = Scale { factor, divisor };
        }
        self
    }

    /// Set the on/off constants of binary sensors and switches
    pub fn with_on_off(mut self, on: u8, off: u8) -> Self {
        if let PointKind::BinarySensor {
            on_value, off_value, ..
        }
        | PointKind::Switch { on_value, off_value } = &mut self.kind
        {
            *on_value = on;
            *off_value = off;
        }
        self
    }

    /// Map a wire value to an option label (text sensors and selects)
    pub fn with_option(mut self, value: i8, label: impl Into<String>) -> Self {
        if let PointKind::TextSensor { options } | PointKind::Select { options } = &mut self.kind {
            options.insert(value, label);
        }
        self
    }

    /// Mark a number as fire-and-forget: writes are not acknowledged and it is never polled
    pub fn with_broadcast(mut self, enabled: bool) -> Self {
        if let PointKind::Number { broadcast, .. } = &mut self.kind {
            *broadcast = enabled;
        }
        self
    }

    /// Set the selector byte sent ahead of written values
    pub fn with_enable_byte(mut self, byte: u8) -> Self {
        if let Some(write) = &mut self.write {
            write.enable_byte = byte;
        }
        self
    }

    /// Replace the retry limits
    pub fn set_retry_policy(&mut self, policy: RetryPolicy) {
        self.retry = policy;
    }

    /// Display name, if configured
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Field this point observes
    pub fn field_id(&self) -> FieldId {
        self.field_id
    }

    /// Kind-specific configuration
    pub fn kind(&self) -> &PointKind {
        &self.kind
    }

    /// Registry the point belongs to
    pub fn class(&self) -> PointClass {
        self.kind.class()
    }

    /// Regular poll interval
    pub fn update_interval_ms(&self) -> u64 {
        self.update_interval_ms
    }

    /// Retry limits in effect
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Get-retry state
    pub fn get_retry(&self) -> &RetryState {
        &self.get_retry
    }

    /// Set-retry state, for writable kinds
    pub fn set_retry(&self) -> Option<&RetryState> {
        self.write.as_ref().map(|w| &w.set_retry)
    }

    /// Time of the next regular poll
    pub fn next_update_at(&self) -> u64 {
        self.get_retry.next_eligible_at()
    }

    /// Last decoded or requested value
    pub fn value(&self) -> Option<&PointValue> {
        self.value.as_ref()
    }

    /// Whether a write is waiting for acknowledgement
    pub fn is_dirty(&self) -> bool {
        self.write.as_ref().is_some_and(|w| w.dirty)
    }

    /// Raw wire value queued for writing
    pub fn pending_raw(&self) -> Option<i32> {
        self.write.as_ref().map(|w| w.pending_raw)
    }

    /// Whether the point accepts write intents
    pub fn is_writable(&self) -> bool {
        self.write.is_some()
    }

    /// Whether writes complete without acknowledgement
    pub fn is_broadcast(&self) -> bool {
        matches!(self.kind, PointKind::Number { broadcast: true, .. })
    }

    /// Whether a Get may be sent (read-only sensors)
    pub fn is_ready(&mut self, now: u64) -> bool {
        self.get_retry.is_eligible(now, &self.retry, self.field_id)
    }

    /// Whether a Get may be sent (writable kinds; broadcast numbers are never polled)
    pub fn is_ready_to_update(&mut self, now: u64) -> bool {
        !self.is_broadcast() && self.get_retry.is_eligible(now, &self.retry, self.field_id)
    }

    /// Whether a queued write may be sent
    pub fn is_ready_to_set(&mut self, now: u64) -> bool {
        let (retry, field_id) = (&self.retry, self.field_id);
        match &mut self.write {
            Some(write) if write.dirty => write.set_retry.is_eligible(now, retry, field_id),
            _ => false,
        }
    }

    /// A fresh value arrived: clear get attempts and poll again after the update interval
    pub fn schedule_next_regular_update(&mut self, now: u64) {
        self.schedule_next_update(now, self.update_interval_ms);
    }

    /// Clear get attempts and poll again after `interval_ms`
    pub fn schedule_next_update(&mut self, now: u64, interval_ms: u64) {
        self.get_retry.record_success();
        self.get_retry.schedule(now.saturating_add(interval_ms));
    }

    /// Build a Get request
    pub fn create_request_get(&self, source: Address, destination: Address) -> Packet {
        Packet::get(source, destination, self.field_id)
    }

    /// Build the request carrying the queued value
    ///
    /// Room temperatures go out as an information telegram; everything
    /// else is a Set with the enable byte in front of the value.
    pub fn create_request_set(&self, source: Address, destination: Address) -> Option<Packet> {
        let write = self.write.as_ref()?;
        let raw = write.pending_raw;
        let packet = match &self.kind {
            PointKind::Number {
                kind: ValueKind::RoomTemperature,
                ..
            } => {
                let mut payload = ValueKind::RoomTemperature.encode(raw);
                payload.push(0x00);
                Packet::inf(source, destination, self.field_id, &payload)
            }
            PointKind::Number { kind, .. } => Packet::set(
                source,
                destination,
                self.field_id,
                &kind.encode(raw),
                write.enable_byte,
            ),
            PointKind::Switch { .. } => {
                Packet::set(source, destination, self.field_id, &[raw as u8], write.enable_byte)
            }
            PointKind::Select { .. } => Packet::set(
                source,
                destination,
                self.field_id,
                &[raw as i8 as u8],
                write.enable_byte,
            ),
            _ => return None,
        };
        Some(packet)
    }

    /// Count a request that reached the wire
    pub fn record_attempt(&mut self, operation: Operation) {
        match (operation, &mut self.write) {
            (Operation::Get, _) => self.get_retry.record_attempt(),
            (Operation::Set, Some(write)) => write.set_retry.record_attempt(),
            (Operation::Set, None) => {}
        }
    }

    /// The write was acknowledged (positively or not): stop sending it
    pub fn reset_dirty(&mut self) {
        if let Some(write) = &mut self.write {
            write.dirty = false;
            write.set_retry.record_success();
        }
    }

    /// Decode a value-carrying packet into this point
    ///
    /// Returns the value to publish, or `None` when the payload does not
    /// decode for this point (short payload, unmapped select value).
    pub fn apply_packet(&mut self, packet: &Packet) -> Option<PointValue> {
        match self.decode(packet) {
            Ok(Some(value)) => {
                self.value = Some(value.clone());
                Some(value)
            }
            Ok(None) => None,
            Err(err) => {
                warn!(field_id = %self.field_id, error = %err, "cannot decode value");
                None
            }
        }
    }

    fn decode(&self, packet: &Packet) -> Result<Option<PointValue>> {
        let value = match &self.kind {
            PointKind::Sensor { kind, scale } | PointKind::Number { kind, scale, .. } => {
                PointValue::Number(scale.apply(kind.decode(packet)?))
            }
            PointKind::TextSensor { options } if !options.is_empty() => {
                let raw = packet.parse_as_int8()?;
                PointValue::Text(
                    options
                        .label(raw)
                        .map(str::to_string)
                        .unwrap_or_else(|| raw.to_string()),
                )
            }
            PointKind::TextSensor { .. } => PointValue::Text(packet.parse_as_text()),
            PointKind::BinarySensor { kind, off_value, .. } => {
                PointValue::Bool(kind.decode_bits(packet)? != u32::from(*off_value))
            }
            PointKind::Switch { off_value, .. } => {
                PointValue::Bool(packet.parse_as_uint8()? != *off_value)
            }
            PointKind::Select { options } => {
                let raw = packet.parse_as_int8()?;
                match options.label(raw) {
                    Some(label) => PointValue::Choice(label.to_string()),
                    None => {
                        warn!(field_id = %self.field_id, value = raw, "unknown select value");
                        return Ok(None);
                    }
                }
            }
        };
        Ok(Some(value))
    }

    /// Current value for the presentation layer
    pub fn publish(&self) -> Option<PointValue> {
        self.value.clone()
    }

    /// Queue a numeric write; returns the optimistic value to publish
    pub fn request_number(&mut self, value: f32) -> Result<PointValue> {
        let raw = match &self.kind {
            PointKind::Number { kind, scale, .. } => kind.to_wire(scale.invert(value)),
            other => return Err(self.not_writable(other.name(), "number")),
        };
        self.queue_write(raw, PointValue::Number(value))
    }

    /// Queue a switch write; returns the optimistic value to publish
    pub fn request_switch(&mut self, on: bool) -> Result<PointValue> {
        let raw = match &self.kind {
            PointKind::Switch { on_value, off_value } => {
                i32::from(if on { *on_value } else { *off_value })
            }
            other => return Err(self.not_writable(other.name(), "switch")),
        };
        self.queue_write(raw, PointValue::Bool(on))
    }

    /// Queue a select write by option label; returns the optimistic value to publish
    ///
    /// Unknown labels are logged and ignored: `Ok(None)`, the point is untouched.
    pub fn request_option(&mut self, option: &str) -> Result<Option<PointValue>> {
        let raw = match &self.kind {
            PointKind::Select { options } => match options.value(option) {
                Some(value) => i32::from(value),
                None => {
                    warn!(field_id = %self.field_id, option, "unknown select option");
                    return Ok(None);
                }
            },
            other => return Err(self.not_writable(other.name(), "select")),
        };
        self.queue_write(raw, PointValue::Choice(option.to_string())).map(Some)
    }

    fn queue_write(&mut self, raw: i32, value: PointValue) -> Result<PointValue> {
        let write = self
            .write
            .as_mut()
            .ok_or_else(|| BusError::not_writable(self.field_id.to_string()))?;
        write.queue(raw);
        self.value = Some(value.clone());
        Ok(value)
    }

    fn not_writable(&self, kind: &str, wanted: &str) -> BusError {
        BusError::not_writable(format!("{} {} is not a {}", kind, self.field_id, wanted))
    }

    /// Log this point's configuration
    pub fn log_config(&self) {
        info!(
            kind = self.kind.name(),
            name = self.name.as_deref().unwrap_or(""),
            field_id = %self.field_id,
            update_interval_s = self.update_interval_ms as f64 / 1000.0,
            "point"
        );
        match &self.kind {
            PointKind::Sensor { scale, kind } => {
                info!(
                    value_kind = ?kind,
                    factor = scale.factor,
                    divisor = scale.divisor,
                    "  scaling"
                )
            }
            PointKind::Number {
                kind,
                scale,
                broadcast,
            } => info!(
                value_kind = ?kind,
                factor = scale.factor,
                divisor = scale.divisor,
                broadcast,
                "  scaling"
            ),
            PointKind::BinarySensor {
                on_value, off_value, ..
            }
            | PointKind::Switch { on_value, off_value } => {
                info!(
                    on_value = %format!("{:02X}", on_value),
                    off_value = %format!("{:02X}", off_value),
                    "  constants"
                )
            }
            PointKind::TextSensor { options } | PointKind::Select { options } => {
                info!(options = ?options.labels().collect::<Vec<_>>(), "  options")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Command;

    fn addr(value: u8) -> Address {
        Address::new(value).unwrap()
    }

    fn value_packet(field: u32, payload: &[u8]) -> Packet {
        Packet::new(addr(0x00), addr(0x42), Command::Ret, FieldId::new(field), payload.to_vec())
    }

    fn apply_byte(point: &mut DataPoint, byte: u8) -> Option<PointValue> {
        point.apply_packet(&value_packet(1, &[0x00, byte]))
    }

    #[test]
    fn test_sensor_scaling() {
        let mut point = DataPoint::sensor(0x0D3D_0519u32, ValueKind::Int16).with_scale(1.0, 10.0);
        let value = point.apply_packet(&value_packet(0x0D3D_0519, &[0x00, 0x00, 0xD7]));
        assert_eq!(value, Some(PointValue::Number(21.5)));
        assert_eq!(point.publish(), Some(PointValue::Number(21.5)));
    }

    #[test]
    fn test_binary_decode_uses_off_constant() {
        let mut point = DataPoint::binary_sensor(1u32, ValueKind::UInt8);
        assert_eq!(apply_byte(&mut point, 0x00), Some(PointValue::Bool(false)));
        assert_eq!(apply_byte(&mut point, 0x01), Some(PointValue::Bool(true)));
        assert_eq!(apply_byte(&mut point, 0xFF), Some(PointValue::Bool(true)));
    }

    #[test]
    fn test_binary_decode_is_not_equality_with_on() {
        let mut point = DataPoint::binary_sensor(1u32, ValueKind::Int8).with_on_off(0x01, 0xFF);
        assert_eq!(apply_byte(&mut point, 0xFF), Some(PointValue::Bool(false)));
        assert_eq!(apply_byte(&mut point, 0x07), Some(PointValue::Bool(true)));
    }

    #[test]
    fn test_text_sensor_mapping_with_fallback() {
        let mut point = DataPoint::text_sensor(1u32).with_option(2, "Comfort");
        assert_eq!(
            point.apply_packet(&value_packet(1, &[0x00, 0x02])),
            Some(PointValue::Text("Comfort".into()))
        );
        assert_eq!(
            point.apply_packet(&value_packet(1, &[0x00, 0x05])),
            Some(PointValue::Text("5".into()))
        );
    }

    #[test]
    fn test_text_sensor_plain_text() {
        let mut point = DataPoint::text_sensor(1u32);
        assert_eq!(
            point.apply_packet(&value_packet(1, b"RVS43\0")),
            Some(PointValue::Text("RVS43".into()))
        );
    }

    #[test]
    fn test_select_unknown_value_keeps_state() {
        let mut point = DataPoint::select(1u32).with_option(1, "Auto").with_option(3, "Comfort");
        assert_eq!(
            point.apply_packet(&value_packet(1, &[0x00, 0x03])),
            Some(PointValue::Choice("Comfort".into()))
        );
        assert_eq!(point.apply_packet(&value_packet(1, &[0x00, 0x09])), None);
        assert_eq!(point.value(), Some(&PointValue::Choice("Comfort".into())));
    }

    #[test]
    fn test_short_payload_is_ignored() {
        let mut point = DataPoint::sensor(1u32, ValueKind::Int32);
        assert_eq!(point.apply_packet(&value_packet(1, &[0x00, 0x01])), None);
        assert_eq!(point.value(), None);
    }

    #[test]
    fn test_select_write_intent() -> Result<()> {
        let mut point = DataPoint::select(0x2D3D_0574u32)
            .with_option(1, "Auto")
            .with_option(3, "Comfort");

        assert_eq!(point.request_option("Turbo")?, None);
        assert!(!point.is_dirty());

        assert_eq!(point.request_option("Comfort")?, Some(PointValue::Choice("Comfort".into())));
        assert!(point.is_dirty());
        assert!(point.is_ready_to_set(0));

        let packet = point.create_request_set(addr(0x42), addr(0x00)).unwrap();
        assert_eq!(packet.command, Command::Set);
        assert_eq!(packet.payload, vec![DEFAULT_ENABLE_BYTE, 0x03]);
        assert_eq!(point.set_retry().unwrap().attempts(), 0);
        point.record_attempt(Operation::Set);
        assert_eq!(point.set_retry().unwrap().attempts(), 1);

        point.reset_dirty();
        assert!(!point.is_dirty());
        assert_eq!(point.set_retry().unwrap().attempts(), 0);
        Ok(())
    }

    #[test]
    fn test_number_write_is_prescaled() -> Result<()> {
        let mut point = DataPoint::number(1u32, ValueKind::Temperature)
            .with_scale(1.0, 1.0)
            .with_enable_byte(0x06);
        point.request_number(21.5)?;
        assert_eq!(point.pending_raw(), Some(1376));

        let packet = point.create_request_set(addr(0x42), addr(0x00)).unwrap();
        assert_eq!(packet.payload, vec![0x06, 0x05, 0x60]);
        Ok(())
    }

    #[test]
    fn test_room_temperature_goes_out_as_inf() -> Result<()> {
        let mut point =
            DataPoint::number(0x2D3D_0215u32, ValueKind::RoomTemperature).with_broadcast(true);
        point.request_number(20.0)?;

        let packet = point.create_request_set(addr(0x42), addr(0x00)).unwrap();
        assert_eq!(packet.command, Command::Inf);
        assert_eq!(packet.payload, vec![0x05, 0x00, 0x00]);
        Ok(())
    }

    #[test]
    fn test_switch_write_uses_constants() -> Result<()> {
        let mut point = DataPoint::switch(1u32).with_on_off(0xFF, 0x00);
        point.request_switch(true)?;
        assert_eq!(point.pending_raw(), Some(0xFF));
        assert_eq!(apply_byte(&mut point, 0x00), Some(PointValue::Bool(false)));
        Ok(())
    }

    #[test]
    fn test_wrong_write_kind_rejected() {
        let mut sensor = DataPoint::sensor(1u32, ValueKind::UInt8);
        assert!(matches!(sensor.request_number(1.0), Err(BusError::NotWritable(_))));
        let mut select = DataPoint::select(1u32);
        assert!(select.request_switch(true).is_err());
    }

    #[test]
    fn test_get_attempts_and_regular_schedule() {
        let mut point = DataPoint::sensor(1u32, ValueKind::UInt8).with_update_interval(60_000);
        assert!(point.is_ready(0));
        point.create_request_get(addr(0x42), addr(0x00));
        point.record_attempt(Operation::Get);
        assert_eq!(point.get_retry().attempts(), 1);

        point.schedule_next_regular_update(500);
        assert_eq!(point.get_retry().attempts(), 0);
        assert_eq!(point.next_update_at(), 60_500);
        assert!(!point.is_ready(60_499));
        assert!(point.is_ready(60_500));
    }

    #[test]
    fn test_broadcast_number_is_never_polled() {
        let mut point = DataPoint::number(1u32, ValueKind::Temperature).with_broadcast(true);
        assert!(!point.is_ready_to_update(0));
        assert!(point.is_broadcast());
    }

    #[test]
    fn test_set_attempt_on_sensor_is_ignored() {
        let mut point = DataPoint::sensor(1u32, ValueKind::UInt8);
        point.record_attempt(Operation::Set);
        assert_eq!(point.get_retry().attempts(), 0);
        assert_eq!(point.set_retry(), None);
    }

    #[test]
    fn test_classes() {
        assert_eq!(DataPoint::switch(1u32).class(), PointClass::Number);
        assert_eq!(DataPoint::select(1u32).class(), PointClass::Select);
        assert_eq!(DataPoint::text_sensor(1u32).class(), PointClass::Sensor);
        assert!(!DataPoint::binary_sensor(1u32, ValueKind::UInt8).is_writable());
    }
}
