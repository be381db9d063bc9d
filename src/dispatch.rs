//! Routing of decoded packets to the points that observe them

use crate::core::{Command, FieldId};
use crate::packet::Packet;
use crate::point::DataPoint;
use crate::registry::{PointId, Registries, Registry};
use crate::value::PointValue;
use tracing::{debug, warn};

/// A fresh value for the presentation layer
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Publication {
    /// Point that produced the value
    pub point: PointId,
    /// Field the point observes
    pub field_id: FieldId,
    /// The value
    pub value: PointValue,
}

/// Receiver of published values
pub trait Publisher {
    /// Deliver one fresh value
    fn publish(&mut self, publication: Publication);
}

impl Publisher for Vec<Publication> {
    fn publish(&mut self, publication: Publication) {
        self.push(publication);
    }
}

/// Publisher that drops every value
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPublisher;

impl Publisher for NullPublisher {
    fn publish(&mut self, _publication: Publication) {}
}

pub(crate) fn publish_point(publisher: &mut dyn Publisher, id: PointId, point: &DataPoint) {
    if let Some(value) = point.publish() {
        publisher.publish(Publication {
            point: id,
            field_id: point.field_id(),
            value,
        });
    }
}

/// Applies response and acknowledgement semantics to decoded packets
pub struct Dispatcher;

impl Dispatcher {
    /// Handle one packet, returning how many points it touched
    pub fn dispatch(
        packet: &Packet,
        now: u64,
        points: &mut Registries,
        publisher: &mut dyn Publisher,
    ) -> usize {
        if packet.command.carries_value() {
            Self::apply_value(&mut points.sensors, packet, now, publisher)
                + Self::apply_value(&mut points.numbers, packet, now, publisher)
                + Self::apply_value(&mut points.selects, packet, now, publisher)
        } else if packet.command.is_acknowledgement() {
            if packet.command == Command::Nack {
                warn!(field_id = %packet.field_id, "write rejected by device");
            }
            Self::acknowledge(&mut points.numbers, packet.field_id)
                + Self::acknowledge(&mut points.selects, packet.field_id)
        } else {
            debug!(field_id = %packet.field_id, command = %packet.command, "ignoring telegram");
            0
        }
    }

    fn apply_value(
        registry: &mut Registry,
        packet: &Packet,
        now: u64,
        publisher: &mut dyn Publisher,
    ) -> usize {
        let mut touched = 0;
        registry.for_each_matching(packet.field_id, |index, point| {
            touched += 1;
            point.schedule_next_regular_update(now);
            if point.apply_packet(packet).is_some() {
                publish_point(publisher, PointId::new(point.class(), index), point);
            }
        });
        touched
    }

    fn acknowledge(registry: &mut Registry, field_id: FieldId) -> usize {
        let mut touched = 0;
        registry.for_each_matching(field_id, |_, point| {
            touched += 1;
            point.reset_dirty();
        });
        touched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Address;
    use crate::value::ValueKind;

    fn telegram(command: Command, field: u32, payload: &[u8]) -> Packet {
        Packet::new(
            Address::new(0x00).unwrap(),
            Address::new(0x42).unwrap(),
            command,
            FieldId::new(field),
            payload.to_vec(),
        )
    }

    #[test]
    fn test_value_reaches_every_view_in_order() {
        let mut points = Registries::default();
        let numeric = points.register(DataPoint::sensor(0x0D3D_0519u32, ValueKind::Int8));
        let text =
            points.register(DataPoint::text_sensor(0x0D3D_0519u32).with_option(2, "Comfort"));
        let mut published: Vec<Publication> = Vec::new();

        let inf = telegram(Command::Inf, 0x0D3D_0519, &[0x00, 0x02]);
        let touched = Dispatcher::dispatch(&inf, 10, &mut points, &mut published);

        assert_eq!(touched, 2);
        assert_eq!(
            published,
            vec![
                Publication {
                    point: numeric,
                    field_id: FieldId::new(0x0D3D_0519),
                    value: PointValue::Number(2.0),
                },
                Publication {
                    point: text,
                    field_id: FieldId::new(0x0D3D_0519),
                    value: PointValue::Text("Comfort".into()),
                },
            ]
        );
    }

    #[test]
    fn test_value_reschedules_poll() {
        let mut points = Registries::default();
        let id =
            points.register(DataPoint::sensor(1u32, ValueKind::UInt8).with_update_interval(30_000));
        let ret = telegram(Command::Ret, 1, &[0x00, 0x01]);
        Dispatcher::dispatch(&ret, 1_000, &mut points, &mut NullPublisher);
        assert_eq!(points.get(id).map(DataPoint::next_update_at), Some(31_000));
    }

    #[test]
    fn test_ack_and_nack_clear_pending_write_alike() {
        for command in [Command::Ack, Command::Nack] {
            let mut points = Registries::default();
            let id = points.register(DataPoint::switch(5u32));
            points.get_mut(id).unwrap().request_switch(true).unwrap();

            Dispatcher::dispatch(&telegram(command, 5, &[]), 0, &mut points, &mut NullPublisher);
            assert!(!points.get(id).unwrap().is_dirty(), "{} left the write pending", command);
        }
    }

    #[test]
    fn test_unmatched_and_ignored_telegrams() {
        let mut points = Registries::default();
        points.register(DataPoint::sensor(1u32, ValueKind::UInt8));
        let mut published: Vec<Publication> = Vec::new();

        let unmatched = telegram(Command::Ret, 2, &[0x00, 0x01]);
        let fault = telegram(Command::Fault, 1, &[0x00]);
        assert_eq!(Dispatcher::dispatch(&unmatched, 0, &mut points, &mut published), 0);
        assert_eq!(Dispatcher::dispatch(&fault, 0, &mut points, &mut published), 0);
        assert!(published.is_empty());
    }

    #[test]
    fn test_ack_does_not_touch_sensors() {
        let mut points = Registries::default();
        points.register(DataPoint::sensor(1u32, ValueKind::UInt8));
        let ack = telegram(Command::Ack, 1, &[]);
        assert_eq!(Dispatcher::dispatch(&ack, 0, &mut points, &mut NullPublisher), 0);
    }
}
