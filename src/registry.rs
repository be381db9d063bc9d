//! Ordered multi-map from field id to data points
//!
//! Points live in an arena in registration order and are never removed.
//! Several points may observe the same field; lookups return them in the
//! order they were registered.

use crate::core::FieldId;
use crate::point::{DataPoint, PointClass};
use std::collections::HashMap;

/// Handle to a registered point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PointId {
    /// Writable number or switch
    Number(usize),
    /// Enumerated select
    Select(usize),
    /// Read-only sensor
    Sensor(usize),
}

impl PointId {
    pub(crate) fn new(class: PointClass, index: usize) -> Self {
        match class {
            PointClass::Number => PointId::Number(index),
            PointClass::Select => PointId::Select(index),
            PointClass::Sensor => PointId::Sensor(index),
        }
    }

    /// Registry the point lives in
    pub fn class(&self) -> PointClass {
        match self {
            PointId::Number(_) => PointClass::Number,
            PointId::Select(_) => PointClass::Select,
            PointId::Sensor(_) => PointClass::Sensor,
        }
    }

    /// Position within its registry
    pub fn index(&self) -> usize {
        match *self {
            PointId::Number(index) | PointId::Select(index) | PointId::Sensor(index) => index,
        }
    }
}

impl std::fmt::Display for PointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PointId::Number(index) => write!(f, "number#{}", index),
            PointId::Select(index) => write!(f, "select#{}", index),
            PointId::Sensor(index) => write!(f, "sensor#{}", index),
        }
    }
}

/// Registry of one class of points
#[derive(Debug, Clone, Default)]
pub struct Registry {
    points: Vec<DataPoint>,
    by_field: HashMap<FieldId, Vec<usize>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Registry::default()
    }

    /// Append a point, returning its index
    pub fn insert(&mut self, point: DataPoint) -> usize {
        let index = self.points.len();
        self.by_field.entry(point.field_id()).or_default().push(index);
        self.points.push(point);
        index
    }

    /// Point at `index`
    pub fn get(&self, index: usize) -> Option<&DataPoint> {
        self.points.get(index)
    }

    /// Mutable point at `index`
    pub fn get_mut(&mut self, index: usize) -> Option<&mut DataPoint> {
        self.points.get_mut(index)
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no point is registered
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in registration order
    pub fn iter(&self) -> impl Iterator<Item = &DataPoint> {
        self.points.iter()
    }

    /// Points in registration order, with their indices
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut DataPoint)> {
        self.points.iter_mut().enumerate()
    }

    /// Indices of the points observing `field_id`, in registration order
    pub fn indices(&self, field_id: FieldId) -> &[usize] {
        self.by_field.get(&field_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether any point observes `field_id`
    pub fn contains(&self, field_id: FieldId) -> bool {
        self.by_field.contains_key(&field_id)
    }

    /// Visit every point observing `field_id`, in registration order
    pub fn for_each_matching<F>(&mut self, field_id: FieldId, mut visit: F)
    where
        F: FnMut(usize, &mut DataPoint),
    {
        let Some(indices) = self.by_field.get(&field_id) else {
            return;
        };
        for &index in indices {
            visit(index, &mut self.points[index]);
        }
    }
}

/// The three registries, one per point class
#[derive(Debug, Clone, Default)]
pub struct Registries {
    pub numbers: Registry,
    pub selects: Registry,
    pub sensors: Registry,
}

impl Registries {
    /// Store a point in the registry of its class
    pub fn register(&mut self, point: DataPoint) -> PointId {
        let class = point.class();
        PointId::new(class, self.by_class_mut(class).insert(point))
    }

    /// Registry holding points of `class`
    pub fn by_class(&self, class: PointClass) -> &Registry {
        match class {
            PointClass::Number => &self.numbers,
            PointClass::Select => &self.selects,
            PointClass::Sensor => &self.sensors,
        }
    }

    /// Mutable registry holding points of `class`
    pub fn by_class_mut(&mut self, class: PointClass) -> &mut Registry {
        match class {
            PointClass::Number => &mut self.numbers,
            PointClass::Select => &mut self.selects,
            PointClass::Sensor => &mut self.sensors,
        }
    }

    /// Look up a point by handle
    pub fn get(&self, id: PointId) -> Option<&DataPoint> {
        self.by_class(id.class()).get(id.index())
    }

    /// Look up a point by handle, mutably
    pub fn get_mut(&mut self, id: PointId) -> Option<&mut DataPoint> {
        self.by_class_mut(id.class()).get_mut(id.index())
    }

    /// Total number of registered points
    pub fn len(&self) -> usize {
        self.numbers.len() + self.selects.len() + self.sensors.len()
    }

    /// Whether no point is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every point with its handle: sensors, numbers, selects
    pub fn iter(&self) -> impl Iterator<Item = (PointId, &DataPoint)> {
        tagged(PointClass::Sensor, &self.sensors)
            .chain(tagged(PointClass::Number, &self.numbers))
            .chain(tagged(PointClass::Select, &self.selects))
    }
}

fn tagged(class: PointClass, registry: &Registry) -> impl Iterator<Item = (PointId, &DataPoint)> {
    registry
        .iter()
        .enumerate()
        .map(move |(index, point)| (PointId::new(class, index), point))
}
