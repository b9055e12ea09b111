use nalgebra::Vector2;

use crate::basics::{Adjustment, PredicateCategories};
use crate::object::SpatialObject;

/// Read-only snapshot of the reasoning context passed into relation calls.
///
/// Holds everything a deduction may consult besides its two operands, so
/// relation functions stay pure given identical inputs.
#[derive(Debug, Clone, Default)]
pub struct Context<'a> {
    pub adjustment: Adjustment,
    pub deduce: PredicateCategories,
    /// Object whose view defines the as-seen relations.
    pub observer: Option<&'a SpatialObject>,
    /// North direction in the ground plane as (x, z).
    pub north: Option<Vector2<f64>>,
}

impl<'a> Context<'a> {
    pub fn new(adjustment: Adjustment, deduce: PredicateCategories) -> Self {
        Self {
            adjustment,
            deduce,
            observer: None,
            north: None,
        }
    }

    pub fn with_observer(mut self, observer: &'a SpatialObject) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn with_north(mut self, north: Vector2<f64>) -> Self {
        self.north = Some(north);
        self
    }
}
