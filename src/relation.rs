use std::fmt;

use serde::{Deserialize, Serialize};

use crate::predicate::{SpatialPredicate, SpatialTerms};

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn yaw_in_degrees() {
        let relation = SpatialRelation::new("a", SpatialPredicate::Near, "b", 1.0, PI / 2.0);
        assert!((relation.yaw() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn description() {
        let relation = SpatialRelation::new("s1", SpatialPredicate::Near, "o1", 1.234, 0.0);
        assert_eq!(
            relation.desc_with("chair", "table"),
            "chair is near to table (near Δ:1.23 𝜶:0.0°)"
        );
        let relation = SpatialRelation::new("s1", SpatialPredicate::SameWidth, "o1", 0.0, PI);
        assert_eq!(
            relation.desc_with("chair", "table"),
            "chair has same width as table (same width Δ:0.00 𝜶:180.0°)"
        );
        assert_eq!(relation.to_string(), "s1 same width o1 | Δ:0.00 α:180.0°");
    }
}

/// A deduced fact: subject - predicate - object.
///
/// `delta` is the predicate specific magnitude (gap, overlap or difference of
/// a measure) and `angle` the yaw of the subject relative to the object in
/// radians. Subject and object are referenced by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialRelation {
    pub subject: String,
    pub predicate: SpatialPredicate,
    pub object: String,
    pub delta: f64,
    pub angle: f64,
}

impl SpatialRelation {
    pub fn new(
        subject: impl Into<String>,
        predicate: SpatialPredicate,
        object: impl Into<String>,
        delta: f64,
        angle: f64,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate,
            object: object.into(),
            delta,
            angle,
        }
    }

    /// Angle deviation in degrees.
    pub fn yaw(&self) -> f64 {
        self.angle.to_degrees()
    }

    /// Natural language description using the given display names.
    pub fn desc_with(&self, subject: &str, object: &str) -> String {
        format!(
            "{} {} {} ({} Δ:{:.2} 𝜶:{:.1}°)",
            subject,
            SpatialTerms::term_with_verb_and_preposition(self.predicate),
            object,
            self.predicate.raw(),
            self.delta,
            self.yaw()
        )
    }
}

impl fmt::Display for SpatialRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} | Δ:{:.2} α:{:.1}°",
            self.subject,
            self.predicate,
            self.object,
            self.delta,
            self.yaw()
        )
    }
}
