//! Shared vocabulary of the reasoner.
//!
//! This module holds the tolerance configuration used by every fuzzy
//! comparison and the small classification enums attached to objects.
//!
//! - `Adjustment`: gaps, angle tolerance, nearby and sector sizing
//! - `PredicateCategories`: which relation categories `relate` deduces
//! - `ObjectConfidence`: four plausibility scalars in [0, 1]
//! - Existence, cause, motion and shape kinds with string lookups
//!
//! # Key Conventions
//!
//! String lookups never fail. Unknown names map to the `Undefined`/`Unknown`
//! variant, except the schema lookups which return `None` so that a textual
//! command can report the bad value.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpatialError};


/// Calculation schema for the nearby radius of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NearbySchema {
    /// Use the nearby factor as a fixed radius.
    Fixed,
    /// Base circle radius times the factor.
    Circle,
    /// Sphere radius times the factor.
    Sphere,
    /// Height plus width times the factor.
    Perimeter,
    /// Front area times the factor.
    Area,
}

impl NearbySchema {
    pub const ALL: [NearbySchema; 5] = [
        NearbySchema::Fixed,
        NearbySchema::Circle,
        NearbySchema::Sphere,
        NearbySchema::Perimeter,
        NearbySchema::Area,
    ];

    pub fn raw(&self) -> &'static str {
        match self {
            NearbySchema::Fixed => "fixed",
            NearbySchema::Circle => "circle",
            NearbySchema::Sphere => "sphere",
            NearbySchema::Perimeter => "perimeter",
            NearbySchema::Area => "area",
        }
    }

    pub fn named(name: &str) -> Option<NearbySchema> {
        Self::ALL.iter().copied().find(|s| s.raw() == name)
    }
}

/// Calculation schema for the length of an extruded sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectorSchema {
    Fixed,
    Dimension,
    Perimeter,
    Area,
    /// Follow the nearby radius of the object.
    Nearby,
}

impl SectorSchema {
    pub const ALL: [SectorSchema; 5] = [
        SectorSchema::Fixed,
        SectorSchema::Dimension,
        SectorSchema::Perimeter,
        SectorSchema::Area,
        SectorSchema::Nearby,
    ];

    pub fn raw(&self) -> &'static str {
        match self {
            SectorSchema::Fixed => "fixed",
            SectorSchema::Dimension => "dimension",
            SectorSchema::Perimeter => "perimeter",
            SectorSchema::Area => "area",
            SectorSchema::Nearby => "nearby",
        }
    }

    pub fn named(name: &str) -> Option<SectorSchema> {
        Self::ALL.iter().copied().find(|s| s.raw() == name)
    }
}

/// Tolerances and thresholds of the fuzzy geometric comparisons.
///
/// **Context**: Detected boxes are noisy, so every equality, contact or
/// alignment test allows a deviation. One adjustment is shared read-only by
/// all relation calls of a reasoning context.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Adjustment {
    /// Max linear deviation in metres.
    pub max_gap: f64,
    /// Max angle deviation in radians.
    pub max_angle_delta: f64,
    pub sector_schema: SectorSchema,
    pub sector_factor: f64,
    pub sector_limit: f64,
    pub nearby_schema: NearbySchema,
    pub nearby_factor: f64,
    /// Max absolute nearby radius.
    pub nearby_limit: f64,
    /// One dimension is this factor larger than both others.
    pub long_ratio: f64,
    /// One dimension is this factor smaller than both others.
    pub thin_ratio: f64,
}

impl Default for Adjustment {
    fn default() -> Self {
        Self {
            max_gap: 0.02,
            max_angle_delta: 0.05 * PI,
            sector_schema: SectorSchema::Nearby,
            sector_factor: 1.0,
            sector_limit: 2.5,
            nearby_schema: NearbySchema::Circle,
            nearby_factor: 2.0,
            nearby_limit: 2.5,
            long_ratio: 4.0,
            thin_ratio: 10.0,
        }
    }
}

impl Adjustment {
    /// Narrow tolerances for precisely measured scenes.
    pub fn tight() -> Self {
        Self {
            max_gap: 0.002,
            max_angle_delta: 0.01 * PI,
            sector_factor: 0.5,
            ..Default::default()
        }
    }

    /// Max angle deviation in degrees.
    pub fn yaw(&self) -> f64 {
        self.max_angle_delta.to_degrees()
    }

    pub fn set_yaw(&mut self, degrees: f64) {
        self.max_angle_delta = degrees.to_radians();
    }

    /// Reject tolerances that are negative or not finite.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("max_gap", self.max_gap),
            ("max_angle_delta", self.max_angle_delta),
            ("sector_factor", self.sector_factor),
            ("sector_limit", self.sector_limit),
            ("nearby_factor", self.nearby_factor),
            ("nearby_limit", self.nearby_limit),
            ("long_ratio", self.long_ratio),
            ("thin_ratio", self.thin_ratio),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(SpatialError::InvalidAdjustment(format!(
                    "{} must be a finite non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Relation categories deduced by `relate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredicateCategories {
    pub topology: bool,
    pub connectivity: bool,
    pub comparability: bool,
    pub similarity: bool,
    pub sectoriality: bool,
    pub visibility: bool,
    pub geography: bool,
}

impl Default for PredicateCategories {
    fn default() -> Self {
        Self {
            topology: true,
            connectivity: true,
            comparability: false,
            similarity: false,
            sectoriality: false,
            visibility: false,
            geography: false,
        }
    }
}

impl PredicateCategories {
    /// Categories named by substrings of `text`, e.g. "topology similarity".
    pub fn from_names(text: &str) -> Self {
        Self {
            topology: text.contains("topo"),
            connectivity: text.contains("connect"),
            comparability: text.contains("compar"),
            similarity: text.contains("simil"),
            sectoriality: text.contains("sector"),
            visibility: text.contains("visib"),
            geography: text.contains("geo"),
        }
    }
}

/// Plausibility values between 0.0 and 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectConfidence {
    /// Position and orientation.
    pub pose: f64,
    /// Size.
    pub dimension: f64,
    /// Classification by label, type and supertype.
    pub label: f64,
    /// Look and shape.
    pub look: f64,
}

impl ObjectConfidence {
    pub fn value(&self) -> f64 {
        (self.pose + self.dimension + self.label) / 3.0
    }

    pub fn set_value(&mut self, value: f64) {
        self.pose = value;
        self.dimension = value;
        self.label = value;
    }

    pub fn spatial(&self) -> f64 {
        (self.pose + self.dimension) / 2.0
    }

    pub fn set_spatial(&mut self, value: f64) {
        self.pose = value;
        self.dimension = value;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpatialExistence {
    Undefined,
    /// Detected, visible object.
    #[default]
    Real,
    /// Created, visible object.
    Virtual,
    /// Non-visual area such as a zone or region of interest.
    Conceptual,
    /// Non-visual group or container.
    Aggregational,
}

impl SpatialExistence {
    pub const ALL: [SpatialExistence; 5] = [
        SpatialExistence::Undefined,
        SpatialExistence::Real,
        SpatialExistence::Virtual,
        SpatialExistence::Conceptual,
        SpatialExistence::Aggregational,
    ];

    pub fn raw(&self) -> &'static str {
        match self {
            SpatialExistence::Undefined => "undefined",
            SpatialExistence::Real => "real",
            SpatialExistence::Virtual => "virtual",
            SpatialExistence::Conceptual => "conceptual",
            SpatialExistence::Aggregational => "aggregational",
        }
    }

    pub fn named(name: &str) -> SpatialExistence {
        Self::ALL
            .iter()
            .copied()
            .find(|e| e.raw() == name)
            .unwrap_or(SpatialExistence::Undefined)
    }
}

/// How an object came into the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectCause {
    #[default]
    Unknown,
    PlaneDetected,
    ObjectDetected,
    /// The tracked device of the user.
    SelfTracked,
    UserCaptured,
    UserGenerated,
    RuleProduced,
    RemoteCreated,
}

impl ObjectCause {
    pub const ALL: [ObjectCause; 8] = [
        ObjectCause::Unknown,
        ObjectCause::PlaneDetected,
        ObjectCause::ObjectDetected,
        ObjectCause::SelfTracked,
        ObjectCause::UserCaptured,
        ObjectCause::UserGenerated,
        ObjectCause::RuleProduced,
        ObjectCause::RemoteCreated,
    ];

    pub fn raw(&self) -> &'static str {
        match self {
            ObjectCause::Unknown => "unknown",
            ObjectCause::PlaneDetected => "plane_detected",
            ObjectCause::ObjectDetected => "object_detected",
            ObjectCause::SelfTracked => "self_tracked",
            ObjectCause::UserCaptured => "user_captured",
            ObjectCause::UserGenerated => "user_generated",
            ObjectCause::RuleProduced => "rule_produced",
            ObjectCause::RemoteCreated => "remote_created",
        }
    }

    pub fn named(name: &str) -> ObjectCause {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.raw() == name)
            .unwrap_or(ObjectCause::Unknown)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionState {
    Unknown,
    Stationary,
    Idle,
    Moving,
}

impl MotionState {
    pub fn raw(&self) -> &'static str {
        match self {
            MotionState::Unknown => "unknown",
            MotionState::Stationary => "stationary",
            MotionState::Idle => "idle",
            MotionState::Moving => "moving",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectShape {
    #[default]
    Unknown,
    /// Plane or thin box.
    Planar,
    Cubical,
    Spherical,
    /// Along the longest dimension when long.
    Cylindrical,
    Conical,
    Irregular,
    /// Changing shape, e.g. of a creature.
    Changing,
}

impl ObjectShape {
    pub const ALL: [ObjectShape; 8] = [
        ObjectShape::Unknown,
        ObjectShape::Planar,
        ObjectShape::Cubical,
        ObjectShape::Spherical,
        ObjectShape::Cylindrical,
        ObjectShape::Conical,
        ObjectShape::Irregular,
        ObjectShape::Changing,
    ];

    pub fn raw(&self) -> &'static str {
        match self {
            ObjectShape::Unknown => "unknown",
            ObjectShape::Planar => "planar",
            ObjectShape::Cubical => "cubical",
            ObjectShape::Spherical => "spherical",
            ObjectShape::Cylindrical => "cylindrical",
            ObjectShape::Conical => "conical",
            ObjectShape::Irregular => "irregular",
            ObjectShape::Changing => "changing",
        }
    }

    pub fn named(name: &str) -> ObjectShape {
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.raw() == name)
            .unwrap_or(ObjectShape::Unknown)
    }
}

/// Searchable metric attributes of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpatialAttribute {
    None,
    Width,
    Height,
    Depth,
    Length,
    Angle,
    Yaw,
    /// Deviation from north.
    Azimuth,
    Footprint,
    Frontface,
    Sideface,
    Surface,
    Volume,
    Perimeter,
    Baseradius,
    Radius,
    Speed,
    Confidence,
    Lifespan,
}

impl SpatialAttribute {
    pub const ALL: [SpatialAttribute; 19] = [
        SpatialAttribute::None,
        SpatialAttribute::Width,
        SpatialAttribute::Height,
        SpatialAttribute::Depth,
        SpatialAttribute::Length,
        SpatialAttribute::Angle,
        SpatialAttribute::Yaw,
        SpatialAttribute::Azimuth,
        SpatialAttribute::Footprint,
        SpatialAttribute::Frontface,
        SpatialAttribute::Sideface,
        SpatialAttribute::Surface,
        SpatialAttribute::Volume,
        SpatialAttribute::Perimeter,
        SpatialAttribute::Baseradius,
        SpatialAttribute::Radius,
        SpatialAttribute::Speed,
        SpatialAttribute::Confidence,
        SpatialAttribute::Lifespan,
    ];

    pub fn raw(&self) -> &'static str {
        match self {
            SpatialAttribute::None => "none",
            SpatialAttribute::Width => "width",
            SpatialAttribute::Height => "height",
            SpatialAttribute::Depth => "depth",
            SpatialAttribute::Length => "length",
            SpatialAttribute::Angle => "angle",
            SpatialAttribute::Yaw => "yaw",
            SpatialAttribute::Azimuth => "azimuth",
            SpatialAttribute::Footprint => "footprint",
            SpatialAttribute::Frontface => "frontface",
            SpatialAttribute::Sideface => "sideface",
            SpatialAttribute::Surface => "surface",
            SpatialAttribute::Volume => "volume",
            SpatialAttribute::Perimeter => "perimeter",
            SpatialAttribute::Baseradius => "baseradius",
            SpatialAttribute::Radius => "radius",
            SpatialAttribute::Speed => "speed",
            SpatialAttribute::Confidence => "confidence",
            SpatialAttribute::Lifespan => "lifespan",
        }
    }

    pub fn named(name: &str) -> SpatialAttribute {
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.raw() == name)
            .unwrap_or(SpatialAttribute::None)
    }
}
