//! Oriented bounding box objects.
//!
//! A `SpatialObject` is an upright box with a yaw angle, plus the
//! classification and bookkeeping a scene needs about it.
//!
//! The object provides:
//! - Derived geometric attributes (center, volume, radius, footprint, ...)
//! - Transforms between world and local frames
//! - Corner and face point generators
//! - Sector classification of local points
//! - Named factories for common kinds of objects
//! - Dictionary import and export for fact bases
//!
//! # Key Frames
//!
//! `position` is the center of the bottom face, not the centroid. In the
//! local frame the origin sits at `position`, +x points to the object's
//! left, +z ahead and +y up, so the box spans `|x| <= width/2`,
//! `|z| <= depth/2` and `0 <= y <= height`.
//!
//! `into_local` rotates by `+angle` after translating, while the corner
//! generators rotate local offsets by `-angle` before translating. The two
//! are exact inverses of each other.
//!
//! `center` is `position + (width, height, depth) / 2` taken along the world
//! axes. It is the reference point of every distance based relation and is
//! not the midpoint of the corners.

use chrono::{DateTime, Utc};
use itertools::Itertools;
use nalgebra::{Point3, Vector2, Vector3};
use serde_json::{Map, Value};

use crate::basics::{
    Adjustment, MotionState, NearbySchema, ObjectCause, ObjectConfidence, ObjectShape,
    SectorSchema, SpatialAttribute, SpatialExistence,
};
use crate::config::{LENGTH_RATIO, MIN_UPDATE_INTERVAL};
use crate::geom::{normalized_or_zero, rotate_xz};
use crate::sector::BBoxSector;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::rotate_pts;
    use approx::assert_abs_diff_eq;
    use serde_json::json;
    use std::f64::consts::PI;

    fn cube(id: &str, x: f64, y: f64, z: f64, size: f64) -> SpatialObject {
        SpatialObject::new(id, Point3::new(x, y, z), size, size, size)
    }

    #[test]
    fn derived_attributes() {
        let obj = SpatialObject::new("box", Point3::new(1.0, 2.0, 3.0), 2.0, 3.0, 4.0);
        assert_eq!(obj.center(), Point3::new(2.0, 3.5, 5.0));
        assert_eq!(obj.volume(), 24.0);
        assert_eq!(obj.footprint(), 8.0);
        assert_eq!(obj.frontface(), 6.0);
        assert_eq!(obj.sideface(), 12.0);
        assert_eq!(obj.perimeter(), 12.0);
        assert_eq!(obj.surface(), 52.0);
        assert_abs_diff_eq!(obj.radius(), (1.0f64 + 2.25 + 4.0).sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(obj.baseradius(), 5.0f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn center_of_oblong_box() {
        let mut obj = SpatialObject::new("slab", Point3::new(1.0, 0.0, 1.0), 2.0, 1.0, 4.0);
        assert_eq!(obj.center(), Point3::new(2.0, 0.5, 3.0));
        // independent of the yaw
        obj.angle = 1.2;
        assert_eq!(obj.center(), Point3::new(2.0, 0.5, 3.0));
        assert_abs_diff_eq!(obj.distance(&Point3::new(2.0, 0.5, 0.0)), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn long_and_thin() {
        let adjustment = Adjustment::default();
        let obj = SpatialObject::new("a", Point3::origin(), 2.0, 4.0, 6.0);
        // 6 < 2 * 4
        assert_eq!(obj.main_direction(&adjustment), 0);
        assert!(obj.equilateral(&adjustment));
        let obj = SpatialObject::new("b", Point3::origin(), 1.0, 4.0, 1.0);
        assert_eq!(obj.main_direction(&adjustment), 2);
        assert!(obj.long(&adjustment));
        let obj = SpatialObject::new("c", Point3::origin(), 5.0, 1.0, 1.0);
        assert_eq!(obj.long_ratio(4.0), 1);
        let obj = SpatialObject::new("d", Point3::origin(), 1.0, 1.0, 5.0);
        assert_eq!(obj.long_ratio(4.0), 3);

        let plate = SpatialObject::new("plate", Point3::origin(), 2.0, 0.1, 2.0);
        assert_eq!(plate.thin_ratio(10.0), 2);
        assert!(plate.thin(&adjustment));
        let wall = SpatialObject::new("wall", Point3::origin(), 0.05, 2.0, 3.0);
        assert_eq!(wall.thin_ratio(10.0), 1);
        let cube = cube("cube", 0.0, 0.0, 0.0, 1.0);
        assert_eq!(cube.thin_ratio(10.0), 0);
        assert!(!cube.thin(&adjustment));
    }

    #[test]
    fn length_follows_main_axis() {
        let obj = SpatialObject::new("a", Point3::origin(), 3.0, 1.0, 1.0);
        assert_eq!(obj.length(), 3.0);
        let obj = SpatialObject::new("b", Point3::origin(), 1.0, 3.0, 1.0);
        assert_eq!(obj.length(), 3.0);
        let obj = SpatialObject::new("c", Point3::origin(), 1.0, 1.0, 1.0);
        assert_eq!(obj.length(), 1.0);
    }

    #[test]
    fn local_frame_rotation() {
        let obj = SpatialObject::new("rot", Point3::origin(), 1.0, 1.0, 1.0).with_angle(-PI / 2.0);
        let local = obj.into_local(&Point3::new(1.0, 0.0, 1.0));
        assert_abs_diff_eq!(local.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(local.z, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn corners_and_local_frame_are_inverse() {
        let obj = SpatialObject::new("box", Point3::new(2.0, 0.5, -1.0), 1.0, 2.0, 0.5)
            .with_angle(0.7);
        let local = obj.points(true);
        let back = obj.into_local_pts(&obj.points(false));
        for (expected, actual) in local.iter().zip(back.iter()) {
            assert_abs_diff_eq!(expected.x, actual.x, epsilon = 1e-12);
            assert_abs_diff_eq!(expected.y, actual.y, epsilon = 1e-12);
            assert_abs_diff_eq!(expected.z, actual.z, epsilon = 1e-12);
        }
    }

    #[test]
    fn corners_rotate_against_the_local_transform() {
        // A quarter turn: into_local uses +angle, corners use -angle.
        let obj = SpatialObject::new("box", Point3::origin(), 2.0, 1.0, 1.0).with_angle(PI / 2.0);
        let corner = obj.points(false)[0];
        // local (+w/2, +d/2) = (1, 0.5) rotated by -90 degrees
        assert_abs_diff_eq!(corner.x, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(corner.z, -1.0, epsilon = 1e-12);
        let local = obj.into_local(&corner);
        assert_abs_diff_eq!(local.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(local.z, 0.5, epsilon = 1e-12);
        // rotating the world corner by +angle is not the same as by -angle
        let wrong = rotate_pts(&[Point3::new(1.0, 0.0, 0.5)], PI / 2.0)[0];
        assert!((wrong.x - corner.x).abs() > 0.1);
    }

    #[test]
    fn face_quads() {
        let obj = SpatialObject::new("box", Point3::new(0.0, 1.0, 0.0), 2.0, 1.0, 4.0);
        let lower = obj.lower_points(false);
        assert!(lower.iter().all(|p| p.y == 1.0));
        let upper = obj.upper_points(false);
        assert!(upper.iter().all(|p| p.y == 2.0));
        let front = obj.front_points(true);
        assert!(front.iter().all(|p| p.z == 2.0));
        let back = obj.back_points(true);
        assert!(back.iter().all(|p| p.z == -2.0));
        let left = obj.left_points(true);
        assert!(left.iter().all(|p| p.x == 1.0));
        let right = obj.right_points(true);
        assert!(right.iter().all(|p| p.x == -1.0));
    }

    #[test]
    fn sector_of_points() {
        let adjustment = Adjustment::default();
        let obj = cube("obj", 0.0, 0.0, 0.0, 1.1);
        let sector = obj.sector_of(&Point3::new(1.2, 0.21, 1.4), &adjustment, false, None);
        assert_eq!(sector, BBoxSector::AL);
        let sector = obj.sector_of(&Point3::new(0.0, 0.5, 0.0), &adjustment, false, None);
        assert_eq!(sector, BBoxSector::I);
        let sector = obj.sector_of(&Point3::new(-1.0, -0.5, -1.0), &adjustment, false, None);
        assert_eq!(sector, BBoxSector::BRU);
        // tolerance widens the inside zone
        let edge = Point3::new(0.56, 0.5, 0.0);
        assert_eq!(obj.sector_of(&edge, &adjustment, false, None), BBoxSector::I);
        assert_eq!(obj.sector_of(&edge, &adjustment, false, Some(0.0)), BBoxSector::L);
        // beyond the nearby radius nothing is classified
        let far = Point3::new(8.0, 0.0, 0.1);
        assert!(obj.sector_of(&far, &adjustment, true, None).is_empty());
    }

    #[test]
    fn nearby_radius_schemas() {
        let obj = SpatialObject::new("obj", Point3::origin(), 0.6, 1.0, 0.8);
        let mut adjustment = Adjustment::default();
        assert_abs_diff_eq!(obj.nearby_radius(&adjustment), 1.0, epsilon = 1e-12);
        adjustment.nearby_schema = NearbySchema::Fixed;
        adjustment.nearby_factor = 3.0;
        assert_eq!(obj.nearby_radius(&adjustment), 3.0);
        adjustment.nearby_schema = NearbySchema::Perimeter;
        adjustment.nearby_factor = 1.0;
        assert_abs_diff_eq!(obj.nearby_radius(&adjustment), 1.6, epsilon = 1e-12);
        adjustment.nearby_schema = NearbySchema::Area;
        assert_abs_diff_eq!(obj.nearby_radius(&adjustment), 0.6, epsilon = 1e-12);
        adjustment.nearby_factor = 10.0;
        assert_eq!(obj.nearby_radius(&adjustment), adjustment.nearby_limit);
    }

    #[test]
    fn sector_lengths_by_schema() {
        let obj = SpatialObject::new("obj", Point3::origin(), 1.0, 2.0, 3.0);
        let mut adjustment = Adjustment::default();
        let inner = obj.sector_lengths(BBoxSector::I, &adjustment);
        assert_eq!(inner, Vector3::new(1.0, 2.0, 3.0));
        adjustment.sector_schema = SectorSchema::Dimension;
        let lengths = obj.sector_lengths(BBoxSector::AL, &adjustment);
        assert_eq!(lengths, Vector3::new(1.0, 2.0, 2.5));
        adjustment.sector_schema = SectorSchema::Fixed;
        let lengths = obj.sector_lengths(BBoxSector::O, &adjustment);
        assert_eq!(lengths, Vector3::new(1.0, 1.0, 3.0));
    }

    #[test]
    fn velocity_from_position_writes() {
        let mut obj = cube("mover", 0.0, 0.0, 0.0, 1.0);
        obj.confidence.set_spatial(0.9);
        obj.updated = Utc::now() - chrono::TimeDelta::seconds(2);
        obj.set_position(Point3::new(2.0, 0.0, 0.0));
        assert_abs_diff_eq!(obj.velocity.x, 1.0, epsilon = 0.01);
        assert_eq!(obj.motion(&Adjustment::default()), MotionState::Moving);

        let mut wall = cube("wall", 0.0, 0.0, 0.0, 1.0);
        wall.immobile = true;
        wall.updated = Utc::now() - chrono::TimeDelta::seconds(2);
        wall.set_position(Point3::new(2.0, 0.0, 0.0));
        assert_eq!(wall.velocity, Vector3::zeros());
        assert_eq!(wall.motion(&Adjustment::default()), MotionState::Stationary);
    }

    #[test]
    fn pose_setters() {
        let mut obj = SpatialObject::new("obj", Point3::origin(), 1.0, 2.0, 1.0);
        obj.set_center(Point3::new(1.0, 1.0, 1.0));
        assert_eq!(obj.position, Point3::new(0.5, 0.0, 0.5));
        assert_eq!(obj.center(), Point3::new(1.0, 1.0, 1.0));
        obj.set_yaw(90.0);
        assert_abs_diff_eq!(obj.angle, PI / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(obj.yaw(), 90.0, epsilon = 1e-9);
        obj.rot_shift(PI / 2.0, 1.0, 0.5, 0.0);
        assert_abs_diff_eq!(obj.position.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(obj.position.y, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(obj.position.z, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn azimuth_against_north() {
        let obj = SpatialObject::new("obj", Point3::origin(), 1.0, 1.0, 1.0);
        assert_eq!(obj.azimuth(None), 0.0);
        // north along -z: yaw 0 faces azimuth 180
        assert_abs_diff_eq!(obj.azimuth(Some(Vector2::new(0.0, -1.0))), 180.0, epsilon = 1e-9);
    }

    #[test]
    fn factories() {
        let chair = SpatialObject::detected("c1", "Chair", 0.5, 1.0, 0.5);
        assert_eq!(chair.label, "chair");
        assert_eq!(chair.object_type, "Chair");
        assert_eq!(chair.cause, ObjectCause::ObjectDetected);
        assert_abs_diff_eq!(chair.confidence.value(), 0.25, epsilon = 1e-12);

        let ghost = SpatialObject::virtual_object("v1", 1.0, 1.0, 1.0);
        assert!(ghost.is_virtual());
        assert_eq!(ghost.confidence.spatial(), 1.0);
        assert_eq!(ghost.confidence.label, 0.0);

        let floor = SpatialObject::building_element("f1", "Floor", Point3::origin(), 4.0, 0.1, 4.0);
        assert!(floor.immobile);
        assert_eq!(floor.supertype, "Building Element");

        let me = SpatialObject::person("me", Point3::origin(), "Ann");
        assert!(me.observing());
        assert_eq!(me.shape, ObjectShape::Changing);
        assert_eq!(me.height, 1.72);
    }

    #[test]
    fn wall_from_base_line() {
        let wall = SpatialObject::building_element_from_vectors(
            "w1",
            "Wall",
            Point3::new(-2.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            2.3,
            0.25,
        );
        assert_abs_diff_eq!(wall.width, 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(wall.position.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(wall.position.z, -0.125, epsilon = 1e-12);
        assert_abs_diff_eq!(wall.angle, 0.0, epsilon = 1e-12);
        assert_eq!(wall.cause, ObjectCause::UserCaptured);

        // degenerate base line collapses instead of producing NaN
        let stub = SpatialObject::building_element_from_vectors(
            "w2",
            "Wall",
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            2.0,
            0.25,
        );
        assert_eq!(stub.width, 0.0);
        assert!(stub.position.x.is_finite());
    }

    #[test]
    fn dict_round_trip() {
        let adjustment = Adjustment::default();
        let mut obj = SpatialObject::detected("t1", "Table", 1.2, 0.8, 0.7)
            .with_angle(0.3);
        obj.position = Point3::new(1.0, 0.0, -2.0);
        obj.shape = ObjectShape::Cubical;
        obj.look = "wooden".into();
        obj.set_data("price", json!(120));
        obj.set_data("room", json!("kitchen"));

        let dict = obj.as_dict(&adjustment, None);
        assert_eq!(dict["footprint"], json!(obj.footprint()));
        assert_eq!(dict["room"], json!("kitchen"));

        let copy = SpatialObject::from_dict(&dict);
        assert_eq!(copy.id, obj.id);
        assert_eq!(copy.position, obj.position);
        assert_eq!((copy.width, copy.height, copy.depth), (1.2, 0.8, 0.7));
        assert_eq!(copy.angle, obj.angle);
        assert_eq!(copy.label, "table");
        assert_eq!(copy.object_type, "Table");
        assert_eq!(copy.cause, ObjectCause::ObjectDetected);
        assert_eq!(copy.existence, SpatialExistence::Real);
        assert_eq!(copy.shape, ObjectShape::Cubical);
        assert_eq!(copy.confidence, obj.confidence);
        assert_eq!(copy.data, obj.data);
        assert_eq!(copy.data_value("price"), 120.0);
        assert_eq!(copy.data_value("room"), 0.0);
    }

    #[test]
    fn import_short_keys() {
        let mut obj = SpatialObject::new("x", Point3::origin(), 1.0, 1.0, 1.0);
        let input = json!({
            "x": 1.5, "z": -0.5, "w": 2.0, "h": 0.5, "d": 0.25,
            "confidence": 0.6, "cause": "bogus", "immobile": true, "color": "red"
        });
        obj.from_any(input.as_object().unwrap());
        assert_eq!(obj.position, Point3::new(1.5, 0.0, -0.5));
        assert_eq!((obj.width, obj.height, obj.depth), (2.0, 0.5, 0.25));
        assert_abs_diff_eq!(obj.confidence.value(), 0.6, epsilon = 1e-12);
        assert_eq!(obj.cause, ObjectCause::Unknown);
        assert!(obj.immobile);
        assert_eq!(obj.data.get("color"), Some(&json!("red")));
        assert!(!obj.data.contains_key("w"));
    }

    #[test]
    fn export_subset() {
        let obj = SpatialObject::person("me", Point3::new(0.0, 0.0, 1.0), "Ann");
        let out = obj.to_any();
        assert_eq!(out["cause"], json!("self_tracked"));
        assert_eq!(out["confidence"], json!(1.0));
        assert_eq!(out["position"], json!([0.0, 0.0, 1.0]));
        assert!(!out.contains_key("footprint"));
    }

    #[test]
    fn description() {
        let obj = SpatialObject::detected("t1", "Table", 1.2, 0.8, 0.7);
        assert_eq!(obj.display_name(), "table");
        assert_eq!(obj.desc(), "table, Table, 0.00/0.00/0.00, 1.20x0.70x0.80, 𝜶:0.0°");
        let bare = SpatialObject::new("b1", Point3::origin(), 1.0, 1.0, 1.0);
        assert_eq!(bare.display_name(), "b1");
    }
}

/// Attributes imported as booleans.
pub const BOOLEAN_ATTRIBUTES: [&str; 10] = [
    "immobile",
    "moving",
    "focused",
    "visible",
    "equilateral",
    "thin",
    "long",
    "real",
    "virtual",
    "conceptual",
];
/// Attributes imported as numbers.
pub const NUMERIC_ATTRIBUTES: [&str; 12] = [
    "width",
    "height",
    "depth",
    "w",
    "h",
    "d",
    "position",
    "x",
    "y",
    "z",
    "angle",
    "confidence",
];
/// Attributes imported as strings.
pub const STRING_ATTRIBUTES: [&str; 8] = [
    "id",
    "label",
    "type",
    "supertype",
    "existence",
    "cause",
    "shape",
    "look",
];
/// Attributes that are computed on export and ignored on import.
pub const DERIVED_ATTRIBUTES: [&str; 20] = [
    "center",
    "length",
    "direction",
    "perimeter",
    "footprint",
    "frontface",
    "sideface",
    "surface",
    "baseradius",
    "volume",
    "radius",
    "yaw",
    "azimuth",
    "lifespan",
    "updateInterval",
    "velocity",
    "motion",
    "speed",
    "observing",
    "index",
];

/// An upright, yawed bounding box in a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialObject {
    /// Unique id, e.g. the UUID of the detection source.
    pub id: String,
    pub existence: SpatialExistence,
    pub cause: ObjectCause,
    pub label: String,
    /// Class of the object.
    pub object_type: String,
    pub supertype: String,
    /// Textual description of appearance.
    pub look: String,
    /// Auxiliary values outside the fixed schema.
    pub data: Map<String, Value>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    /// Center of the bottom face.
    pub position: Point3<f64>,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    /// Yaw about +y in radians, counter-clockwise.
    pub angle: f64,
    pub immobile: bool,
    pub velocity: Vector3<f64>,
    pub confidence: ObjectConfidence,
    pub shape: ObjectShape,
    /// On screen.
    pub visible: bool,
    /// In the center of the screen for some time.
    pub focused: bool,
    /// Handle of the object in its owning scene.
    pub index: Option<usize>,
}

fn seconds_since(time: &DateTime<Utc>) -> f64 {
    (Utc::now() - *time)
        .num_microseconds()
        .map_or(f64::MAX, |us| us as f64 / 1e6)
}

impl SpatialObject {
    pub fn new(
        id: impl Into<String>,
        position: Point3<f64>,
        width: f64,
        height: f64,
        depth: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            existence: SpatialExistence::Real,
            cause: ObjectCause::Unknown,
            label: String::new(),
            object_type: String::new(),
            supertype: String::new(),
            look: String::new(),
            data: Map::new(),
            created: now,
            updated: now,
            position,
            width,
            height,
            depth,
            angle: 0.0,
            immobile: false,
            velocity: Vector3::zeros(),
            confidence: ObjectConfidence::default(),
            shape: ObjectShape::Unknown,
            visible: false,
            focused: false,
            index: None,
        }
    }

    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence.set_value(confidence);
        self
    }

    /// An object found by on-device object detection.
    pub fn detected(id: impl Into<String>, label: &str, width: f64, height: f64, depth: f64) -> Self {
        let mut obj = Self::new(id, Point3::origin(), width, height, depth);
        obj.label = label.to_lowercase();
        obj.object_type = label.to_string();
        obj.cause = ObjectCause::ObjectDetected;
        obj.existence = SpatialExistence::Real;
        obj.confidence.set_value(0.25);
        obj
    }

    /// An object placed by the user that has no physical counterpart.
    pub fn virtual_object(id: impl Into<String>, width: f64, height: f64, depth: f64) -> Self {
        let mut obj = Self::new(id, Point3::origin(), width, height, depth);
        obj.cause = ObjectCause::UserGenerated;
        obj.existence = SpatialExistence::Virtual;
        obj.confidence.set_spatial(1.0);
        obj
    }

    /// A wall, floor or similar element found by plane detection.
    pub fn building_element(
        id: impl Into<String>,
        element_type: &str,
        position: Point3<f64>,
        width: f64,
        height: f64,
        depth: f64,
    ) -> Self {
        let mut obj = Self::new(id, position, width, height, depth);
        obj.label = element_type.to_lowercase();
        obj.object_type = element_type.to_string();
        obj.supertype = "Building Element".to_string();
        obj.cause = ObjectCause::PlaneDetected;
        obj.existence = SpatialExistence::Real;
        obj.confidence.set_value(0.5);
        obj.immobile = true;
        obj.shape = ObjectShape::Cubical;
        obj
    }

    /// A wall captured as a base line from `from` to `to`.
    ///
    /// The line marks the front face; the box extends `depth` behind it.
    pub fn building_element_from_vectors(
        id: impl Into<String>,
        element_type: &str,
        from: Point3<f64>,
        to: Point3<f64>,
        height: f64,
        depth: f64,
    ) -> Self {
        let half = (to - from) / 2.0;
        let half_length = half.norm();
        let direction = normalized_or_zero(&Vector3::new(half.x, 0.0, half.z));
        // quarter turn of the base direction
        let normal = Vector3::new(-direction.z, 0.0, direction.x) * (depth / 2.0);
        let position = from + half - normal;
        let mut obj = Self::new(id, position, half_length * 2.0, height, depth);
        obj.angle = -half.z.atan2(half.x);
        obj.label = element_type.to_lowercase();
        obj.object_type = element_type.to_string();
        obj.supertype = "Building Element".to_string();
        obj.cause = ObjectCause::UserCaptured;
        obj.existence = SpatialExistence::Real;
        obj.confidence.set_value(0.9);
        obj.immobile = true;
        obj.shape = ObjectShape::Cubical;
        obj
    }

    /// The tracked user, with average body dimensions.
    pub fn person(id: impl Into<String>, position: Point3<f64>, name: &str) -> Self {
        let mut obj = Self::new(id, position, 0.46, 1.72, 0.34);
        obj.label = name.to_string();
        obj.cause = ObjectCause::SelfTracked;
        obj.existence = SpatialExistence::Real;
        obj.confidence.set_value(1.0);
        obj.supertype = "Creature".to_string();
        obj.object_type = "Person".to_string();
        obj.shape = ObjectShape::Changing;
        obj
    }

    /// `position` offset by half of each extent along the world axes.
    pub fn center(&self) -> Point3<f64> {
        self.position + Vector3::new(self.width, self.height, self.depth) / 2.0
    }

    /// Yaw in degrees, counter-clockwise.
    pub fn yaw(&self) -> f64 {
        self.angle.to_degrees()
    }

    /// Compass heading in degrees given the north direction (x, z).
    pub fn azimuth(&self, north: Option<Vector2<f64>>) -> f64 {
        match north {
            Some(north) => {
                let north_angle = north.y.atan2(north.x).to_degrees();
                -((self.yaw() + north_angle - 90.0) % 360.0)
            }
            None => 0.0,
        }
    }

    /// Base perimeter.
    pub fn perimeter(&self) -> f64 {
        (self.depth + self.width) * 2.0
    }

    /// Base area.
    pub fn footprint(&self) -> f64 {
        self.depth * self.width
    }

    pub fn frontface(&self) -> f64 {
        self.height * self.width
    }

    pub fn sideface(&self) -> f64 {
        self.height * self.depth
    }

    pub fn surface(&self) -> f64 {
        (self.height * self.width + self.depth * self.width + self.height * self.depth) * 2.0
    }

    pub fn volume(&self) -> f64 {
        self.depth * self.width * self.height
    }

    /// Radius of the sphere around the center enclosing the box.
    pub fn radius(&self) -> f64 {
        Vector3::new(self.width / 2.0, self.height / 2.0, self.depth / 2.0).norm()
    }

    /// Radius of the circle on the ground enclosing the base.
    pub fn baseradius(&self) -> f64 {
        (self.width / 2.0).hypot(self.depth / 2.0)
    }

    pub fn is_real(&self) -> bool {
        self.existence == SpatialExistence::Real
    }

    pub fn is_virtual(&self) -> bool {
        self.existence == SpatialExistence::Virtual
    }

    pub fn is_conceptual(&self) -> bool {
        self.existence == SpatialExistence::Conceptual
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    pub fn motion(&self, adjustment: &Adjustment) -> MotionState {
        if self.immobile {
            return MotionState::Stationary;
        }
        if self.confidence.spatial() > 0.5 {
            if self.speed() > adjustment.max_gap {
                return MotionState::Moving;
            }
            return MotionState::Idle;
        }
        MotionState::Unknown
    }

    pub fn moving(&self, adjustment: &Adjustment) -> bool {
        self.motion(adjustment) == MotionState::Moving
    }

    /// True for the tracked user device.
    pub fn observing(&self) -> bool {
        self.cause == ObjectCause::SelfTracked
    }

    /// Extent along the main axis: width, height, or depth otherwise.
    pub fn length(&self) -> f64 {
        match self.long_ratio(LENGTH_RATIO) {
            1 => self.width,
            2 => self.height,
            _ => self.depth,
        }
    }

    /// Seconds since creation.
    pub fn lifespan(&self) -> f64 {
        seconds_since(&self.created)
    }

    /// Seconds since the last update.
    pub fn update_interval(&self) -> f64 {
        seconds_since(&self.updated)
    }

    pub fn thin(&self, adjustment: &Adjustment) -> bool {
        self.thin_ratio(adjustment.thin_ratio) > 0
    }

    pub fn long(&self, adjustment: &Adjustment) -> bool {
        self.long_ratio(adjustment.long_ratio) > 0
    }

    pub fn equilateral(&self, adjustment: &Adjustment) -> bool {
        self.long_ratio(adjustment.long_ratio) == 0
    }

    /// Long axis: 0 none, 1 width, 2 height, 3 depth.
    pub fn main_direction(&self, adjustment: &Adjustment) -> u8 {
        self.long_ratio(adjustment.long_ratio)
    }

    /// Axis at least `ratio` times longer than the shortest one:
    /// 0 none, 1 width, 2 height, 3 depth. Depth wins ties over height,
    /// height over width.
    pub fn long_ratio(&self, ratio: f64) -> u8 {
        let values = [self.width, self.height, self.depth];
        let (min, max) = match values.iter().copied().minmax_by(f64::total_cmp) {
            itertools::MinMaxResult::MinMax(min, max) => (min, max),
            itertools::MinMaxResult::OneElement(v) => (v, v),
            itertools::MinMaxResult::NoElements => return 0,
        };
        if !(max > 0.0 && max >= min * ratio) {
            return 0;
        }
        if self.depth == max {
            3
        } else if self.height == max {
            2
        } else {
            1
        }
    }

    /// Axis at least `ratio` times shorter than both others:
    /// 0 none, 1 width, 2 height, 3 depth.
    pub fn thin_ratio(&self, ratio: f64) -> u8 {
        let min = self.width.min(self.height).min(self.depth);
        let max = self.width.max(self.height).max(self.depth);
        let limit = min * ratio;
        if max >= limit {
            if self.height == min && self.width > limit && self.depth > limit {
                return 2;
            }
            if self.width == min && self.height > limit && self.depth > limit {
                return 1;
            }
            if self.depth == min && self.width > limit && self.height > limit {
                return 3;
            }
        }
        0
    }

    /// Move to a new position, estimating velocity from the previous one.
    pub fn set_position(&mut self, position: Point3<f64>) {
        let interval = self.update_interval();
        if interval > MIN_UPDATE_INTERVAL && !self.immobile {
            self.velocity = (position - self.position) / interval;
        }
        self.position = position;
        self.updated = Utc::now();
    }

    pub fn set_center(&mut self, center: Point3<f64>) {
        self.set_position(center - Vector3::new(self.width, self.height, self.depth) / 2.0);
    }

    /// Shift by an offset given in a frame rotated by `angle` radians.
    pub fn rot_shift(&mut self, angle: f64, dx: f64, dy: f64, dz: f64) {
        let (rx, rz) = rotate_xz(dx, dz, angle);
        self.position += Vector3::new(rx, dy, rz);
    }

    pub fn set_yaw(&mut self, degrees: f64) {
        self.angle = degrees.to_radians();
    }

    /// Distance from the center.
    pub fn distance(&self, to: &Point3<f64>) -> f64 {
        (to - self.center()).norm()
    }

    /// Distance from the position on the ground plane.
    pub fn base_distance(&self, to: &Point3<f64>) -> f64 {
        let point = Point3::new(to.x, self.position.y, to.z);
        (point - self.position).norm()
    }

    /// Express a world point in the local frame of this object.
    pub fn into_local(&self, point: &Point3<f64>) -> Point3<f64> {
        let (x, z) = rotate_xz(
            point.x - self.position.x,
            point.z - self.position.z,
            self.angle,
        );
        Point3::new(x, point.y - self.position.y, z)
    }

    pub fn into_local_pts(&self, points: &[Point3<f64>]) -> Vec<Point3<f64>> {
        points.iter().map(|p| self.into_local(p)).collect()
    }

    /// Place a local base offset (x, z) at height `y` above the base.
    fn corner(&self, x: f64, y: f64, z: f64, local: bool) -> Point3<f64> {
        if local {
            return Point3::new(x, y, z);
        }
        let (rx, rz) = rotate_xz(x, z, -self.angle);
        Point3::new(
            self.position.x + rx,
            self.position.y + y,
            self.position.z + rz,
        )
    }

    fn base_offsets(&self) -> [(f64, f64); 4] {
        let (w, d) = (self.width / 2.0, self.depth / 2.0);
        [(w, d), (-w, d), (-w, -d), (w, -d)]
    }

    /// The eight corners: the four base corners then the four top corners,
    /// both counter-clockwise starting at (+x, +z).
    pub fn points(&self, local: bool) -> [Point3<f64>; 8] {
        let base = self.base_offsets();
        let mut points = [Point3::origin(); 8];
        for (i, (x, z)) in base.iter().enumerate() {
            points[i] = self.corner(*x, 0.0, *z, local);
            points[i + 4] = self.corner(*x, self.height, *z, local);
        }
        points
    }

    pub fn lower_points(&self, local: bool) -> [Point3<f64>; 4] {
        self.base_offsets()
            .map(|(x, z)| self.corner(x, 0.0, z, local))
    }

    pub fn upper_points(&self, local: bool) -> [Point3<f64>; 4] {
        self.base_offsets()
            .map(|(x, z)| self.corner(x, self.height, z, local))
    }

    /// Quad of the side face spanned by two base corners.
    fn face(&self, a: (f64, f64), b: (f64, f64), local: bool) -> [Point3<f64>; 4] {
        [
            self.corner(a.0, 0.0, a.1, local),
            self.corner(b.0, 0.0, b.1, local),
            self.corner(b.0, self.height, b.1, local),
            self.corner(a.0, self.height, a.1, local),
        ]
    }

    pub fn front_points(&self, local: bool) -> [Point3<f64>; 4] {
        let base = self.base_offsets();
        self.face(base[0], base[1], local)
    }

    pub fn back_points(&self, local: bool) -> [Point3<f64>; 4] {
        let base = self.base_offsets();
        self.face(base[2], base[3], local)
    }

    pub fn right_points(&self, local: bool) -> [Point3<f64>; 4] {
        let base = self.base_offsets();
        self.face(base[1], base[2], local)
    }

    pub fn left_points(&self, local: bool) -> [Point3<f64>; 4] {
        let base = self.base_offsets();
        self.face(base[3], base[0], local)
    }

    /// Classify a point given in the local frame.
    ///
    /// With `near_by`, points horizontally farther from the vertical axis
    /// than the nearby radius give an empty sector. `epsilon` overrides the
    /// tolerance of `max_gap`; a negative value shrinks the inside zone.
    pub fn sector_of(
        &self,
        point: &Point3<f64>,
        adjustment: &Adjustment,
        near_by: bool,
        epsilon: Option<f64>,
    ) -> BBoxSector {
        let mut zone = BBoxSector::EMPTY;
        if near_by && point.x.hypot(point.z) > self.nearby_radius(adjustment) {
            return zone;
        }
        let delta = epsilon.unwrap_or(adjustment.max_gap);
        let (w, d) = (self.width / 2.0, self.depth / 2.0);

        if point.x.abs() <= w + delta
            && point.z.abs() <= d + delta
            && point.y <= self.height + delta
            && point.y >= -delta
        {
            return BBoxSector::I;
        }

        if point.x + delta > w {
            zone.insert(BBoxSector::L);
        } else if -point.x + delta > w {
            zone.insert(BBoxSector::R);
        }
        if point.z + delta > d {
            zone.insert(BBoxSector::A);
        } else if -point.z + delta > d {
            zone.insert(BBoxSector::B);
        }
        if point.y + delta > self.height {
            zone.insert(BBoxSector::O);
        } else if point.y - delta < 0.0 {
            zone.insert(BBoxSector::U);
        }
        zone
    }

    /// Radius of the personal space of the object.
    pub fn nearby_radius(&self, adjustment: &Adjustment) -> f64 {
        let factor = adjustment.nearby_factor;
        let base = match adjustment.nearby_schema {
            NearbySchema::Fixed => return factor,
            NearbySchema::Circle => self.baseradius(),
            NearbySchema::Sphere => self.radius(),
            NearbySchema::Perimeter => self.height + self.width,
            NearbySchema::Area => self.height * self.width,
        };
        (base * factor).min(adjustment.nearby_limit)
    }

    /// Extent of the box extruded into `sector`, per axis (x, y, z).
    ///
    /// Axes the sector does not leave keep the box dimensions.
    pub fn sector_lengths(&self, sector: BBoxSector, adjustment: &Adjustment) -> Vector3<f64> {
        let mut result = Vector3::new(self.width, self.height, self.depth);
        let extrude = |own: f64, cross_a: f64, cross_b: f64| -> f64 {
            let limit = adjustment.sector_limit;
            let factor = adjustment.sector_factor;
            match adjustment.sector_schema {
                SectorSchema::Fixed => factor,
                SectorSchema::Dimension => (own * factor).min(limit),
                SectorSchema::Perimeter => ((cross_a + cross_b) * factor).min(limit),
                SectorSchema::Area => (cross_a * cross_b * factor).min(limit),
                SectorSchema::Nearby => self.nearby_radius(adjustment).min(limit),
            }
        };
        if sector.contains(BBoxSector::A) || sector.contains(BBoxSector::B) {
            result.z = extrude(self.depth, self.height, self.width);
        }
        if sector.contains(BBoxSector::L) || sector.contains(BBoxSector::R) {
            result.x = extrude(self.width, self.height, self.depth);
        }
        if sector.contains(BBoxSector::O) || sector.contains(BBoxSector::U) {
            result.y = extrude(self.height, self.width, self.depth);
        }
        result
    }

    /// Numeric value of a searchable attribute.
    pub fn value_of(
        &self,
        attribute: SpatialAttribute,
        north: Option<Vector2<f64>>,
    ) -> f64 {
        match attribute {
            SpatialAttribute::None => 0.0,
            SpatialAttribute::Width => self.width,
            SpatialAttribute::Height => self.height,
            SpatialAttribute::Depth => self.depth,
            SpatialAttribute::Length => self.length(),
            SpatialAttribute::Angle => self.angle,
            SpatialAttribute::Yaw => self.yaw(),
            SpatialAttribute::Azimuth => self.azimuth(north),
            SpatialAttribute::Footprint => self.footprint(),
            SpatialAttribute::Frontface => self.frontface(),
            SpatialAttribute::Sideface => self.sideface(),
            SpatialAttribute::Surface => self.surface(),
            SpatialAttribute::Volume => self.volume(),
            SpatialAttribute::Perimeter => self.perimeter(),
            SpatialAttribute::Baseradius => self.baseradius(),
            SpatialAttribute::Radius => self.radius(),
            SpatialAttribute::Speed => self.speed(),
            SpatialAttribute::Confidence => self.confidence.value(),
            SpatialAttribute::Lifespan => self.lifespan(),
        }
    }

    pub fn is_boolean(attribute: &str) -> bool {
        BOOLEAN_ATTRIBUTES.contains(&attribute)
    }

    pub fn set_data(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    /// Numeric auxiliary value, 0 if missing or not a number.
    pub fn data_value(&self, key: &str) -> f64 {
        self.data.get(key).and_then(Value::as_f64).unwrap_or(0.0)
    }

    /// Label, else type, else id.
    pub fn display_name(&self) -> &str {
        if !self.label.is_empty() {
            &self.label
        } else if !self.object_type.is_empty() {
            &self.object_type
        } else {
            &self.id
        }
    }

    pub fn desc(&self) -> String {
        let mut out = String::new();
        if !self.label.is_empty() && self.label != self.id {
            out.push_str(&format!("{}, ", self.label));
        }
        if !self.object_type.is_empty() {
            out.push_str(&format!("{}, ", self.object_type));
        }
        if !self.supertype.is_empty() {
            out.push_str(&format!("{}, ", self.supertype));
        }
        out.push_str(&format!(
            "{:.2}/{:.2}/{:.2}, {:.2}x{:.2}x{:.2}, 𝜶:{:.1}°",
            self.position.x,
            self.position.y,
            self.position.z,
            self.width,
            self.depth,
            self.height,
            self.yaw()
        ));
        out
    }

    /// Full representation for a fact base, including derived attributes.
    pub fn as_dict(&self, adjustment: &Adjustment, north: Option<Vector2<f64>>) -> Map<String, Value> {
        let center = self.center();
        let mut out = Map::new();
        out.insert("id".into(), Value::from(self.id.clone()));
        out.insert("existence".into(), Value::from(self.existence.raw()));
        out.insert("cause".into(), Value::from(self.cause.raw()));
        out.insert("label".into(), Value::from(self.label.clone()));
        out.insert("type".into(), Value::from(self.object_type.clone()));
        out.insert("supertype".into(), Value::from(self.supertype.clone()));
        out.insert("position".into(), point_value(&self.position));
        out.insert("center".into(), point_value(&center));
        out.insert("width".into(), Value::from(self.width));
        out.insert("height".into(), Value::from(self.height));
        out.insert("depth".into(), Value::from(self.depth));
        out.insert("length".into(), Value::from(self.length()));
        out.insert("direction".into(), Value::from(self.main_direction(adjustment)));
        out.insert("thin".into(), Value::from(self.thin(adjustment)));
        out.insert("long".into(), Value::from(self.long(adjustment)));
        out.insert("equilateral".into(), Value::from(self.equilateral(adjustment)));
        out.insert("real".into(), Value::from(self.is_real()));
        out.insert("virtual".into(), Value::from(self.is_virtual()));
        out.insert("conceptual".into(), Value::from(self.is_conceptual()));
        out.insert("moving".into(), Value::from(self.moving(adjustment)));
        for attribute in [
            SpatialAttribute::Perimeter,
            SpatialAttribute::Footprint,
            SpatialAttribute::Frontface,
            SpatialAttribute::Sideface,
            SpatialAttribute::Surface,
            SpatialAttribute::Baseradius,
            SpatialAttribute::Volume,
            SpatialAttribute::Radius,
            SpatialAttribute::Angle,
            SpatialAttribute::Yaw,
            SpatialAttribute::Azimuth,
            SpatialAttribute::Lifespan,
            SpatialAttribute::Speed,
        ] {
            out.insert(
                attribute.raw().into(),
                Value::from(self.value_of(attribute, north)),
            );
        }
        out.insert("updateInterval".into(), Value::from(self.update_interval()));
        out.insert(
            "confidence".into(),
            serde_json::to_value(self.confidence).unwrap_or(Value::Null),
        );
        out.insert("immobile".into(), Value::from(self.immobile));
        out.insert("velocity".into(), vector_value(&self.velocity));
        out.insert("motion".into(), Value::from(self.motion(adjustment).raw()));
        out.insert("shape".into(), Value::from(self.shape.raw()));
        out.insert("look".into(), Value::from(self.look.clone()));
        out.insert("visible".into(), Value::from(self.visible));
        out.insert("focused".into(), Value::from(self.focused));
        for (key, value) in &self.data {
            out.insert(key.clone(), value.clone());
        }
        out
    }

    /// Compact representation for export.
    pub fn to_any(&self) -> Map<String, Value> {
        let mut out = Map::new();
        out.insert("id".into(), Value::from(self.id.clone()));
        out.insert("existence".into(), Value::from(self.existence.raw()));
        out.insert("cause".into(), Value::from(self.cause.raw()));
        out.insert("label".into(), Value::from(self.label.clone()));
        out.insert("type".into(), Value::from(self.object_type.clone()));
        out.insert("supertype".into(), Value::from(self.supertype.clone()));
        out.insert("position".into(), point_value(&self.position));
        out.insert("width".into(), Value::from(self.width));
        out.insert("height".into(), Value::from(self.height));
        out.insert("depth".into(), Value::from(self.depth));
        out.insert("angle".into(), Value::from(self.angle));
        out.insert("volume".into(), Value::from(self.volume()));
        out.insert("immobile".into(), Value::from(self.immobile));
        out.insert("velocity".into(), vector_value(&self.velocity));
        out.insert("confidence".into(), Value::from(self.confidence.value()));
        out.insert("shape".into(), Value::from(self.shape.raw()));
        out.insert("look".into(), Value::from(self.look.clone()));
        out.insert("visible".into(), Value::from(self.visible));
        out.insert("focused".into(), Value::from(self.focused));
        for (key, value) in &self.data {
            out.insert(key.clone(), value.clone());
        }
        out
    }

    /// Build a new object from a dictionary.
    pub fn from_dict(input: &Map<String, Value>) -> Self {
        let id = input.get("id").and_then(Value::as_str).unwrap_or_default();
        let mut obj = Self::new(id, Point3::origin(), 1.0, 1.0, 1.0);
        obj.from_any(input);
        obj
    }

    /// Update from a dictionary. Missing keys keep their current values and
    /// unknown keys are stored as auxiliary data.
    pub fn from_any(&mut self, input: &Map<String, Value>) {
        if let Some(id) = input.get("id").and_then(Value::as_str) {
            if !id.is_empty() {
                if self.id != id {
                    log::warn!("import/update of {} from another id {}", self.id, id);
                }
                self.id = id.to_string();
            }
        }

        let position = match input.get("position").and_then(point_from_value) {
            Some(position) => position,
            None => Point3::new(
                number(input, &["x"]).unwrap_or(self.position.x),
                number(input, &["y"]).unwrap_or(self.position.y),
                number(input, &["z"]).unwrap_or(self.position.z),
            ),
        };
        self.set_position(position);

        self.width = number(input, &["width", "w"]).unwrap_or(self.width);
        self.height = number(input, &["height", "h"]).unwrap_or(self.height);
        self.depth = number(input, &["depth", "d"]).unwrap_or(self.depth);
        self.angle = number(input, &["angle"]).unwrap_or(self.angle);

        if let Some(label) = text(input, "label") {
            self.label = label;
        }
        if let Some(object_type) = text(input, "type") {
            self.object_type = object_type;
        }
        if let Some(supertype) = text(input, "supertype") {
            self.supertype = supertype;
        }

        match input.get("confidence") {
            Some(Value::Object(parts)) => {
                let part = |key: &str, current: f64| {
                    parts.get(key).and_then(Value::as_f64).unwrap_or(current)
                };
                self.confidence.pose = part("pose", self.confidence.pose);
                self.confidence.dimension = part("dimension", self.confidence.dimension);
                self.confidence.label = part("label", self.confidence.label);
                self.confidence.look = part("look", self.confidence.look);
            }
            Some(value) => {
                if let Some(value) = value.as_f64() {
                    self.confidence.set_value(value);
                }
            }
            None => {}
        }

        if let Some(cause) = text(input, "cause") {
            self.cause = ObjectCause::named(&cause);
        }
        if let Some(existence) = text(input, "existence") {
            self.existence = SpatialExistence::named(&existence);
        }
        if let Some(shape) = text(input, "shape") {
            self.shape = ObjectShape::named(&shape);
        }
        if let Some(look) = text(input, "look") {
            self.look = look;
        }
        if let Some(velocity) = input.get("velocity").and_then(point_from_value) {
            self.velocity = velocity.coords;
        }
        self.immobile = flag(input, "immobile").unwrap_or(self.immobile);
        self.visible = flag(input, "visible").unwrap_or(self.visible);
        self.focused = flag(input, "focused").unwrap_or(self.focused);

        for (key, value) in input {
            let key = key.as_str();
            if !STRING_ATTRIBUTES.contains(&key)
                && !NUMERIC_ATTRIBUTES.contains(&key)
                && !BOOLEAN_ATTRIBUTES.contains(&key)
                && !DERIVED_ATTRIBUTES.contains(&key)
            {
                self.set_data(key, value.clone());
            }
        }

        self.updated = Utc::now();
    }
}

fn point_value(p: &Point3<f64>) -> Value {
    Value::from(vec![p.x, p.y, p.z])
}

fn vector_value(v: &Vector3<f64>) -> Value {
    Value::from(vec![v.x, v.y, v.z])
}

fn point_from_value(value: &Value) -> Option<Point3<f64>> {
    let items = value.as_array()?;
    if items.len() != 3 {
        return None;
    }
    let coords: Option<Vec<f64>> = items.iter().map(Value::as_f64).collect();
    let coords = coords?;
    Some(Point3::new(coords[0], coords[1], coords[2]))
}

/// First of `keys` present as a number.
fn number(input: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| input.get(*key).and_then(Value::as_f64))
}

fn text(input: &Map<String, Value>, key: &str) -> Option<String> {
    input.get(key).and_then(Value::as_str).map(str::to_string)
}

fn flag(input: &Map<String, Value>, key: &str) -> Option<bool> {
    input.get(key).and_then(Value::as_bool)
}
