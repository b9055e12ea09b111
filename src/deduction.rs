//! Relation deduction between two objects.
//!
//! Every relation reads `subject <predicate> object`, where the object is
//! `self` and all geometry is evaluated in the object's local frame.
//!
//! - `topologies`: proximity, directionality, adjacency, assembly,
//!   orientation and clock visibility
//! - `similarities`: fuzzy equality of measures
//! - `comparisons`: ordering of measures
//! - `sector`: the sector holding the subject center
//! - `asseen`: left/right and front/rear as seen by an observer
//! - `relate`: the categories enabled by the context
//!
//! # Key Properties
//!
//! All deductions are pure functions of the two operands and the context,
//! so results can be cached per object until the scene changes.

use std::f64::consts::{FRAC_PI_2, PI};

use itertools::Itertools;
use nalgebra::Point3;

use crate::basics::{Adjustment, ObjectShape};
use crate::config::{HOUR_ANGLE, INSIDE_EPSILON, TANGIBLE_DISTANCE, TOUCHING_GAP};
use crate::context::Context;
use crate::geom::rotate_y;
use crate::object::SpatialObject;
use crate::predicate::SpatialPredicate::{self, *};
use crate::relation::SpatialRelation;
use crate::sector::BBoxSector;


/// True if `angle` is within `tolerance` of a multiple of `modulus`.
fn angle_near(angle: f64, modulus: f64, tolerance: f64) -> bool {
    let rest = angle.rem_euclid(modulus);
    rest.min(modulus - rest) < tolerance
}

/// Smallest and largest of the values, (0, 0) if empty.
fn extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values
        .minmax_by(f64::total_cmp)
        .into_option()
        .unwrap_or((0.0, 0.0))
}

fn box_surface(width: f64, height: f64, depth: f64) -> f64 {
    (height * width + depth * width + height * depth) * 2.0
}

/// Relations collected for one subject/object pair.
struct Facts<'a> {
    subject: &'a SpatialObject,
    object: &'a SpatialObject,
    /// Yaw of the subject relative to the object.
    theta: f64,
    relations: Vec<SpatialRelation>,
}

impl<'a> Facts<'a> {
    fn new(subject: &'a SpatialObject, object: &'a SpatialObject) -> Self {
        Self {
            subject,
            object,
            theta: subject.angle - object.angle,
            relations: Vec::new(),
        }
    }

    fn add(&mut self, predicate: SpatialPredicate, delta: f64) {
        self.add_with_angle(predicate, delta, self.theta);
    }

    fn add_with_angle(&mut self, predicate: SpatialPredicate, delta: f64, angle: f64) {
        self.relations.push(SpatialRelation::new(
            self.subject.id.as_str(),
            predicate,
            self.object.id.as_str(),
            delta,
            angle,
        ));
    }
}

/// Subject corners in the object frame with their per axis extents.
struct LocalBox {
    corners: Vec<Point3<f64>>,
    x: (f64, f64),
    y: (f64, f64),
    z: (f64, f64),
}

impl LocalBox {
    fn new(corners: Vec<Point3<f64>>) -> Self {
        let x = extent(corners.iter().map(|p| p.x));
        let y = extent(corners.iter().map(|p| p.y));
        let z = extent(corners.iter().map(|p| p.z));
        Self { corners, x, y, z }
    }
}

impl SpatialObject {
    /// Topological relations of `subject` to this object.
    ///
    /// **Context**: This is the main cascade. Categories are appended in a
    /// fixed order and are not exclusive of each other:
    ///
    /// **How it Works**:
    /// 1. `samecenter`, then exactly one of `near`/`far`.
    /// 2. `disjoint` up front when the enclosing spheres are apart.
    /// 3. Directions of the subject center (`left`, `ahead`, `above`, ...).
    /// 4. Side adjacency of the nearby subject corners (`leftside`, `ontop`,
    ///    `beside`, ...).
    /// 5. Assembly: at most one of `inside`, `containing`, `overlapping`,
    ///    `crossing`, `touching`/`meeting`, else `disjoint`.
    /// 6. Orientation: `aligned` with face alignments, or `opposite`, or
    ///    `orthogonal`.
    /// 7. Clock positions and `tangible` when visibility is deduced.
    pub fn topologies(&self, subject: &SpatialObject, ctx: &Context) -> Vec<SpatialRelation> {
        let adjustment = &ctx.adjustment;
        let mut facts = Facts::new(subject, self);
        let center_distance = (subject.center() - self.center()).norm();
        let can_not_overlap = center_distance > self.radius() + subject.radius();
        let local_center = self.into_local(&subject.center());
        let local_box = LocalBox::new(self.into_local_pts(&subject.points(false)));

        if center_distance < adjustment.max_gap {
            facts.add(SameCenter, center_distance);
        }
        if center_distance < subject.nearby_radius(adjustment) + self.nearby_radius(adjustment) {
            facts.add(Near, center_distance);
        } else {
            facts.add(Far, center_distance);
        }
        if can_not_overlap {
            facts.add(Disjoint, center_distance);
        }

        self.directions(&mut facts, &local_center, adjustment);
        let aligned = self.side_adjacency(&mut facts, &local_center, &local_box, ctx);
        self.assembly(&mut facts, &local_box, center_distance, can_not_overlap, aligned, ctx);
        self.orientation(&mut facts, &local_center, center_distance, adjustment);
        if ctx.deduce.visibility {
            self.clock_position(&mut facts, &local_center, center_distance);
        }
        facts.relations
    }

    fn directions(&self, facts: &mut Facts, local_center: &Point3<f64>, adjustment: &Adjustment) {
        let subject = facts.subject;
        let zone = self.sector_of(local_center, adjustment, false, Some(-adjustment.max_gap));
        if zone.contains(BBoxSector::L) {
            facts.add(Left, local_center.x - self.width / 2.0 - subject.width / 2.0);
        } else if zone.contains(BBoxSector::R) {
            facts.add(Right, -local_center.x - self.width / 2.0 - subject.width / 2.0);
        }
        if zone.contains(BBoxSector::A) {
            facts.add(Ahead, local_center.z - self.depth / 2.0 - subject.depth / 2.0);
        } else if zone.contains(BBoxSector::B) {
            facts.add(Behind, -local_center.z - self.depth / 2.0 - subject.depth / 2.0);
        }
        if zone.contains(BBoxSector::O) {
            facts.add(Above, local_center.y - subject.height / 2.0 - self.height);
        } else if zone.contains(BBoxSector::U) {
            facts.add(Below, -local_center.y - subject.height / 2.0);
        }
    }

    /// Side relations of a nearby subject. Returns whether both boxes are
    /// aligned up to quarter turns.
    fn side_adjacency(
        &self,
        facts: &mut Facts,
        local_center: &Point3<f64>,
        local_box: &LocalBox,
        ctx: &Context,
    ) -> bool {
        let adjustment = &ctx.adjustment;
        let max_gap = adjustment.max_gap;
        let aligned = angle_near(facts.theta, FRAC_PI_2, adjustment.max_angle_delta);
        let zone = self.sector_of(local_center, adjustment, true, Some(-max_gap));
        if zone == BBoxSector::I {
            return aligned;
        }

        let mut side_gap = f64::INFINITY;
        let mut at_side = false;

        let lateral = if zone.contains(BBoxSector::L) {
            Some((LeftSide, local_box.x.0 - self.width / 2.0))
        } else if zone.contains(BBoxSector::R) {
            Some((RightSide, -local_box.x.1 - self.width / 2.0))
        } else {
            None
        };
        if let Some((predicate, gap)) = lateral {
            if gap >= 0.0 {
                facts.add(predicate, gap);
                side_gap = side_gap.min(gap);
                at_side = true;
            }
        }

        if zone.contains(BBoxSector::O) {
            let gap = local_box.y.0 - self.height;
            if gap >= 0.0 {
                if gap <= max_gap {
                    facts.add(OnTop, gap);
                    if ctx.deduce.connectivity {
                        facts.add(On, gap);
                    }
                }
                facts.add(UpperSide, gap);
            }
        } else if zone.contains(BBoxSector::U) {
            let gap = -local_box.y.1;
            if gap >= 0.0 {
                if gap <= max_gap {
                    facts.add(Beneath, gap);
                }
                facts.add(LowerSide, gap);
            }
        }

        let frontal = if zone.contains(BBoxSector::A) {
            Some((FrontSide, local_box.z.0 - self.depth / 2.0))
        } else if zone.contains(BBoxSector::B) {
            Some((BackSide, -local_box.z.1 - self.depth / 2.0))
        } else {
            None
        };
        if let Some((predicate, gap)) = frontal {
            if gap >= 0.0 {
                facts.add(predicate, gap);
                side_gap = side_gap.min(gap);
                at_side = true;
            }
        }

        if aligned && at_side {
            facts.add(Beside, side_gap);
            if side_gap <= TOUCHING_GAP {
                facts.add(Touching, side_gap);
                if ctx.deduce.connectivity {
                    facts.add(By, side_gap);
                }
            }
        }
        aligned
    }

    fn assembly(
        &self,
        facts: &mut Facts,
        local_box: &LocalBox,
        center_distance: f64,
        can_not_overlap: bool,
        aligned: bool,
        ctx: &Context,
    ) {
        let adjustment = &ctx.adjustment;
        let max_gap = adjustment.max_gap;
        let subject = facts.subject;
        let (half_width, half_depth) = (self.width / 2.0, self.depth / 2.0);
        let inside_corners = local_box
            .corners
            .iter()
            .filter(|p| self.sector_of(p, adjustment, false, Some(INSIDE_EPSILON)) == BBoxSector::I)
            .count();

        if inside_corners == local_box.corners.len() {
            facts.add(Inside, center_distance);
            if ctx.deduce.connectivity {
                facts.add(In, center_distance);
            }
            return;
        }
        if subject.radius() - self.radius() > center_distance / 2.0
            && subject.width > self.width
            && subject.height > self.height
            && subject.depth > self.depth
        {
            facts.add(Containing, 0.0);
            return;
        }
        if inside_corners > 0 && !can_not_overlap {
            facts.add(Overlapping, center_distance);
            return;
        }

        let (min_x, max_x) = local_box.x;
        let (min_y, max_y) = local_box.y;
        let (min_z, max_z) = local_box.z;

        if !can_not_overlap {
            let spans_x = min_x < -half_width && max_x > half_width;
            let spans_y = min_y < 0.0 && max_y > self.height;
            let spans_z = min_z < -half_depth && max_z > half_depth;
            let meets_x = min_x < half_width && max_x > -half_width;
            let meets_y = min_y < self.height && max_y > 0.0;
            let meets_z = min_z < half_depth && max_z > -half_depth;
            if (spans_x && meets_z && meets_y)
                || (spans_z && meets_x && meets_y)
                || (spans_y && meets_x && meets_z)
            {
                facts.add(Crossing, center_distance);
                return;
            }
        }

        if min_y < self.height + max_gap && max_y > -max_gap {
            let ylap = if max_y < self.height && min_y > 0.0 {
                max_y - min_y
            } else if min_y > 0.0 {
                (self.height - min_y).abs()
            } else {
                max_y.abs()
            };
            let xlap = axis_overlap(min_x, max_x, half_width, max_gap, max_gap);
            let zlap = axis_overlap(min_z, max_z, half_depth, max_gap, 0.0);
            let gap = xlap.min(zlap);

            if !aligned && can_not_overlap && gap > 0.0 && gap < max_gap {
                if max_x < -half_width + max_gap
                    || min_x > half_width - max_gap
                    || max_z < -half_depth + max_gap
                    || min_z > half_depth - max_gap
                {
                    facts.add(Touching, gap);
                    if ctx.deduce.connectivity {
                        facts.add(By, gap);
                    }
                    return;
                }
                log::warn!(
                    "{} and {} may cross at an angle, contact by shortest distance is not classified",
                    subject.id,
                    self.id
                );
            } else if xlap >= 0.0 && zlap >= 0.0 {
                if ylap > max_gap && gap < max_gap {
                    if xlap > max_gap || zlap > max_gap {
                        facts.add(Meeting, xlap.max(zlap));
                        if ctx.deduce.connectivity && subject.volume() < self.volume() {
                            facts.add(At, gap);
                        }
                    } else {
                        facts.add(Touching, gap);
                        if ctx.deduce.connectivity {
                            facts.add(By, gap);
                        }
                    }
                } else if xlap > max_gap && zlap > max_gap {
                    facts.add(Meeting, ylap);
                } else {
                    facts.add(Touching, ylap);
                }
                return;
            }
        }

        // already reported up front
        if !can_not_overlap {
            facts.add(Disjoint, center_distance);
        }
    }

    fn orientation(
        &self,
        facts: &mut Facts,
        local_center: &Point3<f64>,
        center_distance: f64,
        adjustment: &Adjustment,
    ) {
        let subject = facts.subject;
        let max_gap = adjustment.max_gap;
        let tolerance = adjustment.max_angle_delta;
        let theta = facts.theta;

        if theta.abs() < tolerance {
            facts.add(Aligned, local_center.z);
            let faces = [
                (FrontAligned, local_center.z + subject.depth / 2.0 - self.depth / 2.0),
                (BackAligned, local_center.z - subject.depth / 2.0 + self.depth / 2.0),
                (RightAligned, local_center.x - subject.width / 2.0 + self.width / 2.0),
                (LeftAligned, local_center.x + subject.width / 2.0 - self.width / 2.0),
            ];
            for (predicate, gap) in faces {
                if gap.abs() < max_gap {
                    facts.add(predicate, gap);
                }
            }
        } else if angle_near(theta, PI, tolerance) {
            facts.add(Opposite, center_distance);
        } else if angle_near(theta, FRAC_PI_2, tolerance) {
            facts.add(Orthogonal, center_distance);
        }
    }

    /// Hour position of the subject center with twelve o'clock straight
    /// ahead. Positions from five to seven o'clock are not reported.
    ///
    /// The bearing is pushed half an hour away from zero before rounding,
    /// so anything off dead ahead already counts as the neighbouring hour.
    /// Exact ties round to the even hour.
    fn clock_position(&self, facts: &mut Facts, local_center: &Point3<f64>, center_distance: f64) {
        let bearing = local_center.x.atan2(local_center.z);
        let degrees = bearing.to_degrees();
        let shifted = degrees + (HOUR_ANGLE / 2.0).copysign(degrees);
        let hour = (shifted / HOUR_ANGLE).round_ties_even() as i64;
        let predicate = match hour {
            -4 => FourOClock,
            -3 => ThreeOClock,
            -2 => TwoOClock,
            -1 => OneOClock,
            0 => TwelveOClock,
            1 => ElevenOClock,
            2 => TenOClock,
            3 => NineOClock,
            4 => EightOClock,
            _ => return,
        };
        facts.add_with_angle(predicate, center_distance, bearing);
        if center_distance <= TANGIBLE_DISTANCE {
            facts.add_with_angle(Tangible, center_distance, bearing);
        }
    }

    /// Fuzzy equalities of the measures of `subject` and this object.
    pub fn similarities(&self, subject: &SpatialObject, adjustment: &Adjustment) -> Vec<SpatialRelation> {
        let mut facts = Facts::new(subject, self);
        let max_gap = adjustment.max_gap;
        let within = |value: f64, low: f64, high: f64| low < value && value < high;

        let center_distance = (self.center() - subject.center()).norm();
        if center_distance < max_gap {
            facts.add(SameCenter, center_distance);
        }
        let position_distance = (self.position - subject.position).norm();
        if position_distance < max_gap {
            facts.add(SamePosition, position_distance);
        }

        let mut same_dimensions = true;
        for (predicate, own, other) in [
            (SameWidth, self.width, subject.width),
            (SameDepth, self.depth, subject.depth),
            (SameHeight, self.height, subject.height),
        ] {
            let diff = (own - other).abs();
            if diff < max_gap {
                facts.add(predicate, diff);
            } else {
                same_dimensions = false;
            }
        }

        let diff = self.perimeter() - subject.perimeter();
        if diff.abs() < 4.0 * max_gap {
            facts.add(SamePerimeter, diff);
        }
        if same_dimensions {
            facts.add(SameCuboid, subject.volume() - self.volume());
        }
        let diff = (self.length() - subject.length()).abs();
        if diff < max_gap {
            facts.add(SameLength, diff);
        }

        let (low_w, high_w) = (self.width - max_gap, self.width + max_gap);
        let (low_h, high_h) = (self.height - max_gap, self.height + max_gap);
        let (low_d, high_d) = (self.depth - max_gap, self.depth + max_gap);

        if within(subject.frontface(), low_h * low_w, high_h * high_w) {
            facts.add(SameFront, self.frontface() - subject.frontface());
        }
        if within(subject.sideface(), low_h * low_d, high_h * high_d) {
            facts.add(SameSide, self.sideface() - subject.sideface());
        }
        if within(subject.footprint(), low_w * low_d, high_w * high_d) {
            facts.add(SameFootprint, self.footprint() - subject.footprint());
        }
        if within(
            subject.surface(),
            box_surface(low_w, low_h, low_d),
            box_surface(high_w, high_h, high_d),
        ) {
            facts.add(SameSurface, self.surface() - subject.surface());
        }
        if within(subject.volume(), low_w * low_h * low_d, high_w * high_h * high_d) {
            let gap = self.volume() - subject.volume();
            facts.add(SameVolume, gap);
            if same_dimensions
                && position_distance < max_gap
                && (self.angle - subject.angle).abs() < adjustment.max_angle_delta
            {
                facts.add(Congruent, gap);
            }
        }
        if self.shape == subject.shape && self.shape != ObjectShape::Unknown {
            facts.add(SameShape, self.volume() - subject.volume());
        }
        facts.relations
    }

    /// Ordering of the measures of `subject` against this object.
    pub fn comparisons(&self, subject: &SpatialObject, adjustment: &Adjustment) -> Vec<SpatialRelation> {
        let mut facts = Facts::new(subject, self);
        let max_gap = adjustment.max_gap;
        let mut shorter_added = false;

        let diff = subject.length() - self.length();
        if diff > max_gap.powi(3) {
            facts.add(Longer, diff);
        } else if -diff > max_gap.powi(3) {
            facts.add(Shorter, diff);
            shorter_added = true;
        }

        let diff = subject.height - self.height;
        if diff > max_gap {
            facts.add(Taller, diff);
        } else if -diff > max_gap && !shorter_added {
            facts.add(Shorter, diff);
        }

        if subject.main_direction(adjustment) == 2 {
            let diff = subject.footprint() - self.footprint();
            if diff > max_gap.powi(2) {
                facts.add(Wider, diff);
            } else if -diff > max_gap.powi(2) {
                facts.add(Thinner, diff);
            }
        }

        let diff = subject.volume() - self.volume();
        if diff > max_gap.powi(3) {
            facts.add(Bigger, diff);
            facts.add(Exceeding, diff);
        } else if -diff > max_gap.powi(3) {
            facts.add(Smaller, diff);
        }

        if self.height > subject.height && self.footprint() > subject.footprint() {
            facts.add(Fitting, diff);
        }
        facts.relations
    }

    /// The sector of this object holding the subject center.
    pub fn sector(
        &self,
        subject: &SpatialObject,
        adjustment: &Adjustment,
        near_by: bool,
        epsilon: Option<f64>,
    ) -> SpatialRelation {
        let local_center = self.into_local(&subject.center());
        let zone = self.sector_of(&local_center, adjustment, near_by, epsilon);
        SpatialRelation::new(
            subject.id.as_str(),
            SpatialPredicate::named(&zone.code()),
            self.id.as_str(),
            (subject.center() - self.center()).norm(),
            subject.angle - self.angle,
        )
    }

    /// Relations of a nearby subject as seen from `observer`, with both
    /// ahead of the observer.
    pub fn asseen(
        &self,
        subject: &SpatialObject,
        observer: &SpatialObject,
        adjustment: &Adjustment,
    ) -> Vec<SpatialRelation> {
        let mut facts = Facts::new(subject, self);
        let distance = (subject.position - self.position).norm();
        if distance >= subject.nearby_radius(adjustment) + self.nearby_radius(adjustment) {
            return facts.relations;
        }
        let object_center = observer.into_local(&self.center());
        let subject_center = observer.into_local(&subject.center());
        if object_center.z <= 0.0 || subject_center.z <= 0.0 {
            return facts.relations;
        }

        // turn the line of sight to the object onto +z
        let bearing = object_center.x.atan2(object_center.z);
        let object_center = rotate_y(&object_center, bearing);
        let subject_center = rotate_y(&subject_center, bearing);
        let xgap = subject_center.x - object_center.x;
        let zgap = subject_center.z - object_center.z;
        let radius_sum = self.baseradius() + subject.baseradius();
        let threshold = (self.width / 2.0).min(self.depth / 2.0);

        if xgap.abs() > threshold && zgap.abs() < radius_sum {
            let predicate = if xgap > 0.0 { SeenLeft } else { SeenRight };
            facts.add_with_angle(predicate, xgap.abs(), 0.0);
        }
        if zgap.abs() > threshold && xgap.abs() < radius_sum {
            let predicate = if zgap > 0.0 { AtRear } else { InFront };
            facts.add_with_angle(predicate, zgap.abs(), 0.0);
        }
        facts.relations
    }

    /// All relations of `subject` to this object for the categories enabled
    /// in `ctx`, plus the ones forced by the flags.
    pub fn relate(
        &self,
        subject: &SpatialObject,
        ctx: &Context,
        topology: bool,
        similarity: bool,
        comparison: bool,
    ) -> Vec<SpatialRelation> {
        let mut result = Vec::new();
        if topology || ctx.deduce.topology || ctx.deduce.connectivity {
            result.extend(self.topologies(subject, ctx));
        }
        if similarity || ctx.deduce.similarity {
            result.extend(self.similarities(subject, &ctx.adjustment));
        }
        if comparison || ctx.deduce.comparability {
            result.extend(self.comparisons(subject, &ctx.adjustment));
        }
        if ctx.deduce.sectoriality {
            result.push(self.sector(subject, &ctx.adjustment, false, None));
        }
        if let Some(observer) = ctx.observer {
            if ctx.deduce.visibility {
                result.extend(self.asseen(subject, observer, &ctx.adjustment));
            }
        }
        result
    }
}

/// Overlap of the subject extent `[min, max]` with `[-half, half]` along
/// one axis, or -1 if they are more than `max_gap` apart. A subject
/// reaching past the lower bound by less than `slack` is measured from
/// its `min` side.
fn axis_overlap(min: f64, max: f64, half: f64, max_gap: f64, slack: f64) -> f64 {
    if !(min < half + max_gap && max > -half - max_gap) {
        return -1.0;
    }
    if max < half && min > -half {
        max - min
    } else if min > -half - slack {
        (half - min).abs()
    } else {
        (max + half).abs()
    }
}
