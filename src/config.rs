pub const TOUCHING_GAP: f64 = 0.05; // max side gap for a beside pair to also be touching
pub const TANGIBLE_DISTANCE: f64 = 1.25; // within arm reach of the reference object
pub const INSIDE_EPSILON: f64 = 0.00001; // corner tolerance for the inside test
pub const MIN_UPDATE_INTERVAL: f64 = 0.003; // seconds between position writes for a velocity estimate
pub const LENGTH_RATIO: f64 = 1.1; // ratio selecting the axis reported as `length`
pub const HOUR_ANGLE: f64 = 30.0; // degrees per clock position
