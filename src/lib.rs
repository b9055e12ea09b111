//! Qualitative spatial relations between oriented 3D bounding boxes.
//!
//! Objects are boxes standing on a ground plane, rotated around the
//! vertical axis. Comparing a subject box with an object box yields facts
//! such as `near`, `left`, `inside`, `ontop`, `frontaligned` or `congruent`.

pub mod basics;
pub mod config;
pub mod context;
pub mod deduction;
pub mod error;
pub mod geom;
pub mod object;
pub mod predicate;
pub mod relation;
pub mod scene;
pub mod sector;
pub mod settings;
