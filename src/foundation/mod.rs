//! Foundation utilities: math primitives, simulation time, and logging.

pub mod logging;
pub mod math;
pub mod time;

pub use math::{Quat, Vec3};
pub use time::Clock;
