//! Step definitions for cascading deletion scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
