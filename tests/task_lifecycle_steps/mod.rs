//! Step definitions for task lifecycle scenarios.

pub mod when;
pub mod world;
