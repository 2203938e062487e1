//! Storage adapters implementing the task repository ports.

pub mod memory;
pub mod postgres;
