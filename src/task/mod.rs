//! Task record management.
//!
//! The module follows hexagonal architecture:
//!
//! - Domain types and field rules in [`domain`]
//! - Repository and unit-of-work contracts in [`ports`]
//! - In-memory and `PostgreSQL` implementations in [`adapters`]
//!
//! Validation lives in the domain so that every backend applies the same
//! create and merge rules.

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
