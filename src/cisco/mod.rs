//! Cisco ACL rendering
//!
//! This module translates the abstract policy model into Cisco
//! access-control-list configuration. It provides:
//!
//! - [`generator`]: the filter assembler and document entry point
//! - [`extended`]: cartesian expansion into extended-ACL statements
//! - [`standard`]: the restricted standard-ACL statement form
//! - [`object_group`]: group-referencing statements and group definitions
//! - [`normalize`]: effective match sets and the `established` pass
//! - [`protocol`]: protocol-name resolution with the Cisco keyword list
//! - [`error`]: error types for document assembly

pub mod error;
pub mod extended;
pub mod generator;
pub mod normalize;
pub mod object_group;
pub mod protocol;
pub mod standard;

pub use error::{Error, Result, StandardTermViolation};
pub use generator::{Cisco, FilterType};

#[cfg(test)]
pub mod test_helpers;
