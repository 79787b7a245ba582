//! Schema model for SCIM resources.
//!
//! Implements the RFC 7643 schema structures: attribute definitions with
//! their type, cardinality, mutability, uniqueness and canonical-value
//! characteristics, and [`Schema`] as an ordered, indexed collection of
//! attributes. Schemas are built once at resource-type registration and are
//! immutable afterwards.

pub mod embedded;
pub mod types;

#[cfg(test)]
mod tests;

pub use types::{AttributeType, Mutability, Returned, Schema, SchemaAttribute, Uniqueness};
