//! The SCIM filter language: tokenizer, recursive-descent parser, AST and
//! in-memory evaluator (RFC 7644 §3.4.2.2).
//!
//! Parsing resolves every attribute leaf against the resource type's schema
//! set, so a successful parse guarantees each comparator is legal for its
//! attribute's type. The resulting [`FilterNode`] tree is immutable and can
//! be evaluated in memory or handed to a `ResourceHandler` for translation
//! into a backing query language.

pub mod ast;
pub mod evaluator;
pub mod lexer;
pub mod parser;

#[cfg(test)]
mod tests;

pub use ast::{AttributeExpression, AttributePath, Comparator, CompareValue, FilterNode};
pub use evaluator::{evaluate, evaluate_on_entry, extract_values};
pub use parser::{parse_filter, parse_path};
