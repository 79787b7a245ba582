//! Abstract syntax tree for the SCIM filter language.
//!
//! A parsed filter is a [`FilterNode`] tree: attribute-expression leaves
//! combined by `and`/`or`/`not`. Each leaf is resolved against the resource
//! type's schema set at parse time, so evaluation and translation to backing
//! queries never have to re-resolve attribute names.

use crate::schema::SchemaAttribute;
use std::fmt;

/// Filter comparison operators (RFC 7644 §3.4.2.2). Tokens are matched
/// case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Ne,
    Co,
    Sw,
    Ew,
    Pr,
    Gt,
    Ge,
    Lt,
    Le,
}

impl Comparator {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "eq" => Some(Comparator::Eq),
            "ne" => Some(Comparator::Ne),
            "co" => Some(Comparator::Co),
            "sw" => Some(Comparator::Sw),
            "ew" => Some(Comparator::Ew),
            "pr" => Some(Comparator::Pr),
            "gt" => Some(Comparator::Gt),
            "ge" => Some(Comparator::Ge),
            "lt" => Some(Comparator::Lt),
            "le" => Some(Comparator::Le),
            _ => None,
        }
    }

    /// `pr` is the only comparator that takes no compare value.
    pub fn requires_value(&self) -> bool {
        !matches!(self, Comparator::Pr)
    }

    /// Whether this comparator needs an ordered attribute type.
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Comparator::Gt | Comparator::Ge | Comparator::Lt | Comparator::Le
        )
    }

    /// Whether this comparator is a substring match, legal on strings only.
    pub fn is_substring(&self) -> bool {
        matches!(self, Comparator::Co | Comparator::Sw | Comparator::Ew)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Comparator::Eq => "eq",
            Comparator::Ne => "ne",
            Comparator::Co => "co",
            Comparator::Sw => "sw",
            Comparator::Ew => "ew",
            Comparator::Pr => "pr",
            Comparator::Gt => "gt",
            Comparator::Ge => "ge",
            Comparator::Lt => "lt",
            Comparator::Le => "le",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The typed literal on the right-hand side of an attribute expression.
#[derive(Debug, Clone, PartialEq)]
pub enum CompareValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
}

impl fmt::Display for CompareValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareValue::String(s) => write!(f, "{}", serde_json::Value::String(s.clone())),
            CompareValue::Number(n) => write!(f, "{n}"),
            CompareValue::Boolean(b) => write!(f, "{b}"),
            CompareValue::Null => f.write_str("null"),
        }
    }
}

/// An attribute path resolved against a concrete schema set.
///
/// Covers plain names (`userName`), URI-qualified names
/// (`urn:...:User:userName`), dotted sub-attributes (`name.givenName`) and
/// bracket notation selecting entries of a multi-valued complex attribute
/// (`members[value eq "123"].display`).
#[derive(Debug, Clone, PartialEq)]
pub struct AttributePath {
    /// The schema the attribute was resolved in.
    pub schema_id: String,
    /// Short name of the top-level attribute, in schema casing.
    pub attribute_name: String,
    /// Sub-attribute short name for dotted or bracket paths.
    pub sub_attribute: Option<String>,
    /// Value filter from bracket notation, resolved against the complex
    /// attribute's sub-attributes.
    pub value_filter: Option<Box<FilterNode>>,
    /// Definition of the top-level attribute.
    pub attribute: SchemaAttribute,
    /// Whether the path was written with an explicit schema URI prefix.
    pub uri_qualified: bool,
}

impl AttributePath {
    /// The attribute definition the path ultimately targets: the
    /// sub-attribute when one is named, else the top-level attribute.
    pub fn target(&self) -> &SchemaAttribute {
        match &self.sub_attribute {
            Some(sub) => self
                .attribute
                .sub_attribute(sub)
                .unwrap_or(&self.attribute),
            None => &self.attribute,
        }
    }

    /// Fully qualified name, `schemaUri:attr` or `schemaUri:attr.sub`.
    pub fn fully_qualified_name(&self) -> String {
        match &self.sub_attribute {
            Some(sub) => format!("{}:{}.{}", self.schema_id, self.attribute_name, sub),
            None => format!("{}:{}", self.schema_id, self.attribute_name),
        }
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.attribute_name)?;
        if let Some(filter) = &self.value_filter {
            write!(f, "[{filter}]")?;
        }
        if let Some(sub) = &self.sub_attribute {
            write!(f, ".{sub}")?;
        }
        Ok(())
    }
}

/// One comparison leaf of the filter tree.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeExpression {
    pub path: AttributePath,
    pub comparator: Comparator,
    pub value: Option<CompareValue>,
}

/// A parsed filter expression. Built once per request, immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    Leaf(AttributeExpression),
    And(Box<FilterNode>, Box<FilterNode>),
    Or(Box<FilterNode>, Box<FilterNode>),
    Not(Box<FilterNode>),
}

impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterNode::Leaf(leaf) => {
                write!(f, "{}", leaf.path)?;
                write!(f, " {}", leaf.comparator)?;
                if let Some(value) = &leaf.value {
                    write!(f, " {value}")?;
                }
                Ok(())
            }
            FilterNode::And(left, right) => write!(f, "({left} and {right})"),
            FilterNode::Or(left, right) => write!(f, "({left} or {right})"),
            FilterNode::Not(child) => write!(f, "not ({child})"),
        }
    }
}
