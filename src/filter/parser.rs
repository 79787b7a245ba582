//! Hand-written recursive-descent parser for the SCIM filter grammar.
//!
//! Grammar (RFC 7644 §3.4.2.2):
//!
//! ```text
//! filter   := orExpr
//! orExpr   := andExpr ("or" andExpr)*
//! andExpr  := term ("and" term)*
//! term     := "not" "(" filter ")" | "(" filter ")" | attrExpr
//! attrExpr := attrPath ("pr" | compareOp compareValue)
//! attrPath := [schemaUri ":"] name ["." subName]
//!           | name "[" filter "]" ["." subName]
//! ```
//!
//! Attribute paths are resolved against the resource type's schema set while
//! parsing: unknown names, names that are ambiguous across the registered
//! schemas, and comparator/type mismatches all fail here, before any
//! evaluation happens.

use super::ast::{AttributeExpression, AttributePath, Comparator, CompareValue, FilterNode};
use super::lexer::{Token, TokenKind, tokenize};
use crate::error::{ScimError, ScimResult, ScimType};
use crate::schema::{AttributeType, Schema, SchemaAttribute};
use chrono::DateTime;

/// Parse a complete filter expression against the given schema set.
///
/// The first schema is the resource type's primary schema; any further
/// entries are its extensions. Unqualified attribute names matching more
/// than one schema are rejected as ambiguous.
pub fn parse_filter(input: &str, schemas: &[&Schema]) -> ScimResult<FilterNode> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(ScimError::invalid_filter("the filter expression is empty"));
    }
    let mut parser = Parser {
        tokens,
        position: 0,
        schemas,
    };
    let node = parser.parse_or(None)?;
    parser.expect_end()?;
    Ok(node)
}

/// Parse a PATCH-style attribute path (`members[value eq "123"].display`).
///
/// Shares the filter grammar's path rules; errors are reported with the
/// `invalidPath` scimType instead of `invalidFilter`.
pub fn parse_path(input: &str, schemas: &[&Schema]) -> ScimResult<AttributePath> {
    let result = (|| {
        let tokens = tokenize(input)?;
        if tokens.is_empty() {
            return Err(ScimError::invalid_path("the attribute path is empty"));
        }
        let mut parser = Parser {
            tokens,
            position: 0,
            schemas,
        };
        let path = parser.parse_attribute_path(None)?;
        parser.expect_end()?;
        Ok(path)
    })();
    result.map_err(|error| match error {
        ScimError::BadRequest {
            scim_type: Some(ScimType::InvalidFilter),
            detail,
        } => ScimError::invalid_path(detail),
        other => other,
    })
}

struct Parser<'a> {
    tokens: Vec<Token>,
    position: usize,
    schemas: &'a [&'a Schema],
}

/// Resolution scope for bracket sub-filters: leaves inside
/// `attr[...]` resolve against the complex attribute's sub-attributes.
struct ComplexScope {
    schema_id: String,
    attribute: SchemaAttribute,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.position).map(|t| &t.kind)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn expect_end(&self) -> ScimResult<()> {
        if self.position < self.tokens.len() {
            return Err(ScimError::invalid_filter(format!(
                "unexpected trailing token at position {}",
                self.tokens[self.position].position
            )));
        }
        Ok(())
    }

    fn expect(&mut self, expected: &TokenKind, description: &str) -> ScimResult<()> {
        match self.next() {
            Some(token) if token.kind == *expected => Ok(()),
            Some(token) => Err(ScimError::invalid_filter(format!(
                "expected {description} at position {}",
                token.position
            ))),
            None => Err(ScimError::invalid_filter(format!(
                "expected {description} but the filter ended"
            ))),
        }
    }

    fn parse_or(&mut self, scope: Option<&ComplexScope>) -> ScimResult<FilterNode> {
        let mut node = self.parse_and(scope)?;
        while let Some(TokenKind::Word(word)) = self.peek() {
            if !word.eq_ignore_ascii_case("or") {
                break;
            }
            self.next();
            let right = self.parse_and(scope)?;
            node = FilterNode::Or(Box::new(node), Box::new(right));
        }
        Ok(node)
    }

    fn parse_and(&mut self, scope: Option<&ComplexScope>) -> ScimResult<FilterNode> {
        let mut node = self.parse_term(scope)?;
        while let Some(TokenKind::Word(word)) = self.peek() {
            if !word.eq_ignore_ascii_case("and") {
                break;
            }
            self.next();
            let right = self.parse_term(scope)?;
            node = FilterNode::And(Box::new(node), Box::new(right));
        }
        Ok(node)
    }

    fn parse_term(&mut self, scope: Option<&ComplexScope>) -> ScimResult<FilterNode> {
        match self.peek() {
            Some(TokenKind::Word(word)) if word.eq_ignore_ascii_case("not") => {
                self.next();
                self.expect(&TokenKind::LeftParen, "'(' after 'not'")?;
                let child = self.parse_or(scope)?;
                self.expect(&TokenKind::RightParen, "')'")?;
                Ok(FilterNode::Not(Box::new(child)))
            }
            Some(TokenKind::LeftParen) => {
                self.next();
                let child = self.parse_or(scope)?;
                self.expect(&TokenKind::RightParen, "')'")?;
                Ok(child)
            }
            Some(TokenKind::Word(_)) => self.parse_attribute_expression(scope),
            Some(_) => {
                let token = self.next().unwrap();
                Err(ScimError::invalid_filter(format!(
                    "expected an attribute expression at position {}",
                    token.position
                )))
            }
            None => Err(ScimError::invalid_filter(
                "the filter ended where an expression was expected",
            )),
        }
    }

    fn parse_attribute_expression(
        &mut self,
        scope: Option<&ComplexScope>,
    ) -> ScimResult<FilterNode> {
        let mut path = self.parse_attribute_path(scope)?;

        let comparator = match self.next() {
            Some(Token {
                kind: TokenKind::Word(word),
                position,
            }) => Comparator::from_token(&word).ok_or_else(|| {
                ScimError::invalid_filter(format!(
                    "'{word}' at position {position} is not a valid comparator"
                ))
            })?,
            Some(token) => {
                return Err(ScimError::invalid_filter(format!(
                    "expected a comparator at position {}",
                    token.position
                )));
            }
            None => {
                return Err(ScimError::invalid_filter(format!(
                    "attribute '{}' is not followed by a comparator",
                    path.attribute_name
                )));
            }
        };

        let value = if comparator.requires_value() {
            Some(self.parse_compare_value()?)
        } else {
            None
        };

        // A value comparison against a bare complex attribute implicitly
        // targets its "value" sub-attribute.
        if comparator.requires_value()
            && path.sub_attribute.is_none()
            && path.attribute.attribute_type == AttributeType::Complex
        {
            if path.attribute.sub_attribute("value").is_none() {
                return Err(ScimError::invalid_filter(format!(
                    "complex attribute '{}' cannot be compared directly; it has no 'value' \
                     sub-attribute",
                    path.attribute_name
                )));
            }
            path.sub_attribute = Some("value".to_string());
        }

        check_compatibility(&path, comparator, value.as_ref())?;

        Ok(FilterNode::Leaf(AttributeExpression {
            path,
            comparator,
            value,
        }))
    }

    fn parse_compare_value(&mut self) -> ScimResult<CompareValue> {
        match self.next() {
            Some(Token {
                kind: TokenKind::StringLiteral(s),
                ..
            }) => Ok(CompareValue::String(s)),
            Some(Token {
                kind: TokenKind::Number(n),
                ..
            }) => Ok(CompareValue::Number(n)),
            Some(Token {
                kind: TokenKind::Word(word),
                position,
            }) => {
                if word.eq_ignore_ascii_case("true") {
                    Ok(CompareValue::Boolean(true))
                } else if word.eq_ignore_ascii_case("false") {
                    Ok(CompareValue::Boolean(false))
                } else if word.eq_ignore_ascii_case("null") {
                    Ok(CompareValue::Null)
                } else {
                    Err(ScimError::invalid_filter(format!(
                        "'{word}' at position {position} is not a valid compare value"
                    )))
                }
            }
            Some(token) => Err(ScimError::invalid_filter(format!(
                "expected a compare value at position {}",
                token.position
            ))),
            None => Err(ScimError::invalid_filter(
                "the filter ended where a compare value was expected",
            )),
        }
    }

    fn parse_attribute_path(
        &mut self,
        scope: Option<&ComplexScope>,
    ) -> ScimResult<AttributePath> {
        let (word, position) = match self.next() {
            Some(Token {
                kind: TokenKind::Word(word),
                position,
            }) => (word, position),
            Some(token) => {
                return Err(ScimError::invalid_filter(format!(
                    "expected an attribute name at position {}",
                    token.position
                )));
            }
            None => {
                return Err(ScimError::invalid_filter(
                    "the filter ended where an attribute name was expected",
                ));
            }
        };

        let mut path = match scope {
            Some(scope) => resolve_in_complex(scope, &word, position)?,
            None => resolve_in_schemas(self.schemas, &word, position)?,
        };

        // Bracket notation selecting entries of a multi-valued complex
        // attribute, only legal at root scope.
        if self.peek() == Some(&TokenKind::LeftBracket) {
            self.next();
            if path.attribute.attribute_type != AttributeType::Complex || !path.attribute.multi_valued
            {
                return Err(ScimError::invalid_filter(format!(
                    "attribute '{}' is not a multi-valued complex attribute and cannot take a \
                     value filter",
                    path.attribute_name
                )));
            }
            if path.sub_attribute.is_some() {
                return Err(ScimError::invalid_filter(format!(
                    "a value filter must follow the attribute name, not the sub-attribute, in \
                     '{word}'"
                )));
            }
            let inner_scope = ComplexScope {
                schema_id: path.schema_id.clone(),
                attribute: path.attribute.clone(),
            };
            let value_filter = self.parse_or(Some(&inner_scope))?;
            self.expect(&TokenKind::RightBracket, "']'")?;
            path.value_filter = Some(Box::new(value_filter));

            // Optional ".sub" after the bracket.
            if let Some(TokenKind::Word(next_word)) = self.peek() {
                if let Some(sub_name) = next_word.strip_prefix('.') {
                    let sub_name = sub_name.to_string();
                    let next_position = self.tokens[self.position].position;
                    self.next();
                    if path.attribute.sub_attribute(&sub_name).is_none() {
                        return Err(ScimError::invalid_filter(format!(
                            "attribute '{}' has no sub-attribute '{sub_name}' (position {})",
                            path.attribute_name, next_position
                        )));
                    }
                    path.sub_attribute = Some(sub_name);
                }
            }
        }

        Ok(path)
    }
}

/// Resolve a bare or URI-qualified attribute word against the schema set.
fn resolve_in_schemas(
    schemas: &[&Schema],
    word: &str,
    position: usize,
) -> ScimResult<AttributePath> {
    // URI-qualified: the longest schema id that prefixes the word wins.
    if word.contains(':') {
        for schema in schemas {
            let prefix = format!("{}:", schema.id.to_lowercase());
            if word.to_lowercase().starts_with(&prefix) {
                let remainder = &word[prefix.len()..];
                return resolve_name_in_schema(schema, remainder, word, position, true);
            }
        }
        return Err(ScimError::invalid_filter(format!(
            "'{word}' does not match any schema of this resource type"
        )));
    }

    let (name, _) = split_sub_attribute(word);
    let matches: Vec<&&Schema> = schemas
        .iter()
        .filter(|schema| schema.attribute_by_name(name).is_some())
        .collect();
    match matches.len() {
        0 => Err(ScimError::invalid_filter(format!(
            "attribute '{word}' at position {position} is not defined by any schema of this \
             resource type"
        ))),
        1 => resolve_name_in_schema(matches[0], word, word, position, false),
        _ => {
            let candidates: Vec<&str> = matches.iter().map(|s| s.id.as_str()).collect();
            Err(ScimError::bad_request(format!(
                "attribute name '{name}' is ambiguous; qualify it with one of the schema ids: \
                 [{}]",
                candidates.join(", ")
            )))
        }
    }
}

fn resolve_name_in_schema(
    schema: &Schema,
    name_path: &str,
    original: &str,
    position: usize,
    uri_qualified: bool,
) -> ScimResult<AttributePath> {
    let (name, sub) = split_sub_attribute(name_path);
    let attribute = schema.attribute_by_name(name).ok_or_else(|| {
        ScimError::invalid_filter(format!(
            "attribute '{original}' at position {position} is not defined by schema '{}'",
            schema.id
        ))
    })?;
    let sub_attribute = match sub {
        None => None,
        Some(sub_name) => {
            let sub_def = attribute.sub_attribute(sub_name).ok_or_else(|| {
                ScimError::invalid_filter(format!(
                    "attribute '{}' has no sub-attribute '{sub_name}'",
                    attribute.name
                ))
            })?;
            Some(sub_def.name.clone())
        }
    };
    Ok(AttributePath {
        schema_id: schema.id.clone(),
        attribute_name: attribute.name.clone(),
        sub_attribute,
        value_filter: None,
        attribute: attribute.clone(),
        uri_qualified,
    })
}

/// Resolve a leaf name inside a bracket filter against the complex
/// attribute's sub-attributes.
fn resolve_in_complex(
    scope: &ComplexScope,
    word: &str,
    position: usize,
) -> ScimResult<AttributePath> {
    let sub = scope.attribute.sub_attribute(word).ok_or_else(|| {
        ScimError::invalid_filter(format!(
            "'{word}' at position {position} is not a sub-attribute of '{}'",
            scope.attribute.name
        ))
    })?;
    Ok(AttributePath {
        schema_id: scope.schema_id.to_string(),
        attribute_name: sub.name.clone(),
        sub_attribute: None,
        value_filter: None,
        attribute: sub.clone(),
        uri_qualified: false,
    })
}

fn split_sub_attribute(path: &str) -> (&str, Option<&str>) {
    match path.split_once('.') {
        Some((name, sub)) => (name, Some(sub)),
        None => (path, None),
    }
}

/// Enforce the comparator/type compatibility matrix at parse time.
fn check_compatibility(
    path: &AttributePath,
    comparator: Comparator,
    value: Option<&CompareValue>,
) -> ScimResult<()> {
    let target = path.target();
    let target_type = target.attribute_type;

    if comparator.is_ordering() && !target_type.is_ordered() {
        return Err(ScimError::invalid_filter(format!(
            "comparator '{comparator}' cannot be applied to attribute '{}' of type '{:?}'",
            path.attribute_name, target_type
        )));
    }
    if comparator.is_substring() && target_type != AttributeType::String {
        return Err(ScimError::invalid_filter(format!(
            "comparator '{comparator}' only applies to string attributes but '{}' is of type \
             '{:?}'",
            path.attribute_name, target_type
        )));
    }

    let Some(value) = value else { return Ok(()) };
    // null is only meaningful for (in)equality.
    if matches!(value, CompareValue::Null) {
        if matches!(comparator, Comparator::Eq | Comparator::Ne) {
            return Ok(());
        }
        return Err(ScimError::invalid_filter(format!(
            "comparator '{comparator}' cannot be used with a null compare value"
        )));
    }
    let compatible = match target_type {
        AttributeType::String | AttributeType::Reference | AttributeType::Binary => {
            matches!(value, CompareValue::String(_))
        }
        AttributeType::Boolean => matches!(value, CompareValue::Boolean(_)),
        AttributeType::Integer | AttributeType::Decimal => {
            matches!(value, CompareValue::Number(_))
        }
        AttributeType::DateTime => match value {
            CompareValue::String(raw) => DateTime::parse_from_rfc3339(raw).is_ok(),
            _ => false,
        },
        AttributeType::Complex => false,
    };
    if !compatible {
        return Err(ScimError::invalid_filter(format!(
            "compare value {value:?} is not compatible with attribute '{}' of type '{:?}'",
            path.attribute_name, target_type
        )));
    }
    Ok(())
}
