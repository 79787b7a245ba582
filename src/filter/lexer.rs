//! Tokenizer for the SCIM filter grammar.
//!
//! Splits a filter string into parentheses, brackets, quoted JSON string
//! literals, numbers and bare words. Keywords (`and`, `or`, `not`, the
//! comparators, `true`/`false`/`null`) are plain words here; the parser
//! gives them meaning, case-insensitively.

use crate::error::{ScimError, ScimResult};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    /// Attribute path segment or keyword. May contain `:` (schema URIs),
    /// `.` (sub-attributes), `$`, `-` and `_`.
    Word(String),
    /// Decoded JSON string literal.
    StringLiteral(String),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the token in the filter string, for error reporting.
    pub position: usize,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, ':' | '.' | '_' | '-' | '$')
}

/// Tokenize a filter string. Any character outside the grammar surfaces as
/// `invalidFilter` carrying the offending substring.
pub fn tokenize(input: &str) -> ScimResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Token {
                    kind: TokenKind::LeftParen,
                    position: i,
                });
                i += 1;
            }
            ')' => {
                tokens.push(Token {
                    kind: TokenKind::RightParen,
                    position: i,
                });
                i += 1;
            }
            '[' => {
                tokens.push(Token {
                    kind: TokenKind::LeftBracket,
                    position: i,
                });
                i += 1;
            }
            ']' => {
                tokens.push(Token {
                    kind: TokenKind::RightBracket,
                    position: i,
                });
                i += 1;
            }
            '"' => {
                let (literal, consumed) = read_string_literal(&chars, i)?;
                tokens.push(Token {
                    kind: TokenKind::StringLiteral(literal),
                    position: i,
                });
                i += consumed;
            }
            c if c.is_ascii_digit() || c == '-' => {
                let start = i;
                let mut end = i + 1;
                while end < chars.len()
                    && (chars[end].is_ascii_digit()
                        || matches!(chars[end], '.' | 'e' | 'E' | '+' | '-'))
                {
                    end += 1;
                }
                let text: String = chars[start..end].iter().collect();
                let number: f64 = text.parse().map_err(|_| {
                    ScimError::invalid_filter(format!("invalid number literal '{text}'"))
                })?;
                tokens.push(Token {
                    kind: TokenKind::Number(number),
                    position: start,
                });
                i = end;
            }
            c if is_word_char(c) => {
                let start = i;
                let mut end = i;
                while end < chars.len() && is_word_char(chars[end]) {
                    end += 1;
                }
                tokens.push(Token {
                    kind: TokenKind::Word(chars[start..end].iter().collect()),
                    position: start,
                });
                i = end;
            }
            other => {
                return Err(ScimError::invalid_filter(format!(
                    "unexpected character '{other}' at position {i} in filter"
                )));
            }
        }
    }
    Ok(tokens)
}

/// Read a quoted JSON string literal starting at `start` (which must be the
/// opening quote). Returns the decoded string and the number of characters
/// consumed including both quotes.
fn read_string_literal(chars: &[char], start: usize) -> ScimResult<(String, usize)> {
    let mut end = start + 1;
    while end < chars.len() {
        match chars[end] {
            '\\' => end += 2,
            '"' => {
                let raw: String = chars[start..=end].iter().collect();
                // Delegate escape handling to the JSON parser.
                let decoded: String = serde_json::from_str(&raw).map_err(|_| {
                    ScimError::invalid_filter(format!("invalid string literal {raw}"))
                })?;
                return Ok((decoded, end - start + 1));
            }
            _ => end += 1,
        }
    }
    let rest: String = chars[start..].iter().collect();
    Err(ScimError::invalid_filter(format!(
        "unterminated string literal {rest}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn tokenizes_simple_comparison() {
        assert_eq!(
            kinds(r#"userName eq "chuck""#),
            vec![
                TokenKind::Word("userName".to_string()),
                TokenKind::Word("eq".to_string()),
                TokenKind::StringLiteral("chuck".to_string()),
            ]
        );
    }

    #[test]
    fn tokenizes_bracket_path_and_parens() {
        assert_eq!(
            kinds(r#"not (members[value eq "1"].display pr)"#),
            vec![
                TokenKind::Word("not".to_string()),
                TokenKind::LeftParen,
                TokenKind::Word("members".to_string()),
                TokenKind::LeftBracket,
                TokenKind::Word("value".to_string()),
                TokenKind::Word("eq".to_string()),
                TokenKind::StringLiteral("1".to_string()),
                TokenKind::RightBracket,
                TokenKind::Word(".display".to_string()),
                TokenKind::Word("pr".to_string()),
                TokenKind::RightParen,
            ]
        );
    }

    #[test]
    fn tokenizes_urn_qualified_attribute() {
        let tokens = kinds("urn:ietf:params:scim:schemas:core:2.0:User:userName pr");
        assert_eq!(
            tokens[0],
            TokenKind::Word("urn:ietf:params:scim:schemas:core:2.0:User:userName".to_string())
        );
    }

    #[test]
    fn decodes_escaped_string_literals() {
        assert_eq!(
            kinds(r#"displayName eq "say \"hi\"""#)[2],
            TokenKind::StringLiteral("say \"hi\"".to_string())
        );
    }

    #[test]
    fn tokenizes_numbers_and_negative_numbers() {
        assert_eq!(kinds("count ge 12")[2], TokenKind::Number(12.0));
        assert_eq!(kinds("balance lt -3.5")[2], TokenKind::Number(-3.5));
    }

    #[test]
    fn rejects_unterminated_string() {
        assert!(tokenize(r#"userName eq "chuck"#).is_err());
    }

    #[test]
    fn rejects_stray_characters() {
        let error = tokenize("userName % \"x\"").unwrap_err();
        assert!(error.to_string().contains('%'));
    }

    proptest! {
        #[test]
        fn any_identifier_comparison_tokenizes(
            name in "[a-zA-Z][a-zA-Z0-9_]{0,20}",
            value in "[a-zA-Z0-9 ]{0,20}",
        ) {
            let filter = format!("{name} eq \"{value}\"");
            let tokens = tokenize(&filter).unwrap();
            prop_assert_eq!(tokens.len(), 3);
            prop_assert_eq!(&tokens[2].kind, &TokenKind::StringLiteral(value));
        }

        #[test]
        fn tokenizer_never_panics(input in ".{0,64}") {
            let _ = tokenize(&input);
        }
    }
}
