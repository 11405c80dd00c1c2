//! Route pattern compilation.
//!
//! # Responsibilities
//! - Parse `/`-delimited patterns with `{name}` placeholders
//! - Reject malformed patterns at registration time
//! - Compile the strict and the defaulted matchers once per route
//! - Extract placeholder values from a matching URI
//!
//! # Design Decisions
//! - Placeholders match non-slash characters only
//! - In the defaulted matcher every segment holding a placeholder is
//!   optional, and its placeholders may be empty
//! - Empty captures are reported as absent so defaults can fill them

use std::collections::{BTreeMap, HashSet};

use regex::Regex;

use crate::error::{AlphaError, AlphaResult};

/// One piece of a pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Placeholder(String),
}

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    raw: String,
    placeholders: Vec<String>,
    strict: Regex,
    defaulted: Regex,
}

impl RoutePattern {
    /// Parse and compile a pattern such as `/article/{title}/{mode}`.
    pub fn parse(raw: &str) -> AlphaResult<Self> {
        let rest = raw
            .strip_prefix('/')
            .ok_or_else(|| invalid(raw, "pattern must start with '/'"))?;

        let mut segments = Vec::new();
        let mut placeholders = Vec::new();
        let mut seen = HashSet::new();

        for segment in rest.split('/') {
            let tokens = tokenize(raw, segment)?;
            for token in &tokens {
                if let Token::Placeholder(name) = token {
                    if !seen.insert(name.clone()) {
                        return Err(invalid(raw, &format!("duplicate placeholder {{{name}}}")));
                    }
                    placeholders.push(name.clone());
                }
            }
            segments.push(tokens);
        }

        let strict = compile(raw, &segments, "[^/]+", false)?;
        let defaulted = compile(raw, &segments, "[^/]*", true)?;

        Ok(Self {
            raw: raw.to_string(),
            placeholders,
            strict,
            defaulted,
        })
    }

    /// The pattern exactly as registered.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Placeholder names in order of appearance.
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    pub fn has_placeholders(&self) -> bool {
        !self.placeholders.is_empty()
    }

    /// Placeholder values captured by the strict matcher.
    pub fn captures_strict(&self, uri: &str) -> Option<BTreeMap<String, String>> {
        self.capture_with(&self.strict, uri)
    }

    /// Placeholder values captured by the defaulted matcher. Omitted
    /// segments do not appear in the result.
    pub fn captures_defaulted(&self, uri: &str) -> Option<BTreeMap<String, String>> {
        self.capture_with(&self.defaulted, uri)
    }

    fn capture_with(&self, regex: &Regex, uri: &str) -> Option<BTreeMap<String, String>> {
        let caps = regex.captures(uri)?;
        let values = self
            .placeholders
            .iter()
            .filter_map(|name| {
                caps.name(name)
                    .map(|m| m.as_str())
                    .filter(|v| !v.is_empty())
                    .map(|v| (name.clone(), v.to_string()))
            })
            .collect();
        Some(values)
    }
}

fn invalid(raw: &str, reason: &str) -> AlphaError {
    AlphaError::InvalidRoute(format!("{raw}: {reason}"))
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn tokenize(raw: &str, segment: &str) -> AlphaResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut chars = segment.chars();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for n in chars.by_ref() {
                    match n {
                        '}' => {
                            closed = true;
                            break;
                        }
                        '{' => return Err(invalid(raw, "nested '{'")),
                        _ => name.push(n),
                    }
                }
                if !closed {
                    return Err(invalid(raw, "unclosed '{'"));
                }
                if !is_valid_name(&name) {
                    return Err(invalid(raw, &format!("invalid placeholder name '{name}'")));
                }
                if !literal.is_empty() {
                    tokens.push(Token::Literal(std::mem::take(&mut literal)));
                }
                tokens.push(Token::Placeholder(name));
            }
            '}' => return Err(invalid(raw, "unmatched '}'")),
            _ => literal.push(c),
        }
    }

    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    Ok(tokens)
}

fn compile(raw: &str, segments: &[Vec<Token>], class: &str, optional: bool) -> AlphaResult<Regex> {
    let mut source = String::from("^");

    for tokens in segments {
        let mut piece = String::from("/");
        let mut has_placeholder = false;
        for token in tokens {
            match token {
                Token::Literal(text) => piece.push_str(&regex::escape(text)),
                Token::Placeholder(name) => {
                    has_placeholder = true;
                    piece.push_str(&format!("(?P<{name}>{class})"));
                }
            }
        }

        if optional && has_placeholder {
            source.push_str(&format!("(?:{piece})?"));
        } else {
            source.push_str(&piece);
        }
    }
    source.push('$');

    Regex::new(&source).map_err(|e| invalid(raw, &e.to_string()))
}
