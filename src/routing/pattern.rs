//! Glob-style path patterns.
//!
//! # Responsibilities
//! - Compile a pattern string into segments once, at table build time
//! - Match a request path segment-wise and collect `{name}` variables
//! - Rank patterns by specificity
//!
//! # Design Decisions
//! - `*` and `{name}` match exactly one segment, `**` matches zero or more
//! - Matching is case-sensitive; empty segments are ignored on both sides
//! - No regex; `**` backtracks over the remaining segments only

use std::cmp::Ordering;
use std::fmt;

use crate::error::ConfigurationError;

/// One compiled pattern segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Literal(String),
    /// `{name}`: one segment, captured.
    Variable(String),
    /// `*`
    Single,
    /// `**`
    Multi,
}

/// Wildcard class of a whole pattern, most specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WildcardClass {
    Literal,
    Single,
    Multi,
}

/// Variables captured from `{name}` segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathVars(Vec<(String, String)>);

impl PathVars {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A compiled path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Result<Self, ConfigurationError> {
        let malformed = |reason: &str| ConfigurationError::MalformedPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        if !pattern.starts_with('/') {
            return Err(malformed("pattern must start with '/'"));
        }

        let mut segments = Vec::new();
        for raw in pattern.split('/').filter(|s| !s.is_empty()) {
            let segment = match raw {
                "**" => {
                    // "/**/**" is the same as "/**"
                    if segments.last() == Some(&Segment::Multi) {
                        continue;
                    }
                    Segment::Multi
                }
                "*" => Segment::Single,
                _ if raw.starts_with('{') && raw.ends_with('}') => {
                    let name = &raw[1..raw.len() - 1];
                    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
                        return Err(malformed("invalid variable name"));
                    }
                    Segment::Variable(name.to_string())
                }
                _ if raw.contains(['*', '{', '}']) => {
                    return Err(malformed("wildcards must span a whole segment"));
                }
                _ => Segment::Literal(raw.to_string()),
            };
            segments.push(segment);
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn class(&self) -> WildcardClass {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(_) => WildcardClass::Literal,
                Segment::Single | Segment::Variable(_) => WildcardClass::Single,
                Segment::Multi => WildcardClass::Multi,
            })
            .max()
            .unwrap_or(WildcardClass::Literal)
    }

    /// Number of leading literal segments.
    pub fn literal_prefix_len(&self) -> usize {
        self.segments
            .iter()
            .take_while(|segment| matches!(segment, Segment::Literal(_)))
            .count()
    }

    /// Match `path`, returning captured variables on success.
    pub fn matches(&self, path: &str) -> Option<PathVars> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut vars = Vec::new();
        match_segments(&self.segments, &parts, &mut vars).then(|| PathVars(vars))
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn match_segments(segments: &[Segment], parts: &[&str], vars: &mut Vec<(String, String)>) -> bool {
    let Some((head, rest)) = segments.split_first() else {
        return parts.is_empty();
    };

    match head {
        Segment::Literal(literal) => parts.first() == Some(&literal.as_str()) && match_segments(rest, &parts[1..], vars),
        Segment::Single => !parts.is_empty() && match_segments(rest, &parts[1..], vars),
        Segment::Variable(name) => {
            let Some(part) = parts.first() else {
                return false;
            };
            vars.push((name.clone(), (*part).to_string()));
            if match_segments(rest, &parts[1..], vars) {
                true
            } else {
                vars.pop();
                false
            }
        }
        Segment::Multi => {
            let mark = vars.len();
            for skip in 0..=parts.len() {
                if match_segments(rest, &parts[skip..], vars) {
                    return true;
                }
                vars.truncate(mark);
            }
            false
        }
    }
}

/// Sort key of a rule: wildcard class, then longer literal prefix, then declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Specificity {
    pub class: WildcardClass,
    pub literal_prefix: usize,
    pub order: usize,
}

impl Specificity {
    pub fn of(pattern: &PathPattern, order: usize) -> Self {
        Self {
            class: pattern.class(),
            literal_prefix: pattern.literal_prefix_len(),
            order,
        }
    }
}

impl Ord for Specificity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.class
            .cmp(&other.class)
            .then_with(|| other.literal_prefix.cmp(&self.literal_prefix))
            .then_with(|| self.order.cmp(&other.order))
    }
}

impl PartialOrd for Specificity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
