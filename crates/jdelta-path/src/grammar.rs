//! Path grammar: `$` followed by field, index, and identity selectors.

use std::fmt;

use crate::error::{PathError, PathResult};

/// The path of the diffed value itself.
pub const ROOT_MARKER: &str = "$";

const PREDICATE_OPEN: &str = "[?(@.";
const PREDICATE_EQ: &str = "='";
const PREDICATE_CLOSE: &str = "')]";

/// One step of a path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    /// `.name`
    Field(String),
    /// `[n]`
    Index(usize),
    /// `[?(@.field='value')]`
    Predicate { field: String, value: String },
}

impl Segment {
    /// Whether this segment selects an array element.
    pub fn is_selector(&self) -> bool {
        !matches!(self, Segment::Field(_))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Field(name) => write!(f, ".{name}"),
            Segment::Index(index) => write!(f, "[{index}]"),
            Segment::Predicate { field, value } => {
                write!(f, "{PREDICATE_OPEN}{field}{PREDICATE_EQ}{value}{PREDICATE_CLOSE}")
            }
        }
    }
}

/// Render segments as a `$`-rooted path.
pub fn format_path(segments: &[Segment]) -> String {
    segments
        .iter()
        .fold(ROOT_MARKER.to_string(), |mut path, segment| {
            path.push_str(&segment.to_string());
            path
        })
}

/// Parse a `$`-rooted path into segments.
///
/// # Errors
///
/// A [`PathError`] naming the offending offset when the path does not follow
/// the grammar.
pub fn parse_path(path: &str) -> PathResult<Vec<Segment>> {
    Parser { path, pos: 0 }.parse()
}

struct Parser<'p> {
    path: &'p str,
    pos: usize,
}

impl<'p> Parser<'p> {
    fn rest(&self) -> &'p str {
        &self.path[self.pos..]
    }

    fn parse(mut self) -> PathResult<Vec<Segment>> {
        if !self.path.starts_with(ROOT_MARKER) {
            return Err(PathError::MissingRoot {
                path: self.path.to_string(),
            });
        }
        self.pos = ROOT_MARKER.len();

        let mut segments = Vec::new();
        while let Some(next) = self.rest().chars().next() {
            match next {
                '.' => {
                    self.pos += 1;
                    segments.push(self.field()?);
                }
                '[' => segments.push(self.selector()?),
                found => {
                    return Err(PathError::UnexpectedChar {
                        path: self.path.to_string(),
                        offset: self.pos,
                        found,
                    })
                }
            }
        }
        Ok(segments)
    }

    fn field(&mut self) -> PathResult<Segment> {
        let rest = self.rest();
        let end = rest.find(|c: char| c == '.' || c == '[').unwrap_or(rest.len());
        if end == 0 {
            return Err(PathError::EmptyField {
                path: self.path.to_string(),
                offset: self.pos,
            });
        }
        self.pos += end;
        Ok(Segment::Field(rest[..end].to_string()))
    }

    fn selector(&mut self) -> PathResult<Segment> {
        let rest = self.rest();
        let unterminated = || PathError::UnterminatedSelector {
            path: self.path.to_string(),
            offset: self.pos,
        };

        if let Some(body) = rest.strip_prefix(PREDICATE_OPEN) {
            let (field, after) = body.split_once(PREDICATE_EQ).ok_or_else(unterminated)?;
            let (value, _) = after.split_once(PREDICATE_CLOSE).ok_or_else(unterminated)?;
            let segment = Segment::Predicate {
                field: field.to_string(),
                value: value.to_string(),
            };
            self.pos += PREDICATE_OPEN.len()
                + field.len()
                + PREDICATE_EQ.len()
                + value.len()
                + PREDICATE_CLOSE.len();
            return Ok(segment);
        }

        let body = &rest[1..];
        let close = body.find(']').ok_or_else(unterminated)?;
        let text = &body[..close];
        let index = (!text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()))
            .then(|| text.parse::<usize>().ok())
            .flatten()
            .ok_or_else(|| PathError::InvalidIndex {
                path: self.path.to_string(),
                text: text.to_string(),
            })?;
        self.pos += 1 + close + 1;
        Ok(Segment::Index(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str) -> Segment {
        Segment::Field(name.into())
    }

    fn predicate(field: &str, value: &str) -> Segment {
        Segment::Predicate {
            field: field.into(),
            value: value.into(),
        }
    }

    #[test]
    fn bare_root_has_no_segments() {
        assert_eq!(parse_path("$").unwrap(), Vec::<Segment>::new());
        assert_eq!(format_path(&[]), "$");
    }

    #[test]
    fn parses_every_selector_kind() {
        let segments = parse_path("$.items[?(@.id='a1')].tags[2].label").unwrap();
        assert_eq!(
            segments,
            vec![
                field("items"),
                predicate("id", "a1"),
                field("tags"),
                Segment::Index(2),
                field("label"),
            ]
        );
    }

    #[test]
    fn consecutive_selectors() {
        assert_eq!(
            parse_path("$.grid[0][1]").unwrap(),
            vec![field("grid"), Segment::Index(0), Segment::Index(1)]
        );
        assert_eq!(parse_path("$[3]").unwrap(), vec![Segment::Index(3)]);
    }

    #[test]
    fn predicate_value_may_contain_dots_and_brackets() {
        let segments = parse_path("$.hosts[?(@.name='db.internal[2]')].port").unwrap();
        assert_eq!(
            segments,
            vec![field("hosts"), predicate("name", "db.internal[2]"), field("port")]
        );
    }

    #[test]
    fn format_inverts_parse() {
        let path = "$.a[?(@.k='x')][4].b";
        assert_eq!(format_path(&parse_path(path).unwrap()), path);
    }

    #[test]
    fn rejects_malformed_paths() {
        assert!(matches!(parse_path("a.b"), Err(PathError::MissingRoot { .. })));
        assert!(matches!(parse_path(""), Err(PathError::MissingRoot { .. })));
        assert!(matches!(
            parse_path("$x"),
            Err(PathError::UnexpectedChar { offset: 1, found: 'x', .. })
        ));
        assert!(matches!(parse_path("$.a..b"), Err(PathError::EmptyField { offset: 4, .. })));
        assert!(matches!(parse_path("$.a["), Err(PathError::UnterminatedSelector { .. })));
        assert!(matches!(
            parse_path("$.a[?(@.id='1'"),
            Err(PathError::UnterminatedSelector { .. })
        ));
        assert!(matches!(parse_path("$.a[-1]"), Err(PathError::InvalidIndex { .. })));
        assert!(matches!(parse_path("$.a[+1]"), Err(PathError::InvalidIndex { .. })));
        assert!(matches!(parse_path("$.a[]"), Err(PathError::InvalidIndex { .. })));
    }
}
