//! Path template parsing and matching
//!
//! Templates are ordered sequences of literal segments and parameter
//! segments. `{name}` matches any single non-empty segment; `{name:path}`
//! is greedy and absorbs the remainder of the path including `/`, so it is
//! only allowed in final position.

use std::fmt;

/// One template segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    /// Single non-empty path segment
    Param(String),
    /// Remainder of the path, including separators; may be empty
    Greedy(String),
}

/// Template parse failure, reported at registration time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    MissingLeadingSlash(String),
    EmptyParamName(String),
    UnbalancedBraces(String),
    UnknownConverter { template: String, converter: String },
    GreedyNotLast(String),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingLeadingSlash(t) => {
                write!(f, "template \"{t}\" must start with '/'")
            }
            Self::EmptyParamName(t) => {
                write!(f, "template \"{t}\" contains a parameter with no name")
            }
            Self::UnbalancedBraces(t) => {
                write!(f, "template \"{t}\" contains unbalanced braces")
            }
            Self::UnknownConverter {
                template,
                converter,
            } => write!(
                f,
                "template \"{template}\" uses unknown converter \"{converter}\""
            ),
            Self::GreedyNotLast(t) => {
                write!(f, "template \"{t}\" has a greedy segment before the end")
            }
        }
    }
}

impl std::error::Error for TemplateError {}

/// Parsed route path template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn parse(template: &str) -> Result<Self, TemplateError> {
        let rest = template
            .strip_prefix('/')
            .ok_or_else(|| TemplateError::MissingLeadingSlash(template.to_string()))?;

        let mut segments = Vec::new();
        if !rest.is_empty() {
            for part in rest.split('/') {
                segments.push(parse_segment(template, part)?);
            }
        }

        // greedy segments consume to the end, so only the last may be greedy
        let before_last = segments.len().saturating_sub(1);
        if segments[..before_last]
            .iter()
            .any(|s| matches!(s, Segment::Greedy(_)))
        {
            return Err(TemplateError::GreedyNotLast(template.to_string()));
        }

        Ok(Self {
            raw: template.to_string(),
            segments,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Names of all parameter segments, in template order
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) | Segment::Greedy(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Structural match against a request path
    ///
    /// Literal segments compare exactly; parameter segments capture any
    /// single non-empty segment; a trailing greedy segment captures the
    /// joined remainder (possibly empty) provided the path reaches its
    /// position.
    pub fn match_path(&self, path: &str) -> Option<PathCaptures> {
        let parts = split_path(path)?;

        let greedy_tail = matches!(self.segments.last(), Some(Segment::Greedy(_)));
        if greedy_tail {
            if parts.len() < self.segments.len() {
                return None;
            }
        } else if parts.len() != self.segments.len() {
            return None;
        }

        let mut captures = PathCaptures::default();
        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(literal) => {
                    if parts[index] != literal {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if parts[index].is_empty() {
                        return None;
                    }
                    captures.push(name, parts[index].to_string());
                }
                Segment::Greedy(name) => {
                    captures.push(name, parts[index..].join("/"));
                }
            }
        }
        Some(captures)
    }
}

fn parse_segment(template: &str, part: &str) -> Result<Segment, TemplateError> {
    if let Some(inner) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
        let (name, converter) = match inner.split_once(':') {
            Some((name, converter)) => (name, Some(converter)),
            None => (inner, None),
        };
        if name.is_empty() {
            return Err(TemplateError::EmptyParamName(template.to_string()));
        }
        return match converter {
            None => Ok(Segment::Param(name.to_string())),
            Some("path") => Ok(Segment::Greedy(name.to_string())),
            Some(other) => Err(TemplateError::UnknownConverter {
                template: template.to_string(),
                converter: other.to_string(),
            }),
        };
    }
    if part.contains('{') || part.contains('}') {
        return Err(TemplateError::UnbalancedBraces(template.to_string()));
    }
    Ok(Segment::Literal(part.to_string()))
}

fn split_path(path: &str) -> Option<Vec<&str>> {
    let rest = path.strip_prefix('/')?;
    if rest.is_empty() {
        Some(Vec::new())
    } else {
        Some(rest.split('/').collect())
    }
}

/// Raw values captured from path parameter segments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathCaptures(Vec<(String, String)>);

impl PathCaptures {
    pub fn push(&mut self, name: &str, value: String) {
        self.0.push((name.to_string(), value));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_static_and_param_segments() {
        let template = PathTemplate::parse("/users/{user_id}/items/{item_id}").unwrap();
        assert_eq!(
            template.param_names().collect::<Vec<_>>(),
            vec!["user_id", "item_id"]
        );
    }

    #[test]
    fn test_parse_rejects_malformed_templates() {
        assert!(matches!(
            PathTemplate::parse("items"),
            Err(TemplateError::MissingLeadingSlash(_))
        ));
        assert!(matches!(
            PathTemplate::parse("/items/{}"),
            Err(TemplateError::EmptyParamName(_))
        ));
        assert!(matches!(
            PathTemplate::parse("/items/{id"),
            Err(TemplateError::UnbalancedBraces(_))
        ));
        assert!(matches!(
            PathTemplate::parse("/items/{id:uuid}"),
            Err(TemplateError::UnknownConverter { .. })
        ));
        assert!(matches!(
            PathTemplate::parse("/files/{rest:path}/extra"),
            Err(TemplateError::GreedyNotLast(_))
        ));
    }

    #[test]
    fn test_match_root_template() {
        let root = PathTemplate::parse("/").unwrap();
        assert!(root.match_path("/").is_some());
        assert!(root.match_path("/items").is_none());
    }

    #[test]
    fn test_match_literal_and_param() {
        let template = PathTemplate::parse("/items/{item_id}").unwrap();
        let captures = template.match_path("/items/42").unwrap();
        assert_eq!(captures.get("item_id"), Some("42"));
        assert!(template.match_path("/items").is_none());
        assert!(template.match_path("/items/42/extra").is_none());
        assert!(template.match_path("/users/42").is_none());
        // parameter segments never match an empty segment
        assert!(template.match_path("/items/").is_none());
    }

    #[test]
    fn test_match_greedy_consumes_remainder() {
        let template = PathTemplate::parse("/files/{file_path:path}").unwrap();
        let captures = template.match_path("/files/home/johndoe/myfile.txt").unwrap();
        assert_eq!(captures.get("file_path"), Some("home/johndoe/myfile.txt"));

        // the greedy position must exist, but its capture may be empty
        assert_eq!(
            template.match_path("/files/").unwrap().get("file_path"),
            Some("")
        );
        assert!(template.match_path("/files").is_none());
    }
}
