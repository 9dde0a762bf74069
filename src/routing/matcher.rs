//! Path template matching.
//!
//! # Responsibilities
//! - Compile templates such as `/session/{session_id}/element` into segments
//! - Match request paths structurally, segment by segment
//!
//! # Design Decisions
//! - Parameters are opaque: any non-empty segment matches
//! - Literals are case-sensitive
//! - Segment counts must be equal; no wildcards, no regex

use axum::http::Method;

/// One compiled template segment.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(&'static str),
    Param(&'static str),
}

/// A compiled `/a/{b}/c` style path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    template: &'static str,
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn new(template: &'static str) -> Self {
        let segments = segments(template)
            .map(|s| match s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some(name) => Segment::Param(name),
                None => Segment::Literal(s),
            })
            .collect();

        Self { template, segments }
    }

    pub fn as_str(&self) -> &'static str {
        self.template
    }

    pub fn matches(&self, path: &str) -> bool {
        let mut parts = segments(path);
        for segment in &self.segments {
            match (segment, parts.next()) {
                (Segment::Literal(expected), Some(actual)) if *expected == actual => {}
                (Segment::Param(_), Some(actual)) if !actual.is_empty() => {}
                _ => return false,
            }
        }
        parts.next().is_none()
    }
}

/// Matches a method and a path template together.
#[derive(Debug, Clone)]
pub struct RequestMatcher {
    method: Method,
    template: PathTemplate,
}

impl RequestMatcher {
    pub fn new(method: Method, template: &'static str) -> Self {
        Self {
            method,
            template: PathTemplate::new(template),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    pub fn matches(&self, method: &Method, path: &str) -> bool {
        self.method == *method && self.template.matches(path)
    }
}

/// Split a path into its segments, ignoring the leading slash.
pub fn segments(path: &str) -> std::str::Split<'_, char> {
    path.strip_prefix('/').unwrap_or(path).split('/')
}

/// The segment following `session`, if the path addresses a session.
pub fn session_id(path: &str) -> Option<&str> {
    let mut parts = segments(path);
    match (parts.next(), parts.next()) {
        (Some("session"), Some(id)) if !id.is_empty() => Some(id),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_template() {
        let template = PathTemplate::new("/session");
        assert!(template.matches("/session"));
        assert!(!template.matches("/session/abc"));
        assert!(!template.matches("/Session"));
        assert!(!template.matches("/"));
    }

    #[test]
    fn test_params_are_opaque() {
        let template = PathTemplate::new("/session/{session_id}/element/{element_id}/attribute/{name}");
        assert!(template.matches("/session/9f1c/element/e-1/attribute/href"));
        assert!(template.matches("/session/element/element/attribute/attribute/element"));
        assert!(!template.matches("/session/9f1c/element/e-1/attribute"));
        assert!(!template.matches("/session/9f1c/element//attribute/href"));
        assert!(!template.matches("/session/9f1c/element/e-1/attribute/href/extra"));
    }

    #[test]
    fn test_trailing_slash_does_not_match() {
        let template = PathTemplate::new("/session/{session_id}/url");
        assert!(template.matches("/session/abc/url"));
        assert!(!template.matches("/session/abc/url/"));
    }

    #[test]
    fn test_request_matcher_checks_method() {
        let matcher = RequestMatcher::new(Method::POST, "/session/{session_id}/element");
        assert!(matcher.matches(&Method::POST, "/session/abc/element"));
        assert!(!matcher.matches(&Method::GET, "/session/abc/element"));
    }

    #[test]
    fn test_session_id() {
        assert_eq!(session_id("/session/abc/element/e1/is"), Some("abc"));
        assert_eq!(session_id("/session/abc"), Some("abc"));
        assert_eq!(session_id("/session"), None);
        assert_eq!(session_id("/status"), None);
        assert_eq!(session_id("/session//url"), None);
    }
}
