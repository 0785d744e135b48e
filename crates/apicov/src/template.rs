//! Path templates
//!
//! A declared OpenAPI path such as `/users/{userId}/modules/{id}` is split on
//! `/` once, at load time. Each segment is either a literal, a lone
//! placeholder, or a mix of both (`{name}.json`). Placeholders stand for one
//! or more characters that are not `/`.

use std::fmt;

/// One `/`-separated piece of a path template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the URL segment exactly
    Literal(String),
    /// `{name}`: matches any non-empty URL segment
    Param(String),
    /// Literal text interleaved with placeholders, e.g. `{file}.json`
    Pattern(Vec<Part>),
}

/// Piece of a [`Segment::Pattern`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    /// Literal text
    Literal(String),
    /// Placeholder name
    Param(String),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        let parts = parse_parts(raw);
        match parts.as_slice() {
            [] => Self::Literal(String::new()),
            [Part::Literal(text)] => Self::Literal(text.clone()),
            [Part::Param(name)] => Self::Param(name.clone()),
            _ => Self::Pattern(parts),
        }
    }

    /// Whether this segment accepts the given URL segment
    #[must_use]
    pub fn matches(&self, url_segment: &str) -> bool {
        match self {
            Self::Literal(text) => text == url_segment,
            Self::Param(_) => !url_segment.is_empty(),
            Self::Pattern(parts) => match_parts(parts, url_segment),
        }
    }

    /// Whether this segment is plain literal text
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }
}

fn parse_parts(raw: &str) -> Vec<Part> {
    let mut parts = Vec::new();
    let mut rest = raw;
    while !rest.is_empty() {
        let open = rest.find('{');
        let close = open.and_then(|o| rest[o..].find('}').map(|c| o + c));
        match (open, close) {
            (Some(o), Some(c)) => {
                if o > 0 {
                    parts.push(Part::Literal(rest[..o].to_string()));
                }
                parts.push(Part::Param(rest[o + 1..c].to_string()));
                rest = &rest[c + 1..];
            }
            _ => {
                parts.push(Part::Literal(rest.to_string()));
                break;
            }
        }
    }
    parts
}

fn match_parts(parts: &[Part], text: &str) -> bool {
    match parts.split_first() {
        None => text.is_empty(),
        Some((Part::Literal(lit), rest)) => text
            .strip_prefix(lit.as_str())
            .is_some_and(|remaining| match_parts(rest, remaining)),
        Some((Part::Param(_), rest)) => (1..=text.len())
            .filter(|&i| text.is_char_boundary(i))
            .any(|i| match_parts(rest, &text[i..])),
    }
}

/// Removes a single trailing `/` from an observed relative URL
#[must_use]
pub fn trim_trailing_slash(path: &str) -> &str {
    path.strip_suffix('/').unwrap_or(path)
}

/// A compiled path template
///
/// Templates are compiled as declared: `/a/` keeps its empty last segment
/// and so never matches `/a`. The root template `/` is the one exception and
/// stands for the empty relative URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    raw_segments: Vec<String>,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Compile a template string
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let normalized = if raw == "/" { "" } else { raw };
        let raw_segments: Vec<String> = normalized.split('/').map(str::to_string).collect();
        let segments = raw_segments.iter().map(|s| Segment::parse(s)).collect();
        Self {
            raw: raw.to_string(),
            raw_segments,
            segments,
        }
    }

    /// The template as declared
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Compiled segments, including the empty one before a leading `/`
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Segment at `index`, if any
    #[must_use]
    pub fn segment(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    /// Segment at `index` as written in the template, braces included
    #[must_use]
    pub fn raw_segment(&self, index: usize) -> Option<&str> {
        self.raw_segments.get(index).map(String::as_str)
    }

    /// Whether the relative URL structurally matches this template
    ///
    /// Segment counts must agree; every segment must accept its counterpart.
    #[must_use]
    pub fn matches(&self, relative_url: &str) -> bool {
        let url_segments: Vec<&str> = relative_url.split('/').collect();
        self.matches_segments(&url_segments)
    }

    pub(crate) fn matches_segments(&self, url_segments: &[&str]) -> bool {
        url_segments.len() == self.segments.len()
            && self
                .segments
                .iter()
                .zip(url_segments)
                .all(|(segment, part)| segment.matches(part))
    }

    /// Whether any segment is a placeholder or pattern
    #[must_use]
    pub fn is_templated(&self) -> bool {
        self.segments.iter().any(|s| !s.is_literal())
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Whether `url` (already relative to its server) matches `template`
#[must_use]
pub fn check_path(url: &str, template: &str) -> bool {
    PathTemplate::parse(template).matches(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_literal_path() {
        assert!(check_path("/test/path", "/test/path"));
    }

    #[test]
    fn test_no_match_different_literal() {
        assert!(!check_path("/test/path", "/whatever"));
    }

    #[test]
    fn test_match_with_vars() {
        assert!(check_path("/test/12-34-56", "/test/{id}"));
    }

    #[test]
    fn test_match_leading_dash() {
        assert!(check_path(
            "/pet/-93114376/uploadImage",
            "/pet/{petId}/uploadImage"
        ));
    }

    #[test]
    fn test_no_match_longer_url() {
        assert!(!check_path("/pet/-93114376/uploadImage", "/pet/{petId}"));
    }

    #[test]
    fn test_match_percent_encoded() {
        assert!(check_path("/user/ad%20labore", "/user/{username}"));
    }

    #[test]
    fn test_match_uuids() {
        assert!(check_path(
            "/users/e64e18e9-d01b-4378-bf98-b4d21e307793/modules/68d902bf-07e9-4fd1-ab18-f17362de3608",
            "/users/{userId}/modules/{id}"
        ));
        assert!(check_path(
            "/applet-categories/7e74e7a8-a994-46c3-a79e-25ae44791983",
            "/applet-categories/{appletCategoryId}"
        ));
    }

    #[test]
    fn test_match_three_vars() {
        assert!(check_path(
            "/workplaces/bsapi-workplace/groups/b0c535f5-1b8e-4388-8819-f73a9bda652d/modules/269198e4-d36d-4236-8b5a-f4a76bcb1f43",
            "/workplaces/{workplaceRef}/groups/{groupid}/modules/{id}"
        ));
    }

    #[test]
    fn test_match_two_vars() {
        assert!(check_path(
            "/test/12-34-56/nested/09-87-65",
            "/test/{id}/nested/{nestedid}"
        ));
    }

    #[test]
    fn test_placeholder_rejects_empty_segment() {
        assert!(!check_path("/test//nested", "/test/{id}/nested"));
    }

    #[test]
    fn test_mixed_segment() {
        assert!(check_path("/files/report.json", "/files/{name}.json"));
        assert!(!check_path("/files/report.xml", "/files/{name}.json"));
        assert!(!check_path("/files/.json", "/files/{name}.json"));
    }

    #[test]
    fn test_mixed_segment_two_params() {
        let t = PathTemplate::parse("/range/{from}..{to}");
        assert!(t.matches("/range/1..5"));
        assert!(!t.matches("/range/1.5"));
    }

    #[test]
    fn test_unclosed_brace_is_literal() {
        let t = PathTemplate::parse("/odd/{name");
        assert_eq!(t.segment(2), Some(&Segment::Literal("{name".to_string())));
        assert!(t.matches("/odd/{name"));
        assert!(!t.matches("/odd/value"));
    }

    #[test]
    fn test_segment_kinds() {
        let t = PathTemplate::parse("/a/{b}/c{d}");
        assert_eq!(t.segments().len(), 4);
        assert_eq!(t.segment(0), Some(&Segment::Literal(String::new())));
        assert_eq!(t.segment(1), Some(&Segment::Literal("a".to_string())));
        assert_eq!(t.segment(2), Some(&Segment::Param("b".to_string())));
        assert_eq!(
            t.segment(3),
            Some(&Segment::Pattern(vec![
                Part::Literal("c".to_string()),
                Part::Param("d".to_string())
            ]))
        );
        assert!(t.is_templated());
    }

    #[test]
    fn test_raw_segments_keep_braces() {
        let t = PathTemplate::parse("/files/{name}.json");
        assert_eq!(t.raw_segment(0), Some(""));
        assert_eq!(t.raw_segment(1), Some("files"));
        assert_eq!(t.raw_segment(2), Some("{name}.json"));
        assert_eq!(t.raw_segment(3), None);
    }

    #[test]
    fn test_root_template_matches_empty_relative_url() {
        let t = PathTemplate::parse("/");
        assert!(t.matches(""));
        assert_eq!(t.as_str(), "/");
    }

    #[test]
    fn test_trailing_slash_on_template_is_kept() {
        assert!(!check_path("/kittens", "/kittens/"));
        assert!(check_path("/kittens", "/kittens"));
        assert_eq!(PathTemplate::parse("/kittens/").segments().len(), 3);
    }

    #[test]
    fn test_trim_trailing_slash_only_once() {
        assert_eq!(trim_trailing_slash("/a//"), "/a/");
        assert_eq!(trim_trailing_slash("/a"), "/a");
    }

    #[test]
    fn test_multibyte_param() {
        assert!(check_path("/city/Zürich.geo", "/city/{name}.geo"));
    }
}
