//! Request Matcher
//!
//! Resolves an observed `(url, method, status)` triple to one
//! `(server, path, method, response)` slot in four steps:
//!
//! 1. server: fixed override first, then declared servers, first prefix wins
//! 2. path: segment-count filtering, then left-to-right elimination
//! 3. method: case-insensitive exact match
//! 4. response: exact code, then `default`, then a synthesized unexpected slot

use crate::document::{Document, PathItem};
use crate::ids::{OperationId, PathId};
use crate::template::trim_trailing_slash;
use tracing::debug;

/// Pick the server base URL an observed URL was sent to
///
/// A fixed server URL wins unconditionally when it is a prefix of `url`; an
/// empty one counts as absent. Otherwise the first declared server that is a prefix wins, even if a
/// later declaration is a longer prefix.
#[must_use]
pub fn resolve_server<'a>(
    servers: &'a [String],
    url: &str,
    fixed_server_url: Option<&'a str>,
) -> Option<&'a str> {
    if let Some(fixed) = fixed_server_url.filter(|fixed| !fixed.is_empty()) {
        if url.starts_with(fixed) {
            debug!(server = fixed, "matched fixed server");
            return Some(fixed);
        }
    }

    servers.iter().map(String::as_str).find(|server| {
        debug!(server, "checking server");
        url.starts_with(server)
    })
}

/// Strip the server prefix and a single trailing `/`
#[must_use]
pub fn relative_url<'u>(url: &'u str, server: &str) -> &'u str {
    trim_trailing_slash(url.strip_prefix(server).unwrap_or(url))
}

/// Drop the query string and fragment of an observed URL
#[must_use]
pub fn strip_query(url: &str) -> &str {
    url.find(|c| c == '?' || c == '#')
        .map_or(url, |i| &url[..i])
}

/// Find the single path template a relative URL belongs to
///
/// Candidates are the templates that structurally match. One candidate is
/// returned as is. With several, URL positions are visited left to right and
/// at each one only the candidates whose template segment, as written, equals
/// the URL segment survive. Placeholders never equal a concrete segment, so
/// `/a/fixed` wins over `/a/{x}` for `/a/fixed`. The first time a single
/// candidate remains it wins; none left, or several after the last position,
/// is ambiguous and yields `None`.
#[must_use]
pub fn resolve_path(paths: &[PathItem], relative_url: &str) -> Option<PathId> {
    let url_segments: Vec<&str> = relative_url.split('/').collect();

    let mut candidates: Vec<usize> = paths
        .iter()
        .enumerate()
        .filter(|(_, item)| item.template().matches_segments(&url_segments))
        .map(|(index, _)| index)
        .collect();

    match candidates.len() {
        0 => return None,
        1 => {
            debug!(path = %paths[candidates[0]].template(), "found matching path");
            return Some(PathId::new(candidates[0] as u32));
        }
        _ => {}
    }

    debug!(
        candidates = candidates.len(),
        relative_url, "more than one path matches, eliminating"
    );

    for (position, url_segment) in url_segments.iter().enumerate().skip(1) {
        candidates.retain(|index| {
            paths[*index].template().raw_segment(position) == Some(*url_segment)
        });

        match candidates.len() {
            0 => return None,
            1 => {
                debug!(path = %paths[candidates[0]].template(), "found matching path");
                return Some(PathId::new(candidates[0] as u32));
            }
            _ => {}
        }
    }

    debug!(
        candidates = ?candidates
            .iter()
            .map(|i| paths[*i].template().as_str())
            .collect::<Vec<_>>(),
        "path is ambiguous"
    );
    None
}

/// Find a method under a path, ignoring ASCII case
#[must_use]
pub fn resolve_method(path: &PathItem, path_id: PathId, method: &str) -> Option<OperationId> {
    path.operations()
        .iter()
        .position(|op| {
            debug!(method = op.method(), "checking method");
            op.method().eq_ignore_ascii_case(method)
        })
        .map(|index| OperationId::new(path_id, index as u32))
}

/// Convenience for callers holding a whole [`Document`]
#[must_use]
pub fn resolve_document_path(document: &Document, relative_url: &str) -> Option<PathId> {
    document
        .paths()
        .and_then(|paths| resolve_path(paths, relative_url))
}
