//! URL template substitution.
//!
//! Discovery paths use `{name}` placeholders, whose values are
//! percent-encoded as a single path segment, and `{+name}` placeholders,
//! whose values may contain reserved characters such as `/` and are left
//! intact.
//!
//! ## Examples
//!
//! ```
//! use discovery::template::render;
//! use serde_json::json;
//!
//! let params = json!({"fileId": "a b", "name": "projects/p1"});
//! let params = params.as_object().unwrap();
//!
//! assert_eq!(render("/files/{fileId}", params), "/files/a%20b");
//! assert_eq!(render("/v1/{+name}", params), "/v1/projects/p1");
//! ```

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;

use crate::error::SchemaError;
use crate::params::Params;

/// Everything except RFC 3986 unreserved characters.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// [`SEGMENT`] minus the RFC 3986 reserved characters.
const RESERVED: &AsciiSet = &SEGMENT
    .remove(b'/')
    .remove(b':')
    .remove(b'@')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=')
    .remove(b'?')
    .remove(b'#')
    .remove(b'[')
    .remove(b']');

/// A parsed piece of a URL template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text copied verbatim.
    Literal(&'a str),
    /// A named placeholder.
    Placeholder {
        /// Parameter name, without braces or operator.
        name: &'a str,
        /// `true` for `{+name}` reserved expansion.
        reserved: bool,
    },
}

/// Parses a template strictly.
///
/// ## Errors
///
/// Returns [`SchemaError::InvalidTemplate`] for an unclosed `{`, a stray
/// `}`, or an empty placeholder.
pub fn parse(template: &str) -> Result<Vec<Segment<'_>>, SchemaError> {
    let mut segments = Vec::new();
    let mut rest = template;

    while !rest.is_empty() {
        let Some(open) = rest.find(['{', '}']) else {
            segments.push(Segment::Literal(rest));
            break;
        };
        if rest[open..].starts_with('}') {
            return Err(SchemaError::invalid_template(template, "unmatched '}'"));
        }
        if open > 0 {
            segments.push(Segment::Literal(&rest[..open]));
        }
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| SchemaError::invalid_template(template, "unclosed '{'"))?;
        let inner = &after[..close];
        let (name, reserved) = match inner.strip_prefix('+') {
            Some(name) => (name, true),
            None => (inner, false),
        };
        if name.is_empty() || name.contains('{') {
            return Err(SchemaError::invalid_template(template, "empty placeholder"));
        }
        segments.push(Segment::Placeholder { name, reserved });
        rest = &after[close + 1..];
    }

    Ok(segments)
}

/// Returns placeholder names in order of appearance.
///
/// Malformed trailing text is ignored.
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            break;
        };
        let inner = &after[..close];
        let name = inner.strip_prefix('+').unwrap_or(inner);
        if !name.is_empty() {
            names.push(name);
        }
        rest = &after[close + 1..];
    }
    names
}

/// Substitutes every placeholder that has a value in `params`.
///
/// Placeholders without a value (or with a `null` value) are left as written,
/// as is any malformed trailing text.
pub fn render(template: &str, params: &Params) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };
        let inner = &after[..close];
        let (name, set) = match inner.strip_prefix('+') {
            Some(name) => (name, RESERVED),
            None => (inner, SEGMENT),
        };
        match params.get(name).and_then(value_to_string) {
            Some(value) => out.extend(utf8_percent_encode(&value, set)),
            None => out.push_str(&rest[open..open + close + 2]),
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}

/// Concatenates URL pieces and collapses repeated slashes, keeping the `//`
/// that follows a scheme.
///
/// ## Examples
///
/// ```
/// use discovery::template::join_url;
///
/// assert_eq!(
///     join_url(&["https://www.googleapis.com/", "/drive/v3/", "files"]),
///     "https://www.googleapis.com/drive/v3/files"
/// );
/// ```
pub fn join_url(parts: &[&str]) -> String {
    let joined = parts.concat();
    let mut out = String::with_capacity(joined.len());
    for c in joined.chars() {
        if c == '/' && out.ends_with('/') {
            let before = &out[..out.len() - 1];
            if !before.is_empty() && !before.ends_with(':') {
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Converts a parameter value to its wire string.
///
/// `null` has no representation. Arrays join their elements with `,`.
pub(crate) fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(value_to_string)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_parse_literal_only() {
        assert_eq!(parse("/files").unwrap(), vec![Segment::Literal("/files")]);
        assert!(parse("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_placeholders() {
        assert_eq!(
            parse("/files/{fileId}/revisions/{+name}").unwrap(),
            vec![
                Segment::Literal("/files/"),
                Segment::Placeholder {
                    name: "fileId",
                    reserved: false
                },
                Segment::Literal("/revisions/"),
                Segment::Placeholder {
                    name: "name",
                    reserved: true
                },
            ]
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse("/files/{fileId").is_err());
        assert!(parse("/files/fileId}").is_err());
        assert!(parse("/files/{}").is_err());
        assert!(parse("/files/{+}").is_err());
    }

    #[test]
    fn test_placeholders_in_order() {
        assert_eq!(
            placeholders("/projects/{project}/zones/{zone}/{+resource}"),
            vec!["project", "zone", "resource"]
        );
        assert_eq!(placeholders("/models"), Vec::<&str>::new());
    }

    #[test]
    fn test_render_substitutes_and_encodes() {
        let p = params(json!({"fileId": "abc", "q": "a/b c"}));
        assert_eq!(render("/files/{fileId}", &p), "/files/abc");
        assert_eq!(render("/search/{q}", &p), "/search/a%2Fb%20c");
        assert_eq!(render("/search/{+q}", &p), "/search/a/b%20c");
    }

    #[test]
    fn test_render_scalars() {
        let p = params(json!({"n": 42, "flag": true, "ids": ["a", "b"]}));
        assert_eq!(render("/{n}/{flag}/{ids}", &p), "/42/true/a%2Cb");
    }

    #[test]
    fn test_render_missing_placeholder_unchanged() {
        let p = params(json!({"other": "x", "gone": null}));
        assert_eq!(render("/files/{fileId}", &p), "/files/{fileId}");
        assert_eq!(render("/files/{gone}", &p), "/files/{gone}");
        assert_eq!(render("/files/{fileId", &p), "/files/{fileId");
    }

    #[test]
    fn test_join_url_collapses_slashes() {
        assert_eq!(
            join_url(&["http://127.0.0.1:8080/", "/upload//drive/v3/files"]),
            "http://127.0.0.1:8080/upload/drive/v3/files"
        );
        assert_eq!(join_url(&["https://a.com/", "", "x"]), "https://a.com/x");
    }
}
