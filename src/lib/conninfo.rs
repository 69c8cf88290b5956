//! Username extraction from connection specifiers
//!
//! psql accepts a connection specifier wherever a database name may appear,
//! either as a URI (`postgresql://alice@db.example.com/app`) or as a
//! keyword/value string (`host=db.example.com user=alice dbname=app`).
//!
//! The URI authority is split by hand rather than with a WHATWG URL parser:
//! libpq allows an empty host (`postgresql://alice@/app?host=/tmp`) and a
//! comma-separated host list with ports (`postgresql://alice@h1:5432,h2/app`),
//! neither of which a generic URL parser accepts.

use percent_encoding::percent_decode_str;
use regex::Regex;

use crate::error::{Result, WrapperError};

/// URI prefixes libpq recognizes
pub const URI_PREFIXES: [&str; 2] = ["postgresql://", "postgres://"];

/// Separator between keyword/value pairs
const WHITESPACE_RUN: &str = r"\s+";

/// Keyword carrying the username in a keyword/value string
const USER_KEYWORD: &str = "user";

/// Check if a connection specifier is in URI form
pub fn is_connection_uri(spec: &str) -> bool {
    URI_PREFIXES.iter().any(|prefix| spec.starts_with(prefix))
}

/// Username from either form of connection specifier
pub fn username_from_connection_spec(spec: &str) -> Result<Option<String>> {
    if is_connection_uri(spec) {
        username_from_uri(spec)
    } else {
        Ok(username_from_keywords(spec))
    }
}

/// Username embedded in the userinfo of a connection URI.
///
/// The userinfo is everything before the last `@` of the authority; the user
/// is the part of it before the first `:`, percent-decoded the same way libpq
/// decodes it. A URI without userinfo, or with an empty user, yields `None`.
pub fn username_from_uri(uri: &str) -> Result<Option<String>> {
    let authority = uri_authority(uri);

    if let Some(open) = authority.find('[') {
        if !authority[open..].contains(']') {
            return Err(WrapperError::InvalidUri(format!(
                "missing ']' in host \"{}\"",
                &authority[open..]
            )));
        }
    }

    let Some((userinfo, _hosts)) = authority.rsplit_once('@') else {
        return Ok(None);
    };
    let encoded = userinfo.split(':').next().unwrap_or_default();
    if encoded.is_empty() {
        return Ok(None);
    }

    validate_escapes(encoded)?;
    let decoded = percent_decode_str(encoded)
        .decode_utf8()
        .map_err(|_| WrapperError::InvalidUri(format!("user \"{}\" is not valid UTF-8", encoded)))?;
    Ok(Some(decoded.into_owned()).filter(|user| !user.is_empty()))
}

/// Authority part of a URI: after `://`, up to the first `/`, `?` or `#`
fn uri_authority(uri: &str) -> &str {
    let rest = uri.split_once("://").map_or("", |(_, rest)| rest);
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    &rest[..end]
}

/// Every `%` must start a two-digit hex escape
fn validate_escapes(encoded: &str) -> Result<()> {
    let bytes = encoded.as_bytes();
    for (i, _) in encoded.match_indices('%') {
        let valid = bytes.len() > i + 2
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit();
        if !valid {
            let escape: String = encoded[i..].chars().take(3).collect();
            return Err(WrapperError::InvalidUri(format!(
                "invalid URL escape \"{}\"",
                escape
            )));
        }
    }
    Ok(())
}

/// Value of the first `user=` pair in a keyword/value string, trimmed
pub fn username_from_keywords(conninfo: &str) -> Option<String> {
    split_parameters(conninfo).into_iter().find_map(|param| {
        let (key, value) = param.split_once('=')?;
        (key == USER_KEYWORD).then(|| value.trim().to_string())
    })
}

fn split_parameters(conninfo: &str) -> Vec<&str> {
    match Regex::new(WHITESPACE_RUN) {
        Ok(re) => re.split(conninfo).collect(),
        Err(_) => conninfo.split_whitespace().collect(),
    }
}
