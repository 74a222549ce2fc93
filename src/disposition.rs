//! Content-disposition parsing for zone file responses
//!
//! The destination file name comes only from this header, never from the
//! request URL: zone URLs do not carry the served file name or extension.

use crate::error::DispositionError;

/// Parsed `content-disposition` header
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentDisposition {
    /// Disposition type, lowercased (e.g. "attachment")
    pub disposition_type: String,
    /// File name, from `filename*` if present, otherwise `filename`
    pub filename: Option<String>,
}

impl ContentDisposition {
    /// Parse a header value
    ///
    /// Parameter names are matched case-insensitively, quoted values may
    /// contain `;` and backslash escapes, and an RFC 5987 `filename*`
    /// parameter takes precedence over `filename`.
    pub fn parse(value: &str) -> Self {
        let (disposition_type, mut rest) = match value.find(';') {
            Some(idx) => (&value[..idx], &value[idx + 1..]),
            None => (value, ""),
        };

        let mut filename = None;
        let mut extended_filename = None;

        while !rest.trim_start().is_empty() {
            let (name, value, remaining) = next_parameter(rest);
            rest = remaining;
            match name.to_ascii_lowercase().as_str() {
                "filename" => filename = Some(value),
                "filename*" => {
                    if let Some(decoded) = decode_extended_value(&value) {
                        extended_filename = Some(decoded);
                    }
                }
                _ => {}
            }
        }

        Self {
            disposition_type: disposition_type.trim().to_ascii_lowercase(),
            filename: extended_filename.or(filename),
        }
    }
}

/// Resolve the canonical file name of a zone file response
///
/// # Errors
///
/// Fails if the header is absent or not ASCII, the type is not `attachment`, there is no
/// file name, or the file name could escape the output directory.
pub fn resolve_filename(
    header: Option<&reqwest::header::HeaderValue>,
) -> Result<String, DispositionError> {
    let value = header
        .ok_or(DispositionError::Missing)?
        .to_str()
        .map_err(|_| DispositionError::NotAscii)?;
    let disposition = ContentDisposition::parse(value);

    if disposition.disposition_type != "attachment" {
        return Err(DispositionError::NotAttachment {
            disposition_type: disposition.disposition_type,
        });
    }

    let filename = disposition
        .filename
        .filter(|name| !name.is_empty())
        .ok_or(DispositionError::MissingFilename)?;

    if is_unsafe_filename(&filename) {
        return Err(DispositionError::UnsafeFilename { filename });
    }

    Ok(filename)
}

fn is_unsafe_filename(filename: &str) -> bool {
    filename == "."
        || filename == ".."
        || filename.contains(['/', '\\', '\0'])
}

/// Split off the next `name=value` pair, returning the rest after its `;`
fn next_parameter(input: &str) -> (String, String, &str) {
    let input = input.trim_start();
    let name_end = input.find(['=', ';']).unwrap_or(input.len());
    let name = input[..name_end].trim().to_string();

    if !input[name_end..].starts_with('=') {
        let rest = input.get(name_end + 1..).unwrap_or("");
        return (name, String::new(), rest);
    }

    let after_eq = input[name_end + 1..].trim_start();
    if let Some(quoted) = after_eq.strip_prefix('"') {
        let mut value = String::new();
        let mut chars = quoted.char_indices();
        let mut end = quoted.len();
        while let Some((idx, c)) = chars.next() {
            match c {
                '\\' => {
                    if let Some((_, escaped)) = chars.next() {
                        value.push(escaped);
                    }
                }
                '"' => {
                    end = idx + 1;
                    break;
                }
                _ => value.push(c),
            }
        }
        let remaining = &quoted[end..];
        let rest = match remaining.find(';') {
            Some(idx) => &remaining[idx + 1..],
            None => "",
        };
        (name, value, rest)
    } else {
        let value_end = after_eq.find(';').unwrap_or(after_eq.len());
        let value = after_eq[..value_end].trim().to_string();
        let rest = after_eq.get(value_end + 1..).unwrap_or("");
        (name, value, rest)
    }
}

/// Decode an RFC 5987 `charset'language'percent-encoded` value
///
/// Only UTF-8 (and its ASCII subset) is accepted.
fn decode_extended_value(value: &str) -> Option<String> {
    let mut parts = value.splitn(3, '\'');
    let charset = parts.next()?;
    let _language = parts.next()?;
    let encoded = parts.next()?;

    if !charset.eq_ignore_ascii_case("utf-8") && !charset.eq_ignore_ascii_case("us-ascii") {
        return None;
    }

    urlencoding::decode(encoded).ok().map(|decoded| decoded.into_owned())
}
