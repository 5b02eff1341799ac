//! Quote-aware line splitting.

use memchr::{memchr, memchr2_iter};

/// Splits a header line on every delimiter, ignoring quotes entirely.
///
/// Header names in the cache dumps are never quoted, so there is nothing to
/// protect.
pub fn split_plain(line: &str, delimiter: u8) -> Vec<String> {
    let bytes = line.as_bytes();
    let mut fields = Vec::new();
    let mut start = 0;
    while let Some(position) = memchr(delimiter, &bytes[start..]) {
        fields.push(line[start..start + position].to_string());
        start += position + 1;
    }
    fields.push(line[start..].to_string());
    fields
}

/// Splits a data line on every delimiter that is preceded by an even number
/// of quote characters on the same line.
///
/// Delimiters inside a `"…"` span are therefore literal. Fields that are
/// wholly enclosed in quotes are unquoted (see [`unquote`]); empty trailing
/// fields are kept, so `a,b,` yields three fields.
///
/// Both the delimiter and the quote must be ASCII, which keeps every split
/// point on a UTF-8 character boundary.
///
/// # Examples
///
/// ```rust
/// use quicklook_table::split_quoted;
/// assert_eq!(split_quoted(r#"a,"b,c",d"#, b',', b'"'), ["a", "b,c", "d"]);
/// assert_eq!(split_quoted("a,,", b',', b'"'), ["a", "", ""]);
/// ```
pub fn split_quoted(line: &str, delimiter: u8, quote: u8) -> Vec<String> {
    let bytes = line.as_bytes();
    let mut fields = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    for position in memchr2_iter(delimiter, quote, bytes) {
        if bytes[position] == quote {
            quoted = !quoted;
        } else if !quoted {
            fields.push(unquote(&line[start..position], quote));
            start = position + 1;
        }
    }
    fields.push(unquote(&line[start..], quote));
    fields
}

/// Removes one pair of enclosing quotes and collapses doubled quotes inside
/// them. Anything not wholly enclosed is returned untouched.
fn unquote(field: &str, quote: u8) -> String {
    let bytes = field.as_bytes();
    if bytes.len() >= 2 && bytes[0] == quote && bytes[bytes.len() - 1] == quote {
        let quote = char::from(quote);
        field[1..field.len() - 1].replace(&format!("{quote}{quote}"), &quote.to_string())
    } else {
        field.to_string()
    }
}
