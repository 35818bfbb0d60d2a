use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};
use xhtmlchardet::detect;

use crate::error::Error;

/// The encoding declared by a byte order mark or an XML declaration.
///
/// Falls back to UTF-8 when nothing is declared or the label is unknown.
fn sniff(data: &[u8]) -> &'static Encoding {
    let mut cursor = std::io::Cursor::new(data);
    detect(&mut cursor, None)
        .ok()
        .and_then(|labels| labels.into_iter().next())
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(UTF_8)
}

/// Decode XML bytes into text.
pub(crate) fn decode(data: &[u8]) -> Result<Cow<str>, Error> {
    let (text, used, had_errors) = sniff(data).decode(data);
    if had_errors {
        return Err(Error::Encoding(format!("input is not valid {}", used.name())));
    }
    tracing::trace!(encoding = used.name(), "decoded document bytes");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undeclared_is_utf8() {
        assert_eq!(sniff(b"<a/>").name(), "UTF-8");
    }

    #[test]
    fn test_declared_latin1() {
        let data = b"<?xml version=\"1.0\" encoding=\"iso-8859-1\"?><a/>";
        // windows-1252 is a superset of 8859-1
        assert_eq!(sniff(data).name(), "windows-1252");
    }

    #[test]
    fn test_decode_latin1() {
        let data = b"<?xml version=\"1.0\" encoding=\"iso-8859-1\"?><a>caf\xe9</a>";
        let text = decode(data).unwrap();
        assert!(text.ends_with("<a>café</a>"));
    }
}
