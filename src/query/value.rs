use crate::domesque::Node;
use crate::id::NameId;

/// Something a node set can hold.
///
/// Attributes aren't nodes in the tree, so an attribute item names its
/// owner tag and the attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Item {
    Node(Node),
    Attribute { owner: Node, name_id: NameId },
}

impl Item {
    /// The node this item is, or the tag the attribute lives on.
    pub(crate) fn node(self) -> Node {
        match self {
            Item::Node(node) => node,
            Item::Attribute { owner, .. } => owner,
        }
    }
}

/// The result of evaluating an XPath expression.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum XPathValue {
    /// Items in document order without duplicates.
    NodeSet(Vec<Item>),
    Boolean(bool),
    Number(f64),
    String(String),
}

/// Convert a string to a number the way `number()` does: optional
/// whitespace around an optionally negative decimal, anything else is NaN.
pub(crate) fn string_to_number(s: &str) -> f64 {
    let s = s.trim_matches(|c: char| c.is_ascii_whitespace());
    let digits = s.strip_prefix('-').unwrap_or(s);
    let valid = !digits.is_empty()
        && digits != "."
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.chars().filter(|c| *c == '.').count() <= 1;
    if valid {
        s.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

/// Convert a number to a string the way `string()` does.
pub(crate) fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e16 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_to_number() {
        assert_eq!(string_to_number(" 12 "), 12.0);
        assert_eq!(string_to_number("-1.5"), -1.5);
        assert_eq!(string_to_number(".5"), 0.5);
        assert!(string_to_number("1e3").is_nan());
        assert!(string_to_number("").is_nan());
        assert!(string_to_number("abc").is_nan());
    }

    #[test]
    fn test_number_to_string() {
        assert_eq!(number_to_string(3.0), "3");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(0.25), "0.25");
        assert_eq!(number_to_string(f64::NAN), "NaN");
        assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
    }
}
