//! Identifier shape shared by user and item ids.

use std::sync::LazyLock;

use regex::Regex;

/// Alphanumeric first character, then up to 127 of `[A-Za-z0-9_.:-]`.
static IDENTIFIER_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.:-]{0,127}$").ok());

pub fn is_valid_identifier(value: &str) -> bool {
    IDENTIFIER_RE
        .as_ref()
        .is_some_and(|re| re.is_match(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_shapes() {
        for id in ["alice", "user-42", "c1", "eth.yirgacheffe", "tenant:user_7", "9"] {
            assert!(is_valid_identifier(id), "{id}");
        }
    }

    #[test]
    fn rejects_bad_shapes() {
        let too_long = "a".repeat(129);
        for id in ["", "-lead", "_x", "has space", "semi;colon", "ünï", too_long.as_str()] {
            assert!(!is_valid_identifier(id), "{id}");
        }
        assert!(is_valid_identifier(&"a".repeat(128)));
    }
}
