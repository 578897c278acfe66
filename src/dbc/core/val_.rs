use crate::dbc::core::strings::{is_ident, is_uint, strip_keyword, strip_terminator, take_token};

/// Captures of `VAL_ <id> <signal> <value> "<label>" ... ;`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValFields<'a> {
    pub id: &'a str,
    pub signal: &'a str,
    /// `(raw value, label)` pairs in declaration order.
    pub pairs: Vec<(&'a str, &'a str)>,
}

/// Matches a value table line.
///
/// The pair list is split on `"`; the non-empty trimmed pieces must alternate
/// value / label, so an odd count does not match.
pub fn match_line(line: &str) -> Option<ValFields<'_>> {
    let rest: &str = strip_keyword(line, "VAL_")?;

    let (id, rest) = take_token(rest)?;
    let (signal, rest) = take_token(rest)?;
    if !is_uint(id) || !is_ident(signal) {
        return None;
    }

    let body: &str = strip_terminator(rest)?;
    let tokens: Vec<&str> = body
        .split('"')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.len() % 2 != 0 {
        return None;
    }

    let pairs: Vec<(&str, &str)> = tokens
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect();

    Some(ValFields { id, signal, pairs })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_line() {
        let f = match_line("VAL_ 763 LampSts 0 \" Lamp off \" 1 \"Lamp on\" 3 \"Lamp blink & sound\" ;")
            .unwrap();
        assert_eq!(f.id, "763");
        assert_eq!(f.signal, "LampSts");
        assert_eq!(
            f.pairs,
            vec![("0", "Lamp off"), ("1", "Lamp on"), ("3", "Lamp blink & sound")]
        );
    }

    #[test]
    fn test_negative_values_and_empty_table() {
        let f = match_line("VAL_ 1 Temp -1 \"Invalid\";").unwrap();
        assert_eq!(f.pairs, vec![("-1", "Invalid")]);

        let f = match_line("VAL_ 1 Temp ;").unwrap();
        assert!(f.pairs.is_empty());
    }

    #[test]
    fn test_no_match() {
        assert!(match_line("VAL_ 763 LampSts 0 \"off\" 1;").is_none());
        assert!(match_line("VAL_ 763 LampSts 0 \"off\"").is_none());
        assert!(match_line("VAL_ LampSts 0 \"off\";").is_none());
    }
}
