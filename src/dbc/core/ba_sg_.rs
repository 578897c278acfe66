use crate::dbc::core::strings::{is_ident, is_uint, strip_keyword, strip_terminator, take_quoted, take_token};
use crate::types::attributes::AttributeValue;

/// Captures of `BA_ "<attr>" SG_ <id> <signal> <value>;`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaSgFields<'a> {
    pub attr: &'a str,
    pub id: &'a str,
    pub signal: &'a str,
    pub value: AttributeValue<'a>,
}

/// Matches a signal attribute assignment.
pub fn match_line(line: &str) -> Option<BaSgFields<'_>> {
    let rest: &str = strip_keyword(line, "BA_")?;

    let (attr, rest) = take_quoted(rest)?;
    if !is_ident(attr) {
        return None;
    }

    let rest: &str = strip_keyword(rest, "SG_")?;

    let (id, rest) = take_token(rest)?;
    let (signal, rest) = take_token(rest)?;
    if !is_uint(id) || !is_ident(signal) {
        return None;
    }

    let value: AttributeValue = AttributeValue::from_token(strip_terminator(rest)?)?;

    Some(BaSgFields {
        attr,
        id,
        signal,
        value,
    })
}
