use crate::dbc::core::strings::{is_ident, is_uint, strip_keyword, strip_terminator, take_quoted, take_token};
use crate::types::attributes::AttributeValue;

/// Captures of `BA_ "<attr>" BO_ <id> <value>;`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaBoFields<'a> {
    pub attr: &'a str,
    pub id: &'a str,
    pub value: AttributeValue<'a>,
}

/// Matches a message attribute assignment.
pub fn match_line(line: &str) -> Option<BaBoFields<'_>> {
    // 1) "BA_"
    let rest: &str = strip_keyword(line, "BA_")?;

    // 2) Attribute name (e.g., "\"GenMsgCycleTime\"")
    let (attr, rest) = take_quoted(rest)?;
    if !is_ident(attr) {
        return None;
    }

    // 3) "BO_"
    let rest: &str = strip_keyword(rest, "BO_")?;

    // 4) message id
    let (id, rest) = take_token(rest)?;
    if !is_uint(id) {
        return None;
    }

    // 5) value, terminated by ';'
    let value: AttributeValue = AttributeValue::from_token(strip_terminator(rest)?)?;

    Some(BaBoFields { attr, id, value })
}
