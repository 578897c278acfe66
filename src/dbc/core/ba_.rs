use crate::dbc::core::strings::{is_ident, strip_keyword, strip_terminator, take_quoted};

/// Matches `BA_ "BusType" "<CAN|CANFD>";` and returns the bus type.
pub fn match_bus_type(line: &str) -> Option<&str> {
    let value: &str = match_global_string(line, "BusType")?;
    if value.eq_ignore_ascii_case("CAN") || value.eq_ignore_ascii_case("CANFD") {
        Some(value)
    } else {
        None
    }
}

/// Matches `BA_ "DBName" "<name>";` and returns the database name.
pub fn match_db_name(line: &str) -> Option<&str> {
    match_global_string(line, "DBName").filter(|v| is_ident(v))
}

fn match_global_string<'a>(line: &'a str, attr_name: &str) -> Option<&'a str> {
    let rest: &str = strip_keyword(line, "BA_")?;
    let (attr, rest) = take_quoted(rest)?;
    if !attr.eq_ignore_ascii_case(attr_name) {
        return None;
    }
    let (value, tail) = take_quoted(strip_terminator(rest)?)?;
    if !tail.is_empty() {
        return None;
    }
    Some(value)
}
