use crate::dbc::core::strings::{take_quoted, take_token};

/// Statement kind of one trimmed DBC line.
///
/// A line is classified once and then handed to the matcher for its kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LineKind {
    /// `BO_ <id> <name>: <size> <node>`
    Message,
    /// `SG_ <name> : <start>|<len>@...`
    Signal,
    /// `BA_ "<attr>" BO_ <id> <value>;`
    MessageAttribute,
    /// `BA_ "<attr>" SG_ <id> <signal> <value>;`
    SignalAttribute,
    /// `BA_ "BusType" "<CAN|CANFD>";`
    BusType,
    /// `BA_ "DBName" "<name>";`
    DbName,
    /// `VAL_ <id> <signal> <pairs>;`
    ValueTable,
    /// Anything else (comments, node lists, definitions, ...).
    Other,
}

impl LineKind {
    /// Short description used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            LineKind::Message => "message",
            LineKind::Signal => "signal",
            LineKind::MessageAttribute => "<BA_ xxx BO_ xxx>",
            LineKind::SignalAttribute => "<BA_ xxx SG_ xxx>",
            LineKind::BusType => "<BA_ \"BusType\">",
            LineKind::DbName => "<BA_ \"DBName\">",
            LineKind::ValueTable => "<VAL_ xxx>",
            LineKind::Other => "line",
        }
    }
}

/// Classifies a trimmed line by its leading keyword.
pub fn classify(line: &str) -> LineKind {
    let Some((first, rest)) = take_token(line) else {
        return LineKind::Other;
    };

    if first.eq_ignore_ascii_case("BO_") {
        LineKind::Message
    } else if first.eq_ignore_ascii_case("SG_") {
        LineKind::Signal
    } else if first.eq_ignore_ascii_case("VAL_") {
        LineKind::ValueTable
    } else if first.eq_ignore_ascii_case("BA_") {
        classify_attribute(rest)
    } else {
        LineKind::Other
    }
}

fn classify_attribute(rest: &str) -> LineKind {
    // `rest` starts right after "BA_"
    let Some((attr_name, after)) = take_quoted(rest) else {
        return LineKind::Other;
    };
    let object: &str = take_token(after).map(|(t, _)| t).unwrap_or("");

    if object.eq_ignore_ascii_case("BO_") {
        LineKind::MessageAttribute
    } else if object.eq_ignore_ascii_case("SG_") {
        LineKind::SignalAttribute
    } else if attr_name.eq_ignore_ascii_case("BusType") {
        LineKind::BusType
    } else if attr_name.eq_ignore_ascii_case("DBName") {
        LineKind::DbName
    } else {
        LineKind::Other
    }
}
