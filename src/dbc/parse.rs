use crate::dbc::core::{
    ba_bo_, ba_sg_, bo_,
    line::LineKind,
    message_layout::{absolute_start_bit, check_signal_fits},
    sg_, val_,
};
use crate::dbc::extract::{Extracted, NumberedLine, extract_file, extract_from_reader, grammar_error};
use crate::types::{
    attributes::{FrameFormat, MessageAttr, SignalAttr, il_support_label},
    catalog::Catalog,
    errors::{DbcError, Result},
    message::Message,
    signal::{ByteOrder, Signal, ValueType},
};

use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::Path;
use std::str::FromStr;

/// Parses a DBC file and builds its [`Catalog`].
///
/// The file is read once; its lines are grouped and then merged into the
/// catalog in a fixed order:
/// - **Messages and signals** (from `BO_` / `SG_` blocks)
/// - **Message attributes** (from `BA_ "<name>" BO_` lines), then the cyclic default rule
/// - **Signal attributes** (from `BA_ "<name>" SG_` lines)
/// - **Value tables** (from `VAL_` lines)
///
/// # Parameters
/// - `path`: Path to the `.dbc` file to parse.
///
/// # Returns
/// - `Ok(Catalog)` with every message keyed by its decimal id.
///
/// # Errors
/// Returns an `Err(DbcError)` if:
/// - The file does not exist or cannot be read.
/// - A recognized statement does not match its grammar.
/// - A number, attribute code or reference cannot be resolved.
/// - A message id or a value table is declared twice.
pub fn from_file(path: &Path) -> Result<Catalog> {
    log::info!("start parsing dbc file: <{}>", path.display());
    let extracted: Extracted = extract_file(path)?;
    build_catalog(extracted)
}

/// Same as [`from_file`], reading from any buffered source.
pub fn from_reader<R: BufRead>(reader: R, origin: &Path) -> Result<Catalog> {
    let extracted: Extracted = extract_from_reader(reader, origin)?;
    build_catalog(extracted)
}

/// Merges extracted worklists into a finished [`Catalog`].
pub fn build_catalog(extracted: Extracted) -> Result<Catalog> {
    let mut catalog: Catalog = Catalog {
        head: extracted.head,
        ..Default::default()
    };

    for block in &extracted.message_blocks {
        let message: Message = build_message(block)?;
        let key: String = message.message_id.to_string();
        if catalog.messages.contains_key(&key) {
            log::error!("DBC, message id {} declared twice", message.message_id);
            return Err(DbcError::DuplicateMessage {
                message_id: message.message_id,
            });
        }
        catalog.messages.insert(key, message);
    }

    for line in &extracted.message_attributes {
        apply_message_attribute(&mut catalog, line)?;
    }
    for message in catalog.messages.values_mut() {
        apply_cyclic_default(message);
    }

    for line in &extracted.signal_attributes {
        apply_signal_attribute(&mut catalog, line)?;
    }

    for line in &extracted.value_tables {
        apply_value_table(&mut catalog, line)?;
    }

    log::debug!(
        "catalog built: {} message(s), {} signal(s)",
        catalog.len(),
        catalog.signal_count()
    );
    Ok(catalog)
}

fn parse_number<T: FromStr>(field: &'static str, value: &str, line_no: usize) -> Result<T> {
    value.parse::<T>().map_err(|_| {
        log::error!("DBC, invalid {field} '{value}' at line {line_no}");
        DbcError::InvalidNumber {
            field,
            value: value.to_string(),
            line_no,
        }
    })
}

fn build_message(block: &[NumberedLine]) -> Result<Message> {
    let Some((head, signal_lines)) = block.split_first() else {
        return Err(DbcError::Grammar {
            kind: LineKind::Message.describe(),
            line_no: 0,
            line: String::new(),
        });
    };

    let fields = bo_::match_line(&head.text)
        .ok_or_else(|| grammar_error(LineKind::Message, head.line_no, &head.text))?;

    let message_size: u8 = parse_number("message_size", fields.size, head.line_no)?;
    if message_size > 64 {
        log::error!("DBC, message size {message_size} exceeds 64 bytes");
        return Err(DbcError::InvalidNumber {
            field: "message_size",
            value: fields.size.to_string(),
            line_no: head.line_no,
        });
    }

    let mut message: Message = Message {
        message_id: parse_number("message_id", fields.id, head.line_no)?,
        message_name: fields.name.to_string(),
        message_size,
        node_name: fields.node.to_string(),
        ..Default::default()
    };

    for line in signal_lines {
        let signal: Signal = build_signal(line)?;
        if let Err(err) = check_signal_fits(
            message.message_size,
            signal.raw_start_bit,
            signal.signal_size,
            signal.byte_order,
        ) {
            log::warn!(
                "signal {} does not fit in message {} ({}): {}",
                signal.signal_name,
                message.message_name,
                message.id_hex(),
                err
            );
        }
        if let Some(previous) = message.signals.insert(signal.signal_name.clone(), signal) {
            log::warn!(
                "signal {} declared twice in message {}, keeping the last definition",
                previous.signal_name,
                message.message_name
            );
        }
    }
    Ok(message)
}

fn build_signal(line: &NumberedLine) -> Result<Signal> {
    let line_no: usize = line.line_no;
    let Some(fields) = sg_::match_line(&line.text) else {
        if sg_::is_multiplexed(&line.text) {
            log::error!("DBC, multiplexed signal is not supported: <{}>", line.text);
            return Err(DbcError::MultiplexedSignal {
                line_no,
                line: line.text.clone(),
            });
        }
        return Err(grammar_error(LineKind::Signal, line_no, &line.text));
    };

    let byte_order: ByteOrder = ByteOrder::from_flag(fields.byte_order)
        .ok_or_else(|| grammar_error(LineKind::Signal, line_no, &line.text))?;
    let value_type: ValueType = ValueType::from_sign(fields.sign)
        .ok_or_else(|| grammar_error(LineKind::Signal, line_no, &line.text))?;
    let raw_start_bit: u16 = parse_number("start_bit", fields.start_bit, line_no)?;
    let signal_size: u16 = parse_number("signal_size", fields.length, line_no)?;

    Ok(Signal {
        signal_name: fields.name.to_string(),
        raw_start_bit,
        signal_size,
        byte_order,
        value_type,
        factor: parse_number("factor", fields.factor, line_no)?,
        offset: parse_number("offset", fields.offset, line_no)?,
        min_value: parse_number("min_value", fields.min, line_no)?,
        max_value: parse_number("max_value", fields.max, line_no)?,
        unit: fields.unit.to_string(),
        receiver: fields.receiver.to_string(),
        start_bit: absolute_start_bit(raw_start_bit, signal_size, byte_order),
        ..Default::default()
    })
}

fn unknown_message(id: u32) -> DbcError {
    log::error!("DBC, attribute or value table refers to unknown message id {id}");
    DbcError::UnknownMessage {
        message: id.to_string(),
    }
}

fn unknown_signal(message_id: u32, signal: &str) -> DbcError {
    log::error!("DBC, attribute or value table refers to unknown signal {message_id}/{signal}");
    DbcError::UnknownSignal {
        message_id,
        signal: signal.to_string(),
    }
}

fn unknown_code(attribute: &str, code: &str) -> DbcError {
    log::error!("DBC, attribute {attribute} has no entry for code '{code}'");
    DbcError::UnknownAttributeCode {
        attribute: attribute.to_string(),
        code: code.to_string(),
    }
}

fn apply_message_attribute(catalog: &mut Catalog, line: &NumberedLine) -> Result<()> {
    let fields = ba_bo_::match_line(&line.text)
        .ok_or_else(|| grammar_error(LineKind::MessageAttribute, line.line_no, &line.text))?;
    let id: u32 = parse_number("message_id", fields.id, line.line_no)?;
    let message: &mut Message = catalog
        .message_by_id_mut(id)
        .ok_or_else(|| unknown_message(id))?;

    let Some(attr) = MessageAttr::from_name(fields.attr) else {
        log::warn!("message attribute ignored: <{}>", fields.attr);
        return Ok(());
    };
    log::debug!("message {} {} = {}", id, attr.field_name(), fields.value);
    let value: &str = fields.value.as_str();

    match attr {
        MessageAttr::SendType => message.send_type = Some(value.to_string()),
        MessageAttr::IlSupport => {
            let label: &str = il_support_label(value).ok_or_else(|| unknown_code(fields.attr, value))?;
            message.il_support = Some(label.to_string());
        }
        MessageAttr::CycleTime => {
            message.cycle_time = Some(parse_number("cycle_time", value, line.line_no)?);
        }
        MessageAttr::FrameFormat => {
            let format: FrameFormat =
                FrameFormat::from_code(value).ok_or_else(|| unknown_code(fields.attr, value))?;
            message.frame_format = Some(format);
        }
        MessageAttr::NmMessage => message.network_manage_message = Some(value.to_string()),
        MessageAttr::DiagState => message.diagnose_state = Some(value.to_string()),
    }
    Ok(())
}

/// A message with a positive cycle time and no declared send type is cyclic.
fn apply_cyclic_default(message: &mut Message) {
    if message.send_type.is_none() && message.cycle_time.is_some_and(|t| t > 0) {
        message.send_type = Some("0".to_string());
    }
}

fn apply_signal_attribute(catalog: &mut Catalog, line: &NumberedLine) -> Result<()> {
    let fields = ba_sg_::match_line(&line.text)
        .ok_or_else(|| grammar_error(LineKind::SignalAttribute, line.line_no, &line.text))?;
    let Some(attr) = SignalAttr::from_name(fields.attr) else {
        log::warn!("signal attribute ignored: <{}>", fields.attr);
        return Ok(());
    };
    let id: u32 = parse_number("message_id", fields.id, line.line_no)?;
    let signal: &mut Signal = catalog
        .message_by_id_mut(id)
        .ok_or_else(|| unknown_message(id))?
        .signals
        .get_mut(fields.signal)
        .ok_or_else(|| unknown_signal(id, fields.signal))?;

    log::debug!(
        "signal {}/{} {} = {}",
        id,
        fields.signal,
        attr.field_name(),
        fields.value
    );
    let value: &str = fields.value.as_str();

    match attr {
        SignalAttr::StartValue => {
            // raw start value rescaled to physical
            let raw: f64 = parse_number("default_value", value, line.line_no)?;
            signal.default_value = Some((raw * signal.factor + signal.offset).round() as i64);
        }
        SignalAttr::SendType => signal.send_type = Some(value.to_string()),
        SignalAttr::CycleTime => {
            signal.cycle_time = Some(parse_number("cycle_time", value, line.line_no)?);
        }
        SignalAttr::LongName => signal.long_name = Some(value.to_string()),
    }
    Ok(())
}

fn apply_value_table(catalog: &mut Catalog, line: &NumberedLine) -> Result<()> {
    let fields = val_::match_line(&line.text)
        .ok_or_else(|| grammar_error(LineKind::ValueTable, line.line_no, &line.text))?;
    let id: u32 = parse_number("message_id", fields.id, line.line_no)?;
    let signal: &mut Signal = catalog
        .message_by_id_mut(id)
        .ok_or_else(|| unknown_message(id))?
        .signals
        .get_mut(fields.signal)
        .ok_or_else(|| unknown_signal(id, fields.signal))?;

    if !signal.values.is_empty() {
        log::error!("DBC, value table for {}/{} declared twice", id, fields.signal);
        return Err(DbcError::DuplicateValueTable {
            message_id: id,
            signal: fields.signal.to_string(),
        });
    }

    // pairs keep their declaration order; the first one is the initial value
    let mut values: BTreeMap<i64, String> = BTreeMap::new();
    let mut first_value: Option<i64> = None;
    for (raw, label) in fields.pairs {
        let raw: i64 = parse_number("value_table", raw, line.line_no)?;
        first_value.get_or_insert(raw);
        values.insert(raw, label.to_string());
    }
    signal.values = values;
    signal.first_value = first_value;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const DBC: &str = r#"VERSION ""

BU_: GW HUT

BO_ 763 VMDR1: 8 GW
 SG_ VehSpd : 0|16@1+ (0.00390625,0) [0|255.99609375] "km/h"  HUT
 SG_ VehSpdVD : 16|1@1+ (1,0) [0|1] ""  HUT
 SG_ Temp : 39|12@0- (0.1,-10) [-214.8|194.7] "degC"  HUT

BO_ 1280 NM_GW: 8 GW
 SG_ NmSrc : 0|8@1+ (1,0) [0|255] ""  HUT

BO_ 2566834688 DiagReq: 64 HUT
 SG_ Payload : 0|64@1+ (1,0) [0|0] ""  GW

CM_ SG_ 763 VehSpd "vehicle speed";
BA_DEF_ BO_ "GenMsgCycleTime" INT 0 65535;
BA_ "BusType" "CANFD";
BA_ "DBName" "P05_CANFD";
BA_ "GenMsgCycleTime" BO_ 763 100;
BA_ "GenMsgILSupport" BO_ 763 1;
BA_ "VFrameFormat" BO_ 763 14;
BA_ "GenMsgSendType" BO_ 1280 2;
BA_ "GenMsgCycleTime" BO_ 1280 1000;
BA_ "NmMessage" BO_ 1280 1;
BA_ "VFrameFormat" BO_ 2566834688 15;
BA_ "DiagState" BO_ 2566834688 "Yes";
BA_ "GenMsgDelayTime" BO_ 763 10;
BA_ "GenSigStartValue" SG_ 763 Temp 100;
BA_ "GenSigSendType" SG_ 763 VehSpd 3;
BA_ "GenSigCycleTime" SG_ 763 VehSpd 20;
BA_ "SystemSignalLongSymbol" SG_ 763 VehSpdVD "VehicleSpeedValidData";
BA_ "GenSigInactiveValue" SG_ 763 VehSpd 0;
VAL_ 763 VehSpdVD 1 "Valid" 0 "Invalid" ;
"#;

    fn parse(text: &str) -> Result<Catalog> {
        from_reader(Cursor::new(text.as_bytes().to_vec()), Path::new("test.dbc"))
    }

    #[test]
    fn test_build_catalog() {
        let catalog: Catalog = parse(DBC).unwrap();

        assert_eq!(catalog.head.bus_type.as_deref(), Some("CANFD"));
        assert_eq!(catalog.head.db_name.as_deref(), Some("P05_CANFD"));
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.signal_count(), 5);

        let vmdr1 = catalog.message_by_id(763).unwrap();
        assert_eq!(vmdr1.message_name, "VMDR1");
        assert_eq!(vmdr1.node_name, "GW");
        assert_eq!(vmdr1.cycle_time, Some(100));
        assert_eq!(vmdr1.il_support.as_deref(), Some("Yes"));
        assert_eq!(vmdr1.frame_format, Some(FrameFormat::StandardCanFd));
        // cycle time without send type
        assert_eq!(vmdr1.send_type.as_deref(), Some("0"));

        let nm = catalog.message_by_id(1280).unwrap();
        assert_eq!(nm.send_type.as_deref(), Some("2"));
        assert_eq!(nm.network_manage_message.as_deref(), Some("1"));
        assert!(nm.il_support.is_none());

        let diag = catalog.message_by_id(2566834688).unwrap();
        assert_eq!(diag.message_size, 64);
        assert_eq!(diag.frame_format, Some(FrameFormat::ExtendedCanFd));
        assert_eq!(diag.diagnose_state.as_deref(), Some("Yes"));
        assert!(diag.send_type.is_none());
    }

    #[test]
    fn test_signal_fields() {
        let catalog: Catalog = parse(DBC).unwrap();
        let vmdr1 = catalog.message_by_id(763).unwrap();

        let spd = &vmdr1.signals["VehSpd"];
        assert_eq!(spd.raw_start_bit, 0);
        assert_eq!(spd.signal_size, 16);
        assert_eq!(spd.byte_order, ByteOrder::Intel);
        assert_eq!(spd.factor, 0.00390625);
        assert_eq!(spd.unit, "km/h");
        assert_eq!(spd.receiver, "HUT");
        assert_eq!(spd.start_bit, absolute_start_bit(0, 16, ByteOrder::Intel));
        assert_eq!(spd.send_type.as_deref(), Some("3"));
        assert_eq!(spd.cycle_time, Some(20));
        assert!(spd.values.is_empty());

        let temp = &vmdr1.signals["Temp"];
        assert_eq!(temp.byte_order, ByteOrder::Motorola);
        assert_eq!(temp.value_type, ValueType::Signed);
        assert_eq!(temp.offset, -10.0);
        // round(100 * 0.1 - 10)
        assert_eq!(temp.default_value, Some(0));

        let vd = &vmdr1.signals["VehSpdVD"];
        assert_eq!(vd.long_name.as_deref(), Some("VehicleSpeedValidData"));
        assert_eq!(vd.values.get(&0).map(String::as_str), Some("Invalid"));
        // declared "1 Valid" first
        assert_eq!(vd.first_value, Some(1));
        assert_eq!(spd.first_value, None);
        assert_eq!(vd.values.get(&1).map(String::as_str), Some("Valid"));
    }

    #[test]
    fn test_start_value_rounding() {
        let dbc = "BO_ 1 M: 8 GW\n SG_ S : 0|8@1+ (0.5,0.25) [0|0] \"\" GW\nBA_ \"GenSigStartValue\" SG_ 1 S 5;\n";
        let catalog: Catalog = parse(dbc).unwrap();
        // 5 * 0.5 + 0.25 = 2.75
        assert_eq!(catalog.message_by_id(1).unwrap().signals["S"].default_value, Some(3));
    }

    #[test]
    fn test_grammar_errors_name_the_line() {
        let err = parse("BO_ 1 M: 8 GW\n SG_ S : 0|8@1+ (1,0) [0|0] \"\"\n").unwrap_err();
        assert!(matches!(err, DbcError::Grammar { line_no: 2, kind: "signal", .. }));

        let err = parse("BO_ 1 M 8 GW\n").unwrap_err();
        assert!(matches!(err, DbcError::Grammar { line_no: 1, kind: "message", .. }));

        let err = parse("BO_ 1 M: 8 GW\nBA_ \"GenMsgCycleTime\" BO_ 1;\n").unwrap_err();
        assert!(matches!(err, DbcError::Grammar { line_no: 2, .. }));

        let err = parse("BO_ 1 M: 8 GW\n SG_ S : 0|8@1+ (1,0) [0|0] \"\" GW\nVAL_ 1 S 1 \"On\" 0 ;\n")
            .unwrap_err();
        assert!(matches!(err, DbcError::Grammar { line_no: 3, .. }));
    }

    #[test]
    fn test_multiplexed_signal_rejected() {
        let err = parse("BO_ 1 M: 8 GW\n SG_ Mux M : 0|8@1+ (1,0) [0|0] \"\" GW\n").unwrap_err();
        assert!(matches!(err, DbcError::MultiplexedSignal { line_no: 2, .. }));
    }

    #[test]
    fn test_unresolved_references() {
        let err = parse("BO_ 1 M: 8 GW\nBA_ \"GenMsgCycleTime\" BO_ 2 100;\n").unwrap_err();
        assert!(matches!(err, DbcError::UnknownMessage { .. }));

        let err = parse("BO_ 1 M: 8 GW\nBA_ \"GenSigStartValue\" SG_ 1 Nope 0;\n").unwrap_err();
        assert!(matches!(err, DbcError::UnknownSignal { message_id: 1, .. }));

        let err = parse("BO_ 1 M: 8 GW\nVAL_ 1 Nope 1 \"On\" 0 \"Off\" ;\n").unwrap_err();
        assert!(matches!(err, DbcError::UnknownSignal { .. }));
    }

    #[test]
    fn test_unrecognized_signal_attribute_is_dropped_before_lookup() {
        let dbc = "BO_ 1 M: 8 GW\n SG_ S : 0|8@1+ (1,0) [0|0] \"\" GW\n\
BA_ \"GenSigInactiveValue\" SG_ 1 Ghost 0;\n\
BA_ \"GenSigInactiveValue\" SG_ 99 S 0;\n";
        let catalog: Catalog = parse(dbc).unwrap();
        assert_eq!(catalog.signal_count(), 1);
    }

    #[test]
    fn test_attribute_code_without_entry() {
        let err = parse("BO_ 1 M: 8 GW\nBA_ \"VFrameFormat\" BO_ 1 7;\n").unwrap_err();
        assert!(matches!(err, DbcError::UnknownAttributeCode { .. }));

        let err = parse("BO_ 1 M: 8 GW\nBA_ \"GenMsgILSupport\" BO_ 1 2;\n").unwrap_err();
        assert!(matches!(err, DbcError::UnknownAttributeCode { .. }));
    }

    #[test]
    fn test_duplicates() {
        let err = parse("BO_ 1 A: 8 GW\nBO_ 1 B: 8 GW\n").unwrap_err();
        assert!(matches!(err, DbcError::DuplicateMessage { message_id: 1 }));

        let dbc = "BO_ 1 M: 8 GW\n SG_ S : 0|8@1+ (1,0) [0|0] \"\" GW\n\
VAL_ 1 S 1 \"On\" 0 \"Off\" ;\nVAL_ 1 S 1 \"An\" 0 \"Aus\" ;\n";
        let err = parse(dbc).unwrap_err();
        assert!(matches!(err, DbcError::DuplicateValueTable { message_id: 1, .. }));
    }

    #[test]
    fn test_invalid_numbers() {
        let err = parse("BO_ 1 M: 99 GW\n").unwrap_err();
        assert!(matches!(err, DbcError::InvalidNumber { field: "message_size", .. }));

        let err = parse("BO_ 1 M: 8 GW\nBA_ \"GenMsgCycleTime\" BO_ 1 -5;\n").unwrap_err();
        assert!(matches!(err, DbcError::InvalidNumber { field: "cycle_time", .. }));

        let err = parse("BO_ 1 M: 8 GW\n SG_ S : 0|8@1+ (1,0) [0|0] \"\" GW\nBA_ \"GenSigStartValue\" SG_ 1 S \"x\";\n")
            .unwrap_err();
        assert!(matches!(err, DbcError::InvalidNumber { field: "default_value", .. }));
    }

    #[test]
    fn test_signal_outside_frame_is_kept() {
        let catalog: Catalog = parse("BO_ 1 M: 1 GW\n SG_ S : 4|8@1+ (1,0) [0|0] \"\" GW\n").unwrap();
        assert!(catalog.message_by_id(1).unwrap().signals.contains_key("S"));
    }

    #[test]
    fn test_empty_input() {
        let catalog: Catalog = parse("").unwrap();
        assert!(catalog.is_empty());
        assert_eq!(catalog.head, Default::default());
    }
}
