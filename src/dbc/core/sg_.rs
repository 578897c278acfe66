use crate::dbc::core::strings::{is_ident, is_uint, strip_keyword};

/// Captures of an `SG_` line, all as written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SgFields<'a> {
    pub name: &'a str,
    pub start_bit: &'a str,
    pub length: &'a str,
    /// `1` = little-endian (Intel), `0` = big-endian (Motorola).
    pub byte_order: &'a str,
    /// `+` unsigned, `-` signed.
    pub sign: &'a str,
    pub factor: &'a str,
    pub offset: &'a str,
    pub min: &'a str,
    pub max: &'a str,
    pub unit: &'a str,
    pub receiver: &'a str,
}

/// Matches an `SG_` line of the current message block.
///
/// Format:
/// SG_ <name> : <bit_start>|<bit_length>@<endian><sign> (<factor>,<offset>) [<min>|<max>] "<unit>" <receivers...>
pub fn match_line(line: &str) -> Option<SgFields<'_>> {
    let rest: &str = strip_keyword(line, "SG_")?;

    // Left part: SG_ NAME
    let colon: usize = rest.find(':')?;
    let name: &str = rest[..colon].trim();
    if !is_ident(name) {
        return None;
    }
    let right: &str = rest[colon + 1..].trim_start();

    // 1) bit info: "63|1@1+", spaces tolerated around the separators
    let paren_open: usize = right.find('(')?;
    let bit_info: &str = right[..paren_open].trim();
    let (pos_len, flags) = bit_info.split_once('@')?;
    let (start_bit, length) = pos_len.split_once('|')?;
    let (start_bit, length) = (start_bit.trim(), length.trim());
    let flags: &str = flags.trim();
    let byte_order: &str = flags.get(..1)?;
    let sign: &str = flags[1..].trim();
    if !is_uint(start_bit) || !is_uint(length) {
        return None;
    }
    if !matches!(byte_order, "0" | "1") || !matches!(sign, "+" | "-") {
        return None;
    }
    // a space is required before the scaling group
    if !right[..paren_open].ends_with(char::is_whitespace) {
        return None;
    }

    // 2) "(factor,offset)"
    let after_open: &str = &right[paren_open + 1..];
    let paren_close: usize = after_open.find(')')?;
    let (factor, offset) = after_open[..paren_close].split_once(',')?;
    let (factor, offset) = (factor.trim(), offset.trim());

    // 3) "[min|max]"
    let rest: &str = &after_open[paren_close + 1..];
    let rest_trimmed: &str = rest.trim_start();
    if rest_trimmed.len() == rest.len() {
        return None;
    }
    let bounds: &str = rest_trimmed.strip_prefix('[')?;
    let bracket_close: usize = bounds.find(']')?;
    let (min, max) = bounds[..bracket_close].split_once('|')?;
    let (min, max) = (min.trim(), max.trim());

    // 4) "unit" (quoted, may be empty)
    let rest: &str = &bounds[bracket_close + 1..];
    let unit_part: &str = rest.trim_start();
    if unit_part.len() == rest.len() {
        return None;
    }
    let unit_body: &str = unit_part.strip_prefix('"')?;
    let unit_close: usize = unit_body.rfind('"')?;
    let unit: &str = &unit_body[..unit_close];

    // 5) receivers
    let tail: &str = &unit_body[unit_close + 1..];
    let receiver: &str = tail.trim();
    if receiver.is_empty() || !tail.starts_with(char::is_whitespace) {
        return None;
    }

    if [factor, offset, min, max].iter().any(|s| s.is_empty()) {
        return None;
    }

    Some(SgFields {
        name,
        start_bit,
        length,
        byte_order,
        sign,
        factor,
        offset,
        min,
        max,
        unit,
        receiver,
    })
}

/// True when the signal carries a multiplexer tag (`M` or `m<n>`) before the colon.
pub fn is_multiplexed(line: &str) -> bool {
    let Some(rest) = strip_keyword(line, "SG_") else {
        return false;
    };
    let Some((left, _)) = rest.split_once(':') else {
        return false;
    };
    let mut tokens = left.split_ascii_whitespace();
    let _name = tokens.next();
    match tokens.next() {
        Some("M") => true,
        Some(tag) => tag
            .strip_prefix('m')
            .is_some_and(|n| is_uint(n.trim_end_matches('M'))),
        None => false,
    }
}
