use crate::dbc::core::strings::{is_ident, is_uint, strip_keyword, take_token};

/// Captures of `BO_ <id> <name> : <size> <node>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoFields<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub size: &'a str,
    pub node: &'a str,
}

/// Matches a `BO_` line.
/// Accepts both: `BO_ 123 NAME: 8 Node` and `BO_ 123 NAME : 8 Node`.
pub fn match_line(line: &str) -> Option<BoFields<'_>> {
    let rest: &str = strip_keyword(line, "BO_")?;

    // 1) ID (first token)
    let (id, rest) = take_token(rest)?;
    if !is_uint(id) {
        return None;
    }

    // 2) NAME (everything up to the first ':')
    let colon_pos: usize = rest.find(':')?;
    let name: &str = rest[..colon_pos].trim();
    if !is_ident(name) {
        return None;
    }

    // 3) After ':' → <len> <sender>
    let mut it = rest[colon_pos + 1..].split_ascii_whitespace();
    let size: &str = it.next()?;
    let node: &str = it.next()?;
    if !is_uint(size) || !is_ident(node) {
        return None;
    }

    Some(BoFields {
        id,
        name,
        size,
        node,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_line() {
        let f = match_line("BO_ 763 VMDR1: 8 GW").unwrap();
        assert_eq!(f, BoFields { id: "763", name: "VMDR1", size: "8", node: "GW" });

        let f = match_line("BO_ 2527679645 Motor_01 : 64 Vector__XXX").unwrap();
        assert_eq!(f.id, "2527679645");
        assert_eq!(f.size, "64");
        assert_eq!(f.node, "Vector__XXX");
    }

    #[test]
    fn test_no_match() {
        assert!(match_line("BO_ abc VMDR1: 8 GW").is_none());
        assert!(match_line("BO_ 763 VMDR1 8 GW").is_none());
        assert!(match_line("BO_ 763 VMDR1: GW").is_none());
        assert!(match_line("BO_ 763 : 8 GW").is_none());
        assert!(match_line("SG_ 763 VMDR1: 8 GW").is_none());
    }
}
