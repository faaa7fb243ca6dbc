use super::Token;
use crate::element::Bond;

/// One atom of a HOSE code together with the modifiers written around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomSpec {
    pub symbol: String,
    /// Bond to the atom's parent.
    pub bond: Bond,
    pub ring: bool,
    pub charge: i8,
    pub aromatic: bool,
}

impl AtomSpec {
    pub fn is_hydrogen(&self) -> bool {
        crate::element::is_hydrogen(&self.symbol)
    }
}

/// Parse one atom spec starting at `pos`.
///
/// Leading modifiers are consumed first; a later modifier of the same
/// kind overrides an earlier one. If no atom token follows, returns
/// `None` with the position just past the consumed modifiers, and the
/// caller skips it. After the atom, at most one charge, then one
/// aromatic marker, then one delocalization marker are taken, in that
/// order.
///
/// # Returns
///
/// * `(Option<AtomSpec>, usize)` - The parsed spec, if any, and the new position.
pub fn parse_atom_spec(tokens: &[Token], mut pos: usize) -> (Option<AtomSpec>, usize) {
    let mut bond = Bond::Single;
    let mut ring = false;
    let mut charge = 0;
    let mut aromatic = false;

    while let Some(token) = tokens.get(pos).filter(|t| t.is_modifier()) {
        match token {
            Token::Double => bond = Bond::Double,
            Token::Triple => bond = Bond::Triple,
            Token::Aromatic => {
                aromatic = true;
                bond = Bond::Aromatic;
            }
            Token::Ring => ring = true,
            Token::ChargePositive => charge = 1,
            Token::ChargeNegative => charge = -1,
            _ => {}
        }
        pos += 1;
    }

    let symbol = match tokens.get(pos) {
        Some(Token::Atom(symbol)) => symbol.clone(),
        _ => return (None, pos),
    };
    pos += 1;

    match tokens.get(pos) {
        Some(Token::ChargePositive) => {
            charge = 1;
            pos += 1;
        }
        Some(Token::ChargeNegative) => {
            charge = -1;
            pos += 1;
        }
        _ => {}
    }
    if let Some(Token::Aromatic) = tokens.get(pos) {
        aromatic = true;
        bond = Bond::Aromatic;
        pos += 1;
    }
    if let Some(Token::Delocalized) = tokens.get(pos) {
        pos += 1;
    }

    let spec = AtomSpec {
        symbol,
        bond,
        ring,
        charge,
        aromatic,
    };
    (Some(spec), pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::tokenize;

    fn parse_first(code: &str) -> (Option<AtomSpec>, usize) {
        parse_atom_spec(&tokenize(code), 0)
    }

    #[test]
    fn test_plain_atom() {
        let (spec, pos) = parse_first("CH");
        let spec = spec.expect("expected an atom");
        assert_eq!(spec.symbol, "C");
        assert_eq!(spec.bond, Bond::Single);
        assert!(!spec.ring && !spec.aromatic);
        assert_eq!(spec.charge, 0);
        assert_eq!(pos, 1);
    }

    #[test]
    fn test_leading_modifiers() {
        let (spec, pos) = parse_first("@=N");
        let spec = spec.expect("expected an atom");
        assert_eq!(spec.symbol, "N");
        assert_eq!(spec.bond, Bond::Double);
        assert!(spec.ring);
        assert_eq!(pos, 3);

        // The later bond modifier wins.
        let (spec, _) = parse_first("=#C");
        assert_eq!(spec.expect("expected an atom").bond, Bond::Triple);

        let (spec, _) = parse_first("+-O");
        assert_eq!(spec.expect("expected an atom").charge, -1);
    }

    #[test]
    fn test_trailing_modifiers() {
        let (spec, pos) = parse_first("N+C");
        assert_eq!(spec.expect("expected an atom").charge, 1);
        assert_eq!(pos, 2);

        // A trailing charge overrides a leading one.
        let (spec, _) = parse_first("-N+");
        assert_eq!(spec.expect("expected an atom").charge, 1);

        let (spec, pos) = parse_first("C*&C");
        let spec = spec.expect("expected an atom");
        assert!(spec.aromatic);
        assert_eq!(spec.bond, Bond::Aromatic);
        assert_eq!(pos, 3);
    }

    #[test]
    fn test_aromatic_pair() {
        let tokens = tokenize("*C*C");
        let (first, pos) = parse_atom_spec(&tokens, 0);
        let first = first.expect("expected an atom");
        assert!(first.aromatic);
        assert_eq!(first.bond, Bond::Aromatic);
        // The second `*` trails the first atom.
        assert_eq!(pos, 3);
        let (second, pos) = parse_atom_spec(&tokens, pos);
        assert!(!second.expect("expected an atom").aromatic);
        assert_eq!(pos, 4);
    }

    #[test]
    fn test_no_atom() {
        assert_eq!(parse_first(""), (None, 0));
        assert_eq!(parse_first("=@"), (None, 2));
        // Structural tokens are not modifiers and are left in place.
        assert_eq!(parse_first(",C"), (None, 0));
        assert_eq!(parse_first("=(C"), (None, 1));
    }
}
