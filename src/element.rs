use lazy_static::lazy_static;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter, Result as FmtResult};

lazy_static! {
    /// Bremser single-letter substitutions used to squeeze two-letter
    /// elements into the one-character atom slots of a HOSE code.
    static ref BREMSER_MAP: BTreeMap<char, &'static str> = BTreeMap::from([
        ('X', "Cl"),
        ('Y', "Br"),
        ('Q', "Si"),
        ('G', "Ge"),
        ('T', "Te"),
        ('A', "As"),
        ('L', "Tl"),
        ('M', "Sn"),
        ('K', "Sb"),
    ]);

    /// Elements that may be written without brackets when uncharged.
    static ref ORGANIC_SUBSET: BTreeSet<&'static str> =
        BTreeSet::from(["B", "C", "N", "O", "P", "S", "F", "Cl", "Br", "I"]);

    /// Elements rendered lowercase when aromatic.
    static ref AROMATIC_CAPABLE: BTreeSet<&'static str> =
        BTreeSet::from(["C", "N", "O", "S", "P"]);
}

/// Resolve an uppercase HOSE atom letter to its element symbol.
pub fn resolve_symbol(letter: char) -> String {
    BREMSER_MAP
        .get(&letter)
        .map(|symbol| symbol.to_string())
        .unwrap_or_else(|| letter.to_string())
}

/// Whether `symbol` can be written bare in SMILES. Lowercase aromatic
/// forms count the same as their uppercase element.
pub fn is_organic_subset(symbol: &str) -> bool {
    if ORGANIC_SUBSET.contains(symbol) {
        return true;
    }
    let upper = symbol.to_ascii_uppercase();
    AROMATIC_CAPABLE.contains(upper.as_str()) && symbol == upper.to_ascii_lowercase()
}

pub fn is_aromatic_capable(symbol: &str) -> bool {
    AROMATIC_CAPABLE.contains(symbol)
}

pub fn is_hydrogen(symbol: &str) -> bool {
    symbol == "H"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Bond {
    #[default]
    Single,
    Double,
    Triple,
    Aromatic,
}

impl Bond {
    /// The SMILES bond symbol. Aromatic bonds are implied by the
    /// lowercase atoms on both ends.
    pub fn smiles_symbol(&self) -> &'static str {
        match self {
            Bond::Double => "=",
            Bond::Triple => "#",
            Bond::Single | Bond::Aromatic => "",
        }
    }
}

impl Display for Bond {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Bond::Single => write!(f, "-"),
            Bond::Double => write!(f, "="),
            Bond::Triple => write!(f, "#"),
            Bond::Aromatic => write!(f, ":"),
        }
    }
}
