use crate::smiles::tree_to_smiles;
use crate::tree::HoseTree;
use anyhow::{Context, Result};
use std::panic;
use thiserror::Error;
use tracing::*;

const DEFAULT_CENTRAL_ATOM: &str = "C";

#[derive(Error, Debug)]
pub enum HoseError {
    #[error("HOSE code is empty")]
    EmptyCode,
    #[error("node {0} is not part of the atom tree")]
    MissingNode(usize),
    #[error("ring closure at node {closer} points to non-ancestor node {opener}")]
    RingClosureNotAncestor { opener: usize, closer: usize },
}

/// Extract the central atom symbol from a nucleus descriptor such as
/// `"C-4"`, `"C-3-6"` or `"N-15"`: the text before the first hyphen.
/// Missing or empty descriptors mean carbon.
pub fn central_atom_from_nucleus<'a>(nucleus: impl Into<Option<&'a str>>) -> &'a str {
    nucleus
        .into()
        .and_then(|nucleus| nucleus.split('-').next())
        .map(str::trim)
        .filter(|atom| !atom.is_empty())
        .unwrap_or(DEFAULT_CENTRAL_ATOM)
}

/// Convert a HOSE code into a SMILES fragment, reporting why it failed.
///
/// # Arguments
///
/// * `hose_code` - The HOSE code, e.g. `"C(=CC/HC,HHH/HHC)"`.
/// * `central_atom` - The symbol of the atom the code describes; empty means carbon.
///
/// # Returns
///
/// * `Result<String>` - The SMILES fragment, or the error that stopped the conversion.
pub fn try_convert(hose_code: &str, central_atom: &str) -> Result<String> {
    if hose_code.trim().is_empty() {
        return Err(HoseError::EmptyCode.into());
    }
    let central_atom = match central_atom.trim() {
        "" => DEFAULT_CENTRAL_ATOM,
        atom => atom,
    };

    let tree = HoseTree::parse(hose_code, central_atom);
    let ring_pairs = tree
        .ring_pairs()
        .context(format!("While collecting ring closures of {hose_code}"))?;
    let smiles = tree_to_smiles(&tree, &ring_pairs)
        .context(format!("While writing SMILES for {hose_code}"))?;
    trace!("{hose_code} -> {smiles}");
    Ok(smiles)
}

/// Convert a HOSE code into a SMILES fragment.
///
/// Returns `None` for an empty or whitespace-only code, and for any
/// code the conversion trips over. This never panics, and no stage
/// recurses over the tree, so one bad record cannot abort a batch run.
pub fn convert(hose_code: &str, central_atom: &str) -> Option<String> {
    if hose_code.trim().is_empty() {
        return None;
    }
    match panic::catch_unwind(|| try_convert(hose_code, central_atom)) {
        Ok(Ok(smiles)) if !smiles.is_empty() => Some(smiles),
        Ok(Ok(_)) => None,
        Ok(Err(e)) => {
            warn!("Failed to convert HOSE code {hose_code:?}: {e:#}");
            None
        }
        Err(_) => {
            error!("Conversion of HOSE code {hose_code:?} panicked");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic xorshift generator, enough to shake out crashes.
    struct Noise(u64);

    impl Noise {
        fn next(&mut self) -> u64 {
            self.0 ^= self.0 << 13;
            self.0 ^= self.0 >> 7;
            self.0 ^= self.0 << 17;
            self.0
        }

        fn code(&mut self, alphabet: &[char]) -> String {
            let len = (self.next() % 1001) as usize;
            (0..len)
                .map(|_| alphabet[(self.next() % alphabet.len() as u64) as usize])
                .collect()
        }
    }

    #[test]
    fn test_methyl() {
        let smiles = convert("HHHC", "C").expect("convertible code");
        assert_eq!(smiles.matches('C').count(), 2);
        assert!(!smiles.contains("[H]"));
    }

    #[test]
    fn test_aromatic_double_and_charge() {
        assert!(convert("*C*C", "C").expect("convertible code").contains('c'));
        assert!(convert("=CC", "C").expect("convertible code").contains('='));
        assert!(convert("N+C", "C").expect("convertible code").contains("[N+]"));
        assert!(convert("XC", "C").expect("convertible code").contains("Cl"));
        assert!(convert("YC", "C").expect("convertible code").contains("Br"));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(convert("", "C"), None);
        assert_eq!(convert("   \t", "C"), None);
        let err = try_convert("", "C").expect_err("empty code");
        assert!(matches!(err.downcast_ref::<HoseError>(), Some(HoseError::EmptyCode)));
    }

    #[test]
    fn test_empty_central_atom_means_carbon() {
        assert_eq!(convert("HHHC", ""), Some("CC".to_string()));
    }

    #[test]
    fn test_noisy_records() {
        for code in [
            "HHHC(HCC/H=C,HHH/",
            "CC(HH,,HH/",
            "HHHC/",
            "HHHC(HCC/H=C,HHH/\\H|C)@HCO/@HCO,C/",
            "*C*CC(*C,*C,C,C,=OO/H,H,*C,*&,HHH,HHH,,H/*&C)",
            "HHHC(HHN/CC/HH,HHC,C)HCO,HHH/HHO,H/",
            "CC(HHC,%C/HHC,C/",
            "@HCOC(HHC,H,HHC/@CCC,=&C/=&C,H=C,HHH,HHH),@HCO,\\H|C/",
            "H=CC(HC,HHC/H=C,@OCC/",
            "CC(HHC,H=C/=CC,CC/HC,HHH,HHH,HHH)H=C/HC/",
        ] {
            let smiles = convert(code, "C");
            assert!(
                smiles.as_deref().is_some_and(|s| !s.is_empty()),
                "no SMILES for {code}"
            );
        }
    }

    #[test]
    fn test_deterministic() {
        let code = "CC(HHC,H=C/=CC,CC/HC,HHH,HHH,HHH)H=C/HC/";
        assert_eq!(convert(code, "C"), convert(code, "C"));
    }

    #[test]
    fn test_never_aborts_on_noise() {
        let hose_alphabet: Vec<char> = "CHONSPFXY*=#%@&+-|\\(),/".chars().collect();
        let printable: Vec<char> = (' '..='~').collect();
        let mut noise = Noise(0x9e37_79b9_7f4a_7c15);
        for _ in 0..200 {
            for alphabet in [&hose_alphabet, &printable] {
                let code = noise.code(alphabet);
                match convert(&code, "C") {
                    Some(smiles) => assert!(!smiles.is_empty()),
                    None => assert!(code.trim().is_empty(), "no SMILES for {code:?}"),
                }
            }
        }
    }

    #[test]
    fn test_long_records_convert() {
        for n in [2_000, 5_000, 100_000] {
            let code = format!("@{}", "C".repeat(n));
            let smiles = convert(&code, "C").expect("convertible code");
            assert_eq!(smiles.matches('C').count(), n + 1);
            assert!(smiles.ends_with('1'));
        }
    }

    #[test]
    fn test_central_atom_from_nucleus() {
        assert_eq!(central_atom_from_nucleus("C-4"), "C");
        assert_eq!(central_atom_from_nucleus("C-3-6"), "C");
        assert_eq!(central_atom_from_nucleus("H-1"), "H");
        assert_eq!(central_atom_from_nucleus("N-15"), "N");
        assert_eq!(central_atom_from_nucleus("Si"), "Si");
        assert_eq!(central_atom_from_nucleus(""), "C");
        assert_eq!(central_atom_from_nucleus("-4"), "C");
        assert_eq!(central_atom_from_nucleus(None), "C");
    }
}
