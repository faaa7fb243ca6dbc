use crate::element::resolve_symbol;
use nom::{character::complete::anychar, multi::fold_many0, IResult};

/// A single lexical unit of a HOSE code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// An atom, with Bremser letters already resolved (`X` is `Cl`).
    Atom(String),
    Double,
    Triple,
    Aromatic,
    Ring,
    BranchSeparator,
    SphereSeparator,
    OpenBlock,
    CloseBlock,
    ChargePositive,
    ChargeNegative,
    /// `&`, informational only.
    Delocalized,
    /// `|` or `\`, carried along but never used structurally.
    Stereo,
}

/// The payload-free tag of a [`Token`], used for terminator sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Atom,
    Double,
    Triple,
    Aromatic,
    Ring,
    BranchSeparator,
    SphereSeparator,
    OpenBlock,
    CloseBlock,
    ChargePositive,
    ChargeNegative,
    Delocalized,
    Stereo,
}

impl Token {
    /// Map one input character to at most one token. Anything the HOSE
    /// alphabet does not know about (lowercase letters, digits,
    /// whitespace, stray punctuation) maps to `None`.
    pub fn from_char(c: char) -> Option<Self> {
        let token = match c {
            '(' => Token::OpenBlock,
            ')' => Token::CloseBlock,
            '/' => Token::SphereSeparator,
            ',' => Token::BranchSeparator,
            '=' => Token::Double,
            '#' | '%' => Token::Triple,
            '*' => Token::Aromatic,
            '@' => Token::Ring,
            '&' => Token::Delocalized,
            '+' => Token::ChargePositive,
            '-' => Token::ChargeNegative,
            '|' | '\\' => Token::Stereo,
            c if c.is_ascii_uppercase() => Token::Atom(resolve_symbol(c)),
            _ => return None,
        };
        Some(token)
    }

    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Atom(_) => TokenKind::Atom,
            Token::Double => TokenKind::Double,
            Token::Triple => TokenKind::Triple,
            Token::Aromatic => TokenKind::Aromatic,
            Token::Ring => TokenKind::Ring,
            Token::BranchSeparator => TokenKind::BranchSeparator,
            Token::SphereSeparator => TokenKind::SphereSeparator,
            Token::OpenBlock => TokenKind::OpenBlock,
            Token::CloseBlock => TokenKind::CloseBlock,
            Token::ChargePositive => TokenKind::ChargePositive,
            Token::ChargeNegative => TokenKind::ChargeNegative,
            Token::Delocalized => TokenKind::Delocalized,
            Token::Stereo => TokenKind::Stereo,
        }
    }

    pub fn is_atom(&self) -> bool {
        matches!(self, Token::Atom(_))
    }

    /// Whether this token may precede an atom as part of its spec.
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            Token::Double
                | Token::Triple
                | Token::Aromatic
                | Token::Ring
                | Token::ChargePositive
                | Token::ChargeNegative
                | Token::Delocalized
                | Token::Stereo
        )
    }
}

fn tokens(input: &str) -> IResult<&str, Vec<Token>> {
    fold_many0(anychar, Vec::new, |mut acc: Vec<Token>, c| {
        if let Some(token) = Token::from_char(c) {
            acc.push(token);
        }
        acc
    })(input)
}

/// Lex a raw HOSE code into a flat token sequence.
///
/// Tokenizing is lossy on purpose: database codes are noisy, so
/// unknown characters are dropped instead of rejected, and this never
/// fails.
pub fn tokenize(hose_code: &str) -> Vec<Token> {
    tokens(hose_code)
        .map(|(_, tokens)| tokens)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(tokens: &[Token]) -> Vec<&str> {
        tokens
            .iter()
            .filter_map(|t| match t {
                Token::Atom(symbol) => Some(symbol.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_tokenize_methyl() {
        let tokens = tokenize("HHHC");
        assert_eq!(tokens.len(), 4);
        assert!(tokens.iter().all(Token::is_atom));
        assert_eq!(symbols(&tokens), vec!["H", "H", "H", "C"]);
    }

    #[test]
    fn test_tokenize_bremser() {
        let tokens = tokenize("XYQ");
        assert_eq!(symbols(&tokens), vec!["Cl", "Br", "Si"]);
    }

    #[test]
    fn test_tokenize_modifiers() {
        assert_eq!(
            tokenize("=CC"),
            vec![
                Token::Double,
                Token::Atom("C".to_string()),
                Token::Atom("C".to_string())
            ]
        );
        assert_eq!(
            tokenize("*C*C"),
            vec![
                Token::Aromatic,
                Token::Atom("C".to_string()),
                Token::Aromatic,
                Token::Atom("C".to_string())
            ]
        );
        assert_eq!(
            tokenize("N+"),
            vec![Token::Atom("N".to_string()), Token::ChargePositive]
        );
        assert_eq!(tokenize("@H")[0], Token::Ring);
        assert_eq!(tokenize("%#"), vec![Token::Triple, Token::Triple]);
        assert_eq!(tokenize("|\\"), vec![Token::Stereo, Token::Stereo]);
    }

    #[test]
    fn test_tokenize_structure() {
        let kinds: Vec<TokenKind> = tokenize("C(H,C/H)").iter().map(Token::kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Atom,
                TokenKind::OpenBlock,
                TokenKind::Atom,
                TokenKind::BranchSeparator,
                TokenKind::Atom,
                TokenKind::SphereSeparator,
                TokenKind::Atom,
                TokenKind::CloseBlock,
            ]
        );
    }

    #[test]
    fn test_tokenize_drops_noise() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  abc 123 ;:!?").is_empty());
        assert_eq!(symbols(&tokenize("c C 1 Ü N")), vec!["C", "N"]);
    }
}
