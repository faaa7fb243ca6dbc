use super::{parse_atom_spec, AtomSpec, Token, TokenKind};

/// The atoms of one branch, in order.
pub type Branch = Vec<AtomSpec>;
/// The branches of one sphere, in order.
pub type Sphere = Vec<Branch>;

/// Parse `,`-separated branches and `/`-separated spheres starting at
/// `pos`, stopping at the first token whose kind is in `terminators`
/// (left unconsumed) or at the end of the stream.
///
/// Empty branches and dangling separators are kept as empty branches;
/// only the final open branch and sphere are dropped when empty.
/// A token that cannot start an atom spec here is skipped.
pub fn parse_sphere_block(
    tokens: &[Token],
    mut pos: usize,
    terminators: &[TokenKind],
) -> (Vec<Sphere>, usize) {
    let mut spheres = Vec::new();
    let mut sphere = Sphere::new();
    let mut branch = Branch::new();

    while let Some(token) = tokens.get(pos) {
        if terminators.contains(&token.kind()) {
            break;
        }
        match token {
            Token::SphereSeparator => {
                sphere.push(std::mem::take(&mut branch));
                spheres.push(std::mem::take(&mut sphere));
                pos += 1;
            }
            Token::BranchSeparator => {
                sphere.push(std::mem::take(&mut branch));
                pos += 1;
            }
            _ => {
                let (spec, next) = parse_atom_spec(tokens, pos);
                if let Some(spec) = spec {
                    branch.push(spec);
                }
                // Stray structural tokens (an unexpected `(` or `)`) are skipped.
                pos = next.max(pos + 1);
            }
        }
    }

    if !branch.is_empty() {
        sphere.push(branch);
    }
    if !sphere.is_empty() {
        spheres.push(sphere);
    }
    (spheres, pos)
}
