use crate::element::{is_aromatic_capable, is_organic_subset};
use crate::tree::{HoseAtom, HoseTree, RingPair};
use crate::HoseError;
use petgraph::graph::NodeIndex;
use std::collections::BTreeMap;

/// Formats a ring closure digit according to SMILES rules.
fn format_ring(digit: usize) -> String {
    if digit < 10 {
        digit.to_string()
    } else {
        format!("%{}", digit)
    }
}

/// The SMILES text of a single atom: lowercase when aromatic, bracketed
/// when charged or outside the organic subset.
pub fn atom_smiles(atom: &HoseAtom) -> String {
    let symbol = if atom.aromatic && is_aromatic_capable(&atom.symbol) {
        atom.symbol.to_ascii_lowercase()
    } else {
        atom.symbol.clone()
    };

    if atom.charge == 0 && is_organic_subset(&symbol) {
        return symbol;
    }
    let sign = match atom.charge {
        c if c > 0 => "+",
        c if c < 0 => "-",
        _ => "",
    };
    format!("[{symbol}{sign}]")
}

/// A hydrogen that carries nothing a reader could not infer.
fn is_implicit_hydrogen(tree: &HoseTree, node: NodeIndex, atom: &HoseAtom) -> bool {
    atom.is_hydrogen() && atom.charge == 0 && tree.children(node).is_empty()
}

/// One pending piece of output.
enum Step {
    Atom(NodeIndex),
    Text(&'static str),
}

struct Writer<'a> {
    tree: &'a HoseTree,
    sizes: Vec<usize>,
    /// Ring digits opening at each ancestor.
    opens: BTreeMap<NodeIndex, Vec<usize>>,
    /// The ring digit closing at each descendant.
    closes: BTreeMap<NodeIndex, usize>,
}

impl Writer<'_> {
    fn atom(&self, node: NodeIndex) -> Result<&HoseAtom, HoseError> {
        self.tree
            .atom(node)
            .ok_or(HoseError::MissingNode(node.index()))
    }

    /// Write the subtree under `root` depth first. Pending steps live on
    /// an explicit stack, so the depth of the tree never touches the
    /// call stack.
    fn write(&self, root: NodeIndex, out: &mut String) -> Result<(), HoseError> {
        let mut stack = vec![Step::Atom(root)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Text(text) => out.push_str(text),
                Step::Atom(node) => self.write_atom(node, out, &mut stack)?,
            }
        }
        Ok(())
    }

    /// Emit `node` itself and push its children, last-emitted first.
    fn write_atom(
        &self,
        node: NodeIndex,
        out: &mut String,
        stack: &mut Vec<Step>,
    ) -> Result<(), HoseError> {
        out.push_str(&atom_smiles(self.atom(node)?));

        if let Some(&digit) = self.closes.get(&node) {
            out.push_str(&format_ring(digit));
            return Ok(());
        }
        for &digit in self.opens.get(&node).into_iter().flatten() {
            out.push_str(&format_ring(digit));
        }

        let mut children = Vec::new();
        for child in self.tree.children(node) {
            if !is_implicit_hydrogen(self.tree, child, self.atom(child)?) {
                children.push(child);
            }
        }

        // The heaviest child continues the main chain; the first one wins a tie.
        let mut main = None;
        for &child in &children {
            let size = self.sizes.get(child.index()).copied().unwrap_or(1);
            if main.map_or(true, |(_, best)| size > best) {
                main = Some((child, size));
            }
        }
        let Some((main, _)) = main else {
            return Ok(());
        };

        stack.push(Step::Atom(main));
        stack.push(Step::Text(self.tree.bond(main).smiles_symbol()));
        for &child in children.iter().rev().filter(|&&child| child != main) {
            stack.push(Step::Text(")"));
            stack.push(Step::Atom(child));
            stack.push(Step::Text(self.tree.bond(child).smiles_symbol()));
            stack.push(Step::Text("("));
        }
        Ok(())
    }
}

/// Serialize an atom tree to a SMILES fragment, depth first from the
/// central atom.
///
/// # Arguments
///
/// * `tree` - The atom tree to serialize.
/// * `ring_pairs` - Ring closures of the tree, as returned by [`HoseTree::ring_pairs`].
///
/// # Returns
///
/// * `Result<String, HoseError>` - The SMILES string, or the internal fault that stopped it.
pub fn tree_to_smiles(tree: &HoseTree, ring_pairs: &[RingPair]) -> Result<String, HoseError> {
    let mut opens: BTreeMap<NodeIndex, Vec<usize>> = BTreeMap::new();
    let mut closes = BTreeMap::new();
    for pair in ring_pairs {
        opens.entry(pair.opener).or_default().push(pair.digit);
        closes.insert(pair.closer, pair.digit);
    }

    let writer = Writer {
        tree,
        sizes: tree.subtree_sizes(),
        opens,
        closes,
    };
    let mut out = String::new();
    writer.write(tree.root(), &mut out)?;
    Ok(out)
}
