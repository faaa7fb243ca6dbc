use crate::element::{is_hydrogen, Bond};
use crate::parse::{
    parse_atom_spec, parse_sphere_block, tokenize, AtomSpec, Branch, Sphere, Token, TokenKind,
};
use crate::HoseError;
use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction::{Incoming, Outgoing};
use std::collections::VecDeque;
use std::fmt::{Display, Formatter, Result as FmtResult};
use tracing::*;

/// An atom of the tree built from a HOSE code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoseAtom {
    pub symbol: String,
    /// Bond distance from the central atom along tree edges.
    pub sphere: usize,
    pub ring: bool,
    pub charge: i8,
    pub aromatic: bool,
    /// Set only on the tail of a sphere-0 ring chain. This is a
    /// back-reference to an ancestor, never an ownership edge.
    pub ring_closure: Option<NodeIndex>,
}

impl HoseAtom {
    fn central(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            sphere: 0,
            ring: false,
            charge: 0,
            aromatic: false,
            ring_closure: None,
        }
    }

    fn from_spec(spec: &AtomSpec, sphere: usize) -> Self {
        Self {
            symbol: spec.symbol.clone(),
            sphere,
            ring: spec.ring,
            charge: spec.charge,
            aromatic: spec.aromatic,
            ring_closure: None,
        }
    }

    pub fn is_hydrogen(&self) -> bool {
        is_hydrogen(&self.symbol)
    }
}

impl Display for HoseAtom {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.ring {
            write!(f, "@")?;
        }
        if self.aromatic {
            write!(f, "*")?;
        }
        write!(f, "{}", self.symbol)?;
        match self.charge {
            c if c > 0 => write!(f, "+")?,
            c if c < 0 => write!(f, "-")?,
            _ => {}
        }
        write!(f, " ({})", self.sphere)
    }
}

/// A ring closure between an ancestor (`opener`) and a descendant
/// (`closer`). `digit` is the SMILES ring-closure number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingPair {
    pub opener: NodeIndex,
    pub closer: NodeIndex,
    pub digit: usize,
}

/// The atom tree described by a HOSE code, rooted at the central atom.
///
/// Edges point from parent to child and carry the child's incoming
/// bond. Every non-root node has exactly one incoming edge, and the
/// children of a node are ordered by insertion.
#[derive(Debug, Clone)]
pub struct HoseTree {
    graph: DiGraph<HoseAtom, Bond>,
    root: NodeIndex,
}

impl HoseTree {
    /// A tree holding only the central atom.
    pub fn new(central_atom: &str) -> Self {
        let mut graph = DiGraph::new();
        let root = graph.add_node(HoseAtom::central(central_atom));
        Self { graph, root }
    }

    /// Build the atom tree for `hose_code` around `central_atom`.
    pub fn parse(hose_code: &str, central_atom: &str) -> Self {
        Self::from_tokens(&tokenize(hose_code), central_atom)
    }

    /// Build the atom tree from an already tokenized HOSE code.
    ///
    /// The atoms before the first `(` are sphere 0. If any of them is
    /// marked as a ring atom, the non-hydrogen ones form a chain that
    /// closes back onto the central atom; otherwise they all hang off the
    /// central atom directly. The `(...)` block describes the
    /// surroundings of the last sphere-0 atom, and whatever follows it
    /// describes the others.
    pub fn from_tokens(tokens: &[Token], central_atom: &str) -> Self {
        let mut tree = Self::new(central_atom);
        let root = tree.root;

        let mut pos = 0;
        let mut sphere0 = Vec::new();
        while let Some(token) = tokens.get(pos) {
            match token {
                Token::OpenBlock => break,
                Token::SphereSeparator => {
                    pos += 1;
                    break;
                }
                _ => {
                    let (spec, next) = parse_atom_spec(tokens, pos);
                    sphere0.extend(spec);
                    pos = next.max(pos + 1);
                }
            }
        }

        if sphere0.iter().any(|spec| spec.ring) {
            let (hydrogens, chain): (Vec<&AtomSpec>, Vec<&AtomSpec>) =
                sphere0.iter().partition(|spec| spec.is_hydrogen());
            for spec in hydrogens {
                let plain = AtomSpec {
                    ring: false,
                    ..spec.clone()
                };
                tree.add_child(root, &plain);
            }
            let mut tail = root;
            for spec in chain {
                tail = tree.add_child(tail, spec);
            }
            if tail != root {
                trace!("sphere-0 ring chain closes at node {}", tail.index());
                if let Some(atom) = tree.graph.node_weight_mut(tail) {
                    atom.ring_closure = Some(root);
                }
            }
        } else {
            for spec in &sphere0 {
                tree.add_child(root, spec);
            }
        }

        let first_level = tree.children(root);

        if let Some(Token::OpenBlock) = tokens.get(pos) {
            let (inner, next) = parse_sphere_block(tokens, pos + 1, &[TokenKind::CloseBlock]);
            pos = next;
            if let Some(Token::CloseBlock) = tokens.get(pos) {
                pos += 1;
            }
            if let Some(&last) = first_level.last() {
                tree.attach_spheres(last, &inner);
            }
        }

        if pos < tokens.len() {
            let (outer, _) = parse_sphere_block(tokens, pos, &[]);
            match first_level.as_slice() {
                [] => {}
                [only] => tree.attach_spheres(*only, &outer),
                [rest @ .., _] => {
                    let targets = rest
                        .iter()
                        .copied()
                        .filter(|&node| tree.is_expandable(node))
                        .collect();
                    tree.distribute(targets, &outer);
                }
            }
        }

        debug!(
            "built HOSE tree with {} atoms around {}",
            tree.node_count(),
            central_atom
        );
        tree
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn atom(&self, node: NodeIndex) -> Option<&HoseAtom> {
        self.graph.node_weight(node)
    }

    /// The children of `node` in insertion order.
    pub fn children(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(node, Outgoing)
            .map(|edge| (edge.id(), edge.target()))
            .collect();
        edges.sort_by_key(|(id, _)| *id);
        edges.into_iter().map(|(_, child)| child).collect()
    }

    pub fn parent(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.graph.neighbors_directed(node, Incoming).next()
    }

    /// The bond from `node` to its parent; single for the root.
    pub fn bond(&self, node: NodeIndex) -> Bond {
        self.graph
            .edges_directed(node, Incoming)
            .next()
            .map(|edge| *edge.weight())
            .unwrap_or_default()
    }

    /// Whether `ancestor` lies strictly above `node`.
    pub fn is_ancestor(&self, ancestor: NodeIndex, node: NodeIndex) -> bool {
        let mut current = self.parent(node);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent(parent);
        }
        false
    }

    /// Number of nodes in each node's subtree (itself included), indexed
    /// by node index.
    pub fn subtree_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![1; self.graph.node_count()];
        // Children are always created after their parent.
        for node in (0..self.graph.node_count()).rev().map(NodeIndex::new) {
            if let Some(parent) = self.parent(node) {
                sizes[parent.index()] += sizes[node.index()];
            }
        }
        sizes
    }

    /// Collect ring closures in pre-order, numbering them from 1.
    pub fn ring_pairs(&self) -> Result<Vec<RingPair>, HoseError> {
        let mut pairs = Vec::new();
        let mut stack = vec![self.root];
        while let Some(node) = stack.pop() {
            let atom = self
                .atom(node)
                .ok_or(HoseError::MissingNode(node.index()))?;
            if let Some(opener) = atom.ring_closure {
                if !self.is_ancestor(opener, node) {
                    return Err(HoseError::RingClosureNotAncestor {
                        opener: opener.index(),
                        closer: node.index(),
                    });
                }
                pairs.push(RingPair {
                    opener,
                    closer: node,
                    digit: pairs.len() + 1,
                });
            }
            stack.extend(self.children(node).into_iter().rev());
        }
        Ok(pairs)
    }

    /// Render the tree in Graphviz DOT format.
    pub fn to_dot(&self) -> String {
        format!("{}", Dot::with_config(&self.graph, &[]))
    }

    fn add_child(&mut self, parent: NodeIndex, spec: &AtomSpec) -> NodeIndex {
        let sphere = self
            .graph
            .node_weight(parent)
            .map(|atom| atom.sphere + 1)
            .unwrap_or(1);
        let child = self.graph.add_node(HoseAtom::from_spec(spec, sphere));
        self.graph.add_edge(parent, child, spec.bond);
        child
    }

    fn is_expandable(&self, node: NodeIndex) -> bool {
        self.atom(node).is_some_and(|atom| !atom.is_hydrogen())
    }

    fn expandable_children(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.children(node)
            .into_iter()
            .filter(|&child| self.is_expandable(child))
            .collect()
    }

    /// Hang `spheres[0]` (every branch) directly under `node`, then
    /// distribute the deeper spheres over its non-hydrogen children.
    fn attach_spheres(&mut self, node: NodeIndex, spheres: &[Sphere]) {
        let Some((first, deeper)) = spheres.split_first() else {
            return;
        };
        for spec in first.iter().flatten() {
            self.add_child(node, spec);
        }
        let targets = self.expandable_children(node);
        self.distribute(targets, deeper);
    }

    /// Match each sphere's branches one-to-one with the expandable
    /// nodes of the previous level, then move on to the non-hydrogen
    /// children of those nodes. Surplus branches or nodes stay unfilled.
    fn distribute(&mut self, targets: Vec<NodeIndex>, spheres: &[Sphere]) {
        let mut frontier = targets;
        for sphere in spheres {
            if frontier.is_empty() {
                break;
            }
            if sphere.len() != frontier.len() {
                trace!(
                    "{} branches for {} expandable atoms",
                    sphere.len(),
                    frontier.len()
                );
            }
            let mut queue: VecDeque<(NodeIndex, &Branch)> =
                frontier.iter().copied().zip(sphere.iter()).collect();
            while let Some((target, branch)) = queue.pop_front() {
                for spec in branch {
                    self.add_child(target, spec);
                }
            }
            frontier = frontier
                .iter()
                .flat_map(|&node| self.expandable_children(node))
                .collect();
        }
    }
}
