//! Tree-structured inputs for hierarchical reduction.
//!
//! A [`Node`] tree describes the parsed shape of a candidate: leaf
//! tokens carry text, branches group them, and each node records
//! whether the grammar permits removing it. [`TreeModel`] flattens a
//! node tree into an [`Input`] whose atoms are the removable nodes, so
//! sequence reducers can probe prunings of the tree through the same
//! subset interface as flat inputs.

use std::collections::HashMap;

use crate::input::{Hierarchy, Input};
use crate::subset::Subset;

/// One node of a parse tree.
///
/// The yield of a tree is the pre-order concatenation of its tokens.
/// Pruning a removable node drops its whole subtree from the yield; if
/// the node carries a placeholder, the placeholder text is emitted in
/// its place so grammars with mandatory slots stay well-formed.
#[derive(Debug, Clone)]
pub struct Node {
    token: Option<String>,
    placeholder: Option<String>,
    removable: bool,
    children: Vec<Node>,
}

impl Node {
    /// A removable leaf carrying `text`.
    pub fn token(text: &str) -> Self {
        Self {
            token: Some(text.to_string()),
            placeholder: None,
            removable: true,
            children: Vec::new(),
        }
    }

    /// A removable branch over `children`.
    pub fn branch(children: Vec<Node>) -> Self {
        Self {
            token: None,
            placeholder: None,
            removable: true,
            children,
        }
    }

    /// Mark this node as required by the grammar; it is never offered
    /// for removal.
    pub fn required(mut self) -> Self {
        self.removable = false;
        self
    }

    /// Emit `text` instead of nothing when this node is pruned.
    pub fn with_placeholder(mut self, text: &str) -> Self {
        self.placeholder = Some(text.to_string());
        self
    }
}

struct FlatNode {
    token: Option<String>,
    placeholder: Option<String>,
    removable: bool,
    level: usize,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// An [`Input`] view over a [`Node`] tree.
///
/// Atoms are the removable nodes in (level, document-order) order.
/// Materialization assembles the yield of the tree with every
/// unselected removable node pruned; the committed tree is never
/// mutated by trial candidates.
pub struct TreeModel {
    flat: Vec<FlatNode>,
    atoms: Vec<usize>,
    atom_of_node: HashMap<usize, usize>,
    level_count: usize,
}

impl TreeModel {
    /// Flatten a node tree into a reducible model.
    pub fn new(root: &Node) -> Self {
        let mut flat = Vec::new();
        Self::flatten(root, None, 0, &mut flat);

        let mut atoms: Vec<usize> = (0..flat.len()).filter(|&id| flat[id].removable).collect();
        atoms.sort_by_key(|&id| (flat[id].level, id));

        let atom_of_node: HashMap<usize, usize> =
            atoms.iter().enumerate().map(|(pos, &id)| (id, pos)).collect();

        let level_count = atoms
            .iter()
            .map(|&id| flat[id].level + 1)
            .max()
            .unwrap_or(0);

        Self {
            flat,
            atoms,
            atom_of_node,
            level_count,
        }
    }

    fn flatten(node: &Node, parent: Option<usize>, level: usize, flat: &mut Vec<FlatNode>) {
        let id = flat.len();
        flat.push(FlatNode {
            token: node.token.clone(),
            placeholder: node.placeholder.clone(),
            removable: node.removable,
            level,
            parent,
            children: Vec::new(),
        });
        for child in &node.children {
            let child_id = flat.len();
            flat[id].children.push(child_id);
            Self::flatten(child, Some(id), level + 1, flat);
        }
    }

    /// The yield of the whole tree with nothing pruned.
    pub fn full_yield(&self) -> String {
        self.materialize(&Subset::full(self.atoms.len()))
    }

    fn emit(&self, id: usize, subset: &Subset, out: &mut String) {
        let node = &self.flat[id];
        if node.removable {
            let pos = self.atom_of_node[&id];
            if !subset.contains(pos) {
                if let Some(p) = &node.placeholder {
                    out.push_str(p);
                }
                return;
            }
        }
        if let Some(t) = &node.token {
            out.push_str(t);
        }
        for &child in &node.children {
            self.emit(child, subset, out);
        }
    }
}

impl Input for TreeModel {
    type Atom = usize;
    type Rendered = String;

    fn len(&self) -> usize {
        self.atoms.len()
    }

    /// The node ids of the removable nodes, in atom order.
    fn atoms(&self) -> &[usize] {
        &self.atoms
    }

    fn materialize(&self, subset: &Subset) -> String {
        let mut out = String::new();
        if !self.flat.is_empty() {
            self.emit(0, subset, &mut out);
        }
        out
    }

    fn hierarchy(&self) -> Option<&dyn Hierarchy> {
        Some(self)
    }
}

impl Hierarchy for TreeModel {
    fn level_count(&self) -> usize {
        self.level_count
    }

    fn level_atoms(&self, level: usize) -> Vec<usize> {
        self.atoms
            .iter()
            .enumerate()
            .filter(|&(_, &id)| self.flat[id].level == level)
            .map(|(pos, _)| pos)
            .collect()
    }

    fn parent_atom(&self, atom: usize) -> Option<usize> {
        let mut cursor = self.flat[self.atoms[atom]].parent;
        while let Some(id) = cursor {
            if let Some(&pos) = self.atom_of_node.get(&id) {
                return Some(pos);
            }
            cursor = self.flat[id].parent;
        }
        None
    }
}
