//! Uniform models over reducible inputs.
//!
//! An [`Input`] owns a decoded, immutable sequence of atoms and knows
//! how to materialize any [`Subset`] of them into the external
//! representation the oracle consumes. Reducers stay generic over the
//! model: they see a length, probe subsets, and never look at the
//! atoms themselves.

use std::fs;
use std::io;
use std::path::Path;

use crate::subset::{Fingerprint, Subset};

/// Atom granularity for string and file inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// One atom per byte.
    Bytes,
    /// One atom per character.
    Chars,
    /// One atom per line, line terminators included.
    Lines,
}

/// A reducible input: an immutable ordered sequence of atoms.
///
/// `materialize` must be pure and deterministic; the model is frozen
/// after construction and reducers only ever hand it index sets.
pub trait Input {
    /// The atom type exposed by [`Input::atoms`].
    type Atom;
    /// What the oracle sees: the assembled external representation.
    type Rendered;

    /// Number of atoms.
    fn len(&self) -> usize;

    /// Whether the input has no atoms.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read-only view of the atom sequence.
    fn atoms(&self) -> &[Self::Atom];

    /// Assemble the external representation of `subset`, preserving
    /// atom order.
    fn materialize(&self, subset: &Subset) -> Self::Rendered;

    /// Cache identity of `subset` within this model.
    ///
    /// Must distinguish any two subsets with different materializations
    /// and be stable across invocations. The default, the sorted index
    /// set itself, satisfies both.
    fn fingerprint(&self, subset: &Subset) -> Fingerprint {
        subset.fingerprint()
    }

    /// Level structure, for inputs that have one.
    ///
    /// Sequence models are flat and return `None`; tree models expose
    /// their levels so hierarchical reduction can walk them.
    fn hierarchy(&self) -> Option<&dyn Hierarchy> {
        None
    }
}

/// Level structure of a hierarchical input, root at level 0.
///
/// Atom positions returned here are indices into the same space that
/// [`Input::materialize`] consumes, so a per-level reduction can be
/// expressed as ordinary subset probes against the full model.
pub trait Hierarchy {
    /// Number of levels that contain at least one atom.
    fn level_count(&self) -> usize;

    /// Atom positions at `level`, ascending.
    fn level_atoms(&self, level: usize) -> Vec<usize>;

    /// The nearest ancestor of `atom` that is itself an atom, if any.
    ///
    /// Pruning that ancestor removes the whole subtree, `atom`
    /// included.
    fn parent_atom(&self, atom: usize) -> Option<usize>;
}

/// A string input split into owned token atoms.
#[derive(Debug, Clone)]
pub struct StringInput {
    atoms: Vec<String>,
}

impl StringInput {
    /// One atom per character.
    pub fn chars(text: &str) -> Self {
        Self {
            atoms: text.chars().map(String::from).collect(),
        }
    }

    /// One atom per line, keeping line terminators so materialization
    /// reproduces the original bytes.
    pub fn lines(text: &str) -> Self {
        Self {
            atoms: text.split_inclusive('\n').map(String::from).collect(),
        }
    }

    /// Atoms produced by a caller-supplied tokenizer.
    ///
    /// The concatenation of the tokens should reproduce the text the
    /// oracle expects; the model does not re-insert separators.
    pub fn tokens<F>(text: &str, tokenizer: F) -> Self
    where
        F: FnOnce(&str) -> Vec<String>,
    {
        Self {
            atoms: tokenizer(text),
        }
    }

    /// Read a file once and split it at the given granularity.
    ///
    /// The file is never re-read during reduction. `Granularity::Bytes`
    /// is rejected here; use [`BytesInput::from_path`] for binary data.
    pub fn from_path<P: AsRef<Path>>(path: P, granularity: Granularity) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        match granularity {
            Granularity::Chars => Ok(Self::chars(&text)),
            Granularity::Lines => Ok(Self::lines(&text)),
            Granularity::Bytes => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "byte granularity requires a BytesInput",
            )),
        }
    }
}

impl Input for StringInput {
    type Atom = String;
    type Rendered = String;

    fn len(&self) -> usize {
        self.atoms.len()
    }

    fn atoms(&self) -> &[String] {
        &self.atoms
    }

    fn materialize(&self, subset: &Subset) -> String {
        subset.iter().map(|i| self.atoms[i].as_str()).collect()
    }
}

/// A binary input with one atom per byte.
#[derive(Debug, Clone)]
pub struct BytesInput {
    atoms: Vec<u8>,
}

impl BytesInput {
    /// Wrap an in-memory byte buffer.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { atoms: bytes }
    }

    /// Read a file once into the atom buffer.
    pub fn from_path<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self::new(fs::read(path)?))
    }
}

impl Input for BytesInput {
    type Atom = u8;
    type Rendered = Vec<u8>;

    fn len(&self) -> usize {
        self.atoms.len()
    }

    fn atoms(&self) -> &[u8] {
        &self.atoms
    }

    fn materialize(&self, subset: &Subset) -> Vec<u8> {
        subset.iter().map(|i| self.atoms[i]).collect()
    }
}

/// A list input over arbitrary cloneable items.
#[derive(Debug, Clone)]
pub struct ListInput<T> {
    atoms: Vec<T>,
}

impl<T: Clone> ListInput<T> {
    /// Wrap an in-memory list of items.
    pub fn new(items: Vec<T>) -> Self {
        Self { atoms: items }
    }
}

impl<T: Clone> Input for ListInput<T> {
    type Atom = T;
    type Rendered = Vec<T>;

    fn len(&self) -> usize {
        self.atoms.len()
    }

    fn atoms(&self) -> &[T] {
        &self.atoms
    }

    fn materialize(&self, subset: &Subset) -> Vec<T> {
        subset.iter().map(|i| self.atoms[i].clone()).collect()
    }
}
