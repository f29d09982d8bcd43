// Copyright 2025 the arbor developers.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! A generic trie keyed by domain name labels.
//!
//! The [`NameTree`] mirrors the DNS tree: each node is reached by one
//! label, children are indexed case-insensitively, and a `*` child
//! participates as a fallback when no exact child matches, per the
//! wildcard rules of [RFC 1034 § 4.3.2] (clarified by [RFC 4592]).
//! Lookups walk a name's labels from the TLD towards the leaf and
//! return the deepest node reached — the closest enclosing node — so
//! callers can distinguish an exact hit from the nearest ancestor.
//!
//! [RFC 1034 § 4.3.2]: https://datatracker.ietf.org/doc/html/rfc1034#section-4.3.2
//! [RFC 4592]: https://datatracker.ietf.org/doc/html/rfc4592

use std::collections::HashMap;
use std::fmt;

use crate::name::{self, Label, LabelBuf, Name};

////////////////////////////////////////////////////////////////////////
// NAME TREES                                                         //
////////////////////////////////////////////////////////////////////////

/// The key identifying a [`NameTree`] node.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKey {
    /// The sentinel root of a free-standing tree.
    Root,

    /// The root of a tree anchored at a zone origin. Lookups through
    /// [`NameTree::find_with_context`] are scoped to the labels below
    /// this origin.
    Namespace(Name),

    /// A single label under the parent node.
    Label(LabelBuf),
}

/// A tree keyed by domain name labels, carrying an optional value of
/// type `T` at each node.
///
/// Values are dropped with their nodes; a value shared with the
/// outside world should be stored behind a shared-ownership pointer by
/// the caller.
#[derive(PartialEq)]
pub struct NameTree<T> {
    key: NodeKey,
    value: Option<T>,
    children: HashMap<LabelBuf, NameTree<T>>,
}

impl<T> NameTree<T> {
    /// Creates a free-standing tree with a [`NodeKey::Root`] sentinel
    /// root and no value.
    pub fn new_root() -> Self {
        Self {
            key: NodeKey::Root,
            value: None,
            children: HashMap::new(),
        }
    }

    /// Creates a tree anchored at the zone origin `origin`.
    pub fn new_namespace(origin: Name) -> Self {
        Self {
            key: NodeKey::Namespace(origin),
            value: None,
            children: HashMap::new(),
        }
    }

    /// Returns this node's key.
    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    /// Returns this node's value, if any.
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Returns this node's value, inserting the result of `f` first if
    /// the node has none.
    pub fn value_or_insert_with(&mut self, f: impl FnOnce() -> T) -> &mut T {
        self.value.get_or_insert_with(f)
    }

    /// Returns the child under the given label, not considering the
    /// wildcard fallback.
    pub fn child(&self, label: &Label) -> Option<&NameTree<T>> {
        self.children.get(label)
    }

    /// Inserts or finds the child of `self` under `label`, optionally
    /// attaching a value:
    ///
    /// * if no child exists under `label`, a new node is created with
    ///   the given value (which may be absent);
    /// * if a child exists without a value and a value is provided, the
    ///   value is attached (the branch node becomes a leaf);
    /// * if a child exists *with* a value and a value is provided, this
    ///   fails with [`Error::DuplicateValue`]; and
    /// * otherwise the existing child is returned unchanged.
    ///
    /// The child map is keyed case-insensitively, and `*` is a literal
    /// key like any other.
    pub fn add_child(&mut self, label: &Label, value: Option<T>) -> Result<&mut NameTree<T>, Error> {
        let node = self
            .children
            .entry(label.to_owned())
            .or_insert_with_key(|key| NameTree {
                key: NodeKey::Label(key.clone()),
                value: None,
                children: HashMap::new(),
            });
        if let Some(value) = value {
            if node.value.is_some() {
                return Err(Error::DuplicateValue);
            }
            node.value = Some(value);
        }
        Ok(node)
    }

    /// Walks the tree along the labels of `name` (TLD towards leaf)
    /// and returns the deepest node reached.
    ///
    /// At each step, an exact child match is taken if one exists;
    /// otherwise a `*` child is taken; otherwise the walk stops. The
    /// returned node may have no value, in which case it is the
    /// closest enclosing node for `name` rather than an exact answer.
    pub fn find(&self, name: &Name) -> &NameTree<T> {
        self.walk(name.labels().rev()).0
    }

    /// Like [`NameTree::find`], but scopes the walk to the labels of
    /// `name` below `origin` (see [`Name::labels_below`]). When `name`
    /// equals `origin`, the walk is empty and `self` is returned.
    /// Fails if `name` is not a subdomain of `origin`.
    pub fn find_with_context(
        &self,
        name: &Name,
        origin: &Name,
    ) -> Result<&NameTree<T>, name::Error> {
        match name.labels_below(origin)? {
            None => Ok(self),
            Some(labels) => Ok(self.walk(labels).0),
        }
    }

    /// The walk underlying [`NameTree::find`]. Returns the deepest
    /// node reached and whether every label was consumed (i.e.,
    /// whether the returned node corresponds to the full name rather
    /// than a proper ancestor).
    pub(crate) fn walk<'s, 'l>(
        &'s self,
        labels: impl Iterator<Item = &'l Label>,
    ) -> (&'s NameTree<T>, bool) {
        let mut node = self;
        for label in labels {
            match node
                .children
                .get(label)
                .or_else(|| node.children.get(Label::asterisk()))
            {
                Some(child) => node = child,
                None => return (node, false),
            }
        }
        (node, true)
    }
}

impl<T: fmt::Debug> fmt::Debug for NameTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("NameTree")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("children", &self.children)
            .finish()
    }
}

////////////////////////////////////////////////////////////////////////
// ERRORS                                                             //
////////////////////////////////////////////////////////////////////////

/// An error produced when modifying a [`NameTree`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Error {
    /// A value was provided for a node that already has one.
    DuplicateValue,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::DuplicateValue => f.write_str("node already has a value"),
        }
    }
}

impl std::error::Error for Error {}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn label(octets: &[u8]) -> &Label {
        octets.try_into().unwrap()
    }

    /// Builds the tree root → com(1) → { example(100), *(99) }.
    fn sample_tree() -> NameTree<u32> {
        let mut tree = NameTree::new_root();
        let com = tree.add_child(label(b"com"), Some(1)).unwrap();
        com.add_child(label(b"example"), Some(100)).unwrap();
        com.add_child(label(b"*"), Some(99)).unwrap();
        tree
    }

    #[test]
    fn find_prefers_exact_over_wildcard() {
        let tree = sample_tree();
        let node = tree.find(&"example.com.".parse().unwrap());
        assert_eq!(node.value(), Some(&100));
        assert!(matches!(node.key(), NodeKey::Label(l) if l.octets() == b"example"));
    }

    #[test]
    fn find_falls_back_to_wildcard() {
        let tree = sample_tree();
        let node = tree.find(&"other.com.".parse().unwrap());
        assert_eq!(node.value(), Some(&99));
        assert!(matches!(node.key(), NodeKey::Label(l) if l.is_asterisk()));
    }

    #[test]
    fn find_stops_at_closest_enclosing_node() {
        let tree = sample_tree();
        let node = tree.find(&"org.".parse().unwrap());
        assert!(node.value().is_none());
        assert!(matches!(node.key(), NodeKey::Root));

        // Nothing exists below example.com, so the wildcard is not
        // consulted there (it is a sibling, not a descendant).
        let node = tree.find(&"deep.example.com.".parse().unwrap());
        assert_eq!(node.value(), Some(&100));
    }

    #[test]
    fn find_matches_case_insensitively() {
        let tree = sample_tree();
        let node = tree.find(&"EXAMPLE.COM.".parse().unwrap());
        assert_eq!(node.value(), Some(&100));
    }

    #[test]
    fn wildcard_nodes_may_have_children() {
        let mut tree = NameTree::new_root();
        tree.add_child(label(b"com"), None)
            .unwrap()
            .add_child(label(b"*"), None)
            .unwrap()
            .add_child(label(b"www"), Some(7))
            .unwrap();
        let node = tree.find(&"www.anything.com.".parse().unwrap());
        assert_eq!(node.value(), Some(&7));
    }

    #[test]
    fn add_child_attaches_value_to_branch_node() {
        let mut tree = NameTree::new_root();
        tree.add_child(label(b"com"), None).unwrap();
        assert!(tree.child(label(b"com")).unwrap().value().is_none());
        tree.add_child(label(b"com"), Some(5)).unwrap();
        assert_eq!(tree.child(label(b"com")).unwrap().value(), Some(&5));
    }

    #[test]
    fn add_child_rejects_duplicate_values() {
        let mut tree = NameTree::new_root();
        tree.add_child(label(b"com"), Some(1)).unwrap();
        assert_eq!(
            tree.add_child(label(b"com"), Some(2)).unwrap_err(),
            Error::DuplicateValue
        );
        // The original value is untouched, and valueless re-insertion
        // still finds the node.
        let node = tree.add_child(label(b"com"), None).unwrap();
        assert_eq!(node.value(), Some(&1));
    }

    #[test]
    fn add_then_find_returns_the_value() {
        let mut tree = NameTree::new_root();
        tree.add_child(label(b"test"), Some(42)).unwrap();
        let node = tree.find(&"test.".parse().unwrap());
        assert_eq!(node.value(), Some(&42));
    }

    #[test]
    fn find_with_context_scopes_the_walk() {
        let origin: Name = "example.com.".parse().unwrap();
        let mut tree = NameTree::new_namespace(origin.clone());
        tree.add_child(label(b"www"), Some(1)).unwrap();

        let node = tree
            .find_with_context(&"www.example.com.".parse().unwrap(), &origin)
            .unwrap();
        assert_eq!(node.value(), Some(&1));

        // The apex resolves to the namespace root itself.
        let node = tree.find_with_context(&origin, &origin).unwrap();
        assert!(matches!(node.key(), NodeKey::Namespace(n) if *n == origin));

        assert_eq!(
            tree.find_with_context(&"www.other.com.".parse().unwrap(), &origin),
            Err(name::Error::NotASubdomain)
        );
    }

    #[test]
    fn walk_reports_whether_all_labels_matched() {
        let tree = sample_tree();
        let name: Name = "a.b.example.com.".parse().unwrap();
        let (_, complete) = tree.walk(name.labels().rev());
        assert!(!complete);
        let name: Name = "example.com.".parse().unwrap();
        let (_, complete) = tree.walk(name.labels().rev());
        assert!(complete);
    }
}
