//! Join tree construction for a single explore
//!
//! Joins are declared in traversal order, so the tree is an arena of nodes
//! keyed by view name: a node can only hang off a node that already exists.

use std::collections::HashMap;

/// A view placed in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinNode {
    /// View name
    pub view: String,

    /// Index of the node this view was joined from (`None` for the root)
    pub parent: Option<usize>,
}

/// Join tree rooted at an explore's primary view
#[derive(Debug, Clone)]
pub struct JoinTree {
    /// Nodes in insertion order; index 0 is the root
    nodes: Vec<JoinNode>,

    /// View name -> node index
    index: HashMap<String, usize>,
}

impl JoinTree {
    /// Create a tree holding only the root view
    pub fn new(root: impl Into<String>) -> Self {
        let root = root.into();
        let mut index = HashMap::new();
        index.insert(root.clone(), 0);

        Self {
            nodes: vec![JoinNode {
                view: root,
                parent: None,
            }],
            index,
        }
    }

    /// Whether the view has been introduced already
    pub fn contains(&self, view: &str) -> bool {
        self.index.contains_key(view)
    }

    /// Attach `view` below `parent`
    ///
    /// Returns `false` without changing the tree if `parent` is missing or
    /// `view` is already present.
    pub fn insert(&mut self, view: &str, parent: &str) -> bool {
        if self.contains(view) {
            return false;
        }

        let Some(&parent_index) = self.index.get(parent) else {
            return false;
        };

        self.index.insert(view.to_string(), self.nodes.len());
        self.nodes.push(JoinNode {
            view: view.to_string(),
            parent: Some(parent_index),
        });

        true
    }

    /// Views from `view` up to the root, inclusive
    pub fn path_to_root(&self, view: &str) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = self.index.get(view).copied();

        while let Some(i) = current {
            path.push(self.nodes[i].view.as_str());
            current = self.nodes[i].parent;
        }

        path
    }

    /// All views in traversal order, root first
    pub fn views(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.view.as_str()).collect()
    }
}
