//! A single regression tree from a boosted ensemble.
//!
//! Nodes are stored flat, in XGBoost's array order: node 0 is the root and
//! every child index is larger than its parent's, so traversal always
//! terminates.

use gbcmet_core::FEATURE_COUNT;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Split {
        feature: usize,
        /// XGBoost compares in single precision.
        threshold: f32,
        left: usize,
        right: usize,
        default_left: bool,
        cover: f64,
    },
    Leaf {
        value: f64,
        cover: f64,
    },
}

impl Node {
    pub fn cover(&self) -> f64 {
        match self {
            Node::Split { cover, .. } | Node::Leaf { cover, .. } => *cover,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    nodes: Vec<Node>,
    has_cover: bool,
}

impl Tree {
    /// Build a tree, checking that the node graph is well formed.
    pub fn new(nodes: Vec<Node>, has_cover: bool) -> Result<Self, String> {
        if nodes.is_empty() {
            return Err("tree has no nodes".into());
        }
        for (i, node) in nodes.iter().enumerate() {
            if let Node::Split {
                feature,
                left,
                right,
                ..
            } = node
            {
                if *feature >= FEATURE_COUNT {
                    return Err(format!(
                        "node {i} splits on feature {feature}, model has {FEATURE_COUNT}"
                    ));
                }
                for child in [*left, *right] {
                    if child <= i || child >= nodes.len() {
                        return Err(format!("node {i} has invalid child {child}"));
                    }
                }
            }
        }
        Ok(Self { nodes, has_cover })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether per-node cover (`sum_hessian`) was present in the artifact.
    pub fn has_cover(&self) -> bool {
        self.has_cover
    }

    /// Index of the child `x` descends into from split node `idx`.
    pub(crate) fn next_node(&self, idx: usize, x: &[f64; FEATURE_COUNT]) -> Option<usize> {
        match self.nodes[idx] {
            Node::Leaf { .. } => None,
            Node::Split {
                feature,
                threshold,
                left,
                right,
                default_left,
                ..
            } => {
                let v = x[feature];
                let go_left = if v.is_nan() {
                    default_left
                } else {
                    (v as f32) < threshold
                };
                Some(if go_left { left } else { right })
            }
        }
    }

    /// Leaf value reached by `x`.
    pub fn predict(&self, x: &[f64; FEATURE_COUNT]) -> f64 {
        let mut idx = 0;
        while let Some(next) = self.next_node(idx, x) {
            idx = next;
        }
        match self.nodes[idx] {
            Node::Leaf { value, .. } => value,
            Node::Split { .. } => unreachable!("traversal stops only at leaves"),
        }
    }

    /// Cover-weighted mean leaf value: the tree's output when no feature is known.
    pub fn expected_value(&self) -> f64 {
        self.node_mean(0)
    }

    pub(crate) fn node_mean(&self, idx: usize) -> f64 {
        match self.nodes[idx] {
            Node::Leaf { value, .. } => value,
            Node::Split {
                left, right, cover, ..
            } => {
                let l = self.nodes[left].cover();
                let r = self.nodes[right].cover();
                if cover > 0.0 {
                    (l * self.node_mean(left) + r * self.node_mean(right)) / cover
                } else {
                    0.5 * (self.node_mean(left) + self.node_mean(right))
                }
            }
        }
    }

    /// Multiply every leaf by `weight` (DART tree weights).
    pub(crate) fn scale_leaves(&mut self, weight: f64) {
        for node in &mut self.nodes {
            if let Node::Leaf { value, .. } = node {
                *value *= weight;
            }
        }
    }
}
