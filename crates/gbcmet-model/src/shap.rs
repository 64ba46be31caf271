//! Exact path-dependent TreeSHAP (Lundberg et al., Algorithm 2).
//!
//! Attributions are in the tree's output space (log-odds for logistic
//! models). Per tree, `Σ phi = predict(x) - expected_value()`; summed over an
//! ensemble plus the base margin they reproduce the raw margin exactly.

use gbcmet_core::FEATURE_COUNT;

use crate::tree::{Node, Tree};

#[derive(Debug, Clone, Copy)]
struct PathElement {
    feature: Option<usize>,
    zero_fraction: f64,
    one_fraction: f64,
    pweight: f64,
}

/// Add this tree's attributions for `x` into `phi`.
pub fn tree_shap(tree: &Tree, x: &[f64; FEATURE_COUNT], phi: &mut [f64; FEATURE_COUNT]) {
    recurse(tree, x, phi, 0, Vec::new(), 1.0, 1.0, None);
}

#[allow(clippy::too_many_arguments)]
fn recurse(
    tree: &Tree,
    x: &[f64; FEATURE_COUNT],
    phi: &mut [f64; FEATURE_COUNT],
    idx: usize,
    mut path: Vec<PathElement>,
    zero_fraction: f64,
    one_fraction: f64,
    feature: Option<usize>,
) {
    extend_path(&mut path, zero_fraction, one_fraction, feature);
    let depth = path.len() - 1;

    match tree.nodes()[idx] {
        Node::Leaf { value, .. } => {
            for i in 1..=depth {
                let w = unwound_path_sum(&path, depth, i);
                let el = path[i];
                if let Some(f) = el.feature {
                    phi[f] += w * (el.one_fraction - el.zero_fraction) * value;
                }
            }
        }
        Node::Split {
            feature: split,
            left,
            right,
            cover,
            ..
        } => {
            let hot = tree.next_node(idx, x).unwrap_or(left);
            let cold = if hot == left { right } else { left };
            let hot_zero_fraction = tree.nodes()[hot].cover() / cover;
            let cold_zero_fraction = tree.nodes()[cold].cover() / cover;

            // A feature already on the path is undone and re-split here.
            let mut incoming_zero = 1.0;
            let mut incoming_one = 1.0;
            if let Some(k) = (1..=depth).find(|&k| path[k].feature == Some(split)) {
                incoming_zero = path[k].zero_fraction;
                incoming_one = path[k].one_fraction;
                unwind_path(&mut path, depth, k);
                path.pop();
            }

            recurse(
                tree,
                x,
                phi,
                hot,
                path.clone(),
                hot_zero_fraction * incoming_zero,
                incoming_one,
                Some(split),
            );
            recurse(
                tree,
                x,
                phi,
                cold,
                path,
                cold_zero_fraction * incoming_zero,
                0.0,
                Some(split),
            );
        }
    }
}

fn extend_path(
    path: &mut Vec<PathElement>,
    zero_fraction: f64,
    one_fraction: f64,
    feature: Option<usize>,
) {
    let d = path.len();
    path.push(PathElement {
        feature,
        zero_fraction,
        one_fraction,
        pweight: if d == 0 { 1.0 } else { 0.0 },
    });
    for i in (0..d).rev() {
        path[i + 1].pweight += one_fraction * path[i].pweight * (i + 1) as f64 / (d + 1) as f64;
        path[i].pweight = zero_fraction * path[i].pweight * (d - i) as f64 / (d + 1) as f64;
    }
}

fn unwind_path(path: &mut [PathElement], depth: usize, path_index: usize) {
    let one_fraction = path[path_index].one_fraction;
    let zero_fraction = path[path_index].zero_fraction;
    let mut next_one_portion = path[depth].pweight;

    for i in (0..depth).rev() {
        if one_fraction != 0.0 {
            let tmp = path[i].pweight;
            path[i].pweight =
                next_one_portion * (depth + 1) as f64 / ((i + 1) as f64 * one_fraction);
            next_one_portion =
                tmp - path[i].pweight * zero_fraction * (depth - i) as f64 / (depth + 1) as f64;
        } else {
            path[i].pweight =
                path[i].pweight * (depth + 1) as f64 / (zero_fraction * (depth - i) as f64);
        }
    }

    for i in path_index..depth {
        path[i].feature = path[i + 1].feature;
        path[i].zero_fraction = path[i + 1].zero_fraction;
        path[i].one_fraction = path[i + 1].one_fraction;
    }
}

/// Total permutation weight of the path with element `path_index` removed.
fn unwound_path_sum(path: &[PathElement], depth: usize, path_index: usize) -> f64 {
    let one_fraction = path[path_index].one_fraction;
    let zero_fraction = path[path_index].zero_fraction;
    let mut next_one_portion = path[depth].pweight;
    let mut total = 0.0;

    for i in (0..depth).rev() {
        if one_fraction != 0.0 {
            let tmp = next_one_portion * (depth + 1) as f64 / ((i + 1) as f64 * one_fraction);
            total += tmp;
            next_one_portion =
                path[i].pweight - tmp * zero_fraction * (depth - i) as f64 / (depth + 1) as f64;
        } else if zero_fraction != 0.0 {
            total += path[i].pweight / zero_fraction / ((depth - i) as f64 / (depth + 1) as f64);
        }
    }
    total
}
