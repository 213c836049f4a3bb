// Copyright 2026 the Kvadraturo Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adaptive Romberg integration on a binary tree of intervals.

use alloc::vec::Vec;
use core::fmt;

use crate::error::check_bounds;
use crate::romberg::{is_romberg_len, romberg_samples};
use crate::{Error, EstimateStatus, NumericEstimate, Precision, Result};

/// Default maximum number of samples held by one leaf.
pub const DEFAULT_LEAF_SIZE: usize = 33;

/// Number of samples taken when a leaf is first visited.
pub const MIN_LEAF_SIZE: usize = 5;

/// Index of a node in a [`RombergTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Clone, Debug)]
struct Node {
    lo: f64,
    hi: f64,
    parent: Option<NodeId>,
    children: Option<(NodeId, NodeId)>,
    /// Samples at `lo + (hi - lo) * i / (n - 1)`; only ever set on leaves.
    ys: Option<Vec<f64>>,
    estimate: NumericEstimate,
    /// Most efficient leaf of this subtree.
    best_leaf: NodeId,
    /// Efficiency of `best_leaf`.
    efficiency: f64,
    exhausted: bool,
}

impl Node {
    fn leaf(lo: f64, hi: f64, parent: Option<NodeId>, id: NodeId) -> Self {
        Node {
            lo,
            hi,
            parent,
            children: None,
            ys: None,
            estimate: NumericEstimate::unknown(),
            best_leaf: id,
            efficiency: f64::INFINITY,
            exhausted: false,
        }
    }

    fn sample_cnt(&self) -> usize {
        self.ys.as_ref().map_or(0, Vec::len)
    }
}

/// Position of sample `i` of `last + 1` evenly spaced samples on `lo..=hi`.
#[inline]
pub(crate) fn sample_x(lo: f64, hi: f64, i: usize, last: usize) -> f64 {
    lo + (hi - lo) * (i as f64 / last as f64)
}

/// The midpoints between `old_last + 1` evenly spaced samples on `lo..=hi`.
///
/// `None` if some midpoint does not fall strictly between its neighbors in
/// floating point.
fn midpoints(lo: f64, hi: f64, old_last: usize) -> Option<Vec<f64>> {
    let last = 2 * old_last;
    let mut xs = Vec::with_capacity(old_last);
    let mut prev = lo;
    for i in 0..old_last {
        let x = sample_x(lo, hi, 2 * i + 1, last);
        let next = sample_x(lo, hi, 2 * i + 2, last);
        if !(x > prev && x < next) {
            return None;
        }
        xs.push(x);
        prev = next;
    }
    Some(xs)
}

/// Integral estimate of a leaf from its samples.
fn leaf_estimate(ys: &[f64], width: f64) -> NumericEstimate {
    romberg_samples(ys, width).unwrap_or_else(|_| NumericEstimate::unknown())
}

/// Expected error reduction per sample spent on a leaf.
fn leaf_efficiency(node: &Node) -> f64 {
    if node.exhausted {
        return 0.0;
    }
    match &node.ys {
        None => f64::INFINITY,
        Some(ys) => {
            let e = node.estimate.width() / ys.len() as f64;
            if e.is_nan() {
                0.0
            } else {
                e
            }
        }
    }
}

/// An adaptively refined integral of `f` over a growing domain.
///
/// The domain is split into a binary tree of intervals. Every leaf holds up
/// to `max_leaf_size` evenly spaced samples and a Romberg estimate of its
/// integral; every internal node holds the sum of its children's estimates.
/// Each node also caches the leaf of its subtree that promises the largest
/// error reduction per sample, so that [`refine`](Self::refine) finds the
/// globally best leaf in time proportional to the depth of the tree.
///
/// # Examples
///
/// ```
/// use kvadraturo::{Precision, RombergTree};
///
/// let mut tree = RombergTree::new(|x: f64| x.cos(), 0.0, 1.0).unwrap();
/// let est = tree.integral(&Precision::default()).unwrap();
/// assert!(est.is_ok());
/// assert!((est.value - 1f64.sin()).abs() < 1e-9);
/// ```
pub struct RombergTree<F> {
    f: F,
    nodes: Vec<Node>,
    root: NodeId,
    max_leaf_size: usize,
    sample_cnt: usize,
}

impl<F> fmt::Debug for RombergTree<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RombergTree")
            .field("lo", &self.lo())
            .field("hi", &self.hi())
            .field("nodes", &self.nodes.len())
            .field("max_leaf_size", &self.max_leaf_size)
            .field("sample_cnt", &self.sample_cnt)
            .field("estimate", &self.estimate())
            .finish()
    }
}

/// A read-only view of one node of a [`RombergTree`].
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    id: NodeId,
    node: &'a Node,
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("lo", &self.node.lo)
            .field("hi", &self.node.hi)
            .field("samples", &self.node.sample_cnt())
            .field("estimate", &self.node.estimate)
            .field("exhausted", &self.node.exhausted)
            .finish_non_exhaustive()
    }
}

impl<'a> NodeRef<'a> {
    /// The node's index.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Lower end of the node's interval.
    pub fn lo(&self) -> f64 {
        self.node.lo
    }

    /// Upper end of the node's interval.
    pub fn hi(&self) -> f64 {
        self.node.hi
    }

    /// The parent, unless this is the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.node.parent
    }

    /// Left and right child, unless this is a leaf.
    pub fn children(&self) -> Option<(NodeId, NodeId)> {
        self.node.children
    }

    /// Is this node a leaf?
    pub fn is_leaf(&self) -> bool {
        self.node.children.is_none()
    }

    /// The leaf's samples; `None` for internal nodes and unsampled leaves.
    pub fn samples(&self) -> Option<&'a [f64]> {
        self.node.ys.as_deref()
    }

    /// Integral estimate of this subtree.
    pub fn estimate(&self) -> NumericEstimate {
        self.node.estimate
    }

    /// Most efficient leaf of this subtree.
    pub fn best_leaf(&self) -> NodeId {
        self.node.best_leaf
    }

    /// Efficiency of [`best_leaf`](Self::best_leaf): estimate width per
    /// sample, infinite for unsampled leaves and zero for exhausted ones.
    pub fn efficiency(&self) -> f64 {
        self.node.efficiency
    }

    /// Has this leaf reached the floating point resolution of its domain?
    pub fn is_exhausted(&self) -> bool {
        self.node.exhausted
    }
}

impl<F: FnMut(f64) -> f64> RombergTree<F> {
    /// A tree over `lo..=hi` with leaves of up to [`DEFAULT_LEAF_SIZE`] samples.
    ///
    /// No samples are taken until the tree is refined.
    pub fn new(f: F, lo: f64, hi: f64) -> Result<Self> {
        Self::with_leaf_size(f, lo, hi, DEFAULT_LEAF_SIZE)
    }

    /// A tree with leaves of up to `max_leaf_size` samples.
    ///
    /// `max_leaf_size` must be `2^i + 1` and at least 5.
    pub fn with_leaf_size(f: F, lo: f64, hi: f64, max_leaf_size: usize) -> Result<Self> {
        check_bounds(lo, hi)?;
        if max_leaf_size < MIN_LEAF_SIZE || !is_romberg_len(max_leaf_size) {
            return Err(Error::InvalidLeafSize(max_leaf_size));
        }
        let root = NodeId(0);
        Ok(RombergTree {
            f,
            nodes: alloc::vec![Node::leaf(lo, hi, None, root)],
            root,
            max_leaf_size,
            sample_cnt: 0,
        })
    }

    /// Evaluate the integrand.
    ///
    /// This does not add a sample to the tree.
    pub fn eval(&mut self, x: f64) -> f64 {
        (self.f)(x)
    }

    /// Expand the most efficient leaf.
    ///
    /// Returns the number of new samples taken. This is zero when the best
    /// leaf was split without needing new samples, or when it is exhausted.
    pub fn refine(&mut self) -> usize {
        let leaf = self.nodes[self.root.0].best_leaf;
        self.refine_leaf(leaf)
    }

    /// Expand one particular leaf.
    ///
    /// An unsampled leaf gets 5 samples. A leaf below the size cap doubles
    /// its samples by sampling the midpoints. A full leaf is split at its
    /// middle sample into two children that share it; halves with fewer than
    /// 5 samples are topped up. A leaf whose midpoints no longer fall
    /// strictly between its samples is marked exhausted instead.
    ///
    /// # Panics
    ///
    /// Panics if `leaf` is not a leaf of this tree.
    pub fn refine_leaf(&mut self, leaf: NodeId) -> usize {
        let node = &self.nodes[leaf.0];
        assert!(node.children.is_none(), "refine_leaf called on an internal node");
        if node.exhausted {
            return 0;
        }
        let new_samples = match node.sample_cnt() {
            0 => self.sample_fresh(leaf),
            n if n < self.max_leaf_size => self.double(leaf),
            _ => self.split(leaf),
        };
        self.update_node(leaf);
        new_samples
    }

    fn sample_fresh(&mut self, leaf: NodeId) -> usize {
        let (lo, hi) = (self.nodes[leaf.0].lo, self.nodes[leaf.0].hi);
        let last = MIN_LEAF_SIZE - 1;
        let ys: Vec<f64> = (0..=last)
            .map(|i| (self.f)(sample_x(lo, hi, i, last)))
            .collect();
        self.nodes[leaf.0].ys = Some(ys);
        self.sample_cnt += MIN_LEAF_SIZE;
        MIN_LEAF_SIZE
    }

    fn double(&mut self, leaf: NodeId) -> usize {
        let node = &self.nodes[leaf.0];
        let (lo, hi) = (node.lo, node.hi);
        let old_last = node.sample_cnt() - 1;
        let Some(xs) = midpoints(lo, hi, old_last) else {
            log::debug!("leaf [{lo}, {hi}] exhausted at {} samples", old_last + 1);
            self.nodes[leaf.0].exhausted = true;
            return 0;
        };
        let mids: Vec<f64> = xs.iter().map(|&x| (self.f)(x)).collect();
        let Some(old) = self.nodes[leaf.0].ys.take() else {
            return 0;
        };
        let mut ys = Vec::with_capacity(2 * old_last + 1);
        for (i, y) in old.iter().enumerate() {
            ys.push(*y);
            if let Some(m) = mids.get(i) {
                ys.push(*m);
            }
        }
        self.nodes[leaf.0].ys = Some(ys);
        self.sample_cnt += old_last;
        old_last
    }

    fn split(&mut self, leaf: NodeId) -> usize {
        let node = &self.nodes[leaf.0];
        let (lo, hi) = (node.lo, node.hi);
        let mid = sample_x(lo, hi, 1, 2);
        let m = (node.sample_cnt() - 1) / 2;
        let halves_ok = m + 1 >= MIN_LEAF_SIZE
            || (midpoints(lo, mid, m).is_some() && midpoints(mid, hi, m).is_some());
        if !(mid > lo && mid < hi && halves_ok) {
            log::debug!("leaf [{lo}, {hi}] is too narrow to split");
            self.nodes[leaf.0].exhausted = true;
            return 0;
        }
        let Some(ys) = self.nodes[leaf.0].ys.take() else {
            return 0;
        };
        let left = NodeId(self.nodes.len());
        let right = NodeId(self.nodes.len() + 1);
        let mut left_node = Node::leaf(lo, mid, Some(leaf), left);
        left_node.ys = Some(ys[..=m].to_vec());
        let mut right_node = Node::leaf(mid, hi, Some(leaf), right);
        right_node.ys = Some(ys[m..].to_vec());
        self.nodes.push(left_node);
        self.nodes.push(right_node);
        self.nodes[leaf.0].children = Some((left, right));

        let mut new_samples = 0;
        for child in [left, right] {
            self.refresh(child);
            if self.nodes[child.0].sample_cnt() < MIN_LEAF_SIZE {
                new_samples += self.double(child);
                self.refresh(child);
            }
        }
        new_samples
    }

    /// Grow the domain to the right.
    ///
    /// A new leaf as wide as the whole current domain is attached next to
    /// it, sampled to as many samples as the current rightmost leaf holds,
    /// and both are placed under a new root. Returns the number of new
    /// samples.
    ///
    /// A domain of zero width cannot grow and gives [`Error::Unsolvable`].
    pub fn expand_right(&mut self) -> Result<usize> {
        let old_root = self.root;
        let (lo, hi) = (self.lo(), self.hi());
        if hi <= lo {
            return Err(Error::Unsolvable("a zero-width domain cannot grow"));
        }
        let new_hi = hi + (hi - lo);
        if !new_hi.is_finite() || new_hi <= hi {
            return Err(Error::NonFiniteBounds);
        }
        let mut rightmost = old_root;
        while let Some((_, r)) = self.nodes[rightmost.0].children {
            rightmost = r;
        }
        let target = self.nodes[rightmost.0].sample_cnt().max(MIN_LEAF_SIZE);

        let leaf = NodeId(self.nodes.len());
        let new_root = NodeId(self.nodes.len() + 1);
        self.nodes.push(Node::leaf(hi, new_hi, Some(new_root), leaf));
        let mut root_node = Node::leaf(lo, new_hi, None, new_root);
        root_node.children = Some((old_root, leaf));
        self.nodes.push(root_node);
        self.nodes[old_root.0].parent = Some(new_root);
        self.root = new_root;

        let mut new_samples = 0;
        while self.nodes[leaf.0].sample_cnt() < target && !self.nodes[leaf.0].exhausted {
            new_samples += self.refine_leaf(leaf);
        }
        self.update_node(leaf);
        log::debug!("domain expanded to [{lo}, {new_hi}] with {new_samples} new samples");
        Ok(new_samples)
    }

    /// Refine until the whole-domain estimate satisfies `precision`.
    ///
    /// At least `min_sample_cnt` samples are taken. The result has status
    /// [`TooManySteps`](EstimateStatus::TooManySteps) if the next refinement
    /// would exceed `max_sample_cnt`, and
    /// [`TooSmallStepSize`](EstimateStatus::TooSmallStepSize) if no leaf can
    /// be refined any further.
    pub fn integral(&mut self, precision: &Precision) -> Result<NumericEstimate> {
        precision.validate()?;
        loop {
            let est = self.estimate();
            if self.sample_cnt >= precision.min_sample_cnt && precision.is_satisfied_by(&est) {
                return Ok(est);
            }
            let root = &self.nodes[self.root.0];
            if root.efficiency <= 0.0 {
                log::debug!("integral stopped at {} samples: no leaf can be refined", self.sample_cnt);
                return Ok(est.with_status(EstimateStatus::TooSmallStepSize));
            }
            if self.sample_cnt + self.refine_cost(root.best_leaf) > precision.max_sample_cnt {
                log::debug!(
                    "integral stopped at {} samples: budget of {} exhausted",
                    self.sample_cnt,
                    precision.max_sample_cnt
                );
                return Ok(est.with_status(EstimateStatus::TooManySteps));
            }
            self.refine();
            log::trace!("integral refined to {}", self.estimate());
        }
    }

    /// Number of samples [`refine_leaf`](Self::refine_leaf) would take.
    pub(crate) fn refine_cost(&self, leaf: NodeId) -> usize {
        let node = &self.nodes[leaf.0];
        match node.sample_cnt() {
            0 => MIN_LEAF_SIZE,
            n if n < self.max_leaf_size => n - 1,
            n if (n - 1) / 2 + 1 < MIN_LEAF_SIZE => 4,
            _ => 0,
        }
    }
}

impl<F> RombergTree<F> {
    /// Lower end of the domain.
    pub fn lo(&self) -> f64 {
        self.nodes[self.root.0].lo
    }

    /// Upper end of the domain.
    pub fn hi(&self) -> f64 {
        self.nodes[self.root.0].hi
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Maximum number of samples per leaf.
    pub fn max_leaf_size(&self) -> usize {
        self.max_leaf_size
    }

    /// A view of one node.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef {
            id,
            node: &self.nodes[id.0],
        }
    }

    /// Total number of samples taken.
    pub fn sample_cnt(&self) -> usize {
        self.sample_cnt
    }

    /// The current whole-domain estimate.
    pub fn estimate(&self) -> NumericEstimate {
        self.nodes[self.root.0]
            .estimate
            .with_sample_cnt(self.sample_cnt)
    }

    /// The leaves, from left to right.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves {
            nodes: &self.nodes,
            stack: alloc::vec![self.root],
        }
    }

    /// Recompute the cached estimate and best leaf of `id` and all of its
    /// ancestors.
    pub(crate) fn update_node(&mut self, id: NodeId) {
        let mut cur = Some(id);
        while let Some(id) = cur {
            self.refresh(id);
            cur = self.nodes[id.0].parent;
        }
    }

    /// Recompute one node's cached fields from its samples or children.
    fn refresh(&mut self, id: NodeId) {
        match self.nodes[id.0].children {
            None => {
                let node = &mut self.nodes[id.0];
                node.estimate = match &node.ys {
                    Some(ys) => leaf_estimate(ys, node.hi - node.lo),
                    None => NumericEstimate::unknown(),
                };
                node.best_leaf = id;
                node.efficiency = leaf_efficiency(node);
            }
            Some((l, r)) => {
                let (left, right) = (&self.nodes[l.0], &self.nodes[r.0]);
                let estimate = left.estimate.add(right.estimate);
                let (best_leaf, efficiency) = if right.efficiency > left.efficiency {
                    (right.best_leaf, right.efficiency)
                } else {
                    (left.best_leaf, left.efficiency)
                };
                let node = &mut self.nodes[id.0];
                node.estimate = estimate;
                node.best_leaf = best_leaf;
                node.efficiency = efficiency;
            }
        }
    }

    /// Check the structural invariants of the tree.
    ///
    /// Returns a description of the first violation found.
    pub fn check_invariants(&self) -> core::result::Result<(), &'static str> {
        let mut stack = alloc::vec![self.root];
        if self.nodes[self.root.0].parent.is_some() {
            return Err("root has a parent");
        }
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            if node.lo > node.hi {
                return Err("inverted node bounds");
            }
            match node.children {
                None => {
                    if let Some(ys) = &node.ys {
                        if !is_romberg_len(ys.len()) || ys.len() < MIN_LEAF_SIZE {
                            return Err("leaf sample count is not 2^k + 1 with k >= 2");
                        }
                        if ys.len() > self.max_leaf_size {
                            return Err("leaf holds more samples than allowed");
                        }
                    }
                    if node.best_leaf != id {
                        return Err("leaf does not point to itself");
                    }
                }
                Some((l, r)) => {
                    if node.ys.is_some() {
                        return Err("internal node holds samples");
                    }
                    let (left, right) = (&self.nodes[l.0], &self.nodes[r.0]);
                    if left.parent != Some(id) || right.parent != Some(id) {
                        return Err("broken parent link");
                    }
                    if left.lo != node.lo || left.hi != right.lo || right.hi != node.hi {
                        return Err("children do not partition their parent");
                    }
                    let leaves = Leaves {
                        nodes: &self.nodes,
                        stack: alloc::vec![id],
                    };
                    let mut best = f64::NEG_INFINITY;
                    let mut contains_best = false;
                    for leaf in leaves {
                        best = best.max(self.nodes[leaf.0].efficiency);
                        contains_best |= leaf == node.best_leaf;
                    }
                    if !contains_best {
                        return Err("best leaf lies outside the subtree");
                    }
                    if best != self.nodes[node.best_leaf.0].efficiency {
                        return Err("best leaf is not the most efficient leaf");
                    }
                    stack.push(r);
                    stack.push(l);
                }
            }
        }
        Ok(())
    }
}

/// Iterator over the leaves of a [`RombergTree`], left to right.
#[derive(Clone, Debug)]
pub struct Leaves<'a> {
    nodes: &'a [Node],
    stack: Vec<NodeId>,
}

impl Iterator for Leaves<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        while let Some(id) = self.stack.pop() {
            match self.nodes[id.0].children {
                None => return Some(id),
                Some((l, r)) => {
                    self.stack.push(r);
                    self.stack.push(l);
                }
            }
        }
        None
    }
}
