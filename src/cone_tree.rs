//! Cone tree for maximum inner-product search.
//!
//! A read-only binary space partitioning over a fixed point set. Each node
//! covers a contiguous range of the (reordered) points and stores the mean of
//! its points and the radius of the ball around that mean containing them.
//! For a query `q`, no point in a node can have an inner product above
//! `centroid·q + |q|·radius`, which lets whole subtrees be skipped.
//!
//! The tree is stored as an index-addressed arena: children are referenced by
//! position in `nodes`, never by pointer.
//!
//! # References
//!
//! - Ram & Gray (2012), "Maximum inner-product search using cone trees",
//!   KDD '12, 931-939

use crate::error::{check_dimensions, Result};
use crate::math::{dot, euclidean_distance_sq, norm};

/// Ranges with at most this many points become leaves.
pub const MAX_LEAF_ELEMENTS: usize = 8;

/// Relative slack added to node bounds so rounding never prunes the true answer.
const BOUND_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone)]
struct Node {
    first: usize,
    last: usize,
    center: Vec<f64>,
    center_norm: f64,
    radius: f64,
    children: Option<(usize, usize)>,
}

impl Node {
    fn new(first: usize, last: usize) -> Self {
        Self {
            first,
            last,
            center: Vec::new(),
            center_norm: 0.0,
            radius: 0.0,
            children: None,
        }
    }

    /// Largest inner product any point of this node can have with the query.
    fn upper_bound(&self, query: &[f64], query_norm: f64) -> f64 {
        let bound = dot(query, &self.center) + query_norm * self.radius;
        bound + BOUND_TOLERANCE * (1.0 + query_norm * (self.center_norm + self.radius))
    }
}

/// Result of a best-match query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FindResult {
    /// Position of the matched point in [`ConeTree::points`].
    pub index: usize,
    /// Inner product of the query with the matched point.
    pub inner_product: f64,
}

impl FindResult {
    /// Returns `true` if `(index, prod)` should replace this result.
    ///
    /// Equal products resolve to the lower index, which makes tree queries
    /// agree exactly with a front-to-back linear scan.
    fn is_improved_by(&self, index: usize, prod: f64) -> bool {
        prod > self.inner_product || (prod == self.inner_product && index < self.index)
    }
}

/// Cone tree over a fixed set of points.
///
/// Construction reorders the points; use [`points`](ConeTree::points) to map
/// a [`FindResult::index`] back to its vector.
///
/// # Example
///
/// ```
/// use u_moea::cone_tree::ConeTree;
///
/// let tree = ConeTree::new(vec![
///     vec![1.0, 0.0],
///     vec![0.0, 1.0],
///     vec![0.6, 0.8],
/// ]).unwrap();
///
/// let best = tree.find_best_match(&[0.1, 1.0]);
/// assert_eq!(tree.points()[best.index], vec![0.0, 1.0]);
/// ```
#[derive(Debug, Clone)]
pub struct ConeTree {
    points: Vec<Vec<f64>>,
    nodes: Vec<Node>,
    depth: usize,
}

impl ConeTree {
    /// Builds the tree.
    ///
    /// # Errors
    /// Returns a configuration error if `points` is empty or the points do not
    /// all have the same dimension.
    pub fn new(points: Vec<Vec<f64>>) -> Result<Self> {
        check_dimensions(&points)?;

        let mut tree = Self {
            nodes: vec![Node::new(0, points.len())],
            points,
            depth: 0,
        };
        tree.build();

        Ok(tree)
    }

    /// Processes the nodes in creation order, splitting every range larger
    /// than [`MAX_LEAF_ELEMENTS`] into two children appended to the arena.
    fn build(&mut self) {
        // Level of each node, indexed like `nodes`.
        let mut levels = vec![0usize];
        let mut i = 0;
        while i < self.nodes.len() {
            let (first, last) = (self.nodes[i].first, self.nodes[i].last);

            let center = centroid(&self.points[first..last]);
            let radius = radius(&self.points[first..last], &center);
            self.nodes[i].center_norm = norm(&center);
            self.nodes[i].center = center;
            self.nodes[i].radius = radius;

            if last - first > MAX_LEAF_ELEMENTS {
                let middle = first + self.split(first, last);
                let left = self.nodes.len();
                self.nodes.push(Node::new(first, middle));
                self.nodes.push(Node::new(middle, last));
                self.nodes[i].children = Some((left, left + 1));
                levels.push(levels[i] + 1);
                levels.push(levels[i] + 1);
            }
            i += 1;
        }
        self.depth = levels.into_iter().max().unwrap_or(0);
    }

    /// Partitions `points[first..last]` around two distant anchors and
    /// returns the size of the left part (always in `1..len`).
    fn split(&mut self, first: usize, last: usize) -> usize {
        let range = &mut self.points[first..last];

        let left_anchor = range[furthest_from(range, &range[0])].clone();
        let right_anchor = range[furthest_from(range, &left_anchor)].clone();

        let mut middle = 0;
        for i in 0..range.len() {
            let to_left = euclidean_distance_sq(&left_anchor, &range[i]);
            let to_right = euclidean_distance_sq(&right_anchor, &range[i]);
            if to_left < to_right {
                range.swap(i, middle);
                middle += 1;
            }
        }

        // Duplicates leave one side empty; halve instead so depth stays logarithmic.
        if middle == 0 || middle == range.len() {
            range.len() / 2
        } else {
            middle
        }
    }

    /// Finds the point with the largest inner product with `query`.
    ///
    /// The result is identical to [`find_best_match_linear`](Self::find_best_match_linear);
    /// only the number of inner products evaluated differs. Safe to call from
    /// many threads at once.
    pub fn find_best_match(&self, query: &[f64]) -> FindResult {
        debug_assert_eq!(query.len(), self.points[0].len());

        let query_norm = norm(query);
        let mut best = FindResult {
            index: 0,
            inner_product: dot(query, &self.points[0]),
        };

        let mut stack = Vec::with_capacity(self.depth + 2);
        stack.push(0usize);

        while let Some(current) = stack.pop() {
            let node = &self.nodes[current];

            if best.inner_product > node.upper_bound(query, query_norm) {
                continue;
            }

            match node.children {
                None => {
                    for i in node.first..node.last {
                        let prod = dot(query, &self.points[i]);
                        if best.is_improved_by(i, prod) {
                            best = FindResult {
                                index: i,
                                inner_product: prod,
                            };
                        }
                    }
                }
                Some((left, right)) => {
                    let left_bound = self.nodes[left].upper_bound(query, query_norm);
                    let right_bound = self.nodes[right].upper_bound(query, query_norm);
                    // The child pushed last is visited first.
                    if left_bound < right_bound {
                        stack.push(left);
                        stack.push(right);
                    } else {
                        stack.push(right);
                        stack.push(left);
                    }
                }
            }
        }

        best
    }

    /// Exhaustive scan over all points, returning the first maximum.
    pub fn find_best_match_linear(&self, query: &[f64]) -> FindResult {
        let mut best = FindResult {
            index: 0,
            inner_product: dot(query, &self.points[0]),
        };
        for (i, p) in self.points.iter().enumerate().skip(1) {
            let prod = dot(query, p);
            if prod > best.inner_product {
                best = FindResult {
                    index: i,
                    inner_product: prod,
                };
            }
        }
        best
    }

    /// The indexed points, in tree order.
    pub fn points(&self) -> &[Vec<f64>] {
        &self.points
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`: construction rejects empty point sets.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of nodes in the arena.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Length of the longest root-to-leaf path (a single leaf has depth 0).
    pub fn depth(&self) -> usize {
        self.depth
    }
}

fn furthest_from(points: &[Vec<f64>], from: &[f64]) -> usize {
    let mut furthest = 0;
    let mut max_distance = f64::NEG_INFINITY;
    for (i, p) in points.iter().enumerate() {
        let d = euclidean_distance_sq(p, from);
        if d > max_distance {
            furthest = i;
            max_distance = d;
        }
    }
    furthest
}

fn centroid(points: &[Vec<f64>]) -> Vec<f64> {
    let mut center = vec![0.0; points[0].len()];
    for p in points {
        for (c, &x) in center.iter_mut().zip(p) {
            *c += x;
        }
    }
    let n = points.len() as f64;
    center.iter_mut().for_each(|c| *c /= n);
    center
}

fn radius(points: &[Vec<f64>], center: &[f64]) -> f64 {
    points
        .iter()
        .map(|p| euclidean_distance_sq(center, p))
        .fold(0.0, f64::max)
        .sqrt()
}
