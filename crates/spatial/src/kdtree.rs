use kiddo::float::distance::SquaredEuclidean;
use kiddo::immutable::float::kdtree::ImmutableKdTree;
use std::num::NonZero;

/// A static KdTree over 3D points, used for neighbourhood queries.
///
/// Wraps kiddo's `ImmutableKdTree`. Items are `u32` positions into the
/// slice the tree was built from.
#[derive(Debug, Clone)]
pub struct KdTree {
    tree: ImmutableKdTree<f32, u32, 3, 32>,
    num_points: usize,
}

impl KdTree {
    /// Builds the tree over `points` in one pass.
    pub fn build(points: &[[f32; 3]]) -> Self {
        Self {
            tree: ImmutableKdTree::new_from_slice(points),
            num_points: points.len(),
        }
    }

    /// Returns the number of points in the tree.
    pub fn len(&self) -> usize {
        self.num_points
    }

    /// Returns true if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.num_points == 0
    }

    /// Indices of the `k` nearest neighbours to `query`, nearest first.
    ///
    /// Empty if `k == 0`, the tree is empty, or `query` is not finite; all
    /// points if `k > len()`.
    pub fn knn_indices(&self, query: &[f32; 3], k: usize) -> Vec<usize> {
        if self.is_empty() || !query.iter().all(|v| v.is_finite()) {
            return Vec::new();
        }
        let Some(nz_k) = NonZero::new(k) else {
            return Vec::new();
        };

        self.tree
            .nearest_n::<SquaredEuclidean>(query, nz_k)
            .iter()
            .map(|nn| nn.item as usize)
            .collect()
    }
}
