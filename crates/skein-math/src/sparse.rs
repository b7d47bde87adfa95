//! Block-sparse 3×3 matrices for the implicit mass-spring system.
//!
//! The system matrix has one dense 3×3 block on the diagonal per vertex
//! and one 3×3 block per interacting vertex pair. The sparsity pattern
//! lives in a [`BlockPattern`], an arena of pair slots with a fixed
//! capacity counted from the spring topology before the first solve.
//! Several [`BlockSparseMatrix`] value arrays (dF/dx, dF/dv, the
//! assembled system) share one pattern, so a slot index means the same
//! vertex pair in all of them.
//!
//! Off-diagonal storage is symmetric: the block stored for the pair
//! `(row, col)` with `row < col` is `A[row][col]`, and `A[col][row]` is
//! its transpose.

use std::collections::HashMap;

use glam::{Mat3, Vec3};

/// Handle to an off-diagonal slot, as returned by [`BlockPattern::slot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSlot {
    /// Index into the off-diagonal arena.
    pub index: usize,
    /// True when the caller's `(i, j)` is the transpose of the stored `(row, col)`.
    pub transposed: bool,
}

/// Sparsity pattern: vertex count plus a fixed-capacity arena of
/// vertex-pair slots.
#[derive(Debug, Clone)]
pub struct BlockPattern {
    vertex_count: usize,
    capacity: usize,
    /// `(row, col)` pair of each allocated slot, `row < col`.
    pairs: Vec<(usize, usize)>,
    lookup: HashMap<(usize, usize), usize>,
}

impl BlockPattern {
    /// Creates an empty pattern for `vertex_count` vertices and at most
    /// `capacity` off-diagonal blocks.
    pub fn new(vertex_count: usize, capacity: usize) -> Self {
        Self {
            vertex_count,
            capacity,
            pairs: Vec::with_capacity(capacity),
            lookup: HashMap::with_capacity(capacity),
        }
    }

    /// Number of vertices (diagonal blocks).
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Pre-counted maximum number of off-diagonal blocks.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of off-diagonal slots allocated so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if no off-diagonal slot has been allocated.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The `(row, col)` pair stored in `index`.
    #[inline]
    pub fn pair(&self, index: usize) -> (usize, usize) {
        self.pairs[index]
    }

    /// Returns the slot coupling vertices `i` and `j`, allocating it on
    /// first use.
    ///
    /// # Panics
    ///
    /// Panics if `i == j`, if either index is out of range, or if a new
    /// slot is needed while the pre-counted capacity is exhausted. The
    /// latter means the spring topology was miscounted, which is a bug
    /// in the caller and cannot be recovered from.
    pub fn slot(&mut self, i: usize, j: usize) -> BlockSlot {
        assert!(i != j, "off-diagonal block requested on the diagonal ({i})");
        assert!(
            i < self.vertex_count && j < self.vertex_count,
            "off-diagonal block ({i}, {j}) out of range for {} vertices",
            self.vertex_count
        );

        let key = (i.min(j), i.max(j));
        let transposed = i > j;

        if let Some(&index) = self.lookup.get(&key) {
            return BlockSlot { index, transposed };
        }

        assert!(
            self.pairs.len() < self.capacity,
            "off-diagonal block capacity exhausted ({} blocks): spring topology was miscounted",
            self.capacity
        );

        let index = self.pairs.len();
        self.pairs.push(key);
        self.lookup.insert(key, index);
        BlockSlot { index, transposed }
    }

    /// Looks up an existing slot without allocating.
    pub fn find(&self, i: usize, j: usize) -> Option<BlockSlot> {
        let key = (i.min(j), i.max(j));
        self.lookup.get(&key).map(|&index| BlockSlot {
            index,
            transposed: i > j,
        })
    }
}

/// Values of a block-sparse symmetric matrix over a [`BlockPattern`].
#[derive(Debug, Clone)]
pub struct BlockSparseMatrix {
    diagonal: Vec<Mat3>,
    off_diagonal: Vec<Mat3>,
}

impl BlockSparseMatrix {
    /// Creates a zero matrix sized for `pattern`.
    pub fn new(pattern: &BlockPattern) -> Self {
        Self {
            diagonal: vec![Mat3::ZERO; pattern.vertex_count()],
            off_diagonal: vec![Mat3::ZERO; pattern.capacity()],
        }
    }

    /// Zeros every block. The pattern is untouched.
    pub fn zero(&mut self) {
        self.diagonal.fill(Mat3::ZERO);
        self.off_diagonal.fill(Mat3::ZERO);
    }

    /// Sets every diagonal block to `m` and every off-diagonal block to zero.
    pub fn init_diagonal(&mut self, m: Mat3) {
        self.diagonal.fill(m);
        self.off_diagonal.fill(Mat3::ZERO);
    }

    /// Diagonal block of vertex `i`.
    #[inline]
    pub fn diagonal(&self, i: usize) -> Mat3 {
        self.diagonal[i]
    }

    /// Adds `m` to the diagonal block of vertex `i`.
    #[inline]
    pub fn add_diagonal(&mut self, i: usize, m: Mat3) {
        self.diagonal[i] += m;
    }

    /// Overwrites the diagonal block of vertex `i`.
    #[inline]
    pub fn set_diagonal(&mut self, i: usize, m: Mat3) {
        self.diagonal[i] = m;
    }

    /// Stored off-diagonal block at arena index `index`.
    #[inline]
    pub fn off_diagonal(&self, index: usize) -> Mat3 {
        self.off_diagonal[index]
    }

    /// Adds `m`, given in the caller's `(i, j)` orientation, to a slot.
    #[inline]
    pub fn add_off_diagonal(&mut self, slot: BlockSlot, m: Mat3) {
        let m = if slot.transposed { m.transpose() } else { m };
        self.off_diagonal[slot.index] += m;
    }

    /// Computes `out = A · x`.
    pub fn mul_vec(&self, pattern: &BlockPattern, x: &[Vec3], out: &mut [Vec3]) {
        debug_assert_eq!(x.len(), self.diagonal.len());
        debug_assert_eq!(out.len(), self.diagonal.len());

        for (o, (d, xi)) in out.iter_mut().zip(self.diagonal.iter().zip(x)) {
            *o = *d * *xi;
        }

        for index in 0..pattern.len() {
            let (row, col) = pattern.pair(index);
            let block = self.off_diagonal[index];
            out[row] += block * x[col];
            out[col] += block.transpose() * x[row];
        }
    }

    /// Assigns `self = diag(mass)·I + a·A + b·B`, block by block.
    ///
    /// Used to assemble `M − h·dF/dv − h²·dF/dx` from the two Jacobians.
    pub fn assign_mass_combination(
        &mut self,
        mass: &[f32],
        a: f32,
        lhs: &BlockSparseMatrix,
        b: f32,
        rhs: &BlockSparseMatrix,
    ) {
        for (i, d) in self.diagonal.iter_mut().enumerate() {
            *d = Mat3::from_diagonal(Vec3::splat(mass[i]))
                + lhs.diagonal[i] * a
                + rhs.diagonal[i] * b;
        }
        for (k, o) in self.off_diagonal.iter_mut().enumerate() {
            *o = lhs.off_diagonal[k] * a + rhs.off_diagonal[k] * b;
        }
    }

    /// Inverts every diagonal block into `out`, the block-Jacobi
    /// preconditioner. Singular blocks fall back to identity.
    pub fn block_jacobi_inverse(&self, out: &mut Vec<Mat3>) {
        out.clear();
        out.extend(self.diagonal.iter().map(|d| {
            let det = d.determinant();
            if det.is_finite() && det.abs() > f32::MIN_POSITIVE {
                d.inverse()
            } else {
                Mat3::IDENTITY
            }
        }));
    }
}

/// Applies a block-diagonal operator: `out[i] = blocks[i] · x[i]`.
pub fn apply_block_diagonal(blocks: &[Mat3], x: &[Vec3], out: &mut [Vec3]) {
    for ((o, b), xi) in out.iter_mut().zip(blocks).zip(x) {
        *o = *b * *xi;
    }
}
