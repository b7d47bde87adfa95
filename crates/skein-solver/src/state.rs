//! Implicit solver state: per-vertex motion buffers and the block-sparse
//! system.
//!
//! The state is sized for one body. Storage is allocated once and only
//! rebuilt when the body's vertex count changes; a rebuild discards all
//! previous block indices.

use skein_math::sparse::{BlockPattern, BlockSlot, BlockSparseMatrix};
use skein_math::{Mat3, Vec3};
use skein_mesh::{Body, Spring, SpringKind};

use crate::constraints::VertexConstraint;
use crate::forces::{AngularForce, SpringForce};

/// Off-diagonal slots reserved for one spring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpringSlots {
    /// Single-vertex springs only touch the diagonal.
    Diagonal,
    /// Two-vertex springs.
    Pair(BlockSlot),
    /// Angular bending: the ij, jk and ik couplings.
    Triple {
        ij: BlockSlot,
        jk: BlockSlot,
        ik: BlockSlot,
    },
}

/// Reusable vectors for the conjugate-gradient solve.
#[derive(Debug, Clone, Default)]
pub(crate) struct Scratch {
    pub b: Vec<Vec3>,
    pub dv: Vec<Vec3>,
    pub r: Vec<Vec3>,
    pub c: Vec<Vec3>,
    pub q: Vec<Vec3>,
    pub s: Vec<Vec3>,
    pub tmp: Vec<Vec3>,
    pub precond: Vec<Mat3>,
    pub wind: Vec<Vec3>,
}

impl Scratch {
    fn new(n: usize) -> Self {
        let zeros = vec![Vec3::ZERO; n];
        Self {
            b: zeros.clone(),
            dv: zeros.clone(),
            r: zeros.clone(),
            c: zeros.clone(),
            q: zeros.clone(),
            s: zeros.clone(),
            tmp: zeros.clone(),
            precond: vec![Mat3::IDENTITY; n],
            wind: zeros,
        }
    }
}

/// Mass-spring state and linear system for one body.
#[derive(Debug, Clone)]
pub struct ImplicitSolverState {
    pub(crate) pattern: BlockPattern,
    spring_slots: Vec<SpringSlots>,

    // ─── Per-vertex motion state ───
    pub mass: Vec<f32>,
    pub x: Vec<Vec3>,
    pub v: Vec<Vec3>,
    pub x_new: Vec<Vec3>,
    pub v_new: Vec<Vec3>,

    // ─── Forces and Jacobians ───
    pub f: Vec<Vec3>,
    pub dfdx: BlockSparseMatrix,
    pub dfdv: BlockSparseMatrix,
    pub(crate) a: BlockSparseMatrix,

    pub constraints: Vec<VertexConstraint>,
    pub(crate) scratch: Scratch,
}

impl ImplicitSolverState {
    /// Allocates storage for `body` and reserves one off-diagonal slot
    /// group per spring.
    ///
    /// The slot capacity is the spring block count of the body, so the
    /// reservation can never overflow for a consistent body.
    pub fn new(body: &Body) -> Self {
        let capacity = body.count_off_diagonal_blocks();
        Self::with_capacity(body, capacity)
    }

    /// Like [`ImplicitSolverState::new`] with an explicit slot capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is too small for the body's springs.
    pub fn with_capacity(body: &Body, capacity: usize) -> Self {
        let n = body.vertex_count();
        let mut pattern = BlockPattern::new(n, capacity);
        let spring_slots = body
            .springs
            .iter()
            .map(|s| reserve_slots(&mut pattern, s))
            .collect();

        let dfdx = BlockSparseMatrix::new(&pattern);
        let dfdv = dfdx.clone();
        let a = dfdx.clone();

        let mut state = Self {
            pattern,
            spring_slots,
            mass: vec![0.0; n],
            x: vec![Vec3::ZERO; n],
            v: vec![Vec3::ZERO; n],
            x_new: vec![Vec3::ZERO; n],
            v_new: vec![Vec3::ZERO; n],
            f: vec![Vec3::ZERO; n],
            dfdx,
            dfdv,
            a,
            constraints: vec![VertexConstraint::Free; n],
            scratch: Scratch::new(n),
        };
        state.load_body(body);
        state
    }

    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.mass.len()
    }

    /// Pre-counted off-diagonal block capacity.
    pub fn off_diagonal_capacity(&self) -> usize {
        self.pattern.capacity()
    }

    /// Distinct vertex pairs actually coupled.
    pub fn coupled_pairs(&self) -> usize {
        self.pattern.len()
    }

    /// Sparsity pattern shared by all matrices of this state.
    pub fn pattern(&self) -> &BlockPattern {
        &self.pattern
    }

    /// Slots reserved for spring `index`.
    pub fn spring_slots(&self, index: usize) -> SpringSlots {
        self.spring_slots[index]
    }

    /// Copies mass, position and velocity from the body.
    pub fn load_body(&mut self, body: &Body) {
        for (i, vert) in body.vertices.iter().enumerate() {
            self.mass[i] = vert.mass;
            self.x[i] = vert.position;
            self.v[i] = vert.velocity;
            self.x_new[i] = vert.position;
            self.v_new[i] = vert.velocity;
        }
    }

    /// Zeros forces and both Jacobians.
    pub fn clear_forces(&mut self) {
        self.f.fill(Vec3::ZERO);
        self.dfdx.zero();
        self.dfdv.zero();
    }

    /// Adds a force and its Jacobians to a single vertex.
    pub fn apply_vertex_force(&mut self, i: usize, force: &SpringForce) {
        self.f[i] += force.f;
        self.dfdx.add_diagonal(i, force.dfdx);
        self.dfdv.add_diagonal(i, force.dfdv);
    }

    /// Adds a two-vertex spring force: `+f` on `i`, `−f` on `j`.
    pub fn apply_spring(&mut self, i: usize, j: usize, slot: BlockSlot, force: &SpringForce) {
        self.f[i] += force.f;
        self.f[j] -= force.f;

        self.dfdx.add_diagonal(i, force.dfdx);
        self.dfdx.add_diagonal(j, force.dfdx);
        self.dfdx.add_off_diagonal(slot, -force.dfdx);

        self.dfdv.add_diagonal(i, force.dfdv);
        self.dfdv.add_diagonal(j, force.dfdv);
        self.dfdv.add_off_diagonal(slot, -force.dfdv);
    }

    /// Adds an angular bending force on the edge `j → k`.
    ///
    /// Only the jk coupling is non-zero; the ij and ik slots stay
    /// reserved so the block budget matches the topology count.
    pub fn apply_angular(&mut self, j: usize, k: usize, jk: BlockSlot, force: &AngularForce) {
        self.f[k] += force.fk;
        self.f[j] -= force.fk;

        self.dfdx.add_diagonal(j, force.dfdx);
        self.dfdx.add_diagonal(k, force.dfdx);
        self.dfdx.add_off_diagonal(jk, -force.dfdx);

        self.dfdv.add_diagonal(j, force.dfdv);
        self.dfdv.add_diagonal(k, force.dfdv);
        self.dfdv.add_off_diagonal(jk, -force.dfdv);
    }

    /// Commits the post-solve state: `x ← x_new`, `v ← v_new`.
    pub fn apply_result(&mut self) {
        self.x.copy_from_slice(&self.x_new);
        self.v.copy_from_slice(&self.v_new);
    }

    /// Total kinetic energy: 0.5 * Σ m_i |v_i|².
    pub fn kinetic_energy(&self) -> f64 {
        self.mass
            .iter()
            .zip(&self.v)
            .map(|(&m, v)| 0.5 * f64::from(m) * f64::from(v.length_squared()))
            .sum()
    }
}

fn reserve_slots(pattern: &mut BlockPattern, spring: &Spring) -> SpringSlots {
    match spring.kind {
        SpringKind::Structural { i, j, .. }
        | SpringKind::Shear { i, j, .. }
        | SpringKind::Sewing { i, j, .. }
        | SpringKind::Bending { i, j, .. } => SpringSlots::Pair(pattern.slot(i, j)),
        SpringKind::AngularBending { i, j, k, .. } => SpringSlots::Triple {
            ij: pattern.slot(i, j),
            jk: pattern.slot(j, k),
            ik: pattern.slot(i, k),
        },
        SpringKind::Goal { .. } => SpringSlots::Diagonal,
    }
}
