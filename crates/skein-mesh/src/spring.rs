//! Spring topology.
//!
//! Spring kinds form a closed set. Each kind carries exactly the vertex
//! indices and rest data it needs, so force evaluation can match on the
//! variant instead of testing type bits.

use skein_math::Vec3;
use serde::{Deserialize, Serialize};

/// The kind of a spring and its kind-specific rest data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpringKind {
    /// Stretch resistance along mesh edges (or hair segments).
    Structural { i: usize, j: usize, rest_length: f32 },
    /// Resistance to in-plane shearing across quad diagonals.
    Shear { i: usize, j: usize, rest_length: f32 },
    /// Pulls two seam vertices together; force may be clamped.
    Sewing { i: usize, j: usize, rest_length: f32 },
    /// Linear (Choi–Ko) bending between vertices two edges apart.
    Bending { i: usize, j: usize, rest_length: f32 },
    /// Three-vertex bending along a strand, `i → j → k`.
    AngularBending {
        i: usize,
        j: usize,
        k: usize,
        rest_edge_ij: Vec3,
        rest_edge_jk: Vec3,
    },
    /// Pulls vertex `i` toward its animated goal position.
    Goal { i: usize },
}

/// A spring: kind plus per-spring stiffness scale and activation flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spring {
    /// Kind-specific topology and rest data.
    pub kind: SpringKind,
    /// Per-spring stiffness scale in `[0, 1]`.
    pub stiffness: f32,
    /// Deactivated springs contribute nothing.
    pub active: bool,
}

impl Spring {
    /// Creates an active spring with zero stiffness scale.
    pub fn new(kind: SpringKind) -> Self {
        Self {
            kind,
            stiffness: 0.0,
            active: true,
        }
    }

    /// Sets the per-spring stiffness scale.
    pub fn with_stiffness(mut self, stiffness: f32) -> Self {
        self.stiffness = stiffness;
        self
    }

    /// Number of off-diagonal matrix blocks this spring couples.
    ///
    /// Angular bending combines three vertices (ij, jk and the ik cross
    /// term). Every other kind is counted as one vertex pair, matching
    /// the block budget of the solver. Goal springs only touch the
    /// diagonal but still count toward the budget.
    pub fn off_diagonal_blocks(&self) -> usize {
        match self.kind {
            SpringKind::AngularBending { .. } => 3,
            _ => 1,
        }
    }

    /// Vertex indices referenced by this spring.
    pub fn vertices(&self) -> Vec<usize> {
        match self.kind {
            SpringKind::Structural { i, j, .. }
            | SpringKind::Shear { i, j, .. }
            | SpringKind::Sewing { i, j, .. }
            | SpringKind::Bending { i, j, .. } => vec![i, j],
            SpringKind::AngularBending { i, j, k, .. } => vec![i, j, k],
            SpringKind::Goal { i } => vec![i],
        }
    }

    /// Rest length of two-vertex springs.
    pub fn rest_length(&self) -> Option<f32> {
        match self.kind {
            SpringKind::Structural { rest_length, .. }
            | SpringKind::Shear { rest_length, .. }
            | SpringKind::Sewing { rest_length, .. }
            | SpringKind::Bending { rest_length, .. } => Some(rest_length),
            _ => None,
        }
    }
}
