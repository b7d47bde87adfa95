//! Simulated bodies: per-vertex state, springs, and faces or strands.
//!
//! A body is built once and then mutated in place by the solver every
//! frame. Topology (springs, faces, strands) never changes after
//! construction.

use skein_math::Vec3;
use serde::{Deserialize, Serialize};
use skein_types::{SkeinError, SkeinResult};

use crate::normals::Face;
use crate::spring::{Spring, SpringKind};

/// Animated goal for a vertex over the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Goal position at frame start.
    pub start: Vec3,
    /// Goal position at frame end.
    pub end: Vec3,
    /// Goal weight in `[0, 1]`.
    pub weight: f32,
}

impl Goal {
    /// A goal that holds still at `position`.
    pub fn fixed(position: Vec3, weight: f32) -> Self {
        Self {
            start: position,
            end: position,
            weight,
        }
    }
}

/// A simulated point mass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Mass in kg. Must be positive.
    pub mass: f32,
    /// Pinned vertices follow their goal exactly.
    pub pinned: bool,
    pub goal: Option<Goal>,
    /// Hair segment radius, scales vertex and edge wind.
    pub radius: f32,
    /// Collision responses applied to this vertex in the current substep.
    #[serde(skip)]
    pub impulse_count: u32,
}

impl Vertex {
    /// Creates a free vertex at rest.
    pub fn new(position: Vec3, mass: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            mass,
            pinned: false,
            goal: None,
            radius: 1.0,
            impulse_count: 0,
        }
    }

    /// Pins the vertex at its current position.
    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self.goal = Some(Goal::fixed(self.position, 1.0));
        self
    }

    /// Frame-start and frame-end goal positions. Vertices without a goal
    /// target their current position.
    pub fn goal_targets(&self) -> (Vec3, Vec3) {
        match self.goal {
            Some(goal) => (goal.start, goal.end),
            None => (self.position, self.position),
        }
    }

    /// Goal weight, zero without a goal.
    pub fn goal_weight(&self) -> f32 {
        self.goal.map_or(0.0, |g| g.weight)
    }
}

/// An ordered hair strand, root first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strand {
    pub vertices: Vec<usize>,
}

impl Strand {
    /// Index of the root vertex, if the strand is not empty.
    pub fn root(&self) -> Option<usize> {
        self.vertices.first().copied()
    }

    /// Consecutive vertex pairs, root to tip.
    pub fn segments(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.vertices.windows(2).map(|w| (w[0], w[1]))
    }

    /// Consecutive vertex triples, root to tip.
    pub fn bends(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.vertices.windows(3).map(|w| (w[0], w[1], w[2]))
    }
}

/// What kind of body this is, with the topology specific to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BodyKind {
    /// Cloth surface made of triangles and quads.
    Cloth { faces: Vec<Face> },
    /// Hair made of explicitly ordered strands.
    Hair { strands: Vec<Strand> },
}

/// A simulated body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub vertices: Vec<Vertex>,
    pub springs: Vec<Spring>,
    pub kind: BodyKind,
}

impl Body {
    /// Builds and validates a body.
    pub fn new(vertices: Vec<Vertex>, springs: Vec<Spring>, kind: BodyKind) -> SkeinResult<Self> {
        let body = Self {
            vertices,
            springs,
            kind,
        };
        body.validate()?;
        Ok(body)
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns true for hair bodies.
    #[inline]
    pub fn is_hair(&self) -> bool {
        matches!(self.kind, BodyKind::Hair { .. })
    }

    /// Faces of a cloth body. Hair has none.
    pub fn faces(&self) -> &[Face] {
        match &self.kind {
            BodyKind::Cloth { faces } => faces,
            BodyKind::Hair { .. } => &[],
        }
    }

    /// Strands of a hair body. Cloth has none.
    pub fn strands(&self) -> &[Strand] {
        match &self.kind {
            BodyKind::Hair { strands } => strands,
            BodyKind::Cloth { .. } => &[],
        }
    }

    /// Number of off-diagonal matrix blocks the springs need.
    pub fn count_off_diagonal_blocks(&self) -> usize {
        self.springs.iter().map(Spring::off_diagonal_blocks).sum()
    }

    /// Average rest length of the structural springs, zero if there are none.
    pub fn average_structural_length(&self) -> f32 {
        let (sum, count) = self
            .springs
            .iter()
            .filter_map(|s| match s.kind {
                SpringKind::Structural { rest_length, .. } => Some(rest_length),
                _ => None,
            })
            .fold((0.0f32, 0usize), |(sum, n), len| (sum + len, n + 1));
        if count == 0 {
            0.0
        } else {
            sum / count as f32
        }
    }

    /// Validates body integrity.
    ///
    /// Checks:
    /// - Masses are positive and finite, positions and velocities finite
    /// - Spring, face and strand indices are within bounds
    /// - Two-vertex springs do not connect a vertex to itself
    pub fn validate(&self) -> SkeinResult<()> {
        let n = self.vertices.len();

        for (i, v) in self.vertices.iter().enumerate() {
            if !(v.mass.is_finite() && v.mass > 0.0) {
                return Err(SkeinError::InvalidBody(format!(
                    "Vertex {} has non-positive mass {}",
                    i, v.mass
                )));
            }
            if !v.position.is_finite() || !v.velocity.is_finite() {
                return Err(SkeinError::InvalidBody(format!(
                    "Vertex {} has a non-finite position or velocity",
                    i
                )));
            }
        }

        for (s, spring) in self.springs.iter().enumerate() {
            let verts = spring.vertices();
            if let Some(&bad) = verts.iter().find(|&&v| v >= n) {
                return Err(SkeinError::InvalidBody(format!(
                    "Spring {} references vertex {} (vertex count: {})",
                    s, bad, n
                )));
            }
            if verts.len() >= 2 && verts.windows(2).any(|w| w[0] == w[1]) {
                return Err(SkeinError::InvalidBody(format!(
                    "Spring {} connects a vertex to itself",
                    s
                )));
            }
        }

        match &self.kind {
            BodyKind::Cloth { faces } => {
                for (f, face) in faces.iter().enumerate() {
                    if let Some(&bad) = face.indices().iter().find(|&&v| v >= n) {
                        return Err(SkeinError::InvalidBody(format!(
                            "Face {} references vertex {} (vertex count: {})",
                            f, bad, n
                        )));
                    }
                }
            }
            BodyKind::Hair { strands } => {
                for (s, strand) in strands.iter().enumerate() {
                    if let Some(&bad) = strand.vertices.iter().find(|&&v| v >= n) {
                        return Err(SkeinError::InvalidBody(format!(
                            "Strand {} references vertex {} (vertex count: {})",
                            s, bad, n
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}
