//! Cloth faces and their area-weighted normals.

use skein_math::Vec3;
use serde::{Deserialize, Serialize};

/// A cloth face: a triangle or a quad, counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Face {
    Triangle([usize; 3]),
    Quad([usize; 4]),
}

impl Face {
    /// Vertex indices in winding order.
    pub fn indices(&self) -> &[usize] {
        match self {
            Face::Triangle(v) => v,
            Face::Quad(v) => v,
        }
    }

    /// Unit normal and area of the face at the given positions.
    ///
    /// Quads use the cross product of their diagonals. Degenerate faces
    /// return a zero normal and zero area.
    pub fn normal_and_area(&self, positions: &[Vec3]) -> (Vec3, f32) {
        let cross = match *self {
            Face::Triangle([a, b, c]) => {
                (positions[b] - positions[a]).cross(positions[c] - positions[a])
            }
            Face::Quad([a, b, c, d]) => {
                (positions[a] - positions[c]).cross(positions[b] - positions[d])
            }
        };
        let len = cross.length();
        if len > 1e-12 {
            (cross / len, 0.5 * len)
        } else {
            (Vec3::ZERO, 0.0)
        }
    }
}
