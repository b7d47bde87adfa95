//! Face topology queries.
//!
//! Builds edge adjacency from the face list so spring generation can
//! find structural edges, quad diagonals and bending pairs without
//! scanning faces repeatedly.

use std::collections::{BTreeMap, BTreeSet};

use crate::normals::Face;

/// Precomputed edge adjacency for a cloth face list.
#[derive(Debug, Clone)]
pub struct Topology {
    /// Unique edges as `(v_min, v_max)` pairs, sorted.
    pub edges: Vec<[usize; 2]>,

    /// For each edge, the one or two adjacent faces.
    /// Boundary edges have exactly 1 adjacent face.
    pub edge_faces: Vec<Vec<usize>>,

    /// Edges shared by exactly two faces.
    pub interior_edges: Vec<InteriorEdge>,
}

/// An interior edge with the vertices across it on either side.
///
/// `across_a0` is the neighbor of `v0` in face A that is not on the
/// edge; the other three fields follow the same pattern. For triangles
/// both "across" vertices of a face are the same wing vertex.
#[derive(Debug, Clone, Copy)]
pub struct InteriorEdge {
    pub v0: usize,
    pub v1: usize,
    pub face_a: usize,
    pub face_b: usize,
    pub across_a0: usize,
    pub across_a1: usize,
    pub across_b0: usize,
    pub across_b1: usize,
}

impl Topology {
    /// Build topology from a face list.
    pub fn build(faces: &[Face]) -> Self {
        // Key: (min_vertex, max_vertex) to canonicalize edge direction.
        // Ordered map keeps spring generation deterministic.
        let mut edge_map: BTreeMap<(usize, usize), Vec<usize>> = BTreeMap::new();

        for (f, face) in faces.iter().enumerate() {
            let idx = face.indices();
            for e in 0..idx.len() {
                let (a, b) = (idx[e], idx[(e + 1) % idx.len()]);
                edge_map.entry((a.min(b), a.max(b))).or_default().push(f);
            }
        }

        let mut edges = Vec::with_capacity(edge_map.len());
        let mut edge_faces = Vec::with_capacity(edge_map.len());
        let mut interior_edges = Vec::new();

        for (&(v0, v1), adjacent) in &edge_map {
            edges.push([v0, v1]);
            edge_faces.push(adjacent.clone());

            if let [face_a, face_b] = adjacent[..] {
                interior_edges.push(InteriorEdge {
                    v0,
                    v1,
                    face_a,
                    face_b,
                    across_a0: neighbor_off_edge(&faces[face_a], v0, v1),
                    across_a1: neighbor_off_edge(&faces[face_a], v1, v0),
                    across_b0: neighbor_off_edge(&faces[face_b], v0, v1),
                    across_b1: neighbor_off_edge(&faces[face_b], v1, v0),
                });
            }
        }

        Self {
            edges,
            edge_faces,
            interior_edges,
        }
    }

    /// Diagonals of every quad face, as `(v_min, v_max)` pairs.
    pub fn quad_diagonals(faces: &[Face]) -> Vec<[usize; 2]> {
        let mut set = BTreeSet::new();
        for face in faces {
            if let Face::Quad([a, b, c, d]) = *face {
                set.insert((a.min(c), a.max(c)));
                set.insert((b.min(d), b.max(d)));
            }
        }
        set.into_iter().map(|(a, b)| [a, b]).collect()
    }

    /// Returns the number of boundary edges (edges with only 1 adjacent face).
    pub fn boundary_edge_count(&self) -> usize {
        self.edge_faces.iter().filter(|f| f.len() == 1).count()
    }
}

/// The neighbor of `v` in `face` that is not `other`.
fn neighbor_off_edge(face: &Face, v: usize, other: usize) -> usize {
    let idx = face.indices();
    let n = idx.len();
    let pos = idx.iter().position(|&x| x == v).unwrap_or(0);
    let prev = idx[(pos + n - 1) % n];
    let next = idx[(pos + 1) % n];
    if prev == other {
        next
    } else {
        prev
    }
}
