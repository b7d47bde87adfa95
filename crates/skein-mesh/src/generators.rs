//! Procedural bodies for benchmarks and testing.
//!
//! These generators produce deterministic, resolution-configurable
//! bodies with their full spring topology already built.

use std::collections::BTreeSet;

use skein_math::Vec3;
use skein_types::SkeinResult;

use crate::body::{Body, BodyKind, Goal, Strand, Vertex};
use crate::normals::Face;
use crate::spring::{Spring, SpringKind};
use crate::topology::Topology;

/// Builds structural, shear and linear bending springs for a cloth face list.
///
/// - Structural: one per unique face edge.
/// - Shear: both diagonals of every quad.
/// - Bending: across every interior edge, joining the vertices that sit
///   on either side of each edge endpoint.
pub fn cloth_springs(positions: &[Vec3], faces: &[Face]) -> Vec<Spring> {
    let topo = Topology::build(faces);
    let rest = |i: usize, j: usize| (positions[j] - positions[i]).length();

    let mut springs = Vec::new();
    let mut linked: BTreeSet<(usize, usize)> = BTreeSet::new();

    for &[i, j] in &topo.edges {
        linked.insert((i, j));
        springs.push(Spring::new(SpringKind::Structural {
            i,
            j,
            rest_length: rest(i, j),
        }));
    }

    for [i, j] in Topology::quad_diagonals(faces) {
        if linked.insert((i, j)) {
            springs.push(Spring::new(SpringKind::Shear {
                i,
                j,
                rest_length: rest(i, j),
            }));
        }
    }

    for edge in &topo.interior_edges {
        for (a, b) in [
            (edge.across_a0, edge.across_b0),
            (edge.across_a1, edge.across_b1),
        ] {
            if a == b {
                continue;
            }
            let key = (a.min(b), a.max(b));
            if linked.insert(key) {
                springs.push(Spring::new(SpringKind::Bending {
                    i: key.0,
                    j: key.1,
                    rest_length: rest(key.0, key.1),
                }));
            }
        }
    }

    springs
}

/// Builds stretch, angular bending and goal springs for hair strands.
///
/// Goal springs are created for every non-root vertex. Angular bending
/// springs get a stiffness scale of 1, since hair applies the spring
/// scale as an overall factor.
pub fn strand_springs(positions: &[Vec3], strands: &[Strand]) -> Vec<Spring> {
    let mut springs = Vec::new();

    for strand in strands {
        for (i, j) in strand.segments() {
            springs.push(Spring::new(SpringKind::Structural {
                i,
                j,
                rest_length: (positions[j] - positions[i]).length(),
            }));
        }
        for (i, j, k) in strand.bends() {
            springs.push(
                Spring::new(SpringKind::AngularBending {
                    i,
                    j,
                    k,
                    rest_edge_ij: positions[j] - positions[i],
                    rest_edge_jk: positions[k] - positions[j],
                })
                .with_stiffness(1.0),
            );
        }
        for &i in strand.vertices.iter().skip(1) {
            springs.push(Spring::new(SpringKind::Goal { i }));
        }
    }

    springs
}

/// Generates a flat rectangular quad cloth in the XY plane.
///
/// The grid spans `[-width/2, width/2]` in X and `[-height/2, height/2]` in Y,
/// centered at the origin at Z=0, rows ordered top to bottom.
///
/// # Arguments
/// - `cols` — Number of quads along X (vertex count = cols + 1).
/// - `rows` — Number of quads along Y (vertex count = rows + 1).
/// - `width` — Total width in meters.
/// - `height` — Total height in meters.
/// - `mass` — Mass of each vertex in kg.
///
/// # Example
/// ```
/// use skein_mesh::generators::quad_grid;
/// let body = quad_grid(2, 2, 1.0, 1.0, 0.1).unwrap();
/// assert_eq!(body.vertex_count(), 9);  // 3×3 vertices
/// assert_eq!(body.faces().len(), 4);
/// ```
pub fn quad_grid(cols: usize, rows: usize, width: f32, height: f32, mass: f32) -> SkeinResult<Body> {
    let verts_x = cols + 1;
    let verts_y = rows + 1;

    let half_w = width / 2.0;
    let half_h = height / 2.0;

    let mut vertices = Vec::with_capacity(verts_x * verts_y);
    for j in 0..verts_y {
        for i in 0..verts_x {
            let u = i as f32 / cols.max(1) as f32;
            let v = j as f32 / rows.max(1) as f32;
            let position = Vec3::new(-half_w + u * width, half_h - v * height, 0.0);
            vertices.push(Vertex::new(position, mass));
        }
    }

    let mut faces = Vec::with_capacity(cols * rows);
    for j in 0..rows {
        for i in 0..cols {
            let top_left = j * verts_x + i;
            let top_right = top_left + 1;
            let bot_left = top_left + verts_x;
            let bot_right = bot_left + 1;
            faces.push(Face::Quad([top_left, bot_left, bot_right, top_right]));
        }
    }

    let positions: Vec<Vec3> = vertices.iter().map(|v| v.position).collect();
    let springs = cloth_springs(&positions, &faces);
    Body::new(vertices, springs, BodyKind::Cloth { faces })
}

/// Generates `count` straight hair strands with pinned roots.
///
/// Roots sit on the Z axis, `spacing` apart, and each strand grows along
/// `direction` with `segments` equal segments covering `length`. Every
/// non-root vertex gets a fixed goal at its rest position.
pub fn hair_strands(
    count: usize,
    segments: usize,
    length: f32,
    spacing: f32,
    direction: Vec3,
    mass: f32,
) -> SkeinResult<Body> {
    let dir = direction.normalize_or_zero();
    let step = length / segments.max(1) as f32;

    let mut vertices = Vec::with_capacity(count * (segments + 1));
    let mut strands = Vec::with_capacity(count);

    for s in 0..count {
        let root = Vec3::new(0.0, 0.0, s as f32 * spacing);
        let first = vertices.len();
        for k in 0..=segments {
            let position = root + dir * (k as f32 * step);
            let vertex = Vertex::new(position, mass);
            vertices.push(if k == 0 {
                vertex.pinned()
            } else {
                Vertex {
                    goal: Some(Goal::fixed(position, 1.0)),
                    ..vertex
                }
            });
        }
        strands.push(Strand {
            vertices: (first..vertices.len()).collect(),
        });
    }

    let positions: Vec<Vec3> = vertices.iter().map(|v| v.position).collect();
    let springs = strand_springs(&positions, &strands);
    Body::new(vertices, springs, BodyKind::Hair { strands })
}
