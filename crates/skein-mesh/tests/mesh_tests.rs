//! Integration tests for skein-mesh.

use skein_math::Vec3;
use skein_mesh::generators::{cloth_springs, hair_strands, quad_grid};
use skein_mesh::{Body, BodyKind, Face, Spring, SpringKind, Strand, Topology, Vertex};

fn count_kind(body: &Body, pred: fn(&SpringKind) -> bool) -> usize {
    body.springs.iter().filter(|s| pred(&s.kind)).count()
}

// ─── Body Tests ───────────────────────────────────────────────

fn make_pair() -> (Vec<Vertex>, Vec<Spring>) {
    let vertices = vec![
        Vertex::new(Vec3::ZERO, 1.0),
        Vertex::new(Vec3::X, 1.0),
    ];
    let springs = vec![Spring::new(SpringKind::Structural {
        i: 0,
        j: 1,
        rest_length: 1.0,
    })];
    (vertices, springs)
}

#[test]
fn validate_ok() {
    let (vertices, springs) = make_pair();
    let body = Body::new(vertices, springs, BodyKind::Cloth { faces: vec![] });
    assert!(body.is_ok());
}

#[test]
fn validate_catches_zero_mass() {
    let (mut vertices, springs) = make_pair();
    vertices[1].mass = 0.0;
    assert!(Body::new(vertices, springs, BodyKind::Cloth { faces: vec![] }).is_err());
}

#[test]
fn validate_catches_nan_position() {
    let (mut vertices, springs) = make_pair();
    vertices[0].position.x = f32::NAN;
    assert!(Body::new(vertices, springs, BodyKind::Cloth { faces: vec![] }).is_err());
}

#[test]
fn validate_catches_oob_spring() {
    let (vertices, mut springs) = make_pair();
    springs.push(Spring::new(SpringKind::Goal { i: 7 }));
    assert!(Body::new(vertices, springs, BodyKind::Cloth { faces: vec![] }).is_err());
}

#[test]
fn validate_catches_self_spring() {
    let (vertices, _) = make_pair();
    let springs = vec![Spring::new(SpringKind::Shear {
        i: 1,
        j: 1,
        rest_length: 0.0,
    })];
    assert!(Body::new(vertices, springs, BodyKind::Cloth { faces: vec![] }).is_err());
}

#[test]
fn validate_catches_oob_strand() {
    let (vertices, springs) = make_pair();
    let kind = BodyKind::Hair {
        strands: vec![Strand { vertices: vec![0, 1, 2] }],
    };
    assert!(Body::new(vertices, springs, kind).is_err());
}

#[test]
fn pinned_vertex_targets_its_position() {
    let v = Vertex::new(Vec3::new(1.0, 2.0, 3.0), 1.0).pinned();
    assert!(v.pinned);
    let (start, end) = v.goal_targets();
    assert_eq!(start, v.position);
    assert_eq!(end, v.position);
}

// ─── Spring Tests ─────────────────────────────────────────────

#[test]
fn off_diagonal_block_budget() {
    let angular = Spring::new(SpringKind::AngularBending {
        i: 0,
        j: 1,
        k: 2,
        rest_edge_ij: Vec3::X,
        rest_edge_jk: Vec3::X,
    });
    let linear = Spring::new(SpringKind::Bending {
        i: 0,
        j: 2,
        rest_length: 2.0,
    });
    assert_eq!(angular.off_diagonal_blocks(), 3);
    assert_eq!(linear.off_diagonal_blocks(), 1);
    assert_eq!(Spring::new(SpringKind::Goal { i: 0 }).off_diagonal_blocks(), 1);
}

#[test]
fn spring_serializes_tagged() {
    let s = Spring::new(SpringKind::Sewing {
        i: 3,
        j: 4,
        rest_length: 0.0,
    });
    let json = serde_json::to_string(&s).unwrap();
    assert!(json.contains("\"sewing\""));
    let back: Spring = serde_json::from_str(&json).unwrap();
    assert_eq!(back, s);
}

// ─── Generator Tests ──────────────────────────────────────────

#[test]
fn quad_grid_2x2() {
    let body = quad_grid(2, 2, 1.0, 1.0, 0.1).unwrap();
    assert_eq!(body.vertex_count(), 9);
    assert_eq!(body.faces().len(), 4);
    assert!(body.strands().is_empty());

    let structural = count_kind(&body, |k| matches!(k, SpringKind::Structural { .. }));
    let shear = count_kind(&body, |k| matches!(k, SpringKind::Shear { .. }));
    let bending = count_kind(&body, |k| matches!(k, SpringKind::Bending { .. }));
    assert_eq!(structural, 12);
    assert_eq!(shear, 8);
    assert_eq!(bending, 6);
    assert_eq!(body.count_off_diagonal_blocks(), 26);
}

#[test]
fn quad_grid_dimensions() {
    let body = quad_grid(4, 4, 2.0, 2.0, 0.1).unwrap();
    assert!((body.vertices[0].position.x - (-1.0)).abs() < 1e-6);
    assert!((body.vertices[0].position.y - 1.0).abs() < 1e-6);
    assert!((body.vertices[4].position.x - 1.0).abs() < 1e-6);
}

#[test]
fn quad_grid_faces_point_along_z() {
    let body = quad_grid(3, 2, 1.5, 1.0, 0.1).unwrap();
    let positions: Vec<Vec3> = body.vertices.iter().map(|v| v.position).collect();
    for face in body.faces() {
        let (n, area) = face.normal_and_area(&positions);
        assert!((n.z - 1.0).abs() < 1e-5);
        assert!((area - 0.25).abs() < 1e-5);
    }
}

#[test]
fn average_structural_length() {
    let body = quad_grid(4, 4, 2.0, 2.0, 0.1).unwrap();
    assert!((body.average_structural_length() - 0.5).abs() < 1e-5);
}

#[test]
fn hair_strands_topology() {
    let body = hair_strands(2, 3, 0.3, 0.1, Vec3::X, 0.01).unwrap();
    assert!(body.is_hair());
    assert_eq!(body.vertex_count(), 8);
    assert_eq!(body.strands().len(), 2);
    assert_eq!(body.strands()[1].vertices, vec![4, 5, 6, 7]);
    assert!(body.vertices[0].pinned);
    assert!(body.vertices[4].pinned);
    assert!(!body.vertices[5].pinned);

    let angular = count_kind(&body, |k| matches!(k, SpringKind::AngularBending { .. }));
    let goals = count_kind(&body, |k| matches!(k, SpringKind::Goal { .. }));
    assert_eq!(angular, 4);
    assert_eq!(goals, 6);
    // 6 stretch + 3·4 angular + 6 goal
    assert_eq!(body.count_off_diagonal_blocks(), 24);
}

#[test]
fn strand_iterators_follow_order() {
    let strand = Strand { vertices: vec![7, 3, 9, 1] };
    assert_eq!(strand.root(), Some(7));
    let segs: Vec<_> = strand.segments().collect();
    assert_eq!(segs, vec![(7, 3), (3, 9), (9, 1)]);
    let bends: Vec<_> = strand.bends().collect();
    assert_eq!(bends, vec![(7, 3, 9), (3, 9, 1)]);
}

// ─── Topology Tests ───────────────────────────────────────────

#[test]
fn topology_single_quad() {
    let faces = [Face::Quad([0, 1, 2, 3])];
    let topo = Topology::build(&faces);
    assert_eq!(topo.edges.len(), 4);
    assert!(topo.interior_edges.is_empty());
    assert_eq!(topo.boundary_edge_count(), 4);
    assert_eq!(Topology::quad_diagonals(&faces).len(), 2);
}

#[test]
fn topology_two_triangles() {
    let faces = [Face::Triangle([0, 1, 2]), Face::Triangle([2, 1, 3])];
    let topo = Topology::build(&faces);
    assert_eq!(topo.edges.len(), 5);
    assert_eq!(topo.interior_edges.len(), 1);
    let edge = topo.interior_edges[0];
    assert_eq!((edge.v0, edge.v1), (1, 2));
    assert_eq!(edge.across_a0, 0);
    assert_eq!(edge.across_a1, 0);
    assert_eq!(edge.across_b0, 3);
    assert_eq!(edge.across_b1, 3);
}

#[test]
fn triangle_pair_gets_one_bending_spring() {
    let positions = [
        Vec3::ZERO,
        Vec3::X,
        Vec3::Y,
        Vec3::new(1.0, 1.0, 0.0),
    ];
    let faces = [Face::Triangle([0, 1, 2]), Face::Triangle([2, 1, 3])];
    let springs = cloth_springs(&positions, &faces);
    let bending: Vec<_> = springs
        .iter()
        .filter_map(|s| match s.kind {
            SpringKind::Bending { i, j, rest_length } => Some((i, j, rest_length)),
            _ => None,
        })
        .collect();
    assert_eq!(bending.len(), 1);
    assert_eq!((bending[0].0, bending[0].1), (0, 3));
    assert!((bending[0].2 - 2.0f32.sqrt()).abs() < 1e-6);
}
