//! Per-strand lookup tables for hair bodies.
//!
//! Built once per body from its explicit strand ordering. Hair forces
//! walk strands root to tip; nothing here depends on the order of the
//! spring list.

use std::collections::HashMap;

use skein_mesh::{Body, SpringKind};

/// Strand-derived indices used by hair force evaluation.
#[derive(Debug, Clone, Default)]
pub struct StrandIndex {
    /// Angular bending spring indices per strand, root to tip.
    pub bend_chains: Vec<Vec<usize>>,
    /// Spring index → true if the spring is evaluated through a chain.
    pub chained: Vec<bool>,
    /// Root vertex of the strand each vertex belongs to.
    pub root_of: Vec<Option<usize>>,
    /// Rest arclength from the root, normalized by strand length.
    pub arclength: Vec<f32>,
}

impl StrandIndex {
    /// Builds the index for `body`. Cloth bodies get empty chains.
    pub fn build(body: &Body) -> Self {
        let n = body.vertex_count();
        let mut index = Self {
            bend_chains: Vec::with_capacity(body.strands().len()),
            chained: vec![false; body.springs.len()],
            root_of: vec![None; n],
            arclength: vec![0.0; n],
        };

        let mut bends: HashMap<(usize, usize, usize), usize> = HashMap::new();
        let mut rest_lengths: HashMap<(usize, usize), f32> = HashMap::new();
        for (s, spring) in body.springs.iter().enumerate() {
            match spring.kind {
                SpringKind::AngularBending { i, j, k, .. } => {
                    bends.insert((i, j, k), s);
                }
                SpringKind::Structural { i, j, rest_length } => {
                    rest_lengths.insert((i.min(j), i.max(j)), rest_length);
                }
                _ => {}
            }
        }

        for strand in body.strands() {
            let Some(root) = strand.root() else {
                index.bend_chains.push(Vec::new());
                continue;
            };

            let segment_lengths: Vec<f32> = strand
                .segments()
                .map(|(i, j)| {
                    rest_lengths
                        .get(&(i.min(j), i.max(j)))
                        .copied()
                        .unwrap_or_else(|| (body.vertices[j].position - body.vertices[i].position).length())
                })
                .collect();
            let total: f32 = segment_lengths.iter().sum();
            let inv_total = if total > 0.0 { 1.0 / total } else { 0.0 };

            index.root_of[root] = Some(root);
            let mut walked = 0.0;
            for (&v, len) in strand.vertices.iter().skip(1).zip(&segment_lengths) {
                walked += len;
                index.root_of[v] = Some(root);
                index.arclength[v] = walked * inv_total;
            }

            let chain: Vec<usize> = strand
                .bends()
                .filter_map(|bend| bends.get(&bend).copied())
                .collect();
            for &s in &chain {
                index.chained[s] = true;
            }
            index.bend_chains.push(chain);
        }

        index
    }
}
