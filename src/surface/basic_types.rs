// SPDX-License-Identifier: MIT
//
// Copyright (c) 2025 Alexandre Severino
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

use std::collections::BTreeSet;
use std::f64::consts::PI;

use ahash::{AHashMap, AHashSet};

use crate::delaunay::{TetFace, TetMesh};

/// Thresholds that grade candidate faces during reconstruction.
///
/// `vv_sliver` and `vv_large` are cosines compared against the dot product
/// of the unit normals of a boundary edge's right face and a candidate face.
/// Candidates folding back past `vv_sliver` are rejected outright; candidates
/// bending past `vv_large` get a negative grade and are never stitched. The
/// defaults are the empirical values of the greedy surface reconstruction
/// algorithm of Cohen-Steiner and Da (2002); relaxing `vv_large` admits the
/// sharper dihedral angles of coarsely sampled closed surfaces.
#[derive(Debug, Clone, Copy)]
pub struct SurfParams {
    pub vv_sliver: f64,
    pub vv_large: f64,
}

impl Default for SurfParams {
    fn default() -> Self {
        SurfParams {
            vv_sliver: (5.0 * PI / 6.0).cos(),
            vv_large: (1.1 * PI / 2.0).cos(),
        }
    }
}

impl SurfParams {
    /// Grade of a candidate face with normal alignment `vv` and squared
    /// circumradius `rr`: inverse squared circumradius for well-aligned
    /// candidates, otherwise the alignment shifted to be negative.
    pub fn grade(&self, vv: f64, rr: f64) -> f64 {
        if vv > self.vv_large { 1.0 / rr } else { vv - 1.0 }
    }
}

/// One node in the surface, keyed by its mesh node id.
///
/// A node is in the surface if some face references it, and on the surface
/// boundary if it has boundary edges before and after it (always both or
/// neither).
#[derive(Debug, Clone, Default)]
pub struct Node {
    /// An integer index associated with this node, for external use only;
    /// the surface does not use it.
    pub index: i64,
    pub(crate) face: Option<usize>,
    pub(crate) edge_before: Option<Edge>,
    pub(crate) edge_after: Option<Edge>,
}

impl Node {
    pub fn is_in_surface(&self) -> bool {
        self.face.is_some()
    }

    pub fn is_on_boundary(&self) -> bool {
        self.edge_before.is_some()
    }

    /// A face that references this node, or `None` if the node is not in
    /// the surface.
    pub fn face(&self) -> Option<usize> {
        self.face
    }

    /// The boundary edge into this node; this node is its node B.
    pub fn edge_before(&self) -> Option<Edge> {
        self.edge_before
    }

    /// The boundary edge out of this node; this node is its node A.
    pub fn edge_after(&self) -> Option<Edge> {
        self.edge_after
    }
}

/// A directed edge between two surface nodes A and B.
///
/// An edge is in the surface if it has a face on its right, and on the
/// surface boundary if it has no face on its left. Edges are transient
/// values; the authoritative boundary state lives in the node records.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub(crate) a: usize,
    pub(crate) b: usize,
    pub(crate) left: Option<usize>,
    pub(crate) right: Option<usize>,
}

impl Edge {
    pub fn node_a(&self) -> usize {
        self.a
    }

    pub fn node_b(&self) -> usize {
        self.b
    }

    pub fn face_left(&self) -> Option<usize> {
        self.left
    }

    pub fn face_right(&self) -> Option<usize> {
        self.right
    }

    pub fn is_in_surface(&self) -> bool {
        self.right.is_some()
    }

    pub fn is_on_boundary(&self) -> bool {
        self.left.is_none()
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.a == other.a && self.b == other.b
    }
}

impl Eq for Edge {}

impl std::hash::Hash for Edge {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (self.a ^ self.b).hash(state);
    }
}

/// One triangular face in the surface.
///
/// Each face references three nodes A, B, and C in CCW order, and up to
/// three face nabors opposite those nodes. A `None` nabor denotes an edge
/// (opposite the corresponding node) on the surface boundary.
#[derive(Debug, Clone)]
pub struct Face {
    /// An integer index associated with this face, for external use only;
    /// the surface does not use it.
    pub index: i64,
    pub(crate) mesh_face: TetFace,
    pub(crate) nabors: [Option<usize>; 3],
    pub(crate) mark: i32,
}

impl Face {
    pub fn node_a(&self) -> usize {
        self.mesh_face.a
    }

    pub fn node_b(&self) -> usize {
        self.mesh_face.b
    }

    pub fn node_c(&self) -> usize {
        self.mesh_face.c
    }

    pub fn nodes(&self) -> [usize; 3] {
        self.mesh_face.nodes()
    }

    /// The oriented mesh face this surface face was drawn from.
    pub fn mesh_face(&self) -> TetFace {
        self.mesh_face
    }

    /// Face nabors opposite nodes A, B, and C.
    pub fn nabors(&self) -> [Option<usize>; 3] {
        self.nabors
    }

    pub fn references(&self, node: usize) -> bool {
        self.mesh_face.references(node)
    }
}

/// A boundary edge paired with its best candidate face and grade. A `None`
/// face carries the worst possible grade of -2.0.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EdgeFace {
    pub edge: Edge,
    pub face: Option<TetFace>,
    pub grade: f64,
}

/// Queue key for an edge-face: grade first, ties broken by the directed
/// node-id pair of the edge.
#[derive(Debug, Clone, Copy)]
pub(crate) struct QueueKey {
    pub grade: f64,
    pub edge: (usize, usize),
}

impl Ord for QueueKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.grade
            .total_cmp(&other.grade)
            .then_with(|| self.edge.cmp(&other.edge))
    }
}

impl PartialOrd for QueueKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueueKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for QueueKey {}

pub(crate) const FACE_MARK_MAX: i32 = i32::MAX - 1;

/// A triangulated, manifold, oriented surface with boundary, reconstructed
/// from the points of a Delaunay tet mesh and rebuilt from scratch whenever
/// a node is added or removed.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    pub(crate) mesh: TetMesh,
    pub(crate) nodes: Vec<Node>,
    pub(crate) faces: Vec<Face>,
    /// Candidate mesh faces not yet in the surface, deduplicated by mate.
    pub(crate) face_set: AHashSet<TetFace>,
    /// Mesh faces currently in the surface.
    pub(crate) face_map: AHashMap<TetFace, usize>,
    /// Boundary edges awaiting processing, keyed by directed node pair.
    pub(crate) edge_map: AHashMap<(usize, usize), EdgeFace>,
    pub(crate) edge_queue: BTreeSet<QueueKey>,
    pub(crate) mark_red: i32,
    pub(crate) mark_blue: i32,
    pub(crate) params: SurfParams,
}
