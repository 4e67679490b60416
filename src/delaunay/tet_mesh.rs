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

//! Delaunay tetrahedral mesh over a set of 3-D points.
//!
//! Nodes have stable `usize` ids that survive retetrahedralization. Tets are
//! stored with a consistent positive orientation, so that the four oriented
//! faces of a tet point outward and two tets sharing a face hold that face in
//! opposite orientations (mates).

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::geometry::{Point3, Vector3};
use crate::kernel;

/// Relative volume threshold below which a tet is considered flat.
const FLAT_TET_TOLERANCE: f64 = 1.0e-12;

/// An oriented triangular face of a tet, a triple of node ids in CCW order
/// as seen from outside the tet. Equality and hashing are invariant under
/// rotation of the triple, so a face and its mate are distinct.
#[derive(Debug, Clone, Copy)]
pub struct TetFace {
    pub a: usize,
    pub b: usize,
    pub c: usize,
}

impl TetFace {
    pub fn new(a: usize, b: usize, c: usize) -> Self {
        TetFace { a, b, c }
    }

    pub fn nodes(&self) -> [usize; 3] {
        [self.a, self.b, self.c]
    }

    /// The same geometric face with reversed orientation.
    pub fn mate(&self) -> TetFace {
        TetFace::new(self.b, self.a, self.c)
    }

    /// Rotation-canonical form: the smallest node id first.
    pub fn canon(&self) -> (usize, usize, usize) {
        let (a, b, c) = (self.a, self.b, self.c);
        if a <= b && a <= c {
            (a, b, c)
        } else if b <= a && b <= c {
            (b, c, a)
        } else {
            (c, a, b)
        }
    }

    pub fn references(&self, node: usize) -> bool {
        self.a == node || self.b == node || self.c == node
    }

    /// Position of the node in the triple (0 for `a`, 1 for `b`, 2 for `c`).
    pub fn position(&self, node: usize) -> Option<usize> {
        self.nodes().iter().position(|&n| n == node)
    }

    /// The node of this face that is neither `a` nor `b`, or `None` if the
    /// face does not reference both.
    pub fn other_node(&self, a: usize, b: usize) -> Option<usize> {
        let ns = self.nodes();
        for i in 0..3 {
            if ns[i] == a {
                return if ns[(i + 1) % 3] == b {
                    Some(ns[(i + 2) % 3])
                } else if ns[(i + 2) % 3] == b {
                    Some(ns[(i + 1) % 3])
                } else {
                    None
                };
            }
        }
        None
    }

    /// True if `(a, b, c)` is a rotation of this face's node cycle.
    pub fn in_order(&self, a: usize, b: usize, c: usize) -> bool {
        let f = (self.a, self.b, self.c);
        f == (a, b, c) || f == (b, c, a) || f == (c, a, b)
    }

    /// The three directed edges of the face cycle.
    pub fn edges(&self) -> [(usize, usize); 3] {
        [(self.a, self.b), (self.b, self.c), (self.c, self.a)]
    }
}

impl PartialEq for TetFace {
    fn eq(&self, other: &Self) -> bool {
        self.canon() == other.canon()
    }
}

impl Eq for TetFace {}

impl std::hash::Hash for TetFace {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.canon().hash(state);
    }
}

/// A tetrahedron, four node ids ordered so that node `d` lies to the left
/// of the plane of `(a, b, c)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tet {
    pub nodes: [usize; 4],
}

impl Tet {
    pub fn new(a: usize, b: usize, c: usize, d: usize) -> Self {
        Tet { nodes: [a, b, c, d] }
    }

    /// The four outward-oriented faces of the tet.
    pub fn faces(&self) -> [TetFace; 4] {
        let [a, b, c, d] = self.nodes;
        [
            TetFace::new(a, b, c),
            TetFace::new(b, d, c),
            TetFace::new(c, d, a),
            TetFace::new(d, b, a),
        ]
    }
}

#[derive(Debug, Clone)]
struct NodeSlot {
    position: Point3,
    live: bool,
}

/// Delaunay tetrahedral mesh built by incremental Bowyer-Watson insertion.
///
/// Node ids are stable across insertions and removals; the tet set is
/// recomputed from scratch on every change, which favors correctness over
/// incremental performance. Coplanar-only point sets yield zero tets.
#[derive(Debug, Clone, Default)]
pub struct TetMesh {
    nodes: Vec<NodeSlot>,
    free: Vec<usize>,
    tets: Vec<Tet>,
    edge_fans: AHashMap<(usize, usize), SmallVec<[TetFace; 4]>>,
}

impl TetMesh {
    pub fn new() -> Self {
        TetMesh::default()
    }

    /// Adds a node at the specified position, retetrahedralizing the mesh.
    /// Returns `None` if a node with those exact coordinates already exists.
    pub fn add_node(&mut self, p: Point3) -> Option<usize> {
        if self.find_coincident(&p).is_some() {
            return None;
        }
        let id = match self.free.pop() {
            Some(id) => {
                self.nodes[id] = NodeSlot { position: p, live: true };
                id
            }
            None => {
                self.nodes.push(NodeSlot { position: p, live: true });
                self.nodes.len() - 1
            }
        };
        self.tetrahedralize();
        Some(id)
    }

    /// Removes the specified node, retetrahedralizing the mesh. Returns
    /// false if the node is not in the mesh.
    pub fn remove_node(&mut self, node: usize) -> bool {
        if !self.contains_node(node) {
            return false;
        }
        self.nodes[node].live = false;
        self.free.push(node);
        self.tetrahedralize();
        true
    }

    pub fn contains_node(&self, node: usize) -> bool {
        node < self.nodes.len() && self.nodes[node].live
    }

    pub fn count_nodes(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Ids of the nodes currently in the mesh, in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.live)
            .map(|(i, _)| i)
    }

    pub fn position(&self, node: usize) -> Point3 {
        assert!(self.contains_node(node), "node is in the mesh");
        self.nodes[node].position
    }

    /// Capacity of the node arena; valid node ids are below this bound.
    pub fn node_capacity(&self) -> usize {
        self.nodes.len()
    }

    pub fn tets(&self) -> &[Tet] {
        &self.tets
    }

    pub fn count_tets(&self) -> usize {
        self.tets.len()
    }

    /// The node nearest to the specified point, lowest id on ties.
    pub fn find_node_nearest(&self, x: f64, y: f64, z: f64) -> Option<usize> {
        let p = Point3::new(x, y, z);
        let mut best: Option<(usize, f64)> = None;
        for (i, n) in self.nodes.iter().enumerate() {
            if !n.live {
                continue;
            }
            let dd = p.distance_squared_to(&n.position);
            if best.is_none_or(|(_, bd)| dd < bd) {
                best = Some((i, dd));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Returns the directed edge `(a, b)` if the mesh has an edge between
    /// the two nodes, in either orientation.
    pub fn find_edge(&self, a: usize, b: usize) -> Option<(usize, usize)> {
        if self.edge_fans.contains_key(&(a, b)) || self.edge_fans.contains_key(&(b, a)) {
            Some((a, b))
        } else {
            None
        }
    }

    /// The faces around the undirected edge between `a` and `b`, each in
    /// the orientation aligned with the directed edge `a -> b`, one entry
    /// per geometric face.
    pub fn face_nabors(&self, a: usize, b: usize) -> &[TetFace] {
        self.edge_fans.get(&(a, b)).map_or(&[], |v| v.as_slice())
    }

    /// Center and squared radius of the face's circumcircle.
    pub fn face_center_circle(&self, face: TetFace) -> (Point3, f64) {
        kernel::circumcircle(
            &self.nodes[face.a].position,
            &self.nodes[face.b].position,
            &self.nodes[face.c].position,
        )
    }

    /// Unit normal and area of the face; the normal points outward from the
    /// tet the face was taken from.
    pub fn face_normal(&self, face: TetFace) -> (Vector3, f64) {
        kernel::normal_area(
            &self.nodes[face.a].position,
            &self.nodes[face.b].position,
            &self.nodes[face.c].position,
        )
    }

    fn find_coincident(&self, p: &Point3) -> Option<usize> {
        self.nodes
            .iter()
            .position(|n| n.live && n.position == *p)
    }

    /// Rebuilds the tet set from the live nodes: Bowyer-Watson insertion in
    /// ascending id order over a super-tetrahedron, then removal of tets
    /// touching super nodes and of flat tets.
    fn tetrahedralize(&mut self) {
        self.tets.clear();
        self.edge_fans.clear();

        let ids: Vec<usize> = self.node_ids().collect();
        if ids.len() < 4 {
            return;
        }

        let mut lo = self.nodes[ids[0]].position;
        let mut hi = lo;
        for &id in &ids {
            let p = self.nodes[id].position;
            lo.x = lo.x.min(p.x);
            lo.y = lo.y.min(p.y);
            lo.z = lo.z.min(p.z);
            hi.x = hi.x.max(p.x);
            hi.y = hi.y.max(p.y);
            hi.z = hi.z.max(p.z);
        }
        let center = Point3::new(
            0.5 * (lo.x + hi.x),
            0.5 * (lo.y + hi.y),
            0.5 * (lo.z + hi.z),
        );
        let mut diag = lo.distance_to(&hi);
        if diag == 0.0 {
            diag = 1.0;
        }
        let m = 20.0 * diag;

        // Super-tetrahedron vertices, ids past the node arena.
        let ns = self.nodes.len();
        let positions: Vec<Point3> = self.nodes.iter().map(|n| n.position).collect();
        let mut sup = [
            Point3::new(center.x + 3.0 * m, center.y, center.z),
            Point3::new(center.x, center.y + 3.0 * m, center.z),
            Point3::new(center.x, center.y, center.z + 3.0 * m),
            Point3::new(center.x - 3.0 * m, center.y - 3.0 * m, center.z - 3.0 * m),
        ];
        if kernel::left_of_plane(&sup[0], &sup[1], &sup[2], &sup[3]) < 0.0 {
            sup.swap(1, 2);
        }
        let pos = |i: usize| -> Point3 { if i < ns { positions[i] } else { sup[i - ns] } };

        let mut work: Vec<[usize; 4]> = vec![[ns, ns + 1, ns + 2, ns + 3]];
        let mut alive: Vec<bool> = vec![true];
        let mut spheres: Vec<(Point3, f64)> = vec![sphere_of(&pos, work[0])];

        for &id in &ids {
            let p = pos(id);

            let mut cavity: Vec<usize> = Vec::new();
            for ti in 0..work.len() {
                if !alive[ti] {
                    continue;
                }
                let (c, rr) = spheres[ti];
                if p.distance_squared_to(&c) < rr * (1.0 - 1.0e-12) {
                    cavity.push(ti);
                }
            }
            if cavity.is_empty() {
                // Numerical fallback: claim the tet whose circumsphere the
                // point penetrates deepest.
                let mut best: Option<(usize, f64)> = None;
                for ti in 0..work.len() {
                    if !alive[ti] {
                        continue;
                    }
                    let (c, rr) = spheres[ti];
                    let depth = p.distance_squared_to(&c) - rr;
                    if depth.is_finite() && best.is_none_or(|(_, bd)| depth < bd) {
                        best = Some((ti, depth));
                    }
                }
                match best {
                    Some((ti, _)) => cavity.push(ti),
                    None => continue,
                }
            }

            // Faces of the cavity counted once are its boundary; keep the
            // orientation from the dead tet, which points out of the cavity.
            let mut face_counts: AHashMap<(usize, usize, usize), (TetFace, u32)> =
                AHashMap::new();
            for &ti in &cavity {
                let [a, b, c, d] = work[ti];
                for f in Tet::new(a, b, c, d).faces() {
                    let mut key = f.nodes();
                    key.sort_unstable();
                    let entry = face_counts
                        .entry((key[0], key[1], key[2]))
                        .or_insert((f, 0));
                    entry.1 += 1;
                }
                alive[ti] = false;
            }
            let mut boundary: Vec<TetFace> = face_counts
                .into_values()
                .filter(|&(_, count)| count == 1)
                .map(|(f, _)| f)
                .collect();
            boundary.sort_unstable_by_key(|f| f.canon());
            for f in boundary {
                let mut t = [f.a, f.b, f.c, id];
                if kernel::left_of_plane(&pos(t[0]), &pos(t[1]), &pos(t[2]), &p) < 0.0 {
                    t.swap(0, 1);
                }
                work.push(t);
                alive.push(true);
                spheres.push(sphere_of(&pos, t));
            }
        }

        let flat = FLAT_TET_TOLERANCE * diag * diag * diag;
        for (ti, &[a, b, c, d]) in work.iter().enumerate() {
            if !alive[ti] || a >= ns || b >= ns || c >= ns || d >= ns {
                continue;
            }
            let vol = kernel::left_of_plane(&pos(a), &pos(b), &pos(c), &pos(d));
            if vol.abs() <= flat {
                continue;
            }
            self.tets.push(Tet::new(a, b, c, d));
        }

        // Fans hold every geometric face once per directed edge, aligned
        // with that edge; a face shared by two tets contributes one entry.
        let mut geo: AHashMap<[usize; 3], TetFace> = AHashMap::new();
        for tet in &self.tets {
            for f in tet.faces() {
                let mut key = f.nodes();
                key.sort_unstable();
                geo.entry(key).or_insert(f);
            }
        }
        for f in geo.into_values() {
            for g in [f, f.mate()] {
                for (ea, eb) in g.edges() {
                    self.edge_fans.entry((ea, eb)).or_default().push(g);
                }
            }
        }
        for fan in self.edge_fans.values_mut() {
            fan.sort_unstable_by_key(|f| f.canon());
        }
    }
}

fn sphere_of(pos: &impl Fn(usize) -> Point3, t: [usize; 4]) -> (Point3, f64) {
    kernel::circumsphere(&pos(t[0]), &pos(t[1]), &pos(t[2]), &pos(t[3]))
}
