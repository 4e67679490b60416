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

//! Advancing-front reconstruction: seeding, grading, and stitching of
//! candidate mesh faces into the surface.

use smallvec::SmallVec;

use crate::delaunay::TetFace;
use crate::surface::basic_types::{Edge, EdgeFace, Face, QueueKey, Surface};

impl Surface {
    /// Rebuilds the surface from scratch for the current tet mesh: resets
    /// all surface state, recomputes the candidate face set, then grows
    /// surface parts until no candidates remain.
    pub fn rebuild(&mut self) {
        self.init_candidates();
        while self.surf() {}
    }

    /// Resets all surface state and fills the candidate set with the faces
    /// of the current tets, one orientation per geometric face.
    fn init_candidates(&mut self) {
        self.faces.clear();
        self.face_set.clear();
        self.face_map.clear();
        self.edge_map.clear();
        self.edge_queue.clear();
        for node in &mut self.nodes {
            node.face = None;
            node.edge_before = None;
            node.edge_after = None;
        }
        for tet in self.mesh.tets() {
            for mf in tet.faces() {
                if !self.face_set.contains(&mf.mate()) {
                    self.face_set.insert(mf);
                }
            }
        }
    }

    /// Creates one part of the surface, seeded with the candidate face of
    /// smallest circumradius and grown by stitching until every boundary
    /// edge is resolved or skipped. Candidates referencing nodes now in the
    /// surface are then pruned. Returns true if any faces were created.
    pub(crate) fn surf(&mut self) -> bool {
        let nface = self.count_faces();
        if self.face_set.is_empty() {
            return false;
        }

        let mut seed: Option<(f64, (usize, usize, usize), TetFace)> = None;
        for &mf in &self.face_set {
            let (_, rr) = self.mesh.face_center_circle(mf);
            let canon = mf.canon();
            if seed.is_none_or(|(srr, scanon, _)| (rr, canon) < (srr, scanon)) {
                seed = Some((rr, canon, mf));
            }
        }
        let (_, _, seed) = seed.expect("candidate set is not empty");
        let face = self.create_face(seed);
        self.init_face(face);

        let mut cur = self.best_key();
        while let Some(key) = cur {
            let ef = *self.edge_map.get(&key.edge).expect("queued edge is mapped");
            if ef.face.is_none() {
                break;
            }
            cur = if self.stitch(ef) {
                self.best_key()
            } else {
                self.next_key(key)
            };
        }

        let doomed: Vec<TetFace> = self
            .face_set
            .iter()
            .filter(|mf| mf.nodes().iter().any(|&n| self.nodes[n].is_in_surface()))
            .copied()
            .collect();
        for mf in doomed {
            self.face_set.remove(&mf);
        }

        self.count_faces() > nface
    }

    fn best_key(&self) -> Option<QueueKey> {
        self.edge_queue.last().copied()
    }

    fn next_key(&self, key: QueueKey) -> Option<QueueKey> {
        self.edge_queue.range(..key).next_back().copied()
    }

    pub(crate) fn create_face(&mut self, mesh_face: TetFace) -> usize {
        self.faces.push(Face {
            index: 0,
            mesh_face,
            nabors: [None; 3],
            mark: 0,
        });
        self.faces.len() - 1
    }

    /// Grades the specified boundary edge and records it in the edge map
    /// and queue.
    fn add_edge(&mut self, edge: Edge) -> EdgeFace {
        let edge_face = self.make_edge_face(edge);
        let old = self.edge_map.insert((edge.a, edge.b), edge_face);
        debug_assert!(old.is_none(), "edge was not mapped");
        let added = self.edge_queue.insert(QueueKey {
            grade: edge_face.grade,
            edge: (edge.a, edge.b),
        });
        debug_assert!(added, "edge-face was not in queue");
        edge_face
    }

    fn remove_edge(&mut self, edge: Edge) {
        let edge_face = self.edge_map.remove(&(edge.a, edge.b));
        let edge_face = edge_face.expect("edge was mapped");
        let removed = self.edge_queue.remove(&QueueKey {
            grade: edge_face.grade,
            edge: (edge.a, edge.b),
        });
        debug_assert!(removed, "edge-face was in queue");
    }

    /// Moves the face from the candidate set into the surface. Either the
    /// face or its mate must still be a candidate.
    fn register_face(&mut self, face: usize) {
        let mf = self.faces[face].mesh_face;
        let removed = self.face_set.remove(&mf) || self.face_set.remove(&mf.mate());
        debug_assert!(removed, "face not already in surface");
        let old = self.face_map.insert(mf, face);
        debug_assert!(old.is_none(), "face not already in surface");
    }

    /// Computes the best candidate face for the left side of the specified
    /// boundary edge. The candidate's grade rises with falling circumradius
    /// and falls as its normal bends away from the normal of the face on
    /// the edge's right side.
    fn make_edge_face(&mut self, edge: Edge) -> EdgeFace {
        debug_assert!(edge.is_on_boundary());
        let na = edge.a;
        let nb = edge.b;

        // Mesh face incident on the right side is already in the surface.
        let right = edge.right.expect("boundary edge has a right face");
        let right_mf = self.faces[right].mesh_face;
        let (v, _) = self.mesh.face_normal(right_mf);
        let mf_mate = right_mf.mate();

        let mut rr_best = f64::MAX;
        let mut vv_best = -1.0;
        let mut mf_best: Option<TetFace> = None;

        let nabors: SmallVec<[TetFace; 4]> =
            self.mesh.face_nabors(na, nb).iter().copied().collect();
        for mf in nabors {
            // Ignore the mate of the face already in the surface.
            if mf == mf_mate {
                continue;
            }
            let nc = if mf.c == na {
                mf.b
            } else if mf.c == nb {
                mf.a
            } else {
                mf.c
            };
            if self.valid_for_face(na, nb, nc) {
                let (vi, _) = self.mesh.face_normal(mf);
                let vv = v.dot(&vi);
                if vv > self.params.vv_sliver {
                    let (_, rr) = self.mesh.face_center_circle(mf);
                    if rr < rr_best {
                        rr_best = rr;
                        vv_best = vv;
                        mf_best = Some(mf);
                    }
                }
            }
        }

        debug_assert!(mf_best.is_none_or(|mf| !self.face_map.contains_key(&mf)));
        let grade = self.params.grade(vv_best, rr_best);
        let face = if grade <= 0.0 { None } else { mf_best };
        EdgeFace { edge, face, grade }
    }

    /// Determines whether nodes A, B, and C would form a valid new face,
    /// where A and B are a boundary edge and C is the candidate's third
    /// node.
    fn valid_for_face(&mut self, na: usize, nb: usize, nc: usize) -> bool {
        !self.nodes[nc].is_in_surface()
            || self.nodes[nc].is_on_boundary()
                && !self.has_internal_edge(nb, nc)
                && !self.has_internal_edge(nc, na)
    }

    /// An internal edge is not on the boundary; it has two nabor faces.
    fn has_internal_edge(&mut self, na: usize, nb: usize) -> bool {
        let Some(face) = self.find_face2(na, nb) else {
            return false;
        };
        let other = self.faces[face]
            .mesh_face
            .other_node(na, nb)
            .expect("face references both nodes");
        self.face_nabor(face, other).is_some()
    }

    /// Initializes a new part of the surface with a single seed face.
    fn init_face(&mut self, face: usize) {
        self.faces[face].nabors = [None; 3];
        let [na, nb, nc] = self.faces[face].nodes();
        self.nodes[na].face = Some(face);
        self.nodes[nb].face = Some(face);
        self.nodes[nc].face = Some(face);
        let edge_cb = self.make_edge(nc, nb, face);
        let edge_ba = self.make_edge(nb, na, face);
        let edge_ac = self.make_edge(na, nc, face);
        self.nodes[na].edge_before = Some(edge_ba);
        self.nodes[nb].edge_before = Some(edge_cb);
        self.nodes[nc].edge_before = Some(edge_ac);
        self.nodes[na].edge_after = Some(edge_ac);
        self.nodes[nb].edge_after = Some(edge_ba);
        self.nodes[nc].edge_after = Some(edge_cb);
        self.add_edge(edge_cb);
        self.add_edge(edge_ba);
        self.add_edge(edge_ac);
        self.register_face(face);
    }

    /// Extends the surface boundary across the specified edge with a face
    /// whose third node is not yet in the surface.
    fn extend(&mut self, edge: Edge, face: usize) {
        debug_assert!(edge.is_on_boundary());
        let na = edge.a;
        let nb = edge.b;
        let nc = self.faces[face]
            .mesh_face
            .other_node(na, nb)
            .expect("face references edge");
        self.nodes[nc].face = Some(face);
        self.link_faces(Some(face), nc, edge.right, self.edge_node_right(edge));
        let edge_ac = self.make_edge(na, nc, face);
        let edge_cb = self.make_edge(nc, nb, face);
        self.nodes[na].edge_after = Some(edge_ac);
        self.nodes[nb].edge_before = Some(edge_cb);
        self.nodes[nc].edge_after = Some(edge_cb);
        self.nodes[nc].edge_before = Some(edge_ac);
        self.remove_edge(edge);
        self.register_face(face);
        self.add_edge(edge_ac);
        self.add_edge(edge_cb);
    }

    /// Fills a two-edge notch in the boundary: the face's third node is the
    /// boundary node right before node A or right after node B.
    fn fill_ear(&mut self, edge: Edge, face: usize) {
        let na = edge.a;
        let nb = edge.b;
        let nc = self.faces[face]
            .mesh_face
            .other_node(na, nb)
            .expect("face references edge");
        let edge1 = self.nodes[nc].edge_before.expect("ear node is on boundary");
        let edge2 = self.nodes[nc].edge_after.expect("ear node is on boundary");
        let node1 = edge1.a;
        let node2 = edge2.b;
        if node2 == na {
            self.link_faces(Some(face), nc, edge.right, self.edge_node_right(edge));
            self.link_faces(Some(face), nb, edge2.right, self.edge_node_right(edge2));
            let edge_cb = self.make_edge(nc, nb, face);
            self.nodes[nc].edge_after = Some(edge_cb);
            self.nodes[nb].edge_before = Some(edge_cb);
            self.nodes[na].edge_after = None;
            self.nodes[na].edge_before = None;
            self.remove_edge(edge);
            self.remove_edge(edge2);
            self.register_face(face);
            self.add_edge(edge_cb);
        } else if node1 == nb {
            self.link_faces(Some(face), nc, edge.right, self.edge_node_right(edge));
            self.link_faces(Some(face), na, edge1.right, self.edge_node_right(edge1));
            let edge_ac = self.make_edge(na, nc, face);
            self.nodes[na].edge_after = Some(edge_ac);
            self.nodes[nc].edge_before = Some(edge_ac);
            self.nodes[nb].edge_after = None;
            self.nodes[nb].edge_before = None;
            self.remove_edge(edge);
            self.remove_edge(edge1);
            self.register_face(face);
            self.add_edge(edge_ac);
        } else {
            debug_assert!(false, "ear is valid");
        }
    }

    /// Fills a three-edge hole in the boundary with the specified face.
    fn fill_hole(&mut self, edge: Edge, face: usize) {
        let edge_ab = edge;
        let edge_bc = self.nodes[edge.b].edge_after.expect("node B is on boundary");
        let edge_ca = self.nodes[edge.a].edge_before.expect("node A is on boundary");
        debug_assert!(edge_ab.is_on_boundary());
        debug_assert!(edge_bc.is_on_boundary());
        debug_assert!(edge_ca.is_on_boundary());
        let face_ab = edge_ab.right.expect("boundary edge has a right face");
        let face_bc = edge_bc.right.expect("boundary edge has a right face");
        let face_ca = edge_ca.right.expect("boundary edge has a right face");
        let na = edge_ab.a;
        let nb = edge_bc.a;
        let nc = edge_ca.a;
        let other = |f: usize, x: usize, y: usize| {
            self.faces[f]
                .mesh_face
                .other_node(x, y)
                .expect("face references edge")
        };
        let nabor_a = other(face_bc, nb, nc);
        let nabor_b = other(face_ca, na, nc);
        let nabor_c = other(face_ab, na, nb);
        self.link_faces(Some(face), na, Some(face_bc), Some(nabor_a));
        self.link_faces(Some(face), nb, Some(face_ca), Some(nabor_b));
        self.link_faces(Some(face), nc, Some(face_ab), Some(nabor_c));
        self.nodes[na].edge_before = None;
        self.nodes[nb].edge_before = None;
        self.nodes[nc].edge_before = None;
        self.nodes[na].edge_after = None;
        self.nodes[nb].edge_after = None;
        self.nodes[nc].edge_after = None;
        self.remove_edge(edge_ab);
        self.remove_edge(edge_bc);
        self.remove_edge(edge_ca);
        self.register_face(face);
    }

    /// Returns a valid twin with grade higher than the specified edge-face,
    /// or `None` if no such twin exists. Regrades any twin edge it probes.
    fn find_twin(&mut self, edge_face: EdgeFace) -> Option<EdgeFace> {
        let edge = edge_face.edge;
        let face = edge_face.face.expect("edge-face has a candidate face");
        let grade = edge_face.grade;
        let na = edge.a;
        let nb = edge.b;
        let nc = face.other_node(na, nb).expect("face references edge");
        debug_assert!(self.nodes[na].is_on_boundary());
        debug_assert!(self.nodes[nb].is_on_boundary());
        debug_assert!(self.nodes[nc].is_on_boundary());

        let node1 = self.nodes[nc].edge_before.expect("node C is on boundary").a;
        debug_assert!(node1 != na);
        debug_assert!(node1 != nb);
        if self.nodes[node1].is_on_boundary() {
            let edge_twin = self.nodes[node1].edge_after.expect("node 1 is on boundary");
            debug_assert!(edge_twin.b == nc);
            self.remove_edge(edge_twin);
            let ef_twin = self.add_edge(edge_twin);
            if let Some(face_twin) = ef_twin.face
                && face_twin.in_order(node1, nc, nb)
                && ef_twin.grade > grade
            {
                return Some(ef_twin);
            }
        }

        let node2 = self.nodes[nc].edge_after.expect("node C is on boundary").b;
        debug_assert!(node2 != na);
        debug_assert!(node2 != nb);
        if self.nodes[node2].is_on_boundary() {
            let edge_twin = self.nodes[node2].edge_before.expect("node 2 is on boundary");
            debug_assert!(edge_twin.a == nc);
            self.remove_edge(edge_twin);
            let ef_twin = self.add_edge(edge_twin);
            if let Some(face_twin) = ef_twin.face
                && face_twin.in_order(node2, na, nc)
                && ef_twin.grade > grade
            {
                return Some(ef_twin);
            }
        }

        None
    }

    /// Glues the specified edge and face to the twin edge and face.
    fn glue(&mut self, edge: Edge, face: usize, edge_twin: Edge, face_twin: usize) {
        let na = edge.a;
        let nb = edge.b;
        let nc = self.faces[face]
            .mesh_face
            .other_node(na, nb)
            .expect("face references edge");
        debug_assert!(self.nodes[na].is_on_boundary());
        debug_assert!(self.nodes[nb].is_on_boundary());
        debug_assert!(self.nodes[nc].is_on_boundary());

        // Remove edge and its twin; add face and its twin.
        self.remove_edge(edge);
        self.remove_edge(edge_twin);
        self.register_face(face);
        self.register_face(face_twin);

        // If face is ABC and its twin is ACD, ...
        if self.faces[face_twin].references(na) {
            let nd = self.nodes[nc].edge_after.expect("node C is on boundary").b;
            debug_assert!(self.nodes[nd].is_on_boundary());

            // If face twin closes a hole, fill it; else it fills an ear.
            if self.nodes[nd].edge_after == self.nodes[na].edge_before {
                let edge_da = self.nodes[nd].edge_after.expect("node D is on boundary");
                self.nodes[na].edge_before = None;
                self.nodes[nd].edge_before = None;
                self.nodes[na].edge_after = None;
                self.nodes[nd].edge_after = None;
                self.remove_edge(edge_da);
            } else {
                let edge_ad = self.make_edge(na, nd, face_twin);
                self.nodes[na].edge_after = Some(edge_ad);
                self.nodes[nd].edge_before = Some(edge_ad);
                self.add_edge(edge_ad);
            }

            let edge_cb = self.make_edge(nc, nb, face);
            self.nodes[nc].edge_after = Some(edge_cb);
            self.nodes[nb].edge_before = Some(edge_cb);
            self.add_edge(edge_cb);
            self.link_faces(Some(face), nb, Some(face_twin), Some(nd));
            self.link_faces(Some(face), nc, edge.right, self.edge_node_right(edge));
            self.link_faces(
                Some(face_twin),
                na,
                edge_twin.right,
                self.edge_node_right(edge_twin),
            );
        }
        // Else if face is ABC and its twin is BDC, ...
        else if self.faces[face_twin].references(nb) {
            let nd = self.nodes[nc].edge_before.expect("node C is on boundary").a;
            debug_assert!(self.nodes[nd].is_on_boundary());

            if self.nodes[nd].edge_before == self.nodes[nb].edge_after {
                let edge_bd = self.nodes[nd].edge_before.expect("node D is on boundary");
                self.nodes[nb].edge_before = None;
                self.nodes[nd].edge_before = None;
                self.nodes[nb].edge_after = None;
                self.nodes[nd].edge_after = None;
                self.remove_edge(edge_bd);
            } else {
                let edge_db = self.make_edge(nd, nb, face_twin);
                self.nodes[nd].edge_after = Some(edge_db);
                self.nodes[nb].edge_before = Some(edge_db);
                self.add_edge(edge_db);
            }

            let edge_ac = self.make_edge(na, nc, face);
            self.nodes[na].edge_after = Some(edge_ac);
            self.nodes[nc].edge_before = Some(edge_ac);
            self.add_edge(edge_ac);
            self.link_faces(Some(face), na, Some(face_twin), Some(nd));
            self.link_faces(Some(face), nc, edge.right, self.edge_node_right(edge));
            self.link_faces(
                Some(face_twin),
                nb,
                edge_twin.right,
                self.edge_node_right(edge_twin),
            );
        }
    }

    /// Tries to stitch the candidate face of the specified edge-face into
    /// the surface at its boundary edge. Returns true if the surface or the
    /// edge's grading changed.
    fn stitch(&mut self, edge_face: EdgeFace) -> bool {
        let edge = edge_face.edge;
        let cand = edge_face.face.expect("edge-face has a candidate face");

        // Nodes A and B of the edge, and the other node C in the face.
        let na = edge.a;
        let nb = edge.b;
        let nc = cand.other_node(na, nb).expect("face references edge");

        // If the face is no longer valid, regrade the edge.
        if !self.valid_for_face(na, nb, nc) {
            self.remove_edge(edge);
            self.add_edge(edge);
            return true;
        }

        // If node C is not in the surface, then extend.
        if !self.nodes[nc].is_in_surface() {
            let face = self.create_face(cand);
            self.extend(edge, face);
            true
        }
        // Else if node C is on the surface boundary, ...
        else if self.nodes[nc].is_on_boundary() {
            // Nabor nodes 1 and 2 of node C, also on the surface boundary.
            let node1 = self.nodes[nc].edge_before.expect("node C is on boundary").a;
            let node2 = self.nodes[nc].edge_after.expect("node C is on boundary").b;

            // If both edge nodes A and B are nabors of node C, fill hole.
            if node1 == nb && node2 == na {
                let face = self.create_face(cand);
                self.fill_hole(edge, face);
                true
            }
            // Else if either node A or node B is a nabor of node C, fill ear.
            else if node1 == nb || node2 == na {
                let face = self.create_face(cand);
                self.fill_ear(edge, face);
                true
            }
            // Else glue, if the face has a valid twin with a higher grade.
            else if let Some(ef_twin) = self.find_twin(edge_face) {
                let twin_cand = ef_twin.face.expect("twin has a candidate face");
                let face = self.create_face(cand);
                let face_twin = self.create_face(twin_cand);
                self.glue(edge, face, ef_twin.edge, face_twin);
                true
            } else {
                false
            }
        }
        // Else the face is not valid, and we should not be here.
        else {
            debug_assert!(false, "valid face for extend, fill ear, fill hole, or glue");
            false
        }
    }
}
