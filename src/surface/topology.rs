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

//! Surface topology queries: face marks, fan walks around nodes, and
//! mark-based searches for faces referencing given nodes.

use crate::surface::basic_types::{Edge, FACE_MARK_MAX, Surface};

impl Surface {
    /// Clears all face marks by advancing the red and blue mark values.
    /// Marks are cleared lazily; face marks are zeroed only when a mark
    /// value reaches the end of its range.
    pub(crate) fn clear_face_marks(&mut self) {
        if self.mark_red == FACE_MARK_MAX || self.mark_blue == -FACE_MARK_MAX {
            self.mark_red = 0;
            self.mark_blue = 0;
            for face in &mut self.faces {
                face.mark = 0;
            }
        }
        self.mark_red += 1;
        self.mark_blue -= 1;
    }

    pub(crate) fn mark(&mut self, face: usize) {
        self.faces[face].mark = self.mark_red;
    }

    pub(crate) fn is_marked(&self, face: usize) -> bool {
        self.faces[face].mark == self.mark_red
    }

    pub(crate) fn mark_blue(&mut self, face: usize) {
        self.faces[face].mark = self.mark_blue;
    }

    pub(crate) fn is_marked_blue(&self, face: usize) -> bool {
        self.faces[face].mark == self.mark_blue
    }

    /// The face after `face` in the CCW fan around `node`; `face_prev`
    /// walks the fan CW.
    pub(crate) fn face_next(&self, node: usize, face: usize) -> Option<usize> {
        let p = self.node_position_in(face, node);
        self.faces[face].nabors[(p + 1) % 3]
    }

    pub(crate) fn face_prev(&self, node: usize, face: usize) -> Option<usize> {
        let p = self.node_position_in(face, node);
        self.faces[face].nabors[(p + 2) % 3]
    }

    fn node_position_in(&self, face: usize, node: usize) -> usize {
        self.faces[face]
            .mesh_face
            .position(node)
            .expect("node referenced by face")
    }

    /// Returns a face that references the specified node, or `None` if the
    /// node is not in the surface.
    pub fn find_face(&self, node: usize) -> Option<usize> {
        self.nodes[node].face
    }

    /// Returns a face that references both specified nodes, or `None` if
    /// no such face exists.
    pub fn find_face2(&mut self, n1: usize, n2: usize) -> Option<usize> {
        let f = self.nodes[n1].face?;
        self.clear_face_marks();
        self.find_face2_from(f, n1, n2)
    }

    fn find_face2_from(&mut self, face: usize, n1: usize, n2: usize) -> Option<usize> {
        self.mark(face);
        let mf = self.faces[face].mesh_face;
        if mf.references(n2) {
            return Some(face);
        }
        let p = mf.position(n1).expect("node referenced by face");
        let nabors = [
            self.faces[face].nabors[(p + 1) % 3],
            self.faces[face].nabors[(p + 2) % 3],
        ];
        for nabor in nabors {
            if let Some(g) = nabor
                && !self.is_marked(g)
                && let Some(found) = self.find_face2_from(g, n1, n2)
            {
                return Some(found);
            }
        }
        None
    }

    /// Returns the face that references all three specified nodes, or
    /// `None` if no such face exists.
    pub fn find_face3(&mut self, n1: usize, n2: usize, n3: usize) -> Option<usize> {
        let f = self.nodes[n1].face?;
        self.clear_face_marks();
        let face = self.find_face2_from(f, n1, n2)?;
        self.find_face3_from(face, n1, n2, n3)
    }

    // Walks across the edge (n1,n2) with blue marks, so the red marks of
    // the search that found the starting face need not be cleared.
    fn find_face3_from(&mut self, face: usize, n1: usize, n2: usize, n3: usize) -> Option<usize> {
        self.mark_blue(face);
        let mf = self.faces[face].mesh_face;
        let other = mf.other_node(n1, n2).expect("face references both nodes");
        if other == n3 {
            return Some(face);
        }
        let p = mf.position(other).expect("node referenced by face");
        if let Some(g) = self.faces[face].nabors[p]
            && !self.is_marked_blue(g)
        {
            return self.find_face3_from(g, n1, n2, n3);
        }
        None
    }

    /// Returns the directed edge AB between the specified nodes, or `None`
    /// if the nodes are not adjacent in the surface.
    pub fn find_edge(&mut self, a: usize, b: usize) -> Option<Edge> {
        let mesh_edge = self.mesh.find_edge(a, b)?;
        if let Some(ef) = self.edge_map.get(&mesh_edge) {
            return Some(ef.edge);
        }
        let face = self.find_face2(a, b)?;
        let mf = self.faces[face].mesh_face;
        let c = mf.other_node(a, b).expect("face references both nodes");
        if mf.in_order(a, b, c) {
            Some(self.make_edge(a, b, face))
        } else {
            None
        }
    }

    /// The faces that reference the specified node, gathered by a marked
    /// walk over its fan.
    pub fn get_face_nabors(&mut self, node: usize) -> Vec<usize> {
        let mut nabors = Vec::new();
        if let Some(f) = self.nodes[node].face {
            self.clear_face_marks();
            self.collect_face_nabors(node, f, &mut nabors);
        }
        nabors
    }

    fn collect_face_nabors(&mut self, node: usize, face: usize, nabors: &mut Vec<usize>) {
        self.mark(face);
        nabors.push(face);
        let p = self.node_position_in(face, node);
        let next = [
            self.faces[face].nabors[(p + 1) % 3],
            self.faces[face].nabors[(p + 2) % 3],
        ];
        for nabor in next {
            if let Some(g) = nabor
                && !self.is_marked(g)
            {
                self.collect_face_nabors(node, g, nabors);
            }
        }
    }

    /// Cursor over the faces that reference the specified node: CCW from
    /// the node's face until the fan closes or hits the boundary, then CW
    /// from the same face for the rest of an open fan.
    pub fn node_faces(&self, node: usize) -> NodeFaceIter<'_> {
        let face = self.nodes[node].face;
        NodeFaceIter {
            surf: self,
            node,
            start: face,
            next: face,
            ccw: true,
        }
    }

    /// Constructs the directed edge AB with the specified face on one side;
    /// the face on the other side, if any, is the face's nabor opposite the
    /// third node.
    pub(crate) fn make_edge(&self, a: usize, b: usize, face: usize) -> Edge {
        debug_assert!(self.mesh.find_edge(a, b).is_some(), "mesh has the edge");
        let mf = self.faces[face].mesh_face;
        let c = mf.other_node(a, b).expect("face references edge");
        let nabor = self.face_nabor(face, c);
        if mf.in_order(a, b, c) {
            Edge { a, b, left: Some(face), right: nabor }
        } else {
            Edge { a, b, left: nabor, right: Some(face) }
        }
    }

    /// The nabor of the specified face opposite the specified node.
    pub fn face_nabor(&self, face: usize, node: usize) -> Option<usize> {
        let p = self.node_position_in(face, node);
        self.faces[face].nabors[p]
    }

    /// The node to the left of the edge, in the edge's left face.
    pub fn edge_node_left(&self, edge: Edge) -> Option<usize> {
        edge.left.map(|f| {
            self.faces[f]
                .mesh_face
                .other_node(edge.a, edge.b)
                .expect("face references edge")
        })
    }

    /// The node to the right of the edge, in the edge's right face.
    pub fn edge_node_right(&self, edge: Edge) -> Option<usize> {
        edge.right.map(|f| {
            self.faces[f]
                .mesh_face
                .other_node(edge.a, edge.b)
                .expect("face references edge")
        })
    }

    /// The edge directed opposite to the specified edge.
    pub fn edge_mate(&self, edge: Edge) -> Edge {
        match edge.right {
            Some(f) => self.make_edge(edge.b, edge.a, f),
            None => Edge { a: edge.b, b: edge.a, left: None, right: None },
        }
    }

    /// Sets the nabor of `face` opposite `node` to `face_nabor`, and the
    /// nabor of `face_nabor` opposite `node_nabor` back to `face`.
    pub(crate) fn link_faces(
        &mut self,
        face: Option<usize>,
        node: usize,
        face_nabor: Option<usize>,
        node_nabor: Option<usize>,
    ) {
        if let Some(f) = face {
            let p = self.node_position_in(f, node);
            self.faces[f].nabors[p] = face_nabor;
        }
        if let Some(g) = face_nabor {
            let n = node_nabor.expect("nabor node specified with nabor face");
            let p = self.node_position_in(g, n);
            self.faces[g].nabors[p] = face;
        }
    }

    /// Checks the structural invariants of the surface; panics on any
    /// inconsistency. Intended for tests and diagnostics.
    pub fn validate(&self) {
        for n in self.mesh.node_ids() {
            let node = &self.nodes[n];
            if let Some(f) = node.face {
                assert!(self.faces[f].references(n), "node face references node");
            }
            match (node.edge_before, node.edge_after) {
                (None, None) => {}
                (Some(eb), Some(ea)) => {
                    assert!(node.is_in_surface(), "boundary node is in surface");
                    assert_eq!(eb.b, n, "edge before ends at node");
                    assert_eq!(ea.a, n, "edge after starts at node");
                    let prev = self.nodes[eb.a].edge_after.expect("boundary chain links");
                    assert_eq!(prev.b, n, "previous node chains forward");
                    let next = self.nodes[ea.b].edge_before.expect("boundary chain links");
                    assert_eq!(next.a, n, "next node chains backward");
                }
                _ => panic!("node has both boundary edges or neither"),
            }
        }
        for (&mf, &f) in &self.face_map {
            assert_eq!(self.faces[f].mesh_face, mf, "face map is consistent");
            let ns = self.faces[f].nodes();
            for (i, &n) in ns.iter().enumerate() {
                assert!(self.nodes[n].is_in_surface(), "face node is in surface");
                match self.faces[f].nabors[i] {
                    Some(g) => {
                        assert!(
                            self.faces[g].nabors.contains(&Some(f)),
                            "face nabors are symmetric"
                        );
                    }
                    None => {
                        let a = ns[(i + 1) % 3];
                        let b = ns[(i + 2) % 3];
                        assert!(self.nodes[a].is_on_boundary(), "open edge is on boundary");
                        assert!(self.nodes[b].is_on_boundary(), "open edge is on boundary");
                    }
                }
            }
        }
    }
}

/// Forward-only iterator over the faces referencing one node.
pub struct NodeFaceIter<'a> {
    surf: &'a Surface,
    node: usize,
    start: Option<usize>,
    next: Option<usize>,
    ccw: bool,
}

impl<'a> NodeFaceIter<'a> {
    fn load_next(&mut self) {
        if self.ccw {
            let cur = self.next.expect("iterator has a current face");
            self.next = self.surf.face_next(self.node, cur);
            if self.next.is_none() {
                self.ccw = false;
                self.next = self.start;
            } else if self.next == self.start {
                self.next = None;
            }
        }
        if !self.ccw
            && let Some(cur) = self.next
        {
            self.next = self.surf.face_prev(self.node, cur);
        }
    }
}

impl<'a> Iterator for NodeFaceIter<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let face = self.next?;
        self.load_next();
        Some(face)
    }
}
