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

//! Public maintenance and query interface of the surface.

use crate::geometry::{Point3, Vector3};
use crate::surface::basic_types::{Face, Node, SurfParams, Surface};

impl Surface {
    pub fn new() -> Self {
        Surface::default()
    }

    pub fn with_params(params: SurfParams) -> Self {
        Surface {
            params,
            ..Surface::default()
        }
    }

    pub fn params(&self) -> &SurfParams {
        &self.params
    }

    /// Adds a node at the specified position and rebuilds the surface.
    /// Returns `None` if a node with those exact coordinates is already
    /// present.
    pub fn add_node(&mut self, p: Point3) -> Option<usize> {
        let id = self.mesh.add_node(p)?;
        self.grow_node_arena();
        self.nodes[id] = Node::default();
        self.rebuild();
        Some(id)
    }

    /// Adds the specified nodes, rebuilding the surface once if any were
    /// added. Returns true if all were added.
    pub fn add_nodes(&mut self, points: &[Point3]) -> bool {
        let mut added = 0;
        for &p in points {
            if let Some(id) = self.mesh.add_node(p) {
                self.grow_node_arena();
                self.nodes[id] = Node::default();
                added += 1;
            }
        }
        if added > 0 {
            self.rebuild();
        }
        added == points.len()
    }

    /// Removes the specified node and rebuilds the surface. Returns false
    /// if the node is not present.
    pub fn remove_node(&mut self, node: usize) -> bool {
        let removed = self.mesh.remove_node(node);
        if removed {
            self.rebuild();
        }
        removed
    }

    /// Removes the specified nodes, rebuilding the surface once if any were
    /// removed. Returns true if all were removed.
    pub fn remove_nodes(&mut self, nodes: &[usize]) -> bool {
        let mut removed = 0;
        for &n in nodes {
            if self.mesh.remove_node(n) {
                removed += 1;
            }
        }
        if removed > 0 {
            self.rebuild();
        }
        removed == nodes.len()
    }

    fn grow_node_arena(&mut self) {
        let capacity = self.mesh.node_capacity();
        if self.nodes.len() < capacity {
            self.nodes.resize_with(capacity, Node::default);
        }
    }

    pub fn count_nodes(&self) -> usize {
        self.mesh.count_nodes()
    }

    pub fn count_faces(&self) -> usize {
        self.face_map.len()
    }

    /// Ids of the nodes in the surface's point set, in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = usize> + '_ {
        self.mesh.node_ids()
    }

    /// Ids of the faces currently in the surface, in no particular order.
    pub fn faces(&self) -> impl Iterator<Item = usize> + '_ {
        self.face_map.values().copied()
    }

    pub fn node(&self, node: usize) -> &Node {
        &self.nodes[node]
    }

    pub fn node_mut(&mut self, node: usize) -> &mut Node {
        &mut self.nodes[node]
    }

    pub fn face(&self, face: usize) -> &Face {
        &self.faces[face]
    }

    pub fn face_mut(&mut self, face: usize) -> &mut Face {
        &mut self.faces[face]
    }

    pub fn node_index(&self, node: usize) -> i64 {
        self.nodes[node].index
    }

    pub fn set_node_index(&mut self, node: usize, index: i64) {
        self.nodes[node].index = index;
    }

    pub fn face_index(&self, face: usize) -> i64 {
        self.faces[face].index
    }

    pub fn set_face_index(&mut self, face: usize, index: i64) {
        self.faces[face].index = index;
    }

    pub fn position(&self, node: usize) -> Point3 {
        self.mesh.position(node)
    }

    /// The node nearest to the specified point.
    pub fn find_node_nearest(&self, x: f64, y: f64, z: f64) -> Option<usize> {
        self.mesh.find_node_nearest(x, y, z)
    }

    pub fn count_node_faces(&self, node: usize) -> usize {
        self.node_faces(node).count()
    }

    /// Area-weighted average unit normal of the faces referencing the node,
    /// or the zero vector if the node is not in the surface.
    pub fn node_normal(&self, node: usize) -> Vector3 {
        let mut sum = Vector3::zero();
        for f in self.node_faces(node) {
            let (v, area) = self.face_normal_area(f);
            sum = sum + v * area;
        }
        sum.normalized()
    }

    /// Unit normal and area of the face.
    pub fn face_normal_area(&self, face: usize) -> (Vector3, f64) {
        self.mesh.face_normal(self.faces[face].mesh_face)
    }

    pub fn face_normal(&self, face: usize) -> Vector3 {
        self.face_normal_area(face).0
    }

    pub fn face_area(&self, face: usize) -> f64 {
        self.face_normal_area(face).1
    }

    /// Center and squared radius of the face's circumcircle.
    pub fn face_center_circle(&self, face: usize) -> (Point3, f64) {
        self.mesh.face_center_circle(self.faces[face].mesh_face)
    }
}
