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

use std::collections::HashMap;

use trisurf::geometry::Point3;
use trisurf::surface::{SurfParams, Surface};

fn points(coords: &[[f64; 3]]) -> Vec<Point3> {
    coords.iter().map(|&[x, y, z]| Point3::new(x, y, z)).collect()
}

// Corners of a regular tetrahedron.
fn tetra_points() -> Vec<Point3> {
    points(&[
        [1.0, 1.0, 1.0],
        [1.0, -1.0, -1.0],
        [-1.0, 1.0, -1.0],
        [-1.0, -1.0, 1.0],
    ])
}

// A slightly irregular planar quad over one auxiliary point. The auxiliary
// point goes in first so that no intermediate point set is coplanar.
fn quad_points() -> Vec<Point3> {
    points(&[
        [0.5, 0.5, -2.0],
        [0.0, 0.0, 0.0],
        [1.1, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
    ])
}

fn count_boundary_nodes(surf: &Surface) -> usize {
    surf.nodes().filter(|&n| surf.node(n).is_on_boundary()).count()
}

// Every directed edge of every face appears once, and in a closed surface
// its reverse appears in exactly one other face.
fn assert_closed_and_consistent(surf: &Surface) {
    let mut owner: HashMap<(usize, usize), usize> = HashMap::new();
    for f in surf.faces() {
        let [a, b, c] = surf.face(f).nodes();
        for (x, y) in [(a, b), (b, c), (c, a)] {
            assert!(owner.insert((x, y), f).is_none(), "edge in one face only");
        }
    }
    for (&(x, y), &f) in &owner {
        let g = owner.get(&(y, x)).copied().expect("reverse edge exists");
        assert_ne!(f, g, "reverse edge is in another face");
    }
}

// Length of the boundary loop through the specified node.
fn boundary_loop_len(surf: &Surface, start: usize) -> usize {
    let mut n = start;
    let mut len = 0;
    loop {
        let e = surf.node(n).edge_after().expect("node is on boundary");
        assert_eq!(e.node_a(), n);
        n = e.node_b();
        len += 1;
        if n == start {
            return len;
        }
        assert!(len <= surf.count_nodes(), "boundary loop closes");
    }
}

#[test]
fn test_empty_and_sparse_surfaces() {
    let mut surf = Surface::new();
    assert_eq!(surf.count_nodes(), 0);
    assert_eq!(surf.count_faces(), 0);

    assert!(surf.add_nodes(&points(&[
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
    ])));
    assert_eq!(surf.count_nodes(), 3);
    assert_eq!(surf.count_faces(), 0);
    for n in 0..3 {
        assert!(!surf.node(n).is_in_surface());
    }
    surf.validate();
}

#[test]
fn test_coplanar_points_make_no_faces() {
    let mut surf = Surface::new();
    assert!(surf.add_nodes(&points(&[
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.3, 0.6, 0.0],
    ])));
    assert_eq!(surf.count_faces(), 0);
    surf.validate();
}

#[test]
fn test_default_params_leave_single_face() {
    // The dihedral bend between adjacent faces of a regular tetrahedron is
    // too sharp for the default thresholds, so the seed face stays alone.
    let mut surf = Surface::new();
    assert!(surf.add_nodes(&tetra_points()));
    assert_eq!(surf.count_faces(), 1);
    assert_eq!(count_boundary_nodes(&surf), 3);

    let in_surface: Vec<usize> = surf
        .nodes()
        .filter(|&n| surf.node(n).is_in_surface())
        .collect();
    assert_eq!(in_surface.len(), 3);
    assert_eq!(boundary_loop_len(&surf, in_surface[0]), 3);
    surf.validate();
}

#[test]
fn test_relaxed_threshold_closes_tetrahedron() {
    let params = SurfParams {
        vv_large: -0.5,
        ..SurfParams::default()
    };
    let mut surf = Surface::with_params(params);
    assert!(surf.add_nodes(&tetra_points()));

    assert_eq!(surf.count_faces(), 4);
    assert_eq!(count_boundary_nodes(&surf), 0);
    for n in surf.nodes().collect::<Vec<_>>() {
        assert!(surf.node(n).is_in_surface());
        assert_eq!(surf.count_node_faces(n), 3);
        assert_eq!(surf.get_face_nabors(n).len(), 3);
        // Unit normal, aligned with the direction from the centroid.
        let v = surf.node_normal(n);
        assert!((v.norm() - 1.0).abs() < 1.0e-9);
        let r = surf.position(n).vector_to(&Point3::new(0.0, 0.0, 0.0));
        assert!(v.dot(&r).abs() > 0.5);
    }
    assert_closed_and_consistent(&surf);
    surf.validate();

    // Every face is closed: three nabors, findable from its own nodes.
    for f in surf.faces().collect::<Vec<_>>() {
        assert!(surf.face(f).nabors().iter().all(|n| n.is_some()));
        let [a, b, c] = surf.face(f).nodes();
        assert_eq!(surf.find_face3(a, b, c), Some(f));
        let g = surf.find_face2(a, b).expect("nodes share a face");
        assert!(surf.face(g).references(a) && surf.face(g).references(b));
    }
}

#[test]
fn test_planar_quad_reconstructs_two_faces() {
    let mut surf = Surface::new();
    assert!(surf.add_nodes(&quad_points()));

    // The two top triangles only; the auxiliary point stays out.
    assert_eq!(surf.count_faces(), 2);
    assert!(!surf.node(0).is_in_surface());
    for n in 1..5 {
        assert!(surf.node(n).is_in_surface());
        assert!(surf.node(n).is_on_boundary());
    }
    assert_eq!(count_boundary_nodes(&surf), 4);
    assert_eq!(boundary_loop_len(&surf, 1), 4);

    // The quad splits along its Delaunay diagonal.
    assert_eq!(surf.count_node_faces(1), 2);
    assert_eq!(surf.count_node_faces(2), 1);
    assert_eq!(surf.count_node_faces(3), 2);
    assert_eq!(surf.count_node_faces(4), 1);

    let total_area: f64 = surf
        .faces()
        .collect::<Vec<_>>()
        .into_iter()
        .map(|f| surf.face_area(f))
        .sum();
    assert!((total_area - 1.05).abs() < 1.0e-9);
    surf.validate();
}

#[test]
fn test_find_edge_on_boundary() {
    let mut surf = Surface::new();
    assert!(surf.add_nodes(&quad_points()));

    let e = surf.node(2).edge_after().expect("node is on boundary");
    let found = surf.find_edge(e.node_a(), e.node_b()).expect("edge exists");
    assert_eq!(found.node_a(), e.node_a());
    assert_eq!(found.node_b(), e.node_b());
    assert!(found.is_in_surface());
    assert!(found.is_on_boundary());

    // The auxiliary node is not adjacent to anything in the surface.
    assert!(surf.find_edge(0, 2).is_none());
}

#[test]
fn test_rebuild_is_idempotent() {
    let mut surf = Surface::new();
    assert!(surf.add_nodes(&quad_points()));
    let faces_before = surf.count_faces();
    surf.rebuild();
    assert_eq!(surf.count_faces(), faces_before);
    assert_eq!(count_boundary_nodes(&surf), 4);
    surf.validate();
}

#[test]
fn test_remove_and_readd_node() {
    let mut surf = Surface::new();
    assert!(surf.add_nodes(&quad_points()));
    assert_eq!(surf.count_faces(), 2);

    assert!(surf.remove_node(4));
    assert_eq!(surf.count_nodes(), 4);
    surf.validate();
    assert!(!surf.remove_node(4));

    let id = surf.add_node(Point3::new(0.0, 1.0, 0.0));
    assert_eq!(id, Some(4));
    assert_eq!(surf.count_faces(), 2);
    assert!(!surf.node(0).is_in_surface());
    surf.validate();
}

#[test]
fn test_duplicate_node_rejected() {
    let mut surf = Surface::new();
    assert!(surf.add_node(Point3::new(1.0, 2.0, 3.0)).is_some());
    assert!(surf.add_node(Point3::new(1.0, 2.0, 3.0)).is_none());
    assert!(!surf.add_nodes(&points(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]])));
    assert_eq!(surf.count_nodes(), 2);
}

#[test]
fn test_find_node_nearest() {
    let mut surf = Surface::new();
    assert!(surf.add_nodes(&tetra_points()));
    assert_eq!(surf.find_node_nearest(0.9, 0.9, 0.9), Some(0));
    assert_eq!(surf.find_node_nearest(-1.0, -1.0, 1.0), Some(3));
}

#[test]
fn test_external_indices() {
    let mut surf = Surface::new();
    assert!(surf.add_nodes(&tetra_points()));
    surf.set_node_index(2, 42);
    assert_eq!(surf.node_index(2), 42);
    assert_eq!(surf.node(2).index, 42);

    let f = surf.faces().next().expect("surface has a face");
    surf.set_face_index(f, 7);
    assert_eq!(surf.face_index(f), 7);
}

#[test]
fn test_grade_thresholds() {
    let params = SurfParams::default();
    assert!((params.vv_sliver - (-0.8660254037844386)).abs() < 1.0e-12);
    assert!((params.vv_large - (-0.15643446504023092)).abs() < 1.0e-12);

    // Well-aligned candidates: grade rises as the circumradius falls.
    assert!(params.grade(0.9, 0.5) > params.grade(0.9, 2.0));
    assert_eq!(params.grade(0.9, 2.0), 0.5);

    // Bent candidates get a negative grade regardless of circumradius.
    assert_eq!(params.grade(-0.5, 0.01), -1.5);
    assert!(params.grade(params.vv_large, 0.01) < 0.0);
}
