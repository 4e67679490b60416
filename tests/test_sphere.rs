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

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use trisurf::geometry::{Point3, Vector3};
use trisurf::surface::Surface;

// Vertices of a regular icosahedron, radially jittered so that no five
// points are cospherical.
fn icosahedron_points(rng: &mut StdRng) -> Vec<Point3> {
    let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let raw = [
        [0.0, 1.0, phi],
        [0.0, 1.0, -phi],
        [0.0, -1.0, phi],
        [0.0, -1.0, -phi],
        [1.0, phi, 0.0],
        [1.0, -phi, 0.0],
        [-1.0, phi, 0.0],
        [-1.0, -phi, 0.0],
        [phi, 0.0, 1.0],
        [-phi, 0.0, 1.0],
        [phi, 0.0, -1.0],
        [-phi, 0.0, -1.0],
    ];
    raw.iter()
        .map(|&[x, y, z]| {
            let s = 1.0 + rng.random_range(-1.0e-3..1.0e-3);
            Point3::new(s * x, s * y, s * z)
        })
        .collect()
}

// Points along a spiral over the sphere, radially jittered.
fn spiral_sphere_points(n: usize, rng: &mut StdRng) -> Vec<Point3> {
    let golden = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
    (0..n)
        .map(|i| {
            let z = 1.0 - 2.0 * (i as f64 + 0.5) / n as f64;
            let r = (1.0 - z * z).sqrt();
            let t = golden * i as f64;
            let s = 1.0 + rng.random_range(-1.0e-2..1.0e-2);
            Point3::new(s * r * t.cos(), s * r * t.sin(), s * z)
        })
        .collect()
}

fn assert_closed_manifold(surf: &Surface) {
    let nv = surf.count_nodes();
    let nf = surf.count_faces();
    assert_eq!(nf, 2 * nv - 4, "closed surface face count");

    for n in surf.nodes().collect::<Vec<_>>() {
        assert!(surf.node(n).is_in_surface());
        assert!(!surf.node(n).is_on_boundary());
    }

    // Each directed edge in one face, its reverse in exactly one other.
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
    surf.validate();
}

// For a convex point cloud around the origin, a consistently oriented
// surface has every face normal pointing the same way, inward or outward.
fn assert_uniform_orientation(surf: &Surface) {
    let mut sign = 0.0_f64;
    for f in surf.faces().collect::<Vec<_>>() {
        let [a, b, c] = surf.face(f).nodes();
        let pa = surf.position(a);
        let pb = surf.position(b);
        let pc = surf.position(c);
        let centroid = Vector3::new(
            (pa.x + pb.x + pc.x) / 3.0,
            (pa.y + pb.y + pc.y) / 3.0,
            (pa.z + pb.z + pc.z) / 3.0,
        );
        let d = surf.face_normal(f).dot(&centroid);
        assert!(d != 0.0, "face normal is not tangent");
        if sign == 0.0 {
            sign = d.signum();
        } else {
            assert_eq!(d.signum(), sign, "face normals agree");
        }
    }
}

#[test]
fn test_icosahedron_reconstructs_closed_surface() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut surf = Surface::new();
    assert!(surf.add_nodes(&icosahedron_points(&mut rng)));

    assert_eq!(surf.count_nodes(), 12);
    assert_eq!(surf.count_faces(), 20);
    assert_closed_manifold(&surf);
    assert_uniform_orientation(&surf);

    // Five faces meet at every vertex of an icosahedron.
    for n in surf.nodes().collect::<Vec<_>>() {
        assert_eq!(surf.count_node_faces(n), 5);
    }
}

#[test]
fn test_icosahedron_rebuild_is_stable() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut surf = Surface::new();
    assert!(surf.add_nodes(&icosahedron_points(&mut rng)));
    surf.rebuild();
    assert_eq!(surf.count_faces(), 20);
    assert_closed_manifold(&surf);
}

#[test]
fn test_icosahedron_remove_and_readd() {
    let mut rng = StdRng::seed_from_u64(7);
    let pts = icosahedron_points(&mut rng);
    let mut surf = Surface::new();
    assert!(surf.add_nodes(&pts));

    assert!(surf.remove_node(5));
    assert_eq!(surf.count_nodes(), 11);
    surf.validate();

    assert_eq!(surf.add_node(pts[5]), Some(5));
    assert_eq!(surf.count_faces(), 20);
    assert_closed_manifold(&surf);
}

#[test]
fn test_spiral_sphere_reconstructs_closed_surface() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut surf = Surface::new();
    assert!(surf.add_nodes(&spiral_sphere_points(40, &mut rng)));

    assert_eq!(surf.count_nodes(), 40);
    assert_closed_manifold(&surf);
    assert_uniform_orientation(&surf);
}
