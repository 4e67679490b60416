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

//! Floating-point geometric predicates and constructions for points in 3-D.

use crate::geometry::{Point3, Vector3};

/// Determines if point `d` is left of the plane defined by points `a`, `b`,
/// and `c`, which are assumed to be in CCW order as viewed from the right
/// side of the plane. Returns a positive value if left of the plane, a
/// negative value if right of the plane, and zero otherwise.
pub fn left_of_plane(a: &Point3, b: &Point3, c: &Point3, d: &Point3) -> f64 {
    let adx = a.x - d.x;
    let bdx = b.x - d.x;
    let cdx = c.x - d.x;
    let ady = a.y - d.y;
    let bdy = b.y - d.y;
    let cdy = c.y - d.y;
    let adz = a.z - d.z;
    let bdz = b.z - d.z;
    let cdz = c.z - d.z;
    adx * (bdy * cdz - bdz * cdy) + bdx * (cdy * adz - cdz * ady) + cdx * (ady * bdz - adz * bdy)
}

fn left_of_line_2d(xa: f64, ya: f64, xb: f64, yb: f64, xc: f64, yc: f64) -> f64 {
    (xa - xc) * (yb - yc) - (xb - xc) * (ya - yc)
}

/// Center and squared radius of the circle through three points in 3-D.
/// The points may be given in any order; they must not be collinear.
pub fn circumcircle(a: &Point3, b: &Point3, c: &Point3) -> (Point3, f64) {
    let acx = a.x - c.x;
    let acy = a.y - c.y;
    let acz = a.z - c.z;
    let bcx = b.x - c.x;
    let bcy = b.y - c.y;
    let bcz = b.z - c.z;
    let acs = acx * acx + acy * acy + acz * acz;
    let bcs = bcx * bcx + bcy * bcy + bcz * bcz;
    let abx = left_of_line_2d(a.y, a.z, b.y, b.z, c.y, c.z);
    let aby = left_of_line_2d(a.z, a.x, b.z, b.x, c.z, c.x);
    let abz = left_of_line_2d(a.x, a.y, b.x, b.y, c.x, c.y);
    let scale = 0.5 / (abx * abx + aby * aby + abz * abz);
    let center = Point3::new(
        c.x + scale * ((acs * bcy - bcs * acy) * abz - (acs * bcz - bcs * acz) * aby),
        c.y + scale * ((acs * bcz - bcs * acz) * abx - (acs * bcx - bcs * acx) * abz),
        c.z + scale * ((acs * bcx - bcs * acx) * aby - (acs * bcy - bcs * acy) * abx),
    );
    let rr = center.distance_squared_to(c);
    (center, rr)
}

/// Center and squared radius of the sphere through four points. The points
/// are assumed to be in CCW order, such that `left_of_plane` returns a
/// positive value for them.
pub fn circumsphere(a: &Point3, b: &Point3, c: &Point3, d: &Point3) -> (Point3, f64) {
    let adx = a.x - d.x;
    let bdx = b.x - d.x;
    let cdx = c.x - d.x;
    let ady = a.y - d.y;
    let bdy = b.y - d.y;
    let cdy = c.y - d.y;
    let adz = a.z - d.z;
    let bdz = b.z - d.z;
    let cdz = c.z - d.z;
    let ads = adx * adx + ady * ady + adz * adz;
    let bds = bdx * bdx + bdy * bdy + bdz * bdz;
    let cds = cdx * cdx + cdy * cdy + cdz * cdz;
    let scale = 0.5 / left_of_plane(a, b, c, d);
    let center = Point3::new(
        d.x + scale * (ads * (bdy * cdz - cdy * bdz)
                     + bds * (cdy * adz - ady * cdz)
                     + cds * (ady * bdz - bdy * adz)),
        d.y + scale * (ads * (bdz * cdx - cdz * bdx)
                     + bds * (cdz * adx - adz * cdx)
                     + cds * (adz * bdx - bdz * adx)),
        d.z + scale * (ads * (bdx * cdy - cdx * bdy)
                     + bds * (cdx * ady - adx * cdy)
                     + cds * (adx * bdy - bdx * ady)),
    );
    let rr = center.distance_squared_to(d);
    (center, rr)
}

/// Unit normal and area of the triangle `(a, b, c)`. The normal points
/// toward a viewer for whom the nodes appear in CCW order. Returns the zero
/// vector and zero area for a degenerate triangle.
pub fn normal_area(a: &Point3, b: &Point3, c: &Point3) -> (Vector3, f64) {
    let v0 = a.vector_to(c);
    let v1 = b.vector_to(a);
    let n = v0.cross(&v1);
    let alpha = n.norm_squared();
    let delta = alpha.sqrt();
    let scale = if delta > 0.0 { 1.0 / delta } else { 1.0 };
    (n * scale, 0.5 * scale * alpha)
}
