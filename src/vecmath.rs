// Copyright © 2018 Cormac O'Brien
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

//! 3-vector helpers and the convex-polygon `Winding` type (component A).

use cgmath::{InnerSpace, Vector3};

pub type Vec3 = Vector3<f64>;

/// Axis a plane's normal is aligned with, when it is axial.
#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

/// Returns the bounding box of a point cloud, as `(mins, maxs)`.
pub fn bounds<'a, I>(points: I) -> (Vec3, Vec3)
where
    I: IntoIterator<Item = &'a Vec3>,
{
    let mut mins = Vec3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
    let mut maxs = Vec3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points.into_iter() {
        for c in 0..3 {
            mins[c] = p[c].min(mins[c]);
            maxs[c] = p[c].max(maxs[c]);
        }
    }
    (mins, maxs)
}

/// Folds `other` into `bounds`, growing it if necessary.
pub fn grow_bounds(bounds: &mut (Vec3, Vec3), other: &Vec3) {
    for c in 0..3 {
        bounds.0[c] = bounds.0[c].min(other[c]);
        bounds.1[c] = bounds.1[c].max(other[c]);
    }
}

/// An ordered sequence of points forming a convex polygon embedded in 3-space
/// (spec §4.A). The only failure mode any operation here has is "became
/// empty" (spec §4.A); degeneracy policy (minimum area, etc.) is the
/// caller's (`make_hull_faces`'s) concern.
#[derive(Clone, Debug, PartialEq)]
pub struct Winding {
    points: Vec<Vec3>,
}

impl Winding {
    pub fn from_points(points: Vec<Vec3>) -> Winding {
        Winding { points }
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Builds a huge quad lying on the plane `normal . x = dist`, large
    /// enough to contain any half-space intersection within `max_range` of
    /// the origin (spec §4.A).
    pub fn from_plane(normal: Vec3, dist: f64, max_range: f64) -> Winding {
        // Pick the coordinate axis least aligned with `normal` to seed an
        // orthogonal basis for the plane.
        let mut up = Vec3::new(0.0, 0.0, 1.0);
        if normal.z.abs() > normal.x.abs() && normal.z.abs() > normal.y.abs() {
            up = Vec3::new(1.0, 0.0, 0.0);
        }
        let up = (up - normal * up.dot(normal)).normalize();
        let right = up.cross(normal);

        let org = normal * dist;
        let up = up * max_range;
        let right = right * max_range;

        Winding {
            points: vec![
                org + right + up,
                org - right + up,
                org - right - up,
                org + right - up,
            ],
        }
    }

    /// Clips this winding to the half-space `n . x - d <= epsilon`. Points
    /// strictly outside the band are dropped; points on or inside it are
    /// kept; edges that cross the band get an interpolated vertex (spec
    /// §4.A). Returns `None` for the "empty" outcome (fewer than 3 vertices
    /// survive), which the caller discards the owning face on.
    pub fn chop(&self, normal: Vec3, dist: f64, epsilon: f64) -> Option<Winding> {
        let n = self.points.len();
        if n == 0 {
            return None;
        }

        let mut dists = Vec::with_capacity(n + 1);
        let mut sides = Vec::with_capacity(n + 1);
        let mut front_count = 0;
        let mut back_count = 0;

        for p in &self.points {
            let d = p.dot(normal) - dist;
            dists.push(d);
            if d > epsilon {
                sides.push(1i8);
                front_count += 1;
            } else if d < -epsilon {
                sides.push(-1i8);
                back_count += 1;
            } else {
                sides.push(0i8);
            }
        }
        dists.push(dists[0]);
        sides.push(sides[0]);

        if front_count == 0 {
            return Some(self.clone());
        }
        if back_count == 0 {
            return None;
        }

        let mut out = Vec::with_capacity(n + 4);
        for i in 0..n {
            let p1 = self.points[i];
            if sides[i] != 1 {
                out.push(p1);
            }

            if sides[i] == 0 || sides[i + 1] == 0 || sides[i] == sides[i + 1] {
                continue;
            }

            let p2 = self.points[(i + 1) % n];
            let frac = dists[i] / (dists[i] - dists[i + 1]);
            out.push(p1 + (p2 - p1) * frac);
        }

        if out.len() < 3 {
            None
        } else {
            Some(Winding { points: out })
        }
    }

    /// Drops any vertex whose two incident edges are parallel within
    /// `epsilon` (spec §4.A).
    pub fn remove_colinear_points(&mut self, epsilon: f64) {
        let n = self.points.len();
        if n < 3 {
            return;
        }

        let mut keep = vec![true; n];
        for i in 0..n {
            let prev = self.points[(i + n - 1) % n];
            let cur = self.points[i];
            let next = self.points[(i + 1) % n];

            let e1 = cur - prev;
            let e2 = next - cur;

            if e1.magnitude2() < epsilon * epsilon || e2.magnitude2() < epsilon * epsilon {
                continue;
            }

            if e1.cross(e2).magnitude() < epsilon {
                keep[i] = false;
            }
        }

        let new_points: Vec<Vec3> = (0..n).filter(|&i| keep[i]).map(|i| self.points[i]).collect();
        if new_points.len() >= 3 {
            self.points = new_points;
        }
    }

    /// Unsigned planar area of the polygon, by fan triangulation from vertex 0.
    pub fn area(&self) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }

        let mut total = Vec3::new(0.0, 0.0, 0.0);
        for i in 1..self.points.len() - 1 {
            let e1 = self.points[i] - self.points[0];
            let e2 = self.points[i + 1] - self.points[0];
            total += e1.cross(e2);
        }
        total.magnitude() * 0.5
    }

    pub fn bounds(&self) -> (Vec3, Vec3) {
        bounds(self.points.iter())
    }

    /// Iterates the winding's directed edges `(v[i], v[i+1])`, wrapping
    /// around from the last vertex to the first.
    pub fn edges(&self) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_from_plane_lies_on_plane() {
        let normal = Vec3::new(0.0, 0.0, 1.0);
        let w = Winding::from_plane(normal, 10.0, 8192.0);
        for p in w.points() {
            assert!(approx_eq(p.dot(normal), 10.0));
        }
        assert_eq!(w.len(), 4);
    }

    #[test]
    fn test_chop_half() {
        let w = Winding::from_plane(Vec3::new(0.0, 0.0, 1.0), 0.0, 100.0);
        let chopped = w.chop(Vec3::new(1.0, 0.0, 0.0), 0.0, 0.001).unwrap();
        for p in chopped.points() {
            assert!(p.x <= 0.001);
        }
    }

    #[test]
    fn test_chop_extinguishes() {
        let w = Winding::from_plane(Vec3::new(0.0, 0.0, 1.0), 0.0, 100.0);
        // Chopping against a plane that excludes the entire winding empties it.
        let chopped = w.chop(Vec3::new(1.0, 0.0, 0.0), 1000.0, 0.001);
        assert!(chopped.is_none());
    }

    #[test]
    fn test_chop_unaffected() {
        let w = Winding::from_plane(Vec3::new(0.0, 0.0, 1.0), 0.0, 100.0);
        let chopped = w.chop(Vec3::new(1.0, 0.0, 0.0), -1000.0, 0.001).unwrap();
        assert_eq!(chopped.len(), w.len());
    }

    #[test]
    fn test_area_of_unit_square() {
        let points = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let w = Winding::from_points(points);
        assert!(approx_eq(w.area(), 1.0));
    }

    #[test]
    fn test_remove_colinear_points() {
        let points = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.5, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let mut w = Winding::from_points(points);
        w.remove_colinear_points(0.001);
        assert_eq!(w.len(), 4);
    }

    #[test]
    fn test_bounds() {
        let points = vec![
            Vec3::new(-1.0, -2.0, -3.0),
            Vec3::new(4.0, 5.0, 6.0),
            Vec3::new(0.0, 0.0, 0.0),
        ];
        let w = Winding::from_points(points);
        let (mins, maxs) = w.bounds();
        assert_eq!(mins, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(maxs, Vec3::new(4.0, 5.0, 6.0));
    }
}
