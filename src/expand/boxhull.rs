// Copyright © 2018 Cormac O'Brien
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of this software
// and associated documentation files (the "Software"), to deal in the Software without
// restriction, including without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all copies or
// substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING
// BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
// DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Default (axis-aligned box) Minkowski expansion (component F).

use cgmath::InnerSpace;

use super::{add_hull_plane, AxialSuppression};
use crate::brush::BFace;
use crate::config::{self, Cliptype, HullSize};
use crate::error::{Diagnostic, Result};
use crate::plane::{classify_plane_type, PlanePool};
use crate::vecmath::{self, Vec3};

fn axial_side_of(normal: Vec3) -> (usize, bool) {
    let ty = classify_plane_type(normal);
    let axis = ty.dominant_axis() as usize;
    (axis, normal[axis] > 0.0)
}

/// Phase 1: for every non-axial hull-0 face, emits a plane parallel to it,
/// offset per the cliptype's policy (spec §4.F Phase 1).
fn phase1_face_vs_vertex(
    pool: &PlanePool,
    faces: &mut Vec<BFace>,
    hull0: &[BFace],
    hull_size: HullSize,
    cliptype: Cliptype,
    floor_z: f64,
    suppression: &mut AxialSuppression,
    diag: Diagnostic,
) -> Result<()> {
    for face in hull0 {
        let ty = classify_plane_type(face.plane.normal);
        if ty.is_axial() {
            if face.bevel {
                let (axis, positive) = axial_side_of(face.plane.normal);
                suppression.mark(axis, positive);
            }
            continue;
        }

        let n = face.plane.normal;
        if face.bevel {
            let (axis, positive) = axial_side_of(n);
            suppression.mark(axis, positive);
            let origin = n * face.plane.dist;
            add_hull_plane(pool, faces, n, origin, face.texture.clone(), diag)?;
            continue;
        }

        let is_floor = n.z > floor_z;
        let mut offset = 0.0;
        for axis in 0..3 {
            offset += n[axis] * cliptype.axis_offset(axis, n[axis], hull_size.mins[axis], hull_size.maxs[axis], is_floor);
        }
        let new_dist = face.plane.dist + offset;
        let origin = n * new_dist;
        add_hull_plane(pool, faces, n, origin, face.texture.clone(), diag)?;
    }
    Ok(())
}

/// Finds the hull-0 face (other than `skip_idx`) whose winding contains the
/// reversed edge `(v1, v0)`, i.e. the unique neighbour sharing that edge.
fn find_edge_neighbour(hull0: &[BFace], skip_idx: usize, v0: Vec3, v1: Vec3) -> Option<usize> {
    for (j, face) in hull0.iter().enumerate() {
        if j == skip_idx {
            continue;
        }
        let winding = match face.winding.as_ref() {
            Some(w) => w,
            None => continue,
        };
        for (w0, w1) in winding.edges() {
            if (w0 - v1).magnitude2() < config::NORMAL_EPSILON * config::NORMAL_EPSILON
                && (w1 - v0).magnitude2() < config::NORMAL_EPSILON * config::NORMAL_EPSILON
            {
                return Some(j);
            }
        }
    }
    None
}

/// Phase 2: edge/edge bevel planes, only under `simple | normalized | precise`
/// (spec §4.F Phase 2).
fn phase2_edge_vs_edge(
    pool: &PlanePool,
    faces: &mut Vec<BFace>,
    hull0: &[BFace],
    hull_size: HullSize,
    cliptype: Cliptype,
    floor_z: f64,
    diag: Diagnostic,
) -> Result<()> {
    if !cliptype.generates_edge_bevels() {
        return Ok(());
    }

    let mut warned = false;
    for (i, face) in hull0.iter().enumerate() {
        let winding = match face.winding.as_ref() {
            Some(w) => w,
            None => continue,
        };
        for (v0, v1) in winding.edges() {
            let neighbour_idx = match find_edge_neighbour(hull0, i, v0, v1) {
                Some(idx) => idx,
                None => {
                    if !warned {
                        log::warn!("{} hull-0 edge has no opposite face on hull 1", diag);
                        warned = true;
                    }
                    continue;
                }
            };
            let neighbour_normal = hull0[neighbour_idx].plane.normal;

            for axis in 0..3 {
                let product = face.plane.normal[axis] * neighbour_normal[axis];
                if product >= -config::NORMAL_EPSILON {
                    continue;
                }

                let mut e_dir = Vec3::new(0.0, 0.0, 0.0);
                e_dir[axis] = -face.plane.normal[axis].signum();

                let edge_vec = v1 - v0;
                let raw_normal = edge_vec.cross(e_dir);
                if raw_normal.magnitude() < 1e-10 {
                    continue;
                }
                let new_normal = raw_normal.normalize();
                if classify_plane_type(new_normal).is_axial() {
                    continue;
                }

                let is_floor = face.plane.normal.z > floor_z;
                let mut offset = 0.0;
                for a in 0..3 {
                    offset += new_normal[a]
                        * cliptype.axis_offset(a, new_normal[a], hull_size.mins[a], hull_size.maxs[a], is_floor);
                }
                let origin = v0 + new_normal * offset;
                add_hull_plane(pool, faces, new_normal, origin, face.texture.clone(), diag)?;
            }
        }
    }
    Ok(())
}

/// Phase 3: the six axis-aligned bounding planes of `bounds(hull0) ⊕
/// [mins_h, maxs_h]`, with bevel-suppressed sides left unexpanded (spec §4.F
/// Phase 3).
fn phase3_vertex_vs_face(
    pool: &PlanePool,
    faces: &mut Vec<BFace>,
    hull0: &[BFace],
    hull_size: HullSize,
    suppression: &AxialSuppression,
    diag: Diagnostic,
) -> Result<()> {
    let mut bounds: Option<(Vec3, Vec3)> = None;
    for face in hull0 {
        if let Some(w) = face.winding.as_ref() {
            let (mins, maxs) = w.bounds();
            match &mut bounds {
                None => bounds = Some((mins, maxs)),
                Some(b) => {
                    vecmath::grow_bounds(b, &mins);
                    vecmath::grow_bounds(b, &maxs);
                }
            }
        }
    }
    let (mins0, maxs0) = bounds.unwrap_or((Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 0.0)));

    for axis in 0..3 {
        let mut unit = Vec3::new(0.0, 0.0, 0.0);

        // Negative side.
        unit[axis] = -1.0;
        let dist_neg = if suppression.is_marked(axis, false) {
            -mins0[axis]
        } else {
            -(mins0[axis] + hull_size.mins[axis])
        };
        add_hull_plane(pool, faces, unit, unit * dist_neg, "clip".to_string(), diag)?;

        // Positive side.
        let mut unit_pos = Vec3::new(0.0, 0.0, 0.0);
        unit_pos[axis] = 1.0;
        let dist_pos = if suppression.is_marked(axis, true) {
            maxs0[axis]
        } else {
            maxs0[axis] + hull_size.maxs[axis]
        };
        add_hull_plane(pool, faces, unit_pos, unit_pos * dist_pos, "clip".to_string(), diag)?;
    }
    Ok(())
}

/// Runs the full three-phase default box expansion for one non-zero hull
/// (spec §4.F).
pub fn expand_box(
    pool: &PlanePool,
    hull0_faces: &[BFace],
    hull_size: HullSize,
    cliptype: Cliptype,
    floor_z: f64,
    diag: Diagnostic,
) -> Result<Vec<BFace>> {
    let mut out = Vec::new();
    let mut suppression = AxialSuppression::new();

    phase1_face_vs_vertex(pool, &mut out, hull0_faces, hull_size, cliptype, floor_z, &mut suppression, diag)?;
    phase2_edge_vs_edge(pool, &mut out, hull0_faces, hull_size, cliptype, floor_z, diag)?;
    phase3_vertex_vs_face(pool, &mut out, hull0_faces, hull_size, &suppression, diag)?;

    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::brush::{make_brush_planes, BrushInput, SideInput};
    use crate::hull::make_hull_faces;

    fn unit_cube_input() -> BrushInput {
        // Wound so `PlaneFromPoints` yields an outward normal, matching the
        // convention real `.map` brush sides are authored in.
        let sides = vec![
            SideInput {
                // +x
                p0: Vec3::new(0.5, 0.5, 0.5),
                p1: Vec3::new(0.5, 0.5, -0.5),
                p2: Vec3::new(0.5, -0.5, 0.5),
                texture: "wall".into(),
                bevel: false,
            },
            SideInput {
                // -x
                p0: Vec3::new(-0.5, 0.5, 0.5),
                p1: Vec3::new(-0.5, -0.5, 0.5),
                p2: Vec3::new(-0.5, 0.5, -0.5),
                texture: "wall".into(),
                bevel: false,
            },
            SideInput {
                // +y
                p0: Vec3::new(0.5, 0.5, 0.5),
                p1: Vec3::new(-0.5, 0.5, 0.5),
                p2: Vec3::new(0.5, 0.5, -0.5),
                texture: "wall".into(),
                bevel: false,
            },
            SideInput {
                // -y
                p0: Vec3::new(0.5, -0.5, 0.5),
                p1: Vec3::new(0.5, -0.5, -0.5),
                p2: Vec3::new(-0.5, -0.5, 0.5),
                texture: "wall".into(),
                bevel: false,
            },
            SideInput {
                // +z
                p0: Vec3::new(0.5, 0.5, 0.5),
                p1: Vec3::new(0.5, -0.5, 0.5),
                p2: Vec3::new(-0.5, 0.5, 0.5),
                texture: "wall".into(),
                bevel: false,
            },
            SideInput {
                // -z
                p0: Vec3::new(0.5, 0.5, -0.5),
                p1: Vec3::new(-0.5, 0.5, -0.5),
                p2: Vec3::new(0.5, -0.5, -0.5),
                texture: "wall".into(),
                bevel: false,
            },
        ];
        BrushInput {
            entity: 0,
            brush: 0,
            origin: Vec3::new(0.0, 0.0, 0.0),
            is_worldspawn_or_group: true,
            bevel: false,
            sides,
        }
    }

    #[test]
    fn test_minkowski_idempotence_simple_no_bevels() {
        let pool = crate::plane::PlanePool::new(256, config::DIR_EPSILON, config::DIST_EPSILON);
        let mut brush = make_brush_planes(&pool, &unit_cube_input()).unwrap();
        let diag = crate::error::Diagnostic::new(0, 0);
        make_hull_faces(&mut brush.faces, diag, config::DEFAULT_MAX_WORLD_EXTENT).unwrap();

        let hull_size = HullSize::new(Vec3::new(-2.0, -3.0, -4.0), Vec3::new(2.0, 3.0, 4.0));
        let expanded = expand_box(&pool, &brush.faces, hull_size, Cliptype::Simple, config::DEFAULT_FLOOR_Z, diag).unwrap();

        // All six hull-0 faces are axial, so Phase 1/2 contribute nothing;
        // only Phase 3's six bounding planes should appear.
        assert_eq!(expanded.len(), 6);
        for face in &expanded {
            let offset = 0.5
                + match classify_plane_type(face.plane.normal).dominant_axis() {
                    vecmath::Axis::X => 2.0,
                    vecmath::Axis::Y => 3.0,
                    vecmath::Axis::Z => 4.0,
                };
            assert!((face.plane.dist - offset).abs() < 1e-6);
        }
    }
}
