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

//! Realising a brush's faces into bounded convex windings (component E).

use crate::brush::BFace;
use crate::config;
use crate::error::{CsgErrorKind, Diagnostic, Result};
use crate::vecmath::{self, Vec3, Winding};

/// Stably reorders `faces` so axial planes come first. Chopping against an
/// axial plane first tends to produce smaller intermediate windings for the
/// remaining chops, and keeps the result deterministic regardless of the
/// input brush's original side order (spec §4.E).
pub fn sort_sides(faces: &mut [BFace]) {
    faces.sort_by_key(|f| std::cmp::Reverse(zero_component_count(f)));
}

fn zero_component_count(face: &BFace) -> u32 {
    (0..3)
        .filter(|&c| face.plane.normal[c].abs() < config::NORMAL_EPSILON)
        .count() as u32
}

/// Builds each face's winding by starting from a huge quad on its own plane
/// and chopping it down by every other face's plane, then prunes
/// colinear vertices and near-zero-area slivers (spec §4.E).
///
/// Each face is chopped against a fixed snapshot of every other face's plane
/// taken before the loop starts, rather than against whatever subset of
/// faces the loop has not yet dropped. A face's winding only depends on the
/// half-spaces of the *other* input planes, never on whether some other face
/// also happened to degenerate, so a redundant or degenerate plane dropping
/// out of the result can only shrink or remove its own face — it cannot
/// change how any surviving face gets clipped, regardless of processing
/// order.
///
/// Returns the hull's overall bounds across all surviving faces. A brush
/// whose bounds exceed `max_world_extent` is a fatal error: a clip hull that
/// size is almost certainly the result of a leaked or malformed brush rather
/// than deliberate level geometry.
pub fn make_hull_faces(faces: &mut Vec<BFace>, diag: Diagnostic, max_world_extent: f64) -> Result<(Vec3, Vec3)> {
    sort_sides(faces);

    let planes: Vec<_> = faces.iter().map(|f| (f.plane_id, f.plane)).collect();

    let mut kept = Vec::with_capacity(faces.len());
    for face in faces.drain(..) {
        let mut winding = Winding::from_plane(face.plane.normal, face.plane.dist, config::BOGUS_RANGE);

        // Every face's stored plane has an outward-pointing normal (the
        // brush interior is its `n . x <= d` side), so chopping by each
        // other face's own plane directly keeps exactly that face's share
        // of the interior (spec §4.E).
        for &(other_id, other_plane) in &planes {
            if other_id == face.plane_id {
                continue;
            }
            match winding.chop(other_plane.normal, other_plane.dist, config::NORMAL_EPSILON) {
                Some(w) => winding = w,
                None => {
                    winding = Winding::from_points(Vec::new());
                    break;
                }
            }
        }

        if winding.is_empty() {
            log::warn!("{} face fully clipped away by its own brush", diag);
            continue;
        }

        winding.remove_colinear_points(config::ON_EPSILON);
        if winding.area() < config::MIN_FACE_AREA {
            log::warn!("{} face area below minimum, dropping", diag);
            continue;
        }

        kept.push(BFace {
            winding: Some(winding),
            ..face
        });
    }

    *faces = kept;

    if faces.is_empty() {
        return Ok((Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 0.0)));
    }

    let mut bounds = faces[0].winding.as_ref().unwrap().bounds();
    for face in &faces[1..] {
        let (mins, maxs) = face.winding.as_ref().unwrap().bounds();
        vecmath::grow_bounds(&mut bounds, &mins);
        vecmath::grow_bounds(&mut bounds, &maxs);
    }

    let (mins, maxs) = bounds;
    for c in 0..3 {
        if mins[c] < -max_world_extent || maxs[c] > max_world_extent {
            return Err(CsgErrorKind::BrushOutsideWorld(
                diag, mins.x, mins.y, mins.z, maxs.x, maxs.y, maxs.z,
            )
            .into());
        }
    }

    Ok(bounds)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::brush::make_brush_planes;
    use crate::brush::{BrushInput, SideInput};
    use crate::plane::PlanePool;
    use cgmath::InnerSpace;

    fn cube_input() -> BrushInput {
        // A 64-unit cube centered on the origin, one side per axial plane,
        // wound so `PlaneFromPoints` yields an outward normal.
        let sides = vec![
            SideInput {
                // +x
                p0: Vec3::new(32.0, 32.0, 32.0),
                p1: Vec3::new(32.0, 32.0, -32.0),
                p2: Vec3::new(32.0, -32.0, 32.0),
                texture: "wall1".into(),
                bevel: false,
            },
            SideInput {
                // -x
                p0: Vec3::new(-32.0, 32.0, 32.0),
                p1: Vec3::new(-32.0, -32.0, 32.0),
                p2: Vec3::new(-32.0, 32.0, -32.0),
                texture: "wall1".into(),
                bevel: false,
            },
            SideInput {
                // +y
                p0: Vec3::new(32.0, 32.0, 32.0),
                p1: Vec3::new(-32.0, 32.0, 32.0),
                p2: Vec3::new(32.0, 32.0, -32.0),
                texture: "wall1".into(),
                bevel: false,
            },
            SideInput {
                // -y
                p0: Vec3::new(32.0, -32.0, 32.0),
                p1: Vec3::new(32.0, -32.0, -32.0),
                p2: Vec3::new(-32.0, -32.0, 32.0),
                texture: "wall1".into(),
                bevel: false,
            },
            SideInput {
                // +z
                p0: Vec3::new(32.0, 32.0, 32.0),
                p1: Vec3::new(32.0, -32.0, 32.0),
                p2: Vec3::new(-32.0, 32.0, 32.0),
                texture: "wall1".into(),
                bevel: false,
            },
            SideInput {
                // -z
                p0: Vec3::new(32.0, 32.0, -32.0),
                p1: Vec3::new(-32.0, 32.0, -32.0),
                p2: Vec3::new(32.0, -32.0, -32.0),
                texture: "wall1".into(),
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
    fn test_make_hull_faces_cube_bounds() {
        let pool = PlanePool::new(64, crate::config::DIR_EPSILON, crate::config::DIST_EPSILON);
        let mut brush = make_brush_planes(&pool, &cube_input()).unwrap();
        let diag = Diagnostic::new(0, 0);
        let (mins, maxs) = make_hull_faces(&mut brush.faces, diag, config::DEFAULT_MAX_WORLD_EXTENT).unwrap();

        assert_eq!(brush.faces.len(), 6);
        for face in &brush.faces {
            assert_eq!(face.winding.as_ref().unwrap().len(), 4);
        }
        assert!((mins - Vec3::new(-32.0, -32.0, -32.0)).magnitude2() < 1e-6);
        assert!((maxs - Vec3::new(32.0, 32.0, 32.0)).magnitude2() < 1e-6);
    }

    #[test]
    fn test_make_hull_faces_rejects_oversized_brush() {
        let pool = PlanePool::new(64, crate::config::DIR_EPSILON, crate::config::DIST_EPSILON);
        let mut input = cube_input();
        for side in &mut input.sides {
            side.p0 *= 10_000.0;
            side.p1 *= 10_000.0;
            side.p2 *= 10_000.0;
        }
        let mut brush = make_brush_planes(&pool, &input).unwrap();
        let diag = Diagnostic::new(0, 0);
        let err = make_hull_faces(&mut brush.faces, diag, config::DEFAULT_MAX_WORLD_EXTENT).unwrap_err();
        assert!(matches!(err.kind(), CsgErrorKind::BrushOutsideWorld(..)));
    }

    /// Invariant 4 from the testable-properties list: for a valid convex
    /// brush, every surviving face's winding has area above the minimum,
    /// every vertex sits on its own plane within `ON_EPSILON`, and the
    /// recorded bounds equal the union of all winding vertex bounds.
    #[test]
    fn test_make_hull_faces_random_cube_sizes_satisfy_invariants() {
        use rand::{thread_rng, Rng};

        let mut rng = thread_rng();
        for _ in 0..20 {
            let half = rng.gen_range(1.0, 4096.0);
            let pool = PlanePool::new(64, crate::config::DIR_EPSILON, crate::config::DIST_EPSILON);
            let mut input = cube_input();
            let scale = half / 32.0;
            for side in &mut input.sides {
                side.p0 *= scale;
                side.p1 *= scale;
                side.p2 *= scale;
            }
            let mut brush = make_brush_planes(&pool, &input).unwrap();
            let diag = Diagnostic::new(0, 0);
            let (mins, maxs) = make_hull_faces(&mut brush.faces, diag, config::DEFAULT_MAX_WORLD_EXTENT).unwrap();

            let mut union_bounds: Option<(Vec3, Vec3)> = None;
            for face in &brush.faces {
                let winding = face.winding.as_ref().unwrap();
                assert!(winding.area() >= config::MIN_FACE_AREA);
                for &v in winding.points() {
                    assert!(face.plane.dist_to(v).abs() <= config::ON_EPSILON);
                }
                let (fmins, fmaxs) = winding.bounds();
                match &mut union_bounds {
                    None => union_bounds = Some((fmins, fmaxs)),
                    Some(b) => {
                        vecmath::grow_bounds(b, &fmins);
                        vecmath::grow_bounds(b, &fmaxs);
                    }
                }
            }
            let (umins, umaxs) = union_bounds.unwrap();
            assert!((mins - umins).magnitude2() < 1e-6);
            assert!((maxs - umaxs).magnitude2() < 1e-6);
        }
    }

    /// A redundant plane that lies entirely outside the brush's true extent
    /// extinguishes its own face and is dropped. The fixed-snapshot chop must
    /// not let that dropped face leave a stale plane behind that clips any of
    /// the six genuine cube faces: their windings and the overall bounds come
    /// out exactly as if the redundant side had never been present.
    #[test]
    fn test_make_hull_faces_redundant_plane_does_not_clip_surviving_faces() {
        let pool = PlanePool::new(64, crate::config::DIR_EPSILON, crate::config::DIST_EPSILON);
        let mut input = cube_input();
        // An extra +x side twice as far out as the real one: its own huge
        // quad gets chopped down to nothing by the real +x plane at x=32,
        // but contributes no constraint to any other face.
        input.sides.push(SideInput {
            p0: Vec3::new(64.0, 32.0, 32.0),
            p1: Vec3::new(64.0, 32.0, -32.0),
            p2: Vec3::new(64.0, -32.0, 32.0),
            texture: "wall1".into(),
            bevel: false,
        });

        let mut brush = make_brush_planes(&pool, &input).unwrap();
        let diag = Diagnostic::new(0, 0);
        let (mins, maxs) = make_hull_faces(&mut brush.faces, diag, config::DEFAULT_MAX_WORLD_EXTENT).unwrap();

        assert_eq!(brush.faces.len(), 6);
        for face in &brush.faces {
            assert_eq!(face.winding.as_ref().unwrap().len(), 4);
        }
        assert!((mins - Vec3::new(-32.0, -32.0, -32.0)).magnitude2() < 1e-6);
        assert!((maxs - Vec3::new(32.0, 32.0, 32.0)).magnitude2() < 1e-6);
    }
}
