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

//! Minkowski expansion against an arbitrary convex `info_hullshape` (component
//! G): the same face-vertex/edge-edge/vertex-face structure as `boxhull`, run
//! against a `HullBrush` instead of an axis-aligned box.

use cgmath::InnerSpace;

use super::add_hull_plane;
use crate::brush::BFace;
use crate::config;
use crate::error::{Diagnostic, Result};
use crate::hullshape::HullBrush;
use crate::plane::PlanePool;
use crate::vecmath::Vec3;

/// One oriented edge of the brush's hull-0, with the two adjacent faces'
/// normals and a texture to inherit if Phase 2 emits a plane from it.
struct BrushEdge {
    v0: Vec3,
    v1: Vec3,
    normals: [Vec3; 2],
    delta: Vec3,
    texture: String,
}

fn find_neighbour(hull0: &[BFace], skip_idx: usize, v0: Vec3, v1: Vec3) -> Option<usize> {
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

/// Builds each physical edge of `hull0` once, with its adjacent normals and a
/// drift-corrected `delta` (the cross product of the two face normals,
/// re-scaled back to the edge's original length).
fn build_brush_edges(hull0: &[BFace], diag: Diagnostic) -> Vec<BrushEdge> {
    let mut edges = Vec::new();
    let mut warned = false;

    for (i, face) in hull0.iter().enumerate() {
        let winding = match face.winding.as_ref() {
            Some(w) => w,
            None => continue,
        };
        for (v0, v1) in winding.edges() {
            let j = match find_neighbour(hull0, i, v0, v1) {
                Some(j) => j,
                None => {
                    if !warned {
                        log::warn!("{} hull-0 edge has no opposite face", diag);
                        warned = true;
                    }
                    continue;
                }
            };
            if j < i {
                // The reverse traversal of this same physical edge already emitted it.
                continue;
            }

            let neighbour_normal = hull0[j].plane.normal;
            let edge_len = (v1 - v0).magnitude();
            let mut delta = face.plane.normal.cross(neighbour_normal);
            if delta.magnitude() < 1e-10 {
                continue;
            }
            if delta.dot(v1 - v0) < 0.0 {
                delta = -delta;
            }
            delta = delta.normalize() * edge_len;

            edges.push(BrushEdge {
                v0,
                v1,
                normals: [face.plane.normal, neighbour_normal],
                delta,
                texture: face.texture.clone(),
            });
        }
    }

    edges
}

/// Phase 1: for each hull-0 face, either defers to a coplanar shape face
/// (marking it suppressed if the hull-0 face is bevel-flagged) or emits a
/// plane parallel to the face offset by the shape's support vertex (spec
/// §4.G Face–vertex).
fn phase1_face_vertex(
    pool: &PlanePool,
    out: &mut Vec<BFace>,
    hull0: &[BFace],
    hullbrush: &HullBrush,
    suppressed: &mut [bool],
    diag: Diagnostic,
) -> Result<()> {
    for face in hull0 {
        let face_point = face
            .winding
            .as_ref()
            .and_then(|w| w.points().first().copied())
            .unwrap_or(face.plane.origin);

        let coplanar = hullbrush.faces.iter().position(|s| {
            (s.normal + face.plane.normal).magnitude2() < config::NORMAL_EPSILON * config::NORMAL_EPSILON
                && s.winding
                    .points()
                    .iter()
                    .all(|v| (v.dot(face.plane.normal) - face.plane.dist).abs() < config::EQUAL_EPSILON)
        });

        if let Some(si) = coplanar {
            if face.bevel {
                suppressed[si] = true;
            }
            continue;
        }

        let support = hullbrush
            .vertices
            .iter()
            .copied()
            .min_by(|a, b| a.dot(face.plane.normal).partial_cmp(&b.dot(face.plane.normal)).unwrap())
            .unwrap_or(Vec3::new(0.0, 0.0, 0.0));

        let origin = if face.bevel { face_point } else { face_point - support };
        add_hull_plane(pool, out, face.plane.normal, origin, face.texture.clone(), diag)?;
    }
    Ok(())
}

/// Phase 2: pairs every brush edge against every shape edge whose directions
/// bracket the brush edge's adjacent faces (and vice versa), emitting one
/// bevel plane per matching pair (spec §4.G Edge–edge).
fn phase2_edge_edge(
    pool: &PlanePool,
    out: &mut Vec<BFace>,
    hull0: &[BFace],
    hullbrush: &HullBrush,
    diag: Diagnostic,
) -> Result<()> {
    let brush_edges = build_brush_edges(hull0, diag);

    for be in &brush_edges {
        for se in &hullbrush.edges {
            if se.delta.dot(be.normals[0]) <= config::ON_EPSILON {
                continue;
            }
            if se.delta.dot(be.normals[1]) >= -config::ON_EPSILON {
                continue;
            }
            if be.delta.dot(se.normals[0]) <= config::ON_EPSILON {
                continue;
            }
            if be.delta.dot(se.normals[1]) >= -config::ON_EPSILON {
                continue;
            }

            let be_unit = be.delta.normalize();
            let se_unit = se.delta.normalize();
            let cross = be_unit.cross(se_unit);
            if cross.magnitude() < 1e-10 {
                continue;
            }
            let normal = cross.normalize();
            let origin = be.v0 - se.point;
            add_hull_plane(pool, out, normal, origin, be.texture.clone(), diag)?;
        }
    }
    Ok(())
}

/// Phase 3: one plane per shape face, supported by the hull-0 vertex with
/// minimum projection onto that face's normal (spec §4.G Vertex–face).
fn phase3_vertex_face(
    pool: &PlanePool,
    out: &mut Vec<BFace>,
    hull0: &[BFace],
    hullbrush: &HullBrush,
    suppressed: &[bool],
    diag: Diagnostic,
) -> Result<()> {
    let mut best_vertices: Vec<(Vec3, &str)> = Vec::new();
    for face in hull0 {
        if let Some(w) = face.winding.as_ref() {
            for &v in w.points() {
                best_vertices.push((v, face.texture.as_str()));
            }
        }
    }
    if best_vertices.is_empty() {
        return Ok(());
    }

    for (si, shape_face) in hullbrush.faces.iter().enumerate() {
        let (best_vertex, texture) = *best_vertices
            .iter()
            .min_by(|a, b| a.0.dot(shape_face.normal).partial_cmp(&b.0.dot(shape_face.normal)).unwrap())
            .unwrap();

        let normal = -shape_face.normal;
        let origin = if suppressed[si] { best_vertex } else { best_vertex - shape_face.point };
        add_hull_plane(pool, out, normal, origin, texture.to_string(), diag)?;
    }
    Ok(())
}

/// Runs the full three-phase custom hull-shape expansion for one non-zero
/// hull (spec §4.G). An empty hull-0 face list makes Phase 3 a no-op, so the
/// hull comes out empty (a clip-only brush being re-expanded).
pub fn expand_hullshape(
    pool: &PlanePool,
    hull0_faces: &[BFace],
    hullbrush: &HullBrush,
    diag: Diagnostic,
) -> Result<Vec<BFace>> {
    let mut out = Vec::new();
    let mut suppressed = vec![false; hullbrush.faces.len()];

    phase1_face_vertex(pool, &mut out, hull0_faces, hullbrush, &mut suppressed, diag)?;
    phase2_edge_edge(pool, &mut out, hull0_faces, hullbrush, diag)?;
    phase3_vertex_face(pool, &mut out, hull0_faces, hullbrush, &suppressed, diag)?;

    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::brush::{make_brush_planes, BrushInput, SideInput};
    use crate::config::DEFAULT_MAX_WORLD_EXTENT;
    use crate::error::Diagnostic;
    use crate::hull::make_hull_faces;
    use crate::hullshape::create_hull_brush;

    fn cube_input(half: f64) -> BrushInput {
        let sides = vec![
            SideInput {
                p0: Vec3::new(half, half, half),
                p1: Vec3::new(half, half, -half),
                p2: Vec3::new(half, -half, half),
                texture: "wall".into(),
                bevel: false,
            },
            SideInput {
                p0: Vec3::new(-half, half, half),
                p1: Vec3::new(-half, -half, half),
                p2: Vec3::new(-half, half, -half),
                texture: "wall".into(),
                bevel: false,
            },
            SideInput {
                p0: Vec3::new(half, half, half),
                p1: Vec3::new(-half, half, half),
                p2: Vec3::new(half, half, -half),
                texture: "wall".into(),
                bevel: false,
            },
            SideInput {
                p0: Vec3::new(half, -half, half),
                p1: Vec3::new(half, -half, -half),
                p2: Vec3::new(-half, -half, half),
                texture: "wall".into(),
                bevel: false,
            },
            SideInput {
                p0: Vec3::new(half, half, half),
                p1: Vec3::new(half, -half, half),
                p2: Vec3::new(-half, half, half),
                texture: "wall".into(),
                bevel: false,
            },
            SideInput {
                p0: Vec3::new(half, half, -half),
                p1: Vec3::new(-half, half, -half),
                p2: Vec3::new(half, -half, -half),
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
    fn test_expand_hullshape_cube_against_cube_gives_six_faces() {
        let pool = PlanePool::new(256, config::DIR_EPSILON, config::DIST_EPSILON);

        let shape_brush = create_hull_brush(&pool, &cube_input(16.0)).unwrap();

        let mut brush = make_brush_planes(&pool, &cube_input(32.0)).unwrap();
        let diag = Diagnostic::new(0, 0);
        make_hull_faces(&mut brush.faces, diag, DEFAULT_MAX_WORLD_EXTENT).unwrap();

        let expanded = expand_hullshape(&pool, &brush.faces, &shape_brush, diag).unwrap();

        // Minkowski-summing two axis-aligned cubes yields another axis-aligned
        // cube: six faces, one per side, each offset by the shape's half-extent.
        assert_eq!(expanded.len(), 6);
        for face in &expanded {
            assert!((face.plane.dist.abs() - 48.0).abs() < 1e-6);
        }
    }
}
