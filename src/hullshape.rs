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

//! Custom collision shapes parsed from `info_hullshape` brushes (component H).

use std::collections::HashMap;

use cgmath::InnerSpace;

use crate::brush::{make_brush_planes, BrushInput};
use crate::config;
use crate::contents::{check_brush_contents, Contents};
use crate::error::{CsgErrorKind, Diagnostic, Result};
use crate::plane::PlanePool;
use crate::vecmath::{Vec3, Winding};

/// One face of a `hullbrush`: its plane (normal/representative point) and
/// the winding of vertices bounding it (spec §3 "hullbrush").
#[derive(Clone, Debug)]
pub struct HullFace {
    pub normal: Vec3,
    pub point: Vec3,
    pub winding: Winding,
}

/// One edge of a `hullbrush`, with the two adjacent faces' normals recorded
/// so Minkowski edge/edge bevels can be generated without re-walking the
/// face list (spec §3 "hullbrush").
#[derive(Clone, Debug)]
pub struct HullEdge {
    pub vertices: [Vec3; 2],
    pub normals: [Vec3; 2],
    pub delta: Vec3,
    pub point: Vec3,
}

/// A precomputed convex collision shape: the Minkowski operand for component
/// F/G. The default box shapes used by `Expand` in the absence of a bound
/// `info_hullshape` are *not* represented as a `HullBrush` — `expand::boxhull`
/// works directly off `config::HullSize` — so this type only ever holds a
/// genuine `info_hullshape` brush.
#[derive(Clone, Debug)]
pub struct HullBrush {
    pub faces: Vec<HullFace>,
    pub edges: Vec<HullEdge>,
    pub vertices: Vec<Vec3>,
}

/// Finds `a`'s matching reverse-neighbour edge `(v1, v0)` among `b`, within
/// `NORMAL_EPSILON` on both endpoints.
fn find_reverse_neighbour(v0: Vec3, v1: Vec3, edges: &[(Vec3, Vec3)]) -> Option<usize> {
    edges.iter().position(|&(w0, w1)| {
        (w0 - v1).magnitude2() < config::NORMAL_EPSILON * config::NORMAL_EPSILON
            && (w1 - v0).magnitude2() < config::NORMAL_EPSILON * config::NORMAL_EPSILON
    })
}

/// Builds a `HullBrush` from an `info_hullshape` entity's single non-origin
/// brush (spec §4.H). `input` must already have any origin-brush subtracted.
///
/// Every hull-0 face must realise to a non-empty winding (an extinguished
/// face means the brush isn't actually convex/closed) and every vertex must
/// lie on or inside every plane within `NORMAL_EPSILON`; either failure is a
/// fatal "invalid brush" (spec §4.H, scenario S6).
pub fn create_hull_brush(pool: &PlanePool, input: &BrushInput) -> Result<HullBrush> {
    let diag = Diagnostic::new(input.entity, input.brush);
    let brush = make_brush_planes(pool, input)?;

    let plane_list: Vec<_> = brush.faces.iter().map(|f| (f.plane_id, f.plane)).collect();

    let mut faces = Vec::with_capacity(brush.faces.len());
    for face in &brush.faces {
        let mut winding = Winding::from_plane(face.plane.normal, face.plane.dist, config::BOGUS_RANGE);
        for &(other_id, other_plane) in &plane_list {
            if other_id == face.plane_id {
                continue;
            }
            match winding.chop(other_plane.normal, other_plane.dist, config::NORMAL_EPSILON) {
                Some(w) => winding = w,
                None => {
                    return Err(CsgErrorKind::InvalidHullShapeBrush(
                        diag,
                        "a face realised to an empty winding".to_string(),
                    )
                    .into());
                }
            }
        }
        winding.remove_colinear_points(config::ON_EPSILON);
        if winding.len() < 3 {
            return Err(CsgErrorKind::InvalidHullShapeBrush(
                diag,
                "a face realised to fewer than 3 vertices".to_string(),
            )
            .into());
        }

        let point = winding.points()[0];
        faces.push(HullFace {
            normal: face.plane.normal,
            point,
            winding,
        });
    }

    let mut vertices: Vec<Vec3> = Vec::new();
    let mut warned_off_grid = false;
    for face in &faces {
        for &v in face.winding.points() {
            if !vertices.iter().any(|&u: &Vec3| (u - v).magnitude2() < config::ON_EPSILON * config::ON_EPSILON) {
                if !warned_off_grid && (0..3).any(|c| (v[c] - v[c].round()).abs() > config::ON_EPSILON) {
                    log::warn!(
                        "{} hull-shape brush has a vertex off the integer grid: ({}, {}, {})",
                        diag, v.x, v.y, v.z
                    );
                    warned_off_grid = true;
                }
                vertices.push(v);
            }
        }
    }

    for &v in &vertices {
        for face in &faces {
            let dist = v.dot(face.normal) - (face.point.dot(face.normal));
            if dist > config::NORMAL_EPSILON {
                return Err(CsgErrorKind::InvalidHullShapeBrush(
                    diag,
                    "a vertex lies strictly outside one of the brush's planes".to_string(),
                )
                .into());
            }
        }
    }

    let mut edges = Vec::new();
    let mut seen_edges: Vec<(Vec3, Vec3)> = Vec::new();
    for (i, face_i) in faces.iter().enumerate() {
        let edge_list: Vec<(Vec3, Vec3)> = face_i.winding.edges().collect();
        for (v0, v1) in edge_list {
            let mut neighbour = None;
            for (j, face_j) in faces.iter().enumerate() {
                if j == i {
                    continue;
                }
                let other_edges: Vec<(Vec3, Vec3)> = face_j.winding.edges().collect();
                if find_reverse_neighbour(v0, v1, &other_edges).is_some() {
                    neighbour = Some((j, face_j.normal));
                    break;
                }
            }

            let (j, normal_j) = match neighbour {
                Some(pair) => pair,
                None => {
                    log::warn!("{} hull-shape edge has no opposite face", diag);
                    continue;
                }
            };
            if j < i {
                // Keep each physical edge once, when the neighbour index is larger.
                continue;
            }
            if seen_edges.iter().any(|&(w0, w1)| {
                (w0 - v0).magnitude2() < config::ON_EPSILON * config::ON_EPSILON
                    && (w1 - v1).magnitude2() < config::ON_EPSILON * config::ON_EPSILON
            }) {
                continue;
            }
            seen_edges.push((v0, v1));

            edges.push(HullEdge {
                vertices: [v0, v1],
                normals: [face_i.normal, normal_j],
                delta: v1 - v0,
                point: v0,
            });
        }
    }

    Ok(HullBrush { faces, edges, vertices })
}

/// Parses one `info_hullshape` entity's brush list into a `HullShape` (spec
/// §4.H "Parsing an `info_hullshape` entity"). `brushes` is every brush the
/// `.map` parser attributed to this entity, each with its origin-key vector
/// already subtracted. The entity's own `origin` brush (if it authored one)
/// is identified by its contents classifying as `ORIGIN`, exactly the check
/// the driver already uses to drop origin brushes from the geometry stream;
/// it is excluded before the "exactly one brush defines the shape" count.
/// More than one remaining brush is fatal (scenario implied by spec §4.H);
/// zero is valid and yields a `HullShape` with no bound `hullbrush` (spec §3
/// "0 or 1 hullbrushes").
pub fn parse_hullshape_entity(
    pool: &PlanePool,
    entity: i32,
    id: String,
    disabled: bool,
    brushes: &[BrushInput],
) -> Result<HullShape> {
    let diag = Diagnostic::new(entity, 0);

    let mut non_origin: Vec<&BrushInput> = Vec::new();
    for brush in brushes {
        let textures: Vec<String> = brush.sides.iter().map(|s| s.texture.clone()).collect();
        let contents_diag = Diagnostic::new(entity, brush.brush);
        let contents = check_brush_contents(&textures, brush.is_worldspawn_or_group, contents_diag)?;
        if contents != Contents::Origin {
            non_origin.push(brush);
        }
    }

    if non_origin.len() > 1 {
        return Err(CsgErrorKind::MultipleHullShapeBrushes(diag).into());
    }

    let hullbrush = match non_origin.first() {
        Some(brush) => Some(create_hull_brush(pool, brush)?),
        None => None,
    };

    Ok(HullShape { id, disabled, hullbrush })
}

/// A named or per-hull-default custom collision shape (spec §3 "hullshape").
#[derive(Clone, Debug)]
pub struct HullShape {
    pub id: String,
    pub disabled: bool,
    pub hullbrush: Option<HullBrush>,
}

impl HullShape {
    /// Whether `Expand` should run the custom-shape algorithm (4.G) for this
    /// shape, as opposed to falling back to the default box (4.F).
    pub fn is_active(&self) -> bool {
        !self.disabled && self.hullbrush.is_some()
    }
}

/// Registry of named `info_hullshape` entities, plus per-hull default
/// overrides (spec §4.H).
pub struct HullShapeRegistry {
    named: HashMap<String, HullShape>,
    defaults: [Option<HullShape>; config::NUM_HULLS],
}

impl HullShapeRegistry {
    pub fn new() -> HullShapeRegistry {
        HullShapeRegistry {
            named: HashMap::new(),
            defaults: Default::default(),
        }
    }

    pub fn lookup(&self, id: &str) -> Option<&HullShape> {
        self.named.get(id)
    }

    pub fn default_for_hull(&self, hull: usize) -> Option<&HullShape> {
        self.defaults.get(hull).and_then(|s| s.as_ref())
    }

    /// Registers `shape`, replacing any default it's bound to for (spec §4.H
    /// "a `defaulthulls` bitmask replaces the built-in box shape for each
    /// selected hull; replacement deep-copies the hullbrush"). A duplicate
    /// `id` is a topology warning, not a fatal error (spec §7 "duplicate
    /// named hull-shape"): the new shape wins and replaces the old one.
    pub fn register(&mut self, shape: HullShape, default_for_hulls: &[usize]) -> Result<()> {
        if self.named.len() >= config::MAX_HULLSHAPES {
            return Err(CsgErrorKind::HullShapeRegistryExhausted(Diagnostic::default(), config::MAX_HULLSHAPES).into());
        }

        if self.named.contains_key(&shape.id) {
            log::warn!("{} duplicate hull-shape id \"{}\"", Diagnostic::default(), shape.id);
        }

        for &hull in default_for_hulls {
            if hull < self.defaults.len() {
                self.defaults[hull] = Some(shape.clone());
            }
        }
        self.named.insert(shape.id.clone(), shape);
        Ok(())
    }

    /// Parses one `info_hullshape` entity's brushes (`parse_hullshape_entity`)
    /// and registers the result in one step — the entry point a `.map`-parsing
    /// driver calls per `info_hullshape` entity it encounters (spec §4.H).
    pub fn register_entity(
        &mut self,
        pool: &PlanePool,
        entity: i32,
        id: String,
        disabled: bool,
        default_for_hulls: &[usize],
        brushes: &[BrushInput],
    ) -> Result<()> {
        let shape = parse_hullshape_entity(pool, entity, id, disabled, brushes)?;
        self.register(shape, default_for_hulls)
    }
}

impl Default for HullShapeRegistry {
    fn default() -> Self {
        HullShapeRegistry::new()
    }
}
