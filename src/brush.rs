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

//! Brush-side resolution: turning three-point sides into pooled planes and
//! rejecting degenerate or duplicate faces (component D).

use crate::contents::{check_brush_contents, Contents};
use crate::error::{CsgError, CsgErrorKind, Diagnostic, Result};
use crate::plane::{sibling, Plane, PlaneId, PlanePool};
use crate::vecmath::{Vec3, Winding};

/// One side of an input brush, as handed to the compiler: three points
/// defining its plane (in front-facing winding order), a texture name, and a
/// per-side bevel hint (spec §4.D, §6 external interface).
#[derive(Clone, Debug)]
pub struct SideInput {
    pub p0: Vec3,
    pub p1: Vec3,
    pub p2: Vec3,
    pub texture: String,
    pub bevel: bool,
}

/// An input brush: the original map indices it came from, the owning
/// entity's `origin` key (subtracted from every point so origin-brush-relative
/// geometry works), and its sides.
#[derive(Clone, Debug)]
pub struct BrushInput {
    pub entity: i32,
    pub brush: i32,
    pub origin: Vec3,
    pub is_worldspawn_or_group: bool,
    /// Forces every side to bevel regardless of its own `bevel` flag.
    pub bevel: bool,
    pub sides: Vec<SideInput>,
}

/// A bounded face belonging to a brush hull: a resolved plane, its eventual
/// winding (filled in by `make_hull_faces`), and the contents/bevel tags
/// `Expand` and the driver need (spec's face data model, §9).
#[derive(Clone, Debug)]
pub struct BFace {
    pub plane_id: PlaneId,
    pub plane: Plane,
    pub winding: Option<Winding>,
    pub contents: Contents,
    pub texture: String,
    /// Set for faces synthesized by `Expand`, or inherited from a side/brush
    /// bevel hint (spec §4.F Phase 1, §4.G Face-vertex).
    pub bevel: bool,
}

impl BFace {
    fn new(plane_id: PlaneId, plane: Plane, contents: Contents, texture: String, bevel: bool) -> BFace {
        BFace {
            plane_id,
            plane,
            winding: None,
            contents,
            texture,
            bevel,
        }
    }
}

/// A brush resolved to pooled planes, ready for `make_hull_faces` (spec
/// §4.D's output, §4.E's input).
#[derive(Clone, Debug)]
pub struct Brush {
    pub entity: i32,
    pub brush: i32,
    pub contents: Contents,
    pub faces: Vec<BFace>,
}

/// Resolves each side of `input` to a pooled plane and classifies the
/// brush's overall contents (spec §4.D). A degenerate side, or a side whose
/// plane duplicates (same id) or opposes (sibling id) one already accepted,
/// is fatal: both conditions mean the brush has no well-defined volume.
///
/// The accepted faces are prepended one at a time, so the returned face
/// list ends up in the reverse of the input side order; `check_brush_contents`
/// still scans sides in their original order, since "first assignment-side
/// wins" depends on it.
pub fn make_brush_planes(pool: &PlanePool, input: &BrushInput) -> Result<Brush> {
    let textures: Vec<String> = input.sides.iter().map(|s| s.texture.clone()).collect();
    let contents_diag = Diagnostic::new(input.entity, input.brush);
    let contents = check_brush_contents(&textures, input.is_worldspawn_or_group, contents_diag)?;

    let mut faces: Vec<BFace> = Vec::with_capacity(input.sides.len());

    for (side_idx, side) in input.sides.iter().enumerate() {
        let diag = Diagnostic::with_side(input.entity, input.brush, side_idx as i32);

        let p0 = side.p0 - input.origin;
        let p1 = side.p1 - input.origin;
        let p2 = side.p2 - input.origin;

        let plane_id = match pool.plane_from_points(p0, p1, p2, diag)? {
            Some(id) => id,
            None => return Err(CsgErrorKind::DegeneratePlane(diag).into()),
        };

        if faces.iter().any(|f: &BFace| f.plane_id == plane_id || f.plane_id == sibling(plane_id)) {
            return Err(CsgErrorKind::CoplanarFaces(diag).into());
        }

        let face_contents = crate::contents::texture_contents(&side.texture);
        let bface = BFace::new(
            plane_id,
            pool.plane(plane_id),
            face_contents,
            side.texture.clone(),
            input.bevel || side.bevel,
        );
        faces.insert(0, bface);
    }

    Ok(Brush {
        entity: input.entity,
        brush: input.brush,
        contents,
        faces,
    })
}
