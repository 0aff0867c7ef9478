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

//! Minkowski-sum hull expansion: the default box algorithm (component F) and
//! the custom hull-shape algorithm (component G) share the bevel-plane
//! bookkeeping in this module.

pub mod boxhull;
pub mod hullshape_expand;

use crate::brush::BFace;
use crate::config::CsgOptions;
use crate::contents::Contents;
use crate::error::{Diagnostic, Result};
use crate::hullshape::HullShape;
use crate::plane::PlanePool;
use crate::vecmath::Vec3;

/// Tracks, per axis and per side (`0` = negative/mins, `1` = positive/maxs),
/// whether a bevel-flagged hull-0 face suppresses Phase 3's expansion on
/// that side (spec §4.F Phase 1/3, §9 "a `bool[last_axial+1][2]`").
#[derive(Copy, Clone, Debug, Default)]
pub struct AxialSuppression {
    suppress: [[bool; 2]; 3],
}

impl AxialSuppression {
    pub fn new() -> AxialSuppression {
        AxialSuppression::default()
    }

    pub fn mark(&mut self, axis: usize, positive: bool) {
        self.suppress[axis][positive as usize] = true;
    }

    pub fn is_marked(&self, axis: usize, positive: bool) -> bool {
        self.suppress[axis][positive as usize]
    }
}

/// Appends a synthesized hull plane to `out`, finding or inserting it in the
/// shared plane pool and suppressing the insert if an existing face in `out`
/// already carries the same plane id (spec §4.F/§4.G "`AddHullPlane` with
/// duplicate-plane suppression").
pub fn add_hull_plane(
    pool: &PlanePool,
    out: &mut Vec<BFace>,
    normal: Vec3,
    origin: Vec3,
    texture: String,
    diag: Diagnostic,
) -> Result<()> {
    let plane_id = pool.find_int_plane(normal, origin, diag)?;
    if out.iter().any(|f| f.plane_id == plane_id) {
        return Ok(());
    }
    out.push(BFace {
        plane_id,
        plane: pool.plane(plane_id),
        winding: None,
        // Hull interiors carry no meaningful contents of their own; the
        // brush's aggregate contents is what downstream code consults.
        contents: Contents::Empty,
        texture,
        bevel: true,
    });
    Ok(())
}

/// Expands `hull0_faces` (a brush's realised hull-0, with windings filled
/// in) into the plane-id-only face list for hull `hull_index`, picking the
/// custom hull-shape algorithm (4.G) when `hull_shape` is bound and active,
/// otherwise the default box algorithm (4.F) (spec §4.I "`Expand(brush, h)`").
pub fn expand(
    pool: &PlanePool,
    hull0_faces: &[BFace],
    hull_index: usize,
    options: &CsgOptions,
    hull_shape: Option<&HullShape>,
    diag: Diagnostic,
) -> Result<Vec<BFace>> {
    match hull_shape {
        Some(shape) if shape.is_active() => {
            let hullbrush = shape.hullbrush.as_ref().expect("is_active implies Some");
            hullshape_expand::expand_hullshape(pool, hull0_faces, hullbrush, diag)
        }
        _ => boxhull::expand_box(
            pool,
            hull0_faces,
            options.hull_sizes[hull_index],
            options.cliptype,
            options.floor_z,
            diag,
        ),
    }
}
