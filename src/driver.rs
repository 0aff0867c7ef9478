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

//! Per-brush orchestration (component I): runs the full pipeline — plane
//! resolution, hull-0 realisation, expansion into the collision hulls — for
//! one brush, and fans the whole brush stream out across worker threads.

use bitflags::bitflags;
use rayon::prelude::*;

use crate::brush::{make_brush_planes, BFace, BrushInput};
use crate::config::{self, CsgOptions};
use crate::contents::Contents;
use crate::error::{Diagnostic, Result};
use crate::expand;
use crate::hull::make_hull_faces;
use crate::hullshape::HullShapeRegistry;
use crate::plane::PlanePool;

bitflags! {
    /// Which non-zero hulls a CLIP-textured brush contributes to (bit `h`
    /// set ⇒ hull `h`); a brush with any bit set vanishes from hull 0 once
    /// those hulls are expanded (spec §4.I).
    pub struct ClipHullMask: u32 {
        const HULL1 = 0b0010;
        const HULL2 = 0b0100;
        const HULL3 = 0b1000;
    }
}

impl ClipHullMask {
    fn contains_hull(self, h: usize) -> bool {
        self.bits() & (1 << h) != 0
    }
}

/// One brush as handed to the driver: its raw geometry plus the driver-level
/// flags that aren't properties of the geometry itself (spec §4.I, §6).
pub struct BrushRequest {
    pub input: BrushInput,
    /// The `info_hullshape` this brush is bound to by name, if any; falls
    /// back to each hull's registered default when unset.
    pub hullshape_id: Option<String>,
    /// Marks this brush as a CLIP brush that only contributes to the named
    /// hulls and vanishes from hull 0. Empty means "not a clip brush".
    pub cliphull: ClipHullMask,
    /// Forces this brush out of every non-zero hull.
    pub noclip: bool,
}

/// The compiled result of one brush: its final contents tag and one face
/// list per hull, ready for the downstream BSP builder (spec §6 "Outputs").
pub struct CompiledBrush {
    pub entity: i32,
    pub brush: i32,
    pub contents: Contents,
    pub hulls: [Vec<BFace>; config::NUM_HULLS],
}

fn empty_hulls() -> [Vec<BFace>; config::NUM_HULLS] {
    [Vec::new(), Vec::new(), Vec::new(), Vec::new()]
}

/// Runs the full single-brush pipeline (spec §4.I). Returns `None` for a
/// brush whose contents is ORIGIN or BOUNDINGBOX: those exist only to convey
/// entity metadata and contribute no geometry to any hull.
pub fn compile_brush(
    pool: &PlanePool,
    registry: &HullShapeRegistry,
    options: &CsgOptions,
    request: &BrushRequest,
) -> Result<Option<CompiledBrush>> {
    let diag = Diagnostic::new(request.input.entity, request.input.brush);

    let mut brush = make_brush_planes(pool, &request.input)?;
    if matches!(brush.contents, Contents::Origin | Contents::BoundingBox) {
        return Ok(None);
    }

    make_hull_faces(&mut brush.faces, diag, options.max_world_extent)?;

    let mut hulls = empty_hulls();
    hulls[0] = brush.faces;

    if matches!(brush.contents, Contents::Hint | Contents::ToEmpty | Contents::BlockLight) {
        return Ok(Some(CompiledBrush {
            entity: request.input.entity,
            brush: request.input.brush,
            contents: brush.contents,
            hulls,
        }));
    }

    if options.noclip_global {
        if !request.cliphull.is_empty() {
            hulls[0].clear();
        }
        return Ok(Some(CompiledBrush {
            entity: request.input.entity,
            brush: request.input.brush,
            contents: brush.contents,
            hulls,
        }));
    }

    let mut contents = brush.contents;
    let hull0_faces = hulls[0].clone();

    if !request.cliphull.is_empty() {
        for h in 1..config::NUM_HULLS {
            if !request.cliphull.contains_hull(h) {
                continue;
            }
            expand_into(pool, registry, options, request, &hull0_faces, h, diag, &mut hulls)?;
        }
        contents = Contents::Solid;
        hulls[0].clear();
    } else if !request.noclip {
        for h in 1..config::NUM_HULLS {
            expand_into(pool, registry, options, request, &hull0_faces, h, diag, &mut hulls)?;
        }
    }

    Ok(Some(CompiledBrush {
        entity: request.input.entity,
        brush: request.input.brush,
        contents,
        hulls,
    }))
}

/// Expands `hull0_faces` into hull `h` and realises it in place, resolving
/// whichever hull-shape (named or per-hull default) is bound for this brush.
fn expand_into(
    pool: &PlanePool,
    registry: &HullShapeRegistry,
    options: &CsgOptions,
    request: &BrushRequest,
    hull0_faces: &[BFace],
    h: usize,
    diag: Diagnostic,
    hulls: &mut [Vec<BFace>; config::NUM_HULLS],
) -> Result<()> {
    let hull_shape = request
        .hullshape_id
        .as_deref()
        .and_then(|id| registry.lookup(id))
        .or_else(|| registry.default_for_hull(h));

    let mut faces = expand::expand(pool, hull0_faces, h, options, hull_shape, diag)?;
    make_hull_faces(&mut faces, diag, options.max_world_extent)?;
    hulls[h] = faces;
    Ok(())
}

/// Compiles every brush in `requests` in parallel, sharing `pool` and
/// `registry` across worker threads (spec §5 "the driver is designed to run
/// per brush in parallel ... the plane pool" is the only shared resource).
/// A fatal error in any brush aborts the whole build.
pub fn compile_all(
    pool: &PlanePool,
    registry: &HullShapeRegistry,
    options: &CsgOptions,
    requests: &[BrushRequest],
) -> Result<Vec<CompiledBrush>> {
    let results: Result<Vec<Option<CompiledBrush>>> =
        requests.par_iter().map(|request| compile_brush(pool, registry, options, request)).collect();

    Ok(results?.into_iter().flatten().collect())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::brush::SideInput;
    use crate::vecmath::Vec3;

    fn cube_input(entity: i32, brush: i32) -> BrushInput {
        let sides = vec![
            SideInput {
                p0: Vec3::new(32.0, 32.0, 32.0),
                p1: Vec3::new(32.0, 32.0, -32.0),
                p2: Vec3::new(32.0, -32.0, 32.0),
                texture: "wall1".into(),
                bevel: false,
            },
            SideInput {
                p0: Vec3::new(-32.0, 32.0, 32.0),
                p1: Vec3::new(-32.0, -32.0, 32.0),
                p2: Vec3::new(-32.0, 32.0, -32.0),
                texture: "wall1".into(),
                bevel: false,
            },
            SideInput {
                p0: Vec3::new(32.0, 32.0, 32.0),
                p1: Vec3::new(-32.0, 32.0, 32.0),
                p2: Vec3::new(32.0, 32.0, -32.0),
                texture: "wall1".into(),
                bevel: false,
            },
            SideInput {
                p0: Vec3::new(32.0, -32.0, 32.0),
                p1: Vec3::new(32.0, -32.0, -32.0),
                p2: Vec3::new(-32.0, -32.0, 32.0),
                texture: "wall1".into(),
                bevel: false,
            },
            SideInput {
                p0: Vec3::new(32.0, 32.0, 32.0),
                p1: Vec3::new(32.0, -32.0, 32.0),
                p2: Vec3::new(-32.0, 32.0, 32.0),
                texture: "wall1".into(),
                bevel: false,
            },
            SideInput {
                p0: Vec3::new(32.0, 32.0, -32.0),
                p1: Vec3::new(-32.0, 32.0, -32.0),
                p2: Vec3::new(32.0, -32.0, -32.0),
                texture: "wall1".into(),
                bevel: false,
            },
        ];
        BrushInput {
            entity,
            brush,
            origin: Vec3::new(0.0, 0.0, 0.0),
            is_worldspawn_or_group: true,
            bevel: false,
            sides,
        }
    }

    #[test]
    fn test_compile_brush_default_box_all_hulls() {
        let pool = PlanePool::new(4096, config::DIR_EPSILON, config::DIST_EPSILON);
        let registry = HullShapeRegistry::new();
        let options = CsgOptions::default();

        let request = BrushRequest {
            input: cube_input(0, 0),
            hullshape_id: None,
            cliphull: ClipHullMask::empty(),
            noclip: false,
        };

        let compiled = compile_brush(&pool, &registry, &options, &request).unwrap().unwrap();
        assert_eq!(compiled.contents, Contents::Solid);
        assert_eq!(compiled.hulls[0].len(), 6);
        for h in 1..config::NUM_HULLS {
            assert_eq!(compiled.hulls[h].len(), 6);
        }
    }

    #[test]
    fn test_compile_brush_origin_is_skipped() {
        let pool = PlanePool::new(4096, config::DIR_EPSILON, config::DIST_EPSILON);
        let registry = HullShapeRegistry::new();
        let options = CsgOptions::default();

        let mut input = cube_input(0, 0);
        for side in &mut input.sides {
            side.texture = "origin".to_string();
        }
        input.is_worldspawn_or_group = false;

        let request = BrushRequest {
            input,
            hullshape_id: None,
            cliphull: ClipHullMask::empty(),
            noclip: false,
        };

        let compiled = compile_brush(&pool, &registry, &options, &request).unwrap();
        assert!(compiled.is_none());
    }

    #[test]
    fn test_compile_brush_noclip_keeps_only_hull_zero() {
        let pool = PlanePool::new(4096, config::DIR_EPSILON, config::DIST_EPSILON);
        let registry = HullShapeRegistry::new();
        let options = CsgOptions::default();

        let request = BrushRequest {
            input: cube_input(0, 0),
            hullshape_id: None,
            cliphull: ClipHullMask::empty(),
            noclip: true,
        };

        let compiled = compile_brush(&pool, &registry, &options, &request).unwrap().unwrap();
        assert_eq!(compiled.hulls[0].len(), 6);
        for h in 1..config::NUM_HULLS {
            assert!(compiled.hulls[h].is_empty());
        }
    }

    #[test]
    fn test_compile_all_runs_every_brush() {
        let pool = PlanePool::new(4096, config::DIR_EPSILON, config::DIST_EPSILON);
        let registry = HullShapeRegistry::new();
        let options = CsgOptions::default();

        let requests: Vec<BrushRequest> = (0..8)
            .map(|i| BrushRequest {
                input: cube_input(0, i),
                hullshape_id: None,
                cliphull: ClipHullMask::empty(),
                noclip: false,
            })
            .collect();

        let compiled = compile_all(&pool, &registry, &options, &requests).unwrap();
        assert_eq!(compiled.len(), 8);
    }
}
