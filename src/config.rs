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

//! Compile-time tunables and the external configuration surface (spec §6).

use crate::vecmath::Vec3;

/// Number of hulls the driver produces per brush: hull 0 (the raw shape) plus
/// three expanded collision hulls.
pub const NUM_HULLS: usize = 4;

/// Hard capacity of the shared plane pool. Exceeding this is fatal (spec §4.B).
pub const MAX_INTERNAL_MAP_PLANES: usize = 1 << 20;

/// Hard capacity of the named hull-shape registry.
pub const MAX_HULLSHAPES: usize = 128;

/// Tolerance used when deduplicating plane normals in `PlanePool::find_int_plane`.
pub const DIR_EPSILON: f64 = 0.0001;

/// Tolerance used when deduplicating plane distances in `PlanePool::find_int_plane`.
pub const DIST_EPSILON: f64 = 0.04;

/// Generic axial-probe tolerance: used to decide whether a normal component is
/// "effectively zero" (face sort scoring, winding chop tolerance, edge bevel checks).
pub const NORMAL_EPSILON: f64 = 0.00001;

/// On-plane tolerance used by winding colinear-point removal and face/vertex
/// membership checks.
pub const ON_EPSILON: f64 = 0.04;

/// Coplanar-face tolerance used by the custom hull-shape face/vertex matcher.
pub const EQUAL_EPSILON: f64 = 0.004;

/// Sentinel "large distance" used to size the initial bounding quad of a winding.
pub const BOGUS_RANGE: f64 = 18_000.0;

/// Default threshold on a plane normal's z-component above which it is
/// considered a floor for the `Precise` cliptype (spec §6).
pub const DEFAULT_FLOOR_Z: f64 = 0.7;

/// A non-axial face whose winding area falls below this is pruned by
/// `make_hull_faces` (spec §4.E).
pub const MIN_FACE_AREA: f64 = 0.1;

/// Default world extent: coordinates outside `[-extent, extent]` after hull
/// realisation are a fatal "brush outside world" error (spec §4.E).
pub const DEFAULT_MAX_WORLD_EXTENT: f64 = 65_536.0;

/// The min/max corners of an expanded collision box for one non-zero hull.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HullSize {
    pub mins: Vec3,
    pub maxs: Vec3,
}

impl HullSize {
    pub const fn new(mins: Vec3, maxs: Vec3) -> HullSize {
        HullSize { mins, maxs }
    }
}

/// Offset-policy selector for the default box expansion (spec §4.F, §9).
///
/// Each variant captures one of the four distinct per-axis shift rules the
/// original tool selects between via a flat `cliptype` global; modelling it as
/// an enum with an associated method avoids re-deriving the branch at every
/// call site.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Cliptype {
    Legacy,
    Normalized,
    Simple,
    Precise,
    Smallest,
}

impl Cliptype {
    /// Whether Phase 2 (edge/edge bevel planes) runs at all under this
    /// cliptype (spec §4.F Phase 2: "only under simple | normalized | precise").
    pub fn generates_edge_bevels(self) -> bool {
        match self {
            Cliptype::Simple | Cliptype::Normalized | Cliptype::Precise => true,
            Cliptype::Legacy | Cliptype::Smallest => false,
        }
    }

    /// Per-axis offset applied to a non-axial face's plane to produce its
    /// Phase-1 expansion (spec §4.F Phase 1). `normal_component` is the face
    /// normal's component along `axis`; `mins`/`maxs` are the hull size's
    /// component along the same axis; `is_floor` is whether the face as a
    /// whole was classified a floor (`normal.z > floor_z`) for `Precise`.
    pub fn axis_offset(self, axis: usize, normal_component: f64, mins: f64, maxs: f64, is_floor: bool) -> f64 {
        match self {
            Cliptype::Legacy | Cliptype::Normalized => {
                if normal_component > 0.0 {
                    maxs
                } else {
                    -mins
                }
            }
            Cliptype::Simple => {
                if normal_component > 0.0 {
                    maxs
                } else {
                    mins
                }
            }
            Cliptype::Precise => {
                if is_floor && axis != 2 {
                    0.0
                } else if is_floor {
                    maxs
                } else if normal_component > 0.0 {
                    maxs
                } else {
                    mins
                }
            }
            Cliptype::Smallest => 0.0,
        }
    }
}

impl Default for Cliptype {
    fn default() -> Self {
        Cliptype::Simple
    }
}

/// The complete external configuration surface consumed by the driver
/// (spec §6): cliptype, per-hull collision box sizes, and the floor/world
/// extent thresholds.
#[derive(Clone, Debug)]
pub struct CsgOptions {
    pub cliptype: Cliptype,
    pub hull_sizes: [HullSize; NUM_HULLS],
    pub floor_z: f64,
    pub max_world_extent: f64,
    pub max_internal_map_planes: usize,
    pub noclip_global: bool,
}

impl Default for CsgOptions {
    fn default() -> Self {
        CsgOptions {
            cliptype: Cliptype::default(),
            hull_sizes: default_hull_sizes(),
            floor_z: DEFAULT_FLOOR_Z,
            max_world_extent: DEFAULT_MAX_WORLD_EXTENT,
            max_internal_map_planes: MAX_INTERNAL_MAP_PLANES,
            noclip_global: false,
        }
    }
}

/// The classic point/duck/crouch hull sizes used by the source engine. Hull 0
/// is unused here (it is the raw brush shape, not a box) but is still present
/// so the array can be indexed directly by hull id.
fn default_hull_sizes() -> [HullSize; NUM_HULLS] {
    [
        HullSize::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 0.0)),
        HullSize::new(Vec3::new(-16.0, -16.0, -36.0), Vec3::new(16.0, 16.0, 36.0)),
        HullSize::new(Vec3::new(-32.0, -32.0, -32.0), Vec3::new(32.0, 32.0, 32.0)),
        HullSize::new(Vec3::new(-16.0, -16.0, -18.0), Vec3::new(16.0, 16.0, 18.0)),
    ]
}
