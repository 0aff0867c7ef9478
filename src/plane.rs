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

//! The shared, de-duplicated plane pool (component B).
//!
//! Planes are appended in matched pairs `(p, p^1)` and never mutated or
//! removed once inserted (spec §3, §4.B). Lookups are lock-free; only an
//! actual miss takes the append lock, and even then re-scans under the lock
//! before appending, to avoid two threads racing to insert the same novel
//! plane (spec §5).

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicUsize, Ordering};

use cgmath::InnerSpace;
use num::FromPrimitive;
use parking_lot::Mutex;

use crate::error::{CsgError, CsgErrorKind, Diagnostic};
use crate::vecmath::{Axis, Vec3};

pub type PlaneId = u32;

/// Toggling the low bit of a plane id flips its orientation (spec §3).
#[inline]
pub fn sibling(id: PlaneId) -> PlaneId {
    id ^ 1
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlaneType {
    AxialX,
    AxialY,
    AxialZ,
    NonAxialXMajor,
    NonAxialYMajor,
    NonAxialZMajor,
}

impl PlaneType {
    /// The coordinate axis with the largest-magnitude normal component.
    pub fn dominant_axis(self) -> Axis {
        let idx = match self {
            PlaneType::AxialX | PlaneType::NonAxialXMajor => 0,
            PlaneType::AxialY | PlaneType::NonAxialYMajor => 1,
            PlaneType::AxialZ | PlaneType::NonAxialZMajor => 2,
        };
        Axis::from_usize(idx).expect("dominant axis index is always 0..=2")
    }

    pub fn is_axial(self) -> bool {
        matches!(self, PlaneType::AxialX | PlaneType::AxialY | PlaneType::AxialZ)
    }
}

/// A component threshold above which a normal is treated as aligned with its
/// dominant axis rather than merely "major" along it (spec §3's "axial, …
/// non-axial-X-major" distinction).
const AXIAL_THRESHOLD: f64 = 1.0 - 1e-6;

/// Below this magnitude a candidate cross-product normal is considered
/// degenerate (spec §4.B `PlaneFromPoints` "if degenerate return -1").
const MIN_NORMAL_LENGTH: f64 = 1e-10;

pub fn classify_plane_type(normal: Vec3) -> PlaneType {
    let (axis, value) = dominant_axis(normal);
    if value.abs() > AXIAL_THRESHOLD {
        match axis {
            0 => PlaneType::AxialX,
            1 => PlaneType::AxialY,
            _ => PlaneType::AxialZ,
        }
    } else {
        match axis {
            0 => PlaneType::NonAxialXMajor,
            1 => PlaneType::NonAxialYMajor,
            _ => PlaneType::NonAxialZMajor,
        }
    }
}

fn dominant_axis(n: Vec3) -> (usize, f64) {
    let abs = [n.x.abs(), n.y.abs(), n.z.abs()];
    let mut axis = 0;
    for i in 1..3 {
        if abs[i] > abs[axis] {
            axis = i;
        }
    }
    (axis, n[axis])
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub dist: f64,
    pub ty: PlaneType,
    pub origin: Vec3,
}

impl Plane {
    /// Signed distance from `point` to this plane.
    pub fn dist_to(&self, point: Vec3) -> f64 {
        point.dot(self.normal) - self.dist
    }
}

/// Canonicalises a query normal/origin pair into the `(first, sibling)` plane
/// pair the pool stores, and reports whether the query itself matches the
/// first (even) id or its sibling (spec §4.B "Canonicalisation").
fn canonicalize(normal: Vec3, origin: Vec3) -> (Plane, Plane, bool) {
    let mut n = normal.normalize();
    let ty = classify_plane_type(n);

    if let PlaneType::AxialX | PlaneType::AxialY | PlaneType::AxialZ = ty {
        let axis = ty.dominant_axis() as usize;
        let sign = n[axis].signum();
        n = Vec3::new(0.0, 0.0, 0.0);
        n[axis] = sign;
    }

    let dist = origin.dot(n);
    let dominant = ty.dominant_axis() as usize;
    let query_is_negative = n[dominant] < 0.0;

    let (first_normal, first_dist) = if query_is_negative {
        (-n, -dist)
    } else {
        (n, dist)
    };

    let first = Plane {
        normal: first_normal,
        dist: first_dist,
        ty,
        origin,
    };
    let second = Plane {
        normal: -first_normal,
        dist: -first_dist,
        ty,
        origin,
    };

    (first, second, query_is_negative)
}

fn planes_match(stored: &Plane, normal: Vec3, origin: Vec3, dir_epsilon: f64, dist_epsilon: f64) -> bool {
    for c in 0..3 {
        if (stored.normal[c] - normal[c]).abs() > dir_epsilon {
            return false;
        }
    }
    (stored.normal.dot(origin) - stored.dist).abs() < dist_epsilon
}

/// Append-only, concurrent-safe plane table (spec §4.B, §5).
///
/// Storage is a fixed-capacity array of `UnsafeCell<MaybeUninit<Plane>>`
/// slots: once a slot's index is below the published length, it is
/// permanently initialised and its address never changes, so lock-free
/// readers can scan `0..len` safely. `len` is published with `Release`
/// ordering after the slot write and observed with `Acquire` before any
/// read, which is the fence the spec's open question about the optimistic
/// scan calls for (spec §9).
pub struct PlanePool {
    storage: Box<[UnsafeCell<MaybeUninit<Plane>>]>,
    len: AtomicUsize,
    append_lock: Mutex<()>,
    capacity: usize,
    dir_epsilon: f64,
    dist_epsilon: f64,
}

unsafe impl Sync for PlanePool {}
unsafe impl Send for PlanePool {}

impl PlanePool {
    pub fn new(capacity: usize, dir_epsilon: f64, dist_epsilon: f64) -> PlanePool {
        let mut storage = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            storage.push(UnsafeCell::new(MaybeUninit::uninit()));
        }

        PlanePool {
            storage: storage.into_boxed_slice(),
            len: AtomicUsize::new(0),
            append_lock: Mutex::new(()),
            capacity,
            dir_epsilon,
            dist_epsilon,
        }
    }

    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a copy of the plane at `id`. Panics if `id` is out of range;
    /// callers only ever hold ids this pool itself returned.
    pub fn plane(&self, id: PlaneId) -> Plane {
        let idx = id as usize;
        debug_assert!(idx < self.len());
        unsafe { (*self.storage[idx].get()).assume_init() }
    }

    fn scan(&self, start: usize, end: usize, normal: Vec3, origin: Vec3) -> Option<PlaneId> {
        for idx in start..end {
            let stored = unsafe { &*(*self.storage[idx].get()).as_ptr() };
            if planes_match(stored, normal, origin, self.dir_epsilon, self.dist_epsilon) {
                return Some(idx as PlaneId);
            }
        }
        None
    }

    unsafe fn write_slot(&self, idx: usize, plane: Plane) {
        (*self.storage[idx].get()).write(plane);
    }

    /// Finds or inserts the plane through `origin` with the given unit
    /// `normal`, returning the id oriented to match the query (spec §4.B).
    pub fn find_int_plane(&self, normal: Vec3, origin: Vec3, diag: Diagnostic) -> Result<PlaneId, CsgError> {
        let snapshot = self.len();
        if let Some(id) = self.scan(0, snapshot, normal, origin) {
            return Ok(id);
        }

        let _guard = self.append_lock.lock();

        // Re-scan from the last examined index: another thread may have
        // inserted this exact plane while we were waiting for the lock.
        let rescan_end = self.len();
        if let Some(id) = self.scan(snapshot, rescan_end, normal, origin) {
            return Ok(id);
        }

        if rescan_end + 2 > self.capacity {
            return Err(CsgErrorKind::PlanePoolExhausted(diag, self.capacity).into());
        }

        let (first, second, query_is_negative) = canonicalize(normal, origin);
        unsafe {
            self.write_slot(rescan_end, first);
            self.write_slot(rescan_end + 1, second);
        }
        self.len.store(rescan_end + 2, Ordering::Release);

        let first_id = rescan_end as PlaneId;
        Ok(if query_is_negative { first_id ^ 1 } else { first_id })
    }

    /// Computes the plane through three points in winding order and finds or
    /// inserts it. Returns `None` if the three points are degenerate (spec
    /// §4.B `PlaneFromPoints`).
    pub fn plane_from_points(
        &self,
        p0: Vec3,
        p1: Vec3,
        p2: Vec3,
        diag: Diagnostic,
    ) -> Result<Option<PlaneId>, CsgError> {
        let normal = (p0 - p1).cross(p2 - p1);
        let len = normal.magnitude();
        if len < MIN_NORMAL_LENGTH {
            return Ok(None);
        }

        self.find_int_plane(normal / len, p0, diag).map(Some)
    }
}
