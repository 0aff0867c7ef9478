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

//! Clip-hull construction core: turns a stream of map brushes into, per
//! brush, a raw boundary hull and a set of Minkowski-expanded collision
//! hulls ready for a downstream BSP builder.
//!
//! - [`vecmath`] — vector helpers and the convex-polygon `Winding` type.
//! - [`plane`] — the shared, de-duplicated plane pool.
//! - [`contents`] — texture-derived brush contents classification.
//! - [`brush`] — brush-side resolution into pooled planes.
//! - [`hull`] — winding realisation and bounds.
//! - [`expand`] — Minkowski-sum hull expansion (box and custom shapes).
//! - [`hullshape`] — `info_hullshape` parsing and registry.
//! - [`driver`] — per-brush orchestration, parallelised across brushes.
//! - [`config`] — tunables and epsilon constants.
//! - [`error`] — the crate's error type and diagnostics.

#[macro_use]
extern crate num_derive;

pub mod brush;
pub mod config;
pub mod contents;
pub mod driver;
pub mod error;
pub mod expand;
pub mod hull;
pub mod hullshape;
pub mod logging;
pub mod plane;
pub mod vecmath;
