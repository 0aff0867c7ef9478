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

use failure::{Backtrace, Context, Fail};
use std::fmt::{self, Display};

/// Identifies the brush (and, where relevant, side) a diagnostic refers to
/// (spec §6 "Diagnostics"). `entity`/`brush` are the original map indices;
/// `side` is `None` for brush-level diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct Diagnostic {
    pub entity: i32,
    pub brush: i32,
    pub side: Option<i32>,
}

impl Diagnostic {
    pub fn new(entity: i32, brush: i32) -> Diagnostic {
        Diagnostic {
            entity,
            brush,
            side: None,
        }
    }

    pub fn with_side(entity: i32, brush: i32, side: i32) -> Diagnostic {
        Diagnostic {
            entity,
            brush,
            side: Some(side),
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.side {
            Some(side) => write!(
                f,
                "(entity {}, brush {}, side {})",
                self.entity, self.brush, side
            ),
            None => write!(f, "(entity {}, brush {})", self.entity, self.brush),
        }
    }
}

#[derive(Debug)]
pub struct CsgError {
    inner: Context<CsgErrorKind>,
}

impl CsgError {
    pub fn kind(&self) -> CsgErrorKind {
        self.inner.get_context().clone()
    }
}

impl From<CsgErrorKind> for CsgError {
    fn from(kind: CsgErrorKind) -> Self {
        CsgError {
            inner: Context::new(kind),
        }
    }
}

impl From<Context<CsgErrorKind>> for CsgError {
    fn from(inner: Context<CsgErrorKind>) -> Self {
        CsgError { inner }
    }
}

impl Fail for CsgError {
    fn cause(&self) -> Option<&dyn Fail> {
        self.inner.cause()
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        self.inner.backtrace()
    }
}

impl Display for CsgError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

/// Fatal error kinds (spec §7). Topology warnings are not represented here:
/// spec §7 says they "warn, continue", so they are reported through `log::warn!`
/// at the call site rather than propagated as a `Result::Err`.
#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum CsgErrorKind {
    #[fail(display = "{} plane pool exhausted (capacity {})", _0, _1)]
    PlanePoolExhausted(Diagnostic, usize),

    #[fail(display = "{} hull-shape registry exhausted (capacity {})", _0, _1)]
    HullShapeRegistryExhausted(Diagnostic, usize),

    #[fail(display = "{} plane with no normal", _0)]
    DegeneratePlane(Diagnostic),

    #[fail(display = "{} coplanar faces", _0)]
    CoplanarFaces(Diagnostic),

    #[fail(
        display = "{} mixed face contents: side with texture \"{}\" does not match brush contents",
        _0, _1
    )]
    MixedFaceContents(Diagnostic, String),

    #[fail(
        display = "{} brush extends outside world bounds: mins=({}, {}, {}) maxs=({}, {}, {})",
        _0, _1, _2, _3, _4, _5, _6
    )]
    BrushOutsideWorld(Diagnostic, f64, f64, f64, f64, f64, f64),

    #[fail(display = "{} invalid hull-shape brush: {}", _0, _1)]
    InvalidHullShapeBrush(Diagnostic, String),

    #[fail(
        display = "{} info_hullshape entity has more than one non-origin brush",
        _0
    )]
    MultipleHullShapeBrushes(Diagnostic),

    #[fail(
        display = "{} disallowed contents {:?} for entity of this kind",
        _0, _1
    )]
    DisallowedContents(Diagnostic, crate::contents::Contents),
}

pub type Result<T> = std::result::Result<T, CsgError>;
