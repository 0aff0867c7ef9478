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

//! Texture-derived brush contents and the mixed-contents check (component C).

use std::cmp::Ordering;

use crate::error::{CsgError, CsgErrorKind, Diagnostic};

/// A brush's (or face's) contents classification, ordered so that
/// `Ord`/`PartialOrd` agree with the "numerically greatest value wins"
/// convention `CheckBrushContents` uses when no assignment-side is present.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Contents {
    Empty = -1,
    Solid = -2,
    Water = -3,
    Slime = -4,
    Lava = -5,
    Sky = -6,
    Origin = -7,
    BoundingBox = -8,
    CurrentZero = -9,
    Current90 = -10,
    Current180 = -11,
    Current270 = -12,
    CurrentUp = -13,
    CurrentDown = -14,
    Translucent = -15,
    Hint = -16,
    Null = -17,
    BlockLight = -18,
    ToEmpty = -19,
}

impl Contents {
    pub fn value(self) -> i32 {
        self as i32
    }
}

impl PartialOrd for Contents {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Contents {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value().cmp(&other.value())
    }
}

fn starts_with_ci(name: &str, prefix: &str) -> bool {
    name.len() >= prefix.len() && name[..prefix.len()].eq_ignore_ascii_case(prefix)
}

fn eq_ci(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Whether `texture` is an "assignment-side": one whose content tag
/// overrides whatever the rest of the brush's sides would otherwise
/// aggregate to (spec §4.C).
pub fn is_assignment_side(texture: &str) -> bool {
    starts_with_ci(texture, "content") || starts_with_ci(texture, "skip")
}

/// Classifies a single side's texture name into a `Contents` value: a
/// case-insensitive prefix dispatch over the table in spec §4.C.
pub fn texture_contents(name: &str) -> Contents {
    if starts_with_ci(name, "contentsolid") {
        return Contents::Solid;
    }
    if starts_with_ci(name, "contentwater") {
        return Contents::Water;
    }
    if starts_with_ci(name, "contentempty") {
        return Contents::ToEmpty;
    }
    if starts_with_ci(name, "contentsky") || starts_with_ci(name, "sky") || starts_with_ci(name, "env_sky") {
        return Contents::Sky;
    }
    if let Some(rest) = name.strip_prefix('!') {
        if starts_with_ci(rest, "cur_90") {
            return Contents::Current90;
        }
        if starts_with_ci(rest, "cur_0") {
            return Contents::CurrentZero;
        }
        if starts_with_ci(rest, "cur_270") {
            return Contents::Current270;
        }
        if starts_with_ci(rest, "cur_180") {
            return Contents::Current180;
        }
        if starts_with_ci(rest, "cur_up") {
            return Contents::CurrentUp;
        }
        if starts_with_ci(rest, "cur_dwn") {
            return Contents::CurrentDown;
        }
        if starts_with_ci(rest, "lava") || rest.starts_with('!') && starts_with_ci(&rest[1..], "lava") {
            return Contents::Lava;
        }
        if starts_with_ci(rest, "slime") || rest.starts_with('!') && starts_with_ci(&rest[1..], "slime") {
            return Contents::Slime;
        }
        return Contents::Water;
    }
    if starts_with_ci(name, "origin") {
        return Contents::Origin;
    }
    if starts_with_ci(name, "boundingbox") {
        return Contents::BoundingBox;
    }
    if starts_with_ci(name, "solidhint") || starts_with_ci(name, "bolidhint") {
        return Contents::Null;
    }
    if eq_ci(name, "blocklight") {
        return Contents::BlockLight;
    }
    if starts_with_ci(name, "splitface") {
        return Contents::Hint;
    }
    if starts_with_ci(name, "hint") || starts_with_ci(name, "skip") {
        return Contents::ToEmpty;
    }
    if starts_with_ci(name, "translucent") {
        return Contents::Translucent;
    }
    if name.starts_with('@') {
        return Contents::Translucent;
    }
    if starts_with_ci(name, "null") || starts_with_ci(name, "bevel") {
        return Contents::Null;
    }

    Contents::Solid
}

/// `true` for the handful of entities (`worldspawn`, `func_group`) that
/// assemble the static world geometry and so may never contain an
/// ORIGIN or BOUNDINGBOX brush (spec §4.C).
pub fn is_worldspawn_or_group(classname: &str) -> bool {
    eq_ci(classname, "worldspawn") || eq_ci(classname, "func_group")
}

const OTHER_ENTITY_ALLOWED: &[Contents] = &[
    Contents::Solid,
    Contents::Water,
    Contents::Slime,
    Contents::Lava,
    Contents::Origin,
    Contents::BoundingBox,
    Contents::Hint,
    Contents::BlockLight,
    Contents::ToEmpty,
];

/// Runs `CheckBrushContents` over a brush's side textures in order (spec
/// §4.C): picks the aggregate contents (first assignment-side, or
/// numerically-greatest otherwise), rejects mixed non-exempt sides, rewrites
/// `NULL` to `SOLID`, and enforces the worldspawn/func_group vs. other-entity
/// content restrictions.
pub fn check_brush_contents(
    textures: &[String],
    is_worldspawn_or_group: bool,
    diag: Diagnostic,
) -> Result<Contents, CsgError> {
    if textures.is_empty() {
        return Err(CsgErrorKind::DegeneratePlane(diag).into());
    }

    let per_side: Vec<Contents> = textures.iter().map(|t| texture_contents(t)).collect();
    let assignment_idx = textures.iter().position(|t| is_assignment_side(t));

    let aggregate = match assignment_idx {
        Some(i) => per_side[i],
        None => *per_side.iter().max().unwrap(),
    };

    for (i, texture) in textures.iter().enumerate() {
        let contents = per_side[i];
        if is_assignment_side(texture) {
            continue;
        }
        if assignment_idx.is_some() && !matches!(contents, Contents::Origin | Contents::Hint | Contents::BoundingBox)
        {
            continue;
        }
        if matches!(contents, Contents::Sky | Contents::Null) {
            continue;
        }
        if contents != aggregate {
            return Err(CsgErrorKind::MixedFaceContents(diag, texture.clone()).into());
        }
    }

    let aggregate = if aggregate == Contents::Null { Contents::Solid } else { aggregate };

    if is_worldspawn_or_group {
        if matches!(aggregate, Contents::Origin | Contents::BoundingBox) {
            return Err(CsgErrorKind::DisallowedContents(diag, aggregate).into());
        }
    } else if !OTHER_ENTITY_ALLOWED.contains(&aggregate) {
        return Err(CsgErrorKind::DisallowedContents(diag, aggregate).into());
    }

    Ok(aggregate)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_texture_contents_table() {
        assert_eq!(texture_contents("SKY"), Contents::Sky);
        assert_eq!(texture_contents("contentsolid1"), Contents::Solid);
        assert_eq!(texture_contents("contentwater"), Contents::Water);
        assert_eq!(texture_contents("!cur_90test"), Contents::Current90);
        assert_eq!(texture_contents("!lava1"), Contents::Lava);
        assert_eq!(texture_contents("!acid"), Contents::Water);
        assert_eq!(texture_contents("origin"), Contents::Origin);
        assert_eq!(texture_contents("solidhint"), Contents::Null);
        assert_eq!(texture_contents("bolidhint"), Contents::Null);
        assert_eq!(texture_contents("blocklight"), Contents::BlockLight);
        assert_eq!(texture_contents("blocklight2"), Contents::Solid);
        assert_eq!(texture_contents("splitface"), Contents::Hint);
        assert_eq!(texture_contents("hint"), Contents::ToEmpty);
        assert_eq!(texture_contents("@glass"), Contents::Translucent);
        assert_eq!(texture_contents("null"), Contents::Null);
        assert_eq!(texture_contents("bevel"), Contents::Null);
        assert_eq!(texture_contents("wall01"), Contents::Solid);
    }

    #[test]
    fn test_mixed_contents_fatal_without_assignment_side() {
        let textures = vec!["solid".to_string(), "solid".to_string(), "!water1".to_string()];
        let err = check_brush_contents(&textures, false, Diagnostic::new(0, 0)).unwrap_err();
        assert!(matches!(err.kind(), CsgErrorKind::MixedFaceContents(_, _)));
    }

    #[test]
    fn test_assignment_side_locks_aggregate() {
        let textures = vec!["contentwater".to_string(), "wall01".to_string()];
        let result = check_brush_contents(&textures, false, Diagnostic::new(0, 0)).unwrap();
        assert_eq!(result, Contents::Water);
    }

    #[test]
    fn test_null_rewritten_to_solid() {
        let textures = vec!["null".to_string(), "null".to_string()];
        let result = check_brush_contents(&textures, false, Diagnostic::new(0, 0)).unwrap();
        assert_eq!(result, Contents::Solid);
    }

    #[test]
    fn test_worldspawn_rejects_origin() {
        let textures = vec!["origin".to_string(), "origin".to_string()];
        let err = check_brush_contents(&textures, true, Diagnostic::new(0, 0)).unwrap_err();
        assert!(matches!(err.kind(), CsgErrorKind::DisallowedContents(_, Contents::Origin)));
    }

    #[test]
    fn test_origin_allowed_on_non_worldspawn_entity() {
        let textures = vec!["origin".to_string(), "origin".to_string()];
        let result = check_brush_contents(&textures, false, Diagnostic::new(0, 0)).unwrap();
        assert_eq!(result, Contents::Origin);
    }

    #[test]
    fn test_sky_and_null_exempt_from_mixing() {
        let textures = vec!["wall01".to_string(), "wall01".to_string(), "sky".to_string()];
        let result = check_brush_contents(&textures, false, Diagnostic::new(0, 0)).unwrap();
        assert_eq!(result, Contents::Solid);
    }
}
