//! Joint label inference from naming conventions
//!
//! Recognized side markers (case-insensitive):
//! - prefixes `L_`, `l.`, `Left_`, `left-`, and CamelCase `LeftArm`
//! - suffixes `_L`, `.l`, `-Left`, and CamelCase `ArmLeft`
//!
//! Namespaces (`mixamorig:LeftArm`) are stripped first. Names without a side
//! marker are labeled `Center`.

use rigcheck_core::{JointLabel, Side};

const SEPARATORS: [char; 4] = ['_', '.', '-', ' '];

const MARKERS: [(Side, &str); 4] = [
    (Side::Left, "left"),
    (Side::Right, "right"),
    (Side::Left, "l"),
    (Side::Right, "r"),
];

/// Guess side and kind from a joint name
pub fn infer_label(name: &str) -> JointLabel {
    let base = name.rsplit(':').next().unwrap_or(name);
    let (side, rest) = split_side(base).unwrap_or((Side::Center, base));
    let kind = normalize_kind(rest);
    if kind.is_empty() {
        JointLabel::unlabeled()
    } else {
        JointLabel::new(side, kind)
    }
}

fn split_side(name: &str) -> Option<(Side, &str)> {
    for (side, marker) in MARKERS {
        if let Some(rest) = strip_prefix_marker(name, marker) {
            return Some((side, rest));
        }
        if let Some(rest) = strip_suffix_marker(name, marker) {
            return Some((side, rest));
        }
    }
    None
}

fn strip_prefix_marker<'a>(name: &'a str, marker: &str) -> Option<&'a str> {
    let head = name.get(..marker.len())?;
    if !head.eq_ignore_ascii_case(marker) {
        return None;
    }
    let rest = &name[marker.len()..];
    let next = rest.chars().next()?;
    if SEPARATORS.contains(&next) {
        Some(&rest[next.len_utf8()..])
    } else if marker.len() > 1 && next.is_ascii_uppercase() {
        // CamelCase only for whole words: "LeftArm" but not "Leg"
        Some(rest)
    } else {
        None
    }
}

fn strip_suffix_marker<'a>(name: &'a str, marker: &str) -> Option<&'a str> {
    let split = name.len().checked_sub(marker.len())?;
    let tail = name.get(split..)?;
    if !tail.eq_ignore_ascii_case(marker) {
        return None;
    }
    let rest = &name[..split];
    let prev = rest.chars().next_back()?;
    if SEPARATORS.contains(&prev) {
        Some(&rest[..rest.len() - prev.len_utf8()])
    } else if marker.len() > 1 && tail.starts_with(|c: char| c.is_ascii_uppercase()) {
        Some(rest)
    } else {
        None
    }
}

fn normalize_kind(rest: &str) -> String {
    rest.trim_matches(|c| SEPARATORS.contains(&c))
        .to_ascii_lowercase()
}
