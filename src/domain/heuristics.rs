// src/domain/heuristics.rs

const BEDROOM_MARKER: &str = "br";
const SIZE_MARKER: &str = "ft2";

/// Splits a housing token such as `"2br - 850ft2"` into `(bedrooms, size)`.
///
/// Either half may be missing or in either order. The values are whatever is left
/// after removing the marker; they are not required to be numeric.
///
/// When both halves carry the same marker, the first one wins.
pub fn parse_housing(raw: &str) -> (Option<String>, Option<String>) {
    let parts: Vec<&str> = raw
        .trim()
        .split('-')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    match parts.as_slice() {
        [first, second] => (
            pick(first, second, BEDROOM_MARKER),
            pick(first, second, SIZE_MARKER),
        ),
        [first, ..] => {
            if first.contains(BEDROOM_MARKER) {
                (strip(first, BEDROOM_MARKER), None)
            } else if first.contains(SIZE_MARKER) {
                (None, strip(first, SIZE_MARKER))
            } else {
                (None, None)
            }
        }
        [] => (None, None),
    }
}

fn pick(first: &str, second: &str, marker: &str) -> Option<String> {
    if first.contains(marker) {
        strip(first, marker)
    } else if second.contains(marker) {
        strip(second, marker)
    } else {
        None
    }
}

fn strip(part: &str, marker: &str) -> Option<String> {
    let value = part.replace(marker, "");
    let value = value.trim();
    // "0" is the on-disk marker for "not specified"
    if value.is_empty() || value == "0" {
        None
    } else {
        Some(value.to_string())
    }
}
