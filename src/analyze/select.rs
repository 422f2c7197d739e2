use std::collections::BTreeSet;

use crate::foundation::core::ContentCategory;

/// Pick the next untried layout for `category` out of a catalog of `n` layouts.
///
/// Scans `(preferred + k) mod n` for `k in 0..n` and records the first index not in `tried`.
/// Once every layout has been tried (or the catalog is empty) layout `0` is returned and
/// `tried` is left as is.
pub fn select_layout(category: ContentCategory, tried: &mut BTreeSet<usize>, n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let preferred = category.preferred_layout();
    let next = (0..n)
        .map(|k| (preferred + k) % n)
        .find(|candidate| !tried.contains(candidate));
    match next {
        Some(idx) => {
            tried.insert(idx);
            idx
        }
        None => 0,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/analyze/select.rs"]
mod tests;
