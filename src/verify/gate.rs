use crate::render::backend::Artifact;

/// Pixel-exact quality gate.
///
/// Any difference in size or in a single byte fails the check. This is far stricter than a
/// perceptual comparison and drives how often the retry loop runs.
pub fn pixels_match(baseline: &Artifact, candidate: &Artifact) -> bool {
    baseline.width == candidate.width
        && baseline.height == candidate.height
        && baseline.data == candidate.data
}

/// Half-open pixel box `[x0, x1) x [y0, y1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiffBounds {
    /// Left edge (inclusive).
    pub x0: u32,
    /// Top edge (inclusive).
    pub y0: u32,
    /// Right edge (exclusive).
    pub x1: u32,
    /// Bottom edge (exclusive).
    pub y1: u32,
}

/// Bounding box of every pixel that differs between two artifacts.
///
/// Returns `None` for identical artifacts. Artifacts of different sizes differ everywhere,
/// so the box covers the larger of the two canvases.
pub fn diff_bounds(a: &Artifact, b: &Artifact) -> Option<DiffBounds> {
    if a.width != b.width || a.height != b.height {
        return Some(DiffBounds {
            x0: 0,
            y0: 0,
            x1: a.width.max(b.width),
            y1: a.height.max(b.height),
        });
    }

    let mut out: Option<DiffBounds> = None;
    let row_bytes = a.width as usize * 4;
    if row_bytes == 0 {
        return None;
    }
    for (y, (ra, rb)) in a
        .data
        .chunks_exact(row_bytes)
        .zip(b.data.chunks_exact(row_bytes))
        .enumerate()
    {
        if ra == rb {
            continue;
        }
        for (x, (pa, pb)) in ra.chunks_exact(4).zip(rb.chunks_exact(4)).enumerate() {
            if pa == pb {
                continue;
            }
            let (x, y) = (x as u32, y as u32);
            out = Some(match out {
                None => DiffBounds {
                    x0: x,
                    y0: y,
                    x1: x + 1,
                    y1: y + 1,
                },
                Some(d) => DiffBounds {
                    x0: d.x0.min(x),
                    y0: d.y0.min(y),
                    x1: d.x1.max(x + 1),
                    y1: d.y1.max(y + 1),
                },
            });
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/verify/gate.rs"]
mod tests;
