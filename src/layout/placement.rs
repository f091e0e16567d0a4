//! Deterministic placement helpers.
//!
//! Nodes imported without coordinates are seeded on a sunflower spiral
//! (Fermat's spiral with the golden angle), which spreads any number of nodes
//! at roughly uniform density. The same golden-angle sequence gives the force
//! and overlap stages a reproducible direction for pairs of coincident nodes.

/// The golden angle in radians, ~2.3999.
pub const GOLDEN_ANGLE: f64 = std::f64::consts::PI * (3.0 - 2.236_067_977_499_79);

/// Position of the `index`-th node on a sunflower spiral.
///
/// Consecutive points are roughly `spacing` apart.
pub fn spiral_position(index: usize, spacing: f64) -> (f64, f64) {
    let r = spacing * (index as f64 + 0.5).sqrt();
    let theta = index as f64 * GOLDEN_ANGLE;
    (r * theta.cos(), r * theta.sin())
}

/// Unit vector used to separate nodes `i` and `j` when they coincide.
///
/// Depends only on the slot indices, so repeated runs push the same way.
pub fn separation_direction(i: usize, j: usize) -> (f64, f64) {
    let (lo, hi) = if i < j { (i, j) } else { (j, i) };
    let theta = (lo as f64 * 31.0 + hi as f64) * GOLDEN_ANGLE;
    let (sin, cos) = theta.sin_cos();
    if i < j { (cos, sin) } else { (-cos, -sin) }
}
