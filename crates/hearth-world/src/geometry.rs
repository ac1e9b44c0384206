//! Plane geometry for the bounded `[0, 100]²` world.
//!
//! Everything moves in straight lines; there is no pathfinding. Positions
//! are clamped back into the world after every step.

use hearth_types::Position;

/// Lower bound of both axes.
pub const WORLD_MIN: f64 = 0.0;
/// Upper bound of both axes.
pub const WORLD_MAX: f64 = 100.0;
/// Distance under which a mover counts as arrived.
pub const ARRIVAL_EPSILON: f64 = 0.1;

/// Clamp a position into the world bounds.
pub fn clamp_to_world(position: Position) -> Position {
    clamp_within(position, WORLD_MIN, WORLD_MAX)
}

/// Clamp both coordinates of a position into `[lo, hi]`.
pub fn clamp_within(position: Position, lo: f64, hi: f64) -> Position {
    Position::new(clamp_axis(position.x, lo, hi), clamp_axis(position.y, lo, hi))
}

fn clamp_axis(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        return lo;
    }
    value.clamp(lo, hi)
}

/// Whether two points are within `range` of each other (inclusive).
pub fn within(a: Position, b: Position, range: f64) -> bool {
    a.distance_to(b) <= range
}

/// Unit vector from `from` toward `to`, or `(0, 0)` if they coincide.
pub fn direction(from: Position, to: Position) -> (f64, f64) {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    normalize(dx, dy)
}

/// Normalize a vector, returning `(0, 0)` for a zero-length input.
pub fn normalize(x: f64, y: f64) -> (f64, f64) {
    let len = x.hypot(y);
    if len <= f64::EPSILON {
        (0.0, 0.0)
    } else {
        (x / len, y / len)
    }
}

/// Rotate a vector by `degrees` counter-clockwise.
pub fn rotate(x: f64, y: f64, degrees: f64) -> (f64, f64) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    (x * cos - y * sin, x * sin + y * cos)
}

/// Move from `from` toward `to` by at most `max_step`, never overshooting.
///
/// Returns the new (clamped) position and whether the mover arrived, i.e.
/// ended within [`ARRIVAL_EPSILON`] of the target.
pub fn step_towards(from: Position, to: Position, max_step: f64) -> (Position, bool) {
    let distance = from.distance_to(to);
    if distance < ARRIVAL_EPSILON {
        return (clamp_to_world(from), true);
    }
    if max_step >= distance {
        return (clamp_to_world(to), true);
    }
    let (ux, uy) = direction(from, to);
    let next = clamp_to_world(Position::new(from.x + ux * max_step, from.y + uy * max_step));
    let arrived = next.distance_to(to) < ARRIVAL_EPSILON;
    (next, arrived)
}

/// A point `distance` units from `origin` along the unit vector `(ux, uy)`.
pub fn offset(origin: Position, ux: f64, uy: f64, distance: f64) -> Position {
    Position::new(origin.x + ux * distance, origin.y + uy * distance)
}
