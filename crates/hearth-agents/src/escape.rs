//! Smart evasion: where a fleeing agent should run.
//!
//! The heading starts as the inverse-distance-weighted danger vector,
//! negated. Weighted attractors pull it toward safety:
//!
//! | Term                  | Radius | Weight |
//! |-----------------------|--------|--------|
//! | Away from threats     | 40     | 1.0    |
//! | Nearest safe building | 30     | 0.5    |
//! | Armed, healthy allies | 25     | 0.3    |
//! | Edge repulsion        | 15     | 0.8    |
//!
//! Five candidate points 15 units out along the heading (rotated by
//! −30°, −15°, 0°, 15° and 30°) are scored by proximity to beasts, and the
//! least threatened wins.

use hearth_types::{AgentId, Position};
use hearth_world::World;
use hearth_world::geometry::{clamp_within, direction, normalize, offset, rotate};
use rand::Rng;

use crate::error::AgentError;

/// Beasts closer than this are threats.
pub const THREAT_RADIUS: f64 = 40.0;
/// Complete buildings within this radius may shelter the agent.
pub const BUILDING_RADIUS: f64 = 30.0;
/// A building is unsafe if a threat is this close to it.
pub const BUILDING_THREAT_RADIUS: f64 = 15.0;
/// Allies within this radius attract the agent.
pub const ALLY_RADIUS: f64 = 25.0;
/// Distance from the edge at which repulsion starts.
pub const EDGE_MARGIN: f64 = 15.0;
/// How far out candidates are sampled.
pub const CANDIDATE_DISTANCE: f64 = 15.0;
/// Candidate rotations around the heading, degrees.
pub const CANDIDATE_ANGLES: [f64; 5] = [-30.0, -15.0, 0.0, 15.0, 30.0];
/// Beasts within this radius of a candidate count against it.
pub const SCORING_RADIUS: f64 = 20.0;
/// Hop size when nothing threatens the agent.
pub const CALM_HOP: f64 = 10.0;

const BUILDING_WEIGHT: f64 = 0.5;
const ALLY_WEIGHT: f64 = 0.3;
const EDGE_WEIGHT: f64 = 0.8;
const EDGE_PUSH: f64 = 0.3;
const ALLY_MIN_HEALTH: f64 = 50.0;

/// Pick the point `agent` should flee toward.
pub fn escape_target(world: &World, agent: AgentId, rng: &mut impl Rng) -> Result<Position, AgentError> {
    let position = world.agent(agent)?.position;

    let threats: Vec<(Position, f64)> = world
        .beasts
        .values()
        .filter(|b| b.is_aggressive())
        .map(|b| (b.position, b.position.distance_to(position)))
        .filter(|&(_, d)| d > 0.0 && d < THREAT_RADIUS)
        .collect();

    if threats.is_empty() {
        let hop = Position::new(
            position.x + rng.random_range(-CALM_HOP..=CALM_HOP),
            position.y + rng.random_range(-CALM_HOP..=CALM_HOP),
        );
        return Ok(clamp_within(hop, 5.0, 95.0));
    }

    let (mut hx, mut hy) = away_from(position, &threats);

    if let Some((bx, by)) = safe_building_pull(world, position, &threats) {
        hx += bx * BUILDING_WEIGHT;
        hy += by * BUILDING_WEIGHT;
    }

    let (ax, ay) = ally_pull(world, agent, position);
    hx += ax * ALLY_WEIGHT;
    hy += ay * ALLY_WEIGHT;

    let (ex, ey) = edge_push(position);
    hx += ex * EDGE_WEIGHT;
    hy += ey * EDGE_WEIGHT;

    let (hx, hy) = normalize(hx, hy);
    let best = CANDIDATE_ANGLES
        .iter()
        .map(|&angle| {
            let (cx, cy) = rotate(hx, hy, angle);
            clamp_within(offset(position, cx, cy, CANDIDATE_DISTANCE), 10.0, 90.0)
        })
        .map(|candidate| (candidate, danger_at(world, candidate)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map_or(position, |(candidate, _)| candidate);
    Ok(best)
}

/// Negated, normalized average of the 1/d-weighted directions to threats.
fn away_from(position: Position, threats: &[(Position, f64)]) -> (f64, f64) {
    let (sx, sy) = threats.iter().fold((0.0, 0.0), |(sx, sy), &(threat, d)| {
        let (ux, uy) = direction(position, threat);
        (sx + ux / d, sy + uy / d)
    });
    normalize(-sx, -sy)
}

fn safe_building_pull(world: &World, position: Position, threats: &[(Position, f64)]) -> Option<(f64, f64)> {
    world
        .buildings
        .values()
        .filter(|b| b.complete)
        .map(|b| (b.position, b.position.distance_to(position)))
        .filter(|&(_, d)| d > 0.0 && d < BUILDING_RADIUS)
        .filter(|&(at, _)| {
            threats
                .iter()
                .all(|&(threat, _)| threat.distance_to(at) >= BUILDING_THREAT_RADIUS)
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(at, d)| {
            let (ux, uy) = direction(position, at);
            let bonus = 0.3 / d;
            (ux * bonus, uy * bonus)
        })
}

fn ally_pull(world: &World, agent: AgentId, position: Position) -> (f64, f64) {
    world
        .agents
        .values()
        .filter(|a| a.alive && a.id != agent && a.is_armed() && a.attributes.health > ALLY_MIN_HEALTH)
        .map(|a| (a.position, a.position.distance_to(position)))
        .filter(|&(_, d)| d > 0.0 && d < ALLY_RADIUS)
        .fold((0.0, 0.0), |(sx, sy), (at, d)| {
            let (ux, uy) = direction(position, at);
            let bonus = 0.2 / d;
            (sx + ux * bonus, sy + uy * bonus)
        })
}

fn edge_push(position: Position) -> (f64, f64) {
    let axis = |v: f64| {
        if v < EDGE_MARGIN {
            EDGE_PUSH
        } else if v > 100.0 - EDGE_MARGIN {
            -EDGE_PUSH
        } else {
            0.0
        }
    };
    (axis(position.x), axis(position.y))
}

/// Threat score of a candidate point: Σ 10 / (d + 0.1) over nearby beasts.
fn danger_at(world: &World, candidate: Position) -> f64 {
    world
        .beasts
        .values()
        .filter(|b| b.is_aggressive())
        .map(|b| b.position.distance_to(candidate))
        .filter(|&d| d < SCORING_RADIUS)
        .map(|d| 10.0 / (d + 0.1))
        .sum()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hearth_types::BeastKind;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::actions::tests::spawn;
    use crate::beast::spawn_beast;

    #[test]
    fn runs_away_from_a_single_wolf() {
        let mut world = World::new();
        let id = spawn(&mut world, "Eve", 50.0, 50.0);
        spawn_beast(&mut world, BeastKind::Wolf, Position::new(45.0, 50.0)).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);

        let target = escape_target(&world, id, &mut rng).unwrap();
        assert!(target.x > 55.0, "fled toward {target:?}");
    }

    #[test]
    fn calm_hop_stays_close() {
        let mut world = World::new();
        let id = spawn(&mut world, "Frank", 50.0, 50.0);
        spawn_beast(&mut world, BeastKind::Rabbit, Position::new(48.0, 50.0)).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);

        let target = escape_target(&world, id, &mut rng).unwrap();
        assert!(target.distance_to(Position::new(50.0, 50.0)) <= CALM_HOP * 2.0_f64.sqrt());
    }

    #[test]
    fn edge_keeps_candidates_inside() {
        let mut world = World::new();
        let id = spawn(&mut world, "Grace", 3.0, 50.0);
        spawn_beast(&mut world, BeastKind::Bear, Position::new(8.0, 50.0)).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);

        let target = escape_target(&world, id, &mut rng).unwrap();
        assert!((10.0..=90.0).contains(&target.x));
        assert!((10.0..=90.0).contains(&target.y));
    }
}
