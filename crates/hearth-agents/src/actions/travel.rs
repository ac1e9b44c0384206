//! Moving, exploring, and fleeing.
//!
//! All three only set a move target; locomotion continues independently of
//! the action timer and may still be under way when the action completes.

use hearth_types::{AgentId, Position, ResolvedTarget};
use hearth_world::World;
use hearth_world::geometry::{clamp_to_world, clamp_within};
use rand::Rng;

use super::{Outcome, Plan, Prepared};
use crate::error::AgentError;
use crate::escape::escape_target;

/// Largest explore hop along each axis.
pub const EXPLORE_RANGE: f64 = 5.0;

/// Walk to `(x, y)`.
pub fn prepare_move(x: f64, y: f64) -> Prepared {
    let to = clamp_to_world(Position::new(x, y));
    Prepared::Ready(Plan {
        target: Some(ResolvedTarget::Point(to)),
        move_to: Some(to),
        note: format!("heading to ({:.0}, {:.0})", to.x, to.y),
    })
}

/// Pick a random nearby point.
pub fn prepare_explore(world: &World, agent: AgentId, rng: &mut impl Rng) -> Result<Prepared, AgentError> {
    let from = world.agent(agent)?.position;
    let to = clamp_within(
        Position::new(
            from.x + rng.random_range(-EXPLORE_RANGE..=EXPLORE_RANGE),
            from.y + rng.random_range(-EXPLORE_RANGE..=EXPLORE_RANGE),
        ),
        5.0,
        95.0,
    );
    Ok(Prepared::Ready(Plan {
        target: Some(ResolvedTarget::Point(to)),
        move_to: Some(to),
        note: "exploring".to_owned(),
    }))
}

/// Run for the safest nearby point.
pub fn prepare_flee(world: &World, agent: AgentId, rng: &mut impl Rng) -> Result<Prepared, AgentError> {
    let to = escape_target(world, agent, rng)?;
    Ok(Prepared::Ready(Plan {
        target: Some(ResolvedTarget::Point(to)),
        move_to: Some(to),
        note: "fleeing".to_owned(),
    }))
}

/// Finish a move.
pub fn complete_move(world: &World, agent: AgentId) -> Result<Outcome, AgentError> {
    let a = world.agent(agent)?;
    let message = match a.move_target {
        None => format!("Arrived at ({:.0}, {:.0})", a.position.x, a.position.y),
        Some(to) => format!("Walking toward ({:.0}, {:.0})", to.x, to.y),
    };
    Ok(Outcome::success(message).with_importance(3))
}

/// Finish exploring.
pub fn complete_explore(world: &World, agent: AgentId) -> Result<Outcome, AgentError> {
    let at = world.agent(agent)?.position;
    Ok(Outcome::success(format!("Explored the area around ({:.0}, {:.0})", at.x, at.y)).with_importance(3))
}

/// Finish fleeing.
pub fn complete_flee(world: &World, agent: AgentId) -> Result<Outcome, AgentError> {
    let at = world.agent(agent)?.position;
    let still_threatened = !world.aggressive_beasts_near(at, 15.0).is_empty();
    let outcome = if still_threatened {
        Outcome::success("Fled, but danger is still close").with_importance(7)
    } else {
        Outcome::success("Fled to safety").with_importance(6)
    };
    Ok(outcome)
}
