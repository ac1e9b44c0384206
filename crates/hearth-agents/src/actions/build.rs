//! The build action: founding or joining a site, and the end of a session.
//!
//! Building is unbounded. A session ends when the construction pass
//! completes the site ([`reward_builders`]) or when the agent notices that
//! its site finished without it or disappeared ([`stale_session`]).

use hearth_types::{
    ActionKind, ActionReport, AgentId, BuildingKind, EventKind, FailureReason, Importance, Position,
    ResolvedTarget, Skill,
};
use hearth_world::World;
use hearth_world::geometry::clamp_within;
use hearth_world::structure::{CompletedBuilding, blueprint, found_site, joinable_site, site_blocked};
use rand::Rng;
use tracing::info;

use super::{Outcome, Plan, Prepared, finish};
use crate::config::AgentConfig;
use crate::crafting::describe_materials;
use crate::error::AgentError;

/// Construction skill gained by each builder on completion.
pub const CONSTRUCTION_GAIN: u32 = 5;
/// Joiners farther than this walk to the site.
pub const JOIN_WALK_DISTANCE: f64 = 3.0;
/// Largest offset of a new site from its founder, per axis.
pub const SITE_JITTER: f64 = 2.0;

/// Found a new site or join a nearby one.
pub fn prepare(
    world: &mut World,
    agent: AgentId,
    kind: BuildingKind,
    rng: &mut impl Rng,
) -> Result<Prepared, AgentError> {
    let print = blueprint(kind);
    let (position, name) = {
        let a = world.agent(agent)?;
        if !a.has_items(print.materials) {
            return Ok(Prepared::reject(
                FailureReason::InsufficientMaterials,
                format!("Cannot build a {kind}: needs {}", describe_materials(print.materials)),
            ));
        }
        (a.position, a.name.clone())
    };

    if site_blocked(world, kind, position) {
        return Ok(Prepared::reject(
            FailureReason::SiteUnavailable,
            format!("A {kind} already stands nearby"),
        ));
    }

    if let Some(site) = joinable_site(world, kind, position) {
        let site_position = world.buildings.get(&site).map_or(position, |b| b.position);
        let move_to = (site_position.distance_to(position) > JOIN_WALK_DISTANCE).then_some(site_position);
        return Ok(Prepared::Ready(Plan {
            target: Some(ResolvedTarget::Building(site)),
            move_to,
            note: format!("helping build a {kind}"),
        }));
    }

    let at = clamp_within(
        Position::new(
            position.x + rng.random_range(-SITE_JITTER..=SITE_JITTER),
            position.y + rng.random_range(-SITE_JITTER..=SITE_JITTER),
        ),
        5.0,
        95.0,
    );
    let a = world.agent_mut(agent)?;
    for &(item, n) in print.materials {
        let _ = a.remove_item(item, n);
    }
    let site = found_site(world, kind, at, agent);
    info!(agent = %agent, building = %site, kind = %kind, "Construction started");
    world.emit(
        EventKind::BuildStart,
        format!("{name} started building a {kind}"),
        Importance::High,
        vec![agent],
    );
    Ok(Prepared::Ready(Plan {
        target: Some(ResolvedTarget::Building(site)),
        move_to: None,
        note: format!("building a {kind}"),
    }))
}

/// Outcome for a session whose site completed or vanished, if it did.
pub fn stale_session(world: &World, target: Option<&ResolvedTarget>) -> Option<Outcome> {
    let Some(&ResolvedTarget::Building(site)) = target else {
        return Some(Outcome::failed(FailureReason::UnknownTarget, "Had no site to work on"));
    };
    match world.buildings.get(&site) {
        None => Some(Outcome::failed(FailureReason::TargetVanished, "The building site was gone")),
        Some(b) if b.complete => Some(Outcome::success(format!("The {} was finished", b.kind))),
        Some(_) => None,
    }
}

/// Resolve a build session that reached a timer.
///
/// Build sessions carry no timer, so this only runs if one was imposed from
/// outside; the session ends on the site's current state.
pub fn complete_session(world: &World, target: Option<&ResolvedTarget>) -> Result<Outcome, AgentError> {
    Ok(stale_session(world, target).unwrap_or_else(|| Outcome::success("Put in some work on the site")))
}

/// Reward the builders of buildings that completed this tick.
pub fn reward_builders(
    world: &mut World,
    completed: &[CompletedBuilding],
    config: &AgentConfig,
    rng: &mut impl Rng,
) -> Result<Vec<ActionReport>, AgentError> {
    let mut reports = Vec::new();
    for building in completed {
        for &builder in &building.builders {
            let others: Vec<String> = building
                .builders
                .iter()
                .filter(|&&id| id != builder)
                .filter_map(|id| world.agents.get(id).map(|a| a.name.clone()))
                .collect();
            {
                let a = world.agent_mut(builder)?;
                if !a.alive {
                    continue;
                }
                a.add_skill(Skill::Construction, CONSTRUCTION_GAIN);
            }
            let message = if others.is_empty() {
                format!("Finished the {}", building.kind)
            } else {
                format!("Finished the {} with {}", building.kind, others.join(", "))
            };
            let outcome = Outcome::success(message).with_importance(7);
            reports.push(finish(world, builder, ActionKind::Build, outcome, config, rng)?);
        }
    }
    Ok(reports)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use hearth_types::{Action, Decision, Item, Lifecycle};
    use hearth_world::structure::progress_construction;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::actions::tests::{ready, spawn};
    use crate::actions::{DispatchOutcome, dispatch};

    #[test]
    fn campfire_site_founded_with_materials_spent() {
        let mut world = World::new();
        let id = spawn(&mut world, "Alice", 50.0, 50.0);
        world.agent_mut(id).unwrap().add_item(Item::Wood, 5);
        let mut rng = SmallRng::seed_from_u64(42);

        let decision = Decision::new(Action::Build { building: BuildingKind::Campfire }, "cold");
        let out = dispatch(&mut world, id, &decision, &AgentConfig::default(), &mut rng).unwrap();
        assert_eq!(out, DispatchOutcome::Started { ends_at: None });

        assert_eq!(world.buildings.len(), 1);
        let site = world.buildings.values().next().unwrap();
        assert!(!site.complete);
        assert!(site.progress.abs() < f64::EPSILON);
        assert_eq!(world.agent(id).unwrap().item_count(Item::Wood), 0);
        assert!(world.events().any(|e| e.kind == EventKind::BuildStart));
    }

    #[test]
    fn missing_materials_reject_before_anything_else() {
        let mut world = World::new();
        let id = spawn(&mut world, "Bob", 50.0, 50.0);
        world.agent_mut(id).unwrap().add_item(Item::Wood, 4);
        let mut rng = SmallRng::seed_from_u64(42);

        let prepared = prepare(&mut world, id, BuildingKind::Campfire, &mut rng).unwrap();
        assert!(matches!(
            prepared,
            Prepared::Rejected(ref f) if f.reason == FailureReason::InsufficientMaterials
        ));
        assert!(world.buildings.is_empty());
    }

    #[test]
    fn nearby_site_is_joined_without_spending() {
        let mut world = World::new();
        let founder = spawn(&mut world, "Alice", 50.0, 50.0);
        let joiner = spawn(&mut world, "Bob", 60.0, 50.0);
        let site = found_site(&mut world, BuildingKind::LeanTo, Position::new(50.0, 50.0), founder);
        let a = world.agent_mut(joiner).unwrap();
        a.add_item(Item::Wood, 10);
        a.add_item(Item::Stone, 5);
        let mut rng = SmallRng::seed_from_u64(42);

        let plan = ready(prepare(&mut world, joiner, BuildingKind::LeanTo, &mut rng).unwrap()).unwrap();
        assert_eq!(plan.target, Some(ResolvedTarget::Building(site)));
        assert_eq!(plan.move_to, Some(Position::new(50.0, 50.0)));
        assert_eq!(world.agent(joiner).unwrap().item_count(Item::Wood), 10);
        assert_eq!(world.buildings.len(), 1);
    }

    #[test]
    fn completion_rewards_builder_and_cools() {
        let mut world = World::new();
        let id = spawn(&mut world, "Diana", 50.0, 50.0);
        world.agent_mut(id).unwrap().add_item(Item::Wood, 5);
        let config = AgentConfig::default();
        let mut rng = SmallRng::seed_from_u64(42);
        let decision = Decision::new(Action::Build { building: BuildingKind::Campfire }, "");
        dispatch(&mut world, id, &decision, &config, &mut rng).unwrap();

        let completed = progress_construction(&mut world, 60.0);
        assert_eq!(completed.len(), 1);
        let reports = reward_builders(&mut world, &completed, &config, &mut rng).unwrap();
        assert_eq!(reports.len(), 1);

        let a = world.agent(id).unwrap();
        assert_eq!(a.skill(Skill::Construction), CONSTRUCTION_GAIN);
        assert_eq!(a.status.lifecycle, Lifecycle::Cooling);
        assert_eq!(a.memories.last().unwrap().description, "Finished the campfire");
    }

    #[test]
    fn vanished_site_ends_the_session() {
        let world = World::new();
        let target = ResolvedTarget::Building(hearth_types::BuildingId::new());
        let outcome = stale_session(&world, Some(&target)).unwrap();
        assert_eq!(outcome.reason, Some(FailureReason::TargetVanished));
    }
}
