//! Building blueprints, site rules, and the per-tick construction pass.
//!
//! - [`blueprint`] returns the static recipe for each [`BuildingKind`]
//! - [`site_blocked`] applies the per-type uniqueness rule
//! - [`joinable_site`] finds an unfinished site of the same type to help on
//! - [`found_site`] creates a building atomically at progress 0
//! - [`progress_construction`] advances every site by its active builders
//!
//! Cooperation is a linear speedup, never a gate: one builder on a
//! `requires_cooperation` site still makes progress at the base rate.

use hearth_types::{
    AgentId, Building, BuildingId, BuildingKind, EventKind, Footprint, Importance, Item, Position,
    ResolvedTarget,
};
use tracing::info;

use crate::world::World;

/// Agents farther than this from a site do not count as its builders.
pub const BUILDER_RADIUS: f64 = 5.0;
/// An unfinished same-type site within this radius is joined instead of
/// founding a new one.
pub const JOIN_RADIUS: f64 = 15.0;
/// Radius of the uniqueness rule for types not unique world-wide.
pub const UNIQUE_RADIUS: f64 = 20.0;
/// Bonus per extra builder.
pub const COOPERATION_BONUS: f64 = 0.5;

/// Regeneration bonus a completed shelter gives a resting agent per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShelterBonus {
    /// Extra health per tick.
    pub health: f64,
    /// Extra stamina per tick.
    pub stamina: f64,
}

/// How duplicates of a building type are prevented.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uniqueness {
    /// At most one complete building of this type anywhere.
    WorldWide,
    /// No second complete building within the radius.
    Within(f64),
}

/// Static recipe for a building type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blueprint {
    /// Building type.
    pub kind: BuildingKind,
    /// Materials deducted when the site is founded.
    pub materials: &'static [(Item, u32)],
    /// Sim-seconds of single-builder work.
    pub build_time: f64,
    /// Footprint.
    pub size: Footprint,
    /// Whether helpers are expected. Only a hint.
    pub requires_cooperation: bool,
    /// Items the finished building can store.
    pub storage_capacity: u32,
    /// Rest bonus when complete, for shelters.
    pub shelter: Option<ShelterBonus>,
    /// Duplicate rule.
    pub uniqueness: Uniqueness,
}

/// Return the blueprint for `kind`.
pub const fn blueprint(kind: BuildingKind) -> Blueprint {
    match kind {
        BuildingKind::Campfire => Blueprint {
            kind,
            materials: &[(Item::Wood, 5)],
            build_time: 60.0,
            size: Footprint { width: 1, height: 1 },
            requires_cooperation: false,
            storage_capacity: 0,
            shelter: None,
            uniqueness: Uniqueness::WorldWide,
        },
        BuildingKind::LeanTo => Blueprint {
            kind,
            materials: &[(Item::Wood, 10), (Item::Stone, 5)],
            build_time: 120.0,
            size: Footprint { width: 2, height: 2 },
            requires_cooperation: false,
            storage_capacity: 0,
            shelter: Some(ShelterBonus {
                health: 0.5,
                stamina: 0.0,
            }),
            uniqueness: Uniqueness::WorldWide,
        },
        BuildingKind::WoodenHut => Blueprint {
            kind,
            materials: &[(Item::Wood, 30), (Item::Stone, 15)],
            build_time: 240.0,
            size: Footprint { width: 3, height: 2 },
            requires_cooperation: true,
            storage_capacity: 0,
            shelter: Some(ShelterBonus {
                health: 1.0,
                stamina: 0.5,
            }),
            uniqueness: Uniqueness::WorldWide,
        },
        BuildingKind::StorageShed => Blueprint {
            kind,
            materials: &[(Item::Wood, 20)],
            build_time: 150.0,
            size: Footprint { width: 2, height: 2 },
            requires_cooperation: false,
            storage_capacity: 200,
            shelter: None,
            uniqueness: Uniqueness::Within(UNIQUE_RADIUS),
        },
        BuildingKind::Workshop => Blueprint {
            kind,
            materials: &[(Item::Wood, 15), (Item::Stone, 10)],
            build_time: 180.0,
            size: Footprint { width: 2, height: 2 },
            requires_cooperation: true,
            storage_capacity: 0,
            shelter: None,
            uniqueness: Uniqueness::Within(UNIQUE_RADIUS),
        },
    }
}

/// Whether the uniqueness rule forbids a new `kind` site at `position`.
pub fn site_blocked(world: &World, kind: BuildingKind, position: Position) -> bool {
    let rule = blueprint(kind).uniqueness;
    world.buildings.values().any(|b| {
        b.kind == kind
            && b.complete
            && match rule {
                Uniqueness::WorldWide => true,
                Uniqueness::Within(radius) => b.position.distance_to(position) <= radius,
            }
    })
}

/// Nearest unfinished `kind` site within [`JOIN_RADIUS`] of `position`.
pub fn joinable_site(world: &World, kind: BuildingKind, position: Position) -> Option<BuildingId> {
    world
        .buildings
        .values()
        .filter(|b| b.kind == kind && !b.complete)
        .map(|b| (b.id, b.position.distance_to(position)))
        .filter(|&(_, d)| d <= JOIN_RADIUS)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

/// Create a new site at `position` with progress 0 and insert it.
///
/// Material deduction is the caller's job and must happen in the same step.
pub fn found_site(world: &mut World, kind: BuildingKind, position: Position, creator: AgentId) -> BuildingId {
    let print = blueprint(kind);
    let building = Building {
        id: BuildingId::new(),
        kind,
        position,
        size: print.size,
        complete: false,
        progress: 0.0,
        build_time_total: print.build_time,
        build_time_elapsed: 0.0,
        builders: Vec::new(),
        requires_cooperation: print.requires_cooperation,
        storage: std::collections::BTreeMap::new(),
        storage_capacity: print.storage_capacity,
        created_by: creator,
        created_at: world.now(),
    };
    let id = building.id;
    world.buildings.insert(id, building);
    id
}

/// Bonus of the nearest complete shelter within `radius`, if any.
pub fn nearest_shelter(world: &World, position: Position, radius: f64) -> Option<ShelterBonus> {
    world
        .buildings
        .values()
        .filter(|b| b.complete)
        .filter_map(|b| blueprint(b.kind).shelter.map(|s| (s, b.position.distance_to(position))))
        .filter(|&(_, d)| d <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(s, _)| s)
}

/// Speed factor for `builders` simultaneous builders.
pub fn cooperation_factor(builders: usize) -> f64 {
    let extra = u32::try_from(builders.saturating_sub(1)).unwrap_or(u32::MAX);
    f64::from(extra).mul_add(COOPERATION_BONUS, 1.0)
}

/// A building finished during this pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedBuilding {
    /// The building.
    pub id: BuildingId,
    /// Its type.
    pub kind: BuildingKind,
    /// Builders active on the finishing tick.
    pub builders: Vec<AgentId>,
}

/// Advance every unfinished site by `dt` sim-seconds.
///
/// Builders are recomputed from scratch: living agents whose current action
/// is build with this site as target, within [`BUILDER_RADIUS`]. Progress
/// grows by `dt / total × (1 + 0.5 × (n - 1))` and saturates at 1.
pub fn progress_construction(world: &mut World, dt: f64) -> Vec<CompletedBuilding> {
    let mut completed = Vec::new();
    let site_ids: Vec<BuildingId> = world
        .buildings
        .values()
        .filter(|b| !b.complete)
        .map(|b| b.id)
        .collect();

    for site_id in site_ids {
        let Some(site_pos) = world.buildings.get(&site_id).map(|b| b.position) else {
            continue;
        };
        let builders: Vec<AgentId> = world
            .agents
            .values()
            .filter(|a| a.alive)
            .filter(|a| {
                a.current.as_ref().is_some_and(|c| {
                    matches!(c.action, hearth_types::Action::Build { .. })
                        && c.target == Some(ResolvedTarget::Building(site_id))
                })
            })
            .filter(|a| a.position.distance_to(site_pos) <= BUILDER_RADIUS)
            .map(|a| a.id)
            .collect();

        let Some(site) = world.buildings.get_mut(&site_id) else {
            continue;
        };
        site.builders.clone_from(&builders);
        if builders.is_empty() || site.build_time_total <= 0.0 {
            continue;
        }

        let step = dt / site.build_time_total * cooperation_factor(builders.len());
        site.progress = (site.progress + step).min(1.0);
        site.build_time_elapsed = site.progress * site.build_time_total;
        if site.progress < 1.0 {
            continue;
        }

        site.complete = true;
        let kind = site.kind;
        info!(building = %site_id, kind = %kind, builders = builders.len(), "Construction complete");
        world.emit(
            EventKind::BuildComplete,
            format!("A {} was completed", kind.as_str().replace('_', " ")),
            Importance::High,
            builders.clone(),
        );
        completed.push(CompletedBuilding {
            id: site_id,
            kind,
            builders,
        });
    }
    completed
}
