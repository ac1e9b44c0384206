//! Harvesting, depletion, and timed regeneration of resource nodes.
//!
//! - Yield is a per-kind base times a tool multiplier, truncated to whole
//!   units and capped to what the node has left.
//! - A node that hits zero is depleted and invisible to target search
//!   until its kind's regeneration delay has elapsed, then it refills to
//!   max in one step.
//! - Non-depleted nodes never regenerate.

use std::collections::BTreeMap;

use hearth_types::{EquipmentEntry, ResourceKind, ResourceNode, Tool};

/// Maximum distance at which an agent can gather from a node.
pub const GATHER_RANGE: f64 = 2.0;

/// Calendar seconds in one day.
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Units yielded by one gather without tools.
pub const fn base_yield(kind: ResourceKind) -> u32 {
    match kind {
        ResourceKind::Wood => 5,
        ResourceKind::Stone => 3,
        ResourceKind::Berry => 10,
        ResourceKind::Water => 15,
    }
}

/// The tool that boosts gathering of `kind`, and its multiplier.
pub const fn boosting_tool(kind: ResourceKind) -> (Tool, f64) {
    match kind {
        ResourceKind::Wood => (Tool::StoneAxe, 1.5),
        ResourceKind::Stone => (Tool::StonePickaxe, 1.5),
        ResourceKind::Berry => (Tool::Basket, 1.3),
        ResourceKind::Water => (Tool::WaterContainer, 1.2),
    }
}

/// Units one gather of `kind` produces given the gatherer's equipment.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn gather_amount(kind: ResourceKind, equipment: &BTreeMap<Tool, EquipmentEntry>) -> u32 {
    let base = base_yield(kind);
    let (tool, multiplier) = boosting_tool(kind);
    if equipment.contains_key(&tool) {
        // Bounded: base is at most 15 and the multiplier at most 1.5.
        (f64::from(base) * multiplier).floor() as u32
    } else {
        base
    }
}

/// Calendar days a depleted node of `kind` stays empty.
pub const fn regeneration_days(kind: ResourceKind) -> f64 {
    match kind {
        ResourceKind::Wood => 2.0,
        ResourceKind::Stone => 3.0,
        ResourceKind::Berry => 1.5,
        ResourceKind::Water => 1.0,
    }
}

/// Sim-seconds a depleted node of `kind` stays empty at the given
/// calendar scale (calendar seconds per sim-second).
pub fn regeneration_delay(kind: ResourceKind, calendar_scale: f64) -> f64 {
    let scale = if calendar_scale > 0.0 { calendar_scale } else { 1.0 };
    regeneration_days(kind) * SECONDS_PER_DAY / scale
}

/// Result of one harvest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Harvest {
    /// Units actually taken.
    pub taken: u32,
    /// The node became depleted by this harvest.
    pub depleted: bool,
}

/// Take up to `requested` units from `node`.
///
/// The amount is capped to the node's quantity. Emptying the node marks it
/// depleted at `now`.
pub fn harvest(node: &mut ResourceNode, requested: u32, now: f64) -> Harvest {
    let taken = requested.min(node.quantity);
    node.quantity = node.quantity.saturating_sub(taken);
    let depleted = node.quantity == 0 && !node.depleted;
    if node.quantity == 0 {
        node.depleted = true;
        if depleted {
            node.depleted_at = Some(now);
        }
    }
    Harvest { taken, depleted }
}

/// Refill `node` if it is depleted and its delay has elapsed.
///
/// Returns `true` if the node was regenerated.
pub fn regenerate_if_due(node: &mut ResourceNode, now: f64, calendar_scale: f64) -> bool {
    if !node.depleted {
        return false;
    }
    let Some(depleted_at) = node.depleted_at else {
        return false;
    };
    if now - depleted_at < regeneration_delay(node.kind, calendar_scale) {
        return false;
    }
    node.quantity = node.max_quantity;
    node.depleted = false;
    node.depleted_at = None;
    node.occupied_by = None;
    true
}

#[cfg(test)]
mod tests {
    use hearth_types::Position;

    use super::*;

    fn node(kind: ResourceKind, quantity: u32) -> ResourceNode {
        ResourceNode::new(kind, Position::new(10.0, 10.0), quantity)
    }

    #[test]
    fn harvest_caps_to_remaining_and_depletes() {
        let mut stone = node(ResourceKind::Stone, 3);
        let result = harvest(&mut stone, 5, 42.0);
        assert_eq!(result.taken, 3);
        assert!(result.depleted);
        assert!(stone.depleted);
        assert_eq!(stone.quantity, 0);
        assert_eq!(stone.depleted_at, Some(42.0));
    }

    #[test]
    fn partial_harvest_keeps_node_alive() {
        let mut wood = node(ResourceKind::Wood, 50);
        let result = harvest(&mut wood, 5, 0.0);
        assert_eq!(result.taken, 5);
        assert!(!result.depleted);
        assert_eq!(wood.quantity, 45);
    }

    #[test]
    fn tools_boost_yield() {
        let mut equipment = BTreeMap::new();
        assert_eq!(gather_amount(ResourceKind::Wood, &equipment), 5);
        equipment.insert(
            Tool::StoneAxe,
            EquipmentEntry {
                durability: 100,
                quality: 100,
                crafted_at: 0.0,
            },
        );
        assert_eq!(gather_amount(ResourceKind::Wood, &equipment), 7);
        // The axe does nothing for berries.
        assert_eq!(gather_amount(ResourceKind::Berry, &equipment), 10);
    }

    #[test]
    fn wood_regenerates_after_two_days() {
        let mut wood = node(ResourceKind::Wood, 50);
        let _ = harvest(&mut wood, 50, 100.0);
        // Two calendar days at 60x is 2880 sim-seconds.
        assert!(!regenerate_if_due(&mut wood, 100.0 + 2879.0, 60.0));
        assert!(regenerate_if_due(&mut wood, 100.0 + 2880.0, 60.0));
        assert_eq!(wood.quantity, 50);
        assert!(!wood.depleted);
    }

    #[test]
    fn healthy_nodes_do_not_regenerate() {
        let mut berry = node(ResourceKind::Berry, 30);
        let _ = harvest(&mut berry, 10, 0.0);
        assert!(!regenerate_if_due(&mut berry, 1.0e9, 60.0));
        assert_eq!(berry.quantity, 20);
    }
}
