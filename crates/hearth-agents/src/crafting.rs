//! Crafting recipes for tools and weapons.
//!
//! Defines the static recipe table mapping each [`Tool`] to its materials,
//! crafting time, skill requirement and starting durability. Used by the
//! `craft` action both at dispatch and again at completion, since materials
//! may have been spent in between.
//!
//! | Tool              | Materials          | Time | Min skill | Durability |
//! |-------------------|--------------------|------|-----------|------------|
//! | `stone_axe`       | stone 3, wood 2    | 15 s | 0         | 100        |
//! | `stone_pickaxe`   | stone 4, wood 2    | 15 s | 5         | 100        |
//! | `spear`           | stone 2, wood 3    | 12 s | 0         | 80         |
//! | `basket`          | wood 5             | 10 s | 0         | 60         |
//! | `water_container` | wood 3             | 8 s  | 0         | 50         |

use hearth_types::{ActionFailure, Agent, EquipmentEntry, FailureReason, Item, Skill, Tool};

/// Quality of a freshly crafted item.
pub const FRESH_QUALITY: u32 = 100;

/// Crafting skill gained per successful craft.
pub const CRAFT_SKILL_GAIN: u32 = 2;

// ---------------------------------------------------------------------------
// Recipe
// ---------------------------------------------------------------------------

/// Whether a crafted item is a gathering tool or a weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolClass {
    /// Boosts gathering yield.
    Tool,
    /// Boosts combat damage and range.
    Weapon,
}

/// A single crafting recipe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recipe {
    /// What this recipe produces.
    pub tool: Tool,
    /// Materials consumed at completion.
    pub materials: &'static [(Item, u32)],
    /// Base crafting time in sim-seconds.
    pub craft_time: f64,
    /// Minimum crafting skill.
    pub min_skill: u32,
    /// Durability of the new item.
    pub durability: u32,
    /// Tool or weapon.
    pub class: ToolClass,
}

/// Look up the recipe for `tool`.
pub const fn recipe(tool: Tool) -> Recipe {
    match tool {
        Tool::StoneAxe => Recipe {
            tool,
            materials: &[(Item::Stone, 3), (Item::Wood, 2)],
            craft_time: 15.0,
            min_skill: 0,
            durability: 100,
            class: ToolClass::Tool,
        },
        Tool::StonePickaxe => Recipe {
            tool,
            materials: &[(Item::Stone, 4), (Item::Wood, 2)],
            craft_time: 15.0,
            min_skill: 5,
            durability: 100,
            class: ToolClass::Tool,
        },
        Tool::Spear => Recipe {
            tool,
            materials: &[(Item::Stone, 2), (Item::Wood, 3)],
            craft_time: 12.0,
            min_skill: 0,
            durability: 80,
            class: ToolClass::Weapon,
        },
        Tool::Basket => Recipe {
            tool,
            materials: &[(Item::Wood, 5)],
            craft_time: 10.0,
            min_skill: 0,
            durability: 60,
            class: ToolClass::Tool,
        },
        Tool::WaterContainer => Recipe {
            tool,
            materials: &[(Item::Wood, 3)],
            craft_time: 8.0,
            min_skill: 0,
            durability: 50,
            class: ToolClass::Tool,
        },
    }
}

/// Describe a material list as `"stone 3, wood 2"`.
pub fn describe_materials(materials: &[(Item, u32)]) -> String {
    materials
        .iter()
        .map(|(item, n)| format!("{item} {n}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check whether `agent` can craft `recipe` right now.
pub fn check(agent: &Agent, recipe: &Recipe) -> Result<(), ActionFailure> {
    let skill = agent.skill(Skill::Crafting);
    if skill < recipe.min_skill {
        return Err(ActionFailure::new(
            FailureReason::SkillTooLow,
            format!(
                "Cannot craft {}: crafting {} is below the required {}",
                recipe.tool, skill, recipe.min_skill
            ),
        ));
    }
    let missing: Vec<String> = recipe
        .materials
        .iter()
        .filter(|&&(item, n)| agent.item_count(item) < n)
        .map(|&(item, n)| format!("{item} {n} (have {})", agent.item_count(item)))
        .collect();
    if !missing.is_empty() {
        return Err(ActionFailure::new(
            FailureReason::InsufficientMaterials,
            format!("Cannot craft {}: missing {}", recipe.tool, missing.join(", ")),
        ));
    }
    Ok(())
}

/// Consume materials and add the crafted item to the agent's equipment.
///
/// Re-validates first; nothing changes when the check fails.
pub fn craft(agent: &mut Agent, recipe: &Recipe, now: f64) -> Result<(), ActionFailure> {
    check(agent, recipe)?;
    for &(item, n) in recipe.materials {
        let _ = agent.remove_item(item, n);
    }
    agent.equipment.insert(
        recipe.tool,
        EquipmentEntry {
            durability: recipe.durability,
            quality: FRESH_QUALITY,
            crafted_at: now,
        },
    );
    agent.add_skill(Skill::Crafting, CRAFT_SKILL_GAIN);
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
