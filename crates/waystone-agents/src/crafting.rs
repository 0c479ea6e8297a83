//! Crafting substitution: turning what an agent holds into what it wants.
//!
//! Given a wanted renewable-derived item, the chain works out the family and
//! applies a short, fixed sequence of conversions using only held items:
//!
//! 1. raw → refined (one raw unit at a time, first held raw form wins),
//! 2. refined → binder, when the target recipe needs a binder and there is
//!    not enough (other families' refined material is spent first),
//! 3. refined (+ binder) → the wanted derivative.
//!
//! Each conversion is atomic against the inventory: inputs are checked,
//! debited, and the output credited, and any short debit or refused credit
//! puts everything back. Conversions that did run are kept even if the
//! final one cannot, since planks and sticks are progress in their own
//! right.

use tracing::debug;
use waystone_types::ItemId;
use waystone_world::taxonomy::{RAW_TO_REFINED, REFINED_TO_BINDER};
use waystone_world::{Inventory, ItemRole, ResourceFamily, Taxonomy};

use crate::error::AgentError;

/// Upper bound on raw → refined conversions per attempt.
const MAX_REFINE_STEPS: u32 = 2;

/// One conversion that was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// Items consumed, with quantities.
    pub inputs: Vec<(ItemId, u32)>,
    /// Item produced.
    pub output: ItemId,
    /// Units produced.
    pub produced: u32,
}

/// Result of a substitution attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CraftOutcome {
    /// Conversions applied, in order.
    pub conversions: Vec<Conversion>,
    /// Whether the wanted item's count went up.
    pub success: bool,
}

/// Apply one conversion atomically.
///
/// Either every input is debited and the full output credited, or the
/// inventory ends up exactly as it started.
pub fn convert(
    inventory: &mut dyn Inventory,
    inputs: &[(&ItemId, u32)],
    output: &ItemId,
    produced: u32,
) -> Result<Conversion, AgentError> {
    for (item, needed) in inputs {
        let available = inventory.count(item);
        if available < *needed {
            return Err(AgentError::MissingInput {
                item: (*item).clone(),
                needed: *needed,
                available,
            });
        }
    }

    let mut debited: Vec<(&ItemId, u32)> = Vec::with_capacity(inputs.len());
    for (item, needed) in inputs {
        let removed = inventory.remove_count(item, *needed);
        debited.push((item, removed));
        if removed < *needed {
            restore(inventory, &debited);
            return Err(AgentError::ConversionRefused {
                output: output.clone(),
            });
        }
    }

    let credited = inventory.add(output, produced);
    if credited < produced {
        inventory.remove_count(output, credited);
        restore(inventory, &debited);
        return Err(AgentError::ConversionRefused {
            output: output.clone(),
        });
    }

    Ok(Conversion {
        inputs: inputs
            .iter()
            .map(|(item, n)| ((*item).clone(), *n))
            .collect(),
        output: output.clone(),
        produced,
    })
}

fn restore(inventory: &mut dyn Inventory, debited: &[(&ItemId, u32)]) {
    for (item, amount) in debited {
        if *amount > 0 {
            inventory.add(item, *amount);
        }
    }
}

/// Try to produce `wanted` from held materials.
pub fn craft_substitute(inventory: &mut dyn Inventory, taxonomy: &Taxonomy, wanted: &ItemId) -> CraftOutcome {
    let mut outcome = CraftOutcome::default();
    let (Some(family), Some(role)) = (taxonomy.family_of(wanted), taxonomy.role_of(wanted)) else {
        return outcome;
    };
    let before = inventory.count(wanted);

    match role {
        ItemRole::Refined => {
            if let Some(conversion) = refine_once(inventory, family) {
                outcome.conversions.push(conversion);
            }
        }
        ItemRole::Derivative(derivative) => {
            let recipe = derivative.recipe();
            let binder = taxonomy.binder();

            let refined_needed = if recipe.binder > 0 && inventory.count(binder) < recipe.binder {
                recipe.input.saturating_add(REFINED_TO_BINDER.input)
            } else {
                recipe.input
            };
            outcome
                .conversions
                .extend(refine_until(inventory, family, refined_needed));

            if recipe.binder > 0 && inventory.count(binder) < recipe.binder {
                outcome
                    .conversions
                    .extend(synthesize_binder(inventory, taxonomy, family, recipe.input));
            }

            let mut inputs: Vec<(&ItemId, u32)> = vec![(&family.refined, recipe.input)];
            if recipe.binder > 0 {
                inputs.push((binder, recipe.binder));
            }
            match convert(inventory, &inputs, wanted, recipe.output) {
                Ok(conversion) => outcome.conversions.push(conversion),
                Err(err) => debug!(wanted = %wanted, error = %err, "derivative craft skipped"),
            }
        }
        ItemRole::Raw | ItemRole::Seed => {}
    }

    outcome.success = inventory.count(wanted) > before;
    if !outcome.conversions.is_empty() {
        debug!(
            wanted = %wanted,
            conversions = outcome.conversions.len(),
            success = outcome.success,
            "crafting substitution applied"
        );
    }
    outcome
}

/// Convert one unit of the first held raw form into refined material.
fn refine_once(inventory: &mut dyn Inventory, family: &ResourceFamily) -> Option<Conversion> {
    let raw = family.raw.iter().find(|raw| inventory.has(raw))?;
    convert(
        inventory,
        &[(raw, RAW_TO_REFINED.input)],
        &family.refined,
        RAW_TO_REFINED.output,
    )
    .ok()
}

/// Refine raw units until at least `target` refined units are held, or the
/// raw runs out, or the step bound is hit.
fn refine_until(inventory: &mut dyn Inventory, family: &ResourceFamily, target: u32) -> Vec<Conversion> {
    let mut conversions = Vec::new();
    for _ in 0..MAX_REFINE_STEPS {
        if inventory.count(&family.refined) >= target {
            break;
        }
        match refine_once(inventory, family) {
            Some(conversion) => conversions.push(conversion),
            None => break,
        }
    }
    conversions
}

/// Make binder from refined material. Other families' refined items are
/// used first; the target family's own refined material only if enough
/// remains for `reserve` afterwards.
fn synthesize_binder(
    inventory: &mut dyn Inventory,
    taxonomy: &Taxonomy,
    family: &ResourceFamily,
    reserve: u32,
) -> Option<Conversion> {
    let own_floor = reserve.saturating_add(REFINED_TO_BINDER.input);
    let source = taxonomy
        .families()
        .filter(|other| other.id != family.id)
        .map(|other| &other.refined)
        .find(|refined| inventory.count(refined) >= REFINED_TO_BINDER.input)
        .or_else(|| (inventory.count(&family.refined) >= own_floor).then_some(&family.refined))?;
    convert(
        inventory,
        &[(source, REFINED_TO_BINDER.input)],
        taxonomy.binder(),
        REFINED_TO_BINDER.output,
    )
    .ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
