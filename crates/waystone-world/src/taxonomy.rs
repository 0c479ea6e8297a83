//! Resource taxonomy: renewable families and the roles items play in them.
//!
//! A family groups everything derived from one renewable source: the raw
//! harvestable forms (logs, stems), the refined intermediate (planks), the
//! structural derivatives (slabs, doors, ...), and the plantable seed. The
//! table is data, validated once at construction, so lookups at tick time
//! are plain map reads.
//!
//! # Built-in families
//!
//! | Family    | Raw forms           | Refined          | Seed                  |
//! |-----------|---------------------|------------------|-----------------------|
//! | oak ...   | `*_log`, `*_wood`   | `*_planks`       | `*_sapling`           |
//! | mangrove  | `*_log`, `*_wood`   | `mangrove_planks`| `mangrove_propagule`  |
//! | crimson   | `*_stem`, `*_hyphae`| `crimson_planks` | `crimson_fungus`      |
//!
//! Stripped variants of every raw form are included.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use waystone_types::{FamilyId, ItemId};

use crate::error::WorldError;

// ---------------------------------------------------------------------------
// Roles and recipes
// ---------------------------------------------------------------------------

/// A structural item crafted from a family's refined form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivativeRole {
    /// Half block.
    Slab,
    /// Stair block.
    Stairs,
    /// Fence post.
    Fence,
    /// Fence gate.
    FenceGate,
    /// Door.
    Door,
    /// Trapdoor.
    Trapdoor,
    /// Pressure plate.
    PressurePlate,
    /// Button.
    Button,
}

impl DerivativeRole {
    /// Every role, in crafting-table order.
    pub const ALL: [Self; 8] = [
        Self::Slab,
        Self::Stairs,
        Self::Fence,
        Self::FenceGate,
        Self::Door,
        Self::Trapdoor,
        Self::PressurePlate,
        Self::Button,
    ];

    /// Item path suffix used by the built-in families.
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Slab => "slab",
            Self::Stairs => "stairs",
            Self::Fence => "fence",
            Self::FenceGate => "fence_gate",
            Self::Door => "door",
            Self::Trapdoor => "trapdoor",
            Self::PressurePlate => "pressure_plate",
            Self::Button => "button",
        }
    }

    /// The conversion that produces this derivative.
    pub const fn recipe(self) -> Recipe {
        match self {
            Self::Slab => Recipe::new(3, 0, 6),
            Self::Stairs => Recipe::new(6, 0, 4),
            Self::Fence => Recipe::new(4, 2, 3),
            Self::FenceGate => Recipe::new(4, 2, 1),
            Self::Door => Recipe::new(6, 0, 3),
            Self::Trapdoor => Recipe::new(6, 0, 2),
            Self::PressurePlate => Recipe::new(2, 0, 1),
            Self::Button => Recipe::new(1, 0, 1),
        }
    }
}

/// Input and output quantities of a single conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recipe {
    /// Units of the primary input consumed.
    pub input: u32,
    /// Units of binder consumed alongside.
    pub binder: u32,
    /// Units of output produced.
    pub output: u32,
}

impl Recipe {
    /// Build a recipe.
    pub const fn new(input: u32, binder: u32, output: u32) -> Self {
        Self {
            input,
            binder,
            output,
        }
    }
}

/// One raw unit yields four refined units.
pub const RAW_TO_REFINED: Recipe = Recipe::new(1, 0, 4);

/// Two refined units yield four binder units.
pub const REFINED_TO_BINDER: Recipe = Recipe::new(2, 0, 4);

/// The role an item plays inside its family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemRole {
    /// Harvestable form.
    Raw,
    /// Intermediate form.
    Refined,
    /// Structural derivative.
    Derivative(DerivativeRole),
    /// Plantable precursor.
    Seed,
}

// ---------------------------------------------------------------------------
// Family specs
// ---------------------------------------------------------------------------

/// Declarative description of a family, as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilySpec {
    /// Family name.
    pub id: String,
    /// Raw forms, in preference order.
    pub raw: Vec<String>,
    /// Refined form.
    pub refined: String,
    /// Structural derivatives keyed by role.
    #[serde(default)]
    pub derivatives: BTreeMap<DerivativeRole, String>,
    /// Plantable seed.
    pub seed: String,
}

impl FamilySpec {
    /// A wood family following the standard naming scheme.
    fn wood(name: &str, seed: &str) -> Self {
        Self::standard(name, &["log", "wood"], seed)
    }

    /// A fungal family following the stem/hyphae naming scheme.
    fn fungal(name: &str) -> Self {
        Self::standard(name, &["stem", "hyphae"], &format!("{name}_fungus"))
    }

    fn standard(name: &str, raw_suffixes: &[&str], seed: &str) -> Self {
        let mut raw: Vec<String> = raw_suffixes
            .iter()
            .map(|suffix| format!("{name}_{suffix}"))
            .collect();
        raw.extend(
            raw_suffixes
                .iter()
                .map(|suffix| format!("stripped_{name}_{suffix}")),
        );
        let derivatives = DerivativeRole::ALL
            .iter()
            .map(|role| (*role, format!("{name}_{}", role.suffix())))
            .collect();
        Self {
            id: name.to_owned(),
            raw,
            refined: format!("{name}_planks"),
            derivatives,
            seed: seed.to_owned(),
        }
    }
}

/// Specs for the families every host ships with.
pub fn vanilla_specs() -> Vec<FamilySpec> {
    let mut specs: Vec<FamilySpec> = [
        "oak", "spruce", "birch", "jungle", "acacia", "dark_oak", "cherry",
    ]
    .iter()
    .map(|name| FamilySpec::wood(name, &format!("{name}_sapling")))
    .collect();
    specs.push(FamilySpec::wood("mangrove", "mangrove_propagule"));
    specs.push(FamilySpec::fungal("crimson"));
    specs.push(FamilySpec::fungal("warped"));
    specs
}

// ---------------------------------------------------------------------------
// ResourceFamily
// ---------------------------------------------------------------------------

/// A validated family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceFamily {
    /// Family name.
    pub id: FamilyId,
    /// Raw forms, in preference order.
    pub raw: Vec<ItemId>,
    /// Refined form.
    pub refined: ItemId,
    /// Structural derivatives.
    pub derivatives: BTreeMap<DerivativeRole, ItemId>,
    /// Plantable seed.
    pub seed: ItemId,
}

// ---------------------------------------------------------------------------
// Taxonomy
// ---------------------------------------------------------------------------

/// Validated family table plus the two shared items the engine hands out.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    families: BTreeMap<FamilyId, ResourceFamily>,
    index: BTreeMap<ItemId, (FamilyId, ItemRole)>,
    binder: ItemId,
    catalyst: ItemId,
}

impl Taxonomy {
    /// Build and validate a taxonomy.
    ///
    /// Rejects duplicate family names, items claimed twice, families with no
    /// raw form, empty item names, and a binder or catalyst that is also a
    /// family item.
    pub fn new(
        specs: impl IntoIterator<Item = FamilySpec>,
        binder: ItemId,
        catalyst: ItemId,
    ) -> Result<Self, WorldError> {
        let mut families = BTreeMap::new();
        let mut index: BTreeMap<ItemId, (FamilyId, ItemRole)> = BTreeMap::new();

        for spec in specs {
            let id = FamilyId::new(spec.id.as_str());
            if families.contains_key(&id) {
                return Err(WorldError::DuplicateFamily(id));
            }
            if spec.raw.is_empty() {
                return Err(WorldError::NoRawForm(id));
            }

            let family = ResourceFamily {
                id: id.clone(),
                raw: spec.raw.iter().map(|raw| ItemId::new(raw.as_str())).collect(),
                refined: ItemId::new(spec.refined.as_str()),
                derivatives: spec
                    .derivatives
                    .iter()
                    .map(|(role, item)| (*role, ItemId::new(item.as_str())))
                    .collect(),
                seed: ItemId::new(spec.seed.as_str()),
            };

            let mut claims: Vec<(ItemId, ItemRole)> = family
                .raw
                .iter()
                .map(|item| (item.clone(), ItemRole::Raw))
                .collect();
            claims.push((family.refined.clone(), ItemRole::Refined));
            claims.extend(
                family
                    .derivatives
                    .iter()
                    .map(|(role, item)| (item.clone(), ItemRole::Derivative(*role))),
            );
            claims.push((family.seed.clone(), ItemRole::Seed));

            for (item, role) in claims {
                if item.is_air() {
                    return Err(WorldError::EmptyItem { family: id });
                }
                if let Some((first, _)) = index.get(&item) {
                    return Err(WorldError::DuplicateItem {
                        item,
                        first: first.clone(),
                        second: id,
                    });
                }
                index.insert(item, (id.clone(), role));
            }

            families.insert(id, family);
        }

        for shared in [&binder, &catalyst] {
            if index.contains_key(shared) {
                return Err(WorldError::SharedItemCollision(shared.clone()));
            }
        }

        Ok(Self {
            families,
            index,
            binder,
            catalyst,
        })
    }

    /// The built-in families plus `extra`, with the default binder (`stick`)
    /// and catalyst (`bone_meal`).
    pub fn vanilla_with(extra: impl IntoIterator<Item = FamilySpec>) -> Result<Self, WorldError> {
        let mut specs = vanilla_specs();
        specs.extend(extra);
        Self::new(specs, ItemId::new("stick"), ItemId::new("bone_meal"))
    }

    /// The built-in families only.
    pub fn vanilla() -> Result<Self, WorldError> {
        Self::vanilla_with(Vec::new())
    }

    /// The family `item` belongs to, if any.
    pub fn family_of(&self, item: &ItemId) -> Option<&ResourceFamily> {
        let (id, _) = self.index.get(item)?;
        self.families.get(id)
    }

    /// The role `item` plays in its family, if any.
    pub fn role_of(&self, item: &ItemId) -> Option<ItemRole> {
        self.index.get(item).map(|(_, role)| *role)
    }

    /// Look a family up by name.
    pub fn family(&self, id: &FamilyId) -> Option<&ResourceFamily> {
        self.families.get(id)
    }

    /// Every family, ordered by name.
    pub fn families(&self) -> impl Iterator<Item = &ResourceFamily> {
        self.families.values()
    }

    /// Whether `item` comes from a renewable source: a raw, refined, or
    /// derivative form. Seeds are not.
    pub fn is_renewable_derived(&self, item: &ItemId) -> bool {
        matches!(
            self.role_of(item),
            Some(ItemRole::Raw | ItemRole::Refined | ItemRole::Derivative(_))
        )
    }

    /// Seed of the family `item` belongs to.
    pub fn seed_for(&self, item: &ItemId) -> Option<&ItemId> {
        self.family_of(item).map(|family| &family.seed)
    }

    /// Whether `item` is any family's seed.
    pub fn is_seed(&self, item: &ItemId) -> bool {
        self.role_of(item) == Some(ItemRole::Seed)
    }

    /// Distinct seeds for a list of building materials, in first-seen order.
    /// Materials outside every family are ignored.
    pub fn seeds_for_materials<'a>(
        &self,
        materials: impl IntoIterator<Item = &'a ItemId>,
    ) -> Vec<ItemId> {
        let mut seeds: Vec<ItemId> = Vec::new();
        for material in materials {
            let Some(seed) = self.seed_for(material) else {
                continue;
            };
            if !seeds.contains(seed) {
                seeds.push(seed.clone());
            }
        }
        seeds
    }

    /// The secondary crafting component (sticks).
    pub const fn binder(&self) -> &ItemId {
        &self.binder
    }

    /// The growth accelerant handed out with starter seeds.
    pub const fn catalyst(&self) -> &ItemId {
        &self.catalyst
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
