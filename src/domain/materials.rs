//! Material templates and the registry that validates them.
//!
//! Templates can come from a JSON bundle shipped by the host (see
//! `content/materials.json`) or from the built-in set. The registry is
//! the single source of truth for material properties: every cell in
//! the world is instantiated from one of its templates.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::cell::{Cell, CellBehavior, AIR_MASS, WALL_MASS};
use crate::error::EngineError;

/// Material identifier; doubles as the render code shipped to the host.
pub type MaterialId = u8;

pub const MAT_AIR: MaterialId = 0;
pub const MAT_SAND: MaterialId = 1;
pub const MAT_WATER: MaterialId = 2;
pub const MAT_WALL: MaterialId = 3;

/// Blueprint for one cell kind: everything a fill or paint needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellTemplate {
    pub id: MaterialId,
    /// Stable lookup key, e.g. `base:sand`.
    pub key: String,
    pub behavior: CellBehavior,
    #[serde(default)]
    pub mass: i32,
    /// Packed ABGR color for the external tile renderer.
    #[serde(default)]
    pub color: u32,
}

impl CellTemplate {
    /// Stamp out a cell carrying this template's properties.
    #[inline]
    pub fn instantiate(&self) -> Cell {
        Cell {
            material: self.id,
            behavior: self.behavior,
            mass: self.mass,
        }
    }
}

#[derive(Deserialize)]
struct BundleRoot {
    materials: Vec<CellTemplate>,
}

/// Validated, id-indexed set of cell templates.
#[derive(Debug, Clone)]
pub struct MaterialRegistry {
    templates: Vec<CellTemplate>,
    key_to_id: HashMap<String, MaterialId>,
}

impl MaterialRegistry {
    /// The built-in air/sand/water/wall set.
    pub fn builtin() -> Self {
        let templates = vec![
            CellTemplate {
                id: MAT_AIR,
                key: "base:air".to_string(),
                behavior: CellBehavior::Air,
                mass: AIR_MASS,
                color: 0xFF0A_0A0A,
            },
            CellTemplate {
                id: MAT_SAND,
                key: "base:sand".to_string(),
                behavior: CellBehavior::Sand,
                mass: 10,
                color: 0xFF80_C2E0,
            },
            CellTemplate {
                id: MAT_WATER,
                key: "base:water".to_string(),
                behavior: CellBehavior::Water,
                mass: 4,
                color: 0xFFD0_8030,
            },
            CellTemplate {
                id: MAT_WALL,
                key: "base:wall".to_string(),
                behavior: CellBehavior::Wall,
                mass: WALL_MASS,
                color: 0xFF50_5050,
            },
        ];
        let key_to_id = templates
            .iter()
            .map(|t| (t.key.clone(), t.id))
            .collect();
        Self {
            templates,
            key_to_id,
        }
    }

    /// Parse and validate a JSON material bundle.
    pub fn from_bundle_json(json: &str) -> Result<Self, EngineError> {
        let bundle: BundleRoot = serde_json::from_str(json)
            .map_err(|e| EngineError::InvalidConfiguration(format!("material bundle: {e}")))?;
        Self::from_templates(bundle.materials)
    }

    /// Validate templates and build the registry.
    ///
    /// Ids must be dense and in order (template `i` has id `i`), id 0
    /// must be the air material, air mass must be zero, and wall mass is
    /// normalized to the sentinel. Duplicate keys are rejected.
    pub fn from_templates(templates: Vec<CellTemplate>) -> Result<Self, EngineError> {
        if templates.is_empty() {
            return Err(EngineError::InvalidConfiguration(
                "material bundle is empty".to_string(),
            ));
        }

        let mut key_to_id = HashMap::with_capacity(templates.len());
        let mut templates = templates;

        for (index, template) in templates.iter_mut().enumerate() {
            if template.id as usize != index {
                return Err(EngineError::InvalidConfiguration(format!(
                    "material '{}' has id {} at position {index}; ids must be dense and ordered",
                    template.key, template.id
                )));
            }
            match template.behavior {
                CellBehavior::Air if template.mass != AIR_MASS => {
                    return Err(EngineError::InvalidConfiguration(format!(
                        "air material '{}' must have mass {AIR_MASS}",
                        template.key
                    )));
                }
                CellBehavior::Wall => template.mass = WALL_MASS,
                _ => {}
            }
            if key_to_id
                .insert(template.key.clone(), template.id)
                .is_some()
            {
                return Err(EngineError::InvalidConfiguration(format!(
                    "duplicate material key '{}'",
                    template.key
                )));
            }
        }

        if templates[MAT_AIR as usize].behavior != CellBehavior::Air {
            return Err(EngineError::InvalidConfiguration(
                "material id 0 must be the air material".to_string(),
            ));
        }

        Ok(Self {
            templates,
            key_to_id,
        })
    }

    pub fn template(&self, id: MaterialId) -> Option<&CellTemplate> {
        self.templates.get(id as usize)
    }

    pub fn id_by_key(&self, key: &str) -> Option<MaterialId> {
        self.key_to_id.get(key).copied()
    }

    pub fn templates(&self) -> &[CellTemplate] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
