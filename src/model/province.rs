use serde::{Deserialize, Serialize};

use super::nation::NationId;

pub type ProvinceId = u64;

/// A constructed building with its current operating efficiency (0–1).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Building {
    pub kind: String,
    pub efficiency: f64,
}

impl Building {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            efficiency: 1.0,
        }
    }
}

/// A province record. The engine only touches unrest, population, and
/// building efficiency; everything else about provinces (terrain, borders,
/// adjacency) lives with the map layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Province {
    pub id: ProvinceId,
    pub name: String,
    pub owner: NationId,
    /// Civil unrest, 0–10.
    #[serde(default)]
    pub unrest: f64,
    #[serde(default)]
    pub population: i64,
    #[serde(default)]
    pub buildings: Vec<Building>,
}

impl Province {
    pub fn new(id: ProvinceId, name: impl Into<String>, owner: NationId) -> Self {
        Self {
            id,
            name: name.into(),
            owner,
            unrest: 0.0,
            population: 0,
            buildings: Vec::new(),
        }
    }
}
