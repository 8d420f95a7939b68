use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broad grouping used by the UI layer for sorting and icon selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceCategory {
    Energy,
    Industrial,
    Agricultural,
    Strategic,
    Manpower,
}

/// Immutable catalog entry, supplied by the data-ingestion layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub category: ResourceCategory,
    pub unit: String,
    pub base_price: f64,
}

impl Resource {
    pub fn new(
        id: impl Into<String>,
        category: ResourceCategory,
        unit: impl Into<String>,
        base_price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            unit: unit.into(),
            base_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("resource `{0}` is not in the catalog")]
    UnknownResource(String),
    #[error("duplicate resource id `{0}` in catalog")]
    DuplicateResource(String),
}

/// Validated resource catalog injected at engine construction.
///
/// Lookups are fail-fast: a resource id with no catalog entry is an error,
/// never a silent fallback price.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceCatalog {
    resources: BTreeMap<String, Resource>,
}

impl ResourceCatalog {
    pub fn new(resources: impl IntoIterator<Item = Resource>) -> Result<Self, CatalogError> {
        let mut map = BTreeMap::new();
        for resource in resources {
            if map.insert(resource.id.clone(), resource.clone()).is_some() {
                return Err(CatalogError::DuplicateResource(resource.id));
            }
        }
        Ok(Self { resources: map })
    }

    pub fn get(&self, id: &str) -> Result<&Resource, CatalogError> {
        self.resources
            .get(id)
            .ok_or_else(|| CatalogError::UnknownResource(id.to_string()))
    }

    pub fn price(&self, id: &str) -> Result<f64, CatalogError> {
        Ok(self.get(id)?.base_price)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.resources.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// The stock catalog shipped with the game data files. Prices mirror the
    /// YAML catalog; scenarios and demos use this so they don't have to spell
    /// out nine entries every time.
    pub fn standard() -> Self {
        let entries = [
            ("electricity", ResourceCategory::Energy, "GWh", 40.0),
            ("oil", ResourceCategory::Energy, "kbbl", 60.0),
            ("uranium", ResourceCategory::Energy, "t", 120.0),
            ("steel", ResourceCategory::Industrial, "kt", 50.0),
            ("consumer_goods", ResourceCategory::Industrial, "units", 30.0),
            ("food", ResourceCategory::Agricultural, "kt", 20.0),
            ("manpower", ResourceCategory::Manpower, "k", 10.0),
            ("rare_earth", ResourceCategory::Strategic, "t", 150.0),
            ("semiconductors", ResourceCategory::Strategic, "units", 200.0),
        ];
        let catalog = Self::new(
            entries
                .into_iter()
                .map(|(id, category, unit, price)| Resource::new(id, category, unit, price)),
        );
        catalog.expect("standard catalog has no duplicate ids")
    }
}
