use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A coffee as exposed by the catalog collaborator. Only the attributes used
/// for scoring are modeled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoffeeItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub roast_level: Option<String>,
    #[serde(default)]
    pub origin: Origin,
    #[serde(default)]
    pub processing_details: ProcessingDetails,
    #[serde(default)]
    pub flavor_profile: FlavorProfile,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Origin {
    pub country: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessingDetails {
    pub method: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlavorProfile {
    pub flavor_notes: Vec<String>,
}

/// The four attribute families preferences are tracked over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeFamily {
    RoastLevel,
    Origin,
    ProcessingMethod,
    FlavorNote,
}

impl AttributeFamily {
    pub const ALL: [AttributeFamily; 4] = [
        Self::RoastLevel,
        Self::Origin,
        Self::ProcessingMethod,
        Self::FlavorNote,
    ];
}

impl CoffeeItem {
    /// Normalized (trimmed, lowercase) attribute values of one family.
    pub fn attributes(&self, family: AttributeFamily) -> Vec<String> {
        let raw: Vec<&String> = match family {
            AttributeFamily::RoastLevel => self.roast_level.iter().collect(),
            AttributeFamily::Origin => self.origin.country.iter().collect(),
            AttributeFamily::ProcessingMethod => self.processing_details.method.iter().collect(),
            AttributeFamily::FlavorNote => self.flavor_profile.flavor_notes.iter().collect(),
        };
        let mut values: Vec<String> = raw
            .into_iter()
            .map(|v| normalize_attribute(v))
            .filter(|v| !v.is_empty())
            .collect();
        values.sort();
        values.dedup();
        values
    }
}

pub fn normalize_attribute(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Attribute filter for catalog queries. Empty lists do not constrain.
/// Flavor notes match when any note overlaps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogFilter {
    pub roast_levels: Vec<String>,
    pub origin_countries: Vec<String>,
    pub processing_methods: Vec<String>,
    pub flavor_notes: Vec<String>,
    pub exclude_ids: Vec<String>,
    pub limit: Option<usize>,
}

impl CatalogFilter {
    pub fn matches(&self, item: &CoffeeItem) -> bool {
        if self.exclude_ids.iter().any(|id| id == &item.id) {
            return false;
        }
        let checks = [
            (&self.roast_levels, AttributeFamily::RoastLevel),
            (&self.origin_countries, AttributeFamily::Origin),
            (&self.processing_methods, AttributeFamily::ProcessingMethod),
            (&self.flavor_notes, AttributeFamily::FlavorNote),
        ];
        checks.iter().all(|(wanted, family)| {
            if wanted.is_empty() {
                return true;
            }
            let have = item.attributes(*family);
            wanted
                .iter()
                .any(|w| have.contains(&normalize_attribute(w)))
        })
    }
}
