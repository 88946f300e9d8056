//! Level entities and ancestor merging.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::field::Field;

/// Inheritable level properties.
///
/// Every property is independently optional; unset properties are filled in
/// from the nearest ancestor that sets them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelFields {
    #[serde(skip_serializing_if = "Field::is_unset")]
    pub name: Field<String>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    pub rows: Field<i32>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    pub columns: Field<i32>,
    #[serde(rename = "health_bar", skip_serializing_if = "Field::is_unset")]
    pub health: Field<i32>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    pub duration: Field<i32>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    pub combo_timer: Field<f32>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    pub unit_delay_multiplier: Field<f32>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    pub max_active_units: Field<i32>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    pub spawns_per_second: Field<f32>,
    #[serde(skip_serializing_if = "Field::is_unset")]
    pub spawn_frequency: Field<BTreeMap<String, f32>>,
}

impl LevelFields {
    /// True when at least one property would be inherited.
    pub fn has_unset(&self) -> bool {
        self.name.is_unset()
            || self.rows.is_unset()
            || self.columns.is_unset()
            || self.health.is_unset()
            || self.duration.is_unset()
            || self.combo_timer.is_unset()
            || self.unit_delay_multiplier.is_unset()
            || self.max_active_units.is_unset()
            || self.spawns_per_second.is_unset()
            || self.spawn_frequency.is_unset()
    }

    /// Fill every unset property from `ancestor`. Returns how many were filled.
    pub fn inherit_from(&mut self, ancestor: &LevelFields) -> usize {
        [
            self.name.inherit_from(&ancestor.name),
            self.rows.inherit_from(&ancestor.rows),
            self.columns.inherit_from(&ancestor.columns),
            self.health.inherit_from(&ancestor.health),
            self.duration.inherit_from(&ancestor.duration),
            self.combo_timer.inherit_from(&ancestor.combo_timer),
            self.unit_delay_multiplier
                .inherit_from(&ancestor.unit_delay_multiplier),
            self.max_active_units
                .inherit_from(&ancestor.max_active_units),
            self.spawns_per_second
                .inherit_from(&ancestor.spawns_per_second),
            self.spawn_frequency.inherit_from(&ancestor.spawn_frequency),
        ]
        .into_iter()
        .filter(|inherited| *inherited)
        .count()
    }
}

/// A level as stored, or as served after ancestor merging.
///
/// `id` and `parent` always belong to the level itself and are never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    #[serde(rename = "key")]
    pub id: String,
    #[serde(
        rename = "parent_key",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub parent: Option<String>,
    #[serde(flatten)]
    pub fields: LevelFields,
}

impl Level {
    /// Build a level from a write payload. The id comes from the caller, never
    /// from the payload body.
    pub fn from_payload(id: impl Into<String>, payload: LevelPayload) -> Result<Self, DomainError> {
        let id = id.into();
        validate_id(&id)?;

        let parent = payload.parent.filter(|parent| !parent.is_empty());
        if parent.as_deref() == Some(id.as_str()) {
            return Err(DomainError::validation(format!(
                "level `{id}` cannot be its own parent"
            )));
        }

        Ok(Self {
            id,
            parent,
            fields: payload.fields,
        })
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Whether resolving this level requires its parent's merged view.
    pub fn needs_ancestor(&self) -> bool {
        self.parent.is_some() && self.fields.has_unset()
    }

    /// Apply the parent's merged view to every unset property.
    pub fn merge_parent(&mut self, parent: &Level) -> usize {
        self.fields.inherit_from(&parent.fields)
    }
}

/// Body of a level upsert. Any `key` in the body is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LevelPayload {
    #[serde(rename = "parent_key", default)]
    pub parent: Option<String>,
    #[serde(flatten)]
    pub fields: LevelFields,
}

fn validate_id(id: &str) -> Result<(), DomainError> {
    if id.trim().is_empty() {
        return Err(DomainError::validation("level id must not be empty"));
    }
    if id.contains('/') {
        return Err(DomainError::validation(format!(
            "level id `{id}` must not contain `/`"
        )));
    }
    Ok(())
}
