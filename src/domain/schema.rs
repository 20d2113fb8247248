//! Persisted campaign record schema
//!
//! Campaigns are stored as JSON documents tagged with `schemaVersion`.
//! Version 1 is the untagged shape written by earlier clients, where every
//! field was loosely typed; it is migrated field by field into the current
//! [`Campaign`]. Version 2 is the strict serde shape of [`Campaign`].

use std::collections::BTreeMap;

use chrono::{DateTime, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::aggregates::Campaign;
use crate::domain::entities::{
    DrawRecord, Investigator, InvestigatorClass, Scenario, Statistics, Trauma,
};
use crate::domain::value_objects::{CampaignId, TokenCounts, TokenKind};

pub const CURRENT_SCHEMA_VERSION: u64 = 2;
const LEGACY_SCHEMA_VERSION: u64 = 1;
const SCHEMA_VERSION_FIELD: &str = "schemaVersion";

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Campaign record is not a JSON object")]
    NotAnObject,
    #[error("Unsupported campaign schema version {0}")]
    UnsupportedVersion(u64),
    #[error("Malformed campaign record: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct VersionedRecord<'a> {
    #[serde(rename = "schemaVersion")]
    schema_version: u64,
    #[serde(flatten)]
    campaign: &'a Campaign,
}

/// Encode a campaign as a current-version document
pub fn encode_campaign(campaign: &Campaign) -> Result<Value, SchemaError> {
    Ok(serde_json::to_value(VersionedRecord {
        schema_version: CURRENT_SCHEMA_VERSION,
        campaign,
    })?)
}

/// Decode a stored document of any known version into a campaign
pub fn decode_campaign(record: Value) -> Result<Campaign, SchemaError> {
    migrate_record(record, Utc::now())
}

/// Decode a stored document, migrating older shapes forward
///
/// `now` fills in timestamps that a legacy record never had.
pub fn migrate_record(record: Value, now: DateTime<Utc>) -> Result<Campaign, SchemaError> {
    let version = record
        .as_object()
        .ok_or(SchemaError::NotAnObject)?
        .get(SCHEMA_VERSION_FIELD)
        .and_then(Value::as_u64)
        .unwrap_or(LEGACY_SCHEMA_VERSION);

    match version {
        LEGACY_SCHEMA_VERSION => {
            let legacy: LegacyCampaign = serde_json::from_value(record)?;
            Ok(legacy.into_campaign(now))
        }
        CURRENT_SCHEMA_VERSION => Ok(serde_json::from_value(record)?),
        other => Err(SchemaError::UnsupportedVersion(other)),
    }
}

// ============================================================================
// Version 1
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LegacyCampaign {
    id: Option<String>,
    name: String,
    campaign_type: String,
    difficulty: String,
    created_at: Option<f64>,
    updated_at: Option<f64>,
    token_counts: BTreeMap<String, Value>,
    current_scenario_index: f64,
    scenarios: Vec<LegacyScenario>,
    investigators: Vec<LegacyInvestigator>,
    statistics: LegacyStatistics,
    notes: String,
    chaos_bag_modifications: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LegacyScenario {
    name: String,
    completed: bool,
    resolution: Option<String>,
    xp_earned: f64,
}

#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LegacyInvestigator {
    name: String,
    class: String,
    health: f64,
    sanity: f64,
    current_health: Option<f64>,
    current_sanity: Option<f64>,
    xp: f64,
    trauma: LegacyTrauma,
    eliminated: bool,
}

impl Default for LegacyInvestigator {
    fn default() -> Self {
        let defaults = Investigator::default();
        Self {
            name: defaults.name,
            class: String::new(),
            health: defaults.max_health as f64,
            sanity: defaults.max_sanity as f64,
            current_health: None,
            current_sanity: None,
            xp: 0.0,
            trauma: LegacyTrauma::default(),
            eliminated: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LegacyTrauma {
    physical: f64,
    mental: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LegacyStatistics {
    total_draws: f64,
    token_draws: BTreeMap<String, f64>,
    draw_history: Vec<LegacyDrawRecord>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LegacyDrawRecord {
    token_id: String,
    timestamp: f64,
    scenario_index: f64,
}

impl LegacyCampaign {
    fn into_campaign(self, now: DateTime<Utc>) -> Campaign {
        let id = match self.id.filter(|id| !id.trim().is_empty()) {
            Some(id) => CampaignId::from(id),
            None => {
                let id = CampaignId::new();
                tracing::warn!(campaign_id = %id, "Legacy campaign had no id, assigned a new one");
                id
            }
        };

        let updated = self.updated_at.and_then(millis_to_datetime);
        let created_at = self
            .created_at
            .and_then(millis_to_datetime)
            .or(updated)
            .unwrap_or_else(|| now.trunc_subsecs(3));
        let updated_at = updated.unwrap_or(created_at).max(created_at);

        let counts_record: BTreeMap<String, i64> = self
            .token_counts
            .iter()
            .map(|(key, value)| (key.clone(), number_of(value)))
            .collect();
        let (token_counts, unknown) = TokenCounts::from_record(&counts_record);
        if !unknown.is_empty() {
            tracing::warn!(campaign_id = %id, keys = ?unknown, "Dropping unknown token counts during migration");
        }

        let scenarios: Vec<Scenario> = self
            .scenarios
            .into_iter()
            .map(|s| Scenario {
                name: s.name,
                completed: s.completed,
                resolution: s.resolution.filter(|r| !r.trim().is_empty()),
                xp_earned: to_count(s.xp_earned),
            })
            .collect();

        let last_scenario = scenarios.len().saturating_sub(1);
        let current_scenario_index = (to_count(self.current_scenario_index) as usize).min(last_scenario);

        Campaign {
            id,
            name: self.name,
            campaign_type: self.campaign_type,
            difficulty: self.difficulty,
            created_at,
            updated_at,
            token_counts,
            current_scenario_index,
            scenarios,
            investigators: self
                .investigators
                .into_iter()
                .map(LegacyInvestigator::into_investigator)
                .collect(),
            statistics: self.statistics.into_statistics(created_at),
            notes: self.notes,
            chaos_bag_modifications: self.chaos_bag_modifications,
        }
    }
}

impl LegacyInvestigator {
    fn into_investigator(self) -> Investigator {
        let max_health = to_count(self.health);
        let max_sanity = to_count(self.sanity);
        Investigator {
            name: self.name,
            class: InvestigatorClass::from_tag(&self.class),
            max_health,
            max_sanity,
            current_health: self
                .current_health
                .map(to_count)
                .unwrap_or(max_health)
                .min(max_health),
            current_sanity: self
                .current_sanity
                .map(to_count)
                .unwrap_or(max_sanity)
                .min(max_sanity),
            xp: to_count(self.xp),
            trauma: Trauma {
                physical: to_count(self.trauma.physical),
                mental: to_count(self.trauma.mental),
            },
            eliminated: self.eliminated,
        }
    }
}

impl LegacyStatistics {
    fn into_statistics(self, fallback_time: DateTime<Utc>) -> Statistics {
        let token_draws = self
            .token_draws
            .into_iter()
            .filter_map(|(key, count)| {
                TokenKind::from_id(&key).map(|kind| (kind, to_count(count) as u64))
            })
            .filter(|&(_, count)| count > 0)
            .collect();

        let draw_history = self
            .draw_history
            .into_iter()
            .filter_map(|record| {
                let token_id = TokenKind::from_id(&record.token_id)?;
                Some(DrawRecord {
                    token_id,
                    timestamp: millis_to_datetime(record.timestamp).unwrap_or(fallback_time),
                    scenario_index: to_count(record.scenario_index) as usize,
                })
            })
            .collect();

        Statistics {
            total_draws: to_count(self.total_draws) as u64,
            token_draws,
            draw_history,
        }
    }
}

fn millis_to_datetime(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() {
        return None;
    }
    Utc.timestamp_millis_opt(millis as i64).single()
}

/// Non-negative integer from a loosely-typed number
fn to_count(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.min(u32::MAX as f64) as u32
    } else {
        0
    }
}

fn number_of(value: &Value) -> i64 {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
        .unwrap_or(0)
}
