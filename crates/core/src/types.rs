//! Amazon Ads API v2 wire types.
//! Subset of fields the bid manager reads and writes; unknown response
//! fields are ignored on deserialization.

use serde::{Deserialize, Serialize};

/// Advertiser profile returned by `/v2/profiles`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub profile_id: u64,
    #[serde(default)]
    pub country_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    #[serde(default)]
    pub account_info: AccountInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    /// Global `ENTITY…` identifier of the advertising account.
    #[serde(default)]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,
}

impl Profile {
    /// Display name of the account; placeholder when the platform has none.
    pub fn account_name(&self) -> &str {
        self.account_info.name.as_deref().unwrap_or("(unnamed)")
    }

    /// Global entity id of the account.
    pub fn entity_id(&self) -> &str {
        &self.account_info.id
    }
}

/// Sponsored Products campaign returned by `/v2/sp/campaigns`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub campaign_id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: EntityState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_type: Option<String>,
}

/// Lifecycle state shared by campaigns and targets.
///
/// Serialized lowercase. Deserialization is tolerant: an unrecognized
/// state from the platform maps to `Unknown` instead of failing the
/// whole response. Operator input goes through the strict `FromStr`.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntityState {
    #[default]
    Enabled,
    Paused,
    Archived,
    Unknown,
}

impl EntityState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityState::Enabled => "enabled",
            EntityState::Paused => "paused",
            EntityState::Archived => "archived",
            EntityState::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for EntityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityState {
    type Err = crate::error::AdsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enabled" => Ok(EntityState::Enabled),
            "paused" => Ok(EntityState::Paused),
            "archived" => Ok(EntityState::Archived),
            other => Err(crate::error::AdsError::Validation(format!(
                "unknown state '{other}', expected enabled, paused or archived"
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for EntityState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.to_ascii_lowercase().as_str() {
            "enabled" => EntityState::Enabled,
            "paused" => EntityState::Paused,
            "archived" => EntityState::Archived,
            _ => EntityState::Unknown,
        })
    }
}

/// Keyword or product target returned by `/v2/sp/targets`.
///
/// The platform splits targets across two entity families: product
/// targets carry `targetId`, keyword targets carry `keywordId`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bid: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<EntityState>,
}

impl Target {
    /// Unified identifier across both target families; `targetId` wins
    /// when both are present.
    pub fn id(&self) -> Option<u64> {
        self.target_id.or(self.keyword_id)
    }
}

/// One row of the batch submitted to `PUT /v2/sp/targets`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidUpdate {
    pub target_id: u64,
    pub bid: f64,
}

/// Before/after record for one target in an adjustment preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidChange {
    pub target_id: u64,
    pub old_bid: f64,
    pub new_bid: f64,
}

/// Result of one batch bid submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    /// Number of updates submitted in the batch.
    pub updated: usize,
    /// Raw platform response; `None` when nothing was submitted.
    pub api_response: Option<serde_json::Value>,
}

/// Outcome of a campaign-wide bid adjustment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignAdjustment {
    pub updated: usize,
    pub preview: Vec<BidChange>,
    pub api_response: Option<serde_json::Value>,
}
