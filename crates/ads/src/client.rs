//! Sponsored Products API client: profile and campaign listings, target
//! reads, batch bid updates, and account-link requests.

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde_json::json;
use tracing::{debug, info, warn};

use bidpilot_core::config::AppConfig;
use bidpilot_core::error::{AdsError, AdsResult};
use bidpilot_core::region::Region;
use bidpilot_core::types::{
    BidUpdate, Campaign, CampaignAdjustment, EntityState, Profile, Target, UpdateOutcome,
};
use bidpilot_engine::adjust::{compute_updates, AdjustmentParams};

use crate::token::TokenCache;

const CLIENT_ID_HEADER: &str = "Amazon-Advertising-API-ClientId";
const SCOPE_HEADER: &str = "Amazon-Advertising-API-Scope";

/// Server-side state filter applied when the operator does not choose one.
pub const DEFAULT_CAMPAIGN_STATES: &[EntityState] = &[EntityState::Enabled, EntityState::Paused];

/// Blocking client for the Ads API.
///
/// Every request fetches a bearer token from the owned [`TokenCache`]
/// first, so token renewal is transparent to callers. Requests are never
/// retried; a non-2xx response surfaces as [`AdsError::Api`].
pub struct AdsClient {
    http: Client,
    base_url: String,
    client_id: String,
    tokens: TokenCache,
}

impl AdsClient {
    /// Build a client from application configuration.
    pub fn from_config(config: &AppConfig) -> AdsResult<Self> {
        let timeout = std::time::Duration::from_secs(config.api.timeout_secs);
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            client_id: config.auth.client_id.clone(),
            tokens: TokenCache::new(config.auth.clone(), timeout)?,
        })
    }

    /// List every advertiser profile visible to the credentials.
    pub fn list_profiles(&self) -> AdsResult<Vec<Profile>> {
        let request = self.http.get(format!("{}/v2/profiles", self.base_url));
        let response = self.send(request, None)?;
        Ok(response.json()?)
    }

    /// List Sponsored Products campaigns for a profile.
    ///
    /// `states` filters server-side; an empty slice disables the filter
    /// and returns campaigns in every state.
    pub fn list_campaigns(
        &self,
        profile_id: u64,
        states: &[EntityState],
    ) -> AdsResult<Vec<Campaign>> {
        let mut request = self.http.get(format!("{}/v2/sp/campaigns", self.base_url));
        if !states.is_empty() {
            let filter = states
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(",");
            request = request.query(&[("stateFilter", filter)]);
        }
        let response = self.send(request, Some(profile_id))?;
        Ok(response.json()?)
    }

    /// List every keyword and product target inside one campaign.
    pub fn list_targets(&self, profile_id: u64, campaign_id: u64) -> AdsResult<Vec<Target>> {
        let request = self
            .http
            .get(format!("{}/v2/sp/targets", self.base_url))
            .query(&[("campaignIdFilter", campaign_id.to_string())]);
        let response = self.send(request, Some(profile_id))?;
        Ok(response.json()?)
    }

    /// Submit a batch of bid updates for a profile's targets.
    ///
    /// An empty batch returns immediately with `updated = 0` and no API
    /// call. Otherwise `updated` reports the submitted batch size; the
    /// platform's per-row results pass through verbatim in
    /// `api_response` and are not reconciled against the batch.
    pub fn update_bids(&self, profile_id: u64, updates: &[BidUpdate]) -> AdsResult<UpdateOutcome> {
        if updates.is_empty() {
            debug!(profile_id, "No bid updates to submit");
            return Ok(UpdateOutcome {
                updated: 0,
                api_response: None,
            });
        }

        let request = self
            .http
            .put(format!("{}/v2/sp/targets", self.base_url))
            .json(updates);
        let response = self.send(request, Some(profile_id))?;
        let api_response: serde_json::Value = response.json()?;

        metrics::counter!("ads.bids_updated").increment(updates.len() as u64);
        info!(profile_id, updated = updates.len(), "Submitted bid update batch");
        Ok(UpdateOutcome {
            updated: updates.len(),
            api_response: Some(api_response),
        })
    }

    /// Ask the platform to link a profile to the manager account.
    ///
    /// The request goes to the regional endpoint owning the profile.
    /// Returns the approval link the client account must open, or an
    /// empty string when the platform does not return one.
    pub fn create_account_link(
        &self,
        profile_id: u64,
        manager_entity_id: &str,
        region: Region,
    ) -> AdsResult<String> {
        self.account_link_request(region.api_base(), profile_id, manager_entity_id)
    }

    fn account_link_request(
        &self,
        base_url: &str,
        profile_id: u64,
        manager_entity_id: &str,
    ) -> AdsResult<String> {
        let request = self
            .http
            .post(format!(
                "{}/v2/profiles/{profile_id}/authorization",
                base_url.trim_end_matches('/')
            ))
            .json(&json!({ "managerEntityId": manager_entity_id }));
        let response = self.send(request, Some(profile_id))?;
        let payload: serde_json::Value = response.json()?;

        let link = payload
            .get("approvalLink")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        if link.is_empty() {
            warn!(profile_id, "Link request accepted but no approval link returned");
        }
        Ok(link)
    }

    /// Adjust every bid in a campaign and submit the result.
    ///
    /// Runs strictly in sequence: fetch the campaign's targets, compute
    /// new bids, submit exactly that batch. Nothing is submitted when no
    /// bid would change.
    pub fn adjust_campaign_bids(
        &self,
        profile_id: u64,
        campaign_id: u64,
        params: &AdjustmentParams,
    ) -> AdsResult<CampaignAdjustment> {
        params.validate()?;

        let targets = self.list_targets(profile_id, campaign_id)?;
        debug!(
            profile_id,
            campaign_id,
            targets = targets.len(),
            "Fetched targets for adjustment"
        );

        let computation = compute_updates(&targets, params)?;
        let outcome = self.update_bids(profile_id, &computation.updates)?;

        Ok(CampaignAdjustment {
            updated: outcome.updated,
            preview: computation.preview,
            api_response: outcome.api_response,
        })
    }

    /// Attach auth headers, send, and map non-2xx responses to errors.
    /// Profile-scoped calls carry the scope header; `list_profiles` does not.
    fn send(&self, request: RequestBuilder, profile_id: Option<u64>) -> AdsResult<Response> {
        let token = self.tokens.access_token()?;
        let mut request = request
            .bearer_auth(token)
            .header(CLIENT_ID_HEADER, &self.client_id);
        if let Some(profile_id) = profile_id {
            request = request.header(SCOPE_HEADER, profile_id.to_string());
        }

        let started = std::time::Instant::now();
        let response = request.send()?;
        metrics::histogram!("ads.request_latency_ms")
            .record(started.elapsed().as_secs_f64() * 1000.0);
        metrics::counter!("ads.requests").increment(1);

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            metrics::counter!("ads.request_errors").increment(1);
            return Err(AdsError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}
