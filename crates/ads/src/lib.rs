//! Amazon Ads API access: the LWA token lifecycle and the Sponsored
//! Products client behind the bid manager.

pub mod client;
pub mod token;

pub use client::{AdsClient, DEFAULT_CAMPAIGN_STATES};
pub use token::{exchange_authorization_code, login_url, TokenCache, TokenGrant};
