//! Marketplace region mapping.
//! Profiles carry a two-letter marketplace country code; API traffic for
//! a profile must be routed to the regional endpoint that owns it.

use std::fmt;
use std::str::FromStr;

use crate::error::AdsError;

/// Ads API region. Each region runs its own API host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// North America
    Na,
    /// Europe
    Eu,
    /// Far East
    Fe,
}

impl Region {
    /// Base URL of the regional API endpoint.
    pub fn api_base(&self) -> &'static str {
        match self {
            Region::Na => "https://advertising-api.amazon.com",
            Region::Eu => "https://advertising-api-eu.amazon.com",
            Region::Fe => "https://advertising-api-fe.amazon.com",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Na => "NA",
            Region::Eu => "EU",
            Region::Fe => "FE",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = AdsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NA" => Ok(Region::Na),
            "EU" => Ok(Region::Eu),
            "FE" => Ok(Region::Fe),
            other => Err(AdsError::Validation(format!(
                "unknown region '{other}', expected NA, EU or FE"
            ))),
        }
    }
}

/// Map a marketplace country code to its region.
///
/// Returns `None` for unrecognized codes; callers must ask the operator
/// to pick a region rather than guess an endpoint.
pub fn infer_region(country_code: &str) -> Option<Region> {
    match country_code.trim().to_ascii_uppercase().as_str() {
        "US" | "CA" | "MX" => Some(Region::Na),
        "DE" | "FR" | "IT" | "ES" | "UK" | "GB" | "NL" | "SE" | "PL" | "BE" => Some(Region::Eu),
        "JP" | "SG" | "AE" | "AU" => Some(Region::Fe),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_region_known_marketplaces() {
        assert_eq!(infer_region("US"), Some(Region::Na));
        assert_eq!(infer_region("MX"), Some(Region::Na));
        assert_eq!(infer_region("DE"), Some(Region::Eu));
        assert_eq!(infer_region("GB"), Some(Region::Eu));
        assert_eq!(infer_region("UK"), Some(Region::Eu));
        assert_eq!(infer_region("JP"), Some(Region::Fe));
        assert_eq!(infer_region("AU"), Some(Region::Fe));
    }

    #[test]
    fn test_infer_region_is_case_insensitive() {
        assert_eq!(infer_region("us"), Some(Region::Na));
        assert_eq!(infer_region(" jp "), Some(Region::Fe));
    }

    #[test]
    fn test_infer_region_unknown_is_none() {
        assert_eq!(infer_region("ZZ"), None);
        assert_eq!(infer_region(""), None);
        assert_eq!(infer_region("BR"), None);
    }

    #[test]
    fn test_region_parse_and_display() {
        assert_eq!("na".parse::<Region>().unwrap(), Region::Na);
        assert_eq!("EU".parse::<Region>().unwrap(), Region::Eu);
        assert_eq!(Region::Fe.to_string(), "FE");
        assert!("APAC".parse::<Region>().is_err());
    }

    #[test]
    fn test_regional_api_hosts() {
        assert_eq!(Region::Na.api_base(), "https://advertising-api.amazon.com");
        assert_eq!(Region::Eu.api_base(), "https://advertising-api-eu.amazon.com");
        assert_eq!(Region::Fe.api_base(), "https://advertising-api-fe.amazon.com");
    }
}
