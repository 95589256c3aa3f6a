//! Campaign-wide bid adjustment: shift every target bid by a directional
//! delta and clamp the result into the requested range.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use bidpilot_core::error::{AdsError, AdsResult};
use bidpilot_core::types::{BidChange, BidUpdate, Target};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Direction of a bid adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increase,
    Decrease,
}

impl FromStr for Direction {
    type Err = AdsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "increase" => Ok(Direction::Increase),
            "down" | "decrease" => Ok(Direction::Decrease),
            other => Err(AdsError::Validation(format!(
                "unknown direction '{other}', expected up or down"
            ))),
        }
    }
}

/// Parameters for one adjustment run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentParams {
    /// Absolute change applied to every bid, in the account currency.
    pub delta: f64,
    pub direction: Direction,
    /// Lower clamp, applied to the shifted bid when set.
    pub min_bid: Option<f64>,
    /// Upper clamp, applied after the lower clamp when set.
    pub max_bid: Option<f64>,
}

impl AdjustmentParams {
    /// Reject deltas and bounds that can never describe a valid bid move.
    ///
    /// `min_bid > max_bid` is accepted; the fixed clamp order below gives
    /// such input a well-defined result.
    pub fn validate(&self) -> AdsResult<()> {
        if !self.delta.is_finite() || self.delta <= 0.0 {
            return Err(AdsError::Validation(
                "bid delta must be a positive amount".to_string(),
            ));
        }
        if let Some(min) = self.min_bid {
            if !min.is_finite() || min <= 0.0 {
                return Err(AdsError::Validation(
                    "minimum bid must be a positive amount".to_string(),
                ));
            }
        }
        if let Some(max) = self.max_bid {
            if !max.is_finite() || max <= 0.0 {
                return Err(AdsError::Validation(
                    "maximum bid must be a positive amount".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Batch rows and change previews produced by one computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidComputation {
    /// Rows to submit; targets whose bid would not change are excluded.
    pub updates: Vec<BidUpdate>,
    /// Old/new pairs aligned row-for-row with `updates`.
    pub preview: Vec<BidChange>,
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Compute new bids for every usable target.
///
/// Per target: shift the bid by `delta` in the requested direction
/// (a decrease never goes below zero), then apply the lower clamp, then
/// the upper clamp. Targets with no id or no bid are skipped; targets
/// whose computed bid equals the current bid are dropped from the output.
/// Input order is preserved.
pub fn compute_updates(targets: &[Target], params: &AdjustmentParams) -> AdsResult<BidComputation> {
    params.validate()?;

    let mut updates = Vec::new();
    let mut preview = Vec::new();

    for target in targets {
        let target_id = match target.id() {
            Some(id) => id,
            None => continue,
        };
        let old_bid = match target.bid {
            Some(bid) => bid,
            None => continue,
        };

        let mut new_bid = match params.direction {
            Direction::Increase => old_bid + params.delta,
            Direction::Decrease => (old_bid - params.delta).max(0.0),
        };
        if let Some(min) = params.min_bid {
            new_bid = new_bid.max(min);
        }
        if let Some(max) = params.max_bid {
            new_bid = new_bid.min(max);
        }

        if new_bid == old_bid {
            continue;
        }

        updates.push(BidUpdate {
            target_id,
            bid: new_bid,
        });
        preview.push(BidChange {
            target_id,
            old_bid,
            new_bid,
        });
    }

    Ok(BidComputation { updates, preview })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn target(id: u64, bid: f64) -> Target {
        Target {
            target_id: Some(id),
            keyword_id: None,
            bid: Some(bid),
            state: None,
        }
    }

    fn params(delta: f64, direction: Direction) -> AdjustmentParams {
        AdjustmentParams {
            delta,
            direction,
            min_bid: None,
            max_bid: None,
        }
    }

    // 1. Basic adjustment ---------------------------------------------------

    #[test]
    fn test_increase_applies_delta_to_all_targets() {
        let targets = vec![target(1, 1.00), target(2, 2.00)];
        let result = compute_updates(&targets, &params(0.50, Direction::Increase)).unwrap();

        assert_eq!(result.updates.len(), 2);
        assert_eq!(result.updates[0].target_id, 1);
        assert!((result.updates[0].bid - 1.50).abs() < f64::EPSILON);
        assert_eq!(result.updates[1].target_id, 2);
        assert!((result.updates[1].bid - 2.50).abs() < f64::EPSILON);

        // Preview mirrors the updates row for row.
        assert_eq!(result.preview.len(), 2);
        assert!((result.preview[0].old_bid - 1.00).abs() < f64::EPSILON);
        assert!((result.preview[0].new_bid - 1.50).abs() < f64::EPSILON);
        assert!((result.preview[1].old_bid - 2.00).abs() < f64::EPSILON);
        assert!((result.preview[1].new_bid - 2.50).abs() < f64::EPSILON);
    }

    #[test]
    fn test_decrease_applies_delta() {
        let targets = vec![target(1, 2.00)];
        let result = compute_updates(&targets, &params(0.75, Direction::Decrease)).unwrap();
        assert!((result.updates[0].bid - 1.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_keyword_targets_use_keyword_id() {
        let targets = vec![Target {
            target_id: None,
            keyword_id: Some(42),
            bid: Some(1.00),
            state: None,
        }];
        let result = compute_updates(&targets, &params(0.10, Direction::Increase)).unwrap();
        assert_eq!(result.updates[0].target_id, 42);
    }

    // 2. Zero floor and clamps ----------------------------------------------

    #[test]
    fn test_decrease_never_goes_below_zero() {
        let targets = vec![target(1, 0.30)];
        let result = compute_updates(&targets, &params(0.50, Direction::Decrease)).unwrap();
        assert!(result.updates[0].bid.abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_floor_applies_before_min_clamp() {
        // 0.30 - 0.50 floors at 0, then the lower clamp lifts it to 0.25.
        let targets = vec![target(1, 0.30)];
        let p = AdjustmentParams {
            min_bid: Some(0.25),
            ..params(0.50, Direction::Decrease)
        };
        let result = compute_updates(&targets, &p).unwrap();
        assert!((result.updates[0].bid - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_min_clamp_raises_low_bids() {
        let targets = vec![target(1, 0.40)];
        let p = AdjustmentParams {
            min_bid: Some(0.35),
            ..params(0.20, Direction::Decrease)
        };
        let result = compute_updates(&targets, &p).unwrap();
        assert!((result.updates[0].bid - 0.35).abs() < f64::EPSILON);
    }

    #[test]
    fn test_max_clamp_applies_after_min_clamp() {
        // 5 + 10 = 15, lower clamp keeps 15, upper clamp cuts to 8.
        let targets = vec![target(1, 5.0)];
        let p = AdjustmentParams {
            min_bid: Some(3.0),
            max_bid: Some(8.0),
            ..params(10.0, Direction::Increase)
        };
        let result = compute_updates(&targets, &p).unwrap();
        assert!((result.updates[0].bid - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_min_above_max_lets_max_win() {
        // Contradictory bounds are not rejected; the upper clamp runs last.
        let targets = vec![target(1, 1.0)];
        let p = AdjustmentParams {
            min_bid: Some(6.0),
            max_bid: Some(2.0),
            ..params(1.0, Direction::Increase)
        };
        let result = compute_updates(&targets, &p).unwrap();
        assert!((result.updates[0].bid - 2.0).abs() < f64::EPSILON);
    }

    // 3. Skipping and no-op filtering ---------------------------------------

    #[test]
    fn test_skips_targets_missing_id_or_bid() {
        let targets = vec![
            Target {
                target_id: None,
                keyword_id: None,
                bid: Some(1.00),
                state: None,
            },
            Target {
                target_id: Some(2),
                keyword_id: None,
                bid: None,
                state: None,
            },
            target(3, 1.00),
        ];
        let result = compute_updates(&targets, &params(0.10, Direction::Increase)).unwrap();
        assert_eq!(result.updates.len(), 1);
        assert_eq!(result.updates[0].target_id, 3);
    }

    #[test]
    fn test_unchanged_bids_are_excluded() {
        // First target is already at the cap, second still moves.
        let targets = vec![target(1, 1.00), target(2, 0.60)];
        let p = AdjustmentParams {
            max_bid: Some(1.00),
            ..params(0.50, Direction::Increase)
        };
        let result = compute_updates(&targets, &p).unwrap();
        assert_eq!(result.updates.len(), 1);
        assert_eq!(result.updates[0].target_id, 2);
        assert!((result.updates[0].bid - 1.00).abs() < f64::EPSILON);
        assert_eq!(result.preview.len(), 1);
        assert_eq!(result.preview[0].target_id, 2);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let result = compute_updates(&[], &params(0.10, Direction::Increase)).unwrap();
        assert!(result.updates.is_empty());
        assert!(result.preview.is_empty());
    }

    #[test]
    fn test_preserves_input_order() {
        let targets = vec![target(9, 1.0), target(4, 2.0), target(7, 3.0)];
        let result = compute_updates(&targets, &params(0.10, Direction::Increase)).unwrap();
        let ids: Vec<u64> = result.updates.iter().map(|u| u.target_id).collect();
        assert_eq!(ids, vec![9, 4, 7]);
    }

    // 4. Validation ---------------------------------------------------------

    #[test]
    fn test_rejects_non_positive_delta() {
        let targets = vec![target(1, 1.00)];
        let zero = compute_updates(&targets, &params(0.0, Direction::Increase));
        assert!(matches!(zero, Err(AdsError::Validation(_))));
        let negative = compute_updates(&targets, &params(-0.10, Direction::Decrease));
        assert!(matches!(negative, Err(AdsError::Validation(_))));
    }

    #[test]
    fn test_rejects_non_positive_bounds() {
        let targets = vec![target(1, 1.00)];
        let p = AdjustmentParams {
            min_bid: Some(0.0),
            ..params(0.10, Direction::Increase)
        };
        assert!(matches!(
            compute_updates(&targets, &p),
            Err(AdsError::Validation(_))
        ));

        let p = AdjustmentParams {
            max_bid: Some(-1.0),
            ..params(0.10, Direction::Increase)
        };
        assert!(matches!(
            compute_updates(&targets, &p),
            Err(AdsError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_nan_delta() {
        let targets = vec![target(1, 1.00)];
        let result = compute_updates(&targets, &params(f64::NAN, Direction::Increase));
        assert!(matches!(result, Err(AdsError::Validation(_))));
    }

    // 5. Direction parsing --------------------------------------------------

    #[test]
    fn test_direction_from_str() {
        assert_eq!("up".parse::<Direction>().unwrap(), Direction::Increase);
        assert_eq!("DOWN".parse::<Direction>().unwrap(), Direction::Decrease);
        assert_eq!(
            "increase".parse::<Direction>().unwrap(),
            Direction::Increase
        );
        assert!("sideways".parse::<Direction>().is_err());
    }
}
