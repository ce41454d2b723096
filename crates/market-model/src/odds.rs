//! A single sportsbook line and its derived probability math.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::types::{BetSide, BetType};

/// Smallest legal magnitude for an American price. Books quote -110, +145,
/// never -50; anything below this is a feed error.
pub const MIN_PRICE_MAGNITUDE: i32 = 100;

/// One side of one market from one sportsbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Odds {
    #[serde(default = "default_sportsbook")]
    pub sportsbook: String,
    pub bet_type: BetType,
    pub side: BetSide,
    /// Spread or total line, e.g. -3.5 or 142.5. None for moneylines.
    pub line: Option<f64>,
    /// American odds, e.g. -110, +145.
    pub american_price: i32,
}

fn default_sportsbook() -> String {
    "fanduel".to_string()
}

impl Odds {
    pub fn new(
        bet_type: BetType,
        side: BetSide,
        line: Option<f64>,
        american_price: i32,
    ) -> Result<Self, ModelError> {
        validate_price(american_price)?;
        Ok(Self {
            sportsbook: default_sportsbook(),
            bet_type,
            side,
            line,
            american_price,
        })
    }

    /// Break-even win probability embedded in the price (vig included).
    pub fn implied_probability(&self) -> f64 {
        let p = self.american_price;
        if p < 0 {
            let m = f64::from(p.abs());
            m / (m + 100.0)
        } else {
            100.0 / (f64::from(p) + 100.0)
        }
    }

    /// Multiplicative payout factor, e.g. -110 -> 1.909.
    pub fn decimal_odds(&self) -> f64 {
        let p = self.american_price;
        if p < 0 {
            1.0 + 100.0 / f64::from(p.abs())
        } else {
            1.0 + f64::from(p) / 100.0
        }
    }

    /// Re-check the price after deserializing an external payload.
    pub fn validate(&self) -> Result<(), ModelError> {
        validate_price(self.american_price)
    }
}

fn validate_price(price: i32) -> Result<(), ModelError> {
    if price == 0 || price.abs() < MIN_PRICE_MAGNITUDE {
        return Err(ModelError::InvalidPrice(price));
    }
    Ok(())
}

/// Decimal odds for a bare American price, used when re-deriving EV fields
/// without an `Odds` at hand.
pub fn decimal_odds_for_price(price: i32) -> f64 {
    if price < 0 {
        1.0 + 100.0 / f64::from(price.abs())
    } else {
        1.0 + f64::from(price) / 100.0
    }
}

/// Implied probability for a bare American price.
pub fn implied_probability_for_price(price: i32) -> f64 {
    if price < 0 {
        let m = f64::from(price.abs());
        m / (m + 100.0)
    } else {
        100.0 / (f64::from(price) + 100.0)
    }
}
