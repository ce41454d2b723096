use serde::Deserialize;

/// Tunable thresholds for stake sizing and recommendation gating. The EV
/// floor is deliberately stricter than the 3% flag threshold the reasoning
/// prompt uses; the gap is headroom against model estimation error and is
/// configuration, not structure.
#[derive(Debug, Clone, Deserialize)]
pub struct StakePolicy {
    /// Kelly fraction; 0.25 = quarter-Kelly.
    #[serde(default = "default_kelly_fraction")]
    pub kelly_fraction: f64,
    /// Hard cap on a single stake, in units.
    #[serde(default = "default_max_units")]
    pub max_units: f64,
    /// Minimum EV for a bet to stay recommended.
    #[serde(default = "default_ev_floor")]
    pub ev_floor: f64,
    /// Stakes in (0, unit_floor) are noise and get suppressed.
    #[serde(default = "default_unit_floor")]
    pub unit_floor: f64,
    /// Minimum model confidence for a bet to stay recommended.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
}

impl Default for StakePolicy {
    fn default() -> Self {
        Self {
            kelly_fraction: default_kelly_fraction(),
            max_units: default_max_units(),
            ev_floor: default_ev_floor(),
            unit_floor: default_unit_floor(),
            min_confidence: default_min_confidence(),
        }
    }
}

fn default_kelly_fraction() -> f64 {
    0.25
}

fn default_max_units() -> f64 {
    3.0
}

fn default_ev_floor() -> f64 {
    0.035
}

fn default_unit_floor() -> f64 {
    0.05
}

fn default_min_confidence() -> f64 {
    0.55
}
