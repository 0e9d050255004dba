use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Nested driver reference as delivered by current exports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverRef {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskProgression {
    Announced,
    Ongoing,
    Completed,
    Discarded,
    #[default]
    #[serde(other)]
    Unknown,
}

impl TaskProgression {
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// A single delivery task snapshot. Tasks are read-only inputs: the pipeline
/// never mutates them, and missing or unparseable fields stay `None` rather
/// than failing the whole record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliveryTask {
    pub id: String,
    #[serde(default)]
    pub driver: Option<DriverRef>,
    /// Legacy flat export fields, still present in older snapshots.
    #[serde(default)]
    pub driver_first_name: Option<String>,
    #[serde(default)]
    pub driver_last_name: Option<String>,
    #[serde(default)]
    pub hub: Option<String>,
    #[serde(default)]
    pub progression: TaskProgression,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub window_start: Option<NaiveDateTime>,
    #[serde(default)]
    pub window_end: Option<NaiveDateTime>,
    #[serde(default)]
    pub closed_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub completed_via: Option<String>,
    #[serde(default)]
    pub address_confirmed: Option<bool>,
    #[serde(default)]
    pub contactless_forced: Option<bool>,
}

/// A delivery round (one vehicle, one departure). Only classification reads
/// these; the scoring rollup works from tasks alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliveryRound {
    pub name: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub hub: Option<String>,
    #[serde(default)]
    pub weight_capacity_kg: Option<f64>,
    /// Manual carrier assignment. Takes precedence over every matching rule.
    #[serde(default)]
    pub carrier_override: Option<String>,
    #[serde(default)]
    pub driver: Option<DriverRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HubKind {
    #[serde(rename = "entrepot")]
    Warehouse,
    #[serde(rename = "magasin")]
    Store,
}

impl HubKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Warehouse => "Entrepôt",
            Self::Store => "Magasin",
        }
    }
}

/// Maps hub names onto operational depots by case-insensitive prefix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepotRule {
    pub depot: String,
    pub kind: HubKind,
    pub prefixes: Vec<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarrierMatch {
    Suffix,
    Prefix,
    Contains,
}

/// Attributes a driver to a transport company by matching the normalized
/// driver name. Lower priority numbers are evaluated first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarrierRule {
    pub carrier: String,
    pub matcher: CarrierMatch,
    pub value: String,
    pub priority: i32,
    #[serde(default = "default_active")]
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForecastKind {
    #[serde(rename = "time")]
    Time,
    #[serde(rename = "type")]
    RoundType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundCategory {
    Matin,
    Soir,
    #[serde(rename = "BU")]
    Bu,
    Classique,
}

impl RoundCategory {
    pub const fn ordered() -> [Self; 4] {
        [Self::Matin, Self::Soir, Self::Bu, Self::Classique]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Matin => "Matin",
            Self::Soir => "Soir",
            Self::Bu => "BU",
            Self::Classique => "Classique",
        }
    }
}

/// Buckets rounds into planning categories by keyword lookup on the round
/// name. `kind` records which naming convention the keywords target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastRule {
    pub name: String,
    pub kind: ForecastKind,
    pub keywords: Vec<String>,
    pub category: RoundCategory,
    #[serde(default = "default_active")]
    pub active: bool,
}

/// The full classification configuration, supplied by the caller on every
/// invocation. Rule lists may be empty; every resolver has a defined default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub depots: Vec<DepotRule>,
    #[serde(default)]
    pub carriers: Vec<CarrierRule>,
    #[serde(default)]
    pub forecasts: Vec<ForecastRule>,
}

fn default_active() -> bool {
    true
}

/// Per-driver metrics derived from the driver's task list. Rate fields are
/// percentages in [0, 100], `None` when the denominator is empty.
#[derive(Debug, Clone, Serialize)]
pub struct DriverStats {
    pub name: String,
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub total_ratings: u32,
    pub average_rating: Option<f64>,
    pub punctuality_rate: Option<f64>,
    pub scanbac_rate: Option<f64>,
    pub forced_address_rate: Option<f64>,
    pub forced_contactless_rate: Option<f64>,
    pub score: f64,
}

/// Carrier-, depot-, or network-level totals. Same shape as [`DriverStats`]
/// plus the alert tally for the underlying tasks.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateStats {
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub total_ratings: u32,
    pub average_rating: Option<f64>,
    pub punctuality_rate: Option<f64>,
    pub scanbac_rate: Option<f64>,
    pub forced_address_rate: Option<f64>,
    pub forced_contactless_rate: Option<f64>,
    pub score: f64,
    pub total_alerts: u32,
    pub alert_rate: f64,
}
