use super::super::domain::{AggregateStats, DriverStats};
use super::scoreboard::{CarrierScoreboard, DepotScoreboard, PerformanceScoreboard};
use serde::Serialize;

/// Aggregate rates rounded for display. Ratings keep two decimals, the
/// percentage rates and score one.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateView {
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

#[derive(Debug, Clone, Serialize)]
pub struct DriverEntry {
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

#[derive(Debug, Clone, Serialize)]
pub struct CarrierEntry {
    pub carrier: String,
    pub stats: AggregateView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drivers: Option<Vec<DriverEntry>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DepotEntry {
    pub depot: String,
    pub stats: AggregateView,
    pub carriers: Vec<CarrierEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreboardSummary {
    pub network: AggregateView,
    pub depots: Vec<DepotEntry>,
}

impl PerformanceScoreboard {
    pub fn summary(&self, include_drivers: bool) -> ScoreboardSummary {
        ScoreboardSummary {
            network: aggregate_view(&self.network),
            depots: self
                .depots
                .iter()
                .map(|depot| depot_entry(depot, include_drivers))
                .collect(),
        }
    }
}

fn depot_entry(depot: &DepotScoreboard, include_drivers: bool) -> DepotEntry {
    DepotEntry {
        depot: depot.depot.clone(),
        stats: aggregate_view(&depot.stats),
        carriers: depot
            .carriers
            .iter()
            .map(|carrier| carrier_entry(carrier, include_drivers))
            .collect(),
    }
}

fn carrier_entry(carrier: &CarrierScoreboard, include_drivers: bool) -> CarrierEntry {
    CarrierEntry {
        carrier: carrier.carrier.clone(),
        stats: aggregate_view(&carrier.stats),
        drivers: include_drivers
            .then(|| carrier.drivers.iter().map(driver_entry).collect()),
    }
}

fn driver_entry(stats: &DriverStats) -> DriverEntry {
    DriverEntry {
        name: stats.name.clone(),
        total_tasks: stats.total_tasks,
        completed_tasks: stats.completed_tasks,
        total_ratings: stats.total_ratings,
        average_rating: stats.average_rating.map(round2),
        punctuality_rate: stats.punctuality_rate.map(round1),
        scanbac_rate: stats.scanbac_rate.map(round1),
        forced_address_rate: stats.forced_address_rate.map(round1),
        forced_contactless_rate: stats.forced_contactless_rate.map(round1),
        score: round1(stats.score),
    }
}

fn aggregate_view(stats: &AggregateStats) -> AggregateView {
    AggregateView {
        total_tasks: stats.total_tasks,
        completed_tasks: stats.completed_tasks,
        total_ratings: stats.total_ratings,
        average_rating: stats.average_rating.map(round2),
        punctuality_rate: stats.punctuality_rate.map(round1),
        scanbac_rate: stats.scanbac_rate.map(round1),
        forced_address_rate: stats.forced_address_rate.map(round1),
        forced_contactless_rate: stats.forced_contactless_rate.map(round1),
        score: round1(stats.score),
        total_alerts: stats.total_alerts,
        alert_rate: round1(stats.alert_rate),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
