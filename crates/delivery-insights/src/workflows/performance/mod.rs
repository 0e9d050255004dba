pub mod domain;
pub mod report;
mod rules;
mod score;
mod stats;

pub use report::{
    alert_recurrence, build_scoreboard, classify_comment, driver_scorecards, AlertRecurrence,
    CarrierAlerts, CarrierScoreboard, CategoryCount, DepotAlerts, DepotScoreboard, DriverAlerts,
    PerformanceScoreboard, FALLBACK_CATEGORY,
};
pub use rules::{
    classify_round, dominant_depot, resolve_carrier, resolve_depot, resolve_hub_kind,
    resolve_round_carrier, round_driver_name, task_driver_name, STORE_DEPOT, UNKNOWN_DRIVER,
};
pub use score::composite_score;
pub use stats::driver_raw_stats;
