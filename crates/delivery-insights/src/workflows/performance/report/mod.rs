mod alerts;
mod scoreboard;
pub mod views;

pub use alerts::{
    alert_recurrence, classify_comment, AlertRecurrence, CarrierAlerts, CategoryCount, DepotAlerts,
    DriverAlerts, FALLBACK_CATEGORY,
};
pub use scoreboard::{
    build_scoreboard, driver_scorecards, CarrierScoreboard, DepotScoreboard, PerformanceScoreboard,
};
