use super::domain::DriverStats;

const RATING_WEIGHT: f64 = 3.0;
const PUNCTUALITY_WEIGHT: f64 = 2.0;
const SCANBAC_WEIGHT: f64 = 1.0;
const FORCED_ADDRESS_WEIGHT: f64 = 1.0;
const FORCED_CONTACTLESS_WEIGHT: f64 = 1.0;
const TOTAL_WEIGHT: f64 =
    RATING_WEIGHT + PUNCTUALITY_WEIGHT + SCANBAC_WEIGHT + FORCED_ADDRESS_WEIGHT + FORCED_CONTACTLESS_WEIGHT;

/// Drivers below this completed-task volume are proportionally discounted.
const VOLUME_CONFIDENCE_CAP: f64 = 50.0;

/// Blends a driver's raw rates into one bounded score. A driver needs both
/// activity and feedback to be scored at all: no completed task or no rating
/// means zero. Forced-override rates are inverted since lower is better.
///
/// The peer maximum is part of the call contract but the volume ramp runs on
/// the fixed cap, so the argument stays unused.
pub fn composite_score(stats: &DriverStats, _peer_max_completed: u32) -> f64 {
    if stats.completed_tasks < 1 || stats.total_ratings < 1 {
        return 0.0;
    }

    let rating_term = stats.average_rating.unwrap_or(0.0) / 5.0 * 100.0 * RATING_WEIGHT;
    let punctuality_term = stats.punctuality_rate.unwrap_or(0.0) * PUNCTUALITY_WEIGHT;
    let scanbac_term = stats.scanbac_rate.unwrap_or(0.0) * SCANBAC_WEIGHT;
    let address_term = (100.0 - stats.forced_address_rate.unwrap_or(0.0)) * FORCED_ADDRESS_WEIGHT;
    let contactless_term =
        (100.0 - stats.forced_contactless_rate.unwrap_or(0.0)) * FORCED_CONTACTLESS_WEIGHT;

    let quality =
        (rating_term + punctuality_term + scanbac_term + address_term + contactless_term) / TOTAL_WEIGHT;
    let volume_weight = f64::from(stats.completed_tasks).min(VOLUME_CONFIDENCE_CAP) / VOLUME_CONFIDENCE_CAP;

    (quality * volume_weight).clamp(0.0, 100.0)
}
