use super::domain::{DeliveryTask, DriverStats};
use chrono::Duration;

/// Scheduled windows without a declared end are assumed to span two hours.
const DEFAULT_WINDOW_MINUTES: i64 = 120;

/// Grace applied on both ends of the scheduled window.
const PUNCTUALITY_GRACE_MINUTES: i64 = 15;

fn percentage(part: u32, whole: u32) -> Option<f64> {
    if whole == 0 {
        None
    } else {
        Some(f64::from(part) / f64::from(whole) * 100.0)
    }
}

fn is_punctual(task: &DeliveryTask) -> Option<bool> {
    let start = task.window_start?;
    let closed_at = task.closed_at?;
    let end = task
        .window_end
        .unwrap_or(start + Duration::minutes(DEFAULT_WINDOW_MINUTES));

    let grace = Duration::minutes(PUNCTUALITY_GRACE_MINUTES);
    Some(closed_at >= start - grace && closed_at <= end + grace)
}

/// Derives a driver's raw metrics from their task list. The composite score
/// is left at zero; [`super::composite_score`] fills it in once the peer
/// group is known.
///
/// Tasks missing the fields a given rate needs simply drop out of that
/// rate's denominator; nothing in here returns an error.
pub fn driver_raw_stats(name: &str, tasks: &[&DeliveryTask]) -> DriverStats {
    let total_tasks = tasks.len() as u32;

    let completed: Vec<&&DeliveryTask> = tasks
        .iter()
        .filter(|task| task.progression.is_completed())
        .collect();
    let completed_tasks = completed.len() as u32;

    let ratings: Vec<f64> = completed
        .iter()
        .filter_map(|task| task.rating)
        .map(f64::from)
        .collect();
    let total_ratings = ratings.len() as u32;
    let average_rating = if ratings.is_empty() {
        None
    } else {
        Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
    };

    let verdicts: Vec<bool> = tasks.iter().filter_map(|task| is_punctual(task)).collect();
    let punctual = verdicts.iter().filter(|on_time| **on_time).count() as u32;
    let punctuality_rate = percentage(punctual, verdicts.len() as u32);

    let mobile_completions = completed
        .iter()
        .filter(|task| {
            task.completed_via
                .as_deref()
                .is_some_and(|via| via.trim().eq_ignore_ascii_case("mobile"))
        })
        .count() as u32;
    let scanbac_rate = percentage(mobile_completions, completed_tasks);

    let forced_address = completed
        .iter()
        .filter(|task| task.address_confirmed == Some(false))
        .count() as u32;
    let forced_address_rate = percentage(forced_address, completed_tasks);

    let forced_contactless = completed
        .iter()
        .filter(|task| task.contactless_forced == Some(true))
        .count() as u32;
    let forced_contactless_rate = percentage(forced_contactless, completed_tasks);

    DriverStats {
        name: name.to_string(),
        total_tasks,
        completed_tasks,
        total_ratings,
        average_rating,
        punctuality_rate,
        scanbac_rate,
        forced_address_rate,
        forced_contactless_rate,
        score: 0.0,
    }
}
