use super::super::domain::{AggregateStats, DeliveryTask, DriverStats, RuleSet};
use super::super::rules::{dominant_depot, resolve_carrier, task_driver_name};
use super::super::score::composite_score;
use super::super::stats::driver_raw_stats;
use super::alerts::is_alert;
use serde::Serialize;
use std::collections::BTreeMap;

/// The full carrier → depot → network rollup for one batch of tasks.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceScoreboard {
    pub network: AggregateStats,
    pub depots: Vec<DepotScoreboard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DepotScoreboard {
    pub depot: String,
    pub stats: AggregateStats,
    pub carriers: Vec<CarrierScoreboard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CarrierScoreboard {
    pub carrier: String,
    pub stats: AggregateStats,
    pub drivers: Vec<DriverStats>,
}

/// One level's input to the weighted rollup. Drivers and lower aggregates
/// both reduce to this shape.
struct RollupChild {
    total_tasks: u32,
    completed_tasks: u32,
    total_ratings: u32,
    average_rating: Option<f64>,
    punctuality_rate: Option<f64>,
    scanbac_rate: Option<f64>,
    forced_address_rate: Option<f64>,
    forced_contactless_rate: Option<f64>,
    score: f64,
    total_alerts: u32,
}

impl RollupChild {
    fn from_driver(stats: &DriverStats, alerts: u32) -> Self {
        Self {
            total_tasks: stats.total_tasks,
            completed_tasks: stats.completed_tasks,
            total_ratings: stats.total_ratings,
            average_rating: stats.average_rating,
            punctuality_rate: stats.punctuality_rate,
            scanbac_rate: stats.scanbac_rate,
            forced_address_rate: stats.forced_address_rate,
            forced_contactless_rate: stats.forced_contactless_rate,
            score: stats.score,
            total_alerts: alerts,
        }
    }

    fn from_aggregate(stats: &AggregateStats) -> Self {
        Self {
            total_tasks: stats.total_tasks,
            completed_tasks: stats.completed_tasks,
            total_ratings: stats.total_ratings,
            average_rating: stats.average_rating,
            punctuality_rate: stats.punctuality_rate,
            scanbac_rate: stats.scanbac_rate,
            forced_address_rate: stats.forced_address_rate,
            forced_contactless_rate: stats.forced_contactless_rate,
            score: stats.score,
            total_alerts: stats.total_alerts,
        }
    }
}

/// Average of child rates, each weighted by that child's own denominator.
/// Children without a value for the rate contribute no weight at all, so an
/// empty child never drags the average toward zero.
fn weighted_rate<R, W>(children: &[RollupChild], rate: R, weight: W) -> Option<f64>
where
    R: Fn(&RollupChild) -> Option<f64>,
    W: Fn(&RollupChild) -> u32,
{
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;
    for child in children {
        if let Some(value) = rate(child) {
            let w = f64::from(weight(child));
            weighted_sum += value * w;
            total_weight += w;
        }
    }

    if total_weight == 0.0 {
        None
    } else {
        Some(weighted_sum / total_weight)
    }
}

fn rollup(children: &[RollupChild]) -> AggregateStats {
    let total_ratings: u32 = children.iter().map(|child| child.total_ratings).sum();
    let total_alerts: u32 = children.iter().map(|child| child.total_alerts).sum();

    // The composite score stays a plain mean so a low-volume carrier is not
    // swamped by its bigger siblings.
    let score = if children.is_empty() {
        0.0
    } else {
        children.iter().map(|child| child.score).sum::<f64>() / children.len() as f64
    };

    let alert_rate = if total_ratings == 0 {
        0.0
    } else {
        f64::from(total_alerts) / f64::from(total_ratings) * 100.0
    };

    AggregateStats {
        total_tasks: children.iter().map(|child| child.total_tasks).sum(),
        completed_tasks: children.iter().map(|child| child.completed_tasks).sum(),
        total_ratings,
        average_rating: weighted_rate(children, |c| c.average_rating, |c| c.total_ratings),
        punctuality_rate: weighted_rate(children, |c| c.punctuality_rate, |c| c.completed_tasks),
        scanbac_rate: weighted_rate(children, |c| c.scanbac_rate, |c| c.completed_tasks),
        forced_address_rate: weighted_rate(children, |c| c.forced_address_rate, |c| c.completed_tasks),
        forced_contactless_rate: weighted_rate(
            children,
            |c| c.forced_contactless_rate,
            |c| c.completed_tasks,
        ),
        score,
        total_alerts,
        alert_rate,
    }
}

fn tasks_by_driver(tasks: &[DeliveryTask]) -> BTreeMap<String, Vec<&DeliveryTask>> {
    let mut groups: BTreeMap<String, Vec<&DeliveryTask>> = BTreeMap::new();
    for task in tasks {
        groups.entry(task_driver_name(task)).or_default().push(task);
    }
    groups
}

fn alert_count(tasks: &[&DeliveryTask]) -> u32 {
    tasks.iter().filter(|task| is_alert(task)).count() as u32
}

/// Per-driver scorecards for a batch of tasks, in driver-name order. Every
/// driver is scored against the batch's own peer maximum.
pub fn driver_scorecards(tasks: &[DeliveryTask]) -> Vec<DriverStats> {
    let groups = tasks_by_driver(tasks);
    let mut cards: Vec<DriverStats> = groups
        .iter()
        .map(|(name, driver_tasks)| driver_raw_stats(name, driver_tasks))
        .collect();

    let peer_max = cards.iter().map(|card| card.completed_tasks).max().unwrap_or(0);
    for card in &mut cards {
        card.score = composite_score(card, peer_max);
    }
    cards
}

/// Builds the full scoreboard: drivers grouped under the carrier their name
/// resolves to and the depot their tasks most often come from, with every
/// rate recomputed as a weighted average at each level. The whole tree is
/// derived from the task batch and rule set on every call.
pub fn build_scoreboard(tasks: &[DeliveryTask], rules: &RuleSet) -> PerformanceScoreboard {
    struct DriverRollup {
        stats: DriverStats,
        alerts: u32,
    }

    let groups = tasks_by_driver(tasks);

    let mut classified: Vec<(String, String, DriverRollup)> = groups
        .iter()
        .map(|(name, driver_tasks)| {
            let stats = driver_raw_stats(name, driver_tasks);
            let depot = dominant_depot(driver_tasks, &rules.depots);
            let carrier = resolve_carrier(name, &rules.carriers);
            let alerts = alert_count(driver_tasks);
            (depot, carrier, DriverRollup { stats, alerts })
        })
        .collect();

    let peer_max = classified
        .iter()
        .map(|(_, _, driver)| driver.stats.completed_tasks)
        .max()
        .unwrap_or(0);
    for (_, _, driver) in &mut classified {
        driver.stats.score = composite_score(&driver.stats, peer_max);
    }

    let mut tree: BTreeMap<String, BTreeMap<String, Vec<DriverRollup>>> = BTreeMap::new();
    for (depot, carrier, driver) in classified {
        tree.entry(depot)
            .or_default()
            .entry(carrier)
            .or_default()
            .push(driver);
    }

    let mut depots = Vec::with_capacity(tree.len());
    for (depot, by_carrier) in tree {
        let mut carriers = Vec::with_capacity(by_carrier.len());
        for (carrier, drivers) in by_carrier {
            let children: Vec<RollupChild> = drivers
                .iter()
                .map(|driver| RollupChild::from_driver(&driver.stats, driver.alerts))
                .collect();
            carriers.push(CarrierScoreboard {
                carrier,
                stats: rollup(&children),
                drivers: drivers.into_iter().map(|driver| driver.stats).collect(),
            });
        }

        let children: Vec<RollupChild> = carriers
            .iter()
            .map(|carrier| RollupChild::from_aggregate(&carrier.stats))
            .collect();
        depots.push(DepotScoreboard {
            depot,
            stats: rollup(&children),
            carriers,
        });
    }

    let children: Vec<RollupChild> = depots
        .iter()
        .map(|depot| RollupChild::from_aggregate(&depot.stats))
        .collect();

    PerformanceScoreboard {
        network: rollup(&children),
        depots,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn child(
        completed: u32,
        ratings: u32,
        rating: Option<f64>,
        punctuality: Option<f64>,
        score: f64,
    ) -> RollupChild {
        RollupChild {
            total_tasks: completed,
            completed_tasks: completed,
            total_ratings: ratings,
            average_rating: rating,
            punctuality_rate: punctuality,
            scanbac_rate: None,
            forced_address_rate: None,
            forced_contactless_rate: None,
            score,
            total_alerts: 0,
        }
    }

    #[test]
    fn single_child_rollup_reproduces_the_child() {
        let children = vec![child(10, 5, Some(4.4), Some(90.0), 18.6)];
        let stats = rollup(&children);

        assert_eq!(stats.average_rating, Some(4.4));
        assert_eq!(stats.punctuality_rate, Some(90.0));
        assert!((stats.score - 18.6).abs() < 1e-9);
    }

    #[test]
    fn children_without_data_carry_no_weight() {
        let children = vec![
            child(20, 4, Some(4.0), Some(80.0), 40.0),
            child(30, 0, None, None, 0.0),
        ];
        let stats = rollup(&children);

        // The second child has no ratings and no punctuality verdicts, so the
        // first child's rates survive untouched.
        assert_eq!(stats.average_rating, Some(4.0));
        assert_eq!(stats.punctuality_rate, Some(80.0));
        assert_eq!(stats.total_ratings, 4);
    }

    #[test]
    fn rates_are_weighted_but_score_is_a_plain_mean() {
        let children = vec![
            child(10, 10, Some(5.0), Some(100.0), 80.0),
            child(30, 30, Some(3.0), Some(60.0), 20.0),
        ];
        let stats = rollup(&children);

        let rating = stats.average_rating.expect("ratings present");
        assert!((rating - 3.5).abs() < 1e-9);
        let punctuality = stats.punctuality_rate.expect("verdicts present");
        assert!((punctuality - 70.0).abs() < 1e-9);
        assert!((stats.score - 50.0).abs() < 1e-9);
    }

    #[test]
    fn alert_rate_follows_ratings_volume() {
        let mut flagged = child(10, 8, Some(3.0), None, 10.0);
        flagged.total_alerts = 2;
        let stats = rollup(&[flagged]);

        assert_eq!(stats.total_alerts, 2);
        assert!((stats.alert_rate - 25.0).abs() < 1e-9);

        let silent = rollup(&[child(10, 0, None, None, 0.0)]);
        assert_eq!(silent.alert_rate, 0.0);
    }
}
