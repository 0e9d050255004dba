use super::super::domain::{DeliveryTask, RuleSet};
use super::super::rules::{dominant_depot, resolve_carrier, task_driver_name};
use super::super::stats::driver_raw_stats;
use serde::Serialize;
use std::collections::BTreeMap;

/// Category for alert comments that match no keyword list.
pub const FALLBACK_CATEGORY: &str = "Autre";

/// Ordered verbatim-triage table. The first category with a keyword contained
/// in the lowercased comment wins, so broader buckets belong further down.
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Livraison en retard",
        &["retard", "trop tard", "attendu", "jamais arrivé à l'heure"],
    ),
    ("Livraison en avance", &["en avance", "trop tôt"]),
    (
        "Colis endommagé",
        &["endommagé", "abîmé", "abimé", "cassé", "écrasé", "renversé"],
    ),
    (
        "Colis manquant",
        &["manquant", "pas reçu", "jamais reçu", "non livré", "incomplet"],
    ),
    (
        "Chaîne du froid",
        &["décongelé", "surgelé", "température", "chaud", "froid"],
    ),
    (
        "Comportement du livreur",
        &["impoli", "désagréable", "agressif", "comportement", "pas aimable"],
    ),
    (
        "Adresse non respectée",
        &["mauvaise adresse", "chez le voisin", "devant la porte", "pas sonné"],
    ),
];

/// A task counts as an alert when it completed with a rating below 4.
pub(super) fn is_alert(task: &DeliveryTask) -> bool {
    task.progression.is_completed() && task.rating.is_some_and(|rating| rating < 4)
}

/// Buckets an alert comment into one triage category. Comments are matched
/// case-insensitively; an absent or unmatched comment lands in
/// [`FALLBACK_CATEGORY`].
pub fn classify_comment(comment: Option<&str>) -> &'static str {
    let Some(comment) = comment else {
        return FALLBACK_CATEGORY;
    };
    let haystack = comment.to_lowercase();

    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| haystack.contains(keyword)))
        .map(|(category, _)| *category)
        .unwrap_or(FALLBACK_CATEGORY)
}

/// Low-rating recurrence, depot → carrier → driver.
#[derive(Debug, Clone, Serialize)]
pub struct AlertRecurrence {
    pub total_alerts: u32,
    pub depots: Vec<DepotAlerts>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DepotAlerts {
    pub depot: String,
    pub total_alerts: u32,
    pub carriers: Vec<CarrierAlerts>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CarrierAlerts {
    pub carrier: String,
    pub total_alerts: u32,
    pub drivers: Vec<DriverAlerts>,
}

/// One driver's alert bucket. Rating context comes from the driver's full
/// task set, not just the alerting tasks.
#[derive(Debug, Clone, Serialize)]
pub struct DriverAlerts {
    pub driver: String,
    pub alert_count: u32,
    pub total_ratings: u32,
    pub average_rating: Option<f64>,
    pub categories: Vec<CategoryCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    pub category: &'static str,
    pub count: u32,
}

/// Groups every alerting task by (depot, carrier, driver) and classifies each
/// alert's comment. Drivers without a single alert are left out entirely.
pub fn alert_recurrence(tasks: &[DeliveryTask], rules: &RuleSet) -> AlertRecurrence {
    let mut by_driver: BTreeMap<String, Vec<&DeliveryTask>> = BTreeMap::new();
    for task in tasks {
        by_driver.entry(task_driver_name(task)).or_default().push(task);
    }

    let mut tree: BTreeMap<String, BTreeMap<String, Vec<DriverAlerts>>> = BTreeMap::new();
    for (name, driver_tasks) in &by_driver {
        let alerting: Vec<&&DeliveryTask> =
            driver_tasks.iter().filter(|task| is_alert(task)).collect();
        if alerting.is_empty() {
            continue;
        }

        let mut counts: BTreeMap<&'static str, u32> = BTreeMap::new();
        for task in &alerting {
            *counts.entry(classify_comment(task.comment.as_deref())).or_insert(0) += 1;
        }
        // Emit categories in triage-table order, fallback bucket last.
        let categories: Vec<CategoryCount> = CATEGORY_KEYWORDS
            .iter()
            .map(|(category, _)| *category)
            .chain(std::iter::once(FALLBACK_CATEGORY))
            .filter_map(|category| {
                counts
                    .get(category)
                    .map(|count| CategoryCount { category, count: *count })
            })
            .collect();

        let stats = driver_raw_stats(name, driver_tasks);
        let depot = dominant_depot(driver_tasks, &rules.depots);
        let carrier = resolve_carrier(name, &rules.carriers);

        tree.entry(depot).or_default().entry(carrier).or_default().push(DriverAlerts {
            driver: name.clone(),
            alert_count: alerting.len() as u32,
            total_ratings: stats.total_ratings,
            average_rating: stats.average_rating,
            categories,
        });
    }

    let mut total_alerts = 0;
    let mut depots = Vec::with_capacity(tree.len());
    for (depot, by_carrier) in tree {
        let mut carriers = Vec::with_capacity(by_carrier.len());
        for (carrier, drivers) in by_carrier {
            let carrier_total = drivers.iter().map(|driver| driver.alert_count).sum();
            carriers.push(CarrierAlerts {
                carrier,
                total_alerts: carrier_total,
                drivers,
            });
        }
        let depot_total = carriers.iter().map(|carrier| carrier.total_alerts).sum();
        total_alerts += depot_total;
        depots.push(DepotAlerts {
            depot,
            total_alerts: depot_total,
            carriers,
        });
    }

    AlertRecurrence { total_alerts, depots }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::performance::domain::TaskProgression;

    #[test]
    fn late_comments_classify_as_late_delivery() {
        assert_eq!(
            classify_comment(Some("Le livreur est arrivé en retard")),
            "Livraison en retard"
        );
        assert_eq!(classify_comment(Some("RETARD inadmissible")), "Livraison en retard");
    }

    #[test]
    fn unmatched_or_missing_comments_fall_back() {
        assert_eq!(classify_comment(Some("Rien à signaler")), FALLBACK_CATEGORY);
        assert_eq!(classify_comment(None), FALLBACK_CATEGORY);
    }

    #[test]
    fn first_matching_category_wins() {
        // Mentions both a delay and a damaged parcel; the delay bucket is
        // earlier in the table.
        assert_eq!(
            classify_comment(Some("colis cassé et en retard")),
            "Livraison en retard"
        );
    }

    #[test]
    fn only_low_rated_completed_tasks_alert() {
        let mut task = DeliveryTask {
            id: "t-1".to_string(),
            progression: TaskProgression::Completed,
            rating: Some(3),
            ..DeliveryTask::default()
        };
        assert!(is_alert(&task));

        task.rating = Some(4);
        assert!(!is_alert(&task));

        task.rating = Some(2);
        task.progression = TaskProgression::Ongoing;
        assert!(!is_alert(&task));

        task.progression = TaskProgression::Completed;
        task.rating = None;
        assert!(!is_alert(&task));
    }
}
