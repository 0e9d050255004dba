use crate::infra::default_rule_set;
use chrono::{NaiveDate, NaiveDateTime};
use clap::Args;
use delivery_insights::error::AppError;
use delivery_insights::workflows::performance::domain::{
    DeliveryRound, DeliveryTask, DriverRef, RoundCategory, RuleSet, TaskProgression,
};
use delivery_insights::workflows::performance::report::views::ScoreboardSummary;
use delivery_insights::workflows::performance::{
    alert_recurrence, build_scoreboard, classify_round, resolve_round_carrier, AlertRecurrence,
};
use delivery_insights::workflows::urbantz::UrbantzExport;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Leave per-driver rows out of the scoreboard section
    #[arg(long)]
    pub(crate) summary_only: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreboardReportArgs {
    /// Urbantz task export (CSV) to score
    #[arg(long)]
    pub(crate) tasks_csv: PathBuf,
    /// Optional Urbantz round export for the round mix section
    #[arg(long)]
    pub(crate) rounds_csv: Option<PathBuf>,
    /// Classification rules as JSON; defaults to the built-in network rules
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
    /// Include per-driver rows in the output
    #[arg(long)]
    pub(crate) list_drivers: bool,
    /// Include the alert recurrence breakdown
    #[arg(long)]
    pub(crate) with_alerts: bool,
}

pub(crate) fn run_scoreboard_report(args: ScoreboardReportArgs) -> Result<(), AppError> {
    let ScoreboardReportArgs {
        tasks_csv,
        rounds_csv,
        rules,
        list_drivers,
        with_alerts,
    } = args;

    let tasks = UrbantzExport::tasks_from_path(&tasks_csv)?;
    let rules = load_rules(rules.as_deref())?;

    println!("Performance scoreboard for {}", tasks_csv.display());
    let scoreboard = build_scoreboard(&tasks, &rules);
    render_scoreboard(&scoreboard.summary(list_drivers));

    if let Some(path) = rounds_csv {
        let rounds = UrbantzExport::rounds_from_path(path)?;
        render_round_mix(&rounds, &rules);
    }

    if with_alerts {
        render_alerts(&alert_recurrence(&tasks, &rules));
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let rules = default_rule_set();
    let tasks = fixture_tasks();
    let rounds = fixture_rounds();

    println!("Delivery insights demo (built-in fixture data)");
    let scoreboard = build_scoreboard(&tasks, &rules);
    render_scoreboard(&scoreboard.summary(!args.summary_only));
    render_round_mix(&rounds, &rules);
    render_alerts(&alert_recurrence(&tasks, &rules));

    Ok(())
}

fn load_rules(path: Option<&Path>) -> Result<RuleSet, AppError> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&raw)?)
        }
        None => Ok(default_rule_set()),
    }
}

fn render_scoreboard(summary: &ScoreboardSummary) {
    let network = &summary.network;
    println!("\nNetwork");
    println!(
        "- {} tasks | {} completed | {} rated | score {:.1}",
        network.total_tasks, network.completed_tasks, network.total_ratings, network.score
    );
    println!(
        "- rating {} | punctuality {} | scanbac {} | forced address {} | forced contactless {}",
        fmt_rating(network.average_rating),
        fmt_rate(network.punctuality_rate),
        fmt_rate(network.scanbac_rate),
        fmt_rate(network.forced_address_rate),
        fmt_rate(network.forced_contactless_rate)
    );

    for depot in &summary.depots {
        println!(
            "\nDepot {} | score {:.1} | {} alerts ({}%)",
            depot.depot, depot.stats.score, depot.stats.total_alerts, depot.stats.alert_rate
        );
        for carrier in &depot.carriers {
            println!(
                "  - {} | score {:.1} | rating {} | punctuality {} | {} completed",
                carrier.carrier,
                carrier.stats.score,
                fmt_rating(carrier.stats.average_rating),
                fmt_rate(carrier.stats.punctuality_rate),
                carrier.stats.completed_tasks
            );
            if let Some(drivers) = &carrier.drivers {
                for driver in drivers {
                    println!(
                        "      {} | {} completed | rating {} | score {:.1}",
                        driver.name,
                        driver.completed_tasks,
                        fmt_rating(driver.average_rating),
                        driver.score
                    );
                }
            }
        }
    }
}

fn render_round_mix(rounds: &[DeliveryRound], rules: &RuleSet) {
    println!("\nRound mix ({} rounds)", rounds.len());
    let capacity: f64 = rounds
        .iter()
        .filter_map(|round| round.weight_capacity_kg)
        .sum();
    if capacity > 0.0 {
        println!("- declared capacity: {capacity:.0} kg");
    }
    for category in RoundCategory::ordered() {
        let count = rounds
            .iter()
            .filter(|round| classify_round(round, &rules.forecasts) == category)
            .count();
        if count > 0 {
            println!("- {}: {}", category.label(), count);
        }
    }

    let mut by_carrier: BTreeMap<String, u32> = BTreeMap::new();
    for round in rounds {
        *by_carrier
            .entry(resolve_round_carrier(round, &rules.carriers))
            .or_insert(0) += 1;
    }
    println!("By carrier:");
    for (carrier, count) in by_carrier {
        println!("- {carrier}: {count}");
    }
}

fn render_alerts(alerts: &AlertRecurrence) {
    println!("\nAlert recurrence ({} alerts)", alerts.total_alerts);
    for depot in &alerts.depots {
        println!("- {} ({} alerts)", depot.depot, depot.total_alerts);
        for carrier in &depot.carriers {
            println!("  - {} ({} alerts)", carrier.carrier, carrier.total_alerts);
            for driver in &carrier.drivers {
                println!(
                    "      {} | {} alerts | rating {} over {} ratings",
                    driver.driver,
                    driver.alert_count,
                    fmt_rating(driver.average_rating),
                    driver.total_ratings
                );
                for category in &driver.categories {
                    println!("        {} x{}", category.category, category.count);
                }
            }
        }
    }
}

fn fmt_rate(rate: Option<f64>) -> String {
    rate.map(|value| format!("{value:.1}%"))
        .unwrap_or_else(|| "n/a".to_string())
}

fn fmt_rating(rating: Option<f64>) -> String {
    rating
        .map(|value| format!("{value:.2}/5"))
        .unwrap_or_else(|| "n/a".to_string())
}

fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 2)
        .expect("valid demo date")
        .and_hms_opt(hour, minute, 0)
        .expect("valid demo time")
}

fn demo_task(id: &str, first: &str, last: &str, hub: &str) -> DeliveryTask {
    DeliveryTask {
        id: id.to_string(),
        driver: Some(DriverRef {
            first_name: Some(first.to_string()),
            last_name: Some(last.to_string()),
        }),
        hub: Some(hub.to_string()),
        progression: TaskProgression::Completed,
        window_start: Some(at(8, 0)),
        window_end: Some(at(10, 0)),
        closed_at: Some(at(9, 0)),
        completed_via: Some("mobile".to_string()),
        address_confirmed: Some(true),
        contactless_forced: Some(false),
        ..DeliveryTask::default()
    }
}

/// Three drivers over one morning: a strong Transports Bleus driver out of
/// Aulnay, a struggling Courses Express driver out of Vert-Saint-Denis, and
/// a Logistique Plus driver working a store hub.
fn fixture_tasks() -> Vec<DeliveryTask> {
    let mut tasks = Vec::new();

    let karim_ratings = [Some(5), Some(4), Some(5), None, None];
    for (index, rating) in karim_ratings.into_iter().enumerate() {
        let mut task = demo_task(&format!("karim-{index}"), "Karim", "Benali TB", "Aulnay Nord");
        task.rating = rating;
        tasks.push(task);
    }

    let mut late = demo_task("celine-0", "Celine", "Martin", "VSD 2");
    late.rating = Some(2);
    late.comment = Some("Plus d'une heure de retard".to_string());
    late.closed_at = Some(at(11, 30));
    tasks.push(late);

    let mut damaged = demo_task("celine-1", "Celine", "Martin", "VSD 2");
    damaged.rating = Some(3);
    damaged.comment = Some("Carton écrasé à l'arrivée".to_string());
    damaged.address_confirmed = Some(false);
    tasks.push(damaged);

    let mut clean = demo_task("celine-2", "Celine", "Martin", "VSD 2");
    clean.rating = Some(5);
    tasks.push(clean);

    let mut store_run = demo_task("alpha-0", "Alpha", "Diallo", "Magasin Centre");
    store_run.rating = Some(4);
    store_run.completed_via = Some("dashboard".to_string());
    tasks.push(store_run);

    let mut unrated = demo_task("alpha-1", "Alpha", "Diallo", "Magasin Centre");
    unrated.contactless_forced = Some(true);
    tasks.push(unrated);

    tasks
}

fn fixture_rounds() -> Vec<DeliveryRound> {
    let date = NaiveDate::from_ymd_opt(2026, 3, 2);
    vec![
        DeliveryRound {
            name: "T-07h Aulnay".to_string(),
            date,
            hub: Some("Aulnay Nord".to_string()),
            weight_capacity_kg: Some(650.0),
            carrier_override: None,
            driver: Some(DriverRef {
                first_name: Some("Karim".to_string()),
                last_name: Some("Benali TB".to_string()),
            }),
        },
        DeliveryRound {
            name: "T-18h VSD soir".to_string(),
            date,
            hub: Some("VSD 2".to_string()),
            weight_capacity_kg: Some(800.0),
            carrier_override: Some("Courses Express".to_string()),
            driver: None,
        },
        DeliveryRound {
            name: "Tournée BU Centre".to_string(),
            date,
            hub: Some("Magasin Centre".to_string()),
            weight_capacity_kg: None,
            carrier_override: None,
            driver: None,
        },
        DeliveryRound {
            name: "Tournée 14h".to_string(),
            date,
            hub: Some("Aulnay Nord".to_string()),
            weight_capacity_kg: Some(500.0),
            carrier_override: None,
            driver: None,
        },
    ]
}
