use crate::infra::{default_rule_set, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use delivery_insights::error::AppError;
use delivery_insights::workflows::performance::domain::{
    DeliveryRound, DeliveryTask, RoundCategory, RuleSet,
};
use delivery_insights::workflows::performance::report::views::ScoreboardSummary;
use delivery_insights::workflows::performance::{
    alert_recurrence, build_scoreboard, classify_round, resolve_round_carrier, AlertRecurrence,
};
use delivery_insights::workflows::urbantz::UrbantzExport;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::io::Cursor;

pub(crate) fn router() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route(
            "/api/v1/performance/scoreboard",
            post(scoreboard_endpoint),
        )
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScoreboardRequest {
    /// Tasks supplied inline as JSON. Ignored when a CSV payload is present.
    #[serde(default)]
    pub(crate) tasks: Vec<DeliveryTask>,
    /// Raw Urbantz task export (CSV text).
    #[serde(default)]
    pub(crate) tasks_csv: Option<String>,
    /// Raw Urbantz round export, for the round mix section.
    #[serde(default)]
    pub(crate) rounds_csv: Option<String>,
    /// Classification rules; the built-in network rules apply when absent.
    #[serde(default)]
    pub(crate) rules: Option<RuleSet>,
    #[serde(default)]
    pub(crate) include_drivers: bool,
    #[serde(default)]
    pub(crate) include_alerts: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ScoreboardResponse {
    pub(crate) data_source: ScoreboardDataSource,
    pub(crate) scoreboard: ScoreboardSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) alerts: Option<AlertRecurrence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) round_mix: Option<RoundMixView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ScoreboardDataSource {
    Urbantz,
    Inline,
}

#[derive(Debug, Serialize)]
pub(crate) struct RoundMixView {
    pub(crate) total_rounds: u32,
    pub(crate) categories: Vec<RoundMixEntry>,
    pub(crate) carriers: Vec<RoundCarrierEntry>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RoundMixEntry {
    pub(crate) category: &'static str,
    pub(crate) rounds: u32,
}

#[derive(Debug, Serialize)]
pub(crate) struct RoundCarrierEntry {
    pub(crate) carrier: String,
    pub(crate) rounds: u32,
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn scoreboard_endpoint(
    Json(payload): Json<ScoreboardRequest>,
) -> Result<Json<ScoreboardResponse>, AppError> {
    let ScoreboardRequest {
        tasks,
        tasks_csv,
        rounds_csv,
        rules,
        include_drivers,
        include_alerts,
    } = payload;

    let (tasks, data_source) = if let Some(csv) = tasks_csv {
        let reader = Cursor::new(csv.into_bytes());
        (
            UrbantzExport::tasks_from_reader(reader)?,
            ScoreboardDataSource::Urbantz,
        )
    } else {
        (tasks, ScoreboardDataSource::Inline)
    };

    let rules = rules.unwrap_or_else(default_rule_set);
    let scoreboard = build_scoreboard(&tasks, &rules).summary(include_drivers);
    let alerts = if include_alerts {
        Some(alert_recurrence(&tasks, &rules))
    } else {
        None
    };

    let round_mix = match rounds_csv {
        Some(csv) => {
            let reader = Cursor::new(csv.into_bytes());
            let rounds = UrbantzExport::rounds_from_reader(reader)?;
            Some(round_mix(&rounds, &rules))
        }
        None => None,
    };

    Ok(Json(ScoreboardResponse {
        data_source,
        scoreboard,
        alerts,
        round_mix,
    }))
}

fn round_mix(rounds: &[DeliveryRound], rules: &RuleSet) -> RoundMixView {
    let mut by_category: BTreeMap<&'static str, u32> = BTreeMap::new();
    let mut by_carrier: BTreeMap<String, u32> = BTreeMap::new();
    for round in rounds {
        let category = classify_round(round, &rules.forecasts);
        *by_category.entry(category.label()).or_insert(0) += 1;
        *by_carrier
            .entry(resolve_round_carrier(round, &rules.carriers))
            .or_insert(0) += 1;
    }

    let categories = RoundCategory::ordered()
        .into_iter()
        .filter_map(|category| {
            by_category.get(category.label()).map(|rounds| RoundMixEntry {
                category: category.label(),
                rounds: *rounds,
            })
        })
        .collect();

    let carriers = by_carrier
        .into_iter()
        .map(|(carrier, rounds)| RoundCarrierEntry { carrier, rounds })
        .collect();

    RoundMixView {
        total_rounds: rounds.len() as u32,
        categories,
        carriers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delivery_insights::workflows::performance::domain::{DriverRef, TaskProgression};

    fn inline_task(id: &str, first: &str, last: &str, rating: Option<u8>) -> DeliveryTask {
        DeliveryTask {
            id: id.to_string(),
            driver: Some(DriverRef {
                first_name: Some(first.to_string()),
                last_name: Some(last.to_string()),
            }),
            hub: Some("Aulnay Nord".to_string()),
            progression: TaskProgression::Completed,
            rating,
            completed_via: Some("mobile".to_string()),
            ..DeliveryTask::default()
        }
    }

    fn request() -> ScoreboardRequest {
        ScoreboardRequest {
            tasks: Vec::new(),
            tasks_csv: None,
            rounds_csv: None,
            rules: None,
            include_drivers: false,
            include_alerts: false,
        }
    }

    #[tokio::test]
    async fn scoreboard_endpoint_scores_inline_tasks() {
        let mut payload = request();
        payload.tasks = vec![
            inline_task("t-1", "Karim", "Benali TB", Some(5)),
            inline_task("t-2", "Karim", "Benali TB", Some(2)),
        ];

        let Json(body) = scoreboard_endpoint(Json(payload))
            .await
            .expect("scoreboard builds");

        assert_eq!(body.data_source, ScoreboardDataSource::Inline);
        assert_eq!(body.scoreboard.network.total_tasks, 2);
        assert_eq!(body.scoreboard.network.total_alerts, 1);
        assert!(body.alerts.is_none());
        assert!(body.round_mix.is_none());

        let depot = &body.scoreboard.depots[0];
        assert_eq!(depot.depot, "Aulnay-sous-Bois");
        assert_eq!(depot.carriers[0].carrier, "Transports Bleus");
        assert!(depot.carriers[0].drivers.is_none());
    }

    #[tokio::test]
    async fn scoreboard_endpoint_hydrates_from_urbantz_csv() {
        let mut payload = request();
        payload.include_drivers = true;
        payload.include_alerts = true;
        payload.tasks_csv = Some(
            "Task ID,Driver First Name,Driver Last Name,Hub,Progress,Rating,Comment,Window Start,Window End,Closed At,Completed Via,Address Confirmed,Contactless Forced\n\
t-1,Karim,Benali TB,Aulnay Nord,COMPLETED,2,Encore en retard,2026-03-02 08:00,2026-03-02 10:00,2026-03-02 09:00,mobile,true,false\n"
                .to_string(),
        );

        let Json(body) = scoreboard_endpoint(Json(payload))
            .await
            .expect("scoreboard builds");

        assert_eq!(body.data_source, ScoreboardDataSource::Urbantz);
        let drivers = body.scoreboard.depots[0].carriers[0]
            .drivers
            .as_ref()
            .expect("driver entries requested");
        assert_eq!(drivers[0].name, "Karim Benali TB");

        let alerts = body.alerts.expect("alert recurrence requested");
        assert_eq!(alerts.total_alerts, 1);
        let driver = &alerts.depots[0].carriers[0].drivers[0];
        assert_eq!(driver.categories[0].category, "Livraison en retard");
    }

    #[tokio::test]
    async fn scoreboard_endpoint_summarizes_round_exports() {
        let mut payload = request();
        payload.rounds_csv = Some(
            "Round Name,Date,Hub,Max Weight (kg),Carrier,Driver First Name,Driver Last Name\n\
T-07h Aulnay,2026-03-02,Aulnay Nord,650,,Karim,Benali TB\n\
Tournée BU Centre,2026-03-02,Magasin Centre,,Courses Express,,\n\
Tournée 14h,2026-03-02,Aulnay Nord,,,,\n"
                .to_string(),
        );

        let Json(body) = scoreboard_endpoint(Json(payload))
            .await
            .expect("scoreboard builds");

        let mix = body.round_mix.expect("round mix requested");
        assert_eq!(mix.total_rounds, 3);

        let categories: Vec<(&str, u32)> = mix
            .categories
            .iter()
            .map(|entry| (entry.category, entry.rounds))
            .collect();
        assert_eq!(categories, [("Matin", 1), ("BU", 1), ("Classique", 1)]);

        assert!(mix
            .carriers
            .iter()
            .any(|entry| entry.carrier == "Courses Express" && entry.rounds == 1));
        assert!(mix
            .carriers
            .iter()
            .any(|entry| entry.carrier == "Transports Bleus" && entry.rounds == 1));
    }
}
