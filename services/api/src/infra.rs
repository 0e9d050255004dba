use delivery_insights::workflows::performance::domain::{
    CarrierMatch, CarrierRule, DepotRule, ForecastKind, ForecastRule, HubKind, RoundCategory,
    RuleSet,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Built-in classification rules for the French delivery network. Callers
/// that manage their own rules pass them in the request instead.
pub(crate) fn default_rule_set() -> RuleSet {
    RuleSet {
        depots: vec![
            depot_rule("Aulnay-sous-Bois", HubKind::Warehouse, &["aulnay", "aul"]),
            depot_rule("Vert-Saint-Denis", HubKind::Warehouse, &["vert-saint-denis", "vsd"]),
            depot_rule("Magasins", HubKind::Store, &["mag", "drive"]),
        ],
        carriers: vec![
            carrier_rule("Transports Bleus", CarrierMatch::Suffix, "tb", 10),
            carrier_rule("Courses Express", CarrierMatch::Prefix, "ce", 20),
            carrier_rule("Logistique Plus", CarrierMatch::Contains, "lp", 30),
        ],
        forecasts: vec![
            forecast_rule(
                "Tournées du matin",
                ForecastKind::Time,
                &["matin", "07h", "08h"],
                RoundCategory::Matin,
            ),
            forecast_rule(
                "Tournées du soir",
                ForecastKind::Time,
                &["soir", "18h", "19h"],
                RoundCategory::Soir,
            ),
            forecast_rule("Tournées BU", ForecastKind::RoundType, &["bu"], RoundCategory::Bu),
        ],
    }
}

fn depot_rule(depot: &str, kind: HubKind, prefixes: &[&str]) -> DepotRule {
    DepotRule {
        depot: depot.to_string(),
        kind,
        prefixes: prefixes.iter().map(|prefix| prefix.to_string()).collect(),
        active: true,
    }
}

fn carrier_rule(carrier: &str, matcher: CarrierMatch, value: &str, priority: i32) -> CarrierRule {
    CarrierRule {
        carrier: carrier.to_string(),
        matcher,
        value: value.to_string(),
        priority,
        active: true,
    }
}

fn forecast_rule(
    name: &str,
    kind: ForecastKind,
    keywords: &[&str],
    category: RoundCategory,
) -> ForecastRule {
    ForecastRule {
        name: name.to_string(),
        kind,
        keywords: keywords.iter().map(|keyword| keyword.to_string()).collect(),
        category,
        active: true,
    }
}
