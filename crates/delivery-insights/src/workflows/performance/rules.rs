use super::domain::{
    CarrierMatch, CarrierRule, DeliveryRound, DeliveryTask, DepotRule, DriverRef, ForecastRule,
    HubKind, RoundCategory,
};

/// Sentinel for drivers whose name cannot be resolved from the record.
pub const UNKNOWN_DRIVER: &str = "Unknown";

/// Sentinel depot for hubs that are stores or match no warehouse rule.
pub const STORE_DEPOT: &str = "Store";

fn driver_ref_name(driver: Option<&DriverRef>) -> Option<String> {
    let driver = driver?;
    joined_name(driver.first_name.as_deref(), driver.last_name.as_deref())
}

fn joined_name(first: Option<&str>, last: Option<&str>) -> Option<String> {
    let parts: Vec<&str> = [first, last]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

/// Resolves the display name for a task's driver. The nested driver object
/// wins; the flat legacy fields are the fallback; a record with neither
/// resolves to [`UNKNOWN_DRIVER`]. Missing data never raises.
pub fn task_driver_name(task: &DeliveryTask) -> String {
    driver_ref_name(task.driver.as_ref())
        .or_else(|| {
            joined_name(
                task.driver_first_name.as_deref(),
                task.driver_last_name.as_deref(),
            )
        })
        .unwrap_or_else(|| UNKNOWN_DRIVER.to_string())
}

pub fn round_driver_name(round: &DeliveryRound) -> String {
    driver_ref_name(round.driver.as_ref()).unwrap_or_else(|| UNKNOWN_DRIVER.to_string())
}

fn matching_depot_rule<'a>(hub: Option<&str>, rules: &'a [DepotRule]) -> Option<&'a DepotRule> {
    let hub = hub?.trim().to_lowercase();
    if hub.is_empty() {
        return None;
    }

    rules.iter().filter(|rule| rule.active).find(|rule| {
        rule.prefixes.iter().any(|prefix| {
            let prefix = prefix.trim().to_lowercase();
            !prefix.is_empty() && hub.starts_with(&prefix)
        })
    })
}

/// First active rule whose prefix matches the lowercased hub name wins, in
/// supplied rule order. Hubs without a match count as stores.
pub fn resolve_hub_kind(hub: Option<&str>, rules: &[DepotRule]) -> HubKind {
    matching_depot_rule(hub, rules)
        .map(|rule| rule.kind)
        .unwrap_or(HubKind::Store)
}

/// Same cascade as [`resolve_hub_kind`]; only warehouse rules carry a depot
/// name, everything else folds into the [`STORE_DEPOT`] bucket.
pub fn resolve_depot(hub: Option<&str>, rules: &[DepotRule]) -> String {
    match matching_depot_rule(hub, rules) {
        Some(rule) if rule.kind == HubKind::Warehouse => rule.depot.clone(),
        _ => STORE_DEPOT.to_string(),
    }
}

/// A driver's depot is the one their tasks most often resolve to. Ties keep
/// the depot seen first in task order so repeated runs agree.
pub fn dominant_depot(tasks: &[&DeliveryTask], rules: &[DepotRule]) -> String {
    let mut counts: Vec<(String, u32)> = Vec::new();
    for task in tasks {
        let depot = resolve_depot(task.hub.as_deref(), rules);
        match counts.iter_mut().find(|(name, _)| *name == depot) {
            Some((_, count)) => *count += 1,
            None => counts.push((depot, 1)),
        }
    }

    counts
        .into_iter()
        .max_by_key(|(_, count)| *count)
        .map(|(depot, _)| depot)
        .unwrap_or_else(|| STORE_DEPOT.to_string())
}

pub(crate) fn normalize_match_key(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Attributes a driver to a carrier by matching the normalized name against
/// the active rules, lowest priority number first. The lowest priority wins
/// regardless of how specific the competing match types are, so precedence
/// stays configurable instead of hardcoded. No match resolves to
/// [`UNKNOWN_DRIVER`].
pub fn resolve_carrier(driver_name: &str, rules: &[CarrierRule]) -> String {
    let trimmed = driver_name.trim();
    if trimmed.is_empty() || trimmed == UNKNOWN_DRIVER {
        return UNKNOWN_DRIVER.to_string();
    }

    let key = normalize_match_key(trimmed);
    let mut active: Vec<&CarrierRule> = rules.iter().filter(|rule| rule.active).collect();
    active.sort_by_key(|rule| rule.priority);

    for rule in active {
        let value = normalize_match_key(&rule.value);
        if value.is_empty() {
            continue;
        }

        let hit = match rule.matcher {
            CarrierMatch::Suffix => key.ends_with(&value),
            CarrierMatch::Prefix => key.starts_with(&value),
            CarrierMatch::Contains => key.contains(&value),
        };
        if hit {
            return rule.carrier.clone();
        }
    }

    UNKNOWN_DRIVER.to_string()
}

/// Carrier resolution for a round: a non-empty manual override always wins,
/// otherwise the round's driver name goes through the rule cascade.
pub fn resolve_round_carrier(round: &DeliveryRound, rules: &[CarrierRule]) -> String {
    if let Some(carrier) = round.carrier_override.as_deref() {
        let carrier = carrier.trim();
        if !carrier.is_empty() {
            return carrier.to_string();
        }
    }

    resolve_carrier(&round_driver_name(round), rules)
}

/// First active forecast rule with a keyword contained in the lowercased
/// round name wins, in supplied rule order; unmatched rounds are `Classique`.
pub fn classify_round(round: &DeliveryRound, rules: &[ForecastRule]) -> RoundCategory {
    let name = round.name.to_lowercase();

    rules
        .iter()
        .filter(|rule| rule.active)
        .find(|rule| {
            rule.keywords.iter().any(|keyword| {
                let keyword = keyword.trim().to_lowercase();
                !keyword.is_empty() && name.contains(&keyword)
            })
        })
        .map(|rule| rule.category)
        .unwrap_or(RoundCategory::Classique)
}
