use super::normalizer::{clean_text, normalize_token};
use crate::workflows::performance::domain::{
    DeliveryRound, DeliveryTask, DriverRef, TaskProgression,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use std::io::Read;

pub(crate) fn parse_task_records<R: Read>(reader: R) -> Result<Vec<DeliveryTask>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut tasks = Vec::new();

    for record in csv_reader.deserialize::<TaskRow>() {
        tasks.push(record?.into_task());
    }

    Ok(tasks)
}

pub(crate) fn parse_round_records<R: Read>(reader: R) -> Result<Vec<DeliveryRound>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rounds = Vec::new();

    for record in csv_reader.deserialize::<RoundRow>() {
        rounds.push(record?.into_round());
    }

    Ok(rounds)
}

#[derive(Debug, Deserialize)]
struct TaskRow {
    #[serde(rename = "Task ID")]
    id: String,
    #[serde(rename = "Driver First Name", default, deserialize_with = "empty_string_as_none")]
    driver_first_name: Option<String>,
    #[serde(rename = "Driver Last Name", default, deserialize_with = "empty_string_as_none")]
    driver_last_name: Option<String>,
    #[serde(rename = "Hub", default, deserialize_with = "empty_string_as_none")]
    hub: Option<String>,
    #[serde(rename = "Progress", default, deserialize_with = "empty_string_as_none")]
    progress: Option<String>,
    #[serde(rename = "Rating", default, deserialize_with = "empty_string_as_none")]
    rating: Option<String>,
    #[serde(rename = "Comment", default, deserialize_with = "empty_string_as_none")]
    comment: Option<String>,
    #[serde(rename = "Window Start", default, deserialize_with = "empty_string_as_none")]
    window_start: Option<String>,
    #[serde(rename = "Window End", default, deserialize_with = "empty_string_as_none")]
    window_end: Option<String>,
    #[serde(rename = "Closed At", default, deserialize_with = "empty_string_as_none")]
    closed_at: Option<String>,
    #[serde(rename = "Completed Via", default, deserialize_with = "empty_string_as_none")]
    completed_via: Option<String>,
    #[serde(rename = "Address Confirmed", default, deserialize_with = "empty_string_as_none")]
    address_confirmed: Option<String>,
    #[serde(rename = "Contactless Forced", default, deserialize_with = "empty_string_as_none")]
    contactless_forced: Option<String>,
}

impl TaskRow {
    fn into_task(self) -> DeliveryTask {
        let driver = driver_ref(self.driver_first_name.as_deref(), self.driver_last_name.as_deref());

        DeliveryTask {
            id: clean_text(&self.id),
            driver,
            driver_first_name: None,
            driver_last_name: None,
            hub: self.hub.as_deref().map(clean_text),
            progression: self.progress.as_deref().map(parse_progression).unwrap_or_default(),
            rating: self.rating.as_deref().and_then(parse_rating),
            comment: self.comment.as_deref().map(clean_text),
            window_start: self.window_start.as_deref().and_then(parse_datetime),
            window_end: self.window_end.as_deref().and_then(parse_datetime),
            closed_at: self.closed_at.as_deref().and_then(parse_datetime),
            completed_via: self.completed_via.as_deref().map(clean_text),
            address_confirmed: self.address_confirmed.as_deref().and_then(parse_flag),
            contactless_forced: self.contactless_forced.as_deref().and_then(parse_flag),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RoundRow {
    #[serde(rename = "Round Name")]
    name: String,
    #[serde(rename = "Date", default, deserialize_with = "empty_string_as_none")]
    date: Option<String>,
    #[serde(rename = "Hub", default, deserialize_with = "empty_string_as_none")]
    hub: Option<String>,
    #[serde(rename = "Max Weight (kg)", default, deserialize_with = "empty_string_as_none")]
    max_weight: Option<String>,
    #[serde(rename = "Carrier", default, deserialize_with = "empty_string_as_none")]
    carrier: Option<String>,
    #[serde(rename = "Driver First Name", default, deserialize_with = "empty_string_as_none")]
    driver_first_name: Option<String>,
    #[serde(rename = "Driver Last Name", default, deserialize_with = "empty_string_as_none")]
    driver_last_name: Option<String>,
}

impl RoundRow {
    fn into_round(self) -> DeliveryRound {
        DeliveryRound {
            name: clean_text(&self.name),
            date: self.date.as_deref().and_then(parse_date),
            hub: self.hub.as_deref().map(clean_text),
            weight_capacity_kg: self
                .max_weight
                .as_deref()
                .and_then(|value| value.replace(',', ".").trim().parse::<f64>().ok()),
            carrier_override: self.carrier.as_deref().map(clean_text),
            driver: driver_ref(self.driver_first_name.as_deref(), self.driver_last_name.as_deref()),
        }
    }
}

fn driver_ref(first: Option<&str>, last: Option<&str>) -> Option<DriverRef> {
    if first.is_none() && last.is_none() {
        return None;
    }

    Some(DriverRef {
        first_name: first.map(clean_text),
        last_name: last.map(clean_text),
    })
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    None
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Ratings outside 1..=5 and non-numeric cells degrade to no rating.
fn parse_rating(value: &str) -> Option<u8> {
    value
        .trim()
        .parse::<u8>()
        .ok()
        .filter(|rating| (1..=5).contains(rating))
}

fn parse_flag(value: &str) -> Option<bool> {
    match normalize_token(value).as_str() {
        "true" | "yes" | "oui" | "1" => Some(true),
        "false" | "no" | "non" | "0" => Some(false),
        _ => None,
    }
}

fn parse_progression(value: &str) -> TaskProgression {
    match normalize_token(value).as_str() {
        "completed" => TaskProgression::Completed,
        "announced" => TaskProgression::Announced,
        "ongoing" => TaskProgression::Ongoing,
        "discarded" => TaskProgression::Discarded,
        _ => TaskProgression::Unknown,
    }
}

#[cfg(test)]
pub(crate) fn parse_datetime_for_tests(value: &str) -> Option<NaiveDateTime> {
    parse_datetime(value)
}

#[cfg(test)]
pub(crate) fn parse_rating_for_tests(value: &str) -> Option<u8> {
    parse_rating(value)
}

#[cfg(test)]
pub(crate) fn parse_flag_for_tests(value: &str) -> Option<bool> {
    parse_flag(value)
}
