mod normalizer;
mod parser;

use crate::workflows::performance::domain::{DeliveryRound, DeliveryTask};
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Structural failures only. A row with missing or garbled cells still
/// produces a task; its unusable fields come through as `None` and fall out
/// of the affected rates downstream.
#[derive(Debug, Error)]
pub enum UrbantzImportError {
    #[error("failed to read Urbantz export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid Urbantz CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// Reads task and round CSV exports as they come out of the Urbantz
/// dashboard.
pub struct UrbantzExport;

impl UrbantzExport {
    pub fn tasks_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<DeliveryTask>, UrbantzImportError> {
        let file = std::fs::File::open(path)?;
        Self::tasks_from_reader(file)
    }

    pub fn tasks_from_reader<R: Read>(reader: R) -> Result<Vec<DeliveryTask>, UrbantzImportError> {
        Ok(parser::parse_task_records(reader)?)
    }

    pub fn rounds_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<DeliveryRound>, UrbantzImportError> {
        let file = std::fs::File::open(path)?;
        Self::rounds_from_reader(file)
    }

    pub fn rounds_from_reader<R: Read>(
        reader: R,
    ) -> Result<Vec<DeliveryRound>, UrbantzImportError> {
        Ok(parser::parse_round_records(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::performance::domain::TaskProgression;
    use chrono::NaiveDate;
    use std::io::Cursor;

    #[test]
    fn parse_datetime_supports_rfc3339_and_export_formats() {
        let rfc = parser::parse_datetime_for_tests("2026-03-02T10:00:00Z").expect("parse rfc");
        assert_eq!(
            rfc,
            NaiveDate::from_ymd_opt(2026, 3, 2)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap()
        );

        let spaced = parser::parse_datetime_for_tests("2026-03-02 10:30").expect("parse spaced");
        assert_eq!(
            spaced,
            NaiveDate::from_ymd_opt(2026, 3, 2)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap()
        );

        let date = parser::parse_datetime_for_tests("2026-03-02").expect("parse date");
        assert_eq!(
            date,
            NaiveDate::from_ymd_opt(2026, 3, 2)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );

        assert!(parser::parse_datetime_for_tests("  ").is_none());
        assert!(parser::parse_datetime_for_tests("02/03/2026").is_none());
    }

    #[test]
    fn ratings_and_flags_coerce_leniently() {
        assert_eq!(parser::parse_rating_for_tests("4"), Some(4));
        assert_eq!(parser::parse_rating_for_tests("0"), None);
        assert_eq!(parser::parse_rating_for_tests("6"), None);
        assert_eq!(parser::parse_rating_for_tests("quatre"), None);

        assert_eq!(parser::parse_flag_for_tests("TRUE"), Some(true));
        assert_eq!(parser::parse_flag_for_tests("non"), Some(false));
        assert_eq!(parser::parse_flag_for_tests("peut-être"), None);
    }

    #[test]
    fn clean_text_strips_bom_and_collapses_whitespace() {
        let cleaned = normalizer::clean_for_tests("\u{feff}Jean   Dupont ");
        assert_eq!(cleaned, "Jean Dupont");
    }

    #[test]
    fn task_rows_survive_partial_data() {
        let csv = "Task ID,Driver First Name,Driver Last Name,Hub,Progress,Rating,Comment,Window Start,Window End,Closed At,Completed Via,Address Confirmed,Contactless Forced\n\
t-1,Jean,Dupont,Aulnay Nord,COMPLETED,5,,2026-03-02 08:00,2026-03-02 10:00,2026-03-02T09:12:00Z,mobile,true,false\n\
t-2,,,,,not-a-rating,,invalid-date,,,,,\n";

        let tasks = UrbantzExport::tasks_from_reader(Cursor::new(csv)).expect("import succeeds");
        assert_eq!(tasks.len(), 2);

        let first = &tasks[0];
        assert_eq!(first.progression, TaskProgression::Completed);
        assert_eq!(first.rating, Some(5));
        assert_eq!(first.address_confirmed, Some(true));
        assert!(first.window_start.is_some());
        assert!(first.closed_at.is_some());
        let driver = first.driver.as_ref().expect("driver parsed");
        assert_eq!(driver.first_name.as_deref(), Some("Jean"));

        let second = &tasks[1];
        assert_eq!(second.progression, TaskProgression::Unknown);
        assert!(second.driver.is_none());
        assert!(second.rating.is_none());
        assert!(second.window_start.is_none());
    }

    #[test]
    fn round_rows_carry_override_and_capacity() {
        let csv = "Round Name,Date,Hub,Max Weight (kg),Carrier,Driver First Name,Driver Last Name\n\
T-07h Aulnay,2026-03-02,Aulnay Nord,\"650,5\",Courses Express,Jean,Dupont\n\
T-18h,,,,,Marie,Curie\n";

        let rounds = UrbantzExport::rounds_from_reader(Cursor::new(csv)).expect("import succeeds");
        assert_eq!(rounds.len(), 2);

        let first = &rounds[0];
        assert_eq!(first.carrier_override.as_deref(), Some("Courses Express"));
        assert_eq!(first.weight_capacity_kg, Some(650.5));
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2026, 3, 2));

        let second = &rounds[1];
        assert!(second.carrier_override.is_none());
        assert!(second.weight_capacity_kg.is_none());
    }

    #[test]
    fn tasks_from_path_propagates_io_errors() {
        let error = UrbantzExport::tasks_from_path("./does-not-exist.csv")
            .expect_err("expected io error");

        match error {
            UrbantzImportError::Io(_) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
