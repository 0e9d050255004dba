use delivery_insights::workflows::performance::build_scoreboard;
use delivery_insights::workflows::performance::domain::RuleSet;
use delivery_insights::workflows::urbantz::UrbantzExport;
use std::io::Cursor;

const TASK_HEADER: &str = "Task ID,Driver First Name,Driver Last Name,Hub,Progress,Rating,Comment,Window Start,Window End,Closed At,Completed Via,Address Confirmed,Contactless Forced";

#[test]
fn exported_tasks_flow_straight_into_the_scoreboard() {
    let csv = format!(
        "{TASK_HEADER}\n\
t-1,Jean,Dupont,Aulnay Nord,COMPLETED,5,,2026-03-02 08:00,2026-03-02 10:00,2026-03-02 09:00,mobile,true,false\n\
t-2,Jean,Dupont,Aulnay Nord,COMPLETED,4,,2026-03-02 10:00,2026-03-02 12:00,2026-03-02 13:00,mobile,true,false\n\
t-3,Marie,Curie,Lyon Centre,ONGOING,,,,,,,,\n"
    );

    let tasks = UrbantzExport::tasks_from_reader(Cursor::new(csv)).expect("import succeeds");
    assert_eq!(tasks.len(), 3);

    let scoreboard = build_scoreboard(&tasks, &RuleSet::default());
    assert_eq!(scoreboard.network.total_tasks, 3);
    assert_eq!(scoreboard.network.completed_tasks, 2);
    assert_eq!(scoreboard.network.total_ratings, 2);

    // t-2 closed 45 minutes past the grace window.
    let punctuality = scoreboard
        .network
        .punctuality_rate
        .expect("two eligible tasks");
    assert!((punctuality - 50.0).abs() < 1e-9);
}

#[test]
fn unparseable_dates_shrink_the_punctuality_denominator() {
    let csv = format!(
        "{TASK_HEADER}\n\
t-1,Jean,Dupont,Aulnay Nord,COMPLETED,5,,2026-03-02 08:00,2026-03-02 10:00,2026-03-02 09:00,mobile,true,false\n\
t-2,Jean,Dupont,Aulnay Nord,COMPLETED,5,,02/03/2026 08:00,,pas une date,mobile,true,false\n"
    );

    let tasks = UrbantzExport::tasks_from_reader(Cursor::new(csv)).expect("import succeeds");
    let scoreboard = build_scoreboard(&tasks, &RuleSet::default());

    // The second task's dates failed to parse, so only one task is eligible
    // and it was on time.
    assert_eq!(scoreboard.network.completed_tasks, 2);
    assert_eq!(scoreboard.network.punctuality_rate, Some(100.0));
}

#[test]
fn malformed_csv_structure_is_a_hard_error() {
    let csv = format!("{TASK_HEADER}\nt-1,Jean\n");

    let error = UrbantzExport::tasks_from_reader(Cursor::new(csv))
        .expect_err("short row must fail");
    assert!(error.to_string().contains("invalid Urbantz CSV data"));
}

#[test]
fn round_exports_keep_manual_carrier_overrides() {
    let csv = "Round Name,Date,Hub,Max Weight (kg),Carrier,Driver First Name,Driver Last Name\n\
T-07h Aulnay,2026-03-02,Aulnay Nord,650,Courses Express,Jean,Dupont\n";

    let rounds = UrbantzExport::rounds_from_reader(Cursor::new(csv)).expect("import succeeds");
    assert_eq!(rounds.len(), 1);
    assert_eq!(rounds[0].carrier_override.as_deref(), Some("Courses Express"));
    assert_eq!(rounds[0].weight_capacity_kg, Some(650.0));
}
