mod support;

use opsboard_db::{MissionChanges, MissionFilter};
use support::{insert_mission, insert_repo, setup_db};

#[test]
fn list_missions_unfiltered_returns_all_newest_first() {
    let t = setup_db();
    t.raw
        .execute(
            "INSERT INTO missions (title, status, project, created_at, updated_at)
             VALUES ('older', 'planned', 'boost', '2026-02-01T00:00:00Z', '2026-02-01T00:00:00Z'),
                    ('newer', 'done', 'jarvis-dashboard', '2026-02-02T00:00:00Z', '2026-02-02T00:00:00Z')",
            [],
        )
        .unwrap();

    let missions = t.db.list_missions(&MissionFilter::default()).unwrap();
    assert_eq!(missions.len(), 2);
    assert_eq!(missions[0].title, "newer");
    assert_eq!(missions[1].title, "older");
}

#[test]
fn list_missions_applies_combined_filters() {
    let t = setup_db();
    insert_mission(&t.raw, "fix login", "in-progress", "boost");
    insert_mission(&t.raw, "fix logout", "done", "boost");
    insert_mission(&t.raw, "fix login", "in-progress", "openclaw");

    let filter = MissionFilter {
        project: Some("boost".into()),
        status: Some("in-progress".into()),
        ..Default::default()
    };
    let missions = t.db.list_missions(&filter).unwrap();
    assert_eq!(missions.len(), 1);
    assert_eq!(missions[0].title, "fix login");
    assert_eq!(missions[0].project, "boost");
}

#[test]
fn list_missions_search_matches_title_or_description() {
    let t = setup_db();
    t.raw
        .execute(
            "INSERT INTO missions (title, description, status, project, created_at, updated_at)
             VALUES ('refactor parser', NULL, 'planned', 'boost', '2026-02-01T00:00:00Z', '2026-02-01T00:00:00Z'),
                    ('ship feature', 'parser cleanup follow-up', 'planned', 'boost', '2026-02-02T00:00:00Z', '2026-02-02T00:00:00Z'),
                    ('unrelated', NULL, 'planned', 'boost', '2026-02-03T00:00:00Z', '2026-02-03T00:00:00Z')",
            [],
        )
        .unwrap();

    let filter = MissionFilter {
        search: Some("parser".into()),
        ..Default::default()
    };
    let missions = t.db.list_missions(&filter).unwrap();
    assert_eq!(missions.len(), 2);
}

#[test]
fn get_mission_joins_repo_name() {
    let t = setup_db();
    let repo_id = insert_repo(&t.raw, "boost-api");
    t.raw
        .execute(
            "INSERT INTO missions (title, status, project, repo_id, created_at, updated_at)
             VALUES ('wired', 'planned', 'boost', ?1, '2026-02-01T00:00:00Z', '2026-02-01T00:00:00Z')",
            [repo_id],
        )
        .unwrap();

    let mission = t.db.get_mission(1).unwrap().expect("mission exists");
    assert_eq!(mission.repo_id, Some(repo_id));
    assert_eq!(mission.repo_name.as_deref(), Some("boost-api"));
}

#[test]
fn get_mission_unknown_id_is_none() {
    let t = setup_db();
    assert!(t.db.get_mission(999).unwrap().is_none());
}

#[test]
fn update_mission_applies_only_recognized_fields() {
    let t = setup_db();
    let id = insert_mission(&t.raw, "keep title", "planned", "boost");

    let changes = MissionChanges {
        status: Some("in-progress".into()),
        description: Some("now underway".into()),
        ..Default::default()
    };
    let updated = t
        .db
        .update_mission(id, &changes)
        .unwrap()
        .expect("mission exists");
    assert_eq!(updated.status, "in-progress");
    assert_eq!(updated.description.as_deref(), Some("now underway"));
    assert_eq!(updated.title, "keep title");
    assert_ne!(updated.updated_at, updated.created_at);
}

#[test]
fn update_mission_unknown_id_is_none() {
    let t = setup_db();
    let changes = MissionChanges {
        status: Some("done".into()),
        ..Default::default()
    };
    assert!(t.db.update_mission(42, &changes).unwrap().is_none());
}

#[test]
fn mission_changes_deserializes_ignoring_unknown_fields() {
    let changes: MissionChanges =
        serde_json::from_str(r#"{"status":"done","bogus":"field","title":"nope"}"#).unwrap();
    assert_eq!(changes.status.as_deref(), Some("done"));
    assert!(!changes.is_empty());

    let empty: MissionChanges = serde_json::from_str(r#"{"bogus":"field"}"#).unwrap();
    assert!(empty.is_empty());
}

#[test]
fn mission_steps_ordered_by_step_number() {
    let t = setup_db();
    let id = insert_mission(&t.raw, "stepped", "in-progress", "boost");
    t.raw
        .execute(
            "INSERT INTO mission_steps (mission_id, step_number, title, status)
             VALUES (?1, 2, 'second', 'planned'), (?1, 1, 'first', 'done')",
            [id],
        )
        .unwrap();

    let steps = t.db.mission_steps(id).unwrap();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].title, "first");
    assert_eq!(steps[1].title, "second");
}

#[test]
fn list_projects_is_distinct_and_sorted() {
    let t = setup_db();
    insert_mission(&t.raw, "a", "planned", "jarvis-dashboard");
    insert_mission(&t.raw, "b", "planned", "boost");
    insert_mission(&t.raw, "c", "done", "boost");

    let projects = t.db.list_projects().unwrap();
    assert_eq!(projects, vec!["boost", "jarvis-dashboard"]);
}
