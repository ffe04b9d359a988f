//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{DateTime, NaiveDate, TimeZone as _, Utc};
use sit_core::{
  Classify as _, ErrorClass,
  location::{GisLocationRepresent, NewLocation},
  reference::NewOrganisation,
  situation::{NewPresence, NewSituation, SituationType, TrackableType, sit_location},
  sitrep::NewSituationReport,
  store::SituationStore,
  tracker::Tracker,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn at(hour: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
}

fn core_error(err: &Error) -> &sit_core::Error {
  match err {
    Error::Core(e) => e,
    other => panic!("expected a core error, got {other:?}"),
  }
}

// ─── Reference data ──────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_location() {
  let s = store().await;
  let loc = s
    .add_location(NewLocation { name: "Depot".into(), lat: Some(1.5), lon: Some(2.25) })
    .await
    .unwrap();

  let fetched = s.get_location(loc.location_id).await.unwrap().unwrap();
  assert_eq!(fetched, loc);
  assert!(s.get_location(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn locations_and_organisations_are_listed_by_name() {
  let s = store().await;
  s.add_location(NewLocation::named("Zone B")).await.unwrap();
  s.add_location(NewLocation::named("Zone A")).await.unwrap();
  s.add_organisation(NewOrganisation { name: "Red Cross".into() })
    .await
    .unwrap();
  s.add_organisation(NewOrganisation { name: "Civil Defence".into() })
    .await
    .unwrap();

  let locations: Vec<_> =
    s.list_locations().await.unwrap().into_iter().map(|l| l.name).collect();
  assert_eq!(locations, ["Zone A", "Zone B"]);

  let orgs: Vec<_> =
    s.list_organisations().await.unwrap().into_iter().map(|o| o.name).collect();
  assert_eq!(orgs, ["Civil Defence", "Red Cross"]);
}

#[tokio::test]
async fn blank_location_name_is_rejected() {
  let s = store().await;
  let err = s.add_location(NewLocation::named("  ")).await.unwrap_err();
  assert!(matches!(core_error(&err), sit_core::Error::Required { .. }));
  assert_eq!(err.class(), ErrorClass::Invalid);
}

// ─── Situations ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn every_situation_type_is_retrievable() {
  let s = store().await;
  for t in SituationType::ALL {
    let record_id = Uuid::new_v4();
    let sit = s.register_situation(NewSituation::new(t, record_id)).await.unwrap();

    let by_id = s.get_situation(sit.sit_id).await.unwrap().unwrap();
    assert_eq!(by_id.instance_type, t);
    assert_eq!(by_id.record_id, record_id);

    let by_record = s.find_situation(t, record_id).await.unwrap().unwrap();
    assert_eq!(by_record.sit_id, sit.sit_id);
  }
  assert_eq!(s.list_situations(None).await.unwrap().len(), 3);
  assert_eq!(
    s.list_situations(Some(SituationType::Request)).await.unwrap().len(),
    1
  );
}

#[tokio::test]
async fn situation_keeps_time_and_place() {
  let s = store().await;
  let loc = s.add_location(NewLocation::named("Bridge")).await.unwrap();
  let input = NewSituation {
    instance_type: SituationType::Incident,
    record_id:     Uuid::new_v4(),
    datetime:      Some(at(9)),
    location_id:   Some(loc.location_id),
  };

  let sit = s.register_situation(input).await.unwrap();
  let fetched = s.get_situation(sit.sit_id).await.unwrap().unwrap();
  assert_eq!(fetched.datetime, Some(at(9)));
  assert_eq!(fetched.location_id, Some(loc.location_id));
}

#[tokio::test]
async fn registering_a_row_twice_conflicts() {
  let s = store().await;
  let record_id = Uuid::new_v4();
  s.register_situation(NewSituation::new(SituationType::Incident, record_id))
    .await
    .unwrap();

  let err = s
    .register_situation(NewSituation::new(SituationType::Incident, record_id))
    .await
    .unwrap_err();
  assert!(matches!(
    core_error(&err),
    sit_core::Error::AlreadyRegistered { instance_type: "irs_incident", .. }
  ));
  assert_eq!(err.class(), ErrorClass::Conflict);

  // Same id under a different table is a different row.
  s.register_situation(NewSituation::new(SituationType::Request, record_id))
    .await
    .unwrap();
}

#[tokio::test]
async fn simultaneous_registrations_yield_one_row() {
  let s = store().await;
  let input = NewSituation::new(SituationType::Incident, Uuid::new_v4());

  let (a, b) = tokio::join!(
    s.register_situation(input.clone()),
    s.register_situation(input),
  );
  let (ok, err): (Vec<_>, Vec<_>) = [a, b].into_iter().partition(Result::is_ok);
  assert_eq!(ok.len(), 1);
  let err = err.into_iter().next().unwrap().unwrap_err();
  assert!(matches!(core_error(&err), sit_core::Error::AlreadyRegistered { .. }));
  assert_eq!(err.class(), ErrorClass::Conflict);

  let record_id = Uuid::new_v4();
  let (a, b) = tokio::join!(
    s.register_trackable(TrackableType::Person, record_id),
    s.register_trackable(TrackableType::Person, record_id),
  );
  let classes: Vec<_> = [a, b]
    .into_iter()
    .map(|r| r.err().map(|e| e.class()))
    .collect();
  assert!(classes.contains(&None));
  assert!(classes.contains(&Some(ErrorClass::Conflict)));
}

#[tokio::test]
async fn unregister_situation_removes_row() {
  let s = store().await;
  let sit = s
    .register_situation(NewSituation::new(SituationType::Presence, Uuid::new_v4()))
    .await
    .unwrap();

  s.unregister_situation(sit.sit_id).await.unwrap();
  assert!(s.get_situation(sit.sit_id).await.unwrap().is_none());

  let err = s.unregister_situation(sit.sit_id).await.unwrap_err();
  assert_eq!(err.class(), ErrorClass::NotFound);
}

#[tokio::test]
async fn situation_with_unknown_location_is_rejected() {
  let s = store().await;
  let mut input = NewSituation::new(SituationType::Incident, Uuid::new_v4());
  input.location_id = Some(Uuid::new_v4());

  let err = s.register_situation(input).await.unwrap_err();
  assert!(matches!(core_error(&err), sit_core::Error::LocationNotFound(_)));
  assert!(s.list_situations(None).await.unwrap().is_empty());
}

// ─── Trackables ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn every_trackable_type_is_retrievable() {
  let s = store().await;
  for t in TrackableType::ALL {
    let record_id = Uuid::new_v4();
    let tr = s.register_trackable(t, record_id).await.unwrap();
    assert!(tr.track_timestmp.is_none());

    let found = s.find_trackable(t, record_id).await.unwrap().unwrap();
    assert_eq!(found.track_id, tr.track_id);
    assert_eq!(found.instance_type, t);
  }
  assert_eq!(s.list_trackables(None).await.unwrap().len(), 5);
  assert_eq!(
    s.list_trackables(Some(TrackableType::Asset)).await.unwrap().len(),
    1
  );
}

#[tokio::test]
async fn unregister_trackable_drops_its_history() {
  let s = store().await;
  let tr = s
    .register_trackable(TrackableType::Person, Uuid::new_v4())
    .await
    .unwrap();
  s.record_presence(NewPresence::at(tr.track_id, at(8), None))
    .await
    .unwrap();

  s.unregister_trackable(tr.track_id).await.unwrap();
  assert!(s.get_trackable(tr.track_id).await.unwrap().is_none());
  assert!(s.presence_history(tr.track_id).await.unwrap().is_empty());

  let err = s.unregister_trackable(tr.track_id).await.unwrap_err();
  assert!(matches!(core_error(&err), sit_core::Error::TrackableNotFound(_)));
}

// ─── Tracking ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn presence_history_is_oldest_first() {
  let s = store().await;
  let tr = s
    .register_trackable(TrackableType::Asset, Uuid::new_v4())
    .await
    .unwrap();

  for hour in [10, 8, 9] {
    s.record_presence(NewPresence::at(tr.track_id, at(hour), None))
      .await
      .unwrap();
  }

  let times: Vec<_> = s
    .presence_history(tr.track_id)
    .await
    .unwrap()
    .into_iter()
    .map(|p| p.timestmp)
    .collect();
  assert_eq!(times, [at(8), at(9), at(10)]);
}

#[tokio::test]
async fn track_timestmp_only_moves_forward() {
  let s = store().await;
  let tr = s
    .register_trackable(TrackableType::HumanResource, Uuid::new_v4())
    .await
    .unwrap();

  s.record_presence(NewPresence::at(tr.track_id, at(10), None))
    .await
    .unwrap();
  s.record_presence(NewPresence::at(tr.track_id, at(7), None))
    .await
    .unwrap();

  let fetched = s.get_trackable(tr.track_id).await.unwrap().unwrap();
  assert_eq!(fetched.track_timestmp, Some(at(10)));
}

#[tokio::test]
async fn presence_records_actor_and_interlock() {
  let s = store().await;
  let tr = s
    .register_trackable(TrackableType::EventResource, Uuid::new_v4())
    .await
    .unwrap();

  let input = NewPresence {
    track_id:    tr.track_id,
    timestmp:    None,
    location_id: None,
    interlock:   Some("gps:42".into()),
    actor:       Some("field-team".into()),
  };
  let p = s.record_presence(input).await.unwrap();

  let history = s.presence_history(tr.track_id).await.unwrap();
  assert_eq!(history.len(), 1);
  assert_eq!(history[0].presence_id, p.presence_id);
  assert_eq!(history[0].interlock.as_deref(), Some("gps:42"));
  assert_eq!(history[0].meta.created_by.as_deref(), Some("field-team"));
  assert_eq!(history[0].timestmp, p.timestmp);
}

#[tokio::test]
async fn presence_for_unknown_trackable_is_not_found() {
  let s = store().await;
  let err = s
    .record_presence(NewPresence::at(Uuid::new_v4(), at(8), None))
    .await
    .unwrap_err();
  assert!(matches!(core_error(&err), sit_core::Error::TrackableNotFound(_)));
}

// ─── sit_location ────────────────────────────────────────────────────────────

#[tokio::test]
async fn sit_location_is_latest_observed_place() {
  let s = store().await;
  let l1 = s.add_location(NewLocation::named("Camp 1")).await.unwrap();
  let l2 = s.add_location(NewLocation::named("Camp 2")).await.unwrap();
  let record_id = Uuid::new_v4();
  let tr = s
    .register_trackable(TrackableType::Person, record_id)
    .await
    .unwrap();

  s.record_presence(NewPresence::at(tr.track_id, at(8), Some(l1.location_id)))
    .await
    .unwrap();
  s.record_presence(NewPresence::at(tr.track_id, at(9), Some(l2.location_id)))
    .await
    .unwrap();

  let current = s
    .current_location(TrackableType::Person, record_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(current.location_id, l2.location_id);

  let text = sit_location(
    &s,
    &GisLocationRepresent::default(),
    TrackableType::Person,
    record_id,
  )
  .await
  .unwrap();
  assert_eq!(text, "Camp 2");
}

#[tokio::test]
async fn latest_observation_without_place_gives_placeholder() {
  let s = store().await;
  let l1 = s.add_location(NewLocation::named("Camp 1")).await.unwrap();
  let record_id = Uuid::new_v4();
  let tr = s
    .register_trackable(TrackableType::DeadBody, record_id)
    .await
    .unwrap();

  s.record_presence(NewPresence::at(tr.track_id, at(8), Some(l1.location_id)))
    .await
    .unwrap();
  s.record_presence(NewPresence::at(tr.track_id, at(9), None))
    .await
    .unwrap();

  let history = s
    .location_history(TrackableType::DeadBody, record_id)
    .await
    .unwrap();
  assert_eq!(history.len(), 2);
  assert!(history[1].location.is_none());

  let current = s
    .current_location(TrackableType::DeadBody, record_id)
    .await
    .unwrap();
  assert!(current.is_none());

  let text = sit_location(
    &s,
    &GisLocationRepresent::default(),
    TrackableType::DeadBody,
    record_id,
  )
  .await
  .unwrap();
  assert_eq!(text, "-");
}

#[tokio::test]
async fn sit_location_ignores_future_presences() {
  let s = store().await;
  let camp_a = s.add_location(NewLocation::named("Camp A")).await.unwrap();
  let camp_b = s.add_location(NewLocation::named("Camp B")).await.unwrap();
  let record_id = Uuid::new_v4();
  let tr = s
    .register_trackable(TrackableType::Person, record_id)
    .await
    .unwrap();

  let now = Utc::now();
  s.record_presence(NewPresence::at(
    tr.track_id,
    now - chrono::Duration::hours(1),
    Some(camp_a.location_id),
  ))
  .await
  .unwrap();
  s.record_presence(NewPresence::at(
    tr.track_id,
    now + chrono::Duration::days(30),
    Some(camp_b.location_id),
  ))
  .await
  .unwrap();

  // The planned presence stays in the history.
  let history = s
    .location_history(TrackableType::Person, record_id)
    .await
    .unwrap();
  assert_eq!(history.len(), 2);

  let text = sit_location(
    &s,
    &GisLocationRepresent::default(),
    TrackableType::Person,
    record_id,
  )
  .await
  .unwrap();
  assert_eq!(text, "Camp A");
}

#[tokio::test]
async fn sit_location_without_history_is_placeholder() {
  let s = store().await;
  let represent = GisLocationRepresent::default();

  // Registered but never seen.
  let registered = Uuid::new_v4();
  s.register_trackable(TrackableType::Asset, registered)
    .await
    .unwrap();
  let text = sit_location(&s, &represent, TrackableType::Asset, registered)
    .await
    .unwrap();
  assert_eq!(text, "-");

  // Never registered at all.
  let text = sit_location(&s, &represent, TrackableType::Asset, Uuid::new_v4())
    .await
    .unwrap();
  assert_eq!(text, "-");
}

#[tokio::test]
async fn history_is_scoped_to_table_and_record() {
  let s = store().await;
  let loc = s.add_location(NewLocation::named("Port")).await.unwrap();
  let record_id = Uuid::new_v4();
  let tr = s
    .register_trackable(TrackableType::Asset, record_id)
    .await
    .unwrap();
  s.record_presence(NewPresence::at(tr.track_id, at(8), Some(loc.location_id)))
    .await
    .unwrap();

  // Same record id, different concrete table.
  let other = s
    .location_history(TrackableType::Person, record_id)
    .await
    .unwrap();
  assert!(other.is_empty());
}

// ─── Situation reports ───────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_report() {
  let s = store().await;
  let org = s
    .add_organisation(NewOrganisation { name: "Red Cross".into() })
    .await
    .unwrap();
  let loc = s.add_location(NewLocation::named("District 4")).await.unwrap();

  let input = NewSituationReport {
    name:            "Flood Assessment Day 1".into(),
    organisation_id: Some(org.organisation_id),
    location_id:     Some(loc.location_id),
    date:            NaiveDate::from_ymd_opt(2024, 3, 1),
    comments:        Some("Water receding in the north".into()),
    actor:           Some("alice".into()),
  };
  let report = s.create_report(input).await.unwrap();

  let fetched = s.get_report(report.report_id).await.unwrap().unwrap();
  assert_eq!(fetched, report);
  assert_eq!(fetched.name, "Flood Assessment Day 1");
  assert_eq!(fetched.meta.created_by.as_deref(), Some("alice"));
  assert_eq!(fetched.meta.created_on, fetched.meta.modified_on);
}

#[tokio::test]
async fn reports_are_listed_in_creation_order() {
  let s = store().await;
  for name in ["Day 1", "Day 2", "Day 3"] {
    s.create_report(NewSituationReport::named(name)).await.unwrap();
  }
  let names: Vec<_> =
    s.list_reports().await.unwrap().into_iter().map(|r| r.name).collect();
  assert_eq!(names, ["Day 1", "Day 2", "Day 3"]);
}

#[tokio::test]
async fn report_name_is_bounded() {
  let s = store().await;

  let ok = "x".repeat(128);
  s.create_report(NewSituationReport::named(ok)).await.unwrap();

  let too_long = "x".repeat(129);
  let err = s
    .create_report(NewSituationReport::named(too_long))
    .await
    .unwrap_err();
  assert!(matches!(
    core_error(&err),
    sit_core::Error::TooLong { max: 128, len: 129, .. }
  ));
  assert_eq!(s.list_reports().await.unwrap().len(), 1);
}

#[tokio::test]
async fn long_actor_names_are_kept() {
  let s = store().await;
  let actor = "a".repeat(200);

  let mut input = NewSituationReport::named("Day 1");
  input.actor = Some(actor.clone());
  let report = s.create_report(input).await.unwrap();
  assert_eq!(report.meta.created_by.as_deref(), Some(actor.as_str()));

  let fetched = s.get_report(report.report_id).await.unwrap().unwrap();
  assert_eq!(fetched.meta.created_by, report.meta.created_by);
}

#[tokio::test]
async fn report_name_is_required() {
  let s = store().await;
  let err = s
    .create_report(NewSituationReport::named(""))
    .await
    .unwrap_err();
  assert!(matches!(core_error(&err), sit_core::Error::Required { .. }));
}

#[tokio::test]
async fn report_with_unknown_references_is_rejected() {
  let s = store().await;

  let mut input = NewSituationReport::named("Day 1");
  input.location_id = Some(Uuid::new_v4());
  let err = s.create_report(input).await.unwrap_err();
  assert!(matches!(core_error(&err), sit_core::Error::LocationNotFound(_)));

  let mut input = NewSituationReport::named("Day 1");
  input.organisation_id = Some(Uuid::new_v4());
  let err = s.create_report(input).await.unwrap_err();
  assert!(matches!(core_error(&err), sit_core::Error::OrganisationNotFound(_)));
  assert_eq!(err.class(), ErrorClass::Invalid);

  assert!(s.list_reports().await.unwrap().is_empty());
}

#[tokio::test]
async fn update_report_replaces_fields() {
  let s = store().await;
  let mut input = NewSituationReport::named("Flood Assessment Day 1");
  input.comments = Some("initial".into());
  let report = s.create_report(input).await.unwrap();

  let mut change = NewSituationReport::named("Flood Assessment Day 2");
  change.actor = Some("bob".into());
  let updated = s.update_report(report.report_id, change).await.unwrap();

  assert_eq!(updated.doc_id, report.doc_id);
  assert_eq!(updated.name, "Flood Assessment Day 2");
  assert!(updated.comments.is_none());
  assert_eq!(updated.meta.created_on, report.meta.created_on);
  assert_eq!(updated.meta.modified_by.as_deref(), Some("bob"));

  let fetched = s.get_report(report.report_id).await.unwrap().unwrap();
  assert_eq!(fetched, updated);
}

#[tokio::test]
async fn update_missing_report_is_not_found() {
  let s = store().await;
  let err = s
    .update_report(Uuid::new_v4(), NewSituationReport::named("x"))
    .await
    .unwrap_err();
  assert!(matches!(core_error(&err), sit_core::Error::ReportNotFound(_)));
  assert_eq!(err.class(), ErrorClass::NotFound);
}

#[tokio::test]
async fn delete_report_removes_it() {
  let s = store().await;
  let report = s
    .create_report(NewSituationReport::named("Day 1"))
    .await
    .unwrap();

  s.delete_report(report.report_id).await.unwrap();
  assert!(s.get_report(report.report_id).await.unwrap().is_none());

  let err = s.delete_report(report.report_id).await.unwrap_err();
  assert_eq!(err.class(), ErrorClass::NotFound);
}

#[tokio::test]
async fn deleted_report_cannot_be_updated() {
  let s = store().await;
  let report = s
    .create_report(NewSituationReport::named("Day 1"))
    .await
    .unwrap();
  s.delete_report(report.report_id).await.unwrap();

  let err = s
    .update_report(report.report_id, NewSituationReport::named("Day 2"))
    .await
    .unwrap_err();
  assert!(matches!(core_error(&err), sit_core::Error::ReportNotFound(_)));
  assert!(s.list_reports().await.unwrap().is_empty());
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn reopening_a_file_keeps_data() {
  let path = std::env::temp_dir().join(format!("sit-{}.db", Uuid::new_v4()));

  let report_id = {
    let s = SqliteStore::open(&path).await.unwrap();
    s.create_report(NewSituationReport::named("Day 1"))
      .await
      .unwrap()
      .report_id
  };

  let s = SqliteStore::open(&path).await.unwrap();
  assert!(s.get_report(report_id).await.unwrap().is_some());

  drop(s);
  let _ = std::fs::remove_file(&path);
}
