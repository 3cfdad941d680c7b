//! Integration tests for `SqliteStore` and the workflow service running over
//! it, against an in-memory database.

use chrono::NaiveDate;
use paperflow_core::{
  ErrorKind, Identity, Workflow,
  assignment::{AssignmentKey, AssignmentQuery, Decision, DutyRole, NewAssignment, PaperStatus},
  faculty::{NewFaculty, ProfileDetails},
  paper::{
    ExamMetadata, NewQuestionPaper, PaperQuery, RequestResponse, RequestStatus,
    ScrutinyStatus, Scrutinizer, Verdict,
  },
  store::WorkflowStore,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn admin() -> Identity { Identity::admin() }

fn faculty(id: &str) -> Identity { Identity::faculty(id) }

/// A workflow over a fresh store with three registered faculty members, and a
/// handle on that store.
async fn workflow_and_store() -> (Workflow<SqliteStore>, SqliteStore) {
  let s = store().await;
  let wf = Workflow::new(s.clone());
  for (id, name) in [("F1", "Ada Lovelace"), ("F2", "Alan Turing"), ("F3", "Grace Hopper")] {
    wf.register_faculty(&admin(), NewFaculty {
      faculty_id: id.into(),
      full_name:  name.into(),
      details:    ProfileDetails::default(),
    })
    .await
    .unwrap();
  }
  (wf, s)
}

async fn workflow() -> Workflow<SqliteStore> { workflow_and_store().await.0 }

fn name_of(id: &str) -> &'static str {
  match id {
    "F1" => "Ada Lovelace",
    "F2" => "Alan Turing",
    _ => "Grace Hopper",
  }
}

fn new_assignment(faculty_id: &str, subject_code: &str, role: &str) -> NewAssignment {
  NewAssignment {
    faculty_id:   faculty_id.into(),
    faculty_name: name_of(faculty_id).into(),
    subject_code: subject_code.into(),
    subject_name: "Programming".into(),
    regulation:   "R2021".into(),
    role:         DutyRole::new(role),
    deadline:     NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
  }
}

fn new_paper(faculty_id: &str, subject_code: &str, role: &str) -> NewQuestionPaper {
  NewQuestionPaper {
    faculty_id: faculty_id.into(),
    role:       DutyRole::new(role),
    metadata:   ExamMetadata {
      exam_name:     "End Semester Examination".into(),
      department:    "Computer Science".into(),
      semester:      "III".into(),
      subject_code:  subject_code.into(),
      subject_title: "Programming".into(),
      regulation:    "R2021".into(),
      time:          "3 Hours".into(),
      max_marks:     "100".into(),
    },
    part_a:     (1..=10).map(|i| format!("Define term {i}.")).collect(),
    part_b:     (1..=8).map(|i| format!("Explain concept {i}.")).collect(),
    part_c:     vec!["Design a compiler.".into(), "Prove termination.".into()],
  }
}

fn scrutinizer(id: &str) -> Scrutinizer {
  Scrutinizer {
    scrutinizer_id:   id.into(),
    scrutinizer_name: name_of(id).into(),
  }
}

/// Assign, accept, and submit a paper for F1 on CS101 as a setter.
async fn submitted_paper(wf: &Workflow<SqliteStore>) -> Uuid {
  wf.create_assignment(&admin(), new_assignment("F1", "CS101", "Setter"))
    .await
    .unwrap();
  wf.submit_response(&faculty("F1"), AssignmentKey::new("F1", "CS101", "Setter"), Decision::Yes)
    .await
    .unwrap();
  wf.submit_question_paper(&faculty("F1"), new_paper("F1", "CS101", "Setter"))
    .await
    .unwrap()
    .id
}

async fn assignment_status(wf: &Workflow<SqliteStore>, faculty_id: &str) -> PaperStatus {
  wf.list_assignments(&admin(), AssignmentQuery { faculty_id: Some(faculty_id.into()) })
    .await
    .unwrap()[0]
    .question_paper_status
}

// ─── Faculty directory ───────────────────────────────────────────────────────

#[tokio::test]
async fn register_and_get_faculty() {
  let wf = workflow().await;

  let profile = wf.get_faculty(&faculty("F2"), "F1").await.unwrap();
  assert_eq!(profile.full_name, "Ada Lovelace");

  let all = wf.list_faculty(&admin()).await.unwrap();
  let ids: Vec<_> = all.iter().map(|p| p.faculty_id.as_str()).collect();
  assert_eq!(ids, ["F1", "F2", "F3"]);

  let err = wf.get_faculty(&admin(), "F9").await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn profile_details_round_trip_through_storage() {
  let s = store().await;
  let details = ProfileDetails {
    email: Some("ada@example.edu".into()),
    campus: Some("north".into()),
    ..Default::default()
  };
  s.add_faculty(NewFaculty {
    faculty_id: "F7".into(),
    full_name:  "Katherine Johnson".into(),
    details:    details.clone(),
  })
  .await
  .unwrap();

  let fetched = s.get_faculty("F7").await.unwrap().unwrap();
  assert_eq!(fetched.details, details);
}

#[tokio::test]
async fn duplicate_faculty_is_a_conflict() {
  let wf = workflow().await;
  let err = wf
    .register_faculty(&admin(), NewFaculty {
      faculty_id: "F1".into(),
      full_name:  "Someone Else".into(),
      details:    ProfileDetails::default(),
    })
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn only_admins_manage_the_directory() {
  let wf = workflow().await;
  let err = wf.list_faculty(&faculty("F1")).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Forbidden);

  let err = wf
    .register_faculty(&faculty("F1"), NewFaculty {
      faculty_id: "F8".into(),
      full_name:  "New Hire".into(),
      details:    ProfileDetails::default(),
    })
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Forbidden);
}

// ─── Assignments ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_assignment_checks_the_directory() {
  let wf = workflow().await;

  let mut unknown = new_assignment("F1", "CS101", "setter");
  unknown.faculty_id = "F9".into();
  let err = wf.create_assignment(&admin(), unknown).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);

  let mut wrong_name = new_assignment("F1", "CS101", "setter");
  wrong_name.faculty_name = "Ada Byron".into();
  let err = wf.create_assignment(&admin(), wrong_name).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);

  let a = wf
    .create_assignment(&admin(), new_assignment("F1", "CS101", "setter"))
    .await
    .unwrap();
  assert_eq!(a.response, None);
  assert!(!a.is_assigned);
  assert_eq!(a.question_paper_status, PaperStatus::Pending);
  assert_eq!(a.assigned_by, "admin");
}

#[tokio::test]
async fn assignment_key_is_unique_across_role_case() {
  let wf = workflow().await;
  wf.create_assignment(&admin(), new_assignment("F1", "CS101", "Setter"))
    .await
    .unwrap();

  let err = wf
    .create_assignment(&admin(), new_assignment("F1", "CS101", " SETTER "))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);

  wf.create_assignment(&admin(), new_assignment("F1", "CS101", "scrutiny"))
    .await
    .unwrap();
  wf.create_assignment(&admin(), new_assignment("F1", "CS102", "setter"))
    .await
    .unwrap();
}

#[tokio::test]
async fn faculty_cannot_create_assignments() {
  let wf = workflow().await;
  let err = wf
    .create_assignment(&faculty("F1"), new_assignment("F1", "CS101", "setter"))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[tokio::test]
async fn list_assignments_newest_first_and_scoped_to_faculty() {
  let wf = workflow().await;
  wf.create_assignment(&admin(), new_assignment("F1", "CS101", "setter"))
    .await
    .unwrap();
  wf.create_assignment(&admin(), new_assignment("F2", "CS101", "setter"))
    .await
    .unwrap();
  wf.create_assignment(&admin(), new_assignment("F1", "CS102", "setter"))
    .await
    .unwrap();

  let all = wf.list_assignments(&admin(), AssignmentQuery::default()).await.unwrap();
  let order: Vec<_> = all
    .iter()
    .map(|a| (a.faculty_id.as_str(), a.subject_code.as_str()))
    .collect();
  assert_eq!(order, [("F1", "CS102"), ("F2", "CS101"), ("F1", "CS101")]);

  let own = wf
    .list_assignments(&faculty("F1"), AssignmentQuery::default())
    .await
    .unwrap();
  assert_eq!(own.len(), 2);
  assert!(own.iter().all(|a| a.faculty_id == "F1"));

  let err = wf
    .list_assignments(&faculty("F1"), AssignmentQuery { faculty_id: Some("F2".into()) })
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[tokio::test]
async fn remove_assignment() {
  let wf = workflow().await;
  wf.create_assignment(&admin(), new_assignment("F1", "CS101", "Setter"))
    .await
    .unwrap();

  let err = wf
    .remove_assignment(&faculty("F1"), AssignmentKey::new("F1", "CS101", "setter"))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Forbidden);

  let deleted = wf
    .remove_assignment(&admin(), AssignmentKey::new("F1", "CS101", "SETTER"))
    .await
    .unwrap();
  assert_eq!(deleted, 1);

  let err = wf
    .remove_assignment(&admin(), AssignmentKey::new("F1", "CS101", "setter"))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn removing_an_assignment_keeps_its_paper() {
  let wf = workflow().await;
  let paper_id = submitted_paper(&wf).await;

  wf.remove_assignment(&admin(), AssignmentKey::new("F1", "CS101", "setter"))
    .await
    .unwrap();

  let paper = wf.get_question_paper(&admin(), paper_id).await.unwrap();
  assert_eq!(paper.faculty_id, "F1");
}

// ─── Responses ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn pending_response_surfaces_oldest_unanswered() {
  let wf = workflow().await;
  let f1 = faculty("F1");
  assert!(wf.pending_response(&f1, None).await.unwrap().is_none());

  wf.create_assignment(&admin(), new_assignment("F1", "CS101", "setter"))
    .await
    .unwrap();
  wf.create_assignment(&admin(), new_assignment("F1", "CS102", "setter"))
    .await
    .unwrap();

  let pending = wf.pending_response(&f1, None).await.unwrap().unwrap();
  assert_eq!(pending.subject_code, "CS101");

  wf.submit_response(&f1, pending.key(), Decision::No).await.unwrap();
  let pending = wf.pending_response(&f1, None).await.unwrap().unwrap();
  assert_eq!(pending.subject_code, "CS102");

  wf.submit_response(&f1, pending.key(), Decision::Yes).await.unwrap();
  assert!(wf.pending_response(&f1, None).await.unwrap().is_none());
}

#[tokio::test]
async fn pending_response_access() {
  let wf = workflow().await;
  wf.create_assignment(&admin(), new_assignment("F2", "CS101", "setter"))
    .await
    .unwrap();

  let for_f2 = wf.pending_response(&admin(), Some("F2")).await.unwrap();
  assert!(for_f2.is_some());

  let err = wf.pending_response(&admin(), None).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);

  let err = wf.pending_response(&faculty("F1"), Some("F2")).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[tokio::test]
async fn response_is_recorded_once() {
  let wf = workflow().await;
  let f1 = faculty("F1");
  wf.create_assignment(&admin(), new_assignment("F1", "CS101", "Setter"))
    .await
    .unwrap();

  let accepted = wf
    .submit_response(&f1, AssignmentKey::new("F1", "CS101", "setter"), Decision::Yes)
    .await
    .unwrap();
  assert_eq!(accepted.response, Some(Decision::Yes));
  assert!(accepted.is_assigned);

  let err = wf
    .submit_response(&f1, AssignmentKey::new("F1", "CS101", "SETTER"), Decision::No)
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);

  let stored = &wf.list_assignments(&f1, AssignmentQuery::default()).await.unwrap()[0];
  assert_eq!(stored.response, Some(Decision::Yes));
  assert!(stored.is_assigned);
}

#[tokio::test]
async fn concurrent_responses_have_one_winner() {
  let wf = workflow().await;
  let f1 = faculty("F1");
  wf.create_assignment(&admin(), new_assignment("F1", "CS101", "setter"))
    .await
    .unwrap();
  let key = AssignmentKey::new("F1", "CS101", "setter");

  let (yes, no) = tokio::join!(
    wf.submit_response(&f1, key.clone(), Decision::Yes),
    wf.submit_response(&f1, key.clone(), Decision::No),
  );
  assert!(yes.is_ok() ^ no.is_ok());
  let loser = yes.err().or(no.err()).unwrap();
  assert_eq!(loser.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn concurrent_creates_have_one_winner() {
  let wf = workflow().await;
  let admin = admin();

  let (first, second) = tokio::join!(
    wf.create_assignment(&admin, new_assignment("F1", "CS101", "setter")),
    wf.create_assignment(&admin, new_assignment("F1", "CS101", "Setter")),
  );
  assert!(first.is_ok() ^ second.is_ok());
  let loser = first.err().or(second.err()).unwrap();
  assert_eq!(loser.kind(), ErrorKind::Conflict);

  let all = wf.list_assignments(&admin, AssignmentQuery::default()).await.unwrap();
  assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn response_access_rules() {
  let wf = workflow().await;
  wf.create_assignment(&admin(), new_assignment("F1", "CS101", "setter"))
    .await
    .unwrap();
  let key = AssignmentKey::new("F1", "CS101", "setter");

  let err = wf
    .submit_response(&faculty("F2"), key.clone(), Decision::Yes)
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Forbidden);

  let err = wf.submit_response(&admin(), key, Decision::Yes).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Forbidden);

  let err = wf
    .submit_response(&faculty("F1"), AssignmentKey::new("F1", "CS999", "setter"), Decision::Yes)
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ─── Question papers ─────────────────────────────────────────────────────────

#[tokio::test]
async fn submission_requires_an_accepted_assignment() {
  let wf = workflow().await;
  let f1 = faculty("F1");

  let err = wf
    .submit_question_paper(&f1, new_paper("F1", "CS101", "setter"))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);

  wf.create_assignment(&admin(), new_assignment("F1", "CS101", "setter"))
    .await
    .unwrap();
  let err = wf
    .submit_question_paper(&f1, new_paper("F1", "CS101", "setter"))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);

  assert!(wf.list_question_papers(&admin()).await.unwrap().is_empty());
  assert_eq!(assignment_status(&wf, "F1").await, PaperStatus::Pending);
}

#[tokio::test]
async fn submission_marks_assignment_across_role_case() {
  let wf = workflow().await;
  let f1 = faculty("F1");
  wf.create_assignment(&admin(), new_assignment("F1", "CS101", "Setter"))
    .await
    .unwrap();
  wf.submit_response(&f1, AssignmentKey::new("F1", "CS101", "Setter"), Decision::Yes)
    .await
    .unwrap();

  let paper = wf
    .submit_question_paper(&f1, new_paper("F1", "CS101", "SETTER"))
    .await
    .unwrap();
  assert_eq!(paper.scrutiny_request_status, RequestStatus::Pending);
  assert_eq!(paper.scrutiny_status, ScrutinyStatus::Pending);
  assert_eq!(assignment_status(&wf, "F1").await, PaperStatus::Submitted);

  let err = wf
    .submit_question_paper(&f1, new_paper("F1", "CS101", "setter"))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn submission_takes_faculty_from_caller() {
  let wf = workflow().await;
  wf.create_assignment(&admin(), new_assignment("F1", "CS101", "setter"))
    .await
    .unwrap();
  wf.submit_response(&faculty("F1"), AssignmentKey::new("F1", "CS101", "setter"), Decision::Yes)
    .await
    .unwrap();

  let err = wf
    .submit_question_paper(&faculty("F2"), new_paper("F1", "CS101", "setter"))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Forbidden);

  let paper = wf
    .submit_question_paper(&faculty("F1"), new_paper("", "CS101", "setter"))
    .await
    .unwrap();
  assert_eq!(paper.faculty_id, "F1");
}

#[tokio::test]
async fn stored_paper_round_trips() {
  let wf = workflow().await;
  let id = submitted_paper(&wf).await;

  let paper = wf.get_question_paper(&faculty("F1"), id).await.unwrap();
  assert_eq!(paper.part_a.len(), 10);
  assert_eq!(paper.part_b.len(), 8);
  assert_eq!(paper.part_c, ["Design a compiler.", "Prove termination."]);
  assert_eq!(paper.metadata.max_marks, "100");
  assert_eq!(paper.role.as_str(), "Setter");
  assert!(paper.scrutinizer_id.is_none());

  let assignment = &wf
    .list_assignments(&admin(), AssignmentQuery::default())
    .await
    .unwrap()[0];
  assert_eq!(paper.assignment_id, assignment.id);
}

#[tokio::test]
async fn paper_visibility() {
  let wf = workflow().await;
  let id = submitted_paper(&wf).await;

  let err = wf.get_question_paper(&faculty("F2"), id).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Forbidden);

  wf.assign_scrutinizer(&admin(), id, scrutinizer("F2")).await.unwrap();
  wf.get_question_paper(&faculty("F2"), id).await.unwrap();

  let err = wf.render_question_paper(&faculty("F3"), id).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Forbidden);

  let err = wf.get_question_paper(&admin(), Uuid::new_v4()).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);

  assert!(wf.list_question_papers(&faculty("F2")).await.unwrap().is_empty());
  assert_eq!(wf.list_question_papers(&faculty("F1")).await.unwrap().len(), 1);
  assert_eq!(wf.list_question_papers(&admin()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn rendered_document_has_all_sections() {
  let wf = workflow().await;
  let id = submitted_paper(&wf).await;

  let doc = wf.render_question_paper(&faculty("F1"), id).await.unwrap();
  assert!(doc.contains("END SEMESTER EXAMINATION"));
  assert!(doc.contains("PART A"));
  assert!(doc.contains("PART C"));
  assert!(doc.contains("20. Prove termination."));
}

// ─── Scrutiny ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn full_scrutiny_scenario() {
  let wf = workflow().await;
  let id = submitted_paper(&wf).await;
  let f2 = faculty("F2");

  let paper = wf.assign_scrutinizer(&admin(), id, scrutinizer("F2")).await.unwrap();
  assert_eq!(paper.scrutinizer_id.as_deref(), Some("F2"));
  assert_eq!(paper.scrutinizer_name.as_deref(), Some("Alan Turing"));
  assert_eq!(paper.scrutiny_request_status, RequestStatus::Pending);

  let requests = wf.pending_scrutiny_requests(&f2).await.unwrap();
  assert_eq!(requests.len(), 1);
  assert!(wf.assigned_scrutiny_work(&f2).await.unwrap().is_empty());

  wf.respond_to_scrutiny_request(&f2, id, RequestResponse::Accepted)
    .await
    .unwrap();
  assert!(wf.pending_scrutiny_requests(&f2).await.unwrap().is_empty());
  assert_eq!(wf.assigned_scrutiny_work(&f2).await.unwrap().len(), 1);

  let judged = wf
    .submit_scrutiny_verdict(&f2, id, "Well balanced.".into(), Verdict::Approved)
    .await
    .unwrap();
  assert_eq!(judged.scrutiny_status, ScrutinyStatus::Approved);
  assert_eq!(judged.scrutiny_remarks.as_deref(), Some("Well balanced."));
  assert!(wf.assigned_scrutiny_work(&f2).await.unwrap().is_empty());
  assert_eq!(assignment_status(&wf, "F1").await, PaperStatus::Approved);

  let err = wf
    .submit_scrutiny_verdict(&f2, id, "Second thoughts.".into(), Verdict::Rejected)
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);

  let stored = wf.get_question_paper(&admin(), id).await.unwrap();
  assert_eq!(stored.scrutiny_status, ScrutinyStatus::Approved);
  assert_eq!(stored.scrutiny_remarks.as_deref(), Some("Well balanced."));
}

#[tokio::test]
async fn rejected_verdict_marks_assignment_rejected() {
  let wf = workflow().await;
  let id = submitted_paper(&wf).await;
  let f2 = faculty("F2");
  wf.assign_scrutinizer(&admin(), id, scrutinizer("F2")).await.unwrap();
  wf.respond_to_scrutiny_request(&f2, id, RequestResponse::Accepted)
    .await
    .unwrap();
  wf.submit_scrutiny_verdict(&f2, id, "Part C is too long.".into(), Verdict::Rejected)
    .await
    .unwrap();
  assert_eq!(assignment_status(&wf, "F1").await, PaperStatus::Rejected);
}

#[tokio::test]
async fn scrutinizer_assignment_rules() {
  let wf = workflow().await;
  let id = submitted_paper(&wf).await;

  let err = wf
    .assign_scrutinizer(&faculty("F2"), id, scrutinizer("F2"))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Forbidden);

  let err = wf.assign_scrutinizer(&admin(), id, scrutinizer("F1")).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);

  let mut wrong_name = scrutinizer("F2");
  wrong_name.scrutinizer_name = "Alan".into();
  let err = wf.assign_scrutinizer(&admin(), id, wrong_name).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);

  let err = wf
    .assign_scrutinizer(&admin(), Uuid::new_v4(), scrutinizer("F2"))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn declined_request_can_be_reassigned() {
  let wf = workflow().await;
  let id = submitted_paper(&wf).await;

  wf.assign_scrutinizer(&admin(), id, scrutinizer("F2")).await.unwrap();
  wf.respond_to_scrutiny_request(&faculty("F2"), id, RequestResponse::Rejected)
    .await
    .unwrap();

  let err = wf
    .submit_scrutiny_verdict(&faculty("F2"), id, "x".into(), Verdict::Approved)
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);

  let paper = wf.assign_scrutinizer(&admin(), id, scrutinizer("F3")).await.unwrap();
  assert_eq!(paper.scrutinizer_id.as_deref(), Some("F3"));
  assert_eq!(paper.scrutiny_request_status, RequestStatus::Pending);

  let err = wf
    .respond_to_scrutiny_request(&faculty("F2"), id, RequestResponse::Accepted)
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[tokio::test]
async fn accepted_request_is_final() {
  let wf = workflow().await;
  let id = submitted_paper(&wf).await;
  let f2 = faculty("F2");

  wf.assign_scrutinizer(&admin(), id, scrutinizer("F2")).await.unwrap();

  let err = wf
    .submit_scrutiny_verdict(&f2, id, "too early".into(), Verdict::Approved)
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);

  wf.respond_to_scrutiny_request(&f2, id, RequestResponse::Accepted)
    .await
    .unwrap();

  let err = wf
    .respond_to_scrutiny_request(&f2, id, RequestResponse::Rejected)
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);

  let err = wf.assign_scrutinizer(&admin(), id, scrutinizer("F3")).await.unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);

  let err = wf
    .submit_scrutiny_verdict(&faculty("F3"), id, "not mine".into(), Verdict::Approved)
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Forbidden);
}

#[tokio::test]
async fn verdict_requires_remarks() {
  let wf = workflow().await;
  let id = submitted_paper(&wf).await;
  let f2 = faculty("F2");
  wf.assign_scrutinizer(&admin(), id, scrutinizer("F2")).await.unwrap();
  wf.respond_to_scrutiny_request(&f2, id, RequestResponse::Accepted)
    .await
    .unwrap();

  let err = wf
    .submit_scrutiny_verdict(&f2, id, "   ".into(), Verdict::Approved)
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Validation);

  let stored = wf.get_question_paper(&f2, id).await.unwrap();
  assert_eq!(stored.scrutiny_status, ScrutinyStatus::Pending);
}

#[tokio::test]
async fn list_papers_filters_compose() {
  let (wf, s) = workflow_and_store().await;
  let id = submitted_paper(&wf).await;
  wf.assign_scrutinizer(&admin(), id, scrutinizer("F2")).await.unwrap();

  let hits = s
    .list_papers(PaperQuery {
      scrutinizer_id: Some("F2".into()),
      scrutiny_request_status: Some(RequestStatus::Pending),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(hits.len(), 1);

  let misses = s
    .list_papers(PaperQuery {
      scrutinizer_id: Some("F2".into()),
      scrutiny_status: Some(ScrutinyStatus::Approved),
      ..Default::default()
    })
    .await
    .unwrap();
  assert!(misses.is_empty());
}

// ─── Repair ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn reconcile_repairs_stale_status_of_accepted_assignment() {
  let (wf, s) = workflow_and_store().await;
  submitted_paper(&wf).await;
  assert_eq!(wf.reconcile().await.unwrap(), 0);

  s.execute_raw("UPDATE assignments SET question_paper_status = 'pending', response = NULL")
    .await
    .unwrap();
  assert_eq!(wf.reconcile().await.unwrap(), 0);

  s.execute_raw("UPDATE assignments SET response = 'yes'").await.unwrap();
  assert_eq!(wf.reconcile().await.unwrap(), 1);
  assert_eq!(assignment_status(&wf, "F1").await, PaperStatus::Submitted);
  assert_eq!(wf.reconcile().await.unwrap(), 0);
}

#[tokio::test]
async fn reissued_assignment_is_not_tied_to_the_old_paper() {
  let wf = workflow().await;
  let old_paper = submitted_paper(&wf).await;

  let key = AssignmentKey::new("F1", "CS101", "setter");
  wf.remove_assignment(&admin(), key.clone()).await.unwrap();
  wf.create_assignment(&admin(), new_assignment("F1", "CS101", "setter"))
    .await
    .unwrap();

  assert_eq!(wf.reconcile().await.unwrap(), 0);
  assert_eq!(assignment_status(&wf, "F1").await, PaperStatus::Pending);

  let declined = wf
    .submit_response(&faculty("F1"), key, Decision::No)
    .await
    .unwrap();
  assert!(!declined.is_assigned);
  assert_eq!(declined.question_paper_status, PaperStatus::Pending);

  let f2 = faculty("F2");
  wf.assign_scrutinizer(&admin(), old_paper, scrutinizer("F2")).await.unwrap();
  wf.respond_to_scrutiny_request(&f2, old_paper, RequestResponse::Accepted)
    .await
    .unwrap();
  let judged = wf
    .submit_scrutiny_verdict(&f2, old_paper, "Well balanced.".into(), Verdict::Approved)
    .await
    .unwrap();
  assert_eq!(judged.scrutiny_status, ScrutinyStatus::Approved);
  assert_eq!(assignment_status(&wf, "F1").await, PaperStatus::Pending);
}

#[tokio::test]
async fn reissued_assignment_accepts_a_new_paper() {
  let wf = workflow().await;
  let f1 = faculty("F1");
  let old_paper = submitted_paper(&wf).await;

  let key = AssignmentKey::new("F1", "CS101", "setter");
  wf.remove_assignment(&admin(), key.clone()).await.unwrap();
  let reissued = wf
    .create_assignment(&admin(), new_assignment("F1", "CS101", "setter"))
    .await
    .unwrap();
  wf.submit_response(&f1, key, Decision::Yes).await.unwrap();

  let paper = wf
    .submit_question_paper(&f1, new_paper("F1", "CS101", "setter"))
    .await
    .unwrap();
  assert_ne!(paper.id, old_paper);
  assert_eq!(paper.assignment_id, reissued.id);
  assert_eq!(assignment_status(&wf, "F1").await, PaperStatus::Submitted);

  let err = wf
    .submit_question_paper(&f1, new_paper("F1", "CS101", "setter"))
    .await
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Conflict);

  assert_eq!(wf.list_question_papers(&f1).await.unwrap().len(), 2);
}
