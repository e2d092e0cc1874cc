//! End-to-end tests for the form routes against the in-memory store

use bson::DateTime;
use bytes::Bytes;
use clap::Parser;
use http_body_util::BodyExt;
use hyper::{Method, Response, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;

use std::time::Duration;

use engagement_intake::config::Args;
use engagement_intake::db::schemas::{EngagementUpdate, SchoolSettingsDoc, TeacherDoc};
use engagement_intake::routes::{self, FullBody};
use engagement_intake::server::AppState;
use engagement_intake::store::{EngagementStore, MemoryStore, TeacherRef};
use engagement_intake::submission::{MISSING_TOKEN, SAVE_FAILED};
use engagement_intake::IntakeError;

const TOKEN: &str = "school-token";

struct Fixture {
    store: Arc<MemoryStore>,
    state: AppState,
    teacher_id: String,
}

async fn school_fixture(extra_args: &[&str]) -> Fixture {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_school(SchoolSettingsDoc::new("school-1".into(), Some(TOKEN.into())))
        .await;
    let teacher_id = store
        .create_teacher("school-1", "Noa", DateTime::from_millis(1_000))
        .await
        .unwrap();

    let mut argv = vec!["engagement-intake"];
    argv.extend_from_slice(extra_args);
    let state = AppState::new(Args::parse_from(argv), store.clone());

    Fixture {
        store,
        state,
        teacher_id,
    }
}

async fn body_json(response: Response<FullBody>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn submit(state: &AppState, body: Value) -> Response<FullBody> {
    routes::handle_submit(state, &Method::POST, Bytes::from(body.to_string())).await
}

#[tokio::test]
async fn submit_stores_scores_on_teacher() {
    let fx = school_fixture(&[]).await;

    let response = submit(
        &fx.state,
        json!({
            "token": TOKEN,
            "teacherId": fx.teacher_id,
            "itemScores": {"q1": 1, "q2": 6, "q4": "5", "q7": 0},
            "itemNotes": {"q1": "no desk"},
            "motivationStyles": ["autonomy"],
            "roles": "a, b ,c",
            "engagementNote": "  steady  "
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"success": true}));

    let stored = fx.store.teacher(&fx.teacher_id).await.unwrap();
    assert_eq!(stored.engagement_domain_scores["basic_needs"], 4);
    assert_eq!(stored.engagement_domain_scores["individual_contribution"], 5);
    assert!(!stored.engagement_domain_scores.contains_key("team_belonging"));
    assert!(!stored.engagement_item_scores.contains_key("q7"));
    assert_eq!(stored.roles, vec!["a", "b", "c"]);
    assert_eq!(stored.motivation_styles, vec!["autonomy"]);
    assert_eq!(stored.engagement_note.as_deref(), Some("steady"));
    assert_eq!(stored.engagement_item_notes.get_str("q1").unwrap(), "no desk");
}

#[tokio::test]
async fn second_submission_replaces_first() {
    let fx = school_fixture(&[]).await;

    submit(
        &fx.state,
        json!({
            "token": TOKEN,
            "teacherId": fx.teacher_id,
            "itemScores": {"q1": 2, "q11": 6},
            "roles": ["homeroom"],
            "engagementNote": "first"
        }),
    )
    .await;

    let response = submit(
        &fx.state,
        json!({
            "token": TOKEN,
            "teacherId": fx.teacher_id,
            "itemScores": {"q5": 4}
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let stored = fx.store.teacher(&fx.teacher_id).await.unwrap();
    assert_eq!(stored.engagement_item_scores.len(), 1);
    assert_eq!(stored.engagement_item_scores["q5"], 4);
    assert_eq!(stored.engagement_domain_scores.len(), 1);
    assert_eq!(stored.engagement_domain_scores["team_belonging"], 4);
    assert!(stored.roles.is_empty());
    assert_eq!(stored.engagement_note, None);
}

#[tokio::test]
async fn validation_failures_are_400() {
    let fx = school_fixture(&[]).await;

    for body in [
        json!({"itemScores": {"q1": 3}}),
        json!({"token": TOKEN}),
        json!({"token": TOKEN, "itemScores": {"q1": 3}}),
        json!({"token": TOKEN, "teacherName": "   ", "itemScores": {"q1": 3}}),
    ] {
        let response = submit(&fx.state, body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());
    }

    assert_eq!(fx.store.teacher_count().await, 1);
}

#[tokio::test]
async fn malformed_body_is_400() {
    let fx = school_fixture(&[]).await;

    for raw in ["{not json", "[1, 2]", "\"text\""] {
        let response =
            routes::handle_submit(&fx.state, &Method::POST, Bytes::from(raw)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"],
            json!(routes::INVALID_BODY)
        );
    }
}

#[tokio::test]
async fn unknown_token_is_404_and_creates_nothing() {
    let fx = school_fixture(&[]).await;

    let response = submit(
        &fx.state,
        json!({
            "token": "stale-link",
            "teacherName": "New Person",
            "itemScores": {"q1": 5}
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(fx.store.teacher_count().await, 1);
    let untouched = fx.store.teacher(&fx.teacher_id).await.unwrap();
    assert!(untouched.engagement_item_scores.is_empty());
}

#[tokio::test]
async fn wrong_method_is_405() {
    let fx = school_fixture(&[]).await;

    let response = routes::handle_submit(&fx.state, &Method::GET, Bytes::new()).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    let response =
        routes::handle_list_teachers(&fx.state, &Method::DELETE, None, Bytes::new()).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn self_identified_teacher_appears_in_listing() {
    let fx = school_fixture(&[]).await;

    let response = submit(
        &fx.state,
        json!({
            "token": TOKEN,
            "teacherName": "  Yael  ",
            "itemScores": {"q9": 3}
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let query = format!("token={}", TOKEN);
    let response =
        routes::handle_list_teachers(&fx.state, &Method::GET, Some(&query), Bytes::new()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let names: Vec<&str> = body["teachers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Noa", "Yael"]);
}

#[tokio::test]
async fn listing_accepts_token_in_body() {
    let fx = school_fixture(&[]).await;

    let response = routes::handle_list_teachers(
        &fx.state,
        &Method::POST,
        None,
        Bytes::from(json!({"token": format!(" {} ", TOKEN)}).to_string()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"teachers": [{"id": fx.teacher_id, "name": "Noa"}]})
    );
}

#[tokio::test]
async fn listing_errors() {
    let fx = school_fixture(&[]).await;

    let response =
        routes::handle_list_teachers(&fx.state, &Method::GET, None, Bytes::new()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({"error": MISSING_TOKEN}));

    let response = routes::handle_list_teachers(
        &fx.state,
        &Method::GET,
        Some("token=unknown"),
        Bytes::new(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn teacher_mode_writes_token_owner() {
    let store = Arc::new(MemoryStore::new());
    let mut teacher = TeacherDoc::new("school-2".into(), "Avi".into(), DateTime::now());
    teacher.form_token = Some("personal-link".into());
    let teacher_id = store.insert_teacher(teacher).await;
    let state = AppState::new(
        Args::parse_from(["engagement-intake", "--token-mode", "teacher"]),
        store.clone(),
    );

    let response = submit(
        &state,
        json!({"token": "personal-link", "itemScores": {"q11": 6, "q12": 5}}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let stored = store.teacher(&teacher_id).await.unwrap();
    assert_eq!(stored.engagement_domain_scores["personal_growth"], 6);
    assert_eq!(store.teacher_count().await, 1);

    let response = routes::handle_list_teachers(
        &state,
        &Method::GET,
        Some("token=personal-link"),
        Bytes::new(),
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["teachers"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn health_reports_memory_backend() {
    let fx = school_fixture(&["--dev-mode"]).await;
    let response = routes::health_check(&fx.state);
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["healthy"], json!(true));
    assert_eq!(body["store"], json!("memory"));
    assert_eq!(body["mode"], json!("development"));
}

/// Reads from an in-memory store; writes fail or reads stall on demand
struct FaultyStore {
    inner: Arc<MemoryStore>,
    fail_writes: bool,
    read_delay: Option<Duration>,
}

#[async_trait::async_trait]
impl EngagementStore for FaultyStore {
    async fn find_schools_by_token(&self, token: &str) -> engagement_intake::Result<Vec<String>> {
        if let Some(delay) = self.read_delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.find_schools_by_token(token).await
    }

    async fn find_teachers_by_token(
        &self,
        token: &str,
    ) -> engagement_intake::Result<Vec<TeacherRef>> {
        self.inner.find_teachers_by_token(token).await
    }

    async fn create_teacher(
        &self,
        school_id: &str,
        name: &str,
        created_at: DateTime,
    ) -> engagement_intake::Result<String> {
        if self.fail_writes {
            return Err(IntakeError::Database("connection reset by mongo-7".into()));
        }
        self.inner.create_teacher(school_id, name, created_at).await
    }

    async fn get_teacher(
        &self,
        school_id: &str,
        teacher_id: &str,
    ) -> engagement_intake::Result<Option<TeacherDoc>> {
        self.inner.get_teacher(school_id, teacher_id).await
    }

    async fn update_engagement(
        &self,
        school_id: &str,
        teacher_id: &str,
        update: &EngagementUpdate,
    ) -> engagement_intake::Result<bool> {
        if self.fail_writes {
            return Err(IntakeError::Database("connection reset by mongo-7".into()));
        }
        self.inner.update_engagement(school_id, teacher_id, update).await
    }

    async fn list_teachers(&self, school_id: &str) -> engagement_intake::Result<Vec<TeacherDoc>> {
        self.inner.list_teachers(school_id).await
    }

    fn backend(&self) -> &'static str {
        "faulty"
    }
}

async fn faulty_fixture(
    fail_writes: bool,
    read_delay: Option<Duration>,
    extra_args: &[&str],
) -> Fixture {
    let fx = school_fixture(&[]).await;
    let store = FaultyStore {
        inner: fx.store.clone(),
        fail_writes,
        read_delay,
    };

    let mut argv = vec!["engagement-intake"];
    argv.extend_from_slice(extra_args);
    Fixture {
        state: AppState::new(Args::parse_from(argv), Arc::new(store)),
        ..fx
    }
}

#[tokio::test]
async fn store_failure_returns_generic_message() {
    let fx = faulty_fixture(true, None, &[]).await;

    let response = submit(
        &fx.state,
        json!({
            "token": TOKEN,
            "teacherId": fx.teacher_id,
            "itemScores": {"q1": 5}
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await, json!({"error": SAVE_FAILED}));

    let untouched = fx.store.teacher(&fx.teacher_id).await.unwrap();
    assert!(untouched.engagement_item_scores.is_empty());
    assert!(untouched.engagement_domain_scores.is_empty());
}

#[tokio::test]
async fn store_failure_creating_teacher_returns_generic_message() {
    let fx = faulty_fixture(true, None, &[]).await;

    let response = submit(
        &fx.state,
        json!({"token": TOKEN, "teacherName": "Dana", "itemScores": {"q1": 5}}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await, json!({"error": SAVE_FAILED}));
    assert_eq!(fx.store.teacher_count().await, 1);
}

#[tokio::test]
async fn timeout_returns_generic_message() {
    let fx = faulty_fixture(
        false,
        Some(Duration::from_millis(500)),
        &["--request-timeout-ms", "20"],
    )
    .await;

    let response = submit(
        &fx.state,
        json!({
            "token": TOKEN,
            "teacherId": fx.teacher_id,
            "itemScores": {"q1": 5}
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await, json!({"error": SAVE_FAILED}));

    let untouched = fx.store.teacher(&fx.teacher_id).await.unwrap();
    assert!(untouched.engagement_item_scores.is_empty());
}
