//! HttpSource against a stub backend.
//!
//! Starts an axum server on an ephemeral port and drives it through the controllers.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tutor_views::domain::course::{self, Course, CourseActions, CourseFilter, NewCourse};
use tutor_views::domain::tutor_request::{self, RequestFilter, APPROVE};
use tutor_views::list::{NoSort, PendingFirst};
use tutor_views::{
    ClientConfig, ControllerError, DataSource, Endpoints, HttpSource, ListController,
    MutationController, Submission,
};

use crate::support::{course, request};

type Db = Arc<Mutex<Vec<Course>>>;

async fn list_courses(State(db): State<Db>) -> Json<Vec<Course>> {
    Json(db.lock().unwrap().clone())
}

async fn add_course(
    State(db): State<Db>,
    Json(draft): Json<NewCourse>,
) -> Result<Json<Course>, (StatusCode, Json<Value>)> {
    let mut courses = db.lock().unwrap();
    let exists = courses.iter().any(|c| {
        c.department_code == draft.department_code && c.course_number == draft.course_number
    });
    if exists {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "Course already exists" })),
        ));
    }
    let created = Course {
        course_id: courses.len() as i64 + 1,
        department_code: draft.department_code,
        course_number: draft.course_number,
        title: draft.title,
        is_active: true,
    };
    courses.push(created.clone());
    Ok(Json(created))
}

async fn deactivate_course(
    State(db): State<Db>,
    Path(id): Path<i64>,
) -> Result<Json<Course>, StatusCode> {
    let mut courses = db.lock().unwrap();
    let course = courses
        .iter_mut()
        .find(|c| c.course_id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    course.is_active = false;
    Ok(Json(course.clone()))
}

fn course_backend(courses: Vec<Course>) -> Router {
    Router::new()
        .route(course::LIST_PATH, get(list_courses))
        .route(course::CREATE_PATH, post(add_course))
        .route("/api/admin/deactivate/:id", patch(deactivate_course))
        .with_state(Arc::new(Mutex::new(courses)))
}

/// Bind to port 0 and return the base URL.
async fn start_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn config(base: &str) -> ClientConfig {
    ClientConfig::default().with_base_url(base)
}

#[tokio::test]
async fn course_catalog_round_trip() {
    let courses = vec![course(1, "CSC", "415", "Operating Systems")];
    let base = start_server(course_backend(courses)).await;
    let source = course::http_source(&config(&base)).unwrap();
    let list = Arc::new(ListController::with_view(source, CourseFilter::default(), NoSort));
    let actions: CourseActions<_> =
        MutationController::new(Arc::clone(&list), config(&base).message_ttl);

    assert_eq!(list.load().await.unwrap(), 1);

    let draft = NewCourse {
        department_code: "CSC".into(),
        course_number: "648".into(),
        title: "Software Engineering".into(),
    };
    let created = actions.submit_create(&draft).await.unwrap().applied().unwrap();
    assert_eq!(created.course_id, 2);

    let err = actions.submit_create(&draft).await.unwrap_err();
    assert_eq!(err, ControllerError::ServerRejection("Course already exists".into()));
    assert_eq!(actions.message().unwrap().text, "Course already exists");

    let yes = |_: &str| true;
    let updated = actions
        .submit_transition(&1, course::DEACTIVATE, &yes)
        .await
        .unwrap()
        .applied()
        .unwrap();
    assert!(!updated.is_active);

    // the local copy matches what a fresh load returns
    let local = list.records();
    list.load().await.unwrap();
    assert_eq!(list.records(), local);
}

#[tokio::test]
async fn padded_draft_reaches_the_backend_trimmed() {
    let base = start_server(course_backend(Vec::new())).await;
    let list = Arc::new(ListController::with_view(
        course::http_source(&config(&base)).unwrap(),
        CourseFilter::default(),
        NoSort,
    ));
    let actions = MutationController::new(Arc::clone(&list), config(&base).message_ttl);

    let padded = NewCourse {
        department_code: format!("CSC{}", " ".repeat(10)),
        course_number: " 648 ".into(),
        title: "Software Engineering ".into(),
    };
    let created = actions
        .submit_create(&padded)
        .await
        .unwrap()
        .applied()
        .unwrap();

    assert_eq!(created.department_code, "CSC");
    assert_eq!(created.course_number, "648");
    assert_eq!(created.title, "Software Engineering");
}

#[tokio::test]
async fn unknown_record_uses_fallback_message() {
    let base = start_server(course_backend(Vec::new())).await;
    let list = Arc::new(ListController::with_view(
        course::http_source(&config(&base)).unwrap(),
        CourseFilter::default(),
        NoSort,
    ));
    let actions = MutationController::new(Arc::clone(&list), config(&base).message_ttl);

    let err = actions
        .submit_transition(&42, course::DEACTIVATE, &|_: &str| true)
        .await
        .unwrap_err();
    assert_eq!(err, ControllerError::ServerRejection("Failed to deactivate course".into()));
}

#[tokio::test]
async fn non_array_list_reads_as_empty() {
    let app = Router::new().route("/courses", get(|| async { Json(json!({ "courses": [] })) }));
    let base = start_server(app).await;
    let source: HttpSource<Course> =
        HttpSource::new(&config(&base), Endpoints::read_only("/courses")).unwrap();

    assert!(source.fetch_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_backend_is_a_network_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let list = ListController::new(course::http_source(&config(&base)).unwrap());
    let err = list.load().await.unwrap_err();

    assert!(matches!(err, ControllerError::NetworkFailure(_)));
    assert!(list.error().is_some());
    assert!(list.records().is_empty());
}

#[tokio::test]
async fn approve_request_over_patch() {
    let app = Router::new()
        .route(
            tutor_request::LIST_PATH,
            get(|| async { Json(vec![request(5, "pending", "2024-03-01T10:00:00")]) }),
        )
        .route(
            "/api/admin/tutor-course-request/:id/:action",
            patch(|Path((id, action)): Path<(i64, String)>| async move {
                let mut updated = request(id, "pending", "2024-03-01T10:00:00");
                updated.status = format!("{action}d");
                Json(updated)
            }),
        );
    let base = start_server(app).await;

    let list = Arc::new(ListController::with_view(
        tutor_request::http_source(&config(&base)).unwrap(),
        RequestFilter::default(),
        PendingFirst::default(),
    ));
    list.load().await.unwrap();
    let actions = MutationController::new(Arc::clone(&list), config(&base).message_ttl);

    let outcome = actions
        .submit_transition(&5, APPROVE, &|_: &str| true)
        .await
        .unwrap();
    let Submission::Applied(updated) = outcome else {
        panic!("expected the transition to apply");
    };
    assert_eq!(updated.status, "approved");
    assert_eq!(list.records(), vec![updated]);
}
