//! Load lifecycle and view transforms through the public API.

use std::sync::Arc;

use tutor_views::domain::course::{self, Course, CourseCatalog, CourseFilter, NewCourse};
use tutor_views::domain::tutor_request::{
    self, RequestFilter, RequestQueue, TutorCourseRequest, APPROVED, PENDING, REJECTED,
};
use tutor_views::list::{Choice, NoSort, PendingFirst, TextQuery, Tristate};
use tutor_views::{CollectionState, InMemorySource, ListController, SourceError};

use crate::support::{course, request, wait_until, ScriptedSource};

type Source = ScriptedSource<Course, NewCourse>;

fn catalog(courses: Vec<Course>) -> Arc<CourseCatalog<Source>> {
    Arc::new(ListController::with_view(
        ScriptedSource::new(course::stub_source(courses)),
        CourseFilter::default(),
        NoSort,
    ))
}

fn sample() -> Vec<Course> {
    vec![
        course(1, "CSC", "415", "Operating Systems"),
        course(2, "BIOL", "101", "General Biology"),
        course(3, "CSC", "510", "Analysis of Algorithms"),
    ]
}

fn ids(courses: &[Course]) -> Vec<i64> {
    courses.iter().map(|c| c.course_id).collect()
}

#[tokio::test]
async fn load_moves_from_idle_to_loaded() {
    let catalog = catalog(sample());
    assert_eq!(catalog.state(), CollectionState::Idle);
    assert!(catalog.visible().is_empty());

    let count = catalog.load().await.unwrap();
    assert_eq!(count, 3);
    assert!(!catalog.is_loading());
    assert_eq!(ids(&catalog.records()), vec![1, 2, 3]);
}

#[tokio::test]
async fn loading_keeps_previous_records_visible() {
    let catalog = catalog(sample());
    catalog.load().await.unwrap();

    let reply = catalog.source().script_fetch();
    let task = tokio::spawn({
        let catalog = Arc::clone(&catalog);
        async move { catalog.load().await }
    });
    wait_until(|| catalog.source().fetches() == 2).await;

    assert!(catalog.is_loading());
    assert_eq!(ids(&catalog.visible()), vec![1, 2, 3]);

    reply.send(Ok(vec![course(9, "MATH", "226", "Calculus II")])).unwrap();
    assert_eq!(task.await.unwrap().unwrap(), 1);
    assert_eq!(ids(&catalog.records()), vec![9]);
}

#[tokio::test]
async fn failed_load_clears_records_and_keeps_message() {
    let catalog = catalog(sample());
    catalog.load().await.unwrap();

    catalog
        .source()
        .fail_next(SourceError::Network("connection refused".into()));
    let err = catalog.load().await.unwrap_err();

    assert_eq!(catalog.state(), CollectionState::Failed(err.user_message()));
    assert_eq!(catalog.error().as_deref(), Some("network error: connection refused"));
    assert!(catalog.records().is_empty());
    assert!(catalog.visible().is_empty());

    catalog.load().await.unwrap();
    assert_eq!(catalog.error(), None);
    assert_eq!(catalog.records().len(), 3);
}

#[tokio::test]
async fn rejected_load_uses_backend_text() {
    let catalog = catalog(sample());
    catalog.source().fail_next(SourceError::Rejected {
        status: Some(500),
        message: "Failed to fetch courses".into(),
    });
    catalog.load().await.unwrap_err();
    assert_eq!(catalog.error().as_deref(), Some("Failed to fetch courses"));
}

#[tokio::test]
async fn last_arriving_response_wins() {
    let catalog = catalog(Vec::new());
    let first = catalog.source().script_fetch();
    let second = catalog.source().script_fetch();

    let a = tokio::spawn({
        let catalog = Arc::clone(&catalog);
        async move { catalog.load().await }
    });
    wait_until(|| catalog.source().fetches() == 1).await;
    let b = tokio::spawn({
        let catalog = Arc::clone(&catalog);
        async move { catalog.load().await }
    });
    wait_until(|| catalog.source().fetches() == 2).await;

    // the later request answers first
    second.send(Ok(vec![course(2, "BIOL", "101", "General Biology")])).unwrap();
    b.await.unwrap().unwrap();
    assert_eq!(ids(&catalog.records()), vec![2]);

    first.send(Ok(vec![course(1, "CSC", "415", "Operating Systems")])).unwrap();
    a.await.unwrap().unwrap();
    assert_eq!(ids(&catalog.records()), vec![1]);
    assert!(!catalog.is_loading());
}

#[tokio::test]
async fn filters_combine_and_reapplying_is_stable() {
    let catalog = catalog(sample());
    catalog.load().await.unwrap();

    catalog.set_filter(CourseFilter {
        query: TextQuery::new("OPERATING"),
        department: Choice::Only("CSC".into()),
        status: Tristate::TrueOnly,
    });
    let once = catalog.visible();
    assert_eq!(ids(&once), vec![1]);

    catalog.set_filter(catalog.filter());
    assert_eq!(catalog.visible(), once);

    catalog.update_filter(|f| f.query = TextQuery::new(""));
    assert_eq!(ids(&catalog.visible()), vec![1, 3]);

    // view changes never touch the stored records
    assert_eq!(ids(&catalog.records()), vec![1, 2, 3]);
}

#[tokio::test]
async fn department_options_are_distinct_and_sorted() {
    let catalog = catalog(sample());
    catalog.load().await.unwrap();
    assert_eq!(catalog.distinct_values(course::department), vec!["BIOL", "CSC"]);
}

type RequestSource = InMemorySource<TutorCourseRequest, tutor_request::NewTutorCourseRequest>;

fn queue(requests: Vec<TutorCourseRequest>) -> RequestQueue<RequestSource> {
    ListController::with_view(
        tutor_request::stub_source(requests),
        RequestFilter::default(),
        PendingFirst::default(),
    )
}

fn request_ids(requests: &[TutorCourseRequest]) -> Vec<i64> {
    requests.iter().map(|r| r.request_id).collect()
}

#[tokio::test]
async fn pending_requests_come_first() {
    let queue = queue(vec![
        request(1, PENDING, "2024-01-01"),
        request(2, APPROVED, "2024-06-01"),
    ]);
    queue.load().await.unwrap();
    assert_eq!(request_ids(&queue.visible()), vec![1, 2]);
}

#[tokio::test]
async fn newest_first_within_each_group() {
    let queue = queue(vec![
        request(1, APPROVED, "2024-02-01T09:00:00"),
        request(2, PENDING, "2024-01-15T09:00:00"),
        request(3, REJECTED, "2024-03-01T09:00:00"),
        request(4, PENDING, "2024-04-20T09:00:00"),
        request(5, PENDING, "not a date"),
    ]);
    queue.load().await.unwrap();
    assert_eq!(request_ids(&queue.visible()), vec![4, 2, 5, 3, 1]);

    queue.update_sort(|s| s.direction = s.direction.toggled());
    assert_eq!(request_ids(&queue.visible()), vec![5, 2, 4, 1, 3]);
}

#[tokio::test]
async fn status_filter_is_case_insensitive() {
    let queue = queue(vec![
        request(1, "Pending", "2024-01-01"),
        request(2, APPROVED, "2024-01-02"),
    ]);
    queue.load().await.unwrap();
    queue.update_filter(|f| f.status = Choice::parse("pending"));
    assert_eq!(request_ids(&queue.visible()), vec![1]);
}

#[tokio::test]
async fn pages_reset_when_the_filter_changes() {
    let requests = (1..=25)
        .map(|id| request(id, APPROVED, &format!("2024-01-{:02}", id)))
        .collect();
    let queue = queue(requests).with_page_size(tutor_request::PAGE_SIZE);
    queue.load().await.unwrap();

    assert_eq!(queue.page_count(), 3);
    queue.set_page(3);
    assert_eq!(request_ids(&queue.visible_page()), (1..=5).rev().collect::<Vec<_>>());

    queue.set_page(99);
    assert_eq!(queue.page(), 3);

    queue.update_filter(|f| f.status = Choice::parse(APPROVED));
    assert_eq!(queue.page(), 1);
    assert_eq!(queue.visible_page().len(), 10);
}
