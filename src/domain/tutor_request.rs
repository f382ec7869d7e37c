//! Admin queue of tutor-course requests (a tutor asking to tutor a course).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::list::sort::parse_timestamp;
use crate::list::{Choice, Filter, ListController, PendingFirst, Queued, TextQuery};
use crate::mutation::MutationController;
use crate::record::Record;
use crate::source::{Endpoints, InMemorySource};
use crate::validation::{Validate, ValidationErrors};

pub const LIST_PATH: &str = "/api/admin/all-tutor-course-requests";
pub const CREATE_PATH: &str = "/api/admin/tutor-course-request";
pub const TRANSITION_PATH: &str = "/api/admin/tutor-course-request/{id}/{action}";

pub const APPROVE: &str = "approve";
pub const REJECT: &str = "reject";

pub const PENDING: &str = "pending";
pub const APPROVED: &str = "approved";
pub const REJECTED: &str = "rejected";

pub const PAGE_SIZE: usize = 10;

pub type RequestQueue<S> = ListController<S, RequestFilter, PendingFirst>;
pub type RequestActions<S> = MutationController<S, RequestFilter, PendingFirst>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorRef {
    #[serde(default)]
    pub user: Option<PersonName>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRef {
    #[serde(default)]
    pub department_code: Option<String>,
    #[serde(default)]
    pub course_number: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorCourseRequest {
    pub request_id: i64,
    pub tutor_id: i64,
    pub course_id: i64,
    pub status: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tutor: Option<TutorRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<CourseRef>,
}

impl TutorCourseRequest {
    /// "First Last", with missing parts left blank.
    pub fn tutor_name(&self) -> String {
        let user = self.tutor.as_ref().and_then(|t| t.user.as_ref());
        let first = user.and_then(|u| u.first_name.as_deref()).unwrap_or("");
        let last = user.and_then(|u| u.last_name.as_deref()).unwrap_or("");
        format!("{} {}", first, last)
    }

    /// "DEPT NUMBER Title", with missing parts left blank.
    pub fn course_name(&self) -> String {
        let course = self.course.clone().unwrap_or_default();
        format!(
            "{} {} {}",
            course.department_code.as_deref().unwrap_or(""),
            course.course_number.as_deref().unwrap_or(""),
            course.title.as_deref().unwrap_or("")
        )
    }
}

impl Record for TutorCourseRequest {
    type Id = i64;
    const KIND: &'static str = "request";

    fn id(&self) -> &i64 {
        &self.request_id
    }
}

impl Queued for TutorCourseRequest {
    fn is_pending(&self) -> bool {
        self.status.eq_ignore_ascii_case(PENDING)
    }

    fn submitted_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.created_at)
    }
}

/// Payload a tutor sends to request a course.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTutorCourseRequest {
    pub tutor_id: i64,
    pub course_id: i64,
}

impl Validate for NewTutorCourseRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.tutor_id <= 0 {
            errors.push("tutor_id", "tutor_id is required");
        }
        if self.course_id <= 0 {
            errors.push("course_id", "course_id is required");
        }
        errors.into_result()
    }
}

/// Status selector plus a search over tutor name and course.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    pub status: Choice<String>,
    pub query: TextQuery,
}

impl Filter<TutorCourseRequest> for RequestFilter {
    fn matches(&self, request: &TutorCourseRequest) -> bool {
        self.status.admits_ignore_case(&request.status)
            && self
                .query
                .matches_any([request.tutor_name().as_str(), request.course_name().as_str()])
    }
}

pub fn endpoints() -> Endpoints {
    Endpoints::read_only(LIST_PATH)
        .with_create(CREATE_PATH)
        .with_transition(TRANSITION_PATH)
}

/// In-memory stand-in for the request endpoints.
///
/// Only pending requests can be approved; rejection is always accepted.
pub fn stub_source(
    requests: Vec<TutorCourseRequest>,
) -> InMemorySource<TutorCourseRequest, NewTutorCourseRequest> {
    InMemorySource::with_factory(requests, |draft: &NewTutorCourseRequest, seq| {
        TutorCourseRequest {
            request_id: seq as i64,
            tutor_id: draft.tutor_id,
            course_id: draft.course_id,
            status: PENDING.to_string(),
            created_at: chrono::Utc::now()
                .naive_utc()
                .format("%Y-%m-%dT%H:%M:%S")
                .to_string(),
            tutor: None,
            course: None,
        }
    })
    .with_transition(|request, action| match action {
        APPROVE if !request.is_pending() => Err(format!("Request already {}", request.status)),
        APPROVE => Ok(TutorCourseRequest {
            status: APPROVED.to_string(),
            ..request.clone()
        }),
        REJECT => Ok(TutorCourseRequest {
            status: REJECTED.to_string(),
            ..request.clone()
        }),
        other => Err(format!("Failed to {} request", other)),
    })
}

#[cfg(feature = "http")]
pub fn http_source(
    config: &crate::config::ClientConfig,
) -> Result<
    crate::source::HttpSource<TutorCourseRequest, NewTutorCourseRequest>,
    crate::source::SourceError,
> {
    crate::source::HttpSource::new(config, endpoints())
}
