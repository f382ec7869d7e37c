//! Course catalog - the admin's list of courses.

use serde::{Deserialize, Serialize};

use crate::list::{Choice, Filter, ListController, NoSort, TextQuery, Tristate};
use crate::mutation::MutationController;
use crate::record::Record;
use crate::source::{Endpoints, InMemorySource};
use crate::validation::{Validate, ValidationErrors};

pub const LIST_PATH: &str = "/api/admin/allcourses";
pub const CREATE_PATH: &str = "/api/admin/addcourse";
pub const DEACTIVATE_PATH: &str = "/api/admin/deactivate/{id}";

pub const DEACTIVATE: &str = "deactivate";

pub const MAX_DEPARTMENT_CODE_LEN: usize = 10;
pub const MAX_COURSE_NUMBER_LEN: usize = 10;
pub const MAX_TITLE_LEN: usize = 200;

pub type CourseCatalog<S> = ListController<S, CourseFilter, NoSort>;
pub type CourseActions<S> = MutationController<S, CourseFilter, NoSort>;

fn active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub course_id: i64,
    pub department_code: String,
    pub course_number: String,
    pub title: String,
    #[serde(default = "active")]
    pub is_active: bool,
}

impl Record for Course {
    type Id = i64;
    const KIND: &'static str = "course";

    fn id(&self) -> &i64 {
        &self.course_id
    }

    fn label(&self) -> String {
        format!("{} {}", self.department_code, self.course_number)
    }
}

/// Form payload for adding a course.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCourse {
    pub department_code: String,
    pub course_number: String,
    pub title: String,
}

impl Validate for NewCourse {
    fn normalize(&mut self) {
        for field in [
            &mut self.department_code,
            &mut self.course_number,
            &mut self.title,
        ] {
            *field = field.trim().to_string();
        }
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("department_code", &self.department_code, MAX_DEPARTMENT_CODE_LEN);
        errors.require("course_number", &self.course_number, MAX_COURSE_NUMBER_LEN);
        errors.require("title", &self.title, MAX_TITLE_LEN);
        errors.into_result()
    }
}

/// Search box, department selector and active/inactive selector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseFilter {
    pub query: TextQuery,
    pub department: Choice<String>,
    pub status: Tristate,
}

impl CourseFilter {
    /// Map the status selector labels `all`, `active`, `inactive`.
    pub fn status_from_label(label: &str) -> Tristate {
        match label {
            "active" => Tristate::TrueOnly,
            "inactive" => Tristate::FalseOnly,
            _ => Tristate::All,
        }
    }
}

impl Filter<Course> for CourseFilter {
    fn matches(&self, course: &Course) -> bool {
        self.query.matches_any([
            course.title.as_str(),
            course.department_code.as_str(),
            course.course_number.as_str(),
        ]) && self.department.admits(&course.department_code)
            && self.status.admits(course.is_active)
    }
}

pub fn endpoints() -> Endpoints {
    Endpoints::read_only(LIST_PATH)
        .with_create(CREATE_PATH)
        .with_transition(DEACTIVATE_PATH)
}

/// Key for `ListController::distinct_values` to fill the department selector.
pub fn department(course: &Course) -> String {
    course.department_code.clone()
}

/// In-memory stand-in for the course endpoints.
///
/// New courses get sequential ids and start active; `deactivate` clears the flag.
pub fn stub_source(courses: Vec<Course>) -> InMemorySource<Course, NewCourse> {
    InMemorySource::with_factory(courses, |draft: &NewCourse, seq| Course {
        course_id: seq as i64,
        department_code: draft.department_code.clone(),
        course_number: draft.course_number.clone(),
        title: draft.title.clone(),
        is_active: true,
    })
    .with_transition(|course, action| match action {
        DEACTIVATE => Ok(Course {
            is_active: false,
            ..course.clone()
        }),
        other => Err(format!("Failed to {} course", other)),
    })
}

#[cfg(feature = "http")]
pub fn http_source(
    config: &crate::config::ClientConfig,
) -> Result<crate::source::HttpSource<Course, NewCourse>, crate::source::SourceError> {
    crate::source::HttpSource::new(config, endpoints())
}
