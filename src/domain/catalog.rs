//! Find-a-course page. Runs on a fixed list until the backend exposes tutor counts.

use serde::{Deserialize, Serialize};

use crate::list::{Choice, Filter, ListController, NoSort, TextQuery};
use crate::record::Record;
use crate::source::InMemorySource;

pub type CourseFinder = ListController<InMemorySource<CatalogCourse>, CatalogFilter, NoSort>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCourse {
    pub id: String,
    pub code: String,
    pub name: String,
    pub department: String,
    pub tutor_count: u32,
}

impl Record for CatalogCourse {
    type Id = String;
    const KIND: &'static str = "course";

    fn id(&self) -> &String {
        &self.id
    }

    fn label(&self) -> String {
        self.code.clone()
    }
}

impl CatalogCourse {
    pub fn availability(&self) -> TutorAvailability {
        TutorAvailability::from_count(self.tutor_count)
    }
}

/// Badge shown on each course card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TutorAvailability {
    Available,
    Limited,
    None,
}

impl TutorAvailability {
    pub fn from_count(count: u32) -> Self {
        match count {
            0 => TutorAvailability::None,
            1..=4 => TutorAvailability::Limited,
            _ => TutorAvailability::Available,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TutorAvailability::Available => "Tutors Available",
            TutorAvailability::Limited => "Limited",
            TutorAvailability::None => "No Tutors",
        }
    }
}

/// Search over code and name plus a department selector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub query: TextQuery,
    pub department: Choice<String>,
}

impl Filter<CatalogCourse> for CatalogFilter {
    fn matches(&self, course: &CatalogCourse) -> bool {
        self.query
            .matches_any([course.code.as_str(), course.name.as_str()])
            && self.department.admits(&course.department)
    }
}

pub fn department(course: &CatalogCourse) -> String {
    course.department.clone()
}

fn catalog_course(id: &str, code: &str, name: &str, department: &str, tutor_count: u32) -> CatalogCourse {
    CatalogCourse {
        id: id.to_string(),
        code: code.to_string(),
        name: name.to_string(),
        department: department.to_string(),
        tutor_count,
    }
}

pub fn mock_courses() -> Vec<CatalogCourse> {
    vec![
        catalog_course("1", "CSC 415", "Operating Systems", "Computer Science", 3),
        catalog_course("2", "CSC 510", "Analysis of Algorithms", "Computer Science", 2),
        catalog_course("3", "CSC 600", "Advanced Programming", "Computer Science", 5),
        catalog_course("4", "BIOL 101", "General Biology", "Biology", 4),
        catalog_course("5", "ECON 301", "Microeconomics", "Economics", 0),
        catalog_course("6", "MATH 226", "Calculus II", "Mathematics", 6),
    ]
}

pub fn course_finder() -> CourseFinder {
    ListController::with_view(
        InMemorySource::new(mock_courses()),
        CatalogFilter::default(),
        NoSort,
    )
}
