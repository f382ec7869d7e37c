//! Find-a-tutor page. Searches a fixed tutor list by course code.

use serde::{Deserialize, Serialize};

use crate::list::{Filter, ListController, NoSort, TextQuery};
use crate::record::Record;
use crate::source::InMemorySource;

pub type TutorFinder = ListController<InMemorySource<TutorListing>, TutorSearch, NoSort>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorListing {
    pub id: String,
    pub name: String,
    pub email: String,
    pub courses: Vec<String>,
    pub rating: u8,
    pub availability: Vec<String>,
}

impl Record for TutorListing {
    type Id = String;
    const KIND: &'static str = "tutor";

    fn id(&self) -> &String {
        &self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

impl TutorListing {
    /// "John Doe" -> "JD".
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// Matches tutors teaching a course whose code contains the search term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TutorSearch {
    pub term: TextQuery,
}

impl TutorSearch {
    pub fn new(term: &str) -> Self {
        Self {
            term: TextQuery::new(term),
        }
    }
}

impl Filter<TutorListing> for TutorSearch {
    fn matches(&self, tutor: &TutorListing) -> bool {
        self.term.matches_any(tutor.courses.iter().map(String::as_str))
    }
}

fn listing(id: &str, name: &str, email: &str, courses: &[&str], rating: u8, slots: &[&str]) -> TutorListing {
    TutorListing {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        courses: courses.iter().map(|c| c.to_string()).collect(),
        rating,
        availability: slots.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn mock_tutors() -> Vec<TutorListing> {
    vec![
        listing(
            "1",
            "John Doe",
            "john@sfsu.edu",
            &["CSC 415", "CSC 510"],
            5,
            &["Mon 10:00-12:00", "Wed 14:00-16:00", "Fri 10:00-12:00"],
        ),
        listing(
            "2",
            "John Smith",
            "smith@sfsu.edu",
            &["CSC 415", "CSC 600"],
            4,
            &["Tue 09:00-11:00", "Thu 13:00-15:00"],
        ),
        listing(
            "3",
            "Jane Wilson",
            "jane@sfsu.edu",
            &["BIOL 101", "BIOL 202"],
            5,
            &["Mon 14:00-16:00", "Wed 10:00-12:00"],
        ),
    ]
}

pub fn tutor_finder() -> TutorFinder {
    ListController::with_view(
        InMemorySource::new(mock_tutors()),
        TutorSearch::default(),
        NoSort,
    )
}
