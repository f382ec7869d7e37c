//! The list views of the tutoring client.
//!
//! - `course` - admin course catalog (load, search, add, deactivate)
//! - `tutor_request` - admin queue of tutor-course requests (approve/reject)
//! - `catalog` - find-a-course page on mock data
//! - `tutors` - find-a-tutor page on mock data

pub mod catalog;
pub mod course;
pub mod tutor_request;
pub mod tutors;
