//! Night school and career changes

pub mod career;
pub mod school;

pub use career::{Career, CareerIncome};
pub use school::{CourseKind, CourseProgress, Difficulty, ExamResult, NightSchool, StudyReport};
