pub mod courses;

pub mod grades;

pub mod outcomes;

pub mod reports;

pub mod students;

pub use courses::configure_course_routes;
pub use grades::configure_grade_routes;
pub use outcomes::configure_outcome_routes;
pub use reports::configure_report_routes;
pub use students::configure_student_routes;
