//! scheinpass-stores — Store implementations for the scheinpass engine.
//!
//! Implements the store traits from `scheinpass-core`: an in-memory backend
//! used by tests and the CLI, and a TOML course-file loader that validates
//! raw records before constructing domain values.

pub mod course_file;
pub mod memory;

pub use course_file::{load_course, parse_course_str, CourseData, CourseFile};
pub use memory::InMemoryCourseStore;
