use std::path::PathBuf;

use anyhow::{bail, Result};

use scheinpass_stores::course_file::parse_course;

pub fn execute(course: PathBuf) -> Result<()> {
    let file = parse_course(&course)?;
    let violations = file.validate();

    if violations.is_empty() {
        println!("{}: OK", course.display());
        return Ok(());
    }

    for violation in &violations {
        println!("{}: {}", violation.field, violation.message);
    }
    bail!(
        "course file {} has {} violation(s)",
        course.display(),
        violations.len()
    );
}
