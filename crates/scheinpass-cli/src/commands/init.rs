use std::path::Path;

use anyhow::{Context, Result};

const STARTER_COURSE: &str = r#"# scheinpass course file.
#
# Sheets and exams declare the gradeable entities; gradings reference them
# by id. A grading with several students is a team grading and counts for
# every listed member.

[course]
name = "My Course"

[[course.sheets]]
id = "sheet-1"
name = "Sheet 1"
possible_points = 20.0

[[course.exams]]
id = "exam-1"
name = "Exam 1"
possible_points = 60.0

[[students]]
id = "alice"
name = "Alice Martin"
attended_sessions = 9
total_sessions = 12
presentation_points = 2.0

[[students]]
id = "bob"
name = "Bob Schmidt"
attended_sessions = 12
total_sessions = 12

# Pass criteria. `percentage = true` compares achieved / possible against
# value_needed; `percentage = false` compares achieved points directly.
[[criteria]]
id = "att"
identifier = "attendance"
params = { percentage = true, value_needed = 0.8 }

[[criteria]]
id = "sheets"
identifier = "sheet_total"
params = { percentage = true, value_needed = 0.5 }

[[gradings]]
sheet = "sheet-1"
students = ["alice", "bob"]

[gradings.exercises.ex1]
points = 5.0

[gradings.exercises.ex2]
sub_exercise_points = { "2a" = 1.0, "2b" = 2.0 }
"#;

pub fn execute() -> Result<()> {
    let path = Path::new("course.toml");

    if path.exists() {
        println!("course.toml already exists, skipping.");
    } else {
        std::fs::write(path, STARTER_COURSE).context("failed to write course.toml")?;
        println!("Created course.toml");
    }

    println!();
    println!("Next steps:");
    println!("  1. Edit course.toml with your sheets, students, and criteria");
    println!("  2. Run: scheinpass validate --course course.toml");
    println!("  3. Run: scheinpass summarize --course course.toml");

    Ok(())
}
