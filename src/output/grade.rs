//! Grade display

use crate::models::Grade;
use console::{style, Style};

fn grade_style(grade: Grade) -> Style {
    match grade {
        Grade::QuantumExperimental => Style::new().green(),
        Grade::TransitionReady => Style::new().cyan(),
        Grade::ModernInsecureLongTerm | Grade::WeakLegacy => Style::new().yellow(),
        Grade::Critical => Style::new().red(),
    }
}

/// Format a prominent grade box to a string
pub fn format_grade(grade: Grade, score: u32) -> String {
    let label = format!("Grade: {}  Score: {}/100", grade.as_str(), score);
    let width = label.chars().count() + 6;

    let top = format!("  ╔{}╗", "═".repeat(width));
    let mid = format!("  ║   {}   ║", label);
    let bot = format!("  ╚{}╝", "═".repeat(width));

    let colour = grade_style(grade);
    let mut out = String::from("\n");
    out.push_str(&format!("{}\n", colour.apply_to(&top)));
    out.push_str(&format!("{}\n", colour.clone().bold().apply_to(&mid)));
    out.push_str(&format!("{}\n", colour.apply_to(&bot)));
    out.push_str(&format!("  {}\n", style(grade.description()).dim()));
    out
}
