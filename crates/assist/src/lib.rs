//! Classroom helpers
//!
//! - `hints`: exception hints for terminal output
//! - `scores`: score sheet CSV → HTML table with medal icons

pub mod hints;
pub mod scores;

pub use hints::{Hint, HintRule, HintTable, Notifier};
pub use scores::{render_page, render_table, GradeIcons, RenderError, GRADE_COLUMNS};
