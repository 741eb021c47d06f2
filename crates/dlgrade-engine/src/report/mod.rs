//! Report renderers.
//!
//! All three read a finished [`ResultMatrix`](dlgrade_core::ResultMatrix) and
//! never modify it:
//! - console text, one line per test case
//! - JSON artifact for aggregation across submissions
//! - PDF document with control-flow diagrams for each mismatch

pub mod console;
pub mod document;
pub mod json;
pub mod typeset;

pub use console::render_console;
pub use document::DocumentReport;
pub use json::{read_json_report, write_json_report, JsonReport};
pub use typeset::LatexTypesetter;
