//! Script generation and parsing.

pub mod llm;
pub mod outline;
pub mod parser;

pub use llm::{ScriptGenerator, ScriptSource};
pub use outline::{extract_outline, ScriptOutline};
pub use parser::parse_script;
