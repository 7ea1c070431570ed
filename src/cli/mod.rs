// CLI module
// Public interface for the interactive front end

mod commands;
mod repl;

pub use commands::Command;
pub use repl::Repl;
