//! The interview core: question sources, prompt construction, response
//! parsing, and the session state machine.

pub mod handlers;
pub mod models;
pub mod parser;
pub mod prompts;
pub mod scoring;
pub mod session;
pub mod source;
pub mod store;
