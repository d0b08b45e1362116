//! AI-assisted setlist suggestions for bandbook.
//!
//! Sends the catalog and the operator's constraints to a text-generation
//! API, validates the JSON it returns, and runs the proposed running order
//! through the core setlist assembler. Also owns the layered configuration
//! shared by the command-line tool.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod client;
pub mod config;
pub mod error;
pub mod prompt;
pub mod resilience;
pub mod suggest;

pub use client::{ChatCompletionsClient, TextGenerator};
pub use config::Config;
pub use error::{AiError, AiResult};
pub use prompt::SuggestRequest;
pub use suggest::{Suggester, Suggestion};
