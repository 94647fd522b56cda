//! Coach prompt templates
//!
//! The system framing sent to the provider is a Handlebars template:
//! embedded by default, overridable from a `.pmt` file on disk.

mod embedded;
mod loader;

pub use loader::{PromptLoader, SystemContext};
