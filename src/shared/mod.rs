//! Helpers shared by the HTTP handlers and the CLI

pub mod extract;

pub use extract::first_json_object;
