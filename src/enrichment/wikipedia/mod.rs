//! Japanese Wikipedia integration
//!
//! Finds album articles by full-text search and reads their track lists,
//! which usually give the Japanese release title next to the original.
//!
//! API docs: https://www.mediawiki.org/wiki/API:Main_page

pub mod dto;
mod client;
pub mod parser;

pub use client::{DEFAULT_API_URL, WikipediaClient};
