//! Output and persistence for scrape results.
//!
//! # Submodules
//!
//! - [`cache`]: Per-range JSON result cache with a freshness TTL
//! - [`json`]: Writes the full article list to a JSON file
//! - [`listing`]: Pages the list and renders it as plain text
//!
//! # Output Structure
//!
//! ```text
//! cache_dir/
//! ├── cache_articles_2022_2026.json
//! └── cache_articles_2023_2023.json
//! ```

pub mod cache;
pub mod json;
pub mod listing;
