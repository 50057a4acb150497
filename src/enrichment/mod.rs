//! Title enrichment - finds Japanese track titles for a CD and applies them.
//!
//! # Architecture
//!
//! This module follows a clean separation between:
//! - **Domain models** (`domain.rs`) - Listings, candidates and errors shared by every stage
//! - **API DTOs** (`wikipedia/dto.rs`, `musicbrainz/dto.rs`) - Exact API response shapes
//! - **Adapters** - Convert DTOs (and article HTML) to domain models
//! - **Clients** - HTTP clients for external APIs, behind the [`TitleSource`] trait
//! - **Cache** - Listings found per (artist, album), on disk
//! - **Matcher / Scorer** - Pair listings with the CD's tracks and rate each pairing
//! - **Service** - High-level orchestration of the lookup
//!
//! This decoupling means:
//! 1. API changes don't ripple through our codebase
//! 2. We can test API contracts independently
//! 3. The orchestrator can be driven by mock sources
//!
//! # Usage
//!
//! ```ignore
//! use title_bridge::enrichment::TitleSearchService;
//!
//! let service = TitleSearchService::new(&config)?;
//! let listings = service.search_titles(&album, false, None).await;
//! let album = service.apply_results(album, &listings, true, 80);
//! ```

pub mod cache;
pub mod domain;
pub mod matcher;
pub mod musicbrainz;
pub mod scorer;
pub mod service;
pub mod traits;
pub mod wikipedia;

pub use cache::ResultCache;
pub use domain::{
    ConfidenceTier, ListingEntry, MatchCandidate, SearchError, SourceId, TrackListing,
};
pub use matcher::TrackMatcher;
pub use service::{TitleSearchService, TrackSuggestion};
pub use traits::TitleSource;
