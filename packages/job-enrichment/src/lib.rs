//! Job Listing Enrichment Library
//!
//! Takes the summary rows of a job listings page and enriches them with the
//! skills mentioned on each posting's detail page. Detail pages are fetched
//! concurrently through a bounded worker pool and kept in a time-expiring
//! cache, so repeated passes over the same listings stay cheap.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use job_enrichment::{
//!     parse_listings, CacheConfig, DetailCache, DetailFetcher, EnrichOptions, Enricher,
//!     HttpSession,
//! };
//!
//! let session = Arc::new(HttpSession::new()?);
//! let cache = Arc::new(DetailCache::new(CacheConfig::default()));
//! let enricher = Enricher::new(DetailFetcher::new(session, cache));
//!
//! let mut records = parse_listings(&html, "https://employment.ku.edu")?;
//!
//! // Curated vocabulary, first 20 postings
//! enricher.enrich(&mut records, &[], &EnrichOptions::default().with_limit(20)).await;
//!
//! // Only postings mentioning Python or SQL
//! let skills = vec!["Python".to_string(), "SQL".to_string()];
//! let matching = enricher.filter(records, &skills, &EnrichOptions::default()).await;
//! ```
//!
//! # Modules
//!
//! - [`session`] - HTTP transport trait and reqwest implementation
//! - [`cache`] - Bounded TTL cache of detail-page text
//! - [`fetcher`] - Cache-first detail fetcher
//! - [`extract`] - Main-content text extraction
//! - [`skills`] - Vocabulary and targeted skill matching
//! - [`pool`] - Fixed-width worker pool
//! - [`enricher`] - Batch enrichment and filtering
//! - [`listings`] - Listings page parser
//! - [`testing`] - Mock session and manual clock

pub mod cache;
pub mod clock;
pub mod config;
pub mod enricher;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod listings;
pub mod pool;
pub mod record;
pub mod session;
pub mod skills;
pub mod testing;

// Re-export core types at crate root
pub use cache::{CacheConfig, CacheEntry, CacheStats, DetailCache};
pub use clock::{Clock, SystemClock};
pub use config::EnrichmentConfig;
pub use enricher::{EnrichOptions, EnrichReport, Enricher};
pub use error::{ConfigError, FetchError, ListingError, SessionError};
pub use extract::extract_main_text;
pub use fetcher::DetailFetcher;
pub use listings::{category_from_url, fetch_listings, parse_listings};
pub use pool::WorkerPool;
pub use record::SummaryRecord;
pub use session::{HttpSession, HttpSessionBuilder, Session, SessionResponse};
pub use skills::{match_targeted, match_vocabulary, matches_any, SkillMatcher};
