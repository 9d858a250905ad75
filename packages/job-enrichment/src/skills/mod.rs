//! Skill matching: curated vocabulary mode and caller-targeted mode.
//!
//! Everything here is pure. No I/O, no shared state.

pub mod matcher;
pub mod vocabulary;

pub use matcher::{match_patterns, match_targeted, match_vocabulary, matches_any, SkillMatcher};
pub use vocabulary::{skill_variants, MatchMode, SkillPattern, SYNONYM_GROUPS, VOCABULARY};
