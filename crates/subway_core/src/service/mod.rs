//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate line/station repository calls into use-case level APIs.
//! - Resolve names to persisted entities so callers never juggle identities.

pub mod line_service;
