//! Core pipeline orchestration and domain logic for the enhancer.
//!
//! This crate ties together the content API client, the page scraper,
//! content synthesis and slug generation into a single run:
//! fetch latest → scrape references → synthesize → publish.

pub mod pipeline;
pub mod slug;
pub mod synthesis;
