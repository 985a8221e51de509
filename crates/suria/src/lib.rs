//! Suria — solar output dashboard server.
//!
//! Fetches the public Malaysian weather forecast feed, classifies daypart
//! descriptions into a fixed taxonomy, and asks a text-generation service
//! for a one-sentence daily efficiency estimate with bounded retry.

/// REST API for the dashboard frontend.
pub mod api;

/// Server configuration loaded from YAML.
pub mod config;

/// Estimate orchestration — reply contract, fence stripping, bounded retry.
pub mod estimate;

/// Forecast feed wire types, fetch client, and latest-record selection.
pub mod forecast;

/// Raw reqwest Gemini API client and the text-generation seam.
pub mod genai;

/// Estimate prompt builder.
pub mod prompt;

/// Shared input validation at the API boundary.
pub mod validation;

/// Weather phrase taxonomy and solar output tiers.
pub mod weather;
