//! Weather phrase taxonomy — Malay forecast phrases to categories and tiers.
//!
//! The upstream feed describes each daypart with a fixed Malay vocabulary.
//! Both lookups are pure functions of their input: no state, no side
//! effects, same input always yields the same output.

use serde::{Deserialize, Serialize};

/// Normalized weather bucket for one daypart description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherCategory {
    Sunny,
    Rain,
    Thunderstorms,
    Hazy,
    /// Phrase outside the feed vocabulary.
    Unknown,
}

/// Coarse solar-yield label derived from a weather category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputTier {
    High,
    Medium,
    Low,
    Unknown,
}

/// Classify a raw daypart description. Exact match, case-sensitive.
///
/// Phrases outside the vocabulary map to `Unknown` instead of being echoed
/// back, so untranslated strings never leak into typed downstream logic.
/// The raw text still reaches the estimate prompt unmodified.
pub fn classify(description: &str) -> WeatherCategory {
    match description {
        "Tiada hujan" => WeatherCategory::Sunny,
        "Berjerebu" => WeatherCategory::Hazy,
        "Hujan"
        | "Hujan di beberapa tempat"
        | "Hujan di satu dua tempat"
        | "Hujan di satu dua tempat di kawasan pantai"
        | "Hujan di satu dua tempat di kawasan pedalaman" => WeatherCategory::Rain,
        "Ribut petir"
        | "Ribut petir di beberapa tempat"
        | "Ribut petir di beberapa tempat di kawasan pedalaman"
        | "Ribut petir di satu dua tempat"
        | "Ribut petir di satu dua tempat di kawasan pantai"
        | "Ribut petir di satu dua tempat di kawasan pedalaman" => WeatherCategory::Thunderstorms,
        _ => WeatherCategory::Unknown,
    }
}

/// Solar output tier for a weather category.
pub fn output_tier(category: WeatherCategory) -> OutputTier {
    match category {
        WeatherCategory::Sunny => OutputTier::High,
        WeatherCategory::Hazy => OutputTier::Medium,
        WeatherCategory::Rain | WeatherCategory::Thunderstorms => OutputTier::Low,
        WeatherCategory::Unknown => OutputTier::Unknown,
    }
}

// ── Tests ───────────────────────────────────────────────────────────
