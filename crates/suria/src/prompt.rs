//! Estimate prompt builder — embeds the weighting heuristic and phrase modifiers.

use crate::forecast::ForecastRecord;

/// Fixed share of the day each daypart contributes. An explicit heuristic,
/// not derived from solar-elevation physics.
const DAYPART_WEIGHTS: [(&str, u8); 4] = [
    ("Morning", 25),
    ("Afternoon", 35),
    ("Evening", 25),
    ("Night", 15),
];

/// Fixed efficiency ranges for the feed's weather phrases.
const PHRASE_MODIFIERS: [(&str, &str); 6] = [
    ("Tiada hujan", "90-100%"),
    ("Berjerebu", "70-80%"),
    ("Hujan", "20-50%"),
    ("Hujan di beberapa tempat", "50-70%"),
    ("Hujan di satu dua tempat", "60-75%"),
    ("Ribut petir", "0-10%"),
];

/// Build the estimate prompt for one forecast record.
///
/// Daypart descriptions are embedded raw and untranslated; malformed input
/// is the generation service's problem, not detected here.
pub fn build_estimate_prompt(record: &ForecastRecord, location_name: &str) -> String {
    let mut parts = Vec::new();

    parts.push(format!(
        "Act as a solar energy expert. Analyze the following weather forecast for {} \
         and estimate the daily solar panel output efficiency as a single percentage \
         (0-100%) compared to a perfectly clear, sunny day.",
        location_name
    ));

    parts.push(
        DAYPART_WEIGHTS
            .iter()
            .map(|(daypart, pct)| format!("- {} contributes {}% of the day", daypart, pct))
            .collect::<Vec<_>>()
            .join("\n"),
    );

    let modifiers = PHRASE_MODIFIERS
        .iter()
        .map(|(phrase, range)| format!("- {} = {}", phrase, range))
        .collect::<Vec<_>>()
        .join("\n");
    parts.push(format!(
        "Weather condition modifiers (approximate ranges):\n{}",
        modifiers
    ));

    parts.push(
        "Use these modifiers to calculate a realistic single integer percentage \
         for the whole day."
            .to_string(),
    );

    parts.push(
        "Respond ONLY with JSON:\n\
         {\n  \
           \"estimate_text\": \"Estimated Solar Output: XX% of a clear-day potential\",\n  \
           \"reasoning\": \"Brief 5-word reason\"\n\
         }"
        .to_string(),
    );

    parts.push(format!(
        "Weather Data:\n\
         - Morning: {}\n\
         - Afternoon: {}\n\
         - Evening: {}\n\
         - Night: {}",
        record.morning_forecast,
        record.afternoon_forecast,
        record.summary_forecast,
        record.night_forecast
    ));

    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::Location;

    fn record() -> ForecastRecord {
        ForecastRecord {
            location: Location {
                location_id: "St001".to_string(),
                location_name: "Subang Jaya".to_string(),
            },
            date: "2025-12-11".to_string(),
            morning_forecast: "Tiada hujan".to_string(),
            afternoon_forecast: "Ribut petir".to_string(),
            summary_forecast: "Hujan".to_string(),
            night_forecast: "Berjerebu".to_string(),
            summary_when: None,
            min_temp: None,
            max_temp: None,
        }
    }

    #[test]
    fn prompt_embeds_location_and_dayparts() {
        let prompt = build_estimate_prompt(&record(), "Subang Jaya");
        assert!(prompt.contains("weather forecast for Subang Jaya"));
        assert!(prompt.contains("- Morning: Tiada hujan"));
        assert!(prompt.contains("- Afternoon: Ribut petir"));
        assert!(prompt.contains("- Evening: Hujan"));
        assert!(prompt.contains("- Night: Berjerebu"));
    }

    #[test]
    fn prompt_embeds_weighting_scheme() {
        let prompt = build_estimate_prompt(&record(), "Subang Jaya");
        assert!(prompt.contains("Morning contributes 25% of the day"));
        assert!(prompt.contains("Afternoon contributes 35% of the day"));
        assert!(prompt.contains("Evening contributes 25% of the day"));
        assert!(prompt.contains("Night contributes 15% of the day"));
    }

    #[test]
    fn prompt_embeds_all_modifiers() {
        let prompt = build_estimate_prompt(&record(), "Subang Jaya");
        for (phrase, range) in PHRASE_MODIFIERS {
            assert!(
                prompt.contains(&format!("- {} = {}", phrase, range)),
                "missing modifier for {phrase}"
            );
        }
    }

    #[test]
    fn prompt_demands_strict_json_reply() {
        let prompt = build_estimate_prompt(&record(), "Subang Jaya");
        assert!(prompt.contains("Respond ONLY with JSON"));
        assert!(prompt.contains("\"estimate_text\""));
        assert!(prompt.contains("\"reasoning\""));
        assert!(prompt.contains("Estimated Solar Output: XX% of a clear-day potential"));
    }
}
