//! Stored taste preferences, rendered as context appended to a request.

use serde::Deserialize;

pub const PROFILE_HEADING: &str = "[User taste profile]";

const BODY_LABELS: [&str; 5] = ["very light", "light", "medium", "full", "very full"];
const RICHNESS_LABELS: [&str; 5] = ["very simple", "simple", "medium", "complex", "very complex"];
const SMOKE_LABELS: [&str; 5] = ["none", "weak", "medium", "strong", "very strong"];
const SWEETNESS_LABELS: [&str; 5] = ["very dry", "dry", "medium", "sweet", "very sweet"];

/// Taste scores are on a 1-5 scale; prices in KRW, alcohol in percent
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TastePreferences {
    pub body: Option<u8>,
    pub richness: Option<u8>,
    pub smoke: Option<u8>,
    pub sweetness: Option<u8>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    pub min_alcohol: Option<f32>,
    pub max_alcohol: Option<f32>,
    pub keyword: Option<String>,
}

fn label(labels: &[&'static str; 5], score: u8) -> &'static str {
    (score as usize)
        .checked_sub(1)
        .and_then(|i| labels.get(i))
        .copied()
        .unwrap_or("medium")
}

/// 94100 -> "94,100"
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

impl TastePreferences {
    /// One line per set preference
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        let scales = [
            ("Body", self.body, &BODY_LABELS),
            ("Complexity", self.richness, &RICHNESS_LABELS),
            ("Smokiness", self.smoke, &SMOKE_LABELS),
            ("Sweetness", self.sweetness, &SWEETNESS_LABELS),
        ];
        for (name, score, labels) in scales {
            if let Some(score) = score {
                lines.push(format!("{}: {}", name, label(labels, score)));
            }
        }

        match (self.min_price, self.max_price) {
            (Some(min), Some(max)) => lines.push(format!(
                "Preferred price: {} to {} KRW",
                group_thousands(min),
                group_thousands(max)
            )),
            (Some(min), None) => lines.push(format!("Minimum price: {} KRW", group_thousands(min))),
            (None, Some(max)) => lines.push(format!("Maximum price: {} KRW", group_thousands(max))),
            (None, None) => {}
        }

        match (self.min_alcohol, self.max_alcohol) {
            (Some(min), Some(max)) => lines.push(format!("Preferred strength: {}% to {}%", min, max)),
            (Some(min), None) => lines.push(format!("Minimum strength: {}%", min)),
            (None, Some(max)) => lines.push(format!("Maximum strength: {}%", max)),
            (None, None) => {}
        }

        if let Some(keyword) = self.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
            lines.push(format!("Preferred keywords: {}", keyword));
        }

        lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }

    /// The block appended to the request text, or `None` when nothing is set
    pub fn render(&self) -> Option<String> {
        let lines = self.lines();
        if lines.is_empty() {
            return None;
        }
        Some(format!(
            "{}\n{}\n\nTake this taste profile into account when recommending.",
            PROFILE_HEADING,
            lines.join("\n")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_full_profile() {
        let prefs = TastePreferences {
            body: Some(4),
            smoke: Some(1),
            min_price: Some(50_000),
            max_price: Some(120_000),
            max_alcohol: Some(46.0),
            keyword: Some(" sherry ".to_string()),
            ..Default::default()
        };

        assert_eq!(
            prefs.lines(),
            vec![
                "Body: full",
                "Smokiness: none",
                "Preferred price: 50,000 to 120,000 KRW",
                "Maximum strength: 46%",
                "Preferred keywords: sherry",
            ]
        );
        assert!(prefs.render().unwrap().starts_with("[User taste profile]\nBody: full"));
    }

    #[test]
    fn test_out_of_range_score_reads_medium() {
        let prefs = TastePreferences {
            sweetness: Some(9),
            ..Default::default()
        };
        assert_eq!(prefs.lines(), vec!["Sweetness: medium"]);
    }

    #[test]
    fn test_empty_profile_renders_nothing() {
        let prefs = TastePreferences {
            keyword: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(prefs.is_empty());
        assert!(prefs.render().is_none());
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }
}
