//! Complexity Classifier
//!
//! Decides whether a request can be answered by the fast path or needs the
//! agentic path. Pure and deterministic: no I/O, no randomness, and the same
//! text always yields the same signal.
//!
//! ## Algorithm
//! 1. Lower-case the text and scan a fixed flavor vocabulary, collapsing
//!    near-synonyms into one canonical tag ("달콤한" and "달콤" are both `Sweet`)
//! 2. Evaluate the structural indicators with pattern matching
//! 3. `is_complex` if any of:
//!    - two or more distinct flavor tags
//!    - one flavor tag together with a conjunction
//!    - price, flavor and origin mentions, at least two of them
//!    - an explicit two-flavor combination phrase
//!    - range or threshold language
//!    - two or more indicators set

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;

/// Canonical flavor concept mentioned in a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FlavorTag {
    Sweet,
    Smoky,
    Smooth,
    Rich,
    Light,
    Dry,
    Fruity,
    Floral,
    Herbal,
    Spicy,
    Body,
    Bitter,
    Sour,
    Heavy,
    Clean,
    Intense,
    Mild,
    Strong,
    Weak,
    Complex,
    Simple,
}

impl FlavorTag {
    pub fn label(&self) -> &'static str {
        match self {
            FlavorTag::Sweet => "sweet",
            FlavorTag::Smoky => "smoky",
            FlavorTag::Smooth => "smooth",
            FlavorTag::Rich => "rich",
            FlavorTag::Light => "light",
            FlavorTag::Dry => "dry",
            FlavorTag::Fruity => "fruity",
            FlavorTag::Floral => "floral",
            FlavorTag::Herbal => "herbal",
            FlavorTag::Spicy => "spicy",
            FlavorTag::Body => "body",
            FlavorTag::Bitter => "bitter",
            FlavorTag::Sour => "sour",
            FlavorTag::Heavy => "heavy",
            FlavorTag::Clean => "clean",
            FlavorTag::Intense => "intense",
            FlavorTag::Mild => "mild",
            FlavorTag::Strong => "strong",
            FlavorTag::Weak => "weak",
            FlavorTag::Complex => "complex",
            FlavorTag::Simple => "simple",
        }
    }
}

impl fmt::Display for FlavorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Flavor vocabulary, matched as substrings of the lower-cased text
const FLAVOR_VOCABULARY: &[(&str, FlavorTag)] = &[
    ("부드러운", FlavorTag::Smooth),
    ("부드럽", FlavorTag::Smooth),
    ("smooth", FlavorTag::Smooth),
    ("달콤한", FlavorTag::Sweet),
    ("달콤", FlavorTag::Sweet),
    ("단맛", FlavorTag::Sweet),
    ("sweet", FlavorTag::Sweet),
    ("스모키", FlavorTag::Smoky),
    ("피트", FlavorTag::Smoky),
    ("smoky", FlavorTag::Smoky),
    ("peat", FlavorTag::Smoky),
    ("풍부한", FlavorTag::Rich),
    ("풍부", FlavorTag::Rich),
    ("라이트", FlavorTag::Light),
    ("가볍", FlavorTag::Light),
    ("드라이", FlavorTag::Dry),
    ("과일", FlavorTag::Fruity),
    ("fruity", FlavorTag::Fruity),
    ("꽃", FlavorTag::Floral),
    ("허브", FlavorTag::Herbal),
    ("스파이시", FlavorTag::Spicy),
    ("spicy", FlavorTag::Spicy),
    ("바디감", FlavorTag::Body),
    ("쓴맛", FlavorTag::Bitter),
    ("신맛", FlavorTag::Sour),
    ("무겁", FlavorTag::Heavy),
    ("깔끔", FlavorTag::Clean),
    ("진한", FlavorTag::Intense),
    ("연한", FlavorTag::Mild),
    ("강한", FlavorTag::Strong),
    ("약한", FlavorTag::Weak),
    ("복잡", FlavorTag::Complex),
    ("단순", FlavorTag::Simple),
];

static CONJUNCTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"그리고|하면서|동시에|또한|하지만|그러나|면서|이면서|고\s|하고\s").unwrap());

static NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+점|점수|정확히|정도").unwrap());

static COMPARISON: Lazy<Regex> = Lazy::new(|| Regex::new(r"보다|같은|비슷한|다른|대신|말고").unwrap());

// "약" only counts when it reads as "about N"; bare 약 also appears in 약한 (weak)
static RANGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"범위|사이|이상|이하|정도|약\s*\d|대략").unwrap());

static PRICE_MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)만원|(\d+)원").unwrap());

static ORIGIN_MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"스코틀랜드|아일랜드|일본|미국|캐나다").unwrap());

static COMBINATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"부드럽고\s*달콤|달콤하고\s*부드럽|스모키하고\s*바디감|바디감.*강한").unwrap());

/// Structural indicators evaluated over the request text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComplexityIndicators {
    pub multiple_flavors: bool,
    pub conjunctions: bool,
    pub specific_numbers: bool,
    pub comparisons: bool,
    pub range_conditions: bool,
    pub multiple_conditions: bool,
    pub flavor_combination: bool,
}

impl ComplexityIndicators {
    /// Number of indicators that fired
    pub fn count(&self) -> usize {
        [
            self.multiple_flavors,
            self.conjunctions,
            self.specific_numbers,
            self.comparisons,
            self.range_conditions,
            self.multiple_conditions,
            self.flavor_combination,
        ]
        .iter()
        .filter(|&&set| set)
        .count()
    }
}

/// Which simple constraints the request mentions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConditionMentions {
    pub price: bool,
    pub flavor: bool,
    pub origin: bool,
}

impl ConditionMentions {
    pub fn count(&self) -> usize {
        [self.price, self.flavor, self.origin].iter().filter(|&&m| m).count()
    }
}

/// Result of classifying one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexitySignal {
    pub flavor_tags: BTreeSet<FlavorTag>,
    pub indicators: ComplexityIndicators,
    pub mentions: ConditionMentions,
    pub is_complex: bool,
}

impl ComplexitySignal {
    pub fn indicator_count(&self) -> usize {
        self.indicators.count()
    }
}

/// Classify request text. Total: every input yields a signal.
pub fn classify(text: &str) -> ComplexitySignal {
    let lower = text.to_lowercase();

    let flavor_tags: BTreeSet<FlavorTag> = FLAVOR_VOCABULARY
        .iter()
        .filter(|(term, _)| lower.contains(term))
        .map(|&(_, tag)| tag)
        .collect();
    let flavor_count = flavor_tags.len();

    let mentions = ConditionMentions {
        price: PRICE_MENTION.is_match(&lower),
        flavor: flavor_count > 0,
        origin: ORIGIN_MENTION.is_match(&lower),
    };

    let indicators = ComplexityIndicators {
        multiple_flavors: flavor_count >= 2,
        conjunctions: CONJUNCTION.is_match(&lower),
        specific_numbers: NUMERIC.is_match(&lower),
        comparisons: COMPARISON.is_match(&lower),
        range_conditions: RANGE.is_match(&lower),
        multiple_conditions: mentions.count() >= 2,
        flavor_combination: COMBINATION.is_match(&lower),
    };

    let is_complex = flavor_count >= 2
        || (flavor_count == 1 && indicators.conjunctions)
        || indicators.multiple_conditions
        || indicators.flavor_combination
        || indicators.range_conditions
        || indicators.count() >= 2;

    ComplexitySignal {
        flavor_tags,
        indicators,
        mentions,
        is_complex,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_constraint_request_is_complex() {
        let signal = classify("10만원 이하이면서 스모키하고 바디감이 강한 스코틀랜드 위스키를 추천해줘");

        assert!(signal.is_complex);
        assert!(signal.flavor_tags.contains(&FlavorTag::Smoky));
        assert!(signal.flavor_tags.contains(&FlavorTag::Body));
        assert!(signal.indicators.multiple_flavors);
        assert!(signal.indicators.range_conditions);
        assert!(signal.indicators.flavor_combination);
        assert_eq!(signal.mentions.count(), 3);
    }

    #[test]
    fn test_single_flavor_request_is_simple() {
        let signal = classify("부드러운 위스키 추천해줘");

        assert!(!signal.is_complex);
        assert_eq!(signal.flavor_tags.len(), 1);
        assert!(signal.flavor_tags.contains(&FlavorTag::Smooth));
        assert_eq!(signal.indicator_count(), 0);
    }

    #[test]
    fn test_synonyms_collapse_to_one_tag() {
        // 달콤한 also contains 달콤; 피트 and 스모키 are the same concept
        let signal = classify("달콤한 위스키");
        assert_eq!(signal.flavor_tags.len(), 1);

        let signal = classify("스모키 피트 위스키");
        assert_eq!(signal.flavor_tags.len(), 1);
        assert!(signal.flavor_tags.contains(&FlavorTag::Smoky));

        let signal = classify("풍부한 위스키");
        assert_eq!(signal.flavor_tags.len(), 1);
        assert!(!signal.is_complex);
    }

    #[test]
    fn test_two_flavors_are_complex() {
        let signal = classify("달콤한 스모키 위스키");
        assert!(signal.is_complex);
        assert!(signal.indicators.multiple_flavors);
    }

    #[test]
    fn test_flavor_with_conjunction_is_complex() {
        let signal = classify("스모키하면서 좋은 위스키");
        assert_eq!(signal.flavor_tags.len(), 1);
        assert!(signal.indicators.conjunctions);
        assert!(signal.is_complex);
    }

    #[test]
    fn test_price_and_origin_are_complex() {
        let signal = classify("5만원 일본 위스키");
        assert!(signal.mentions.price);
        assert!(signal.mentions.origin);
        assert!(signal.indicators.multiple_conditions);
        assert!(signal.is_complex);
    }

    #[test]
    fn test_range_language_alone_is_complex() {
        let signal = classify("7만원 이하 위스키");
        assert!(signal.indicators.range_conditions);
        assert!(signal.is_complex);
    }

    #[test]
    fn test_weak_is_not_range_language() {
        let signal = classify("약한 위스키");
        assert!(!signal.indicators.range_conditions);
        assert!(signal.flavor_tags.contains(&FlavorTag::Weak));
        assert!(!signal.is_complex);

        assert!(classify("약 5만원 위스키").indicators.range_conditions);
    }

    #[test]
    fn test_plain_request_is_simple() {
        let signal = classify("위스키 추천해줘");
        assert!(signal.flavor_tags.is_empty());
        assert!(!signal.is_complex);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let text = "부드럽고 달콤한 아일랜드 위스키";
        assert_eq!(classify(text), classify(text));
    }

    #[test]
    fn test_english_flavor_terms() {
        let signal = classify("Something SMOOTH please");
        assert!(signal.flavor_tags.contains(&FlavorTag::Smooth));
        assert!(!signal.is_complex);
    }
}
