//! Constraints extracted from request text for the fast path's filters.
//!
//! Extraction is keyword based and deliberately shallow: at most one price
//! bound, one flavor rule and one origin.

use catalog::FlavorProfile;
use once_cell::sync::Lazy;
use regex::Regex;

/// "A만원에서 B만원": takes precedence over a single bound
static PRICE_RANGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)만원에서\s*(\d+)만원").unwrap());

static PRICE_SINGLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:(\d+)만원|(\d+)원)(\s*이상)?").unwrap());

const MANWON: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PriceBounds {
    pub fn contains(&self, price: f64) -> bool {
        self.min.is_none_or(|min| price >= min) && self.max.is_none_or(|max| price <= max)
    }

    /// Parse a price constraint; `None` when the text names no price
    pub fn parse(text: &str) -> Option<Self> {
        if let Some(caps) = PRICE_RANGE.captures(text) {
            let low = caps[1].parse::<f64>().ok()?;
            let high = caps[2].parse::<f64>().ok()?;
            return Some(Self {
                min: Some(low * MANWON),
                max: Some(high * MANWON),
            });
        }

        let caps = PRICE_SINGLE.captures(text)?;
        let amount = match (caps.get(1), caps.get(2)) {
            (Some(manwon), _) => manwon.as_str().parse::<f64>().ok()? * MANWON,
            (None, Some(won)) => won.as_str().parse::<f64>().ok()?,
            (None, None) => return None,
        };

        // "N만원 이상" is a floor; every other single amount is a ceiling
        if caps.get(3).is_some() {
            Some(Self { min: Some(amount), max: None })
        } else {
            Some(Self { min: None, max: Some(amount) })
        }
    }
}

/// Threshold condition over the flavor vector, keyed by one keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlavorRule {
    Smooth,
    Sweet,
    Smoky,
    Peated,
    Rich,
    Light,
}

/// Checked in order; the first keyword found decides the rule
const FLAVOR_RULES: &[(&str, FlavorRule)] = &[
    ("부드러운", FlavorRule::Smooth),
    ("달콤한", FlavorRule::Sweet),
    ("스모키", FlavorRule::Smoky),
    ("피트", FlavorRule::Peated),
    ("풍부한", FlavorRule::Rich),
    ("라이트", FlavorRule::Light),
    ("smooth", FlavorRule::Smooth),
    ("sweet", FlavorRule::Sweet),
    ("smoky", FlavorRule::Smoky),
    ("peat", FlavorRule::Peated),
];

impl FlavorRule {
    pub fn matches(&self, flavor: &FlavorProfile) -> bool {
        match self {
            FlavorRule::Smooth => flavor.smoke <= 2.0 && flavor.body <= 3.0,
            FlavorRule::Sweet => flavor.sweetness >= 3.0,
            FlavorRule::Smoky => flavor.smoke >= 3.0,
            FlavorRule::Peated => flavor.smoke >= 4.0,
            FlavorRule::Rich => flavor.richness >= 4.0,
            FlavorRule::Light => flavor.body <= 2.0,
        }
    }

    /// First rule whose keyword occurs in the lower-cased text
    pub fn detect(lower: &str) -> Option<Self> {
        FLAVOR_RULES
            .iter()
            .find(|(keyword, _)| lower.contains(keyword))
            .map(|&(_, rule)| rule)
    }
}

const ORIGIN_KEYWORDS: &[(&str, &str)] = &[
    ("스코틀랜드", "Scotland"),
    ("아일랜드", "Ireland"),
    ("일본", "Japan"),
    ("미국", "USA"),
    ("캐나다", "Canada"),
    ("scotland", "Scotland"),
    ("scotch", "Scotland"),
    ("ireland", "Ireland"),
    ("irish", "Ireland"),
    ("japan", "Japan"),
    ("usa", "USA"),
    ("canada", "Canada"),
];

/// Everything the fast path's filters need to know about a request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryConstraints {
    pub price: Option<PriceBounds>,
    pub flavor: Option<FlavorRule>,
    pub origin: Option<&'static str>,
}

impl QueryConstraints {
    pub fn parse(text: &str) -> Self {
        let lower = text.to_lowercase();
        Self {
            price: PriceBounds::parse(&lower),
            flavor: FlavorRule::detect(&lower),
            origin: ORIGIN_KEYWORDS
                .iter()
                .find(|(keyword, _)| lower.contains(keyword))
                .map(|&(_, origin)| origin),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.price.is_none() && self.flavor.is_none() && self.origin.is_none()
    }
}
