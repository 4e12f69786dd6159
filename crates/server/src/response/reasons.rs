//! Short reasons derived from an item's own attributes, for items the model
//! did not explain.

use catalog::CatalogItem;

const FALLBACK: &str = "Chosen to match the request";

/// Up to three traits of `item`, e.g. "Reasonable price, strong smoky aroma, full body"
pub fn profile_reason(item: &CatalogItem) -> String {
    let f = &item.flavor;
    let mut traits: Vec<&str> = Vec::new();

    if item.price > 0.0 && item.price < 80_000.0 {
        traits.push("reasonable price");
    } else if item.price > 0.0 && item.price < 100_000.0 {
        traits.push("fair price");
    }

    if f.smoke >= 4.0 {
        traits.push("strong smoky aroma");
    } else if f.smoke >= 2.0 {
        traits.push("moderate smokiness");
    }

    if f.body >= 4.0 {
        traits.push("full body");
    } else if f.body >= 3.0 {
        traits.push("medium body");
    }

    if f.richness >= 4.0 {
        traits.push("deep flavor");
    } else if f.richness >= 3.0 {
        traits.push("balanced flavor");
    }

    if f.sweetness >= 3.0 {
        traits.push("gentle sweetness");
    } else if f.sweetness <= 1.0 {
        traits.push("dry palate");
    }

    match item.age {
        Some(age) if age >= 15 => traits.push("long maturation"),
        Some(age) if age >= 12 => traits.push("well matured"),
        _ => {}
    }

    if item.origin.eq_ignore_ascii_case("scotland") {
        traits.push("Scottish tradition");
    }

    traits.truncate(3);
    let joined = traits.join(", ");
    let mut chars = joined.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => FALLBACK.to_string(),
    }
}
