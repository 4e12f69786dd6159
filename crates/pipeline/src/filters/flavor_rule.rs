//! Keeps candidates satisfying the request's flavor rule.
//!
//! Only one rule is ever applied: the first keyword found in the request.

use crate::constraints::QueryConstraints;
use crate::traits::Filter;
use anyhow::Result;
use catalog::CatalogItem;

pub struct FlavorRuleFilter;

impl Filter for FlavorRuleFilter {
    fn name(&self) -> &str {
        "FlavorRuleFilter"
    }

    fn apply(
        &self,
        candidates: Vec<CatalogItem>,
        constraints: &QueryConstraints,
    ) -> Result<Vec<CatalogItem>> {
        let Some(rule) = constraints.flavor else {
            return Ok(candidates);
        };

        Ok(candidates
            .into_iter()
            .filter(|item| rule.matches(&item.flavor))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::FlavorRule;
    use catalog::FlavorProfile;

    #[test]
    fn test_smoky_rule() {
        let candidates = vec![
            CatalogItem::new("W7", "Islay", 77_400.0).with_flavor(FlavorProfile::new(3.0, 5.0, 5.0, 2.0)),
            CatalogItem::new("W1", "Speyside", 94_100.0).with_flavor(FlavorProfile::new(2.0, 3.0, 0.0, 3.0)),
        ];
        let constraints = QueryConstraints {
            flavor: Some(FlavorRule::Smoky),
            ..QueryConstraints::default()
        };

        let filtered = FlavorRuleFilter.apply(candidates, &constraints).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "W7");
    }
}
