//! Filter implementations for the fast-path pipeline.
//!
//! Each filter applies one kind of constraint extracted from the request.

pub mod flavor_rule;
pub mod origin;
pub mod price_range;

// Re-export for convenience
pub use flavor_rule::FlavorRuleFilter;
pub use origin::OriginFilter;
pub use price_range::PriceRangeFilter;
