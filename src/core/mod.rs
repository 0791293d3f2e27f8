pub mod merge;
pub mod pattern;
pub mod table;

pub use merge::merge_rules;
pub use pattern::RoutePattern;
pub use table::RuleTable;
