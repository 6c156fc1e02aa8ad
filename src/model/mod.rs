pub mod birth_query;
pub mod chart_set;
pub mod insight;
pub mod placement;
