pub mod aggregate;
pub mod classify;
pub mod comparator;
pub mod delta;
pub mod monitoring;
