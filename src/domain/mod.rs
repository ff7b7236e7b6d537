pub mod change;
pub mod comparison;
pub mod diff_hash;
pub mod history;
pub mod normalize;
pub mod ports;
pub mod report;
pub mod snapshot;
pub mod value_objects;
