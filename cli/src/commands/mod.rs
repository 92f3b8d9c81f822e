pub mod batch;
pub mod merge;
pub mod overlay;
pub mod split;
