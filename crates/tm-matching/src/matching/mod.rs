pub mod experience;
pub mod pipeline;
pub mod prefilter;
pub mod query;
pub mod ranking;
pub mod scoring;
