pub mod notify;
pub mod stats;
pub mod study_store;
