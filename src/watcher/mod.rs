pub mod decoder;
pub mod dedup;
pub mod stream;
pub mod types;
