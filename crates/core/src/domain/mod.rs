pub mod comment;
pub mod dedup;
