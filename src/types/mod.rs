// src/types/mod.rs
pub mod post;
pub mod report;

pub use post::{fields, JobPost};
pub use report::ChangeRow;
