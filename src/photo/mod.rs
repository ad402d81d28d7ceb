pub mod data;
pub mod metadata;
