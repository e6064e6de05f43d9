pub mod pagination;
pub mod repository;
pub mod types;
