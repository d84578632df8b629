pub mod api;
pub mod favorites;
pub mod gallery;
pub mod models;
