pub mod models;
pub mod tracking;
