pub mod engine;
pub mod portfolio;
