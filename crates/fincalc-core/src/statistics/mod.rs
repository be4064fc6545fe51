pub mod descriptive;
pub mod portfolio;
