pub mod compare;
pub mod engine;
pub mod strategy;
