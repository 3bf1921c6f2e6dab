pub mod ai;
pub mod health;
pub mod plan;
pub mod recipe;
