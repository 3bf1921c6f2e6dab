/// Repository module
///
/// This module provides the data access layer for the application: storing,
/// retrieving and deleting generated meal plans.

mod meal_plan_repo;

pub use meal_plan_repo::*;
