mod common;
mod recipe_tests;
