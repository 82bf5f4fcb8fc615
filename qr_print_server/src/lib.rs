pub mod error;
pub mod validate;
pub mod web;
