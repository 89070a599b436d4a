pub mod error;
pub mod merge;
pub mod model;
pub mod mutate;
pub mod query;
pub mod validate;
