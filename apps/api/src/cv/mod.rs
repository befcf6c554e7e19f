pub mod bullets;
pub mod extractor;
pub mod generator;
pub mod handlers;
pub mod processor;
pub mod summary;
