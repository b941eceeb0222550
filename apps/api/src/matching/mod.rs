pub mod codec;
pub mod error;
pub mod evaluator;
pub mod handlers;
pub mod similarity;
