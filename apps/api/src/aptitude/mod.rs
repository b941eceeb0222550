pub mod handlers;
pub mod paper;
pub mod quota;
pub mod sampler;
