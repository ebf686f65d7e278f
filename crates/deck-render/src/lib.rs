pub mod hit;
pub mod paint;
