pub mod course;
pub mod polish;
