pub mod base;
pub mod b3;
