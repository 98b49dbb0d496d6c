

pub mod common;
