pub mod money;
pub mod project;
pub mod service;
pub mod shared;
