/// Session aggregate and its value types
pub mod session;

/// Storage traits
pub mod repository;
