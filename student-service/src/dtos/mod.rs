pub mod auth;
pub mod fee_structures;
pub mod payments;
pub mod students;
pub mod teachers;
