pub mod performance;
pub mod urbantz;
