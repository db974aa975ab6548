pub mod backup;
pub mod employee;
pub mod punch;
pub mod report;
