pub mod dashboard;
pub mod log;
pub mod report;
pub mod session;
pub mod tasks;
pub mod team;
