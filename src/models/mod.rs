pub mod priority;
pub mod task;
pub mod task_status;
