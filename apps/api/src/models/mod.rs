pub mod application;
pub mod job;
pub mod round;
pub mod submission;
