pub mod applications;
pub mod handlers;
pub mod state_machine;
