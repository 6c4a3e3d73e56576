pub mod funnel;
pub mod handlers;
