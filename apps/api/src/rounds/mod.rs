pub mod directory;
pub mod handlers;
pub mod ordering;
