pub mod blog;
pub mod system;
pub mod user;
