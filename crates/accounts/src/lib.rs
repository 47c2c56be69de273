//! Accounts domain module.
//!
//! User records plus the signup/signin payload schemas, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod user;

pub use user::{NewUser, Signin, SigninPayload, Signup, SignupPayload, User};
