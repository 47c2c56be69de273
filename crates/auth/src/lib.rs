//! `inkwell-auth` — credential hashing and bearer token boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod password;
pub mod token;

pub use claims::{AuthClaims, TokenValidationError, validate_claims};
pub use password::{PasswordDigest, PasswordError, hash_password};
pub use token::{Hs256Jwt, JwtValidator, TokenError, TokenIssuer};
