//! Authentication: JWT issue/verify and token revocation

pub mod revocation;
pub mod token;

pub use token::{Identity, auth_middleware, decode_token, issue_token};
