//! Authentication for classbook

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{Claims, JwtManager, TokenError};
pub use middleware::{authenticate, AuthError, AuthState, AuthUser};
pub use password::{hash_password, verify_password};
