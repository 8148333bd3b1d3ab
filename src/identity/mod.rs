//! Identity and session management: the trust boundary between a caller's
//! credentials and everything the backend will do on their behalf.
//! Keep the public surface thin and split implementation across sub-modules.

mod password;
mod registration;
mod token;
mod resolver;
mod authorizer;

pub use password::{hash_password, verify_password};
pub use registration::{register, RegisterRequest};
pub use token::{Claims, TokenIssuer};
pub use resolver::{resolve_from_credentials, AuthenticatedCaller};
pub use authorizer::is_owner;
