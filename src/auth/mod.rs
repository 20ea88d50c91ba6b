//! Authentication: session tokens, password handling, the request guard and
//! the `/auth` routes

pub mod guard;
pub mod handlers;
pub mod password;
pub mod token;

pub use guard::CurrentUser;
pub use token::{TokenError, TokenIssuer};
