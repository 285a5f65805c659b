mod token_auth;

pub use token_auth::{TokenAuthMiddlewareFactory, TokenAuthMiddlewareService};
