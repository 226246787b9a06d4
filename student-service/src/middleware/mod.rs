pub mod auth;

pub use auth::RequestContext;
