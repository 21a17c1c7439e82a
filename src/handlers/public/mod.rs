// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Every path routed here must also appear in `middleware::PUBLIC_PATHS`.

pub mod auth;
pub mod status;

pub use status::{health, root};
