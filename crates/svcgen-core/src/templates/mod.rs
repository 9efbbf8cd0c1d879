pub mod dir;
pub mod manager;

pub use dir::*;
pub use manager::*;

/// Template rendering one service implementation
pub const SERVICE_TEMPLATE: &str = "service_impl.rs.tera";

/// Template rendering the `mod.rs` listing generated modules
pub const MOD_TEMPLATE: &str = "mod.rs.tera";
