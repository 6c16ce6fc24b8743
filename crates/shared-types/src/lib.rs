pub mod error;
pub mod feature_flags;

// Stazy domain modules
pub mod access;
pub mod admin;
pub mod booking;
pub mod notification;
pub mod roles;

pub use error::*;
pub use feature_flags::*;

pub use access::*;
pub use admin::*;
pub use booking::*;
pub use notification::*;
pub use roles::*;
