mod kind;
mod models;
mod spec;

pub use kind::ResourceKind;
pub use models::*;
pub use spec::*;
