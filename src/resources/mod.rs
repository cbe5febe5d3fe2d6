//! Table-driven CRUD shared by every portfolio resource.

pub mod handler;
pub mod kinds;

pub use handler::{Audience, ResourceHandler};
pub use kinds::{Approval, FieldChoices, Kind, ResourceKind};
