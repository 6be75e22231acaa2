//! Interaction flows for ProfNetwork. Each flow is a plain function over a
//! [`profnet_db::Database`] handle and the acting user.

pub mod auth;
pub mod connections;
pub mod convert;
pub mod error;
pub mod graph;
pub mod messages;
pub mod profile;

pub use error::{FlowError, FlowResult};
