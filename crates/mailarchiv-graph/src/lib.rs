pub mod client;
pub mod error;
pub mod types;

pub use client::GraphClient;
pub use error::{GraphError, GraphResult};
pub use types::*;
