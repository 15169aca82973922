pub use client::{Endpoints, WidgetClient, CONTRIBUTIONS_BASE_URL, LANYARD_BASE_URL};
pub use error::{Result, WidgetError};
pub use model::*;

pub mod calendar;
mod client;
mod error;
pub(crate) mod fetch;
mod model;
pub mod presence;
pub mod theme;
pub mod ticker;
