pub mod auth;
mod client;
pub mod credentials;
pub mod models;
pub mod time;
pub mod token;

pub use auth::{
    AuthorizationCodeSupplier, ConsoleCodeSupplier, LoopbackCodeSupplier, StaticCodeSupplier,
};
pub use client::CalendarClient;
pub use credentials::{Credential, OAuthClientConfig, CALENDAR_READONLY_SCOPE};
pub use models::{CalendarEvent, EventDateTime};
pub use time::QueryWindow;
pub use token::TokenProvider;
