// Export components
pub mod forwarder;
pub mod google_calendar;
pub mod parameter_store;
