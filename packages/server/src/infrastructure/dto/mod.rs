//! Data transfer objects for the HTTP API, the event stream and webhooks.

pub mod event;
pub mod http;
pub mod notification;
