//! Heroku add-on webhooks

pub(crate) mod auth;
mod errors;
mod handlers;
mod models;

pub(crate) use handlers::*;
