//! Chat relay service.
//!
//! Accepts `{ "prompt": ... }` over HTTP, forwards it to the Gemini
//! `generateContent` endpoint with a server-held key and relays the first
//! candidate's text back to the caller.

pub mod config;
pub mod error;
pub mod handlers;
pub mod services;
pub mod startup;
