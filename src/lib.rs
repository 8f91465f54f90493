//! Opendoorz back-end core.
//!
//! Real-estate listing storage plus the WhatsApp inquiry pipeline: a
//! round-robin rotator distributes inquiry links across an admin-managed
//! list of contact numbers, with a durable cursor that survives restarts
//! and stays fair under concurrent callers.
//!
//! See `DESIGN.md` for architecture notes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod db;
pub mod logging;

pub mod directory;
pub mod listings;
pub mod rotator;

pub mod inquiry;
