//! `ra-domain`: shared configuration, error and trace types for RunAgent.

pub mod config;
pub mod error;
pub mod trace;
