//! `ra-gateway`: HTTP front end that runs a remote agent to completion.

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod runtime;
pub mod state;
