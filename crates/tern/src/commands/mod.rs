//! CLI subcommands.

pub mod auth;
