//! Command-line tool layer over the Odoo record service
//!
//! [`AppContext`] is built once per process and hands the shared
//! [`OdooService`](odoo_client::OdooService) to every command; [`tools`]
//! holds the argument parsing and result shaping the commands share.

pub mod context;
pub mod tools;

pub use context::AppContext;
