//! DNS-facing adapters: the hickory request handler and client address
//! extraction.

pub mod client_info;
pub mod handler;

pub use client_info::extract_client_ip;
pub use handler::GslbHandler;
