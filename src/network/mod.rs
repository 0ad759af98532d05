pub mod backoff;
pub mod client;
pub mod error;
pub mod http;
pub mod live;

pub use client::ChatClient;
