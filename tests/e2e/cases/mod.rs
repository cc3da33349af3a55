//! Exporter end-to-end test cases

mod cycle;
mod events;
mod server;
