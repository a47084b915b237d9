// Network adapter modules split by renderer sockets vs plain HTTP routes.

pub mod client;
pub mod routes;

pub use client::{frame_serializer, ws_handler};
pub use routes::{control_handler, snapshot_handler};
