mod handlers;
mod server;

#[cfg(test)]
mod tests;

pub use server::{StreamServer, StreamServerBuilder};
