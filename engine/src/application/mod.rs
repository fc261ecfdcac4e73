//! Application Layer
//!
//! Wires the domain services to real infrastructure: the [`Engine`]
//! composition root, the [`Worker`] coordinator and the [`RenderClient`].

pub mod discovery;
pub mod engine;
pub mod render;
pub mod worker;

pub use engine::Engine;
pub use render::RenderClient;
pub use worker::Worker;
