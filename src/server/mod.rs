//! # Módulo del Servidor
//! src/server/mod.rs
//!
//! 1. `tcp`: escucha en un puerto y acepta conexiones
//! 2. `pool`: pool de workers de tamaño fijo con envío bloqueante
//! 3. `connection`: atiende una conexión (request line → allow-list → archivo)

pub mod connection;
pub mod pool;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use connection::{ConnectionHandler, Outcome};
pub use pool::WorkerPool;
pub use tcp::Server;
