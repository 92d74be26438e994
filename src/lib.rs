//! # Static Server
//! src/lib.rs
//!
//! Servidor de archivos HTTP/1.1 mínimo: acepta conexiones TCP, parsea
//! una request line `GET`, valida el path contra una allow-list fija y
//! envía el archivo correspondiente con `Connection: close`.
//!
//! ## Arquitectura
//!
//! ```text
//! Listener ─▶ WorkerPool ─▶ ConnectionHandler ─▶ Request::parse (query::decode)
//!                                   │
//!                                   ├─▶ AllowList::is_allowed
//!                                   └─▶ FileResponder::respond ─▶ socket
//! ```
//!
//! - `http`: request line, query strings, cabecera de respuesta
//! - `policy`: allow-list de paths servibles
//! - `files`: resolución de archivos, Content-Type y template
//! - `server`: listener, pool de workers y manejo de conexiones
//! - `config`: argumentos CLI / variables de entorno
//! - `error`: tipos de error
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use static_server::config::Config;
//! use static_server::server::Server;
//!
//! let server = Server::bind(Config::default()).expect("bind");
//! server.run().expect("listener");
//! ```

pub mod config;
pub mod error;
pub mod files;
pub mod http;
pub mod policy;
pub mod server;

pub use error::{Result, ServerError};
