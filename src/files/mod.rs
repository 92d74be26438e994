//! # Módulo de Archivos
//!
//! Resuelve paths permitidos a archivos del directorio público y los
//! envía con su cabecera HTTP.

pub mod responder;

pub use responder::FileResponder;
