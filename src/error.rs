//! # Errores del Servidor
//! src/error.rs
//!
//! Todo error por conexión queda contenido en el worker que la atiende.
//! Solo `ListenerFatal` termina el proceso.

use crate::http::ParseError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    /// Request line con forma, método o versión inválidos (responde 404)
    #[error("Malformed request: {0}")]
    MalformedRequest(#[from] ParseError),

    /// Path fuera de la allow-list (responde 404)
    #[error("Path not allowed: {0}")]
    PathNotAllowed(String),

    /// El archivo no se pudo abrir, leer o consultar tras pasar la allow-list
    #[error("Resource unavailable: {}: {source}", .path.display())]
    ResourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Fallo de I/O en el socket (incluye timeouts de lectura/escritura)
    #[error("Connection I/O error: {0}")]
    Io(#[from] io::Error),

    /// Fallo al hacer bind o accept en el listener
    #[error("Listener failure on {addr}: {source}")]
    ListenerFatal {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Configuración inválida
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// El pool ya no acepta trabajo
    #[error("Worker pool is shut down")]
    PoolClosed,
}

impl ServerError {
    /// Crea un `ResourceUnavailable` para `path`
    pub fn unavailable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ServerError::ResourceUnavailable {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
