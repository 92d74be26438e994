//! # Cabecera de Respuesta HTTP
//!
//! El body de un archivo puede ser grande, así que no se arma la
//! respuesta completa en memoria: primero se escribe la cabecera y luego
//! el body se copia directamente al socket.
//!
//! ## Formato producido
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/html\r\n
//! Content-Length: 1024\r\n
//! Connection: close\r\n
//! \r\n
//! <body>
//! ```
//!
//! El orden de los headers es siempre ese, y siempre con CRLF.

use super::StatusCode;
use std::io::{self, Write};

/// Content-Type de las respuestas de rechazo
pub const TEXT_PLAIN: &str = "text/plain";

/// Cabecera de una respuesta, construida por cada respuesta enviada
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHeader {
    status: StatusCode,
    content_type: String,
    content_length: u64,
}

impl ResponseHeader {
    /// Crea una cabecera
    ///
    /// # Ejemplo
    /// ```
    /// use static_server::http::{ResponseHeader, StatusCode};
    ///
    /// let header = ResponseHeader::new(StatusCode::Ok, "text/css", 42);
    /// assert_eq!(header.content_length(), 42);
    /// ```
    pub fn new(status: StatusCode, content_type: &str, content_length: u64) -> Self {
        Self {
            status,
            content_type: content_type.to_string(),
            content_length,
        }
    }

    /// Respuesta 404 vacía, usada para todo rechazo
    pub fn not_found() -> Self {
        Self::new(StatusCode::NotFound, TEXT_PLAIN, 0)
    }

    /// Status line sin CRLF (ej: "HTTP/1.1 200 OK")
    pub fn status_line(&self) -> String {
        format!("{} {}", super::request::HTTP_VERSION, self.status)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    /// Convierte la cabecera a bytes, incluyendo la línea vacía final
    pub fn to_bytes(&self) -> Vec<u8> {
        format!(
            "{}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            self.status_line(),
            self.content_type,
            self.content_length
        )
        .into_bytes()
    }

    /// Escribe la cabecera en `out`
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(&self.to_bytes())
    }
}
