//! # Módulo HTTP
//!
//! Implementa la parte mínima de HTTP/1.1 que necesita el servidor:
//!
//! - Decodificación de query strings (`query`)
//! - Parsing de la request line (`request`)
//! - Cabecera de la respuesta (`response`)
//! - Códigos de estado (`status`)
//!
//! No hay keep-alive, chunked transfer ni parsing de headers: cada
//! conexión recibe exactamente una respuesta con `Connection: close`.
//!
//! ### Formato de Request
//!
//! ```text
//! GET /path?query=value HTTP/1.1\r\n
//! Header-Name: Header-Value\r\n     <- ignorado
//! \r\n
//! ```

pub mod query;     // Query strings -> multimapa ordenado
pub mod request;   // Parsing de la request line
pub mod response;  // Cabecera de la respuesta
pub mod status;    // Códigos de estado HTTP

// Re-exportamos los tipos principales para facilitar su uso
pub use query::QueryParams;
pub use request::{Method, ParseError, Request};
pub use response::ResponseHeader;
pub use status::StatusCode;
