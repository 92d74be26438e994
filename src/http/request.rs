//! # Parsing de la Request Line
//! src/http/request.rs
//!
//! El servidor solo mira la primera línea del request; el resto de
//! headers se ignora.
//!
//! ## Formato aceptado
//!
//! ```text
//! GET /path?param1=value1&param2=value2 HTTP/1.1
//! ```
//!
//! El resultado es un `Result`: `Ok(Request)` cuando la línea es válida,
//! `Err(ParseError)` cuando está malformada. No hay otro camino.

use super::query::{self, QueryParams};
use thiserror::Error;

/// Única versión HTTP aceptada
pub const HTTP_VERSION: &str = "HTTP/1.1";

/// Métodos HTTP soportados
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Obtener un recurso
    GET,
}

impl Method {
    /// Parsea un método HTTP (sin distinguir mayúsculas)
    fn from_token(s: &str) -> Result<Self, ParseError> {
        if s.eq_ignore_ascii_case("GET") {
            Ok(Method::GET)
        } else {
            Err(ParseError::UnsupportedMethod(s.to_string()))
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
        }
    }
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// La conexión no entregó ninguna línea
    #[error("Empty request")]
    EmptyRequest,

    /// La línea no tiene exactamente 3 tokens
    #[error("Invalid request line format: expected 3 tokens, got {0}")]
    InvalidRequestLine(usize),

    /// Método distinto de GET
    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// Versión distinta de HTTP/1.1
    #[error("Invalid HTTP version: {0}")]
    InvalidHttpVersion(String),
}

/// Request parseado a partir de la request line
///
/// Se crea una vez por conexión y no se modifica después.
#[derive(Debug, Clone)]
pub struct Request {
    /// Método HTTP (siempre GET)
    method: Method,

    /// Path sin query string (ej: "/index.html")
    path: String,

    /// Query parameters decodificados, en orden
    query_params: QueryParams,

    /// Versión HTTP (siempre "HTTP/1.1")
    version: String,
}

impl Request {
    /// Parsea una request line
    ///
    /// Se toleran el `\r\n` final y espacios extra entre tokens.
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use static_server::http::Request;
    ///
    /// let request = Request::parse("GET /index.html?lang=es HTTP/1.1").unwrap();
    ///
    /// assert_eq!(request.path(), "/index.html");
    /// assert_eq!(request.query_param("lang"), Some("es"));
    /// ```
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        if parts.is_empty() {
            return Err(ParseError::EmptyRequest);
        }

        // Debe tener exactamente 3 partes: METHOD TARGET VERSION
        if parts.len() != 3 {
            return Err(ParseError::InvalidRequestLine(parts.len()));
        }

        let method = Method::from_token(parts[0])?;

        if parts[2] != HTTP_VERSION {
            return Err(ParseError::InvalidHttpVersion(parts[2].to_string()));
        }

        let (path, query_params) = Self::parse_target(parts[1]);

        Ok(Request {
            method,
            path,
            query_params,
            version: parts[2].to_string(),
        })
    }

    /// Separa el target en path y query en el primer '?'
    ///
    /// El path se deja tal cual; solo la query se decodifica.
    fn parse_target(target: &str) -> (String, QueryParams) {
        match target.split_once('?') {
            Some((path, raw_query)) => (path.to_string(), query::decode(raw_query)),
            None => (target.to_string(), QueryParams::new()),
        }
    }

    // === Métodos públicos para acceder a los campos ===

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Obtiene todos los query parameters
    pub fn query_params(&self) -> &QueryParams {
        &self.query_params
    }

    /// Primer valor de un query parameter
    ///
    /// # Ejemplo
    /// ```
    /// use static_server::http::Request;
    ///
    /// let request = Request::parse("GET /test?num=42&num=7 HTTP/1.1").unwrap();
    ///
    /// assert_eq!(request.query_param("num"), Some("42"));
    /// assert_eq!(request.query_param("missing"), None);
    /// ```
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.first(name)
    }

    /// Todos los valores de un query parameter
    pub fn query_param_all(&self, name: &str) -> &[String] {
        self.query_params.all(name)
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}
