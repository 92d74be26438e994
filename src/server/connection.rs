//! # Manejo de una Conexión
//! src/server/connection.rs
//!
//! Cada worker atiende exactamente una conexión con este handler:
//!
//! ```text
//! AwaitingLine ──(sin línea / línea inválida)──▶ RejectedMalformed  → 404
//!      │
//!      ▼ parse ok
//!   Parsed ──(path fuera de la allow-list)─────▶ RejectedNotFound   → 404
//!      │
//!      ▼
//!  Validated ──▶ Served                          → 200 + archivo
//! ```
//!
//! Los dos rechazos responden `404 Not Found`, `text/plain` y body vacío.
//! Un error de I/O mientras se sirve aborta solo esta conexión: se
//! retorna al llamador, que lo registra. El socket se cierra siempre al
//! salir de `handle`, porque el `TcpStream` se consume y se libera ahí.

use crate::error::{Result, ServerError};
use crate::files::FileResponder;
use crate::http::{Request, ResponseHeader, StatusCode};
use crate::policy::AllowList;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Largo máximo leído para la request line
pub const MAX_REQUEST_LINE: u64 = 8192;

/// Estado terminal de una conexión atendida
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Archivo enviado; incluye los bytes de body
    Served { bytes: u64 },

    /// La conexión no entregó una request line válida
    RejectedMalformed,

    /// El path no está en la allow-list
    RejectedNotFound,
}

impl Outcome {
    /// Código de estado enviado al cliente
    pub fn status(&self) -> StatusCode {
        match self {
            Outcome::Served { .. } => StatusCode::Ok,
            Outcome::RejectedMalformed | Outcome::RejectedNotFound => StatusCode::NotFound,
        }
    }
}

/// Orquesta parsing, allow-list y envío del archivo para una conexión
#[derive(Debug, Clone)]
pub struct ConnectionHandler {
    allow_list: Arc<AllowList>,
    responder: FileResponder,
    io_timeout: Option<Duration>,
}

impl ConnectionHandler {
    pub fn new(
        allow_list: Arc<AllowList>,
        responder: FileResponder,
        io_timeout: Option<Duration>,
    ) -> Self {
        Self {
            allow_list,
            responder,
            io_timeout,
        }
    }

    /// Atiende una conexión TCP completa y la cierra
    pub fn handle(&self, stream: TcpStream) -> Result<Outcome> {
        let start = Instant::now();

        stream.set_read_timeout(self.io_timeout)?;
        stream.set_write_timeout(self.io_timeout)?;

        let reader = BufReader::new(&stream);
        let mut writer = BufWriter::new(&stream);
        let outcome = self.serve(reader, &mut writer)?;

        info!(
            status = outcome.status().as_u16(),
            ?outcome,
            latency_ms = start.elapsed().as_secs_f64() * 1000.0,
            "respuesta enviada"
        );

        Ok(outcome)
    }

    /// Recorre la máquina de estados sobre un lector y un escritor
    pub fn serve<R: BufRead, W: Write>(&self, mut reader: R, out: &mut W) -> Result<Outcome> {
        // AwaitingLine
        let line = match Self::read_request_line(&mut reader)? {
            Some(line) => line,
            None => {
                debug!("conexión sin request line");
                return Self::reject(out, Outcome::RejectedMalformed);
            }
        };

        // Parsed → Validated
        let request = match self.accept_request(&line) {
            Ok(request) => request,
            Err(e @ ServerError::MalformedRequest(_)) => {
                debug!(error = %e, "rechazado");
                return Self::reject(out, Outcome::RejectedMalformed);
            }
            Err(e @ ServerError::PathNotAllowed(_)) => {
                debug!(error = %e, "rechazado");
                return Self::reject(out, Outcome::RejectedNotFound);
            }
            Err(e) => return Err(e),
        };

        debug!(method = request.method().as_str(), path = request.path(), "request");

        // Served
        let bytes = self.responder.respond(out, request.path(), &request)?;
        Ok(Outcome::Served { bytes })
    }

    /// Parsea la request line y la valida contra la allow-list
    ///
    /// `MalformedRequest` si la línea no se puede parsear y
    /// `PathNotAllowed` si el path no está permitido.
    fn accept_request(&self, line: &str) -> Result<Request> {
        let request = Request::parse(line)?;

        if !self.allow_list.is_allowed(request.path()) {
            return Err(ServerError::PathNotAllowed(request.path().to_string()));
        }

        Ok(request)
    }

    fn reject<W: Write>(out: &mut W, outcome: Outcome) -> Result<Outcome> {
        ResponseHeader::not_found().write_to(out)?;
        out.flush()?;
        Ok(outcome)
    }

    /// Lee la primera línea; `None` si el peer cerró sin enviar nada
    fn read_request_line<R: BufRead>(reader: &mut R) -> std::io::Result<Option<String>> {
        let mut buffer = Vec::new();
        let read = reader
            .by_ref()
            .take(MAX_REQUEST_LINE)
            .read_until(b'\n', &mut buffer)?;

        if read == 0 {
            return Ok(None);
        }

        Ok(Some(String::from_utf8_lossy(&buffer).into_owned()))
    }
}
