//! # Envío de Archivos
//! src/files/responder.rs
//!
//! Recibe un path que ya pasó la allow-list, lo resuelve bajo el
//! directorio público y escribe la respuesta completa en la conexión.
//!
//! Hay dos caminos:
//!
//! 1. **Template** (`/classic.html`): se lee todo como texto, se reemplaza
//!    `{time}` por la hora actual y el `Content-Length` es el largo del
//!    contenido ya sustituido.
//! 2. **Resto**: `Content-Length` es el tamaño en disco y el archivo se
//!    copia byte a byte sin transformarlo.
//!
//! En ambos casos el largo se calcula antes de escribir el primer byte.

use crate::error::{Result, ServerError};
use crate::http::{Request, ResponseHeader, StatusCode};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Path que se sirve como template
pub const TEMPLATE_PATH: &str = "/classic.html";

/// Token que se reemplaza en el template
pub const TIME_PLACEHOLDER: &str = "{time}";

/// Content-Type cuando la extensión no dice nada
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Formato del timestamp insertado en el template (fecha-hora ISO-8601 local)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Sirve archivos desde un directorio raíz
#[derive(Debug, Clone)]
pub struct FileResponder {
    root: PathBuf,
}

impl FileResponder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Concatena el path del request al directorio raíz
    ///
    /// # Ejemplo
    /// ```
    /// use static_server::files::FileResponder;
    /// use std::path::Path;
    ///
    /// let responder = FileResponder::new("./public");
    /// assert_eq!(responder.resolve("/index.html"), Path::new("./public/index.html"));
    /// ```
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }

    /// Escribe cabecera y body para `path` en `out`
    ///
    /// Retorna el número de bytes de body enviados. Si el archivo no se
    /// puede abrir o leer antes de escribir la cabecera, retorna
    /// `ResourceUnavailable` sin haber escrito nada.
    pub fn respond<W: Write>(&self, out: &mut W, path: &str, request: &Request) -> Result<u64> {
        let file_path = self.resolve(path);

        debug!(
            file = %file_path.display(),
            query_keys = request.query_params().len(),
            "resolviendo archivo"
        );

        let sent = if path == TEMPLATE_PATH {
            self.send_template(out, &file_path)?
        } else {
            self.send_file(out, &file_path)?
        };

        out.flush()?;
        Ok(sent)
    }

    fn send_template<W: Write>(&self, out: &mut W, file_path: &Path) -> Result<u64> {
        let template =
            fs::read_to_string(file_path).map_err(|e| ServerError::unavailable(file_path, e))?;

        let content = render_template(&template, &current_timestamp());
        let body = content.as_bytes();

        ResponseHeader::new(StatusCode::Ok, &content_type_for(file_path), body.len() as u64)
            .write_to(out)?;
        out.write_all(body)?;

        Ok(body.len() as u64)
    }

    fn send_file<W: Write>(&self, out: &mut W, file_path: &Path) -> Result<u64> {
        let mut file = File::open(file_path).map_err(|e| ServerError::unavailable(file_path, e))?;
        let metadata = file
            .metadata()
            .map_err(|e| ServerError::unavailable(file_path, e))?;

        if !metadata.is_file() {
            return Err(ServerError::unavailable(
                file_path,
                io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
            ));
        }

        let length = metadata.len();
        ResponseHeader::new(StatusCode::Ok, &content_type_for(file_path), length).write_to(out)?;

        let copied = io::copy(&mut file, out)?;
        if copied != length {
            // El archivo cambió de tamaño mientras se enviaba
            return Err(ServerError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("sent {} of {} announced bytes", copied, length),
            )));
        }

        Ok(copied)
    }
}

/// Reemplaza cada aparición de `{time}` por `timestamp`
pub fn render_template(template: &str, timestamp: &str) -> String {
    template.replace(TIME_PLACEHOLDER, timestamp)
}

/// Hora local actual en `TIMESTAMP_FORMAT`
pub fn current_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Content-Type según la extensión, con fallback binario
pub fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string()
}
