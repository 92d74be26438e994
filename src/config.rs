//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración por argumentos CLI y variables de entorno. La allow-list
//! de paths no es configurable: vive en `policy`.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./static_server --port 9999 --workers 64 --public-dir ./public
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 WORKERS=16 IO_TIMEOUT_MS=0 ./static_server
//! ```

use crate::error::{Result, ServerError};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Configuración del servidor de archivos
#[derive(Debug, Clone, Parser)]
#[command(name = "static_server")]
#[command(about = "Servidor de archivos estáticos HTTP/1.1 con pool de workers acotado")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "9999", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "HTTP_HOST")]
    pub host: String,

    /// Número máximo de conexiones atendidas en paralelo
    #[arg(short, long, default_value = "64", env = "WORKERS")]
    pub workers: usize,

    /// Directorio raíz de los archivos servidos
    #[arg(long = "public-dir", default_value = "./public", env = "PUBLIC_DIR")]
    pub public_dir: PathBuf,

    /// Deadline de lectura/escritura por conexión en milisegundos (0 = sin límite)
    #[arg(long = "io-timeout-ms", default_value = "30000", env = "IO_TIMEOUT_MS")]
    pub io_timeout_ms: u64,
}

impl Config {
    /// Parsea argumentos CLI (y variables de entorno)
    pub fn new() -> Self {
        Config::parse()
    }

    /// Dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use static_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:9999");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Timeout de I/O por conexión; `None` si está deshabilitado
    pub fn io_timeout(&self) -> Option<Duration> {
        match self.io_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(ServerError::InvalidConfig("workers must be >= 1".to_string()));
        }

        Ok(())
    }

    /// Registra un resumen de la configuración
    pub fn log_summary(&self) {
        info!(
            address = %self.address(),
            workers = self.workers,
            public_dir = %self.public_dir.display(),
            io_timeout_ms = self.io_timeout_ms,
            "configuración cargada"
        );
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 9999,
            host: "0.0.0.0".to_string(),
            workers: 64,
            public_dir: PathBuf::from("./public"),
            io_timeout_ms: 30_000,
        }
    }
}
