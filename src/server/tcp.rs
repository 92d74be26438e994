//! # Listener y Dispatcher
//! src/server/tcp.rs
//!
//! Un thread acepta conexiones y las entrega a un pool de N workers.
//! Si todos los workers están ocupados, `accept` espera a que uno se
//! libere (backpressure): ninguna conexión se descarta.
//!
//! Un error del listener (bind o accept) es fatal: se registra, el pool
//! deja de recibir trabajo, se espera a las conexiones en curso y `run`
//! retorna el error.

use super::connection::ConnectionHandler;
use super::pool::WorkerPool;
use crate::config::Config;
use crate::error::{Result, ServerError};
use crate::files::FileResponder;
use crate::policy::AllowList;
use std::io;
use std::iter;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Servidor de archivos con concurrencia acotada
pub struct Server {
    address: String,
    listener: TcpListener,
    handler: Arc<ConnectionHandler>,
    pool: WorkerPool,
}

impl Server {
    /// Crea el pool y hace bind con la allow-list por defecto
    pub fn bind(config: Config) -> Result<Self> {
        Self::with_allow_list(config, AllowList::default())
    }

    /// Crea el pool y hace bind con una allow-list dada
    pub fn with_allow_list(config: Config, allow_list: AllowList) -> Result<Self> {
        config.validate()?;

        let pool = WorkerPool::new(config.workers)?;
        let address = config.address();

        // Si el bind falla, `pool` se libera aquí y su Drop une los workers
        let listener = TcpListener::bind(&address).map_err(|source| {
            error!(address = %address, error = %source, "no se pudo hacer bind");
            ServerError::ListenerFatal {
                addr: address.clone(),
                source,
            }
        })?;

        let handler = ConnectionHandler::new(
            Arc::new(allow_list),
            FileResponder::new(config.public_dir.clone()),
            config.io_timeout(),
        );

        Ok(Self {
            address,
            listener,
            handler: Arc::new(handler),
            pool,
        })
    }

    /// Dirección real del socket (útil con puerto 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Acepta conexiones hasta que el listener falle
    pub fn run(self) -> Result<()> {
        let Server {
            address,
            listener,
            handler,
            pool,
        } = self;

        info!(
            address = %address,
            workers = pool.size(),
            "servidor escuchando"
        );

        let connections = iter::repeat_with(|| listener.accept());
        Self::dispatch(&address, connections, handler, pool)
    }

    /// Reparte las conexiones aceptadas al pool y lo apaga al terminar
    ///
    /// Termina con `ListenerFatal` ante el primer error de accept no
    /// transitorio, o con `Ok` si el iterador se agota. En ambos casos
    /// espera a que terminen las conexiones en curso.
    fn dispatch<I>(
        address: &str,
        connections: I,
        handler: Arc<ConnectionHandler>,
        mut pool: WorkerPool,
    ) -> Result<()>
    where
        I: IntoIterator<Item = io::Result<(TcpStream, SocketAddr)>>,
    {
        let result = Self::accept_loop(address, connections, &handler, &pool);

        if let Err(e) = &result {
            error!(error = %e, "listener detenido; apagando pool de workers");
        }

        pool.shutdown();
        info!("pool de workers detenido");

        result
    }

    fn accept_loop<I>(
        address: &str,
        connections: I,
        handler: &Arc<ConnectionHandler>,
        pool: &WorkerPool,
    ) -> Result<()>
    where
        I: IntoIterator<Item = io::Result<(TcpStream, SocketAddr)>>,
    {
        for accepted in connections {
            let (stream, peer) = match accepted {
                Ok(accepted) => accepted,
                Err(e) if is_transient(&e) => {
                    warn!(error = %e, "accept interrumpido; reintentando");
                    continue;
                }
                Err(source) => {
                    return Err(ServerError::ListenerFatal {
                        addr: address.to_string(),
                        source,
                    })
                }
            };

            debug!(%peer, "nueva conexión");

            let handler = Arc::clone(handler);
            pool.execute(move || {
                if let Err(e) = handler.handle(stream) {
                    warn!(%peer, error = %e, "conexión terminó con error");
                }
            })?;
        }

        Ok(())
    }
}

/// Errores de accept que afectan a una sola conexión pendiente
fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::ConnectionAborted | io::ErrorKind::ConnectionReset
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::thread;
    use std::time::{Duration, Instant};

    fn test_config(dir: &std::path::Path, workers: usize) -> Config {
        Config {
            port: 0,
            host: "127.0.0.1".to_string(),
            workers,
            public_dir: dir.to_path_buf(),
            io_timeout_ms: 5_000,
        }
    }

    fn get(addr: SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).unwrap();
        write!(stream, "GET {} HTTP/1.1\r\nHost: localhost\r\n\r\n", path).unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();
        response
    }

    #[test]
    fn test_bind_rejects_zero_workers() {
        let dir = tempfile::tempdir().unwrap();
        let result = Server::bind(test_config(dir.path(), 0));
        assert!(matches!(result, Err(ServerError::InvalidConfig(_))));
    }

    #[test]
    fn test_bind_failure_is_listener_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let taken = TcpListener::bind("127.0.0.1:0").unwrap();

        let mut config = test_config(dir.path(), 2);
        config.port = taken.local_addr().unwrap().port();

        let result = Server::bind(config);
        assert!(matches!(result, Err(ServerError::ListenerFatal { .. })));
    }

    #[test]
    fn test_run_serves_requests() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<p>index</p>").unwrap();

        let server = Server::bind(test_config(dir.path(), 2)).unwrap();
        let addr = server.local_addr().unwrap();
        thread::spawn(move || server.run());

        let ok = get(addr, "/index.html");
        assert!(ok.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(ok.ends_with("<p>index</p>"));

        let missing = get(addr, "/nope.html");
        assert!(missing.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(missing.contains("Content-Length: 0\r\n"));
    }

    #[test]
    fn test_custom_allow_list() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("extra.txt"), "extra").unwrap();
        std::fs::write(dir.path().join("index.html"), "index").unwrap();

        let server =
            Server::with_allow_list(test_config(dir.path(), 1), AllowList::new(["/extra.txt"]))
                .unwrap();
        let addr = server.local_addr().unwrap();
        thread::spawn(move || server.run());

        assert!(get(addr, "/extra.txt").ends_with("\r\n\r\nextra"));
        assert!(get(addr, "/index.html").starts_with("HTTP/1.1 404"));
    }

    fn index_handler(dir: &std::path::Path) -> Arc<ConnectionHandler> {
        std::fs::write(dir.join("index.html"), "<p>index</p>").unwrap();
        Arc::new(ConnectionHandler::new(
            Arc::new(AllowList::default()),
            FileResponder::new(dir),
            Some(Duration::from_secs(5)),
        ))
    }

    /// Retorna (lado servidor, dirección del peer, lado cliente)
    fn connected_pair(listener: &TcpListener) -> (TcpStream, SocketAddr, TcpStream) {
        let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (server_side, peer) = listener.accept().unwrap();
        (server_side, peer, client)
    }

    fn request_after(mut client: TcpStream, delay: Duration) -> thread::JoinHandle<String> {
        thread::spawn(move || {
            thread::sleep(delay);
            client.write_all(b"GET /index.html HTTP/1.1\r\n\r\n").unwrap();
            let mut response = String::new();
            client.read_to_string(&mut response).unwrap();
            response
        })
    }

    #[test]
    fn test_is_transient() {
        for kind in [
            io::ErrorKind::Interrupted,
            io::ErrorKind::ConnectionAborted,
            io::ErrorKind::ConnectionReset,
        ] {
            assert!(is_transient(&io::Error::from(kind)), "{:?}", kind);
        }

        for kind in [
            io::ErrorKind::PermissionDenied,
            io::ErrorKind::Other,
            io::ErrorKind::InvalidInput,
        ] {
            assert!(!is_transient(&io::Error::from(kind)), "{:?}", kind);
        }
    }

    #[test]
    fn test_accept_error_waits_for_in_flight_connections() {
        let dir = tempfile::tempdir().unwrap();
        let handler = index_handler(dir.path());
        let pool = WorkerPool::new(2).unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();

        // El cliente tarda en enviar la request line: el handler queda en curso
        let delay = Duration::from_millis(300);
        let (stream, peer, client) = connected_pair(&listener);
        let client = request_after(client, delay);

        let connections = vec![
            Ok((stream, peer)),
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "accept failed")),
        ];

        let start = Instant::now();
        let result = Server::dispatch("127.0.0.1:test", connections, handler, pool);

        assert!(
            matches!(&result, Err(ServerError::ListenerFatal { addr, .. }) if addr == "127.0.0.1:test"),
            "{:?}",
            result
        );
        assert!(start.elapsed() >= delay, "dispatch returned before the connection finished");

        let response = client.join().unwrap();
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.ends_with("<p>index</p>"));
    }

    #[test]
    fn test_transient_accept_errors_are_retried() {
        let dir = tempfile::tempdir().unwrap();
        let handler = index_handler(dir.path());
        let pool = WorkerPool::new(1).unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();

        let (stream, peer, client) = connected_pair(&listener);
        let client = request_after(client, Duration::ZERO);

        let connections = vec![
            Err(io::Error::from(io::ErrorKind::Interrupted)),
            Err(io::Error::from(io::ErrorKind::ConnectionAborted)),
            Err(io::Error::from(io::ErrorKind::ConnectionReset)),
            Ok((stream, peer)),
            Err(io::Error::from(io::ErrorKind::Other)),
        ];

        let result = Server::dispatch("local", connections, handler, pool);

        assert!(matches!(result, Err(ServerError::ListenerFatal { .. })));
        assert!(client.join().unwrap().starts_with("HTTP/1.1 200 OK\r\n"));
    }

    #[test]
    fn test_exhausted_connections_end_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let handler = index_handler(dir.path());
        let pool = WorkerPool::new(1).unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();

        let (stream, peer, client) = connected_pair(&listener);
        let client = request_after(client, Duration::from_millis(50));

        let result = Server::dispatch("local", vec![Ok((stream, peer))], handler, pool);

        assert!(result.is_ok());
        assert!(client.join().unwrap().ends_with("<p>index</p>"));
    }
}
