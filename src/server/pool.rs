//! # Pool de Workers Acotado
//! src/server/pool.rs
//!
//! N threads fijos que comparten un canal de capacidad cero (rendezvous).
//! `execute` solo retorna cuando un worker libre tomó el trabajo, así que
//! con todos los workers ocupados el thread que acepta conexiones se
//! bloquea: no hay cola extra ni conexiones descartadas.

use crate::error::{Result, ServerError};
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use tracing::{debug, error};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Pool de tamaño fijo con envío bloqueante
pub struct WorkerPool {
    sender: Option<SyncSender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Crea el pool e inicia `size` workers
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(ServerError::InvalidConfig(
                "worker pool needs at least one worker".to_string(),
            ));
        }

        let (sender, receiver) = mpsc::sync_channel::<Job>(0);
        let receiver = Arc::new(Mutex::new(receiver));

        let mut workers = Vec::with_capacity(size);
        for i in 0..size {
            let receiver = Arc::clone(&receiver);
            let handle = thread::Builder::new()
                .name(format!("worker-{}", i))
                .spawn(move || Self::worker_loop(i, receiver))?;
            workers.push(handle);
        }

        Ok(Self {
            sender: Some(sender),
            workers,
        })
    }

    /// Número de workers
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Entrega un trabajo a un worker libre, bloqueando si no hay ninguno
    pub fn execute<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or(ServerError::PoolClosed)?;
        sender.send(Box::new(job)).map_err(|_| ServerError::PoolClosed)
    }

    /// Deja de aceptar trabajo, espera a los trabajos en curso y une los threads
    pub fn shutdown(&mut self) {
        // Cerrar el canal hace que cada `recv` retorne Err
        drop(self.sender.take());

        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("worker terminó con panic");
            }
        }
    }

    fn worker_loop(id: usize, receiver: Arc<Mutex<Receiver<Job>>>) {
        debug!(worker = id, "worker iniciado");

        loop {
            // El lock se suelta al terminar la sentencia, antes de ejecutar el job
            let message = receiver
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .recv();

            let job = match message {
                Ok(job) => job,
                Err(_) => break,
            };

            if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                error!(worker = id, "job terminó con panic; el worker sigue activo");
            }
        }

        debug!(worker = id, "worker detenido");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_zero_workers_is_rejected() {
        assert!(matches!(WorkerPool::new(0), Err(ServerError::InvalidConfig(_))));
    }

    #[test]
    fn test_runs_every_job() {
        let done = Arc::new(AtomicUsize::new(0));
        let mut pool = WorkerPool::new(3).unwrap();
        assert_eq!(pool.size(), 3);

        for _ in 0..20 {
            let done = Arc::clone(&done);
            pool.execute(move || {
                done.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }

        pool.shutdown();
        assert_eq!(done.load(Ordering::SeqCst), 20);
    }

    #[test]
    fn test_concurrency_never_exceeds_size() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let done = Arc::new(AtomicUsize::new(0));
        let mut pool = WorkerPool::new(2).unwrap();

        for _ in 0..8 {
            let active = Arc::clone(&active);
            let peak = Arc::clone(&peak);
            let done = Arc::clone(&done);
            pool.execute(move || {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(20));
                active.fetch_sub(1, Ordering::SeqCst);
                done.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }

        pool.shutdown();
        assert_eq!(done.load(Ordering::SeqCst), 8);
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn test_execute_blocks_while_saturated() {
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = Arc::new(Mutex::new(release_rx));
        let pool = Arc::new(WorkerPool::new(1).unwrap());

        // Ocupa el único worker hasta que se le avise
        let rx = Arc::clone(&release_rx);
        pool.execute(move || {
            let _ = rx.lock().unwrap().recv();
        })
        .unwrap();

        let submitted = Arc::new(AtomicUsize::new(0));
        let submitter = {
            let pool = Arc::clone(&pool);
            let submitted = Arc::clone(&submitted);
            thread::spawn(move || {
                pool.execute(|| {}).unwrap();
                submitted.store(1, Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(100));
        assert_eq!(submitted.load(Ordering::SeqCst), 0, "execute should block");

        release_tx.send(()).unwrap();
        submitter.join().unwrap();
        assert_eq!(submitted.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panicking_job_keeps_worker_alive() {
        let done = Arc::new(AtomicUsize::new(0));
        let mut pool = WorkerPool::new(1).unwrap();

        pool.execute(|| panic!("boom")).unwrap();

        let counter = Arc::clone(&done);
        pool.execute(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        pool.shutdown();
        assert_eq!(done.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_execute_after_shutdown_fails() {
        let mut pool = WorkerPool::new(1).unwrap();
        pool.shutdown();

        assert!(matches!(pool.execute(|| {}), Err(ServerError::PoolClosed)));
    }
}
