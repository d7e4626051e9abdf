use crate::config::ServerConfig;
use may::coroutine::JoinHandle;
use may_minihttp::HttpService;
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;
use tracing::info;

/// Wrapper around `may_minihttp`'s HTTP server.
///
/// `T` is usually an [`AppService`](super::AppService) around a
/// [`Dispatcher`](crate::Dispatcher). Every accepted connection runs on its
/// own `may` coroutine, so the coroutine stack size bounds how deep a handler
/// may recurse. Use [`HttpServer::start_with_config`] to set it from a
/// [`ServerConfig`] before the first coroutine is spawned.
pub struct HttpServer<T>(pub T);

/// Handle to a running HTTP server.
///
/// Dropping the handle leaves the server running; call [`ServerHandle::stop`]
/// to shut it down or [`ServerHandle::join`] to block on it.
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the server is bound to.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Poll the listen address until it accepts connections.
    ///
    /// Mostly useful in tests, where requests would otherwise race the
    /// accept loop.
    ///
    /// # Returns
    ///
    /// `Ok(())` once a TCP connection to [`ServerHandle::addr`] succeeds.
    ///
    /// # Errors
    ///
    /// `TimedOut` if the server is not reachable within about 250ms
    /// (50 attempts, 5ms apart).
    pub fn wait_ready(&self) -> io::Result<()> {
        for _ in 0..50 {
            if TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(5));
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// Cancel the accept coroutine and wait for it.
    ///
    /// Consumes the handle. Requests already being dispatched are not
    /// interrupted.
    pub fn stop(self) {
        // SAFETY: cancelling the accept coroutine is how may shuts a server
        // down; the handle is owned here and joined right after.
        unsafe {
            self.handle.coroutine().cancel();
        }
        let _ = self.handle.join();
        info!(addr = %self.addr, "HTTP server stopped");
    }

    /// Block until the server coroutine finishes.
    ///
    /// The server runs until it is stopped from elsewhere or its accept loop
    /// fails, so in a binary this is usually the last call of `main`.
    ///
    /// # Returns
    ///
    /// `Ok(())` when the accept loop ended normally.
    ///
    /// # Errors
    ///
    /// The panic payload if the server coroutine panicked.
    pub fn join(self) -> std::thread::Result<()> {
        self.handle.join()
    }
}

impl<T: HttpService + Clone + Send + Sync + 'static> HttpServer<T> {
    /// Bind `addr` and start accepting connections.
    ///
    /// The coroutine stack size is left as the `may` runtime has it.
    ///
    /// # Arguments
    ///
    /// * `addr` - Address to bind, such as `"0.0.0.0:9898"`. Only the first
    ///   resolved address is used.
    ///
    /// # Returns
    ///
    /// A [`ServerHandle`] for the running server.
    ///
    /// # Errors
    ///
    /// Fails if the address does not resolve or cannot be bound.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;
        let handle = may_minihttp::HttpServer(self.0).start(addr)?;
        info!(addr = %addr, "HTTP server listening");
        Ok(ServerHandle { addr, handle })
    }

    /// Apply `config.stack_size` to the `may` runtime, then bind
    /// `config.addr`.
    ///
    /// The stack size is process-wide and only affects coroutines spawned
    /// afterwards, so call this before any other server is started.
    ///
    /// # Arguments
    ///
    /// * `config` - Listen address and coroutine stack size, typically from
    ///   [`Config::load`](crate::Config::load) or
    ///   [`Config::from_env`](crate::Config::from_env).
    ///
    /// # Returns
    ///
    /// A [`ServerHandle`] for the running server.
    ///
    /// # Errors
    ///
    /// Same as [`HttpServer::start`].
    pub fn start_with_config(self, config: &ServerConfig) -> io::Result<ServerHandle> {
        may::config().set_stack_size(config.stack_size);
        info!(stack_size = config.stack_size, "Coroutine stack size configured");
        self.start(config.addr.as_str())
    }
}
