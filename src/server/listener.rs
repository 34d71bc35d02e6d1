// Listener setup
// Builds the TCP listening socket and hands it to Tokio.

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;

/// Bind a non-blocking TCP listener on `addr`.
///
/// SO_REUSEADDR is set so the port can be rebound while the previous
/// socket is still in TIME_WAIT. Any error here is the fatal bind-failure
/// case: the caller propagates it and the process exits non-zero.
pub fn bind_listener(addr: std::net::SocketAddr) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;

    // Tokio requires the socket in non-blocking mode
    socket.set_nonblocking(true)?;

    socket.bind(&addr.into())?;
    socket.listen(128)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn binds_ephemeral_port() {
        let listener = bind_listener("127.0.0.1:0".parse().expect("addr"))
            .expect("ephemeral bind should succeed");
        let addr = listener.local_addr().expect("local addr");
        assert_ne!(addr.port(), 0);
    }

    #[tokio::test]
    async fn rebinding_a_taken_port_fails() {
        let first = bind_listener("127.0.0.1:0".parse().expect("addr")).expect("bind");
        let taken = first.local_addr().expect("local addr");
        // SO_REUSEADDR does not allow two live listeners on the same port
        assert!(bind_listener(taken).is_err());
    }
}
