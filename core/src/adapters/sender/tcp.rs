//! TCP connect with optional local bind.

use std::io;
use std::net::SocketAddr;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpSocket, TcpStream};

pub(super) async fn connect(remote: SocketAddr, local: Option<SocketAddr>) -> io::Result<TcpStream> {
    let socket = if remote.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    if let Some(local) = local {
        socket.bind(local)?;
    }
    socket.connect(remote).await
}

/// Write the zero-length knock. The stream is closed when dropped.
pub(super) async fn knock(mut stream: TcpStream) -> io::Result<()> {
    stream.write_all(&[]).await
}
