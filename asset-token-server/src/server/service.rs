use crate::{
    config::Config,
    database::DataStore,
    error::AssetTokenServerError,
    server::{transport::ConnectionIdentity, AssetTokenServer},
};

use hyper::{server::conn::Http, service::service_fn};
use std::{
    convert::Infallible,
    net::SocketAddr,
    sync::Arc,
};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::{TcpListener, TcpStream},
    signal,
};
use tokio_rustls::TlsAcceptor;
use tracing::{debug, error, info};

/// Starts the token server on the address in `config` and runs it until the
/// process is interrupted.
pub async fn start_asset_token_server<DB: DataStore>(
    config: Config,
    db: DB,
) -> Result<(), AssetTokenServerError> {
    info!("Starting asset token server");
    let listener = TcpListener::bind(SocketAddr::new(config.address, config.port)).await?;
    info!(addr = ?listener.local_addr()?, "Asset token server started");

    // Wait for the server to finish
    tokio::select! {
        _ = signal::ctrl_c() => info!("Terminated by user"),
        result = serve(listener, config, Arc::new(db)) => {
            if let Err(e) = result {
                error!("Error: {}", e);
                return Err(e);
            }
        },
    }

    Ok(())
}

/// Accepts connections on `listener` and serves each one on its own task.
/// Every connection shares `db`.
pub async fn serve<DB: DataStore>(
    listener: TcpListener,
    config: Config,
    db: Arc<DB>,
) -> Result<(), AssetTokenServerError> {
    let tls_acceptor = config
        .tls_config
        .clone()
        .map(|tls| TlsAcceptor::from(Arc::new(tls)));
    let server = AssetTokenServer::new(db, config);

    let mut http = Http::new();
    let _ = http.http1_only(true);

    loop {
        let (conn, peer_addr) = match listener.accept().await {
            Ok(incoming) => incoming,
            Err(e) => {
                error!("Error accepting connection: {}", e);
                continue;
            }
        };
        debug!(%peer_addr, "Accepted connection");

        let http = http.clone();
        let tls_acceptor = tls_acceptor.clone();
        let server = server.clone();

        // Spawn a task to handle each connection
        let handle = tokio::spawn(async move {
            if let Err(e) = handle_connection(http, conn, peer_addr, tls_acceptor, server).await {
                // Log the error but don't bother returning it since it has nowhere to go.
                error!(%peer_addr, "{}", e);
            }
        });

        // We don't want to await this so we'll just drop the handle to make `clippy`
        // happy.
        std::mem::drop(handle);
    }
}

/// Completes the TLS handshake if this server terminates TLS, records the
/// connection's identity and hands the stream to hyper.
async fn handle_connection<DB: DataStore>(
    http: Http,
    connection: TcpStream,
    peer_addr: SocketAddr,
    tls_acceptor: Option<TlsAcceptor>,
    server: AssetTokenServer<DB>,
) -> Result<(), AssetTokenServerError> {
    match tls_acceptor {
        Some(tls_acceptor) => {
            let stream = tls_acceptor.accept(connection).await?;
            let identity = ConnectionIdentity::from_tls(peer_addr, stream.get_ref().1);
            serve_http(http, stream, identity, server).await
        }
        None => {
            let identity = ConnectionIdentity::plain(peer_addr);
            serve_http(http, connection, identity, server).await
        }
    }
}

async fn serve_http<IO, DB>(
    http: Http,
    io: IO,
    identity: ConnectionIdentity,
    server: AssetTokenServer<DB>,
) -> Result<(), AssetTokenServerError>
where
    IO: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    DB: DataStore,
{
    let identity = Arc::new(identity);
    let service = service_fn(move |request| {
        let server = server.clone();
        let identity = identity.clone();
        async move { Ok::<_, Infallible>(server.route(request, &identity).await) }
    });

    http.serve_connection(io, service).await?;

    Ok(())
}
