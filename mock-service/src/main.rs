use std::net::SocketAddr;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();
    let addr: SocketAddr = "0.0.0.0:3000".parse().unwrap();
    tracing::info!("mock service listening on {addr}");
    mock_service::run(addr).await;
}
