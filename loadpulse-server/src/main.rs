use clap::Parser;
use loadpulse_server::serve;

const DEFAULT_PORT: u16 = 7301;

#[derive(Parser, Debug)]
#[command(version = "0.1")]
struct LoadPulseCli {
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loadpulse=info,tower_http=info".into()),
        )
        .init();

    let args = LoadPulseCli::parse();
    if let Err(err) = serve(args.port).await {
        tracing::error!("server exited with error: {err}");
        std::process::exit(1);
    }
}
