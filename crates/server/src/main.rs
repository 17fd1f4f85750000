use clap::Parser;
use server::ServerConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "events-server")]
#[command(about = "Event Manager REST server")]
struct Cli {
    /// Listening port (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Data directory (overrides EVENTS_ROOT)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Allowed cross-origin client address (overrides CLIENT_ORIGIN)
    #[arg(long)]
    client_origin: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    server::init_tracing();
    let cli = Cli::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(dir) = cli.data_dir {
        let env_db = std::env::var("DATABASE_URL").ok();
        let rooted = ServerConfig::with_base_dir(dir);
        config.data_dir = rooted.data_dir;
        if env_db.is_none() {
            config.database_url = rooted.database_url;
        }
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if cli.client_origin.is_some() {
        config.client_origin = cli.client_origin;
    }

    server::run(config).await
}
