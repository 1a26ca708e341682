use anyhow::Result;
use clap::{Parser, ValueEnum};
use filmquery_core::index::{IdfMode, TfMode, TfidfConfig};
use filmquery_core::loader::LoaderConfig;
use filmquery_core::{Catalog, DEFAULT_RECOMMENDATIONS};
use filmquery_server::{build_app, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone, Copy, ValueEnum)]
enum TfArg {
    /// Raw term count
    Raw,
    /// 1 + ln(count)
    Sublinear,
}

#[derive(Clone, Copy, ValueEnum)]
enum IdfArg {
    /// ln((1 + n) / (1 + df)) + 1
    Smooth,
    /// ln(n / df)
    Plain,
}

#[derive(Parser)]
#[command(name = "filmquery-server", about = "Serve film counts, scores and title recommendations")]
struct Args {
    /// Dataset file (.parquet, .csv, .json or .jsonl)
    #[arg(long, default_value = "./dataset_transformado.parquet")]
    dataset: PathBuf,
    /// Host to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8000)]
    port: u16,
    /// Titles returned per recommendation
    #[arg(long, default_value_t = DEFAULT_RECOMMENDATIONS)]
    top_k: usize,
    /// Term frequency weighting
    #[arg(long, value_enum, default_value_t = TfArg::Raw)]
    tf: TfArg,
    /// Inverse document frequency weighting
    #[arg(long, value_enum, default_value_t = IdfArg::Smooth)]
    idf: IdfArg,
    /// Keep films without a score, counting them as 0
    #[arg(long, default_value_t = false)]
    zero_missing_score: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let loader = LoaderConfig { drop_missing_score: !args.zero_missing_score };
    let tfidf = TfidfConfig {
        tf: match args.tf {
            TfArg::Raw => TfMode::Raw,
            TfArg::Sublinear => TfMode::Sublinear,
        },
        idf: match args.idf {
            IdfArg::Smooth => IdfMode::Smooth,
            IdfArg::Plain => IdfMode::Plain,
        },
    };
    let catalog = Catalog::load(&args.dataset, &loader, &tfidf)?;
    let app = build_app(AppState::new(catalog, args.top_k));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
