//! Planillas API Server binary
//!
//! HTTP REST API for listing communities, previewing rosters and generating
//! forms.

use clap::Parser;
use planillas::api::{run_api_server, ApiConfig};
use planillas::config::AppConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "planillas-server")]
#[command(version)]
#[command(about = "Planillas API Server - HTTP REST API for form generation")]
#[command(long_about = r#"
Planillas API Server - HTTP REST API

Endpoints:
  - GET  /api/v1/variants     - Available form variants
  - POST /api/v1/communities  - Communities of a community roster
  - POST /api/v1/roster       - Matched beneficiaries and pages
  - POST /api/v1/generate     - Generate a form (.xlsx, optional .pdf)

Additional endpoints:
  - GET  /health              - Health check
  - GET  /version             - Server version info
  - GET  /                    - API documentation

Example usage:
  planillas-server                           # Start on localhost:8080
  planillas-server --host 0.0.0.0 --port 3000

  curl -X POST http://localhost:8080/api/v1/generate \
    -H "Content-Type: application/json" \
    -d '{"communities_path": "Comunidades.xlsx",
         "beneficiaries_path": "Beneficiarios.xlsx",
         "community": "Aldea X"}'
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "PLANILLAS_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "PLANILLAS_PORT")]
    port: u16,

    /// Configuration file (YAML)
    #[arg(long, env = "PLANILLAS_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let app_config = AppConfig::load_or_default(args.config.as_deref())?;

    let config = ApiConfig {
        host: args.host,
        port: args.port,
    };

    run_api_server(config, app_config).await
}
