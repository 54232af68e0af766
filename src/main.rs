use clap::Parser;
use log::error;
use myob_attachments::RunConfig;

#[derive(Debug, Parser)]
#[command(name = "myob-attachments", about = "Download MYOB invoice attachments")]
struct Cli {
    /// MYOB client ID; falls back to MYOB_CLIENT_ID env var
    #[arg(long, env = "MYOB_CLIENT_ID")]
    myob_client_id: String,

    /// MYOB access token; falls back to MYOB_ACCESS_TOKEN env var
    #[arg(long, env = "MYOB_ACCESS_TOKEN", hide_env_values = true)]
    myob_access_token: String,

    /// Start date in YYYY-MM-DD format
    #[arg(long)]
    start_date: String,

    /// End date in YYYY-MM-DD format
    #[arg(long)]
    end_date: String,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = RunConfig::new(
        cli.myob_client_id,
        cli.myob_access_token,
        cli.start_date,
        cli.end_date,
    );

    // Failures are reported through the log only; the exit status stays 0.
    if let Err(err) = myob_attachments::run(&config).await {
        error!("Error: {err}");
    }
}
