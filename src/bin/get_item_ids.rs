use appstore_price_sync::config::credentials::AuthConfig;
use appstore_price_sync::config::toml_config::DEFAULT_API_BASE_URL;
use appstore_price_sync::core::directory::ItemDirectory;
use appstore_price_sync::core::TokenProvider;
use appstore_price_sync::utils::logger;
use appstore_price_sync::{JwtTokenProvider, SyncError};
use clap::Parser;

#[derive(Parser)]
#[command(name = "get-item-ids")]
#[command(about = "List apps and in-app purchases with their ids")]
struct Args {
    /// App Store Connect API token; minted from APPSTORE_* variables when omitted
    #[arg(long)]
    token: Option<String>,

    #[arg(long, default_value = DEFAULT_API_BASE_URL)]
    api_base_url: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv::dotenv().ok();
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    if let Err(e) = run(&args).await {
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(1);
    }
}

async fn run(args: &Args) -> Result<(), SyncError> {
    let token = match &args.token {
        Some(token) => token.clone(),
        None => JwtTokenProvider::from_config(&AuthConfig::from_env()?)?.bearer_token()?,
    };

    let lines = ItemDirectory::new(args.api_base_url.clone())
        .listing(&token)
        .await?;

    if lines.is_empty() {
        println!("No apps found.");
    }
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}
