use appstore_price_sync::config::credentials::AuthConfig;
use appstore_price_sync::core::TokenProvider;
use appstore_price_sync::utils::{logger, validation::Validate};
use appstore_price_sync::JwtTokenProvider;
use clap::Parser;

#[derive(Parser)]
#[command(name = "create-token")]
#[command(about = "Print an App Store Connect API token minted from APPSTORE_* variables")]
struct Args {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    dotenv::dotenv().ok();
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let token = AuthConfig::from_env()
        .and_then(|auth| {
            auth.validate()?;
            JwtTokenProvider::from_config(&auth)
        })
        .and_then(|provider| provider.bearer_token());

    match token {
        Ok(token) => println!("{}", token),
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    }
}
