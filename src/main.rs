use appstore_price_sync::config::credentials::AuthConfig;
use appstore_price_sync::config::toml_config::TomlConfig;
use appstore_price_sync::core::TokenProvider;
use appstore_price_sync::utils::error::ErrorCategory;
use appstore_price_sync::utils::{logger, validation::Validate};
use appstore_price_sync::{
    ApiScheduleSubmitter, CliConfig, JwtTokenProvider, LocalStorage, StaticToken, SyncEngine,
    SyncError,
};
use clap::Parser;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv::dotenv().ok();
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("🚀 Starting update-price");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = run(&config).await {
        tracing::error!(
            "❌ Price update failed: {} (Category: {:?})",
            e,
            e.category()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.category() {
            ErrorCategory::Configuration => 2,
            ErrorCategory::Authentication => 3,
            _ => 1,
        };
        std::process::exit(exit_code);
    }
}

async fn run(config: &CliConfig) -> Result<(), SyncError> {
    config.validate()?;

    // 載入 TOML 配置（可選）
    let file_config = match &config.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            TomlConfig::from_file(path)?
        }
        None => TomlConfig::default(),
    };
    file_config.validate()?;

    let tiers = file_config.tier_table()?;
    if !tiers.is_empty() {
        tracing::info!("💰 Loaded {} price tiers", tiers.len());
    }

    let tokens = token_provider(config, &file_config)?;
    let settings = config.settings(&file_config);
    if settings.dry_run {
        tracing::info!("🔍 DRY RUN MODE - payloads are printed, nothing is sent");
    }

    let submitter = ApiScheduleSubmitter::new(settings, tiers);
    let engine = SyncEngine::new(LocalStorage::default(), submitter, tokens);

    let report = engine.run(&config.csv).await?;
    println!();
    print!("{}", report.summary());

    if report.has_failures() {
        tracing::warn!("⚠️ Finished with failures, see the summary above");
    } else {
        tracing::info!("✅ Price update completed successfully!");
    }
    Ok(())
}

fn token_provider(
    config: &CliConfig,
    file_config: &TomlConfig,
) -> Result<Box<dyn TokenProvider>, SyncError> {
    if let Some(token) = &config.token {
        return Ok(Box::new(StaticToken::new(token.clone())));
    }

    let credentials = match &file_config.auth {
        Some(auth) => Ok(auth.clone()),
        None => AuthConfig::from_env(),
    };

    match credentials {
        Ok(auth) => {
            tracing::info!("🔑 Generating API token for key {}", auth.key_id);
            Ok(Box::new(JwtTokenProvider::from_config(&auth)?))
        }
        Err(e) if config.dry_run => {
            tracing::warn!("⚠️ No credentials ({}), dry run continues without a token", e);
            Ok(Box::new(StaticToken::new("dry-run")))
        }
        Err(e) => Err(e),
    }
}
