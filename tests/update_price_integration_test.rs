use anyhow::Result;
use appstore_price_sync::core::Outcome;
use appstore_price_sync::{
    ApiScheduleSubmitter, LocalStorage, PricePointCodec, PricePointKey, StaticToken, SyncEngine,
    SyncError, SyncSettings, TierTable,
};
use appstore_price_sync::config::toml_config::TomlConfig;
use httpmock::prelude::*;
use tempfile::TempDir;

const HEADER: &str = "input,id,type,territory,price,start,end,price_point_id";

fn write_manifest(dir: &TempDir, rows: &[&str]) -> Result<String> {
    let path = dir.path().join("app-price-schedule.csv");
    let mut content = String::from(HEADER);
    for row in rows {
        content.push('\n');
        content.push_str(row);
    }
    content.push('\n');
    std::fs::write(&path, content)?;
    Ok(path.to_str().unwrap().to_string())
}

fn settings(server: &MockServer) -> SyncSettings {
    SyncSettings {
        api_base_url: server.base_url(),
        ..SyncSettings::default()
    }
}

fn tiers() -> Result<TierTable> {
    let config = TomlConfig::from_toml_str(
        r#"
[price_tiers.USA]
"0.99" = "10010"
"1.99" = "10020"

[price_tiers.JPN]
"120" = "10010"
"#,
    )?;
    Ok(config.tier_table()?)
}

/// 完整流程：CSV -> 驗證 -> 分組 -> 送出
#[tokio::test]
async fn test_end_to_end_price_update() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let manifest = write_manifest(
        &temp_dir,
        &[
            "Puzzle Game,6447461923,apps,USA,0.99,null,null,null",
            "Puzzle Game,6447461923,apps,USA,1.99,2024-03-01,null,null",
            "Puzzle Game,6447461923,apps,JPN,120,null,null,null",
            "Coins,9001,inAppPurchases,USA,null,null,null,10020",
        ],
    )?;

    let server = MockServer::start();
    let app_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/appPriceSchedules")
            .header("Authorization", "Bearer test-token")
            .body_contains("\"appPriceSchedules\"")
            .body_contains("\"${price-2}\"");
        then.status(201).json_body(serde_json::json!({"data": {"id": "6447461923"}}));
    });
    let iap_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/inAppPurchasePriceSchedules")
            .header("Authorization", "Bearer test-token");
        then.status(201).json_body(serde_json::json!({"data": {"id": "9001"}}));
    });

    let submitter = ApiScheduleSubmitter::new(settings(&server), tiers()?);
    let engine = SyncEngine::new(
        LocalStorage::default(),
        submitter,
        Box::new(StaticToken::new("test-token")),
    );

    let report = engine.run(&manifest).await?;

    app_mock.assert();
    iap_mock.assert();
    assert_eq!(report.rows_read, 4);
    assert!(report.validation_errors.is_empty());
    assert_eq!(report.results.len(), 2);
    assert!(report.results.iter().all(|r| r.outcome == Outcome::Success));
    assert!(!report.has_failures());
    Ok(())
}

#[tokio::test]
async fn test_invalid_row_is_reported_and_others_are_submitted() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let manifest = write_manifest(
        &temp_dir,
        &[
            "First,111,apps,USA,0.99,null,null,null",
            "Second,222,widgets,USA,0.99,null,null,null",
            "Third,333,apps,USA,1.99,null,null,null",
        ],
    )?;

    let server = MockServer::start();
    let first = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/appPriceSchedules")
            .body_contains("\"111\"");
        then.status(201);
    });
    let third = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/appPriceSchedules")
            .body_contains("\"333\"");
        then.status(201);
    });

    let engine = SyncEngine::new(
        LocalStorage::default(),
        ApiScheduleSubmitter::new(settings(&server), tiers()?),
        Box::new(StaticToken::new("test-token")),
    );

    let report = engine.run(&manifest).await?;

    first.assert();
    third.assert();
    assert_eq!(report.validation_errors.len(), 1);
    assert_eq!(report.validation_errors[0].row, 2);
    assert!(report.summary().contains("InvalidTypeError"));
    assert_eq!(report.count(Outcome::Success), 2);
    Ok(())
}

#[tokio::test]
async fn test_api_failure_and_unresolved_price_are_isolated() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let manifest = write_manifest(
        &temp_dir,
        &[
            "Rejected,111,apps,USA,0.99,null,null,null",
            "Unknown Price,222,apps,USA,7.77,null,null,null",
            "Accepted,333,apps,USA,1.99,null,null,null",
        ],
    )?;

    let server = MockServer::start();
    let rejected = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/appPriceSchedules")
            .body_contains("\"111\"");
        then.status(401)
            .body(r#"{"errors":[{"status":"401","code":"NOT_AUTHORIZED"}]}"#);
    });
    let accepted = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/appPriceSchedules")
            .body_contains("\"333\"");
        then.status(201);
    });

    let engine = SyncEngine::new(
        LocalStorage::default(),
        ApiScheduleSubmitter::new(settings(&server), tiers()?),
        Box::new(StaticToken::new("expired-token")),
    );

    let report = engine.run(&manifest).await?;

    rejected.assert();
    accepted.assert();
    let outcomes: Vec<Outcome> = report.results.iter().map(|r| r.outcome).collect();
    assert_eq!(
        outcomes,
        vec![Outcome::Failure, Outcome::Failure, Outcome::Success]
    );
    assert!(report.results[0]
        .error_detail
        .as_deref()
        .unwrap()
        .contains("NOT_AUTHORIZED"));
    assert!(report.results[1]
        .error_detail
        .as_deref()
        .unwrap()
        .contains("No price point for price 7.77 in territory USA"));
    Ok(())
}

#[tokio::test]
async fn test_missing_column_fails_before_any_request() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("prices.csv");
    std::fs::write(
        &path,
        "input,id,type,price,start,end,price_point_id\nGame,1,apps,0.99,null,null,null\n",
    )?;

    let server = MockServer::start();
    let any_request = server.mock(|when, then| {
        when.path_contains("/v1");
        then.status(201);
    });

    let engine = SyncEngine::new(
        LocalStorage::default(),
        ApiScheduleSubmitter::new(settings(&server), tiers()?),
        Box::new(StaticToken::new("test-token")),
    );

    let err = engine.run(path.to_str().unwrap()).await.unwrap_err();

    any_request.assert_hits(0);
    assert!(matches!(
        err,
        SyncError::MissingColumnError { ref columns } if columns == &vec!["territory".to_string()]
    ));
    Ok(())
}

#[tokio::test]
async fn test_missing_manifest() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let missing = temp_dir.path().join("nope.csv");

    let engine = SyncEngine::new(
        LocalStorage::default(),
        ApiScheduleSubmitter::new(SyncSettings::default(), TierTable::new()),
        Box::new(StaticToken::new("test-token")),
    );

    let err = engine.run(missing.to_str().unwrap()).await.unwrap_err();

    assert!(matches!(err, SyncError::ManifestNotFound { .. }));
    Ok(())
}

#[tokio::test]
async fn test_precomputed_price_point_id_is_sent_unchanged() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let encoded = PricePointCodec::encode(&PricePointKey::new("9001", "FRA", "10030"));
    let row = format!("Coins,9001,inAppPurchases,FRA,null,2025-01-01,2025-02-01,{}", encoded);
    let manifest = write_manifest(&temp_dir, &[row.as_str()])?;

    let server = MockServer::start();
    let expected_body = format!("\"{}\"", encoded);
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/inAppPurchasePriceSchedules")
            .body_contains(expected_body.as_str())
            .body_contains("\"startDate\":\"2025-01-01\"")
            .body_contains("\"endDate\":\"2025-02-01\"");
        then.status(201);
    });

    let engine = SyncEngine::new(
        LocalStorage::default(),
        ApiScheduleSubmitter::new(settings(&server), TierTable::new()),
        Box::new(StaticToken::new("test-token")),
    );

    let report = engine.run(&manifest).await?;

    api_mock.assert();
    assert_eq!(report.count(Outcome::Success), 1);
    Ok(())
}
