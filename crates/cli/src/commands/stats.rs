use goodhuman_core::domain::dedup::DedupKind;
use goodhuman_db::{connect_with_settings, DedupRepository, SqlDedupRepository};
use serde::Serialize;

use crate::commands::{
    build_runtime, escape_json, load_config, CommandResult, EXIT_DB_CONNECTIVITY,
};

#[derive(Debug, Serialize)]
struct StatsReport {
    command: &'static str,
    status: &'static str,
    database_url: String,
    replied: u64,
    thanked: u64,
}

pub fn run() -> CommandResult {
    let config = match load_config("stats") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match build_runtime("stats") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let counts = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

        let repository = SqlDedupRepository::new(pool.clone());
        let replied = count(&repository, DedupKind::Replied).await?;
        let thanked = count(&repository, DedupKind::Thanked).await?;
        pool.close().await;
        Ok::<(u64, u64), String>((replied, thanked))
    });

    let (replied, thanked) = match counts {
        Ok(counts) => counts,
        Err(message) => {
            return CommandResult::failure(
                "stats",
                "db_connectivity",
                message,
                EXIT_DB_CONNECTIVITY,
            );
        }
    };

    let report = StatsReport {
        command: "stats",
        status: "ok",
        database_url: config.database.url.clone(),
        replied,
        thanked,
    };
    let output = serde_json::to_string(&report).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"stats\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            escape_json(&error.to_string())
        )
    });
    CommandResult { exit_code: 0, output }
}

async fn count(repository: &SqlDedupRepository, kind: DedupKind) -> Result<u64, String> {
    repository.count(kind).await.map_err(|error| {
        format!("could not count {} records ({error}); run `goodhuman migrate`", kind.as_str())
    })
}
