use goodhuman_core::config::{AppConfig, LoadOptions};
use goodhuman_core::domain::dedup::DedupKind;
use goodhuman_db::{connect_with_settings, DedupRepository, SqlDedupRepository};
use serde::Serialize;

use crate::commands::{
    escape_json, CommandResult, EXIT_CONFIG, EXIT_DB_CONNECTIVITY, EXIT_MIGRATION, EXIT_RUNTIME,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
    #[serde(skip)]
    exit_code: u8,
}

impl DoctorCheck {
    fn pass(name: &'static str, details: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Pass, details: details.into(), exit_code: 0 }
    }

    fn fail(name: &'static str, details: impl Into<String>, exit_code: u8) -> Self {
        Self { name, status: CheckStatus::Fail, details: details.into(), exit_code }
    }

    fn skipped(name: &'static str, reason: &str) -> Self {
        Self { name, status: CheckStatus::Skipped, details: reason.to_string(), exit_code: 0 }
    }
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

impl DoctorReport {
    /// Exit code of the first failing check, or 0.
    fn exit_code(&self) -> u8 {
        self.checks
            .iter()
            .find(|check| check.status == CheckStatus::Fail)
            .map_or(0, |check| check.exit_code)
    }
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = report.exit_code();

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck::pass(
                "config_validation",
                format!("configuration loaded for u/{}", config.reddit.username),
            ));
            checks.push(check_welcome_messages(&config));
            checks.extend(check_database(&config));
        }
        Err(error) => {
            const SKIPPED: &str = "skipped because configuration did not load";
            checks.push(DoctorCheck::fail("config_validation", error.to_string(), EXIT_CONFIG));
            checks.push(DoctorCheck::skipped("welcome_messages", SKIPPED));
            checks.push(DoctorCheck::skipped("database_connectivity", SKIPPED));
            checks.push(DoctorCheck::skipped("dedup_tables", SKIPPED));
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_welcome_messages(config: &AppConfig) -> DoctorCheck {
    match config.welcome_messages() {
        Ok(messages) => DoctorCheck::pass(
            "welcome_messages",
            format!("{} welcome message(s) available", messages.as_slice().len()),
        ),
        Err(error) => DoctorCheck::fail("welcome_messages", error.to_string(), EXIT_CONFIG),
    }
}

/// Connectivity first; the table check only runs once a connection is up.
fn check_database(config: &AppConfig) -> Vec<DoctorCheck> {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return vec![
                DoctorCheck::fail(
                    "database_connectivity",
                    format!("failed to initialize async runtime: {error}"),
                    EXIT_RUNTIME,
                ),
                DoctorCheck::skipped("dedup_tables", "skipped because the runtime did not start"),
            ];
        }
    };

    runtime.block_on(async {
        let pool = match connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        {
            Ok(pool) => pool,
            Err(error) => {
                return vec![
                    DoctorCheck::fail(
                        "database_connectivity",
                        format!("failed to connect to database: {error}"),
                        EXIT_DB_CONNECTIVITY,
                    ),
                    DoctorCheck::skipped(
                        "dedup_tables",
                        "skipped because the database is unreachable",
                    ),
                ];
            }
        };

        let connectivity = DoctorCheck::pass(
            "database_connectivity",
            format!("connected using `{}`", config.database.url),
        );

        let repository = SqlDedupRepository::new(pool.clone());
        let mut counts = Vec::new();
        let mut failure = None;
        for kind in DedupKind::ALL {
            match repository.count(kind).await {
                Ok(count) => counts.push(format!("{}={count}", kind.as_str())),
                Err(error) => {
                    failure = Some(format!(
                        "`{}` is not readable ({error}); run `goodhuman migrate`",
                        kind.table()
                    ));
                    break;
                }
            }
        }
        pool.close().await;

        let tables = match failure {
            Some(details) => DoctorCheck::fail("dedup_tables", details, EXIT_MIGRATION),
            None => DoctorCheck::pass("dedup_tables", counts.join(", ")),
        };
        vec![connectivity, tables]
    })
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}
