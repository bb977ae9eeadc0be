use serde::Serialize;
use tableside_agent::GeminiClient;
use tableside_core::catalog::DealLookup;
use tableside_core::config::{AppConfig, LoadOptions};
use tableside_db::repositories::{SqlDealRepository, SqlMenuRepository};
use tableside_db::{connect_with_settings, load_menu_snapshot};

use crate::commands::CommandResult;

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
}

impl DoctorCheck {
    fn pass(name: &'static str, details: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Pass, details: details.into() }
    }

    fn fail(name: &'static str, details: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Fail, details: details.into() }
    }

    fn skipped(name: &'static str, details: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Skipped, details: details.into() }
    }
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

/// Exit code is 0 when every check passed and 1 otherwise.
pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                concat!(
                    "{{\"overall_status\":\"fail\",",
                    "\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}"
                ),
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
                "configuration loaded and validated",
            ));
            checks.push(check_chat_service(&config));
            checks.extend(check_database(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck::fail("config_validation", error.to_string()));
            for name in ["chat_service", "database_connectivity", "menu_catalog"] {
                checks.push(DoctorCheck::skipped(
                    name,
                    "skipped because configuration did not load",
                ));
            }
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

/// Offline mode is a supported way to run: customers get the canned reply and
/// the quick menu still works.
fn check_chat_service(config: &AppConfig) -> DoctorCheck {
    if !config.llm_enabled() {
        return DoctorCheck::pass(
            "chat_service",
            "offline mode: chat answers with the fallback reply, quick menu unaffected",
        );
    }

    match GeminiClient::from_config(&config.llm) {
        Ok(client) => DoctorCheck::pass(
            "chat_service",
            format!("gemini client ready for model `{}`", client.model()),
        ),
        Err(error) => DoctorCheck::fail("chat_service", error.to_string()),
    }
}

fn check_database(config: &AppConfig) -> Vec<DoctorCheck> {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return vec![
                DoctorCheck::fail(
                    "database_connectivity",
                    format!("failed to initialize async runtime: {error}"),
                ),
                DoctorCheck::skipped("menu_catalog", "skipped because no runtime was available"),
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
                    ),
                    DoctorCheck::skipped(
                        "menu_catalog",
                        "skipped because the database is unreachable",
                    ),
                ];
            }
        };

        let connectivity = DoctorCheck::pass(
            "database_connectivity",
            format!("connected using `{}`", config.database.url),
        );

        let menu = SqlMenuRepository::new(pool.clone());
        let deals = SqlDealRepository::new(pool.clone());
        let catalog = match load_menu_snapshot(&menu, &deals).await {
            Ok(snapshot) if snapshot.items().is_empty() => {
                DoctorCheck::fail("menu_catalog", "menu is empty; run `tableside seed`")
            }
            Ok(snapshot) => {
                let available = snapshot.items().iter().filter(|item| item.available).count();
                let active_deals =
                    snapshot.active_deals().map(|deals| deals.len()).unwrap_or_default();
                DoctorCheck::pass(
                    "menu_catalog",
                    format!(
                        "{} items ({available} available), {active_deals} active deals",
                        snapshot.items().len()
                    ),
                )
            }
            Err(error) => DoctorCheck::fail(
                "menu_catalog",
                format!("{error}; run `tableside migrate` first"),
            ),
        };

        pool.close().await;
        vec![connectivity, catalog]
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

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
