use std::env;
use std::sync::{Mutex, OnceLock};

use serde_json::Value;
use tableside_cli::commands::{config, doctor, migrate, seed};
use tempfile::TempDir;

const MEMORY_DB: &[(&str, &str)] =
    &[("TABLESIDE_DATABASE_URL", "sqlite::memory:"), ("TABLESIDE_DATABASE_MAX_CONNECTIONS", "1")];

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(MEMORY_DB, || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["message"], "applied pending migrations (schema version 1)");
    });
}

#[test]
fn migrate_returns_config_failure_for_gemini_without_key() {
    let vars =
        [("TABLESIDE_DATABASE_URL", "sqlite::memory:"), ("TABLESIDE_LLM_PROVIDER", "gemini")];
    with_env(&vars, || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn seed_returns_demo_menu_summary() {
    with_env(MEMORY_DB, || {
        let result = seed::run();
        assert_eq!(result.exit_code, 0, "expected seed success: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "seed");
        assert_eq!(payload["status"], "ok");

        let message = payload["message"].as_str().unwrap_or("");
        assert!(message.contains("demo menu loaded: 5 categories, 9 items, 2 deals"));
        assert!(message.contains("  - d01: Family Feast (85.50)"));
        assert!(message.contains("  - d02: BBQ Platter (62.05)"));
    });
}

#[test]
fn seed_is_idempotent_against_one_database_file() {
    let dir = TempDir::new().expect("temp dir");
    let url = file_database_url(&dir);

    with_env(&[("TABLESIDE_DATABASE_URL", url.as_str())], || {
        let first = seed::run();
        assert_eq!(first.exit_code, 0, "expected first seed invocation success");
        let first_payload = parse_payload(&first.output);

        let second = seed::run();
        assert_eq!(second.exit_code, 0, "expected second seed invocation success");
        let second_payload = parse_payload(&second.output);

        assert_eq!(first_payload["status"], "ok");
        assert_eq!(second_payload["status"], "ok");
        assert_eq!(first_payload["message"], second_payload["message"]);
    });
}

#[test]
fn doctor_passes_once_the_menu_is_seeded() {
    let dir = TempDir::new().expect("temp dir");
    let url = file_database_url(&dir);

    with_env(&[("TABLESIDE_DATABASE_URL", url.as_str())], || {
        let before = doctor::run(true);
        assert_eq!(before.exit_code, 1, "unmigrated database should fail the catalog check");
        let report = parse_payload(&before.output);
        assert_eq!(report["overall_status"], "fail");
        assert_eq!(check_status(&report, "database_connectivity"), "pass");
        assert_eq!(check_status(&report, "menu_catalog"), "fail");

        assert_eq!(seed::run().exit_code, 0);

        let after = doctor::run(true);
        assert_eq!(after.exit_code, 0, "expected readiness after seeding: {}", after.output);
        let report = parse_payload(&after.output);
        assert_eq!(report["overall_status"], "pass");
        assert_eq!(check_status(&report, "chat_service"), "pass");
        assert_eq!(check_status(&report, "menu_catalog"), "pass");
    });
}

#[test]
fn doctor_skips_dependent_checks_when_config_invalid() {
    with_env(&[("TABLESIDE_LLM_PROVIDER", "gemini")], || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 1);

        let report = parse_payload(&result.output);
        assert_eq!(check_status(&report, "config_validation"), "fail");
        assert_eq!(check_status(&report, "chat_service"), "skipped");
        assert_eq!(check_status(&report, "database_connectivity"), "skipped");
        assert_eq!(check_status(&report, "menu_catalog"), "skipped");
    });
}

#[test]
fn config_reports_sources_and_redacts_the_api_key() {
    with_env(
        &[
            ("TABLESIDE_DATABASE_URL", "sqlite::memory:"),
            ("TABLESIDE_LLM_PROVIDER", "gemini"),
            ("TABLESIDE_LLM_API_KEY", "gm-secret-value-9876"),
            ("TABLESIDE_RESTAURANT_NAME", "Al Bustan"),
        ],
        || {
            let output = config::run();

            assert!(output.contains(
                "- llm.api_key = ***9876 (source: env (TABLESIDE_LLM_API_KEY))"
            ));
            assert!(!output.contains("gm-secret-value-9876"));
            assert!(output.contains(
                "- restaurant.name = Al Bustan (source: env (TABLESIDE_RESTAURANT_NAME))"
            ));
            assert!(output.contains("- server.port = 8080 (source: default)"));
        },
    );
}

fn file_database_url(dir: &TempDir) -> String {
    format!("sqlite://{}?mode=rwc", dir.path().join("tableside.db").display())
}

fn check_status(report: &Value, name: &str) -> String {
    report["checks"]
        .as_array()
        .and_then(|checks| checks.iter().find(|check| check["name"] == name))
        .and_then(|check| check["status"].as_str())
        .unwrap_or("missing")
        .to_string()
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "TABLESIDE_DATABASE_URL",
        "TABLESIDE_DATABASE_MAX_CONNECTIONS",
        "TABLESIDE_DATABASE_TIMEOUT_SECS",
        "TABLESIDE_LLM_PROVIDER",
        "TABLESIDE_LLM_API_KEY",
        "GEMINI_API_KEY",
        "TABLESIDE_LLM_BASE_URL",
        "TABLESIDE_LLM_MODEL",
        "TABLESIDE_LLM_TIMEOUT_SECS",
        "TABLESIDE_SERVER_BIND_ADDRESS",
        "TABLESIDE_SERVER_PORT",
        "TABLESIDE_RESTAURANT_NAME",
        "TABLESIDE_RESTAURANT_CURRENCY",
        "TABLESIDE_LOGGING_LEVEL",
        "TABLESIDE_LOGGING_FORMAT",
        "TABLESIDE_LOG_LEVEL",
        "TABLESIDE_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
