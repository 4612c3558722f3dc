use chrono::{SecondsFormat, Utc};

use crate::commands::{
    build_runtime, generation_service, init_logging, load_config, CommandResult, StepFailure,
    EXIT_DB_CONNECTIVITY, EXIT_EXECUTION, EXIT_PARTIAL_FAILURE,
};
use storepulse_core::scheduler::BatchReport;
use storepulse_db::connect_with_config;

/// Runs the daily batch for "now". Safe to repeat: users whose slot already has a
/// set are skipped.
pub fn run() -> CommandResult {
    let config = match load_config("daily") {
        Ok(config) => config,
        Err(result) => return result,
    };
    init_logging(&config.logging);

    let runtime = match build_runtime("daily") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = connect_with_config(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), EXIT_DB_CONNECTIVITY))?;
        let service = generation_service(&pool, &config)?;

        let report = service
            .run_daily_batch(Utc::now())
            .await
            .map_err(|error| ("batch_execution", error.to_string(), EXIT_EXECUTION))?;

        pool.close().await;
        Ok::<BatchReport, StepFailure>(report)
    });

    match result {
        Ok(report) => {
            let details = serde_json::to_value(&report).ok();
            if report.is_success() {
                CommandResult::success_with_details("daily", summary(&report), details)
            } else {
                CommandResult::failure_with_details(
                    "daily",
                    "partial_batch_failure",
                    summary(&report),
                    EXIT_PARTIAL_FAILURE,
                    details,
                )
            }
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("daily", error_class, message, exit_code)
        }
    }
}

fn summary(report: &BatchReport) -> String {
    format!(
        "slot {}: {} generated, {} skipped, {} failed",
        report.slot.instant().to_rfc3339_opts(SecondsFormat::Secs, true),
        report.generated,
        report.skipped,
        report.failed()
    )
}
