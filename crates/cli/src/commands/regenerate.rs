use chrono::{NaiveDate, Utc};
use serde_json::json;

use crate::commands::{
    build_runtime, generation_service, init_logging, load_config, CommandResult, StepFailure,
    EXIT_BAD_ARGUMENTS, EXIT_DB_CONNECTIVITY, EXIT_EXECUTION,
};
use storepulse_core::domain::sales::UserId;
use storepulse_core::scheduler::DailyInsights;
use storepulse_db::connect_with_config;

/// Recomputes and overwrites one user's interactive set. Without `date`, the
/// business-local date of "now" is used.
pub fn run(user: &str, date: Option<&str>) -> CommandResult {
    let user = user.trim();
    if user.is_empty() {
        return CommandResult::failure(
            "regenerate",
            "invalid_argument",
            "--user must not be empty",
            EXIT_BAD_ARGUMENTS,
        );
    }

    let requested_date = match date.map(parse_date).transpose() {
        Ok(date) => date,
        Err(message) => {
            return CommandResult::failure(
                "regenerate",
                "invalid_argument",
                message,
                EXIT_BAD_ARGUMENTS,
            );
        }
    };

    let config = match load_config("regenerate") {
        Ok(config) => config,
        Err(result) => return result,
    };
    init_logging(&config.logging);

    let runtime = match build_runtime("regenerate") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let user_id = UserId(user.to_string());
    let result = runtime.block_on(async {
        let pool = connect_with_config(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), EXIT_DB_CONNECTIVITY))?;
        let service = generation_service(&pool, &config)?;

        let now = Utc::now();
        let reference_date = requested_date.unwrap_or_else(|| service.clock().local_date(now));
        let outcome = service
            .regenerate(&user_id, reference_date, now)
            .await
            .map_err(|error| ("regenerate_execution", error.to_string(), EXIT_EXECUTION))?;

        pool.close().await;
        Ok::<(NaiveDate, DailyInsights), StepFailure>((reference_date, outcome))
    });

    match result {
        Ok((reference_date, outcome)) => {
            let count = match &outcome {
                DailyInsights::Ready(set) => set.insights.len(),
                DailyInsights::InsufficientData { .. } => 0,
            };
            CommandResult::success_with_details(
                "regenerate",
                format!(
                    "regenerated {count} insights for user `{}` on {reference_date}",
                    user_id.0
                ),
                Some(json!({
                    "user_id": user_id.0,
                    "reference_date": reference_date.to_string(),
                    "status": outcome.status(),
                    "insights": count,
                })),
            )
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("regenerate", error_class, message, exit_code)
        }
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|error| format!("--date `{raw}` is not a YYYY-MM-DD date ({error})"))
}
