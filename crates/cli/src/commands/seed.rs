use chrono::Utc;
use serde_json::json;

use crate::commands::{
    build_runtime, load_config, CommandResult, StepFailure, EXIT_CONFIG, EXIT_DB_CONNECTIVITY,
    EXIT_EXECUTION,
};
use storepulse_core::scheduler::BusinessClock;
use storepulse_db::{connect_with_config, migrations, DemoDataset, SeedResult};

pub fn run() -> CommandResult {
    let config = match load_config("seed") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let runtime = match build_runtime("seed") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let clock = BusinessClock::from_config(&config.insights)
            .map_err(|error| ("config_validation", error.to_string(), EXIT_CONFIG))?;
        let now = Utc::now();
        let dataset = DemoDataset::new(clock.local_date(now));

        let pool = connect_with_config(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), EXIT_DB_CONNECTIVITY))?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), EXIT_EXECUTION))?;

        let seeded = dataset
            .load(&pool, now)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), EXIT_EXECUTION))?;

        let verification = dataset
            .verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), EXIT_EXECUTION))?;

        pool.close().await;

        if verification.all_present {
            Ok::<SeedResult, StepFailure>(seeded)
        } else {
            Err(("seed_verification", verification_message(&verification.checks), EXIT_EXECUTION))
        }
    });

    match result {
        Ok(seeded) => CommandResult::success_with_details(
            "seed",
            format!(
                "demo dataset loaded for user `{}` ({} records from {} to {})",
                seeded.user_id.0, seeded.records, seeded.first_day, seeded.last_day
            ),
            Some(seed_details(&seeded)),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
    }
}

fn seed_details(seeded: &SeedResult) -> serde_json::Value {
    json!({
        "user_id": seeded.user_id.0,
        "stores": seeded.stores,
        "sellers": seeded.sellers,
        "records": seeded.records,
        "first_day": seeded.first_day.to_string(),
        "last_day": seeded.last_day.to_string(),
    })
}

fn verification_message(checks: &[(&'static str, bool)]) -> String {
    let failed_checks =
        checks.iter().filter_map(|(check, passed)| (!passed).then_some(*check)).collect::<Vec<_>>();
    if failed_checks.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for checks: {}", failed_checks.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::verification_message;

    #[test]
    fn verification_error_message_targets_failed_checks() {
        let checks = [("demo-user", true), ("demo-stores", false), ("demo-records", false)];

        assert_eq!(
            verification_message(&checks),
            "Seed verification failed for checks: demo-stores, demo-records"
        );
    }

    #[test]
    fn verification_error_message_falls_back_to_generic_when_no_labels() {
        let checks = [("demo-user", true), ("demo-records", true)];

        assert_eq!(verification_message(&checks), "Some seed data failed to load");
    }
}
