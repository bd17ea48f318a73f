use std::process::ExitCode;

use database::SqliteDatabase;
use seeder::{Pipeline, SeedConfig};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    // configuration
    let config = SeedConfig::from_env().expect("expected seed configuration in env.");
    log::info!(
        "seeding {} in {:?} mode, batches of {}.",
        config.database_url,
        config.pipeline.run_mode,
        config.pipeline.batch_size
    );

    // database
    let database = SqliteDatabase::connect(&config.database_url)
        .await
        .expect("could not connect to database.");

    // pipeline
    let mut pipeline = Pipeline::new(database, config.sources, config.pipeline);
    match pipeline.run().await {
        Ok(_) => {
            log::info!("seed complete.");
            ExitCode::SUCCESS
        }
        Err(why) => {
            log::error!("seed failed: {}", why);
            pipeline.report().log();
            ExitCode::FAILURE
        }
    }
}
