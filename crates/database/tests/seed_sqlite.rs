use std::{fs, path::Path};

use database::SqliteDatabase;
use model::{
    line::{Color, Direction, Line, Mode},
    stop::Stop,
    Localized,
};
use seeder::{
    database::{Database, DatabaseTransaction, LineRepo, StopRepo},
    source::Source,
    Pipeline, PipelineConfig, RunMode, SeedError, Sources, Stage,
};
use tempfile::{tempdir, TempDir};

const STOPS: &str = r#"gpscoordinates;id;name
"{""latitude"": 50.8355, ""longitude"": 4.3365}";8012;"{""fr"":""GARE DU MIDI"",""nl"":""ZUIDSTATION""}"
"{""latitude"": 50.8413, ""longitude"": 4.3476}";8022;"{""fr"":""ANNEESSENS"",""nl"":""ANNEESSENS""}"
"{""latitude"": 50.8466, ""longitude"": 4.3528}";8032;"{""fr"":""BOURSE"",""nl"":""BEURS""}"
"#;

const LINES: &str = r#"destination;direction;lineid;points
"{""fr"":""GARE DU NORD"",""nl"":""NOORDSTATION""}";City;4;"[{""id"":""8012"",""order"":1},{""id"":""8022"",""order"":2},{""id"":""8032F"",""order"":3}]"
"{""fr"":""STALLE"",""nl"":""STALLE""}";Suburb;4;"[{""id"":""8032"",""order"":1},{""id"":""6666"",""order"":2},{""id"":""8012"",""order"":3}]"
"{""fr"":""GARE DU NORD"",""nl"":""NOORDSTATION""}";City;N04;"[{""id"":""8012"",""order"":1}]"
"#;

const LINE_METADATA: &str = "lineid_mode;route_short_name;route_color
004t;4;#F25482
104b;N04;#000000
";

const LINE_TEXT_COLORS: &str = "lineid;direction;route_text_color
4;City;#000
4;Suburb;
";

fn file(dir: &Path, name: &str, content: &str) -> Source {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    Source::File(path)
}

fn sources() -> (Sources, TempDir) {
    let dir = tempdir().unwrap();
    let sources = Sources {
        stops: file(dir.path(), "stops.csv", STOPS),
        lines: file(dir.path(), "lines.csv", LINES),
        line_metadata: file(dir.path(), "gtfs_routes.csv", LINE_METADATA),
        line_text_colors: file(dir.path(), "text_colors.csv", LINE_TEXT_COLORS),
    };
    (sources, dir)
}

async fn seed(database: &SqliteDatabase, run_mode: RunMode) -> seeder::Result<seeder::RunReport> {
    let (sources, _dir) = sources();
    Pipeline::new(database.clone(), sources, PipelineConfig::new(run_mode))
        .run()
        .await
}

#[tokio::test]
async fn test_full_seed() {
    let database = SqliteDatabase::in_memory().await.unwrap();
    let report = seed(&database, RunMode::Replace).await.unwrap();

    assert_eq!(report.unknown_stop, Some(1));
    let stages = report.stages.iter().map(|stage| stage.stage).collect::<Vec<_>>();
    assert_eq!(stages, Stage::ALL);

    let stops = database.stops().await.unwrap();
    assert_eq!(stops.len(), 4);
    assert_eq!(stops[0].id.raw(), 1);
    assert_eq!(stops[0].content, Stop::unknown());
    assert_eq!(stops[1].content.code, "8012");
    assert_eq!(
        stops[1].content.name,
        Localized::new("GARE DU MIDI", "ZUIDSTATION")
    );

    let lines = database.lines().await.unwrap();
    assert_eq!(lines.len(), 3);
    let city = &lines[0].content;
    assert_eq!(city.code, "4");
    assert_eq!(city.direction, Direction::City);
    assert_eq!(city.mode, Some(Mode::Tram));
    assert_eq!(city.color, Color::from_hex("#F25482"));
    assert_eq!(city.text_color, Some(Color::from_rgb(0, 0, 0)));
    let suburb = &lines[1].content;
    assert_eq!(suburb.direction, Direction::Suburb);
    assert_eq!(suburb.text_color, Some(Color::white()));
    // night line, loaded but never enriched
    let night = &lines[2].content;
    assert_eq!(night.code, "N04");
    assert_eq!(night.mode, None);
}

#[tokio::test]
async fn test_stops_by_lines_fall_back_to_the_unknown_stop() {
    let database = SqliteDatabase::in_memory().await.unwrap();
    let report = seed(&database, RunMode::Replace).await.unwrap();

    let stage = &report.stages[4];
    assert_eq!(stage.stage, Stage::StopsByLines);
    assert_eq!(stage.rows, 3);
    assert_eq!(stage.written, 2);
    assert_eq!(stage.skipped, 1);
    assert_eq!(stage.fallbacks, 1);

    let entries = database.stops_by_lines().await.unwrap();
    assert_eq!(entries.len(), 6);
    let unknown = entries
        .iter()
        .filter(|entry| entry.stop_id.raw() == 1)
        .collect::<Vec<_>>();
    assert_eq!(unknown.len(), 1);
    assert_eq!(unknown[0].order, 2);
    assert_eq!(unknown[0].line_id.raw(), 2);

    // `8032F` resolves to stop 8032
    let bourse = database.stops().await.unwrap()[3].id;
    assert!(entries
        .iter()
        .any(|entry| entry.stop_id == bourse && entry.order == 3));
}

#[tokio::test]
async fn test_replace_run_is_repeatable() {
    let database = SqliteDatabase::in_memory().await.unwrap();
    seed(&database, RunMode::Replace).await.unwrap();
    seed(&database, RunMode::Replace).await.unwrap();

    let stops = database.stops().await.unwrap();
    assert_eq!(stops.len(), 4);
    assert_eq!(stops.iter().filter(|stop| stop.content.is_unknown()).count(), 1);
    assert_eq!(database.lines().await.unwrap().len(), 3);
    assert_eq!(database.stops_by_lines().await.unwrap().len(), 6);
}

#[tokio::test]
async fn test_append_run_duplicates_natural_keys() {
    let database = SqliteDatabase::in_memory().await.unwrap();
    let first = seed(&database, RunMode::Replace).await.unwrap();
    let second = seed(&database, RunMode::Append).await.unwrap();

    assert_eq!(first.unknown_stop, second.unknown_stop);
    assert_eq!(database.stops().await.unwrap().len(), 7);
    assert_eq!(database.lines().await.unwrap().len(), 6);
    assert_eq!(database.stops_by_lines().await.unwrap().len(), 6);

    // lookups keep resolving to the first copy
    let mut tx = database.transaction().await.unwrap();
    let first_8012 = tx.stop_id_by_code("8012").await.unwrap().unwrap();
    assert_eq!(first_8012.raw(), 2);
    tx.rollback().await.unwrap();
}

#[tokio::test]
async fn test_failed_stage_keeps_earlier_stages() {
    let database = SqliteDatabase::in_memory().await.unwrap();
    let (mut sources, dir) = sources();
    sources.line_metadata = file(
        dir.path(),
        "gtfs_routes.csv",
        "lineid_mode;route_short_name;route_color\n004t;4;#F25482\n005q;5;#000000\n",
    );

    let mut pipeline = Pipeline::new(
        database.clone(),
        sources,
        PipelineConfig::new(RunMode::Replace),
    );
    let error = pipeline.run().await.unwrap_err();

    assert!(matches!(
        error,
        SeedError::Stage {
            stage: Stage::LineMetadata,
            ..
        }
    ));
    assert_eq!(error.row(), Some(3));
    assert_eq!(database.stops().await.unwrap().len(), 4);
    let lines = database.lines().await.unwrap();
    assert_eq!(lines.len(), 3);
    // the whole batch, the valid first row included, was rolled back
    assert!(lines.iter().all(|line| line.content.mode.is_none()));
}

#[tokio::test]
async fn test_rollback_discards_writes() {
    let database = SqliteDatabase::in_memory().await.unwrap();

    let mut tx = database.transaction().await.unwrap();
    tx.insert_line(&Line::new(
        "12".to_owned(),
        Localized::new("Gare", "Station"),
        Direction::Suburb,
    ))
    .await
    .unwrap();
    tx.rollback().await.unwrap();

    assert!(database.lines().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_inserted_line_without_text_color_reads_back_white() {
    let database = SqliteDatabase::in_memory().await.unwrap();

    let mut tx = database.transaction().await.unwrap();
    let id = tx
        .insert_line(&Line::new(
            "12".to_owned(),
            Localized::new("Gare", "Station"),
            Direction::Suburb,
        ))
        .await
        .unwrap();
    let found = tx
        .line_id_by_code_and_direction("12", Direction::Suburb)
        .await
        .unwrap();
    let missing = tx
        .line_id_by_code_and_direction("12", Direction::City)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(found, Some(id));
    assert_eq!(missing, None);
    let lines = database.lines().await.unwrap();
    assert_eq!(lines[0].content.text_color, Some(Color::white()));
    assert_eq!(lines[0].content.direction.as_flag(), 0);
}

#[tokio::test]
async fn test_connect_creates_the_database_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("seed.db");
    let url = format!("sqlite://{}", path.display());

    let database = SqliteDatabase::connect(&url).await.unwrap();
    assert!(path.exists());
    seed(&database, RunMode::Replace).await.unwrap();
    drop(database);

    // schema and data survive reconnecting
    let database = SqliteDatabase::connect(&url).await.unwrap();
    assert_eq!(database.stops().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_suburb_line_is_stored_with_direction_zero() {
    let database = SqliteDatabase::in_memory().await.unwrap();
    let (mut sources, dir) = sources();
    sources.lines = file(
        dir.path(),
        "lines.csv",
        "destination;direction;lineid;points\n{\"fr\":\"Gare\",\"nl\":\"Station\"};Suburb;12;[]\n",
    );
    sources.line_text_colors = file(
        dir.path(),
        "text_colors.csv",
        "lineid;direction;route_text_color\n",
    );
    Pipeline::new(
        database.clone(),
        sources,
        PipelineConfig::new(RunMode::Replace),
    )
    .run()
    .await
    .unwrap();

    let stored: Vec<(String, i64)> = sqlx::query_as("SELECT code, direction FROM lines;")
        .fetch_all(database.pool())
        .await
        .unwrap();
    assert_eq!(stored, vec![("12".to_owned(), 0)]);
}
