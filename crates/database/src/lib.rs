use std::error::Error;

use async_trait::async_trait;
use model::{line::Line, stop::Stop, stop_by_line::StopByLine, WithId};
use queries::convert_error;
use seeder::database::{Database, DatabaseTransaction};
use sqlx::{
    migrate::MigrateDatabase,
    sqlite::{SqlitePool, SqlitePoolOptions},
    Sqlite, Transaction,
};

pub mod data_model;
pub mod queries;

#[derive(Clone)]
pub struct SqliteDatabase {
    connection: SqlitePool,
}

pub struct SqliteDatabaseTransaction<'a> {
    tx: Transaction<'a, Sqlite>,
}

impl SqliteDatabase {
    /// Opens the database at `url`, creating the file when missing, and
    /// brings its schema up to date.
    pub async fn connect(url: &str) -> Result<Self, Box<dyn Error>> {
        if !Sqlite::database_exists(url).await? {
            log::info!("creating database {}.", url);
            Sqlite::create_database(url).await?;
        }
        let pool = SqlitePool::connect(url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { connection: pool })
    }

    /// A database living as long as the returned handle and its clones.
    pub async fn in_memory() -> Result<Self, Box<dyn Error>> {
        // every connection to `sqlite::memory:` sees its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { connection: pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.connection
    }

    pub async fn stops(&self) -> seeder::database::Result<Vec<WithId<Stop>>> {
        queries::stop::get_all(&self.connection).await
    }

    pub async fn lines(&self) -> seeder::database::Result<Vec<WithId<Line>>> {
        queries::line::get_all(&self.connection).await
    }

    pub async fn stops_by_lines(&self) -> seeder::database::Result<Vec<StopByLine>> {
        queries::stop_by_line::get_all(&self.connection).await
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    type Transaction = SqliteDatabaseTransaction<'static>;

    async fn transaction(&self) -> seeder::database::Result<Self::Transaction> {
        let tx: Transaction<'_, Sqlite> = self
            .connection
            .begin()
            .await
            .map_err(|why| convert_error(why))?;

        Ok(SqliteDatabaseTransaction { tx })
    }
}

#[async_trait]
impl<'a> DatabaseTransaction for SqliteDatabaseTransaction<'a> {
    async fn commit(self) -> seeder::database::Result<()> {
        self.tx.commit().await.map_err(|why| convert_error(why))
    }

    async fn rollback(self) -> seeder::database::Result<()> {
        self.tx.rollback().await.map_err(|why| convert_error(why))
    }
}
