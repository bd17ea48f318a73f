use seeder::database::DatabaseError;

pub mod line;
pub mod stop;
pub mod stop_by_line;

pub(crate) fn convert_error(why: sqlx::Error) -> DatabaseError {
    match why {
        sqlx::Error::RowNotFound => DatabaseError::NotFound,
        _ => DatabaseError::Other(Box::new(why)),
    }
}

pub(crate) fn convert_json_error(why: serde_json::Error) -> DatabaseError {
    DatabaseError::other(why)
}
