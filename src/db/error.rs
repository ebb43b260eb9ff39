use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Failures surfaced by the repositories.
///
/// Unique-constraint violations are translated into [`StoreError::Conflict`] so
/// the web layer can point at the offending form field instead of failing the
/// whole request.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("{message}")]
    Conflict { field: String, message: String },

    #[error("{0}")]
    Rejected(String),

    #[error("{entity} {id} does not exist")]
    InvalidReference { entity: &'static str, id: i32 },

    #[error("Database error: {0}")]
    Database(DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    #[must_use]
    pub const fn not_found(entity: &'static str, id: i32) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => {
                let field = unique_column(&msg).unwrap_or("value").to_string();
                Self::Conflict {
                    message: format!("{field} is already in use"),
                    field,
                }
            }
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                Self::Rejected("A referenced record does not exist".to_string())
            }
            _ => Self::Database(err),
        }
    }
}

/// Extracts the column name from a SQLite unique violation message such as
/// `UNIQUE constraint failed: dispositivi.hostname`.
fn unique_column(msg: &str) -> Option<&str> {
    let (_, cols) = msg.split_once("failed: ")?;
    let first = cols.split(',').next()?.trim();
    let column = first.rsplit_once('.').map_or(first, |(_, c)| c);
    let column = column.trim_end_matches(|c: char| !c.is_alphanumeric() && c != '_');
    (!column.is_empty()).then_some(column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_column() {
        assert_eq!(
            unique_column("UNIQUE constraint failed: dispositivi.hostname"),
            Some("hostname")
        );
        assert_eq!(
            unique_column("error returned from database: (code: 2067) UNIQUE constraint failed: reti.address"),
            Some("address")
        );
        assert_eq!(
            unique_column("UNIQUE constraint failed: accessi.impiegato_id, accessi.dispositivo_id"),
            Some("impiegato_id")
        );
        assert_eq!(unique_column("disk I/O error"), None);
    }
}
