use super::parse_decimal;
use crate::error::RepositoryError;
use crate::models::Settings;
use chrono::NaiveDateTime;
use sqlx::{FromRow, SqlitePool};

/// Repository for the singleton settings record
pub struct SettingsRepository {
    pool: SqlitePool,
}

#[derive(FromRow)]
struct SettingsRow {
    min_transfer: String,
    default_betting_value: String,
    updated_at: NaiveDateTime,
}

impl SettingsRow {
    fn into_settings(self) -> Result<Settings, RepositoryError> {
        Ok(Settings {
            min_transfer: parse_decimal(&self.min_transfer, "settings.min_transfer")?,
            default_betting_value: parse_decimal(
                &self.default_betting_value,
                "settings.default_betting_value",
            )?,
            updated_at: self.updated_at,
        })
    }
}

impl SettingsRepository {
    /// Create a new SettingsRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the settings record; falls back to built-in defaults when the
    /// seed row is missing
    pub async fn get(&self) -> Result<Settings, RepositoryError> {
        let row = sqlx::query_as::<_, SettingsRow>(
            "SELECT min_transfer, default_betting_value, updated_at \
             FROM settings WHERE setting_id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row.into_settings(),
            None => Ok(Settings::defaults()),
        }
    }

    /// Save the settings record
    pub async fn save(&self, settings: &Settings) -> Result<Settings, RepositoryError> {
        sqlx::query(
            "INSERT INTO settings (setting_id, min_transfer, default_betting_value) \
             VALUES (1, ?, ?) \
             ON CONFLICT(setting_id) DO UPDATE SET \
               min_transfer = excluded.min_transfer, \
               default_betting_value = excluded.default_betting_value, \
               updated_at = CURRENT_TIMESTAMP",
        )
        .bind(settings.min_transfer.to_string())
        .bind(settings.default_betting_value.to_string())
        .execute(&self.pool)
        .await?;

        self.get().await
    }
}
