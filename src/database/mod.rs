use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::time::Duration;
use teloxide::types::ChatId;
use chrono::{DateTime, Utc};

use crate::models::UserProfile;

/// Хранилище профилей. Поиск по id, запись — всегда целиком
/// (INSERT OR REPLACE), частичных обновлений нет.
#[derive(Clone, Debug)]
pub struct Database {
    pub pool: SqlitePool,
}

// Простая ошибка без внешних зависимостей
#[derive(Debug)]
pub enum DatabaseError {
    Sql(String),
}

impl std::fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseError::Sql(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for DatabaseError {}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        DatabaseError::Sql(err.to_string())
    }
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self, DatabaseError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(database_url)
            .await?;

        Ok(Database { pool })
    }

    pub async fn init(&self) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                first_name TEXT,
                last_name TEXT,
                username TEXT,
                zodiac_sign TEXT,
                birth_date TEXT,
                birth_time TEXT,
                is_premium BOOLEAN NOT NULL DEFAULT false,
                premium_expiry DATETIME
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_is_premium ON users (is_premium)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Незарегистрированный пользователь — это Ok(None), а не ошибка.
    pub async fn get_user(&self, user_id: ChatId) -> Result<Option<UserProfile>, DatabaseError> {
        let row = sqlx::query(
            "SELECT id, first_name, last_name, username, zodiac_sign, birth_date, birth_time, is_premium, premium_expiry
             FROM users WHERE id = ?",
        )
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let premium_expiry: Option<DateTime<Utc>> = row.get("premium_expiry");

        Ok(Some(UserProfile {
            id: ChatId(row.get::<i64, _>("id")),
            first_name: row.get::<Option<String>, _>("first_name").unwrap_or_default(),
            last_name: row.get("last_name"),
            username: row.get("username"),
            zodiac_sign: row.get("zodiac_sign"),
            birth_date: row.get("birth_date"),
            birth_time: row.get("birth_time"),
            is_premium: row.get("is_premium"),
            premium_expiry,
        }))
    }

    pub async fn save_user(&self, user: &UserProfile) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO users
                (id, first_name, last_name, username, zodiac_sign, birth_date, birth_time, is_premium, premium_expiry)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.0)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.username)
        .bind(&user.zodiac_sign)
        .bind(&user.birth_date)
        .bind(&user.birth_time)
        .bind(user.is_premium)
        .bind(user.premium_expiry)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    async fn test_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let db = Database::new(&url).await.expect("database");
        db.init().await.expect("init");
        (db, dir)
    }

    fn sample_user() -> UserProfile {
        UserProfile::new(
            ChatId(777),
            "Иван".to_string(),
            Some("Петров".to_string()),
            Some("ivan".to_string()),
        )
    }

    #[tokio::test]
    async fn missing_user_is_none() {
        let (db, _dir) = test_db().await;
        assert!(db.get_user(ChatId(1)).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn save_then_get_roundtrip() {
        let (db, _dir) = test_db().await;
        let user = sample_user();
        db.save_user(&user).await.expect("save");

        let loaded = db.get_user(ChatId(777)).await.expect("get").expect("exists");
        assert_eq!(loaded, user);
    }

    #[tokio::test]
    async fn save_replaces_whole_record() {
        let (db, _dir) = test_db().await;
        let mut user = sample_user();
        db.save_user(&user).await.expect("save");

        user.birth_date = Some("15/06/1990".to_string());
        user.zodiac_sign = Some("♈️ Овен".to_string());
        db.save_user(&user).await.expect("save again");

        let loaded = db.get_user(ChatId(777)).await.expect("get").expect("exists");
        assert_eq!(loaded.birth_date.as_deref(), Some("15/06/1990"));
        assert_eq!(loaded.zodiac_sign.as_deref(), Some("♈️ Овен"));
        assert_eq!(loaded.first_name, "Иван");
    }

    #[tokio::test]
    async fn premium_expiry_survives_roundtrip() {
        let (db, _dir) = test_db().await;
        let mut user = sample_user();
        let expiry = Utc::now() + ChronoDuration::days(30);
        user.is_premium = true;
        user.premium_expiry = Some(expiry);
        db.save_user(&user).await.expect("save");

        let loaded = db.get_user(ChatId(777)).await.expect("get").expect("exists");
        assert!(loaded.is_premium);
        let stored = loaded.premium_expiry.expect("expiry");
        // SQLite хранит дату текстом, допускаем потерю долей секунды
        assert!((stored - expiry).num_seconds().abs() <= 1);
    }
}
