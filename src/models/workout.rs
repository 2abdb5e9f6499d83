use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::FromSqliteRow;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workout {
    pub id: String,
    pub user_id: i64,
    pub date: NaiveDate,
    /// Weekday name as it was written at creation time.
    pub weekday: String,
    pub created_at: DateTime<Utc>,
}

impl FromSqliteRow for Workout {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            date: row.get("date")?,
            weekday: row.get("weekday")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// Row of the history list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkoutSummary {
    pub id: String,
    pub date: NaiveDate,
    pub weekday: String,
}

impl FromSqliteRow for WorkoutSummary {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            date: row.get("date")?,
            weekday: row.get("weekday")?,
        })
    }
}

/// English weekday name, as `%A` formats it.
pub fn weekday_name(date: NaiveDate) -> String {
    date.format("%A").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_name() {
        let date = NaiveDate::from_ymd_opt(2024, 10, 14).unwrap();
        assert_eq!(weekday_name(date), "Monday");

        let date = NaiveDate::from_ymd_opt(2024, 10, 20).unwrap();
        assert_eq!(weekday_name(date), "Sunday");
    }
}
