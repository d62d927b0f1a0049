use super::DeskStore;
use crate::{error::DeskResult, progress::UserProgress, types::Millis};
use rusqlite::{params, OptionalExtension};

const DATE_FORMAT: &str = "%Y-%m-%d";

impl DeskStore {
    // ── User progress ──────────────────────────────────────────────

    pub fn load_progress(&self, profile: &str) -> DeskResult<Option<UserProgress>> {
        let row = self
            .conn
            .query_row(
                "SELECT is_first_time, has_transactions, has_cases, registration_date
                 FROM user_progress WHERE profile = ?1",
                params![profile],
                |row| {
                    Ok((
                        row.get::<_, i32>(0)? != 0,
                        row.get::<_, i32>(1)? != 0,
                        row.get::<_, i32>(2)? != 0,
                        row.get::<_, Option<String>>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((is_first_time, has_transactions, has_cases, registration_date)) = row else {
            return Ok(None);
        };

        let registration_date = registration_date
            .map(|d| chrono::NaiveDate::parse_from_str(&d, DATE_FORMAT))
            .transpose()
            .map_err(|e| anyhow::anyhow!("Bad registration_date for profile {profile}: {e}"))?;

        Ok(Some(UserProgress {
            is_first_time,
            has_transactions,
            has_cases,
            registration_date,
        }))
    }

    pub fn save_progress(&self, profile: &str, p: &UserProgress, now: Millis) -> DeskResult<()> {
        self.conn.execute(
            "INSERT INTO user_progress (
                profile, is_first_time, has_transactions, has_cases,
                registration_date, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(profile) DO UPDATE SET
                is_first_time     = excluded.is_first_time,
                has_transactions  = excluded.has_transactions,
                has_cases         = excluded.has_cases,
                registration_date = excluded.registration_date,
                updated_at        = excluded.updated_at",
            params![
                profile,
                if p.is_first_time { 1i32 } else { 0i32 },
                if p.has_transactions { 1i32 } else { 0i32 },
                if p.has_cases { 1i32 } else { 0i32 },
                p.registration_date.map(|d| d.format(DATE_FORMAT).to_string()),
                now,
            ],
        )?;
        Ok(())
    }

    pub fn delete_progress(&self, profile: &str) -> DeskResult<()> {
        self.conn.execute(
            "DELETE FROM user_progress WHERE profile = ?1",
            params![profile],
        )?;
        Ok(())
    }

    pub fn progress_profile_count(&self) -> DeskResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM user_progress", [], |row| row.get(0))?;
        Ok(count)
    }
}
