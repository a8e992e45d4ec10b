//! Attendance repository for database operations

use async_trait::async_trait;
use chrono::NaiveDate;
use common::SessionId;
use common::error::{DatabaseError, DatabaseResult};
use common::models::AttendanceRecord;
use sqlx::{Row, postgres::PgRow};
use uuid::Uuid;

use super::{AttendanceStore, PgStore};
use crate::models::NewAttendance;

const COLUMNS: &str = "id, session_id, student_id, student_name, student_email, course_code, \
                       class_id, attendance_date, captured_at, created_at";

fn record_from_row(row: &PgRow) -> AttendanceRecord {
    let session_id: String = row.get("session_id");

    AttendanceRecord {
        id: row.get("id"),
        session_id: SessionId::new(session_id),
        student_id: row.get("student_id"),
        student_name: row.get("student_name"),
        student_email: row.get("student_email"),
        course_code: row.get("course_code"),
        class_id: row.get("class_id"),
        date: row.get("attendance_date"),
        timestamp: row.get("captured_at"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl AttendanceStore for PgStore {
    async fn find_attendance(
        &self,
        session_id: &SessionId,
        student_id: &str,
        date: NaiveDate,
    ) -> DatabaseResult<Option<AttendanceRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM attendance \
             WHERE session_id = $1 AND student_id = $2 AND attendance_date = $3 LIMIT 1"
        ))
        .bind(session_id.as_str())
        .bind(student_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(row.as_ref().map(record_from_row))
    }

    async fn insert_attendance(&self, record: NewAttendance) -> DatabaseResult<AttendanceRecord> {
        let row = sqlx::query(&format!(
            "INSERT INTO attendance \
                 (id, session_id, student_id, student_name, student_email, course_code, class_id, attendance_date, captured_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(record.session_id.as_str())
        .bind(&record.student_id)
        .bind(&record.student_name)
        .bind(&record.student_email)
        .bind(&record.course_code)
        .bind(&record.class_id)
        .bind(record.date)
        .bind(record.timestamp)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(record_from_row(&row))
    }

    async fn attendance_for_session(
        &self,
        session_id: &SessionId,
    ) -> DatabaseResult<Vec<AttendanceRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM attendance WHERE session_id = $1 ORDER BY captured_at ASC"
        ))
        .bind(session_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(rows.iter().map(record_from_row).collect())
    }

    async fn attendance_for_courses(
        &self,
        course_codes: &[String],
        class_ids: &[String],
    ) -> DatabaseResult<Vec<AttendanceRecord>> {
        if course_codes.is_empty() && class_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM attendance \
             WHERE course_code = ANY($1) OR class_id = ANY($2) \
             ORDER BY captured_at DESC"
        ))
        .bind(course_codes)
        .bind(class_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(rows.iter().map(record_from_row).collect())
    }
}
