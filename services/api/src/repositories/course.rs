//! Course repository for database operations

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use common::models::{Course, NewCourse, RosterEntry};
use sqlx::{Row, postgres::PgRow, types::Json};
use tracing::info;
use uuid::Uuid;

use super::{CourseStore, PgStore};

fn course_from_row(row: &PgRow) -> Course {
    let Json(student_list): Json<Vec<RosterEntry>> = row.get("student_list");

    Course {
        id: row.get("id"),
        teacher_id: row.get("teacher_id"),
        name: row.get("name"),
        course_code: row.get("course_code"),
        class_id: row.get("class_id"),
        day: row.get("day"),
        time: row.get("start_time"),
        end_time: row.get("end_time"),
        room_no: row.get("room_no"),
        student_list,
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl CourseStore for PgStore {
    async fn create_course(&self, new_course: NewCourse) -> DatabaseResult<Course> {
        info!(
            "Creating course {} ({}) for {}",
            new_course.course_code, new_course.class_id, new_course.teacher_id
        );

        let row = sqlx::query(
            r#"
            INSERT INTO courses
                (id, teacher_id, name, course_code, class_id, day, start_time, end_time, room_no, student_list)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, teacher_id, name, course_code, class_id, day, start_time, end_time,
                      room_no, student_list, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new_course.teacher_id)
        .bind(&new_course.name)
        .bind(&new_course.course_code)
        .bind(&new_course.class_id)
        .bind(&new_course.day)
        .bind(&new_course.time)
        .bind(&new_course.end_time)
        .bind(&new_course.room_no)
        .bind(Json(&new_course.student_list))
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(course_from_row(&row))
    }

    async fn courses_for_teacher(&self, teacher_id: &str) -> DatabaseResult<Vec<Course>> {
        let rows = sqlx::query(
            r#"
            SELECT id, teacher_id, name, course_code, class_id, day, start_time, end_time,
                   room_no, student_list, created_at
            FROM courses
            WHERE teacher_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(rows.iter().map(course_from_row).collect())
    }

    async fn delete_course(&self, course_id: Uuid, teacher_id: &str) -> DatabaseResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM courses
            WHERE id = $1 AND teacher_id = $2
            "#,
        )
        .bind(course_id)
        .bind(teacher_id)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::Query)?;

        Ok(result.rows_affected() > 0)
    }
}
