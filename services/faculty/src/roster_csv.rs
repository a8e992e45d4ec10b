//! Roster import and attendance export as CSV

use chrono::DateTime;
use common::models::{AttendanceRecord, RosterEntry};
use std::collections::BTreeMap;

/// Parse an uploaded roster of `"EnrollmentNumber","StudentName"` rows
///
/// The first line is a header. Blank lines and rows missing either column
/// are skipped.
pub fn parse_roster(text: &str) -> Vec<RosterEntry> {
    text.lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let mut parts = line.split(',');
            let student_id = unquote(parts.next()?);
            let student_name = unquote(parts.next()?);

            if student_id.is_empty() || student_name.is_empty() {
                return None;
            }

            Some(RosterEntry {
                student_id,
                student_name,
            })
        })
        .collect()
}

fn unquote(field: &str) -> String {
    field.trim().replace('"', "").trim().to_string()
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_rows<const N: usize>(header: [&str; N], rows: impl Iterator<Item = [String; N]>) -> String {
    let mut lines = vec![header.join(",")];
    lines.extend(rows.map(|row| {
        row.iter()
            .map(|field| escape(field))
            .collect::<Vec<_>>()
            .join(",")
    }));
    lines.join("\n")
}

fn capture_time(record: &AttendanceRecord) -> String {
    DateTime::from_timestamp_millis(record.timestamp)
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_default()
}

/// Export one class's records for download
pub fn export_class_records(records: &[AttendanceRecord]) -> String {
    write_rows(
        ["Date", "Student Name", "Enrollment Number", "Subject", "Time"],
        records.iter().map(|r| {
            [
                r.date.format("%Y-%m-%d").to_string(),
                r.student_name.clone(),
                r.student_id.clone(),
                r.course_code.clone(),
                capture_time(r),
            ]
        }),
    )
}

/// Export the roster of the live session
pub fn export_session_roster(records: &[AttendanceRecord]) -> String {
    write_rows(
        ["Enrollment Number", "Student Name", "Time Scanned", "Date"],
        records.iter().map(|r| {
            [
                r.student_id.clone(),
                r.student_name.clone(),
                capture_time(r),
                r.date.format("%Y-%m-%d").to_string(),
            ]
        }),
    )
}

/// Records keyed by class id, preserving their relative order
pub fn group_by_class(records: Vec<AttendanceRecord>) -> BTreeMap<String, Vec<AttendanceRecord>> {
    let mut classes: BTreeMap<String, Vec<AttendanceRecord>> = BTreeMap::new();
    for record in records {
        classes.entry(record.class_id.clone()).or_default().push(record);
    }
    classes
}

pub fn class_export_file_name(class_id: &str) -> String {
    format!("attendance_{}.csv", class_id)
}

pub fn session_export_file_name(course_code: &str, date: chrono::NaiveDate) -> String {
    format!("attendance_{}_{}.csv", course_code, date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use common::SessionId;
    use uuid::Uuid;

    fn record(student: &str, name: &str, class_id: &str) -> AttendanceRecord {
        AttendanceRecord {
            id: Uuid::new_v4(),
            session_id: SessionId::new("s1"),
            student_id: student.to_string(),
            student_name: name.to_string(),
            student_email: format!("{}@college.edu", student),
            course_code: "CS301".to_string(),
            class_id: class_id.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            timestamp: Utc
                .with_ymd_and_hms(2024, 5, 1, 9, 15, 30)
                .unwrap()
                .timestamp_millis(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_parse_roster_skips_header_and_strips_quotes() {
        let csv = "\"EnrollmentNumber\",\"StudentName\"\n\
                   \"EN22CS301307\",\"CHIRAN VIKRAM SHAHI\"\n\
                   \n\
                   EN22CS301308 , Asha Rao \r\n\
                   \"EN22CS301309\",\"\"\n\
                   lonely\n";

        let roster = parse_roster(csv);

        assert_eq!(
            roster,
            vec![
                RosterEntry {
                    student_id: "EN22CS301307".to_string(),
                    student_name: "CHIRAN VIKRAM SHAHI".to_string(),
                },
                RosterEntry {
                    student_id: "EN22CS301308".to_string(),
                    student_name: "Asha Rao".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_roster_header_only() {
        assert!(parse_roster("EnrollmentNumber,StudentName").is_empty());
        assert!(parse_roster("").is_empty());
    }

    #[test]
    fn test_export_class_records() {
        let csv = export_class_records(&[record("en001", "Asha", "A1")]);

        assert_eq!(
            csv,
            "Date,Student Name,Enrollment Number,Subject,Time\n\
             2024-05-01,Asha,en001,CS301,09:15:30"
        );
    }

    #[test]
    fn test_export_quotes_fields_with_commas() {
        let csv = export_session_roster(&[record("en001", "Rao, Asha", "A1")]);

        assert_eq!(
            csv,
            "Enrollment Number,Student Name,Time Scanned,Date\n\
             en001,\"Rao, Asha\",09:15:30,2024-05-01"
        );
    }

    #[test]
    fn test_group_by_class() {
        let grouped = group_by_class(vec![
            record("en001", "Asha", "B2"),
            record("en002", "Ravi", "A1"),
            record("en003", "Meera", "B2"),
        ]);

        let classes: Vec<&String> = grouped.keys().collect();
        assert_eq!(classes, vec!["A1", "B2"]);
        let b2: Vec<&str> = grouped["B2"].iter().map(|r| r.student_id.as_str()).collect();
        assert_eq!(b2, vec!["en001", "en003"]);
    }

    #[test]
    fn test_export_file_names() {
        assert_eq!(class_export_file_name("A1"), "attendance_A1.csv");
        assert_eq!(
            session_export_file_name("CS301", NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()),
            "attendance_CS301_2024-05-01.csv"
        );
    }
}
