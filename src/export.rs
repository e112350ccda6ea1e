//! CSV export for the admin tables.

use chrono::{DateTime, Utc};

use crate::models::access_log::AccessLog;
use crate::models::member::MemberVerification;

/// UTF-8 byte-order mark. Excel needs it to pick up the encoding.
const BOM: &str = "\u{feff}";

/// Escape one CSV field: double embedded quotes, then wrap the field in
/// quotes when it contains a comma, quote or line break.
fn escape_csv(value: &str) -> String {
    let needs_quotes = value.contains(',')
        || value.contains('"')
        || value.contains('\n')
        || value.contains('\r');
    let doubled = value.replace('"', "\"\"");
    if needs_quotes {
        format!("\"{doubled}\"")
    } else {
        doubled
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

fn format_size_mb(bytes: Option<u64>) -> String {
    match bytes {
        Some(n) => format!("{:.2}", n as f64 / (1024.0 * 1024.0)),
        None => String::new(),
    }
}

/// The member-verifications table as a CSV document.
pub fn members_csv(members: &[MemberVerification]) -> String {
    let mut rows = Vec::with_capacity(members.len() + 1);
    rows.push(
        "Full Name,Email,Phone,Company,Note,File Name,File Size (MB),Created At".to_string(),
    );
    for m in members {
        rows.push(
            [
                escape_csv(&m.full_name),
                escape_csv(&m.member_email),
                escape_csv(&m.phone),
                escape_csv(&m.company_name),
                escape_csv(m.note.as_deref().unwrap_or("")),
                escape_csv(m.file_name.as_deref().unwrap_or("")),
                format_size_mb(m.file_size),
                escape_csv(&format_timestamp(&m.created_at)),
            ]
            .join(","),
        );
    }
    format!("{BOM}{}", rows.join("\n"))
}

/// One page of access logs as a CSV document.
pub fn access_logs_csv(logs: &[AccessLog]) -> String {
    let mut rows = Vec::with_capacity(logs.len() + 1);
    rows.push("ID,IPv4,IPv6,Email,Access Count,Last Access".to_string());
    for log in logs {
        rows.push(
            [
                log.id.to_string(),
                escape_csv(log.ipv4.as_deref().unwrap_or("")),
                escape_csv(log.ipv6.as_deref().unwrap_or("")),
                escape_csv(log.email.as_deref().unwrap_or("")),
                log.access_count.to_string(),
                escape_csv(&format_timestamp(&log.last_access_time)),
            ]
            .join(","),
        );
    }
    format!("{BOM}{}", rows.join("\n"))
}

/// `<prefix>-YYYY-MM-DD.csv`, the default export file name.
pub fn dated_file_name(prefix: &str) -> String {
    format!("{}-{}.csv", prefix, Utc::now().format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn member(note: &str) -> MemberVerification {
        MemberVerification {
            id: 1,
            full_name: "Nguyen Van A".to_string(),
            phone: "0900000000".to_string(),
            company_name: "ACME, Ltd".to_string(),
            note: Some(note.to_string()),
            member_email: "a@acme.vn".to_string(),
            file_name: Some("app.apk".to_string()),
            file_size: Some(2 * 1024 * 1024),
            created_at: Utc.with_ymd_and_hms(2025, 11, 2, 8, 30, 0).unwrap(),
        }
    }

    #[test]
    fn plain_fields_pass_through() {
        assert_eq!(escape_csv("hello"), "hello");
    }

    #[test]
    fn commas_and_quotes_are_quoted() {
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn members_csv_has_bom_header_and_escaped_rows() {
        let csv = members_csv(&[member("urgent, please")]);
        assert!(csv.starts_with('\u{feff}'));

        let mut lines = csv.trim_start_matches('\u{feff}').lines();
        assert_eq!(
            lines.next().unwrap(),
            "Full Name,Email,Phone,Company,Note,File Name,File Size (MB),Created At"
        );
        let row = lines.next().unwrap();
        assert!(row.contains("\"ACME, Ltd\""));
        assert!(row.contains("\"urgent, please\""));
        assert!(row.contains("2.00"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn access_logs_csv_handles_missing_fields() {
        let log = AccessLog {
            id: 3,
            ipv4: Some("203.0.113.9".to_string()),
            ipv6: None,
            email: None,
            access_count: 12,
            last_access_time: Utc.with_ymd_and_hms(2025, 11, 2, 8, 30, 0).unwrap(),
        };
        let csv = access_logs_csv(&[log]);
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(row, "3,203.0.113.9,,,12,2025-11-02 08:30");
    }

    #[test]
    fn dated_file_name_shape() {
        let name = dated_file_name("member-verifications");
        assert!(name.starts_with("member-verifications-"));
        assert!(name.ends_with(".csv"));
    }
}
