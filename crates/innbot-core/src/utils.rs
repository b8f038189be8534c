use chrono::Utc;

/// RFC3339 timestamp in UTC (for persisted rows and logs).
pub fn iso_timestamp_utc() -> String {
    Utc::now().to_rfc3339()
}
