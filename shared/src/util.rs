/// Current UTC time as an RFC 3339 string, used for `last_sync`.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Today's date (UTC) as `YYYY-MM-DD`.
pub fn today() -> String {
    chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Generate a client-side record id.
///
/// Ids are created before the remote store sees the record, so they must not
/// depend on server sequencing. A v4 UUID carries 122 random bits, which keeps
/// the collision probability negligible at any realistic data volume.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
