use chrono::NaiveDate;

/// This is the standard way of converting a date to a string in focusflow. The same format keys
/// the stored record.
pub const STORAGE_DATE_FORMAT: &str = "%Y-%m-%d";

pub fn date_to_storage_key(date: NaiveDate) -> String {
    date.format(STORAGE_DATE_FORMAT).to_string()
}

pub fn parse_storage_key(key: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(key, STORAGE_DATE_FORMAT)
}
