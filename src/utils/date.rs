use chrono::{DateTime, Local, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};

/// Source of "now". Commands take it from `--now` when given (tests, replays).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Local>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Local> {
        match self {
            Clock::System => Local::now(),
            Clock::Fixed(t) => *t,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Parse `--now`: RFC3339, or a bare YYYY-MM-DD taken at local noon.
    pub fn from_arg(arg: Option<&str>) -> Result<Self, String> {
        match arg {
            None => Ok(Clock::System),
            Some(s) => parse_instant(s).map(Clock::Fixed),
        }
    }
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

pub fn parse_instant(s: &str) -> Result<DateTime<Local>, String> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Local));
    }

    let d = parse_date(s).ok_or_else(|| format!("Invalid date/time: {}", s))?;
    let noon = NaiveTime::from_hms_opt(12, 0, 0).ok_or_else(|| "invalid time".to_string())?;
    Local
        .from_local_datetime(&d.and_time(noon))
        .earliest()
        .ok_or_else(|| format!("Nonexistent local time: {}", s))
}

/// Timestamps are stored as UTC RFC3339 so that string order == time order.
pub fn to_db_timestamp(t: &DateTime<Local>) -> String {
    t.with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Lenient reader: unparseable or empty values become `None`.
pub fn from_db_timestamp(s: Option<&str>) -> Option<DateTime<Local>> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Local))
}

pub fn to_db_date(d: &NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}
