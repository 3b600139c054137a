use serde::Serialize;

pub mod request;

/// Media source of sentiment scores. Selects the endpoint path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[non_exhaustive]
pub enum SentimentSource {
    /// Financial news, served from `sentiments`
    #[default]
    News,
    /// Tweets, served from `tweets-sentiments`
    Tweets,
}

impl SentimentSource {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            SentimentSource::News => "sentiments",
            SentimentSource::Tweets => "tweets-sentiments",
        }
    }
}

/// Body format requested from the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[non_exhaustive]
pub enum Fmt {
    #[default]
    Csv,
    Json,
}

/// Bar period of end-of-day data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, strum_macros::Display)]
#[non_exhaustive]
pub enum Period {
    #[default]
    #[serde(rename = "d")]
    #[strum(serialize = "d")]
    Daily,
    #[serde(rename = "w")]
    #[strum(serialize = "w")]
    Weekly,
    #[serde(rename = "m")]
    #[strum(serialize = "m")]
    Monthly,
}

/// Date order of returned rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, strum_macros::Display)]
#[non_exhaustive]
pub enum Order {
    #[default]
    #[serde(rename = "a")]
    #[strum(serialize = "a")]
    Ascending,
    #[serde(rename = "d")]
    #[strum(serialize = "d")]
    Descending,
}

/// Bar interval of intraday data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, strum_macros::Display)]
#[non_exhaustive]
pub enum Interval {
    #[default]
    #[serde(rename = "1m")]
    #[strum(serialize = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    #[strum(serialize = "5m")]
    FiveMinutes,
    #[serde(rename = "1h")]
    #[strum(serialize = "1h")]
    OneHour,
}

/// Change comparison of economic events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[non_exhaustive]
pub enum Comparison {
    Mom,
    Qoq,
    Yoy,
}

/// Data set of the bulk end-of-day endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[non_exhaustive]
pub enum BulkKind {
    #[default]
    Eod,
    Splits,
    Dividends,
}

/// Calendar type. Selects the endpoint path and the parameters it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[non_exhaustive]
pub enum CalendarKind {
    Earnings,
    Trends,
    Ipos,
    Splits,
}

impl CalendarKind {
    /// Record fields this calendar does not accept.
    #[must_use]
    pub fn excluded(self) -> &'static [&'static str] {
        match self {
            CalendarKind::Earnings => &[],
            CalendarKind::Trends => &["start", "finish"],
            CalendarKind::Ipos | CalendarKind::Splits => &["symbols"],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_should_match_wire_names() {
        assert_eq!(Period::Weekly.to_string(), "w");
        assert_eq!(Order::Descending.to_string(), "d");
        assert_eq!(Interval::FiveMinutes.to_string(), "5m");
        assert_eq!(CalendarKind::Ipos.to_string(), "ipos");
        assert_eq!(serde_json::to_value(Fmt::Json).unwrap(), "json");
    }

    #[test]
    fn sentiment_source_should_select_path() {
        assert_eq!(SentimentSource::News.path(), "sentiments");
        assert_eq!(SentimentSource::Tweets.path(), "tweets-sentiments");
    }
}
