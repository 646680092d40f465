//! Filter descriptor and reporting windows

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Display;
use std::str::FromStr;

use crate::types::*;

/// Period selector for the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "dateRange", rename_all = "lowercase")]
pub enum DateRange {
    /// From local midnight until now
    Today,
    /// Rolling seven days ending now
    Week,
    Month,
    Quarter,
    Year,
    /// Inclusive local dates; the end date runs through 23:59:59
    Custom {
        #[serde(rename = "startDate")]
        start_date: NaiveDate,
        #[serde(rename = "endDate")]
        end_date: NaiveDate,
    },
    /// Everything since the Unix epoch
    All,
}

impl DateRange {
    /// Build a range from its wire name, failing with `InvalidFilter` on
    /// unknown names or a custom range without both dates
    pub fn parse(
        name: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> EngineResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "today" => Ok(DateRange::Today),
            "week" => Ok(DateRange::Week),
            "month" => Ok(DateRange::Month),
            "quarter" => Ok(DateRange::Quarter),
            "year" => Ok(DateRange::Year),
            "all" => Ok(DateRange::All),
            "custom" => match (start_date, end_date) {
                (Some(start_date), Some(end_date)) => Ok(DateRange::Custom {
                    start_date,
                    end_date,
                }),
                _ => Err(EngineError::InvalidFilter(
                    "Custom range requires startDate and endDate".to_string(),
                )),
            },
            other => Err(EngineError::InvalidFilter(format!(
                "Unknown date range '{}'",
                other
            ))),
        }
    }
}

/// Either every value or one specific value of a dimension.
///
/// On the wire this is the string `"all"` or the value itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T> {
    All,
    Only(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T: PartialEq> Selection<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(expected) => expected == value,
        }
    }

    /// Match against an optional value; absent values only pass `All`
    pub fn matches_opt(&self, value: Option<&T>) -> bool {
        match (self, value) {
            (Selection::All, _) => true,
            (Selection::Only(expected), Some(value)) => expected == value,
            (Selection::Only(_), None) => false,
        }
    }
}

impl<T: FromStr> FromStr for Selection<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Selection::All)
        } else {
            s.parse().map(Selection::Only)
        }
    }
}

impl<T: Display> Serialize for Selection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Selection::All => serializer.serialize_str("all"),
            Selection::Only(value) => serializer.collect_str(value),
        }
    }
}

impl<'de, T> Deserialize<'de> for Selection<T>
where
    T: FromStr,
    T::Err: Display,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Dashboard filter descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsFilter {
    #[serde(flatten)]
    pub date_range: DateRange,
    #[serde(default)]
    pub order_type: Selection<OrderType>,
    #[serde(default)]
    pub category: Selection<Category>,
    /// User id of the employee who created the order
    #[serde(default)]
    pub employee: Selection<String>,
}

impl AnalyticsFilter {
    /// Filter over `date_range` with every dimension set to `all`
    pub fn new(date_range: DateRange) -> Self {
        Self {
            date_range,
            order_type: Selection::All,
            category: Selection::All,
            employee: Selection::All,
        }
    }

    pub fn with_order_type(mut self, order_type: OrderType) -> Self {
        self.order_type = Selection::Only(order_type);
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Selection::Only(category);
        self
    }

    pub fn with_employee(mut self, user_id: impl Into<String>) -> Self {
        self.employee = Selection::Only(user_id.into());
        self
    }
}

/// Closed time interval `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Equal-length window ending one millisecond before this one starts
    pub fn previous(&self) -> TimeWindow {
        TimeWindow {
            start: self.start - self.duration(),
            end: self.start - Duration::milliseconds(1),
        }
    }
}

/// Current window for `range` relative to `now`.
///
/// Calendar boundaries (midnight, first of month) are taken in `now`'s offset.
pub fn current_window(range: &DateRange, now: DateTime<FixedOffset>) -> EngineResult<TimeWindow> {
    let offset = *now.offset();
    let today = now.date_naive();
    let end = now.with_timezone(&Utc);

    let start = match range {
        DateRange::Today => local_midnight(today, offset)?,
        DateRange::Week => end - Duration::days(7),
        DateRange::Month => local_midnight(first_of_month(today, today.month())?, offset)?,
        DateRange::Quarter => {
            let quarter_month = (today.month0() / 3) * 3 + 1;
            local_midnight(first_of_month(today, quarter_month)?, offset)?
        }
        DateRange::Year => local_midnight(first_of_month(today, 1)?, offset)?,
        DateRange::All => DateTime::<Utc>::UNIX_EPOCH,
        DateRange::Custom {
            start_date,
            end_date,
        } => {
            if end_date < start_date {
                return Err(EngineError::InvalidFilter(format!(
                    "Custom range ends ({}) before it starts ({})",
                    end_date, start_date
                )));
            }
            let end_of_day = NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
                .ok_or_else(|| EngineError::InvalidFilter("Invalid end of day".to_string()))?;
            let end = to_utc(end_date.and_time(end_of_day), offset)?;
            return Ok(TimeWindow {
                start: local_midnight(*start_date, offset)?,
                end,
            });
        }
    };

    Ok(TimeWindow { start, end })
}

fn first_of_month(today: NaiveDate, month: u32) -> EngineResult<NaiveDate> {
    NaiveDate::from_ymd_opt(today.year(), month, 1).ok_or_else(|| {
        EngineError::InvalidFilter(format!("No first day for month {} of {}", month, today.year()))
    })
}

fn local_midnight(date: NaiveDate, offset: FixedOffset) -> EngineResult<DateTime<Utc>> {
    to_utc(date.and_time(NaiveTime::MIN), offset)
}

fn to_utc(local: chrono::NaiveDateTime, offset: FixedOffset) -> EngineResult<DateTime<Utc>> {
    offset
        .from_local_datetime(&local)
        .single()
        .map(|instant| instant.with_timezone(&Utc))
        .ok_or_else(|| EngineError::InvalidFilter(format!("Unrepresentable local time {}", local)))
}
