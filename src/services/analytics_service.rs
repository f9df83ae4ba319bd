//! Analytics service layer
//!
//! Turns an analytics request into click store queries and shapes the
//! result. All windows are half-open and measured in UTC.
//!
//! # Modes
//!
//! - default: totals, unique IPs, user agent groups and 7/30-day/all-time counts
//! - by day (`YYYY-MM-DD`) and by month (`YYYY-MM`): the same figures within one calendar period
//! - by field (`browser`, `os`, `device`): all-time counts grouped on that one column

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::analytics::user_agent::UNKNOWN;
use crate::errors::{LinkmeterError, Result};
use crate::storage::{
    AnalyticsField, FieldCountRow, PeriodCounts, SeaOrmStorage, TimeWindow, UserAgentCountRow,
};

// ============ Request ============

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsMode {
    Default,
    ByDay(NaiveDate),
    ByMonth { year: i32, month: u32 },
    ByField(AnalyticsField),
}

impl AnalyticsMode {
    /// Build a mode from the `by` and `value` query parameters.
    pub fn parse(by: Option<&str>, value: Option<&str>) -> Result<Self> {
        let value = value.map(str::trim).filter(|v| !v.is_empty());

        match by.map(str::trim).unwrap_or_default() {
            "" => Ok(AnalyticsMode::Default),
            "day" => {
                let value = value.ok_or_else(|| {
                    LinkmeterError::validation("'value' must be specified for day analytics")
                })?;
                let day = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
                    LinkmeterError::validation("invalid date format, must be YYYY-MM-DD")
                })?;
                Ok(AnalyticsMode::ByDay(day))
            }
            "month" => {
                let value = value.ok_or_else(|| {
                    LinkmeterError::validation("'value' must be specified for month analytics")
                })?;
                let first = NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d")
                    .map_err(|_| {
                        LinkmeterError::validation("invalid month format, must be YYYY-MM")
                    })?;
                Ok(AnalyticsMode::ByMonth {
                    year: first.year(),
                    month: first.month(),
                })
            }
            field => Ok(AnalyticsMode::ByField(field.parse()?)),
        }
    }

    /// The `[from, to)` window for day and month modes.
    pub fn window(&self) -> Result<Option<TimeWindow>> {
        let (start, end) = match *self {
            AnalyticsMode::ByDay(day) => {
                let next = day
                    .checked_add_days(Days::new(1))
                    .ok_or_else(|| LinkmeterError::validation("date out of range"))?;
                (day, next)
            }
            AnalyticsMode::ByMonth { year, month } => {
                let first = NaiveDate::from_ymd_opt(year, month, 1)
                    .ok_or_else(|| LinkmeterError::validation("invalid month"))?;
                let next = first
                    .checked_add_months(Months::new(1))
                    .ok_or_else(|| LinkmeterError::validation("month out of range"))?;
                (first, next)
            }
            AnalyticsMode::Default | AnalyticsMode::ByField(_) => return Ok(None),
        };

        Ok(Some(TimeWindow::between(midnight(start), midnight(end))))
    }
}

fn midnight(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

// ============ Results ============

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserAgentStat {
    pub browser: String,
    pub os: String,
    pub device: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldStat {
    pub value: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverviewAnalytics {
    pub short: String,
    pub total_clicks: u64,
    pub unique_ips: u64,
    pub user_agents: Vec<UserAgentStat>,
    pub period: PeriodCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodAnalytics {
    pub short: String,
    pub total_clicks: u64,
    pub unique_ips: u64,
    pub user_agents: Vec<UserAgentStat>,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldAnalytics {
    pub short: String,
    pub field: &'static str,
    pub stats: Vec<FieldStat>,
    pub period: PeriodCounts,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AggregationResult {
    Overview(OverviewAnalytics),
    Period(PeriodAnalytics),
    Field(FieldAnalytics),
}

// ============ Service ============

pub struct AnalyticsService {
    storage: Arc<SeaOrmStorage>,
}

impl AnalyticsService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    pub async fn aggregate(&self, code: &str, mode: AnalyticsMode) -> Result<AggregationResult> {
        self.aggregate_at(code, mode, Utc::now()).await
    }

    /// Aggregate from raw `by`/`value` query parameters.
    ///
    /// An unknown code is `NotFound` even when the filter is also invalid.
    pub async fn aggregate_query(
        &self,
        code: &str,
        by: Option<&str>,
        value: Option<&str>,
    ) -> Result<AggregationResult> {
        self.ensure_exists(code).await?;
        let mode = AnalyticsMode::parse(by, value)?;
        self.run(code, mode, Utc::now()).await
    }

    /// Same as [`aggregate`](Self::aggregate) with the 7/30-day periods
    /// measured back from `now`.
    pub async fn aggregate_at(
        &self,
        code: &str,
        mode: AnalyticsMode,
        now: DateTime<Utc>,
    ) -> Result<AggregationResult> {
        self.ensure_exists(code).await?;
        self.run(code, mode, now).await
    }

    // Expired aliases still have analytics; only unknown codes are rejected.
    async fn ensure_exists(&self, code: &str) -> Result<()> {
        if !self.storage.alias_exists(code).await? {
            return Err(LinkmeterError::not_found(format!(
                "Short link '{}' not found",
                code
            )));
        }
        Ok(())
    }

    async fn run(
        &self,
        code: &str,
        mode: AnalyticsMode,
        now: DateTime<Utc>,
    ) -> Result<AggregationResult> {
        debug!("Aggregating analytics for '{}' ({:?})", code, mode);
        let storage = &self.storage;

        match mode {
            AnalyticsMode::Default => {
                let (total_clicks, unique_ips, user_agents, period) = tokio::try_join!(
                    storage.count_clicks(code, None),
                    storage.count_unique_ips(code, None),
                    storage.user_agent_breakdown(code, None),
                    storage.period_counts(code, now),
                )?;

                Ok(AggregationResult::Overview(OverviewAnalytics {
                    short: code.to_string(),
                    total_clicks,
                    unique_ips,
                    user_agents: merge_user_agents(user_agents),
                    period,
                }))
            }
            AnalyticsMode::ByDay(_) | AnalyticsMode::ByMonth { .. } => {
                let window = mode
                    .window()?
                    .ok_or_else(|| LinkmeterError::internal("calendar mode without a window"))?;

                let (total_clicks, unique_ips, user_agents) = tokio::try_join!(
                    storage.count_clicks(code, Some(window)),
                    storage.count_unique_ips(code, Some(window)),
                    storage.user_agent_breakdown(code, Some(window)),
                )?;

                Ok(AggregationResult::Period(PeriodAnalytics {
                    short: code.to_string(),
                    total_clicks,
                    unique_ips,
                    user_agents: merge_user_agents(user_agents),
                    from: window.start,
                    to: window.end.unwrap_or(now),
                }))
            }
            AnalyticsMode::ByField(field) => {
                let (rows, period) = tokio::try_join!(
                    storage.field_breakdown(code, field),
                    storage.period_counts(code, now),
                )?;

                Ok(AggregationResult::Field(FieldAnalytics {
                    short: code.to_string(),
                    field: field.as_str(),
                    stats: merge_field_rows(rows),
                    period,
                }))
            }
        }
    }
}

fn or_unknown(value: Option<String>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Fold NULL groups into the literal "Unknown" group and re-sort by count.
fn merge_user_agents(rows: Vec<UserAgentCountRow>) -> Vec<UserAgentStat> {
    let mut merged: Vec<UserAgentStat> = Vec::with_capacity(rows.len());
    let mut index: HashMap<(String, String, String), usize> = HashMap::new();

    for row in rows {
        let key = (
            or_unknown(row.browser),
            or_unknown(row.os),
            or_unknown(row.device),
        );
        let count = row.count.max(0) as u64;
        match index.get(&key) {
            Some(&i) => merged[i].count += count,
            None => {
                index.insert(key.clone(), merged.len());
                merged.push(UserAgentStat {
                    browser: key.0,
                    os: key.1,
                    device: key.2,
                    count,
                });
            }
        }
    }

    merged.sort_by(|a, b| b.count.cmp(&a.count));
    merged
}

fn merge_field_rows(rows: Vec<FieldCountRow>) -> Vec<FieldStat> {
    let mut merged: Vec<FieldStat> = Vec::with_capacity(rows.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let value = or_unknown(row.value);
        let count = row.count.max(0) as u64;
        match index.get(&value) {
            Some(&i) => merged[i].count += count,
            None => {
                index.insert(value.clone(), merged.len());
                merged.push(FieldStat { value, count });
            }
        }
    }

    merged.sort_by(|a, b| b.count.cmp(&a.count));
    merged
}
