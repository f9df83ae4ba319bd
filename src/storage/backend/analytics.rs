//! Click store aggregate queries
//!
//! Every query is scoped to one code and an optional half-open time window.

use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Select, sea_query::Expr,
};

use super::SeaOrmStorage;
use crate::errors::{LinkmeterError, Result};

use migration::entities::click;

/// `[start, end)`; an open end means "up to now and beyond".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    pub fn since(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }
}

/// Single-column groupings supported by the by-field breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsField {
    Browser,
    Os,
    Device,
}

impl AnalyticsField {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyticsField::Browser => "browser",
            AnalyticsField::Os => "os",
            AnalyticsField::Device => "device",
        }
    }

    fn column(&self) -> click::Column {
        match self {
            AnalyticsField::Browser => click::Column::Browser,
            AnalyticsField::Os => click::Column::Os,
            AnalyticsField::Device => click::Column::Device,
        }
    }
}

impl std::str::FromStr for AnalyticsField {
    type Err = LinkmeterError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "browser" => Ok(AnalyticsField::Browser),
            "os" => Ok(AnalyticsField::Os),
            "device" => Ok(AnalyticsField::Device),
            other => Err(LinkmeterError::validation(format!(
                "unsupported field: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, FromQueryResult)]
pub struct UserAgentCountRow {
    pub browser: Option<String>,
    pub os: Option<String>,
    pub device: Option<String>,
    pub count: i64,
}

#[derive(Debug, FromQueryResult)]
pub struct FieldCountRow {
    pub value: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct PeriodCounts {
    pub last_7_days: u64,
    pub last_30_days: u64,
    pub all_time: u64,
}

fn scoped(code: &str, window: Option<TimeWindow>) -> Select<click::Entity> {
    let query = click::Entity::find().filter(click::Column::Code.eq(code));
    match window {
        Some(TimeWindow { start, end }) => {
            let query = query.filter(click::Column::CreatedAt.gte(start));
            match end {
                Some(end) => query.filter(click::Column::CreatedAt.lt(end)),
                None => query,
            }
        }
        None => query,
    }
}

impl SeaOrmStorage {
    pub async fn count_clicks(&self, code: &str, window: Option<TimeWindow>) -> Result<u64> {
        Ok(scoped(code, window).count(&self.db).await?)
    }

    /// Distinct non-null IPs. `COUNT(DISTINCT ..)` already skips NULLs.
    pub async fn count_unique_ips(&self, code: &str, window: Option<TimeWindow>) -> Result<u64> {
        let count = scoped(code, window)
            .select_only()
            .column_as(Expr::cust("COUNT(DISTINCT ip)"), "unique_ips")
            .into_tuple::<i64>()
            .one(&self.db)
            .await?;
        Ok(count.unwrap_or(0).max(0) as u64)
    }

    pub async fn user_agent_breakdown(
        &self,
        code: &str,
        window: Option<TimeWindow>,
    ) -> Result<Vec<UserAgentCountRow>> {
        Ok(scoped(code, window)
            .select_only()
            .column(click::Column::Browser)
            .column(click::Column::Os)
            .column(click::Column::Device)
            .column_as(click::Column::Id.count(), "count")
            .group_by(click::Column::Browser)
            .group_by(click::Column::Os)
            .group_by(click::Column::Device)
            .order_by_desc(Expr::cust("count"))
            .into_model::<UserAgentCountRow>()
            .all(&self.db)
            .await?)
    }

    /// All-time counts grouped on one column.
    pub async fn field_breakdown(
        &self,
        code: &str,
        field: AnalyticsField,
    ) -> Result<Vec<FieldCountRow>> {
        let column = field.column();
        Ok(scoped(code, None)
            .select_only()
            .column_as(column, "value")
            .column_as(click::Column::Id.count(), "count")
            .group_by(column)
            .order_by_desc(Expr::cust("count"))
            .into_model::<FieldCountRow>()
            .all(&self.db)
            .await?)
    }

    /// 7-day, 30-day and all-time totals measured back from `now`.
    pub async fn period_counts(&self, code: &str, now: DateTime<Utc>) -> Result<PeriodCounts> {
        let week = TimeWindow::since(now - chrono::Duration::days(7));
        let month = TimeWindow::since(now - chrono::Duration::days(30));

        let (last_7_days, last_30_days, all_time) = tokio::try_join!(
            self.count_clicks(code, Some(week)),
            self.count_clicks(code, Some(month)),
            self.count_clicks(code, None),
        )?;

        Ok(PeriodCounts {
            last_7_days,
            last_30_days,
            all_time,
        })
    }
}
