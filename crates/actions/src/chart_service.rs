//! Sales aggregated into time buckets for the dashboard chart.
//!
//! One templated aggregate query per call. Only the bucket expression is
//! spliced into the SQL text and it comes from [`TimeUnit`], never from
//! input; every value is a bound parameter.

use std::fmt;
use std::str::FromStr;

use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, FromQueryResult, Statement, Value};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::errors::ActionError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    fn as_str(self) -> &'static str {
        match self {
            TimeUnit::Day => "day",
            TimeUnit::Week => "week",
            TimeUnit::Month => "month",
            TimeUnit::Year => "year",
        }
    }

    /// Bucket start as `YYYY-MM-DD`; weeks start on Monday.
    fn bucket_sql(self, backend: DatabaseBackend) -> Result<String, ActionError> {
        match backend {
            DatabaseBackend::Postgres => Ok(format!("to_char(date_trunc('{}', created_at), 'YYYY-MM-DD')", self.as_str())),
            DatabaseBackend::Sqlite => Ok(match self {
                TimeUnit::Day => "strftime('%Y-%m-%d', created_at)".to_string(),
                TimeUnit::Week => "date(created_at, 'weekday 0', '-6 days')".to_string(),
                TimeUnit::Month => "strftime('%Y-%m-01', created_at)".to_string(),
                TimeUnit::Year => "strftime('%Y-01-01', created_at)".to_string(),
            }),
            DatabaseBackend::MySql => Err(ActionError::Db("chart aggregation is not supported on MySQL".into())),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeUnit {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Ok(TimeUnit::Day),
            "week" => Ok(TimeUnit::Week),
            "month" => Ok(TimeUnit::Month),
            "year" => Ok(TimeUnit::Year),
            other => Err(ActionError::Validation(format!("unit must be day, week, month or year, got {other}"))),
        }
    }
}

/// Sum sale amounts, or count sales.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartMode {
    #[default]
    Sum,
    Count,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ChartQuery {
    pub from: DateTimeWithTimeZone,
    pub to: DateTimeWithTimeZone,
    pub unit: TimeUnit,
    #[serde(default)]
    pub service_id: Option<Uuid>,
    #[serde(default)]
    pub mode: ChartMode,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: String,
    pub total: f64,
}

#[derive(Debug, FromQueryResult)]
struct ChartRow {
    bucket: String,
    total: f64,
}

/// `(bucket date, total)` pairs ordered by date; empty when nothing matched.
#[instrument(skip(db, q), fields(unit = %q.unit, mode = ?q.mode))]
pub async fn get_chart_data(db: &DatabaseConnection, q: ChartQuery) -> Result<Vec<ChartPoint>, ActionError> {
    let stmt = chart_statement(db.get_database_backend(), &q)?;
    let rows = ChartRow::find_by_statement(stmt).all(db).await?;
    debug!(buckets = rows.len(), "chart_rows");
    Ok(rows.into_iter().map(|r| ChartPoint { date: r.bucket, total: r.total }).collect())
}

fn chart_statement(backend: DatabaseBackend, q: &ChartQuery) -> Result<Statement, ActionError> {
    if q.from > q.to {
        return Err(ActionError::Validation("from must not be after to".into()));
    }
    let bucket = q.unit.bucket_sql(backend)?;
    let mut values: Vec<Value> = vec![q.from.into(), q.to.into()];

    let sql = match backend {
        DatabaseBackend::Postgres => {
            let total = match q.mode {
                ChartMode::Sum => "COALESCE(SUM(amount), 0)::float8",
                ChartMode::Count => "COUNT(*)::float8",
            };
            let service_cond = match q.service_id {
                Some(id) => {
                    values.push(id.into());
                    " AND service_id = $3"
                }
                None => "",
            };
            format!(
                "SELECT {bucket} AS bucket, {total} AS total \
                 FROM sale \
                 WHERE created_at >= $1 AND created_at <= $2{service_cond} \
                 GROUP BY bucket ORDER BY bucket"
            )
        }
        _ => {
            let total = match q.mode {
                ChartMode::Sum => "CAST(TOTAL(amount) AS REAL)",
                ChartMode::Count => "CAST(COUNT(*) AS REAL)",
            };
            let service_cond = match q.service_id {
                Some(id) => {
                    values.push(id.into());
                    " AND service_id = ?"
                }
                None => "",
            };
            format!(
                "SELECT {bucket} AS bucket, {total} AS total \
                 FROM sale \
                 WHERE julianday(created_at) >= julianday(?) AND julianday(created_at) <= julianday(?){service_cond} \
                 GROUP BY bucket ORDER BY bucket"
            )
        }
    };
    Ok(Statement::from_sql_and_values(backend, sql, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{self, at, get_db};

    fn query(from: u32, to: u32, unit: TimeUnit) -> ChartQuery {
        ChartQuery { from: at(from), to: at(to), unit, service_id: None, mode: ChartMode::Sum }
    }

    fn points(v: &[ChartPoint]) -> Vec<(&str, f64)> {
        v.iter().map(|p| (p.date.as_str(), p.total)).collect()
    }

    #[test]
    fn postgres_statement_uses_date_trunc_and_numbered_params() {
        let q = ChartQuery { service_id: Some(Uuid::new_v4()), ..query(1, 31, TimeUnit::Week) };
        let stmt = chart_statement(DatabaseBackend::Postgres, &q).unwrap();
        assert!(stmt.sql.contains("date_trunc('week', created_at)"));
        assert!(stmt.sql.contains("service_id = $3"));
        assert_eq!(stmt.values.map(|v| v.0.len()), Some(3));
    }

    #[test]
    fn rejects_inverted_range_and_unknown_unit() {
        let err = chart_statement(DatabaseBackend::Sqlite, &query(10, 1, TimeUnit::Day)).unwrap_err();
        assert!(err.is_validation());
        assert!("fortnight".parse::<TimeUnit>().is_err());
        assert_eq!("MONTH".parse::<TimeUnit>().unwrap(), TimeUnit::Month);
    }

    #[tokio::test]
    async fn aggregates_by_day_week_and_month() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let p = test_support::patient(&db, "Ana").await?;
        let massage = test_support::service(&db, "Massage").await?;
        let reiki = test_support::service(&db, "Reiki").await?;
        // 2024-01-01 is a Monday
        test_support::sale_at(&db, p.id, massage.id, 10.0, at(1)).await?;
        test_support::sale_at(&db, p.id, massage.id, 5.0, at(1)).await?;
        test_support::sale_at(&db, p.id, reiki.id, 20.0, at(3)).await?;
        test_support::sale_at(&db, p.id, massage.id, 7.5, at(9)).await?;

        let daily = get_chart_data(&db, query(1, 31, TimeUnit::Day)).await?;
        assert_eq!(points(&daily), vec![("2024-01-01", 15.0), ("2024-01-03", 20.0), ("2024-01-09", 7.5)]);

        let weekly = get_chart_data(&db, query(1, 31, TimeUnit::Week)).await?;
        assert_eq!(points(&weekly), vec![("2024-01-01", 35.0), ("2024-01-08", 7.5)]);

        let monthly_count = get_chart_data(&db, ChartQuery { mode: ChartMode::Count, ..query(1, 31, TimeUnit::Month) }).await?;
        assert_eq!(points(&monthly_count), vec![("2024-01-01", 4.0)]);

        let massage_only = get_chart_data(&db, ChartQuery { service_id: Some(massage.id), ..query(1, 31, TimeUnit::Year) }).await?;
        assert_eq!(points(&massage_only), vec![("2024-01-01", 22.5)]);

        let first_days = get_chart_data(&db, query(1, 3, TimeUnit::Day)).await?;
        assert_eq!(first_days.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn empty_range_returns_no_points() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let p = test_support::patient(&db, "Ana").await?;
        let svc = test_support::service(&db, "Massage").await?;
        test_support::sale_at(&db, p.id, svc.id, 10.0, at(1)).await?;

        assert!(get_chart_data(&db, query(20, 31, TimeUnit::Day)).await?.is_empty());
        Ok(())
    }
}
