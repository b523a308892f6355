use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::MySql;
use sqlx::mysql::MySqlArguments;
use sqlx::query::QueryAs;
use utoipa::IntoParams;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    U64(u64),
    Date(NaiveDate),
}

impl From<u64> for SqlValue {
    fn from(v: u64) -> Self {
        SqlValue::U64(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::String(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::String(v.to_string())
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

/// ===============================
/// Dynamic WHERE clause builder
/// ===============================
#[derive(Debug, Default)]
pub struct SqlFilter {
    conditions: Vec<&'static str>,
    values: Vec<SqlValue>,
}

impl SqlFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `condition` (with a single `?` placeholder) bound to `value`.
    pub fn and(mut self, condition: &'static str, value: impl Into<SqlValue>) -> Self {
        self.conditions.push(condition);
        self.values.push(value.into());
        self
    }

    /// Like [`SqlFilter::and`], skipped when `value` is `None`.
    pub fn and_opt<V: Into<SqlValue>>(self, condition: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.and(condition, v),
            None => self,
        }
    }

    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }
}

pub fn bind_query_as<'q, O>(
    mut query: QueryAs<'q, MySql, O, MySqlArguments>,
    values: &[SqlValue],
) -> QueryAs<'q, MySql, O, MySqlArguments> {
    for value in values {
        query = match value.clone() {
            SqlValue::String(v) => query.bind(v),
            SqlValue::U64(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
        };
    }
    query
}

/// `?employeeId=` filter shared by the per-employee resources.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeFilter {
    /// Only rows of this employee
    pub employee_id: Option<u64>,
}

/// ===============================
/// Pagination
/// ===============================
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    /// Page number, starting at 1
    pub page: Option<u32>,
    /// Items per page (max 100)
    pub limit: Option<u32>,
}

/// Paginated lists answer with a bare array and report the row count here.
pub const TOTAL_COUNT_HEADER: &str = "X-Total-Count";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl PageQuery {
    pub fn resolve(&self) -> Page {
        Page {
            page: self.page.unwrap_or(1).max(1),
            limit: self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }
}

impl Page {
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}
