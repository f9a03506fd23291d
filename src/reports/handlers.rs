//! REST API handlers for the reporting endpoints.

use super::helpers::{days_of_month, last_n_days, last_n_months, month_bounds, resolve_year_month};
use super::models::{
    CategoryExpense, DailyExpense, ExpenseDetail, MemberExpense, MonthlyExpense, YearMonthDayQuery,
    YearMonthQuery,
};
use crate::auth::AuthUser;
use crate::db::DbError;
use crate::debts::helpers::{mark_related, sort_debts};
use crate::error::ApiError;
use crate::rooms::helpers::require_membership;
use crate::state::SharedState;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Datelike, NaiveDate};
use serde_json::json;
use std::collections::HashMap;

/// Creates routes for reporting operations.
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/rooms/:room_id/expenses/:year/:month", get(monthly_expenses))
        .route("/rooms/:room_id/dashboard", get(dashboard))
        .route("/rooms/:room_id/calendar/:year/:month", get(calendar))
        .route("/rooms/:room_id/expenses/me", get(my_expenses))
        .route("/rooms/:room_id/expenses/me/day", get(my_expenses_by_day))
        .route(
            "/rooms/:room_id/members/:member_id/expenses",
            get(member_expenses),
        )
}

/// Parse and range-check year/month path segments.
fn parse_year_month(year: &str, month: &str) -> Result<(i32, u32), ApiError> {
    let year: i32 = year
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid year or month format.".to_string()))?;
    let month: u32 = month
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid year or month format.".to_string()))?;

    if !(1..=12).contains(&month) {
        return Err(ApiError::BadRequest(
            "Month must be between 1 and 12.".to_string(),
        ));
    }
    if !(1900..=9999).contains(&year) {
        return Err(ApiError::BadRequest(
            "Year must be between 1900 and 9999.".to_string(),
        ));
    }
    Ok((year, month))
}

/// First and last day of a month that already passed range checks.
fn bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), ApiError> {
    month_bounds(year, month)
        .ok_or_else(|| ApiError::BadRequest("Invalid year or month.".to_string()))
}

/// A member's splits over a range, with receipt item detail attached.
async fn expense_details(
    state: &SharedState,
    member_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<ExpenseDetail>, ApiError> {
    let rows = state
        .db
        .receipts()
        .member_expense_rows(member_id, from, to)
        .await?;

    let mut expenses = Vec::with_capacity(rows.len());
    for (id, amount_cents, item_id, receipt_name, purchase_date) in rows {
        let receipt_item = state
            .db
            .receipts()
            .item_with_splits(&item_id)
            .await?
            .ok_or_else(|| {
                ApiError::Db(DbError::Internal(format!("receipt item {item_id} vanished")))
            })?;
        expenses.push(ExpenseDetail {
            id,
            receipt_item,
            amount_cents,
            receipt_name,
            purchase_date,
        });
    }
    Ok(expenses)
}

/// Endpoint: GET /rooms/:room_id/expenses/:year/:month
async fn monthly_expenses(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path((room_id, year, month)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    require_membership(&state.db, &room_id, &user.id).await?;

    let (year, month) = parse_year_month(&year, &month)?;
    let (from, to) = bounds(year, month)?;

    let expenses: Vec<MemberExpense> = state
        .db
        .receipts()
        .member_totals_for_room(&room_id, from, to)
        .await?
        .into_iter()
        .map(|(member, total_expense_cents)| MemberExpense {
            member,
            total_expense_cents,
        })
        .collect();

    Ok(Json(json!({
        "room_id": room_id,
        "year": year,
        "month": month,
        "expenses": expenses,
    })))
}

/// Endpoint: GET /rooms/:room_id/dashboard?year&month
///
/// The composite view a client renders on its home screen: the acting
/// member's month total, three chart series, the room ranking, and the
/// room's open debts.
async fn dashboard(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<String>,
    Query(query): Query<YearMonthQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (_, member) = require_membership(&state.db, &room_id, &user.id).await?;

    let today = chrono::Utc::now().date_naive();
    let (year, month) = resolve_year_month(query.year.as_deref(), query.month.as_deref(), today)
        .map_err(ApiError::BadRequest)?;
    let (from, to) = bounds(year, month)?;

    let receipts = state.db.receipts();

    let my_total = receipts.member_total_between(&member.id, from, to).await?;

    // Seven-day series, ending today. Days without spending show zero.
    let days = last_n_days(today, 7);
    let daily: HashMap<NaiveDate, i64> = receipts
        .member_daily_totals(&member.id, days[0], today)
        .await?
        .into_iter()
        .collect();
    let seven_day_expenses: Vec<DailyExpense> = days
        .into_iter()
        .map(|date| DailyExpense {
            date,
            total_cents: daily.get(&date).copied().unwrap_or(0),
        })
        .collect();

    // Twelve calendar months ending this month, newest first.
    let months = last_n_months(today, 12);
    let (series_from, _) = bounds(months[0].0, months[0].1)?;
    let (_, series_to) = bounds(months[11].0, months[11].1)?;
    let monthly: HashMap<String, i64> = receipts
        .member_monthly_totals(&member.id, series_from, series_to)
        .await?
        .into_iter()
        .collect();
    let monthly_expenses: Vec<MonthlyExpense> = months
        .into_iter()
        .rev()
        .map(|(year, month)| MonthlyExpense {
            year,
            month,
            total_cents: monthly
                .get(&format!("{year:04}-{month:02}"))
                .copied()
                .unwrap_or(0),
        })
        .collect();

    let category_expenses: Vec<CategoryExpense> = receipts
        .member_category_totals(&member.id, &room_id, from, to)
        .await?
        .into_iter()
        .map(|(category, total_cents)| CategoryExpense {
            category,
            total_cents,
        })
        .collect();

    // Room ranking, highest spender first.
    let member_totals = receipts.member_totals_for_room(&room_id, from, to).await?;
    let room_total: i64 = member_totals.iter().map(|(_, total)| total).sum();
    let members: Vec<MemberExpense> = member_totals
        .into_iter()
        .map(|(member, total_expense_cents)| MemberExpense {
            member,
            total_expense_cents,
        })
        .collect();

    let mut debts = state.db.debts().debts_for_room(&room_id).await?;
    debts.retain(|debt| debt.amount_cents != 0);
    mark_related(&mut debts, &member.id);
    sort_debts(&mut debts);

    Ok(Json(json!({
        "room_id": room_id,
        "my_member_id": member.id,
        "year": year,
        "month": month,
        "my_total_expense_cents": my_total,
        "charts": {
            "seven_day_expenses": seven_day_expenses,
            "monthly_expenses": monthly_expenses,
            "category_expenses": category_expenses,
        },
        "room_expenses": {
            "total_cents": room_total,
            "members": members,
        },
        "debts": debts,
    })))
}

/// Endpoint: GET /rooms/:room_id/calendar/:year/:month
async fn calendar(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path((room_id, year, month)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let (_, member) = require_membership(&state.db, &room_id, &user.id).await?;

    let (year, month) = parse_year_month(&year, &month)?;
    let (from, to) = bounds(year, month)?;

    let daily: HashMap<NaiveDate, i64> = state
        .db
        .receipts()
        .member_daily_totals(&member.id, from, to)
        .await?
        .into_iter()
        .collect();

    let daily_expenses: Vec<DailyExpense> = days_of_month(year, month)
        .into_iter()
        .map(|date| DailyExpense {
            date,
            total_cents: daily.get(&date).copied().unwrap_or(0),
        })
        .collect();

    Ok(Json(json!({
        "room_id": room_id,
        "year": year,
        "month": month,
        "daily_expenses": daily_expenses,
    })))
}

/// Endpoint: GET /rooms/:room_id/expenses/me?year&month
async fn my_expenses(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<String>,
    Query(query): Query<YearMonthQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (_, member) = require_membership(&state.db, &room_id, &user.id).await?;

    let today = chrono::Utc::now().date_naive();
    let (year, month) = resolve_year_month(query.year.as_deref(), query.month.as_deref(), today)
        .map_err(ApiError::BadRequest)?;
    let (from, to) = bounds(year, month)?;

    let expenses = expense_details(&state, &member.id, from, to).await?;

    Ok(Json(json!({
        "room_id": room_id,
        "year": year,
        "month": month,
        "expenses": expenses,
    })))
}

/// Endpoint: GET /rooms/:room_id/expenses/me/day?year&month&day
async fn my_expenses_by_day(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path(room_id): Path<String>,
    Query(query): Query<YearMonthDayQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (_, member) = require_membership(&state.db, &room_id, &user.id).await?;

    let today = chrono::Utc::now().date_naive();
    let (year, month) = resolve_year_month(query.year.as_deref(), query.month.as_deref(), today)
        .map_err(ApiError::BadRequest)?;

    let day: u32 = match query.day.as_deref() {
        None => today.day(),
        Some(raw) => raw.parse().map_err(|_| {
            ApiError::BadRequest(
                "Invalid date: year, month, and day must form a valid date.".to_string(),
            )
        })?,
    };
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        ApiError::BadRequest(
            "Invalid date: year, month, and day must form a valid date.".to_string(),
        )
    })?;

    let expenses = expense_details(&state, &member.id, date, date).await?;

    Ok(Json(json!({
        "room_id": room_id,
        "year": year,
        "month": month,
        "day": day,
        "expenses": expenses,
    })))
}

/// Endpoint: GET /rooms/:room_id/members/:member_id/expenses?year&month
async fn member_expenses(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Path((room_id, member_id)): Path<(String, String)>,
    Query(query): Query<YearMonthQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require_membership(&state.db, &room_id, &user.id).await?;

    let target = state
        .db
        .rooms()
        .member_of_room(&member_id, &room_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Member not found".to_string()))?;

    let today = chrono::Utc::now().date_naive();
    let (year, month) = resolve_year_month(query.year.as_deref(), query.month.as_deref(), today)
        .map_err(ApiError::BadRequest)?;
    let (from, to) = bounds(year, month)?;

    let expenses = expense_details(&state, &target.id, from, to).await?;

    Ok(Json(json!({
        "room_id": room_id,
        "year": year,
        "month": month,
        "expenses": expenses,
    })))
}
