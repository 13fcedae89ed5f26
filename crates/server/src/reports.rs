//! Dashboard and analytics API endpoints.

use api_types::report::{
    AnalyticsResponse, BudgetProgressView, CategoryTotalView, ComparisonView, DashboardResponse,
    DayCellView, MonthQuery, MonthSpendView, MonthTotalView,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
};

use crate::{ServerError, expenses, parse_month_param, server::ServerState, user};

fn category_total(total: engine::CategoryTotal) -> CategoryTotalView {
    CategoryTotalView {
        name: total.name,
        total: total.total,
    }
}

pub async fn dashboard(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<DashboardResponse>, ServerError> {
    let month = parse_month_param(query.month.as_deref());
    let dashboard = state.engine.dashboard(month).await?;

    Ok(Json(DashboardResponse {
        month: dashboard.month,
        prev_month: dashboard.prev_month,
        next_month: dashboard.next_month,
        expense_total: dashboard.expense_total,
        income_total: dashboard.income_total,
        net_total: dashboard.net_total,
        overall_budget: dashboard.overall_budget,
        by_category: dashboard
            .by_category
            .into_iter()
            .map(category_total)
            .collect(),
        last_six_months: dashboard
            .last_six_months
            .into_iter()
            .map(|m| MonthTotalView {
                month: m.month,
                expense_total: m.expense_total,
                income_total: m.income_total,
            })
            .collect(),
        budget_progress: dashboard
            .budget_progress
            .into_iter()
            .map(|row| BudgetProgressView {
                name: row.name,
                is_overall: row.is_overall,
                spent: row.spent,
                budget: row.budget,
                remain: row.remain,
            })
            .collect(),
        recent_expenses: dashboard
            .recent_expenses
            .into_iter()
            .map(expenses::view)
            .collect(),
        calendar: dashboard
            .calendar
            .into_iter()
            .map(|week| {
                week.into_iter()
                    .map(|cell| {
                        cell.map(|day| DayCellView {
                            date: day.date,
                            expense_total: day.expense_total,
                            income_total: day.income_total,
                        })
                    })
                    .collect()
            })
            .collect(),
    }))
}

pub async fn analytics(
    _: Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<AnalyticsResponse>, ServerError> {
    let month = parse_month_param(query.month.as_deref());
    let analytics = state.engine.analytics(month).await?;

    Ok(Json(AnalyticsResponse {
        month: analytics.month,
        total: analytics.total,
        by_category: analytics
            .by_category
            .into_iter()
            .map(category_total)
            .collect(),
        last_six_months: analytics
            .last_six_months
            .into_iter()
            .map(|m| MonthSpendView {
                month: m.month,
                total: m.total,
            })
            .collect(),
        mom: ComparisonView {
            total: analytics.mom.total,
            pct: analytics.mom.pct,
        },
        yoy: ComparisonView {
            total: analytics.yoy.total,
            pct: analytics.yoy.pct,
        },
        suggestions: analytics.suggestions,
    }))
}
