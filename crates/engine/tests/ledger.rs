use chrono::NaiveDate;
use sea_orm::Database;
use uuid::Uuid;

use engine::{
    Engine, EngineError, ExpenseFilter, ExpenseSort, LineEdit, NewBudget, NewExpense, NewIncome,
    PageRequest, StagedLine,
};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();

    let media_dir = std::env::temp_dir().join(format!("kakeibo_test_{}", Uuid::new_v4()));
    Engine::builder()
        .database(db)
        .media_dir(media_dir)
        .build()
        .await
        .unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_expense(day: NaiveDate, item: &str, amount: i64) -> NewExpense {
    NewExpense {
        date: day,
        item: item.to_string(),
        amount,
        category_id: None,
        memo: None,
    }
}

#[tokio::test]
async fn create_expense_guesses_a_seeded_category() {
    let engine = engine_with_db().await;
    engine.seed_default_categories().await.unwrap();

    let expense = engine
        .create_expense(new_expense(date(2025, 6, 10), "ローソンで昼ご飯", 650))
        .await
        .unwrap();

    assert_eq!(expense.category_name.as_deref(), Some("食費"));
    assert_eq!(expense.amount, 650);
}

#[tokio::test]
async fn create_expense_rejects_non_positive_amounts() {
    let engine = engine_with_db().await;

    let err = engine
        .create_expense(new_expense(date(2025, 6, 10), "コーヒー", 0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .create_expense(new_expense(date(2025, 6, 10), "   ", 100))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidName(_)));
}

#[tokio::test]
async fn list_defaults_to_the_requested_month() {
    let engine = engine_with_db().await;
    engine
        .create_expense(new_expense(date(2025, 6, 1), "六月の買い物", 1000))
        .await
        .unwrap();
    engine
        .create_expense(new_expense(date(2025, 7, 1), "七月の買い物", 2000))
        .await
        .unwrap();

    let filter = ExpenseFilter {
        month: Some(date(2025, 6, 15)),
        ..Default::default()
    };
    let page = engine
        .list_expenses(&filter, ExpenseSort::default(), PageRequest::default())
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.expenses[0].item, "六月の買い物");
}

#[tokio::test]
async fn view_all_lifts_the_month_window() {
    let engine = engine_with_db().await;
    engine
        .create_expense(new_expense(date(2025, 6, 1), "六月の買い物", 1000))
        .await
        .unwrap();
    engine
        .create_expense(new_expense(date(2025, 7, 1), "七月の買い物", 2000))
        .await
        .unwrap();

    // Even with a month on the filter, view=all means the whole history.
    let filter = ExpenseFilter {
        month: Some(date(2025, 6, 15)),
        ..Default::default()
    };
    let page = engine
        .list_expenses(
            &filter,
            ExpenseSort::default(),
            PageRequest {
                page: 1,
                per_page: None,
                all: true,
            },
        )
        .await
        .unwrap();

    assert_eq!(page.total, 2);
}

#[tokio::test]
async fn list_search_matches_item_only() {
    let engine = engine_with_db().await;
    engine
        .create_expense(new_expense(date(2025, 6, 5), "スーパーで牛乳", 238))
        .await
        .unwrap();
    engine
        .create_expense(NewExpense {
            memo: Some("会社の飲み会".to_string()),
            ..new_expense(date(2025, 6, 6), "割り勘", 3000)
        })
        .await
        .unwrap();

    let filter = ExpenseFilter {
        month: Some(date(2025, 6, 1)),
        q: Some("牛乳".to_string()),
        ..Default::default()
    };
    let page = engine
        .list_expenses(&filter, ExpenseSort::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.expenses[0].item, "スーパーで牛乳");

    // Memo text alone is not searched.
    let filter = ExpenseFilter {
        q: Some("飲み会".to_string()),
        ..filter
    };
    let page = engine
        .list_expenses(&filter, ExpenseSort::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn list_paginates_and_sorts_by_amount() {
    let engine = engine_with_db().await;
    for (item, amount) in [("a", 100), ("b", 300), ("c", 200)] {
        engine
            .create_expense(new_expense(date(2025, 6, 1), item, amount))
            .await
            .unwrap();
    }

    let filter = ExpenseFilter {
        month: Some(date(2025, 6, 1)),
        ..Default::default()
    };
    let page = engine
        .list_expenses(
            &filter,
            ExpenseSort::AmountDesc,
            PageRequest {
                page: 1,
                per_page: Some(2),
                all: false,
            },
        )
        .await
        .unwrap();

    assert_eq!(page.total, 3);
    assert_eq!(page.expenses.len(), 2);
    assert_eq!(page.expenses[0].amount, 300);
    assert_eq!(page.expenses[1].amount, 200);
}

#[tokio::test]
async fn bulk_delete_skips_unknown_ids() {
    let engine = engine_with_db().await;
    let kept = engine
        .create_expense(new_expense(date(2025, 6, 1), "残すもの", 100))
        .await
        .unwrap();
    let doomed = engine
        .create_expense(new_expense(date(2025, 6, 2), "消すもの", 200))
        .await
        .unwrap();

    let removed = engine
        .delete_expenses(&[doomed.id, Uuid::new_v4()])
        .await
        .unwrap();
    assert_eq!(removed, 1);
    assert!(engine.expense(kept.id).await.is_ok());
    assert_eq!(
        engine.expense(doomed.id).await.unwrap_err(),
        EngineError::KeyNotFound("expense not exists".to_string())
    );
}

#[tokio::test]
async fn update_expense_rewrites_the_whole_record() {
    let engine = engine_with_db().await;
    let expense = engine
        .create_expense(NewExpense {
            memo: Some("before".to_string()),
            ..new_expense(date(2025, 6, 1), "昼食", 500)
        })
        .await
        .unwrap();

    let updated = engine
        .update_expense(
            expense.id,
            engine::ExpenseUpdate {
                date: date(2025, 6, 2),
                item: "夕食".to_string(),
                amount: 800,
                category_id: None,
                memo: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.date, date(2025, 6, 2));
    assert_eq!(updated.item, "夕食");
    assert_eq!(updated.amount, 800);
    assert_eq!(updated.memo, None);
}

#[tokio::test]
async fn monthly_summary_groups_by_month() {
    let engine = engine_with_db().await;
    engine
        .create_expense(new_expense(date(2025, 5, 10), "五月その一", 1000))
        .await
        .unwrap();
    engine
        .create_expense(new_expense(date(2025, 5, 20), "五月その二", 500))
        .await
        .unwrap();
    engine
        .create_expense(new_expense(date(2025, 6, 1), "六月", 700))
        .await
        .unwrap();

    let summary = engine
        .monthly_summary(&ExpenseFilter::default(), PageRequest::default())
        .await
        .unwrap();

    assert_eq!(summary.month_count, 2);
    assert_eq!(summary.grand_total, 2200);
    assert_eq!(summary.rows[0].month, "2025-06");
    assert_eq!(summary.rows[0].total, 700);
    assert_eq!(summary.rows[1].month, "2025-05");
    assert_eq!(summary.rows[1].total, 1500);
    assert_eq!(summary.rows[1].count, 2);
}

#[tokio::test]
async fn incomes_have_their_own_monthly_listing() {
    let engine = engine_with_db().await;
    engine
        .create_income(NewIncome {
            date: date(2025, 6, 25),
            source: "給料".to_string(),
            amount: 280_000,
            note: None,
        })
        .await
        .unwrap();
    engine
        .create_income(NewIncome {
            date: date(2025, 7, 25),
            source: "給料".to_string(),
            amount: 280_000,
            note: None,
        })
        .await
        .unwrap();

    let page = engine.list_incomes(date(2025, 6, 1), 1, None).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.incomes[0].amount, 280_000);
}

#[tokio::test]
async fn duplicate_budget_for_month_and_category_is_rejected() {
    let engine = engine_with_db().await;
    engine.seed_default_categories().await.unwrap();
    let categories = engine.list_categories(false).await.unwrap();
    let food = categories.iter().find(|c| c.name == "食費").unwrap();

    engine
        .create_budget(NewBudget {
            month: date(2025, 6, 15),
            category_id: Some(food.id),
            amount: 30_000,
        })
        .await
        .unwrap();

    // Any day of the same month collides.
    let err = engine
        .create_budget(NewBudget {
            month: date(2025, 6, 1),
            category_id: Some(food.id),
            amount: 40_000,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn overall_budget_is_unique_per_month_and_excludes_self_on_update() {
    let engine = engine_with_db().await;

    let overall = engine
        .create_budget(NewBudget {
            month: date(2025, 6, 1),
            category_id: None,
            amount: 100_000,
        })
        .await
        .unwrap();

    let err = engine
        .create_budget(NewBudget {
            month: date(2025, 6, 30),
            category_id: None,
            amount: 90_000,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    // Re-saving the same row is not a duplicate of itself.
    let updated = engine
        .update_budget(
            overall.id,
            NewBudget {
                month: date(2025, 6, 1),
                category_id: None,
                amount: 120_000,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.amount, 120_000);
    assert_eq!(
        engine.overall_budget(date(2025, 6, 20)).await.unwrap(),
        Some(120_000)
    );
}

#[tokio::test]
async fn category_names_are_unique_after_normalization() {
    let engine = engine_with_db().await;
    engine.create_category("Café").await.unwrap();

    // Accents fold away, so this is the same key.
    let err = engine.create_category("cafe").await.unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));
}

#[tokio::test]
async fn stored_rules_beat_the_builtin_dictionary() {
    let engine = engine_with_db().await;
    engine.seed_default_categories().await.unwrap();
    let hobby = engine.create_category("趣味").await.unwrap();
    engine
        .create_category_rule(hobby.id, "スーパー銭湯")
        .await
        .unwrap();

    // "スーパー" alone would hit the food fallback; the longer stored
    // keyword wins.
    let guessed = engine
        .guess_category("スーパー銭湯に行った", "", None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(guessed.name, "趣味");

    let food = engine
        .guess_category("スーパーで買い物", "", None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(food.name, "食費");
}

#[tokio::test]
async fn explicit_category_choice_wins_over_rules() {
    let engine = engine_with_db().await;
    engine.seed_default_categories().await.unwrap();
    let hobby = engine.create_category("趣味").await.unwrap();

    let guessed = engine
        .guess_category("ローソンで昼ご飯", "", Some(hobby.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(guessed.id, hobby.id);
}

#[tokio::test]
async fn staging_drops_noise_lines() {
    let engine = engine_with_db().await;

    let receipt = engine
        .stage_receipt(
            date(2025, 6, 10),
            736,
            None,
            vec![
                StagedLine {
                    item: "牛乳".to_string(),
                    amount: 238,
                    raw_text: Some("牛乳 238".to_string()),
                },
                StagedLine {
                    item: "小計".to_string(),
                    amount: 736,
                    raw_text: None,
                },
                StagedLine {
                    item: "お弁当".to_string(),
                    amount: 498,
                    raw_text: None,
                },
                StagedLine {
                    item: "0312345678".to_string(),
                    amount: 0,
                    raw_text: None,
                },
            ],
        )
        .await
        .unwrap();

    let items: Vec<&str> = receipt.lines.iter().map(|l| l.item.as_str()).collect();
    assert_eq!(items, vec!["牛乳", "お弁当"]);
    assert_eq!(receipt.lines_total(), 736);
}

#[tokio::test]
async fn commit_requires_total_to_match_the_lines() {
    let engine = engine_with_db().await;

    let receipt = engine
        .stage_receipt(
            date(2025, 6, 10),
            1000,
            None,
            vec![StagedLine {
                item: "牛乳".to_string(),
                amount: 238,
                raw_text: None,
            }],
        )
        .await
        .unwrap();

    let err = engine.commit_receipt(receipt.id).await.unwrap_err();
    assert!(matches!(err, EngineError::ReceiptMismatch(_)));

    // Fix the lines on review, then commit goes through.
    engine
        .replace_receipt_lines(
            receipt.id,
            None,
            vec![
                LineEdit {
                    item: "牛乳".to_string(),
                    amount: "238".to_string(),
                    category_id: None,
                },
                LineEdit {
                    item: "お弁当".to_string(),
                    amount: "¥762".to_string(),
                    category_id: None,
                },
            ],
        )
        .await
        .unwrap();

    let created = engine.commit_receipt(receipt.id).await.unwrap();
    assert_eq!(created, 2);

    let page = engine
        .list_expenses(
            &ExpenseFilter {
                month: Some(date(2025, 6, 1)),
                ..Default::default()
            },
            ExpenseSort::default(),
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert!(page.expenses.iter().all(|e| e.receipt_id == Some(receipt.id)));
    assert!(page.expenses.iter().all(|e| e.date == date(2025, 6, 10)));
}

#[tokio::test]
async fn commit_is_one_shot() {
    let engine = engine_with_db().await;

    let receipt = engine
        .stage_receipt(
            date(2025, 6, 10),
            238,
            None,
            vec![StagedLine {
                item: "牛乳".to_string(),
                amount: 238,
                raw_text: None,
            }],
        )
        .await
        .unwrap();

    engine.commit_receipt(receipt.id).await.unwrap();
    let err = engine.commit_receipt(receipt.id).await.unwrap_err();
    assert!(matches!(err, EngineError::AlreadyCommitted(_)));

    let err = engine.discard_receipt(receipt.id).await.unwrap_err();
    assert!(matches!(err, EngineError::AlreadyCommitted(_)));
}

#[tokio::test]
async fn discard_removes_the_draft() {
    let engine = engine_with_db().await;

    let receipt = engine
        .stage_receipt(
            date(2025, 6, 10),
            238,
            None,
            vec![StagedLine {
                item: "牛乳".to_string(),
                amount: 238,
                raw_text: None,
            }],
        )
        .await
        .unwrap();

    engine.discard_receipt(receipt.id).await.unwrap();
    assert_eq!(
        engine.receipt(receipt.id).await.unwrap_err(),
        EngineError::KeyNotFound("receipt not exists".to_string())
    );
    assert!(engine.list_receipts(true).await.unwrap().is_empty());
}

#[tokio::test]
async fn staging_rejects_broken_images() {
    let engine = engine_with_db().await;

    let err = engine
        .stage_receipt(date(2025, 6, 10), 238, Some("not base64!!"), vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidImage(_)));
}

#[tokio::test]
async fn dashboard_aggregates_the_month() {
    let engine = engine_with_db().await;
    engine.seed_default_categories().await.unwrap();

    engine
        .create_expense(new_expense(date(2025, 6, 3), "スーパーで買い物", 4000))
        .await
        .unwrap();
    engine
        .create_expense(new_expense(date(2025, 6, 5), "電気代", 6000))
        .await
        .unwrap();
    engine
        .create_income(NewIncome {
            date: date(2025, 6, 25),
            source: "給料".to_string(),
            amount: 280_000,
            note: None,
        })
        .await
        .unwrap();
    engine
        .create_budget(NewBudget {
            month: date(2025, 6, 1),
            category_id: None,
            amount: 100_000,
        })
        .await
        .unwrap();

    let dashboard = engine.dashboard(date(2025, 6, 15)).await.unwrap();

    assert_eq!(dashboard.month, "2025-06");
    assert_eq!(dashboard.prev_month, "2025-05");
    assert_eq!(dashboard.next_month, "2025-07");
    assert_eq!(dashboard.expense_total, 10_000);
    assert_eq!(dashboard.income_total, 280_000);
    assert_eq!(dashboard.net_total, 270_000);
    assert_eq!(dashboard.overall_budget, Some(100_000));
    assert_eq!(dashboard.by_category.len(), 2);
    assert_eq!(dashboard.last_six_months.len(), 6);
    assert!(dashboard.budget_progress[0].is_overall);
    assert_eq!(dashboard.budget_progress[0].remain, Some(90_000));

    // June 2025 starts on a Sunday, so the first week has six pads.
    assert!(dashboard.calendar[0][..6].iter().all(Option::is_none));
    let first = dashboard.calendar[0][6].as_ref().unwrap();
    assert_eq!(first.date, date(2025, 6, 1));
    let day3 = dashboard.calendar[1][1].as_ref().unwrap();
    assert_eq!(day3.date, date(2025, 6, 3));
    assert_eq!(day3.expense_total, 4000);
}

#[tokio::test]
async fn analytics_compares_against_previous_periods() {
    let engine = engine_with_db().await;

    engine
        .create_expense(new_expense(date(2025, 5, 10), "先月の支出", 10_000))
        .await
        .unwrap();
    engine
        .create_expense(new_expense(date(2025, 6, 10), "今月の支出", 13_000))
        .await
        .unwrap();

    let analytics = engine.analytics(date(2025, 6, 1)).await.unwrap();

    assert_eq!(analytics.total, 13_000);
    assert_eq!(analytics.mom.total, 10_000);
    assert!((analytics.mom.pct.unwrap() - 30.0).abs() < 1e-9);
    // No data a year back, so no percentage.
    assert_eq!(analytics.yoy.total, 0);
    assert_eq!(analytics.yoy.pct, None);
    assert!(analytics.suggestions[0].contains("先月比で20%以上増"));
}
