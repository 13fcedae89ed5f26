//! Category registry and the keyword-based guesser.

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    Category, CategoryRule, EngineError, ResultEngine, categories, category_rules,
    util::{normalize_display, normalize_key, normalize_match_text},
};

use super::Engine;

/// Built-in keyword dictionary used when no stored rule matches.
///
/// Mirrors the default category set of a Japanese household ledger; keywords
/// are matched as substrings of the NFKC-folded item + memo text.
const FALLBACK_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "食費",
        &[
            "昼ご飯",
            "夕飯",
            "弁当",
            "外食",
            "レストラン",
            "マクド",
            "ローソン",
            "セブン",
            "スーパー",
        ],
    ),
    ("住宅", &["家賃", "ローン", "管理費"]),
    (
        "水道光熱",
        &["電気代", "ガス代", "水道代", "電気", "ガス", "水道"],
    ),
    (
        "通信",
        &["スマホ", "携帯", "通信", "wifi", "インターネット"],
    ),
    (
        "交通",
        &[
            "バス",
            "電車",
            "地下鉄",
            "切符",
            "高速",
            "ガソリン",
            "駐車場",
            "レンタカー",
            "タクシー",
        ],
    ),
    (
        "日用品",
        &["ドラッグ", "洗剤", "ティッシュ", "トイレットペーパー"],
    ),
    ("交際費", &["飲み会", "プレゼント", "会食"]),
    ("医療", &["病院", "薬", "処方", "診察"]),
    ("教育・教養", &["本", "書籍", "kindle", "受講", "授業料"]),
];

impl Engine {
    pub async fn list_categories(&self, include_archived: bool) -> ResultEngine<Vec<Category>> {
        let mut query = categories::Entity::find().order_by_asc(categories::Column::Name);
        if !include_archived {
            query = query.filter(categories::Column::Archived.eq(false));
        }
        let models = query.all(&self.database).await?;
        Ok(models.into_iter().map(Category::from).collect())
    }

    pub async fn category(&self, category_id: Uuid) -> ResultEngine<Category> {
        let model = categories::Entity::find_by_id(category_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;
        Ok(model.into())
    }

    pub async fn create_category(&self, name: &str) -> ResultEngine<Category> {
        let display = normalize_display(name)
            .ok_or_else(|| EngineError::InvalidName("category name must not be empty".to_string()))?;
        let norm = normalize_key(&display)
            .ok_or_else(|| EngineError::InvalidName("category name must not be empty".to_string()))?;

        let existing = categories::Entity::find()
            .filter(categories::Column::NameNorm.eq(norm.clone()))
            .one(&self.database)
            .await?;
        if existing.is_some() {
            return Err(EngineError::ExistingKey(display));
        }

        let id = Uuid::new_v4();
        let active = categories::ActiveModel {
            id: ActiveValue::Set(id),
            name: ActiveValue::Set(display.clone()),
            name_norm: ActiveValue::Set(norm),
            archived: ActiveValue::Set(false),
        };
        let model = active.insert(&self.database).await?;
        Ok(model.into())
    }

    pub async fn update_category(
        &self,
        category_id: Uuid,
        name: Option<&str>,
        archived: Option<bool>,
    ) -> ResultEngine<Category> {
        let model = categories::Entity::find_by_id(category_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))?;

        let mut active: categories::ActiveModel = model.into();
        if let Some(name) = name {
            let display = normalize_display(name).ok_or_else(|| {
                EngineError::InvalidName("category name must not be empty".to_string())
            })?;
            let norm = normalize_key(&display).ok_or_else(|| {
                EngineError::InvalidName("category name must not be empty".to_string())
            })?;
            let clash = categories::Entity::find()
                .filter(categories::Column::NameNorm.eq(norm.clone()))
                .filter(categories::Column::Id.ne(category_id))
                .one(&self.database)
                .await?;
            if clash.is_some() {
                return Err(EngineError::ExistingKey(display));
            }
            active.name = ActiveValue::Set(display);
            active.name_norm = ActiveValue::Set(norm);
        }
        if let Some(archived) = archived {
            active.archived = ActiveValue::Set(archived);
        }

        let model = active.update(&self.database).await?;
        Ok(model.into())
    }

    pub async fn list_category_rules(&self, category_id: Uuid) -> ResultEngine<Vec<CategoryRule>> {
        self.category(category_id).await?;
        let models = category_rules::Entity::find()
            .filter(category_rules::Column::CategoryId.eq(category_id))
            .order_by_asc(category_rules::Column::Keyword)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(CategoryRule::from).collect())
    }

    pub async fn create_category_rule(
        &self,
        category_id: Uuid,
        keyword: &str,
    ) -> ResultEngine<CategoryRule> {
        self.category(category_id).await?;
        let display = normalize_display(keyword)
            .ok_or_else(|| EngineError::InvalidName("keyword must not be empty".to_string()))?;
        let norm = normalize_match_text(&display);

        let existing = category_rules::Entity::find()
            .filter(category_rules::Column::KeywordNorm.eq(norm.clone()))
            .one(&self.database)
            .await?;
        if existing.is_some() {
            return Err(EngineError::ExistingKey(display));
        }

        let active = category_rules::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4()),
            category_id: ActiveValue::Set(category_id),
            keyword: ActiveValue::Set(display),
            keyword_norm: ActiveValue::Set(norm),
        };
        let model = active.insert(&self.database).await?;
        Ok(model.into())
    }

    pub async fn delete_category_rule(&self, category_id: Uuid, rule_id: Uuid) -> ResultEngine<()> {
        let result = category_rules::Entity::delete_many()
            .filter(category_rules::Column::Id.eq(rule_id))
            .filter(category_rules::Column::CategoryId.eq(category_id))
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("rule not exists".to_string()));
        }
        Ok(())
    }

    /// Guess a category for an expense.
    ///
    /// Priority: an explicit user choice wins; then stored rules (longest
    /// keyword first, so "電気代" beats "電気"); then the built-in
    /// dictionary. Returns `None` when nothing matches.
    pub async fn guess_category(
        &self,
        item: &str,
        memo: &str,
        user_choice: Option<Uuid>,
    ) -> ResultEngine<Option<Category>> {
        if let Some(id) = user_choice
            && let Some(model) = categories::Entity::find_by_id(id).one(&self.database).await?
        {
            return Ok(Some(model.into()));
        }

        let text = normalize_match_text(&format!("{item} {memo}"));
        if text.trim().is_empty() {
            return Ok(None);
        }

        let mut rules = category_rules::Entity::find()
            .find_also_related(categories::Entity)
            .all(&self.database)
            .await?;
        rules.sort_by(|(a, _), (b, _)| {
            b.keyword
                .chars()
                .count()
                .cmp(&a.keyword.chars().count())
                .then_with(|| a.keyword.cmp(&b.keyword))
        });
        for (rule, category) in rules {
            if let Some(category) = category
                && !category.archived
                && text.contains(&rule.keyword_norm)
            {
                return Ok(Some(category.into()));
            }
        }

        for (category_name, keywords) in FALLBACK_KEYWORDS {
            for keyword in *keywords {
                if text.contains(&normalize_match_text(keyword)) {
                    let found = categories::Entity::find()
                        .filter(categories::Column::Name.eq(*category_name))
                        .filter(categories::Column::Archived.eq(false))
                        .one(&self.database)
                        .await?;
                    if let Some(model) = found {
                        return Ok(Some(model.into()));
                    }
                }
            }
        }

        Ok(None)
    }

    /// Create any missing categories from the built-in dictionary.
    /// Returns the number of categories created.
    pub async fn seed_default_categories(&self) -> ResultEngine<u64> {
        let mut created = 0;
        for (name, _) in FALLBACK_KEYWORDS {
            match self.create_category(name).await {
                Ok(_) => created += 1,
                Err(EngineError::ExistingKey(_)) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(created)
    }
}
