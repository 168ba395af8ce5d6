//! condition evaluator
//!
//! evaluates structured conditions against a per-request page context
//! snapshot. pure: the same context and conditions always give the same
//! decision, and malformed or missing rule parameters fall back to their
//! neutral "no restriction" default instead of raising.

use std::collections::HashMap;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::period;
use super::types::{
    BlockAttributes, Condition, ConditionEntry, ConditionGroup, ConditionRule, CustomFieldRule,
    GroupOperator, PagePredicate,
};

/// page-type facts about the current request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFlags {
    #[serde(default)]
    pub is_front_page: bool,
    #[serde(default)]
    pub is_single: bool,
    #[serde(default)]
    pub is_page: bool,
    #[serde(default)]
    pub is_singular: bool,
    #[serde(default)]
    pub is_home: bool,
    #[serde(default)]
    pub is_post_type_archive: bool,
    #[serde(default)]
    pub is_category: bool,
    #[serde(default)]
    pub is_tag: bool,
    #[serde(default)]
    pub is_tax: bool,
    #[serde(default)]
    pub is_year: bool,
    #[serde(default)]
    pub is_month: bool,
    #[serde(default)]
    pub is_day: bool,
    #[serde(default)]
    pub is_date: bool,
    #[serde(default)]
    pub is_author: bool,
    #[serde(default)]
    pub is_archive: bool,
    #[serde(default)]
    pub is_search: bool,
    #[serde(default)]
    pub is_404: bool,
}

/// snapshot of the current request, computed fresh per evaluation
///
/// owned by the rendering context; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageContext {
    #[serde(default)]
    pub page: PageFlags,
    #[serde(default)]
    pub post_type: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub user_roles: Vec<String>,
    #[serde(default)]
    pub logged_in: bool,
    /// author id of the current content entity (0 = unknown)
    #[serde(default)]
    pub author_id: u64,
    #[serde(default)]
    pub custom_fields: HashMap<String, String>,
    /// taxonomy name -> terms attached to the current entity
    #[serde(default)]
    pub taxonomies: HashMap<String, Vec<String>>,
    #[serde(default = "default_now")]
    pub now: NaiveDateTime,
    #[serde(default)]
    pub published_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub is_mobile: bool,
}

fn default_now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl Default for PageContext {
    fn default() -> Self {
        Self {
            page: PageFlags::default(),
            post_type: None,
            locale: None,
            user_roles: Vec::new(),
            logged_in: false,
            author_id: 0,
            custom_fields: HashMap::new(),
            taxonomies: HashMap::new(),
            now: default_now(),
            published_at: None,
            is_mobile: false,
        }
    }
}

impl PageContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// set the page-type flags
    pub fn with_page(mut self, page: PageFlags) -> Self {
        self.page = page;
        self
    }

    /// set the current post type
    pub fn with_post_type(mut self, post_type: impl Into<String>) -> Self {
        self.post_type = Some(post_type.into());
        self
    }

    /// set the current locale
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// set the current user's roles (implies an authenticated user)
    pub fn with_roles(mut self, roles: Vec<String>) -> Self {
        self.logged_in = self.logged_in || !roles.is_empty();
        self.user_roles = roles;
        self
    }

    /// set the current content's author id
    pub fn with_author(mut self, author_id: u64) -> Self {
        self.author_id = author_id;
        self
    }

    /// add one custom field value
    pub fn with_custom_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom_fields.insert(name.into(), value.into());
        self
    }

    /// add the terms of one taxonomy
    pub fn with_taxonomy(mut self, taxonomy: impl Into<String>, terms: Vec<String>) -> Self {
        self.taxonomies.insert(taxonomy.into(), terms);
        self
    }

    /// pin the evaluation clock
    pub fn with_now(mut self, now: NaiveDateTime) -> Self {
        self.now = now;
        self
    }

    /// set the publish time of the current content
    pub fn with_published_at(mut self, published_at: NaiveDateTime) -> Self {
        self.published_at = Some(published_at);
        self
    }
}

/// evaluate a condition group against the given context
pub fn evaluate(group: &ConditionGroup, ctx: &PageContext) -> bool {
    match group.operator {
        // empty AND = true (vacuous truth)
        GroupOperator::And => group.conditions.iter().all(|c| evaluate_condition(c, ctx)),
        // empty OR = false
        GroupOperator::Or => group.conditions.iter().any(|c| evaluate_condition(c, ctx)),
    }
}

/// evaluate a single condition against the given context
pub fn evaluate_condition(condition: &Condition, ctx: &PageContext) -> bool {
    evaluate_rule(&condition.rule, ctx)
}

/// final show/hide decision for a block's attributes
///
/// top-level entries are AND-combined; no conditions means always shown.
/// the exclusion flag inverts the combined result.
pub fn is_visible(attrs: &BlockAttributes, ctx: &PageContext) -> bool {
    let shown = attrs.conditions.iter().all(|e| entry_matches(e, ctx));
    shown ^ attrs.exclusion
}

fn entry_matches(entry: &ConditionEntry, ctx: &PageContext) -> bool {
    match entry {
        ConditionEntry::Single(c) => evaluate_condition(c, ctx),
        ConditionEntry::Group(g) => evaluate(g, ctx),
    }
}

fn evaluate_rule(rule: &ConditionRule, ctx: &PageContext) -> bool {
    match rule {
        ConditionRule::PageType { page_type } => evaluate_page_type(page_type.as_deref(), ctx),
        ConditionRule::PostType { post_type } => {
            match_or_unrestricted(post_type.as_deref(), ctx.post_type.as_deref())
        }
        ConditionRule::Taxonomy { taxonomy, terms } => {
            evaluate_taxonomy(taxonomy.as_deref(), terms, ctx)
        }
        ConditionRule::Language { language } => {
            match_or_unrestricted(language.as_deref(), ctx.locale.as_deref())
        }
        ConditionRule::UserRole { roles } => {
            // empty role set = no restriction
            roles.is_empty() || roles.iter().any(|r| ctx.user_roles.contains(r))
        }
        ConditionRule::PostAuthor { author } => *author == 0 || ctx.author_id == *author,
        ConditionRule::CustomField { name, rule, value } => {
            evaluate_custom_field(name.as_deref(), rule.as_deref(), value.as_deref(), ctx)
        }
        ConditionRule::Period {
            setting,
            method,
            value,
            refer_custom_field,
        } => period::in_window(
            setting.as_deref(),
            method.as_deref(),
            value.as_deref(),
            refer_custom_field.as_deref(),
            ctx.now,
            ctx.published_at,
            &ctx.custom_fields,
        ),
        ConditionRule::LoginUser { only_login_user } => !only_login_user || ctx.logged_in,
        ConditionRule::MobileDevice { only_mobile_device } => {
            !only_mobile_device || ctx.is_mobile
        }
    }
}

/// equality test where an unset or "none" expectation is no restriction
fn match_or_unrestricted(expected: Option<&str>, actual: Option<&str>) -> bool {
    match expected {
        None | Some("") | Some("none") => true,
        Some(e) => actual == Some(e),
    }
}

fn evaluate_page_type(value: Option<&str>, ctx: &PageContext) -> bool {
    let name = match value {
        None | Some("") | Some("none") => return true,
        Some(v) => v,
    };

    match PagePredicate::parse(name) {
        Some(p) => page_predicate_matches(p, &ctx.page),
        None => {
            eprintln!("warning: unknown page type predicate: {}", name);
            false
        }
    }
}

fn page_predicate_matches(predicate: PagePredicate, page: &PageFlags) -> bool {
    match predicate {
        PagePredicate::FrontPage => page.is_front_page,
        PagePredicate::Single => page.is_single,
        PagePredicate::Page => page.is_page,
        PagePredicate::Singular => page.is_singular,
        // the posts index only counts when it is not also the front page
        PagePredicate::Home => page.is_home && !page.is_front_page,
        // date archives are post type archives too; keep them apart
        PagePredicate::PostTypeArchive => page.is_post_type_archive && !page.is_date,
        PagePredicate::Category => page.is_category,
        PagePredicate::Tag => page.is_tag,
        PagePredicate::Tax => page.is_tax,
        PagePredicate::Year => page.is_year,
        PagePredicate::Month => page.is_month,
        PagePredicate::Day => page.is_day,
        PagePredicate::Date => page.is_date,
        PagePredicate::Author => page.is_author,
        PagePredicate::Archive => page.is_archive,
        PagePredicate::Search => page.is_search,
        PagePredicate::NotFound => page.is_404,
    }
}

fn evaluate_taxonomy(taxonomy: Option<&str>, terms: &[String], ctx: &PageContext) -> bool {
    let taxonomy = match taxonomy {
        None | Some("") | Some("none") => return true,
        Some(t) => t,
    };
    if terms.is_empty() {
        return true;
    }

    ctx.taxonomies
        .get(taxonomy)
        .map(|attached| terms.iter().any(|t| attached.contains(t)))
        .unwrap_or(false)
}

fn evaluate_custom_field(
    name: Option<&str>,
    rule: Option<&str>,
    expected: Option<&str>,
    ctx: &PageContext,
) -> bool {
    let name = match name {
        None | Some("") => return true,
        Some(n) => n,
    };

    let rule = rule
        .and_then(CustomFieldRule::parse)
        .unwrap_or(CustomFieldRule::ValueExists);

    let actual = ctx.custom_fields.get(name).map(String::as_str);

    match rule {
        CustomFieldRule::ValueExists => actual.map(|v| !v.is_empty()).unwrap_or(false),
        CustomFieldRule::ValueEquals => match expected {
            Some(e) => actual == Some(e),
            None => false,
        },
    }
}
