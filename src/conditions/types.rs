//! core types for the condition system

use serde::{Deserialize, Serialize};

/// how conditions within one group are combined
///
/// a group carries exactly one operator applied uniformly across all of
/// its conditions; there are no nested operators within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupOperator {
    /// all conditions must hold (empty group = true)
    #[default]
    And,
    /// at least one condition must hold (empty group = false)
    Or,
}

/// comparison rules for the customField condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomFieldRule {
    /// the field exists with a non-empty value
    ValueExists,
    /// the field's string value equals the expected value
    ValueEquals,
}

impl CustomFieldRule {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "valueExists" => Some(CustomFieldRule::ValueExists),
            "valueEquals" => Some(CustomFieldRule::ValueEquals),
            _ => None,
        }
    }
}

/// one typed, parameterized test
///
/// serialized adjacently tagged: `{"type": "<name>", "values": {...}}`.
/// the `values` keys keep their legacy-compatible names so migrated and
/// editor-created conditions share one wire shape. rule parameters that
/// admit free-form strings (period settings, custom field rules) stay
/// strings here and are interpreted at evaluation time, so unknown
/// strings survive a decode/encode round-trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values")]
pub enum ConditionRule {
    /// the current page satisfies a named page-type predicate
    #[serde(rename = "pageType")]
    PageType {
        #[serde(rename = "ifPageType", default, skip_serializing_if = "Option::is_none")]
        page_type: Option<String>,
    },
    /// the current post type equals the named value
    #[serde(rename = "postType")]
    PostType {
        #[serde(rename = "ifPostType", default, skip_serializing_if = "Option::is_none")]
        post_type: Option<String>,
    },
    /// the current entity carries one of the named terms
    #[serde(rename = "taxonomy")]
    Taxonomy {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        taxonomy: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        terms: Vec<String>,
    },
    /// the current locale equals the named value
    #[serde(rename = "language")]
    Language {
        #[serde(rename = "ifLanguage", default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
    /// the current user holds at least one of the named roles
    #[serde(rename = "userRole")]
    UserRole {
        #[serde(rename = "userRole", default, skip_serializing_if = "Vec::is_empty")]
        roles: Vec<String>,
    },
    /// the current content's author id equals the named value (0 = any)
    #[serde(rename = "postAuthor")]
    PostAuthor {
        #[serde(rename = "postAuthor", default)]
        author: u64,
    },
    /// a named custom field exists or equals an expected value
    #[serde(rename = "customField")]
    CustomField {
        #[serde(rename = "customFieldName", default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(rename = "customFieldRule", default, skip_serializing_if = "Option::is_none")]
        rule: Option<String>,
        #[serde(rename = "customFieldValue", default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    /// the current time falls inside a configured window
    #[serde(rename = "period")]
    Period {
        #[serde(
            rename = "periodDisplaySetting",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        setting: Option<String>,
        #[serde(
            rename = "periodSpecificationMethod",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        method: Option<String>,
        #[serde(
            rename = "periodDisplayValue",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        value: Option<String>,
        #[serde(
            rename = "periodReferCustomField",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        refer_custom_field: Option<String>,
    },
    /// a user must be authenticated (flag unset = no restriction)
    #[serde(rename = "loginUser")]
    LoginUser {
        #[serde(rename = "showOnlyLoginUser", default)]
        only_login_user: bool,
    },
    /// the device must be classified mobile (flag unset = no restriction)
    #[serde(rename = "mobileDevice")]
    MobileDevice {
        #[serde(rename = "showOnlyMobileDevice", default)]
        only_mobile_device: bool,
    },
}

impl ConditionRule {
    /// the wire-format type tag for this rule
    pub fn type_name(&self) -> &'static str {
        match self {
            ConditionRule::PageType { .. } => "pageType",
            ConditionRule::PostType { .. } => "postType",
            ConditionRule::Taxonomy { .. } => "taxonomy",
            ConditionRule::Language { .. } => "language",
            ConditionRule::UserRole { .. } => "userRole",
            ConditionRule::PostAuthor { .. } => "postAuthor",
            ConditionRule::CustomField { .. } => "customField",
            ConditionRule::Period { .. } => "period",
            ConditionRule::LoginUser { .. } => "loginUser",
            ConditionRule::MobileDevice { .. } => "mobileDevice",
        }
    }
}

/// a single condition: a generated id plus the typed rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub id: String,
    #[serde(flatten)]
    pub rule: ConditionRule,
}

impl Condition {
    /// create a condition with an explicit id
    pub fn with_id(id: impl Into<String>, rule: ConditionRule) -> Self {
        Self {
            id: id.into(),
            rule,
        }
    }

    /// create a condition with a freshly generated id
    #[allow(dead_code)]
    pub fn generated(prefix: &str, rule: ConditionRule) -> Self {
        Self {
            id: generate_id(prefix),
            rule,
        }
    }
}

/// conditions combined with a single operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionGroup {
    #[serde(default)]
    pub operator: GroupOperator,
    pub conditions: Vec<Condition>,
}

impl ConditionGroup {
    #[allow(dead_code)]
    pub fn all(conditions: Vec<Condition>) -> Self {
        Self {
            operator: GroupOperator::And,
            conditions,
        }
    }

    #[allow(dead_code)]
    pub fn any(conditions: Vec<Condition>) -> Self {
        Self {
            operator: GroupOperator::Or,
            conditions,
        }
    }
}

/// one entry of the `conditions` attribute
///
/// either a full group, or the migration routine's flattened form: a bare
/// condition that behaves as a one-condition `and` group. entries are
/// combined with `and` at the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionEntry {
    Single(Condition),
    Group(ConditionGroup),
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// the block's persisted attribute payload
///
/// unknown payload fields are captured in `extra` and written back
/// untouched, so re-encoding never drops data another tool put there.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BlockAttributes {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<ConditionEntry>,
    /// inverts the final show/hide decision
    #[serde(default, skip_serializing_if = "is_false")]
    pub exclusion: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// generate a condition id: `<prefix>_<millis timestamp><4 random digits>`
///
/// uniqueness is only guaranteed at generation time; ids are never
/// re-checked against existing conditions.
#[allow(dead_code)]
pub fn generate_id(prefix: &str) -> String {
    use rand::Rng;

    let ts = chrono::Utc::now().timestamp_millis();
    let suffix = rand::thread_rng().gen_range(0..10_000u32);
    format!("{}_{}{:04}", prefix, ts, suffix)
}

/// named page-type predicates understood by the evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagePredicate {
    /// site front page
    FrontPage,
    /// single post view
    Single,
    /// static page view
    Page,
    /// any singular view (post, page, custom type)
    Singular,
    /// posts index when it is not the front page
    Home,
    /// post type archive, excluding date archives
    PostTypeArchive,
    /// category archive
    Category,
    /// tag archive
    Tag,
    /// custom taxonomy archive
    Tax,
    /// year archive
    Year,
    /// month archive
    Month,
    /// day archive
    Day,
    /// any date archive
    Date,
    /// author archive
    Author,
    /// generic archive
    Archive,
    /// search results
    Search,
    /// 404 page
    NotFound,
}

impl PagePredicate {
    /// parse a predicate from its wire name (e.g. "is_single")
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "is_front_page" => Some(PagePredicate::FrontPage),
            "is_single" => Some(PagePredicate::Single),
            "is_page" => Some(PagePredicate::Page),
            "is_singular" => Some(PagePredicate::Singular),
            "is_home" => Some(PagePredicate::Home),
            "is_post_type_archive" => Some(PagePredicate::PostTypeArchive),
            "is_category" => Some(PagePredicate::Category),
            "is_tag" => Some(PagePredicate::Tag),
            "is_tax" => Some(PagePredicate::Tax),
            "is_year" => Some(PagePredicate::Year),
            "is_month" => Some(PagePredicate::Month),
            "is_day" => Some(PagePredicate::Day),
            "is_date" => Some(PagePredicate::Date),
            "is_author" => Some(PagePredicate::Author),
            "is_archive" => Some(PagePredicate::Archive),
            "is_search" => Some(PagePredicate::Search),
            "is_404" => Some(PagePredicate::NotFound),
            _ => None,
        }
    }

    /// the wire name of this predicate
    pub fn as_str(&self) -> &'static str {
        match self {
            PagePredicate::FrontPage => "is_front_page",
            PagePredicate::Single => "is_single",
            PagePredicate::Page => "is_page",
            PagePredicate::Singular => "is_singular",
            PagePredicate::Home => "is_home",
            PagePredicate::PostTypeArchive => "is_post_type_archive",
            PagePredicate::Category => "is_category",
            PagePredicate::Tag => "is_tag",
            PagePredicate::Tax => "is_tax",
            PagePredicate::Year => "is_year",
            PagePredicate::Month => "is_month",
            PagePredicate::Day => "is_day",
            PagePredicate::Date => "is_date",
            PagePredicate::Author => "is_author",
            PagePredicate::Archive => "is_archive",
            PagePredicate::Search => "is_search",
            PagePredicate::NotFound => "is_404",
        }
    }

    /// all predicates
    pub fn all() -> &'static [PagePredicate] {
        &[
            PagePredicate::FrontPage,
            PagePredicate::Single,
            PagePredicate::Page,
            PagePredicate::Singular,
            PagePredicate::Home,
            PagePredicate::PostTypeArchive,
            PagePredicate::Category,
            PagePredicate::Tag,
            PagePredicate::Tax,
            PagePredicate::Year,
            PagePredicate::Month,
            PagePredicate::Day,
            PagePredicate::Date,
            PagePredicate::Author,
            PagePredicate::Archive,
            PagePredicate::Search,
            PagePredicate::NotFound,
        ]
    }

    /// closest known predicate name for a typo, if reasonably close
    pub fn suggest(name: &str) -> Option<&'static str> {
        let mut best: Option<(usize, &'static str)> = None;
        for p in Self::all() {
            let d = strsim::levenshtein(name, p.as_str());
            if best.map(|(bd, _)| d < bd).unwrap_or(true) {
                best = Some((d, p.as_str()));
            }
        }
        best.filter(|(d, _)| *d <= 3).map(|(_, s)| s)
    }
}
