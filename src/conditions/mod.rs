//! condition evaluation for dynamically shown blocks
//!
//! a block carries a `conditions` attribute: typed conditions combined
//! with a single `and`/`or` operator per group, plus an `exclusion` flag
//! that inverts the final decision. the evaluator tests them against a
//! per-request page context snapshot.

mod eval;
mod parser;
mod period;
mod types;

pub use eval::{is_visible, PageContext};
pub use parser::{lint_payload, parse_attributes};
pub use types::{Condition, ConditionRule};

// re-export the rest of the model for library consumers
#[allow(unused_imports)]
pub use eval::{evaluate, evaluate_condition, PageFlags};
#[allow(unused_imports)]
pub use parser::lint_attributes;
#[allow(unused_imports)]
pub use period::{parse_timestamp, PeriodMethod, PeriodSetting};
#[allow(unused_imports)]
pub use types::{
    generate_id, BlockAttributes, ConditionEntry, ConditionGroup, CustomFieldRule, GroupOperator,
    PagePredicate,
};
