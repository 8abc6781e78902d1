//! Inclusion-condition evaluation.

use futures::future::try_join_all;
use tracing::{instrument, trace};

use crate::domain::error::DomainResult;
use crate::domain::record::RecordAccessor;
use crate::domain::schema::{Condition, ConditionSet, Inclusion};
use crate::domain::value;

/// Decides whether a node's inclusion rules hold for a record.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// True when both declared condition sets pass; no sets means included.
    ///
    /// Every entry of every declared set is evaluated, so predicates with side
    /// effects always run. The first failing lookup or predicate aborts.
    #[instrument(level = "trace", skip_all)]
    pub async fn evaluate(
        &self,
        inclusion: &Inclusion,
        record: &dyn RecordAccessor,
    ) -> DomainResult<bool> {
        if inclusion.is_unconditional() {
            return Ok(true);
        }
        let if_passed = match &inclusion.include_if {
            Some(set) => self.evaluate_set(set, record, false).await?,
            None => true,
        };
        let unless_passed = match &inclusion.include_unless {
            Some(set) => self.evaluate_set(set, record, true).await?,
            None => true,
        };
        Ok(if_passed && unless_passed)
    }

    async fn evaluate_set(
        &self,
        set: &ConditionSet,
        record: &dyn RecordAccessor,
        negate: bool,
    ) -> DomainResult<bool> {
        let results = try_join_all(
            set.iter()
                .map(|(key, condition)| evaluate_entry(key, condition, record, negate)),
        )
        .await?;
        Ok(results.into_iter().all(|passed| passed))
    }
}

/// Literal entries compare (or, negated, differ); predicates answer as-is.
async fn evaluate_entry(
    key: &str,
    condition: &Condition,
    record: &dyn RecordAccessor,
    negate: bool,
) -> DomainResult<bool> {
    match condition {
        Condition::Equals(literal) => {
            let actual = record.get(key).await?;
            let equal = value::loose_eq(actual.as_ref(), literal);
            trace!(key, ?actual, %literal, equal, "compared condition literal");
            Ok(equal != negate)
        }
        Condition::Predicate(predicate) => {
            let passed = predicate.call(record).await?;
            trace!(key, predicate = predicate.name(), passed, "ran condition predicate");
            Ok(passed)
        }
    }
}
