// SPDX-License-Identifier: MIT

//! Calendar conditions

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc, Weekday};

use crate::engine::{Condition, ConditionError, EvaluationContext};

/// Passes when the reference date falls on `day_of_week`.
///
/// The reference date is the execution start date, or the current time when
/// there is no execution yet.
#[derive(Debug, Clone)]
pub struct DayWeekCondition {
    pub day_of_week: Weekday,
}

impl DayWeekCondition {
    pub fn new(day_of_week: Weekday) -> Self {
        Self { day_of_week }
    }

    fn reference_date(context: &EvaluationContext<'_>) -> DateTime<Utc> {
        context
            .execution()
            .and_then(|e| e.state.start_date())
            .unwrap_or_else(Utc::now)
    }
}

#[async_trait]
impl Condition for DayWeekCondition {
    fn name(&self) -> &str {
        "day_week"
    }

    async fn test(&self, context: &EvaluationContext<'_>) -> Result<bool, ConditionError> {
        Ok(Self::reference_date(context).weekday() == self.day_of_week)
    }
}
