use rust_decimal::Decimal;
use serde::Deserialize;

use super::{invalid_choice, require, FieldErrors};
use crate::models::{BidDraft, BidStatus};

pub const MAX_BUDGET_DIGITS: u32 = 10;
pub const BUDGET_DECIMAL_PLACES: u32 = 2;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BidForm {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub estimated_budget: Option<Decimal>,
}

impl BidForm {
    pub fn clean(&self) -> Result<BidDraft, FieldErrors> {
        let mut errors = FieldErrors::default();
        require(&mut errors, "message", &self.message);

        if let Some(budget) = self.estimated_budget {
            for message in budget_violations(budget) {
                errors.add("estimated_budget", message);
            }
        }

        errors.into_result(BidDraft {
            message: self.message.trim().to_string(),
            estimated_budget: self.estimated_budget,
        })
    }
}

/// Mirrors a `NUMERIC(10, 2)` column that must not go negative.
fn budget_violations(budget: Decimal) -> Vec<String> {
    let mut violations = Vec::new();
    if budget.is_sign_negative() && !budget.is_zero() {
        violations.push("Ensure this value is greater than or equal to 0.".to_string());
    }

    let normalized = budget.normalize();
    if normalized.scale() > BUDGET_DECIMAL_PLACES {
        violations.push(format!(
            "Ensure that there are no more than {BUDGET_DECIMAL_PLACES} decimal places."
        ));
    }

    let whole = normalized.abs().trunc();
    let whole_digits = if whole.is_zero() {
        0
    } else {
        whole.to_string().len() as u32
    };
    let max_whole_digits = MAX_BUDGET_DIGITS - BUDGET_DECIMAL_PLACES;
    if whole_digits > max_whole_digits {
        violations.push(format!(
            "Ensure that there are no more than {max_whole_digits} digits before the decimal point."
        ));
    }
    violations
}

/// Operator form for moving a bid between workflow states.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BidStatusForm {
    #[serde(default)]
    pub status: String,
}

impl BidStatusForm {
    pub fn clean(&self) -> Result<BidStatus, FieldErrors> {
        let raw = self.status.trim();
        let mut errors = FieldErrors::default();
        if !require(&mut errors, "status", raw) {
            return Err(errors);
        }
        raw.parse::<BidStatus>()
            .map_err(|_| FieldErrors::single("status", invalid_choice(raw)))
    }
}
