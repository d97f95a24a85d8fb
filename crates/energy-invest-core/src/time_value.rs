use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AppraisalError;
use crate::types::{Money, Rate};
use crate::AppraisalResult;

const NPV_TOLERANCE: Decimal = dec!(0.0000001);
const RATE_TOLERANCE: Decimal = dec!(0.000000000001);
const MAX_NEWTON_ITERATIONS: u32 = 100;
const MAX_BISECTION_ITERATIONS: u32 = 200;
const INITIAL_GUESS: Rate = dec!(0.10);
const RATE_FLOOR: Rate = dec!(-0.9);
const RATE_CEILING: Rate = dec!(10);

/// Why an IRR could not be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IrrFailure {
    /// Fewer than two cash flows.
    InsufficientData,
    /// The series never changes sign, so NPV has no root.
    NoSignChange,
    /// Neither Newton-Raphson nor bisection found a root inside the search band.
    NotConverged,
}

/// Internal rate of return, or an explicit non-result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum IrrOutcome {
    Defined(Rate),
    Undefined(IrrFailure),
}

impl IrrOutcome {
    pub fn rate(&self) -> Option<Rate> {
        match self {
            IrrOutcome::Defined(rate) => Some(*rate),
            IrrOutcome::Undefined(_) => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, IrrOutcome::Defined(_))
    }

    /// Presentation fallback: callers show 0% rather than propagating a fault.
    pub fn value_or_zero(&self) -> Rate {
        self.rate().unwrap_or(Decimal::ZERO)
    }
}

/// Net Present Value of a series of yearly cash flows. Year 0 is undiscounted.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> AppraisalResult<Money> {
    if rate <= dec!(-1) {
        return Err(AppraisalError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let mut result = Decimal::ZERO;
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = discount
                .checked_mul(one_plus_r)
                .ok_or_else(|| AppraisalError::DivisionByZero {
                    context: format!("NPV discount factor overflow at period {t}"),
                })?;
        }
        let present = cf
            .checked_div(discount)
            .ok_or_else(|| AppraisalError::DivisionByZero {
                context: format!("NPV discount factor at period {t}"),
            })?;
        result = result
            .checked_add(present)
            .ok_or_else(|| AppraisalError::DivisionByZero {
                context: format!("NPV sum overflow at period {t}"),
            })?;
    }

    Ok(result)
}

/// Internal Rate of Return.
///
/// Newton-Raphson from a 10% guess, falling back to bisection over
/// [-90%, 1000%]. Every iteration is bounded and every operation is checked,
/// so a pathological series yields `Undefined` instead of a panic.
pub fn irr(cash_flows: &[Money]) -> IrrOutcome {
    if cash_flows.len() < 2 {
        return IrrOutcome::Undefined(IrrFailure::InsufficientData);
    }

    let has_outflow = cash_flows.iter().any(|cf| cf.is_sign_negative() && !cf.is_zero());
    let has_inflow = cash_flows.iter().any(|cf| cf.is_sign_positive() && !cf.is_zero());
    if !(has_outflow && has_inflow) {
        return IrrOutcome::Undefined(IrrFailure::NoSignChange);
    }

    if let Some(rate) = newton_raphson(cash_flows, INITIAL_GUESS) {
        return IrrOutcome::Defined(rate);
    }

    debug!("Newton-Raphson did not converge, falling back to bisection");
    match bisection(cash_flows) {
        Some(rate) => IrrOutcome::Defined(rate),
        None => IrrOutcome::Undefined(IrrFailure::NotConverged),
    }
}

fn newton_raphson(cash_flows: &[Money], guess: Rate) -> Option<Rate> {
    let mut rate = guess;

    for _ in 0..MAX_NEWTON_ITERATIONS {
        let (value, slope) = npv_with_slope(rate, cash_flows)?;

        if value.abs() < NPV_TOLERANCE {
            return Some(rate);
        }
        if slope.is_zero() {
            return None;
        }

        let step = value.checked_div(slope)?;
        rate -= step;

        // Guard against divergence
        if rate < RATE_FLOOR {
            rate = RATE_FLOOR;
        } else if rate > RATE_CEILING {
            rate = RATE_CEILING;
        } else if step.abs() < RATE_TOLERANCE {
            return Some(rate);
        }
    }

    None
}

fn bisection(cash_flows: &[Money]) -> Option<Rate> {
    let mut low = RATE_FLOOR;
    let mut high = RATE_CEILING;
    let (mut f_low, _) = npv_with_slope(low, cash_flows)?;
    let (f_high, _) = npv_with_slope(high, cash_flows)?;

    if f_low.is_zero() {
        return Some(low);
    }
    if f_high.is_zero() {
        return Some(high);
    }
    if f_low.is_sign_positive() == f_high.is_sign_positive() {
        return None;
    }

    for _ in 0..MAX_BISECTION_ITERATIONS {
        let mid = (low + high) / dec!(2);
        let (f_mid, _) = npv_with_slope(mid, cash_flows)?;

        if f_mid.abs() < NPV_TOLERANCE || high - low < RATE_TOLERANCE {
            return Some(mid);
        }

        if f_mid.is_sign_positive() == f_low.is_sign_positive() {
            low = mid;
            f_low = f_mid;
        } else {
            high = mid;
        }
    }

    None
}

/// NPV and dNPV/dr at `rate`, using iterative discount factors.
/// `None` on overflow or a vanishing discount factor.
fn npv_with_slope(rate: Rate, cash_flows: &[Money]) -> Option<(Decimal, Decimal)> {
    let one_plus_r = Decimal::ONE + rate;
    if one_plus_r <= Decimal::ZERO {
        return None;
    }

    let mut value = Decimal::ZERO;
    let mut slope = Decimal::ZERO;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = discount.checked_mul(one_plus_r)?;
        }
        let present = cf.checked_div(discount)?;
        value = value.checked_add(present)?;
        if t > 0 {
            let t_dec = Decimal::from(t as i64);
            let term = t_dec.checked_mul(present)?.checked_div(one_plus_r)?;
            slope = slope.checked_sub(term)?;
        }
    }

    Some((value, slope))
}
