//! Financial primitives: discounting, annuities, loan schedules.
//!
//! These are pure functions; input validation (rates, horizons) happens at
//! the calculator boundary so the formulas here can stay branch-light.
//!
//! Numerical notes:
//! - `annuity_factor` degenerates to `0/0` as the rate approaches zero; we
//!   switch to the analytic limit `1/n` below a small threshold.
//! - Discount rates are expected to satisfy `rate > -1`; callers enforce it.

/// Threshold below which a rate is treated as exactly zero.
const RATE_EPS: f64 = 1e-9;

/// Discount factor `1 / (1 + r)^year`.
pub fn discount_factor(rate: f64, year: u32) -> f64 {
    (1.0 + rate).powi(-(year as i32))
}

/// Present value of a cashflow occurring at the end of `year`.
pub fn present_value(cashflow: f64, rate: f64, year: u32) -> f64 {
    cashflow * discount_factor(rate, year)
}

/// Capital recovery (annuity) factor `i (1+i)^n / ((1+i)^n - 1)`.
///
/// For `i → 0` the limit is `1/n`.
pub fn annuity_factor(rate: f64, years: u32) -> f64 {
    let n = years.max(1);
    if rate.abs() < RATE_EPS {
        return 1.0 / n as f64;
    }
    let growth = (1.0 + rate).powi(n as i32);
    rate * growth / (growth - 1.0)
}

/// Constant-payment loan schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanSchedule {
    pub principal: f64,
    pub annual_payment: f64,
    /// Total interest paid over the term.
    pub interest: f64,
}

/// Amortize `principal` over `term_years` at `rate` with constant payments.
pub fn amortize(principal: f64, rate: f64, term_years: u32) -> LoanSchedule {
    if principal <= 0.0 {
        return LoanSchedule {
            principal: 0.0,
            annual_payment: 0.0,
            interest: 0.0,
        };
    }
    let term = term_years.max(1);
    let payment = principal * annuity_factor(rate, term);
    LoanSchedule {
        principal,
        annual_payment: payment,
        interest: payment * term as f64 - principal,
    }
}

/// Price level after `year` years of escalation at rate `e`.
pub fn escalate(level: f64, escalation: f64, year: u32) -> f64 {
    level * (1.0 + escalation).powi(year as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discount_factor_year_zero_is_one() {
        assert!((discount_factor(0.07, 0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn discount_factor_decreases_with_year() {
        let r = 0.05;
        let mut prev = discount_factor(r, 0);
        for y in 1..20 {
            let df = discount_factor(r, y);
            assert!(df < prev, "df should shrink: year {y} gave {df} >= {prev}");
            prev = df;
        }
    }

    #[test]
    fn annuity_factor_zero_rate_limit() {
        let a = annuity_factor(0.0, 8);
        assert!((a - 1.0 / 8.0).abs() < 1e-12, "zero-rate annuity should be 1/n, got {a}");

        // Continuity: a tiny rate should land close to the limit.
        let a_eps = annuity_factor(1e-7, 8);
        assert!((a_eps - a).abs() < 1e-6);
    }

    #[test]
    fn annuity_factor_known_value() {
        // 5% over 10 years: a = 0.05 * 1.05^10 / (1.05^10 - 1) ≈ 0.129505
        let a = annuity_factor(0.05, 10);
        assert!((a - 0.129_504_57).abs() < 1e-6, "got {a}");
    }

    #[test]
    fn amortize_interest_positive_and_consistent() {
        let s = amortize(100_000.0, 0.04, 6);
        assert!(s.interest > 0.0);
        let repaid = s.annual_payment * 6.0;
        assert!((repaid - (s.principal + s.interest)).abs() < 1e-6);
    }

    #[test]
    fn amortize_zero_principal() {
        let s = amortize(0.0, 0.04, 6);
        assert!(s.annual_payment == 0.0 && s.interest == 0.0);
    }

    #[test]
    fn escalate_compounds() {
        let p = escalate(1.0, 0.02, 10);
        assert!((p - 1.02_f64.powi(10)).abs() < 1e-12);
    }
}
