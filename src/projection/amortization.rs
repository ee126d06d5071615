//! Level-payment amortization of the original loan amount

/// Contractual level-payment schedule: no defaults, no prepayments
#[derive(Debug, Clone, Copy)]
pub struct LevelPayment {
    principal: f64,
    monthly_rate: f64,
    periods: u32,
}

impl LevelPayment {
    pub fn new(principal: f64, monthly_rate: f64, periods: u32) -> Self {
        Self {
            principal,
            monthly_rate,
            periods,
        }
    }

    /// Level monthly payment (annuity payment)
    pub fn payment(&self) -> f64 {
        if self.periods == 0 {
            return self.principal;
        }
        if self.monthly_rate == 0.0 {
            return self.principal / self.periods as f64;
        }
        let discount = (1.0 + self.monthly_rate).powi(-(self.periods as i32));
        self.principal * self.monthly_rate / (1.0 - discount)
    }

    /// Contractual balance after `payments` payments
    pub fn balance_after(&self, payments: u32) -> f64 {
        let payment = self.payment();
        if self.monthly_rate == 0.0 {
            return self.principal - payment * payments as f64;
        }
        let growth = (1.0 + self.monthly_rate).powi(payments as i32);
        self.principal * growth - payment * (growth - 1.0) / self.monthly_rate
    }

    /// Interest part of the payment in `period` (1-based)
    pub fn interest_component(&self, period: u32) -> f64 {
        self.monthly_rate * self.balance_after(period.saturating_sub(1))
    }

    /// Principal part of the payment in `period` (1-based)
    pub fn principal_component(&self, period: u32) -> f64 {
        self.payment() - self.interest_component(period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_payment() {
        // 10,000 over 36 months at 12% annual
        let schedule = LevelPayment::new(10_000.0, 0.01, 36);
        assert_abs_diff_eq!(schedule.payment(), 332.1430981, epsilon = 1e-6);
    }

    #[test]
    fn test_components_sum_to_payment() {
        let schedule = LevelPayment::new(7_500.0, 0.28 / 12.0, 36);
        for period in 1..=36 {
            let total = schedule.principal_component(period) + schedule.interest_component(period);
            assert_abs_diff_eq!(total, schedule.payment(), epsilon = 1e-9);
        }
        assert_abs_diff_eq!(schedule.interest_component(1), 7_500.0 * 0.28 / 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_principal_components_repay_loan() {
        let schedule = LevelPayment::new(7_500.0, 0.28 / 12.0, 36);
        let repaid: f64 = (1..=36).map(|p| schedule.principal_component(p)).sum();
        assert_abs_diff_eq!(repaid, 7_500.0, epsilon = 1e-6);
        assert_abs_diff_eq!(schedule.balance_after(36), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_rate() {
        let schedule = LevelPayment::new(3_600.0, 0.0, 36);
        assert_abs_diff_eq!(schedule.payment(), 100.0);
        assert_abs_diff_eq!(schedule.principal_component(36), 100.0);
        assert_abs_diff_eq!(schedule.interest_component(5), 0.0);
    }
}
