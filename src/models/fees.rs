use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use crate::errors::{AppError, AppResult};
use super::round_amount;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum FeeStatus {
    Pending,
    Partial,
    Paid,
    Overdue,
}

impl FeeStatus {
    /// Status implied by the amounts alone. Never yields `Overdue`.
    pub fn from_amounts(paid: Decimal, total: Decimal) -> Self {
        if paid >= total {
            FeeStatus::Paid
        } else if paid.is_zero() {
            FeeStatus::Pending
        } else {
            FeeStatus::Partial
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeeStatus::Pending => "pending",
            FeeStatus::Partial => "partial",
            FeeStatus::Paid => "paid",
            FeeStatus::Overdue => "overdue",
        }
    }

    /// An explicit status is accepted only if it is `overdue` or agrees with
    /// the amounts, so a caller cannot mark an unpaid record paid.
    pub fn check_against(self, paid: Decimal, total: Decimal) -> AppResult<Self> {
        let derived = FeeStatus::from_amounts(paid, total);
        if self != FeeStatus::Overdue && self != derived {
            return Err(AppError::Validation(format!(
                "Status '{}' does not match the amounts (paid {} of {} is '{}')",
                self.as_str(),
                round_amount(paid),
                round_amount(total),
                derived.as_str()
            )));
        }
        Ok(self)
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Fees {
    pub id: String,
    pub student_id: String,
    pub academic_year: String,
    pub semester: u32,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub due_date: DateTime<Utc>,
    pub payment_date: Option<DateTime<Utc>>,
    pub status: FeeStatus,
}

#[derive(Debug, Clone)]
pub struct NewFees {
    pub student_id: String,
    pub academic_year: String,
    pub semester: u32,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub due_date: DateTime<Utc>,
    pub payment_date: Option<DateTime<Utc>>,
    pub status: FeeStatus,
}

impl Fees {
    /// Outstanding amount; negative when the record is overpaid.
    pub fn balance(&self) -> Decimal {
        round_amount(self.total_amount - self.paid_amount)
    }

    /// Credits `amount` and re-derives the status from the new totals.
    pub fn record_payment(&mut self, amount: Decimal, paid_at: DateTime<Utc>) -> AppResult<()> {
        if amount < Decimal::ZERO {
            return Err(AppError::Validation(
                "Payment amount cannot be negative".into(),
            ));
        }

        self.paid_amount = round_amount(self.paid_amount + amount);
        self.status = FeeStatus::from_amounts(self.paid_amount, self.total_amount);
        self.payment_date = Some(paid_at);
        Ok(())
    }

    /// Replaces the paid total with a running sum computed by the client,
    /// then re-derives the status the same way a payment does.
    pub fn set_paid_amount(&mut self, paid: Decimal, paid_at: DateTime<Utc>) -> AppResult<()> {
        if paid < Decimal::ZERO {
            return Err(AppError::Validation(
                "Paid amount cannot be negative".into(),
            ));
        }

        self.paid_amount = round_amount(paid);
        self.status = FeeStatus::from_amounts(self.paid_amount, self.total_amount);
        self.payment_date = Some(paid_at);
        Ok(())
    }

    pub fn set_status(&mut self, status: FeeStatus) -> AppResult<()> {
        self.status = status.check_against(self.paid_amount, self.total_amount)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fees(total: i64, paid: i64) -> Fees {
        let total = round_amount(Decimal::from(total));
        let paid = round_amount(Decimal::from(paid));
        Fees {
            id: "f-1".into(),
            student_id: "s-1".into(),
            academic_year: "2024-25".into(),
            semester: 1,
            total_amount: total,
            paid_amount: paid,
            due_date: Utc::now(),
            payment_date: None,
            status: FeeStatus::from_amounts(paid, total),
        }
    }

    #[test]
    fn paying_the_balance_settles_the_record() {
        for (total, paid) in [(10000, 0), (10000, 2500), (750, 749), (1, 0)] {
            let mut record = fees(total, paid);
            let balance = record.balance();
            record.record_payment(balance, Utc::now()).expect("payment");

            assert_eq!(record.status, FeeStatus::Paid);
            assert_eq!(record.paid_amount, record.total_amount);
            assert!(record.balance().is_zero());
        }
    }

    #[test]
    fn paying_part_of_the_balance_is_partial() {
        for (total, paid, amount) in [(10000, 0, 4000), (10000, 4000, 1), (500, 100, 399)] {
            let mut record = fees(total, paid);
            record
                .record_payment(Decimal::from(amount), Utc::now())
                .expect("payment");
            assert_eq!(record.status, FeeStatus::Partial);
        }
    }

    #[test]
    fn zero_payment_on_untouched_record_stays_pending() {
        let mut record = fees(10000, 0);
        record.record_payment(Decimal::ZERO, Utc::now()).expect("payment");
        assert_eq!(record.status, FeeStatus::Pending);
        assert!(record.payment_date.is_some());
    }

    #[test]
    fn overpayment_is_paid_with_negative_balance() {
        let mut record = fees(1000, 0);
        record
            .record_payment(Decimal::from(1200), Utc::now())
            .expect("payment");
        assert_eq!(record.status, FeeStatus::Paid);
        assert_eq!(record.balance(), round_amount(Decimal::from(-200)));
    }

    #[test]
    fn negative_payment_is_rejected_and_leaves_record_untouched() {
        let mut record = fees(1000, 100);
        let err = record
            .record_payment(Decimal::from(-5), Utc::now())
            .expect_err("negative amount");
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(record.paid_amount, round_amount(Decimal::from(100)));
        assert!(record.payment_date.is_none());
    }

    #[test]
    fn client_running_total_replaces_paid_amount() {
        let mut record = fees(10000, 4000);
        record
            .set_paid_amount(Decimal::from(10000), Utc::now())
            .expect("running total");
        assert_eq!(record.status, FeeStatus::Paid);
        assert!(record.balance().is_zero());

        let err = record
            .set_paid_amount(Decimal::from(-1), Utc::now())
            .expect_err("negative total");
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(record.paid_amount, round_amount(Decimal::from(10000)));
    }

    #[test]
    fn explicit_status_must_agree_with_amounts() {
        let mut record = fees(10000, 0);
        assert!(record.set_status(FeeStatus::Paid).is_err());
        assert!(record.set_status(FeeStatus::Partial).is_err());
        assert_eq!(record.status, FeeStatus::Pending);

        record.set_status(FeeStatus::Overdue).expect("overdue is always allowed");
        assert_eq!(record.status, FeeStatus::Overdue);
        record.set_status(FeeStatus::Pending).expect("matches amounts");
        assert_eq!(record.status, FeeStatus::Pending);
    }

    #[test]
    fn overdue_is_never_derived() {
        for (paid, total) in [(0, 10), (5, 10), (10, 10), (11, 10)] {
            let status = FeeStatus::from_amounts(Decimal::from(paid), Decimal::from(total));
            assert_ne!(status, FeeStatus::Overdue);
        }
    }
}
