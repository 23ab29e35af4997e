// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the billowl bill reminder system.
//!
//! This crate provides the error type, domain types, the injectable clock,
//! and the trait seams (`BillStore`, `NotificationSink`) that the engine
//! crates and front ends share.

pub mod clock;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use clock::{Clock, SystemClock};
pub use error::BillowlError;
pub use traits::{BillStore, NotificationSink};
pub use types::{
    Bill, BillId, BillPatch, BillingCycle, Category, HealthStatus, NewBill,
    NotificationEvent, PaymentMethod, ServiceStatus, StatusFilter, UpcomingReminder,
    Urgency,
};

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::NaiveDate;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn billowl_error_has_all_variants() {
        // Verify all 6 error variants exist and can be constructed.
        let _config = BillowlError::Config("test".into());
        let _store = BillowlError::Store {
            source: Box::new(std::io::Error::other("test")),
        };
        let _data = BillowlError::Data {
            bill_id: Some(1),
            message: "test".into(),
        };
        let _notify = BillowlError::Notify {
            message: "test".into(),
            source: None,
        };
        let _not_found = BillowlError::BillNotFound { id: 42 };
        let _internal = BillowlError::Internal("test".into());
    }

    #[test]
    fn error_display_is_prefixed_by_kind() {
        let err = BillowlError::Store {
            source: Box::new(std::io::Error::other("disk gone")),
        };
        assert_eq!(err.to_string(), "store error: disk gone");

        let err = BillowlError::BillNotFound { id: 7 };
        assert_eq!(err.to_string(), "bill not found: 7");
    }

    #[test]
    fn urgency_orders_by_severity() {
        assert!(Urgency::NotDue < Urgency::DueSoon);
        assert!(Urgency::DueSoon < Urgency::DueToday);
        assert!(Urgency::DueToday < Urgency::Overdue);
    }

    #[test]
    fn urgency_display_round_trips() {
        for urgency in [
            Urgency::NotDue,
            Urgency::DueSoon,
            Urgency::DueToday,
            Urgency::Overdue,
        ] {
            let s = urgency.to_string();
            let parsed = Urgency::from_str(&s).expect("should parse back");
            assert_eq!(urgency, parsed);
        }
        assert_eq!(Urgency::DueSoon.to_string(), "due-soon");
    }

    #[test]
    fn billing_cycle_display_round_trips() {
        let variants = [
            BillingCycle::OneTime,
            BillingCycle::Weekly,
            BillingCycle::BiWeekly,
            BillingCycle::Monthly,
            BillingCycle::Quarterly,
            BillingCycle::SemiAnnually,
            BillingCycle::Annually,
        ];
        assert_eq!(variants.len(), 7, "BillingCycle must have exactly 7 variants");

        for variant in &variants {
            let s = variant.to_string();
            let parsed = BillingCycle::from_str(&s).expect("should parse back");
            assert_eq!(*variant, parsed);
        }
        assert_eq!(BillingCycle::BiWeekly.to_string(), "bi-weekly");
        assert_eq!(BillingCycle::OneTime.to_string(), "one-time");
    }

    #[test]
    fn next_date_for_day_based_cycles() {
        let from = date(2026, 3, 10);
        assert_eq!(
            BillingCycle::Weekly.next_date(from),
            Some(date(2026, 3, 17))
        );
        assert_eq!(
            BillingCycle::BiWeekly.next_date(from),
            Some(date(2026, 3, 24))
        );
    }

    #[test]
    fn next_date_for_month_based_cycles() {
        let from = date(2026, 3, 10);
        assert_eq!(
            BillingCycle::Monthly.next_date(from),
            Some(date(2026, 4, 10))
        );
        assert_eq!(
            BillingCycle::Quarterly.next_date(from),
            Some(date(2026, 6, 10))
        );
        assert_eq!(
            BillingCycle::SemiAnnually.next_date(from),
            Some(date(2026, 9, 10))
        );
        assert_eq!(
            BillingCycle::Annually.next_date(from),
            Some(date(2027, 3, 10))
        );
    }

    #[test]
    fn next_date_clamps_to_month_end() {
        // Jan 31 + 1 month lands on Feb 28 (non-leap) / Feb 29 (leap).
        assert_eq!(
            BillingCycle::Monthly.next_date(date(2026, 1, 31)),
            Some(date(2026, 2, 28))
        );
        assert_eq!(
            BillingCycle::Monthly.next_date(date(2028, 1, 31)),
            Some(date(2028, 2, 29))
        );
    }

    #[test]
    fn next_date_is_none_for_one_time() {
        assert_eq!(BillingCycle::OneTime.next_date(date(2026, 3, 10)), None);
    }

    #[test]
    fn status_filter_parses_cli_spelling() {
        assert_eq!(StatusFilter::from_str("auto-pay"), Ok(StatusFilter::AutoPay));
        assert_eq!(StatusFilter::from_str("pending"), Ok(StatusFilter::Pending));
        assert!(StatusFilter::from_str("autopay").is_err());
    }

    #[test]
    fn bill_patch_emptiness() {
        assert!(BillPatch::default().is_empty());
        let patch = BillPatch {
            amount: Some(12.0),
            ..BillPatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn notification_event_serializes_with_kebab_urgency() {
        let event = NotificationEvent {
            bill_id: 1,
            bill_name: "Rent".into(),
            amount: 1200.0,
            due_date: date(2026, 4, 1),
            days_until_due: 0,
            urgency: Urgency::DueToday,
            message: "Rent is due today".into(),
        };
        let json = serde_json::to_string(&event).expect("should serialize");
        assert!(json.contains("\"due-today\""));
        assert!(json.contains("\"2026-04-01\""));
    }

    #[test]
    fn system_clock_today_matches_now() {
        let clock = SystemClock;
        assert_eq!(clock.today(), clock.now().date_naive());
    }
}
