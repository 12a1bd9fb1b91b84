//! Reconciliation plan properties, applied against an in-memory calendar
//! that mirrors the storage semantics: rows created on first consumption
//! seeded at capacity, adjustments floored at zero, releases against a
//! missing row skipped.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::NaiveDate;
    use uuid::Uuid;

    use havenstay_server::ledger::{
        expand_range, plan_create, plan_delete, plan_update, Adjustment, EntryRange,
    };

    struct MemoryCalendar {
        capacity: i32,
        rows: HashMap<(Uuid, NaiveDate), i32>,
    }

    impl MemoryCalendar {
        fn new(capacity: i32) -> Self {
            Self {
                capacity,
                rows: HashMap::new(),
            }
        }

        /// Same semantics as the calendar service: consuming adjustments
        /// ensure the row (seeded at capacity), releases only touch
        /// existing rows, and the quantity never goes below zero.
        fn apply(&mut self, plan: &[Adjustment]) {
            for adjustment in plan {
                let key = (adjustment.unit_id, adjustment.date);
                if adjustment.delta < 0 {
                    let quantity = self.rows.entry(key).or_insert(self.capacity);
                    *quantity = (*quantity + adjustment.delta).max(0);
                } else if let Some(quantity) = self.rows.get_mut(&key) {
                    *quantity = (*quantity + adjustment.delta).max(0);
                }
            }
        }

        fn available(&self, unit_id: Uuid, date: &str) -> i32 {
            let date: NaiveDate = date.parse().unwrap();
            self.rows
                .get(&(unit_id, date))
                .copied()
                .unwrap_or(self.capacity)
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn entry(unit: Uuid, check_in: &str, check_out: &str, persons: i32) -> EntryRange {
        EntryRange {
            unit_id: Some(unit),
            check_in: date(check_in),
            check_out: date(check_out),
            persons,
        }
    }

    #[test]
    fn test_expand_range_checkout_excluded() {
        let dates = expand_range(date("2024-03-01"), date("2024-03-04"));
        assert_eq!(
            dates,
            vec![date("2024-03-01"), date("2024-03-02"), date("2024-03-03")]
        );
    }

    #[test]
    fn test_create_consumes_capacity() {
        let unit = Uuid::new_v4();
        let mut calendar = MemoryCalendar::new(5);

        calendar.apply(&plan_create(&entry(unit, "2024-06-01", "2024-06-03", 2)));

        assert_eq!(calendar.available(unit, "2024-06-01"), 3);
        assert_eq!(calendar.available(unit, "2024-06-02"), 3);
        // Checkout day untouched.
        assert_eq!(calendar.available(unit, "2024-06-03"), 5);
    }

    #[test]
    fn test_update_shifts_range_and_persons() {
        let unit = Uuid::new_v4();
        let mut calendar = MemoryCalendar::new(5);

        let original = entry(unit, "2024-06-01", "2024-06-03", 2);
        calendar.apply(&plan_create(&original));

        let edited = entry(unit, "2024-06-02", "2024-06-04", 3);
        calendar.apply(&plan_update(&original, &edited));

        assert_eq!(calendar.available(unit, "2024-06-01"), 5);
        assert_eq!(calendar.available(unit, "2024-06-02"), 2);
        assert_eq!(calendar.available(unit, "2024-06-03"), 2);
    }

    #[test]
    fn test_update_across_units_reconciles_both() {
        let old_unit = Uuid::new_v4();
        let new_unit = Uuid::new_v4();
        let mut calendar = MemoryCalendar::new(4);

        let original = entry(old_unit, "2024-06-01", "2024-06-02", 3);
        calendar.apply(&plan_create(&original));
        assert_eq!(calendar.available(old_unit, "2024-06-01"), 1);

        let mut moved = original;
        moved.unit_id = Some(new_unit);
        calendar.apply(&plan_update(&original, &moved));

        assert_eq!(calendar.available(old_unit, "2024-06-01"), 4);
        assert_eq!(calendar.available(new_unit, "2024-06-01"), 1);
    }

    #[test]
    fn test_net_zero_sequence_restores_availability() {
        let unit = Uuid::new_v4();
        let mut calendar = MemoryCalendar::new(5);

        let first = entry(unit, "2024-06-01", "2024-06-05", 2);
        let second = entry(unit, "2024-06-02", "2024-06-04", 1);
        calendar.apply(&plan_create(&first));
        calendar.apply(&plan_create(&second));

        let edited = entry(unit, "2024-06-01", "2024-06-06", 3);
        calendar.apply(&plan_update(&first, &edited));
        calendar.apply(&plan_delete(&edited));
        calendar.apply(&plan_delete(&second));

        for day in expand_range(date("2024-06-01"), date("2024-06-06")) {
            assert_eq!(
                calendar.available(unit, &day.to_string()),
                5,
                "capacity not restored on {}",
                day
            );
        }
    }

    #[test]
    fn test_floor_invariant_under_overbooking() {
        let unit = Uuid::new_v4();
        let mut calendar = MemoryCalendar::new(3);

        calendar.apply(&plan_create(&entry(unit, "2024-06-01", "2024-06-02", 2)));
        calendar.apply(&plan_create(&entry(unit, "2024-06-01", "2024-06-02", 4)));

        assert_eq!(calendar.available(unit, "2024-06-01"), 0);
    }

    #[test]
    fn test_release_after_floor_diverges_from_truth() {
        // Documented reference behavior: once the quantity clamps at zero,
        // later releases no longer track true availability. The clamp
        // absorbed part of the oversized consumption, so the release puts
        // back more than was actually taken.
        let unit = Uuid::new_v4();
        let mut calendar = MemoryCalendar::new(3);

        let small = entry(unit, "2024-06-01", "2024-06-02", 2);
        let large = entry(unit, "2024-06-01", "2024-06-02", 4);
        calendar.apply(&plan_create(&small));
        calendar.apply(&plan_create(&large));
        calendar.apply(&plan_delete(&large));

        // True availability with the small stay still present is 1.
        assert_eq!(calendar.available(unit, "2024-06-01"), 4);
    }

    #[test]
    fn test_zero_length_range_is_noop() {
        let unit = Uuid::new_v4();
        let plan = plan_create(&entry(unit, "2024-06-01", "2024-06-01", 2));
        assert!(plan.is_empty());
    }

    #[test]
    fn test_whole_property_entries_plan_nothing() {
        let whole_property = EntryRange {
            unit_id: None,
            check_in: date("2024-06-01"),
            check_out: date("2024-06-05"),
            persons: 4,
        };
        assert!(plan_create(&whole_property).is_empty());
        assert!(plan_delete(&whole_property).is_empty());
    }
}
