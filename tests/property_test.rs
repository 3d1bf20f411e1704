use proptest::prelude::*;
use vital_rule::alert::{Alert, Annotation};
use vital_rule::measurement::Measurement;
use vital_rule::store::MemoryStore;
use vital_rule::AlertEngine;

const SIGNALS: [&str; 7] = [
    "SystolicPressure",
    "DiastolicPressure",
    "OxygenSaturation",
    "ECG",
    "Alert",
    "ManualAlert",
    "WhiteBloodCells",
];

fn arb_measurement(subject_id: i32) -> impl Strategy<Value = Measurement> {
    (
        -50.0f64..300.0f64,
        0usize..SIGNALS.len(),
        0i64..3_600_000i64,
    )
        .prop_map(move |(value, signal, ts)| Measurement::new(subject_id, value, SIGNALS[signal], ts))
}

proptest! {
    #[test]
    fn test_out_of_range_systolic_alerts(
        value in prop_oneof![-1000.0f64..89.99f64, 180.01f64..1000.0f64],
        ts in any::<i64>(),
    ) {
        let mut store = MemoryStore::new();
        store.add_measurement(1, value, "SystolicPressure", ts);

        let alerts = AlertEngine::new().evaluate(&store, 1);
        let expected = format!("Critical SystolicPressure: {:?}", value);
        prop_assert!(
            alerts.iter().any(|a| a.condition().contains(&expected)),
            "missing '{}' in {:?}", expected, alerts
        );
    }

    #[test]
    fn test_in_range_systolic_is_quiet(value in 90.0f64..=180.0f64) {
        let mut store = MemoryStore::new();
        store.add_measurement(1, value, "SystolicPressure", 0);
        prop_assert!(AlertEngine::new().evaluate(&store, 1).is_empty());
    }

    #[test]
    fn test_fresh_evaluation_is_idempotent(
        records in prop::collection::vec(arb_measurement(7), 0..60),
    ) {
        let mut store = MemoryStore::new();
        for m in records {
            store.add(m);
        }

        let first = AlertEngine::new().evaluate(&store, 7);
        let second = AlertEngine::new().evaluate(&store, 7);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_insertion_order_with_distinct_timestamps_is_irrelevant(
        records in prop::collection::vec(arb_measurement(3), 0..40),
    ) {
        // give every record its own timestamp so sorting fully determines order
        let records: Vec<Measurement> = records
            .into_iter()
            .enumerate()
            .map(|(i, m)| Measurement { timestamp: m.timestamp * 100 + i as i64, ..m })
            .collect();

        let mut forward = MemoryStore::new();
        let mut reversed = MemoryStore::new();
        for m in &records {
            forward.add(m.clone());
        }
        for m in records.iter().rev() {
            reversed.add(m.clone());
        }

        prop_assert_eq!(
            AlertEngine::new().evaluate(&forward, 3),
            AlertEngine::new().evaluate(&reversed, 3)
        );
    }

    #[test]
    fn test_alerts_carry_subject_and_known_timestamps(
        records in prop::collection::vec(arb_measurement(11), 1..40),
    ) {
        let mut store = MemoryStore::new();
        for m in &records {
            store.add(m.clone());
        }
        for alert in AlertEngine::new().evaluate(&store, 11) {
            prop_assert_eq!(alert.subject_id(), "11");
            prop_assert!(records.iter().any(|m| m.timestamp == alert.timestamp()));
        }
    }

    #[test]
    fn test_repeat_then_priority_shape(text in "[A-Za-z ]{0,30}", count in 1u32..10) {
        let alert = Alert::new("1", text.clone(), 0)
            .annotate_all(&[Annotation::Repeated(count), Annotation::Priority]);
        prop_assert_eq!(
            alert.condition(),
            format!("[PRIORITY] {} (Repeated {}x)", text, count)
        );
    }

    #[test]
    fn test_manual_alert_any_value(value in any::<f64>()) {
        let mut store = MemoryStore::new();
        store.add_measurement(6, value, "ManualAlert", 0);
        let alerts = AlertEngine::new().evaluate(&store, 6);
        prop_assert_eq!(alerts.len(), 1);
        prop_assert_eq!(
            alerts[0].condition(),
            "[PRIORITY] Manual Alert Triggered (Repeated 2x)"
        );
    }
}
