use ecowitt_core::{
    AssignmentModel, BatteryStatus, CycleReport, LogicalSensor, SemanticType, SoilBinding,
};
use ecowitt_ingest::{FetchError, FixtureSource, RefreshEngine};
use serde_json::json;

fn model() -> AssignmentModel {
    AssignmentModel {
        sensors: vec![LogicalSensor::new("Outside")
            .bind(SemanticType::Temp, "0x02")
            .bind(SemanticType::Humidity, "0x07")],
        soil: vec![SoilBinding {
            channel: "1".into(),
            id: "soil_ch1".into(),
            label: String::new(),
        }],
    }
}

#[tokio::test]
async fn readings_do_not_leak_between_cycles() {
    let full = json!({
        "common_list": [
            {"id": "0x02", "val": "77.0", "unit": "F"},
            {"id": "0x07", "val": "60%"}
        ],
        "ch_soil": [{"channel": "1", "humidity": "45%", "battery": "3"}]
    });
    let sparse = json!({
        "common_list": [{"id": "0x07", "val": "61%"}]
    });
    let source = FixtureSource::sequence([
        Ok(full.clone()),
        Ok(sparse),
        Err(FetchError::Timeout),
        Ok(full),
    ]);
    let mut engine = RefreshEngine::new(Box::new(source));
    let model = model();

    let first = engine.refresh(&model).await.unwrap();
    let outside = first.sensor("Outside").unwrap();
    assert_eq!(outside.value(&SemanticType::Temp), Some(77.0));
    assert!(outside.vpd.is_some());
    assert_eq!(first.soil[0].battery, BatteryStatus::Normal);

    let second = engine.refresh(&model).await.unwrap();
    let outside = second.sensor("Outside").unwrap();
    assert_eq!(outside.value(&SemanticType::Temp), None);
    assert!(outside.values.contains_key(&SemanticType::Temp));
    assert_eq!(outside.value(&SemanticType::Humidity), Some(61.0));
    assert_eq!(outside.vpd, None);
    assert_eq!(second.soil[0].moisture, None);
    assert_eq!(second.soil[0].battery, BatteryStatus::Unavailable);
    assert_eq!(second.soil[0].label, "Soil Moisture Channel 1");
    assert_eq!(second.missing, vec!["0x02", "soil_ch1"]);

    let third = engine.cycle(&model).await;
    assert!(third.is_failure());

    let fourth = engine.refresh(&model).await.unwrap();
    assert_eq!(
        fourth.sensor("Outside").unwrap().value(&SemanticType::Temp),
        Some(77.0)
    );
}

#[tokio::test]
async fn replaced_assignment_applies_to_next_cycle() {
    let payload = json!({
        "common_list": [
            {"id": "0x02", "val": "77.0", "unit": "F"},
            {"id": "0x0B", "val": "4.0 mph", "unit": "mph"}
        ]
    });
    let mut engine = RefreshEngine::new(Box::new(FixtureSource::repeating(payload)));

    let before = engine.refresh(&model()).await.unwrap();
    assert_eq!(before.sensors.len(), 1);
    assert_eq!(before.soil.len(), 1);

    let replacement = AssignmentModel {
        sensors: vec![LogicalSensor::new("Mast").bind(SemanticType::WindSpeed, "0x0b")],
        soil: vec![],
    };
    let after = engine.cycle(&replacement).await;
    let CycleReport::Snapshot(after) = after else {
        panic!("expected a snapshot");
    };
    assert!(after.sensor("Outside").is_none());
    assert!(after.soil.is_empty());
    assert_eq!(
        after.sensor("Mast").unwrap().value(&SemanticType::WindSpeed),
        Some(4.0)
    );
}
