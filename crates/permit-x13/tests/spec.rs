//! Generated spec text.

use chrono::NaiveDate;
use permit_model::NamedSeries;
use permit_x13::{AdjustmentOptions, EngineConfig, LogTransform, X13Engine};

fn series() -> NamedSeries {
    NamedSeries {
        name: "use6_동수_주거용".to_string(),
        domain: "use6".to_string(),
        key: vec!["동수".to_string(), "주거용".to_string()],
        index: (1..=5)
            .map(|month| NaiveDate::from_ymd_opt(2001, month, 1).unwrap())
            .collect(),
        values: vec![None, Some(100.0), None, Some(120.5), None],
    }
}

#[test]
fn test_default_spec_snapshot() {
    let engine = X13Engine::new(EngineConfig::new("x13as"), AdjustmentOptions::default());
    let spec = engine.spec_for(&series()).unwrap();

    insta::assert_snapshot!(spec, @r#"
series{
    title="use6_dongsu_jugeoyong"
    start=2001.02
    period=12
    data=(
        100
        0
        120.5
    )
    name="use6_dongsu_jugeoyong"
}
transform{function=auto}
outlier{}
automdl{
    maxorder = (2 1)
    maxdiff = (2 1)
}
x11{ save=(d10 d11 d12 d13) }
"#);
}

#[test]
fn test_forecast_and_log_options() {
    let options = AdjustmentOptions {
        log: LogTransform::Log,
        outlier: false,
        forecast_horizon: Some(12),
        ..AdjustmentOptions::default()
    };
    let engine = X13Engine::new(EngineConfig::new("x13as"), options);
    let spec = engine.spec_for(&series()).unwrap();

    assert!(spec.contains("transform{function=log}\n"));
    assert!(!spec.contains("outlier{}"));
    assert!(spec.contains("forecast{maxlead=12}\n"));
    assert!(spec.ends_with("x11{ save=(d10 d11 d12 d13) }\n"));
}
