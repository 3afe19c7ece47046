mod common;

use approx::assert_abs_diff_eq;
use rstest::rstest;

use demand_forecast::{run_guarded, DemandApps, DemandError, ScenarioInput, ScenarioSchema};

fn apps(n_days: usize) -> (common::Fixture, DemandApps) {
    let fixture = common::fixture(n_days);
    let apps = DemandApps::new(fixture.config.clone()).unwrap();
    (fixture, apps)
}

#[rstest]
#[case(7)]
#[case(30)]
#[case(60)]
fn test_forecast_returns_horizon_pairs(#[case] n_days: usize) {
    let (_fixture, apps) = apps(90);
    let report = apps.forecast(Some(n_days)).unwrap();

    assert_eq!(report.actual.len(), n_days);
    assert_eq!(report.forecast.len(), n_days);
    assert_eq!(report.dates.len(), n_days);
    assert_eq!(report.context_len, 90 - n_days);
    assert!(report.lower.is_none());
    assert_eq!(report.caption, format!("Forecast Accuracy (Last {n_days} Days)"));
    assert!(report.metrics.mae >= 0.0);
    assert!(report.metrics.rmse >= report.metrics.mae);
}

#[test]
fn test_forecast_uses_default_horizon() {
    let (_fixture, apps) = apps(90);
    let report = apps.forecast(None).unwrap();
    assert_eq!(report.actual.len(), 30);
}

#[test]
fn test_forty_days_of_history() {
    let (_fixture, apps) = apps(40);
    assert_eq!(apps.forecast(Some(30)).unwrap().context_len, 10);

    let err = apps.forecast(Some(45)).unwrap_err();
    assert!(matches!(
        err,
        DemandError::InsufficientHistory {
            requested: 45,
            available: 40
        }
    ));
}

#[test]
fn test_global_series_sums_regions() {
    let (_fixture, apps) = apps(40);
    let report = apps.forecast(Some(7)).unwrap();
    // день 33: 100 + 5*3 для North, +10 для South
    assert_abs_diff_eq!(report.actual[0], 2.0 * (100.0 + 5.0 * 3.0) + 10.0);
}

#[test]
fn test_regional_what_if_discount() {
    let (_fixture, apps) = apps(60);
    let baseline = apps.regional_forecast("North", Some(14), Some(0.0)).unwrap();
    let promo = apps.regional_forecast("North", Some(14), Some(25.0)).unwrap();

    assert_eq!(promo.region.as_deref(), Some("North"));
    assert_eq!(promo.discount_override, Some(25.0));
    assert_eq!(promo.forecast.len(), 14);
    assert_eq!(promo.coverage, Some(0.95));

    // коэффициент скидки 2.0 в фикстуре
    for (with, without) in promo.forecast.iter().zip(&baseline.forecast) {
        assert_abs_diff_eq!(with - without, 50.0, epsilon = 1e-9);
    }

    let lower = promo.lower.unwrap();
    let upper = promo.upper.unwrap();
    for i in 0..14 {
        assert!(lower[i] < promo.forecast[i] && promo.forecast[i] < upper[i]);
    }
    // факт не зависит от сценария
    assert_eq!(promo.actual, baseline.actual);
}

#[test]
fn test_regional_rejects_unknown_region_and_discount() {
    let (_fixture, apps) = apps(60);
    let err = apps.regional_forecast("Atlantis", Some(14), None).unwrap_err();
    assert!(err.to_string().contains("North, South"));

    let err = apps.regional_forecast("North", Some(14), Some(120.0)).unwrap_err();
    assert!(matches!(err, DemandError::InvalidInput(_)));
}

#[test]
fn test_linear_point_prediction() {
    let (_fixture, apps) = apps(10);
    let input = ScenarioInput::new()
        .with("Region", "North")
        .with("Category", "Electronics");
    let report = apps.predict_linear(&input).unwrap();

    // 120 - 30 + 8 + 5
    assert_abs_diff_eq!(report.units_sold, 103.0, epsilon = 1e-9);
    assert_eq!(report.message, "Predicted Units Sold: 103.00");
    assert_eq!(report.features["Region_North"], 1.0);
    assert_eq!(report.features["Region_South"], 0.0);
    assert_eq!(report.features["Region_West"], 0.0);
    assert!(report.fallbacks.is_empty());
}

#[test]
fn test_xgboost_point_prediction() {
    let (_fixture, apps) = apps(10);
    let cheap_north = ScenarioInput::new().with("Region", "North").with("Price", 20.0);
    let pricey_east = ScenarioInput::new().with("Region", "East").with("Price", 50.0);

    assert_abs_diff_eq!(apps.predict_xgboost(&cheap_north).unwrap().units_sold, 127.5);
    assert_abs_diff_eq!(apps.predict_xgboost(&pricey_east).unwrap().units_sold, 80.0);
}

#[test]
fn test_unknown_category_is_reported() {
    let (_fixture, apps) = apps(10);
    let input = ScenarioInput::new().with("Region", "Central");
    let report = apps.predict_xgboost(&input).unwrap();

    assert_eq!(report.fallbacks.len(), 1);
    assert!(report.fallbacks[0].contains("Central"));
    // все индикаторы региона нулевые, как у базового East
    assert_abs_diff_eq!(report.units_sold, 120.0);
}

#[test]
fn test_schema_mismatch_names_columns() {
    let (fixture, _) = apps(10);
    let mut schema = ScenarioSchema::retail_v1();
    schema
        .categorical
        .iter_mut()
        .find(|f| f.name == "Region")
        .unwrap()
        .categories
        .push("Central".to_string());

    let apps = DemandApps::with_schema(fixture.config.clone(), schema);
    let err = apps.predict_linear(&ScenarioInput::new()).unwrap_err();
    match err {
        DemandError::FeatureSchema { missing, unexpected } => {
            assert!(missing.is_empty());
            assert_eq!(unexpected, ["Region_Central"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_artifact_is_fatal_failure() {
    let (fixture, _) = apps(40);
    let mut config = fixture.config.clone();
    config.artifacts.sarimax_path = fixture.dir.path().join("missing.json");
    let apps = DemandApps::new(config).unwrap();

    let outcome = run_guarded("forecast", || apps.forecast(Some(30)));
    assert_eq!(outcome.failure_kind(), Some("artifact_load"));
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["recoverable"], false);
}

#[test]
fn test_controls_surface() {
    let (_fixture, apps) = apps(10);
    let controls = apps.controls();

    let horizon = &controls.sliders["n_days"];
    assert_eq!((horizon.min, horizon.max, horizon.default), (7.0, 60.0, 30.0));
    let discount = &controls.sliders["Discount"];
    assert_eq!((discount.min, discount.max, discount.default), (0.0, 100.0, 10.0));

    assert_eq!(controls.numbers["Price"].default, 30.0);
    assert_eq!(controls.numbers["Competitor Pricing"].default, 28.0);
    assert_eq!(controls.numbers["Inventory Level"].default, 200.0);
    assert_eq!(controls.selects["Holiday/Promotion"].options, ["No", "Yes"]);
    assert_eq!(
        controls.selects["Region"].options,
        ["North", "South", "East", "West"]
    );
    assert_eq!(controls.schema_version, "retail-v1");
}

#[test]
fn test_regions_listing() {
    let (_fixture, apps) = apps(10);
    assert_eq!(apps.regions().unwrap(), ["North", "South"]);
}
