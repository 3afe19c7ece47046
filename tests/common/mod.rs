#![allow(dead_code)]

use std::io::Write;
use std::path::Path;

use chrono::{Duration, NaiveDate};
use serde_json::json;
use tempfile::TempDir;

use demand_forecast::config::AppConfig;
use demand_forecast::{ScenarioSchema, EXOG_COLUMNS};

pub const REGIONS: [&str; 2] = ["North", "South"];

pub struct Fixture {
    pub dir: TempDir,
    pub config: AppConfig,
}

/// История: `n_days` дней, по одной записи на регион в день
pub fn write_history(path: &Path, n_days: usize) {
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(
        file,
        "Date,Store ID,Product ID,Category,Region,Inventory Level,Units Sold,Price,Discount,Weather Condition,Holiday/Promotion,Competitor Pricing,Seasonality"
    )
    .unwrap();

    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    for day in 0..n_days {
        let date = start + Duration::days(day as i64);
        for (r, region) in REGIONS.iter().enumerate() {
            let units = 100.0 + (day % 7) as f64 * 3.0 + r as f64 * 10.0;
            let discount = ((day + r) % 5) as f64 * 5.0;
            writeln!(
                file,
                "{date},S00{r},P0001,Toys,{region},{inv},{units},{price},{discount},{weather},{promo},{comp},{season}",
                inv = 200 + day % 10,
                price = 30.0 + r as f64,
                weather = day % 4,
                promo = day % 2,
                comp = 29.5,
                season = (day / 30) % 4,
            )
            .unwrap();
        }
    }
}

fn sarimax_json() -> serde_json::Value {
    json!({
        "name": "sarimax",
        "exog_names": EXOG_COLUMNS,
        "intercept": 50.0,
        "exog_coefficients": [0.1, -1.0, 2.0, 0.5, 4.0, 0.8, 1.0],
        "ar": [0.4],
        "ma": [0.1],
        "residual_state": [3.0],
        "innovation_state": [1.0],
        "sigma2": 25.0
    })
}

fn linear_json(columns: &[String]) -> serde_json::Value {
    let coefficients: Vec<f64> = columns
        .iter()
        .map(|c| match c.as_str() {
            "Price" => -1.0,
            "Is_Promo" => 12.0,
            "Region_North" => 8.0,
            "Category_Electronics" => 5.0,
            _ => 0.0,
        })
        .collect();
    json!({
        "name": "linear_regression",
        "feature_names": columns,
        "coefficients": coefficients,
        "intercept": 120.0
    })
}

fn xgboost_json(columns: &[String]) -> serde_json::Value {
    let price = columns.iter().position(|c| c == "Price").unwrap();
    let north = columns.iter().position(|c| c == "Region_North").unwrap();
    json!({
        "name": "xgboost",
        "feature_names": columns,
        "base_score": 100.0,
        "trees": [
            {"split": {"feature": price, "threshold": 35.0,
                "left": {"leaf": {"value": 20.0}},
                "right": {"leaf": {"value": -20.0}}}},
            {"split": {"feature": north, "threshold": 0.5,
                "left": {"leaf": {"value": 0.0}},
                "right": {"leaf": {"value": 7.5}}}}
        ]
    })
}

pub fn fixture(n_days: usize) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let columns = ScenarioSchema::retail_v1().columns();

    let mut config = AppConfig::default();
    config.data.history_path = dir.path().join("history.csv");
    config.artifacts.sarimax_path = dir.path().join("sarimax.json");
    config.artifacts.regional_sarimax_path = dir.path().join("sarimax_region.json");
    config.artifacts.linear_path = dir.path().join("linear.json");
    config.artifacts.xgboost_path = dir.path().join("xgb.json");

    write_history(&config.data.history_path, n_days);
    let write_json = |path: &Path, value: serde_json::Value| {
        std::fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
    };
    write_json(&config.artifacts.sarimax_path, sarimax_json());
    write_json(&config.artifacts.regional_sarimax_path, sarimax_json());
    write_json(&config.artifacts.linear_path, linear_json(&columns));
    write_json(&config.artifacts.xgboost_path, xgboost_json(&columns));

    Fixture { dir, config }
}
