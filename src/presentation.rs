//! Представление результатов: данные графика, текст, SVG

use crate::error::Result;
use crate::metrics;
use crate::models::ForecastResult;
use crate::preprocessing::{EncodedScenario, ForecastWindow};
use crate::types::{ForecastReport, PredictionReport};

const CHART_WIDTH: f64 = 800.0;
const CHART_HEIGHT: f64 = 400.0;
const MARGIN: f64 = 50.0;

pub struct ForecastPresentation<'a> {
    pub title: &'a str,
    pub region: Option<&'a str>,
    pub window: &'a ForecastWindow,
    pub result: &'a ForecastResult,
    pub show_band: bool,
    pub discount_override: Option<f64>,
}

pub fn forecast_report(p: ForecastPresentation<'_>) -> Result<ForecastReport> {
    let metrics = metrics::accuracy(p.window.actual.view(), p.result.mean.view())?;
    let n_days = p.window.len();

    let mut metric_lines = vec![
        format!("MAE: {:.2}", metrics.mae),
        format!("RMSE: {:.2}", metrics.rmse),
    ];
    if let Some(mape) = metrics.mape {
        metric_lines.push(format!("MAPE: {mape:.2}%"));
    }

    let (lower, upper, coverage) = match (&p.result.lower, &p.result.upper) {
        (Some(lower), Some(upper)) if p.show_band => (
            Some(lower.to_vec()),
            Some(upper.to_vec()),
            p.result.coverage,
        ),
        _ => (None, None, None),
    };

    Ok(ForecastReport {
        title: p.title.to_string(),
        region: p.region.map(str::to_string),
        dates: p.window.dates.clone(),
        actual: p.window.actual.to_vec(),
        forecast: p.result.mean.to_vec(),
        lower,
        upper,
        coverage,
        context_len: p.window.context_len,
        discount_override: p.discount_override,
        metrics,
        caption: format!("Forecast Accuracy (Last {n_days} Days)"),
        metric_lines,
    })
}

pub fn prediction_report(model: &str, units_sold: f64, encoded: &EncodedScenario) -> PredictionReport {
    PredictionReport {
        model: model.to_string(),
        units_sold,
        message: format!("Predicted Units Sold: {units_sold:.2}"),
        features: encoded.frame.row_map(0),
        fallbacks: encoded.fallbacks.clone(),
    }
}

/// Линейный график факт/прогноз с полосой интервала
pub fn render_chart_svg(report: &ForecastReport) -> String {
    let n = report.actual.len();
    let series = [
        Some(&report.actual),
        Some(&report.forecast),
        report.lower.as_ref(),
        report.upper.as_ref(),
    ];
    let (mut y_min, mut y_max) = series
        .iter()
        .flatten()
        .flat_map(|values| values.iter().copied())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !y_min.is_finite() || !y_max.is_finite() {
        (y_min, y_max) = (0.0, 1.0);
    }
    if (y_max - y_min).abs() < 1e-9 {
        y_min -= 1.0;
        y_max += 1.0;
    }

    let plot_w = CHART_WIDTH - 2.0 * MARGIN;
    let plot_h = CHART_HEIGHT - 2.0 * MARGIN;
    let x = |i: usize| MARGIN + plot_w * i as f64 / n.saturating_sub(1).max(1) as f64;
    let y = |v: f64| MARGIN + plot_h * (1.0 - (v - y_min) / (y_max - y_min));
    let points = |values: &[f64]| -> String {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{:.1},{:.1}", x(i), y(*v)))
            .collect::<Vec<_>>()
            .join(" ")
    };

    let mut lines = Vec::new();
    lines.push(format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{CHART_WIDTH}" height="{CHART_HEIGHT}" viewBox="0 0 {CHART_WIDTH} {CHART_HEIGHT}">"#
    ));
    lines.push(format!(
        r#"<text x="{}" y="25" text-anchor="middle" font-size="16">{}</text>"#,
        CHART_WIDTH / 2.0,
        escape(&report.title)
    ));

    if let (Some(lower), Some(upper)) = (&report.lower, &report.upper) {
        let band: Vec<f64> = upper.iter().chain(lower.iter().rev()).copied().collect();
        let band_points = band
            .iter()
            .enumerate()
            .map(|(k, v)| {
                let i = if k < n { k } else { 2 * n - 1 - k };
                format!("{:.1},{:.1}", x(i), y(*v))
            })
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(format!(
            r#"<polygon class="band" points="{band_points}" fill="steelblue" fill-opacity="0.2" stroke="none"/>"#
        ));
    }

    lines.push(format!(
        r#"<polyline class="actual" points="{}" fill="none" stroke="black" stroke-width="1.5"/>"#,
        points(&report.actual)
    ));
    lines.push(format!(
        r#"<polyline class="forecast" points="{}" fill="none" stroke="steelblue" stroke-width="1.5" stroke-dasharray="6 4"/>"#,
        points(&report.forecast)
    ));

    if let (Some(first), Some(last)) = (report.dates.first(), report.dates.last()) {
        lines.push(format!(
            r#"<text x="{MARGIN}" y="{}" font-size="11">{first}</text>"#,
            CHART_HEIGHT - MARGIN / 2.0
        ));
        lines.push(format!(
            r#"<text x="{}" y="{}" font-size="11" text-anchor="end">{last}</text>"#,
            CHART_WIDTH - MARGIN,
            CHART_HEIGHT - MARGIN / 2.0
        ));
    }
    lines.push(format!(
        r#"<text x="{}" y="{}" font-size="12" text-anchor="middle">Date</text>"#,
        CHART_WIDTH / 2.0,
        CHART_HEIGHT - 8.0
    ));
    lines.push(format!(
        r#"<text x="14" y="{}" font-size="12" text-anchor="middle" transform="rotate(-90 14 {})">Units Sold</text>"#,
        CHART_HEIGHT / 2.0,
        CHART_HEIGHT / 2.0
    ));
    lines.push("</svg>\n".to_string());
    lines.join("\n")
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
