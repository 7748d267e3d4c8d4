//! Chart building and rendering
//!
//! Figures are declarative Plotly descriptions; [`HtmlChartSink`] turns each
//! one into a standalone page that loads Plotly.js from its CDN.

use crate::error::{MarketError, Result};
use crate::metrics::IndicatorSeries;
use crate::series::HistoricalSeries;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Dates hidden from the x axis besides weekends
const HOLIDAY_BREAKS: [&str; 2] = ["2015-12-25", "2016-01-01"];

/// One trace of a figure
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Candlestick {
        name: String,
        x: Vec<String>,
        open: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
        close: Vec<f64>,
    },
    Scatter {
        name: String,
        x: Vec<String>,
        /// Undefined points serialize as `null` and show as gaps
        y: Vec<Option<f64>>,
        mode: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

impl Title {
    fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeBreak {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<[&'static str; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<&'static str>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeButton {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'static str>,
    pub step: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stepmode: Option<&'static str>,
}

impl RangeButton {
    fn back(count: u32, label: &'static str, step: &'static str, stepmode: &'static str) -> Self {
        Self {
            count: Some(count),
            label: Some(label),
            step,
            stepmode: Some(stepmode),
        }
    }

    fn all() -> Self {
        Self {
            count: None,
            label: None,
            step: "all",
            stepmode: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeSelector {
    pub buttons: Vec<RangeButton>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeSlider {
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XAxis {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub title: Title,
    pub rangebreaks: Vec<RangeBreak>,
    pub rangeslider: RangeSlider,
    pub rangeselector: RangeSelector,
}

impl Default for XAxis {
    /// Trading-day date axis with a range slider and preset zoom buttons
    fn default() -> Self {
        Self {
            kind: "date",
            title: Title::new("Date"),
            rangebreaks: vec![
                RangeBreak {
                    bounds: Some(["sat", "mon"]),
                    values: None,
                },
                RangeBreak {
                    bounds: None,
                    values: Some(HOLIDAY_BREAKS.to_vec()),
                },
            ],
            rangeslider: RangeSlider { visible: true },
            rangeselector: RangeSelector {
                buttons: vec![
                    RangeButton::back(1, "1D", "day", "backward"),
                    RangeButton::back(5, "5D", "day", "backward"),
                    RangeButton::back(1, "1M", "month", "backward"),
                    RangeButton::back(6, "6M", "month", "backward"),
                    RangeButton::back(1, "YTD", "year", "todate"),
                    RangeButton::back(1, "1Y", "year", "backward"),
                    RangeButton::all(),
                ],
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YAxis {
    pub title: Title,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    pub xaxis: XAxis,
    pub yaxis: YAxis,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            title: None,
            xaxis: XAxis::default(),
            yaxis: YAxis {
                title: Title::new("Stock Price"),
            },
        }
    }
}

/// Plotly figure: traces plus layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

fn dates(timestamps: &[DateTime<Utc>]) -> Vec<String> {
    timestamps
        .iter()
        .map(|ts| ts.format("%Y-%m-%d").to_string())
        .collect()
}

/// Candlestick chart titled "{symbol} over {days_ago} days"
pub fn candlestick(series: &HistoricalSeries, days_ago: u32) -> Figure {
    let bars = series.bars();
    let trace = Trace::Candlestick {
        name: series.symbol().to_string(),
        x: dates(&series.timestamps()),
        open: bars.iter().map(|bar| bar.open).collect(),
        high: bars.iter().map(|bar| bar.high).collect(),
        low: bars.iter().map(|bar| bar.low).collect(),
        close: series.closes(),
    };

    Figure {
        data: vec![trace],
        layout: Layout {
            title: Some(Title::new(format!(
                "{} over {days_ago} days",
                series.symbol()
            ))),
            ..Layout::default()
        },
    }
}

/// One close-price line per series
pub fn comparison(series: &[HistoricalSeries]) -> Figure {
    let mut figure = Figure {
        data: Vec::with_capacity(series.len()),
        layout: Layout::default(),
    };
    for s in series {
        let closes = s.closes().into_iter().map(Some).collect();
        figure.add_line(s.symbol(), &s.timestamps(), closes);
    }
    figure
}

impl Figure {
    /// Overlay a line trace
    pub fn add_line(
        &mut self,
        name: impl Into<String>,
        timestamps: &[DateTime<Utc>],
        values: Vec<Option<f64>>,
    ) -> &mut Self {
        self.data.push(Trace::Scatter {
            name: name.into(),
            x: dates(timestamps),
            y: values,
            mode: "lines",
        });
        self
    }

    /// Overlay indicator series computed over `series`
    pub fn add_overlays(&mut self, series: &HistoricalSeries, overlays: &[IndicatorSeries]) -> &mut Self {
        let timestamps = series.timestamps();
        for overlay in overlays {
            self.add_line(overlay.name.clone(), &timestamps, overlay.values.clone());
        }
        self
    }

    /// Title text, if any
    pub fn title(&self) -> Option<&str> {
        self.layout.title.as_ref().map(|t| t.text.as_str())
    }

    /// Standalone HTML page drawing this figure
    pub fn to_html(&self) -> Result<String> {
        let data = script_json(&self.data)?;
        let layout = script_json(&self.layout)?;
        let title = escape_html(self.title().unwrap_or("Chart"));

        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{PLOTLY_CDN}"></script>
</head>
<body>
<div id="chart" style="width:100%;height:90vh;"></div>
<script>
Plotly.newPlot("chart", {data}, {layout}, {{"responsive": true}});
</script>
</body>
</html>
"#
        ))
    }
}

/// JSON that can sit inside a `<script>` element
fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Where figures go once built
pub trait ChartSink: Send + Sync {
    /// Render one figure
    fn render(&self, figure: &Figure) -> Result<()>;
}

/// Render `figure`, logging instead of failing
pub fn render_or_log(sink: &dyn ChartSink, figure: &Figure) {
    if let Err(e) = sink.render(figure) {
        warn!(title = figure.title().unwrap_or_default(), error = %e, "Chart rendering failed");
    }
}

/// Discards every figure
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopChartSink;

impl ChartSink for NoopChartSink {
    fn render(&self, figure: &Figure) -> Result<()> {
        debug!(title = figure.title().unwrap_or_default(), "Chart output disabled");
        Ok(())
    }
}

/// Writes each figure as an HTML page into a directory
#[derive(Debug)]
pub struct HtmlChartSink {
    dir: PathBuf,
    counter: AtomicU64,
}

impl HtmlChartSink {
    /// Write pages into `dir`, creating it on first render
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            counter: AtomicU64::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_name(&self, figure: &Figure) -> String {
        let slug: String = figure
            .title()
            .unwrap_or("comparison")
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
            .collect();
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let stamp = Utc::now().format("%Y%m%d-%H%M%S");
        format!("{stamp}-{n:03}-{slug}.html")
    }
}

impl ChartSink for HtmlChartSink {
    fn render(&self, figure: &Figure) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            MarketError::ChartError(format!("cannot create {}: {e}", self.dir.display()))
        })?;

        let path = self.dir.join(self.file_name(figure));
        fs::write(&path, figure.to_html()?)?;
        info!(path = %path.display(), "Chart written");
        Ok(())
    }
}
