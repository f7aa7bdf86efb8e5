//! Standalone SVG line chart comparing equity curves on a shared time axis.

use crate::domain::portfolio::EquityPoint;
use chrono::{Datelike, NaiveDate};

const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 60.0;
const Y_TICKS: usize = 6;

pub const PALETTE: [&str; 4] = ["#2563eb", "#dc2626", "#16a34a", "#9333ea"];

pub struct ChartSeries<'a> {
    pub label: &'a str,
    pub points: &'a [EquityPoint],
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub width: f64,
    pub height: f64,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: "Cumulative Returns: Momentum vs. Mean Reversion".to_string(),
            x_label: "Date".to_string(),
            y_label: "Portfolio Value".to_string(),
            width: 1200.0,
            height: 600.0,
        }
    }
}

/// Step of roughly `raw` snapped to 1, 2 or 5 times a power of ten.
pub fn nice_step(raw: f64) -> f64 {
    if !(raw.is_finite() && raw > 0.0) {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let residual = raw / magnitude;
    let snapped = if residual <= 1.0 {
        1.0
    } else if residual <= 2.0 {
        2.0
    } else if residual <= 5.0 {
        5.0
    } else {
        10.0
    };
    snapped * magnitude
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Vertical grid positions: every January 1st for multi-year spans, otherwise
/// every month start.
fn date_ticks(first: NaiveDate, last: NaiveDate) -> Vec<(NaiveDate, String)> {
    let years: Vec<(NaiveDate, String)> = (first.year()..=last.year())
        .filter_map(|y| NaiveDate::from_ymd_opt(y, 1, 1))
        .filter(|d| *d >= first && *d <= last)
        .map(|d| (d, d.year().to_string()))
        .collect();
    if years.len() >= 2 {
        return years;
    }

    let mut ticks = Vec::new();
    let mut cursor = NaiveDate::from_ymd_opt(first.year(), first.month(), 1);
    while let Some(month) = cursor {
        if month > last {
            break;
        }
        if month >= first {
            ticks.push((month, month.format("%Y-%m").to_string()));
        }
        cursor = month.checked_add_months(chrono::Months::new(1));
    }
    ticks
}

/// Renders every non-empty series as a polyline with title, axis labels, grid
/// and legend. Returns an empty string when there is nothing to plot.
pub fn render_svg(series: &[ChartSeries], options: &ChartOptions) -> String {
    let plotted: Vec<&ChartSeries> = series.iter().filter(|s| !s.points.is_empty()).collect();
    let all_points = || plotted.iter().flat_map(|s| s.points.iter());
    let (Some(first), Some(last)) = (
        all_points().map(|p| p.date).min(),
        all_points().map(|p| p.date).max(),
    ) else {
        return String::new();
    };

    let min_value = all_points().map(|p| p.equity).fold(f64::INFINITY, f64::min);
    let max_value = all_points()
        .map(|p| p.equity)
        .fold(f64::NEG_INFINITY, f64::max);
    let step = nice_step((max_value - min_value) / (Y_TICKS - 1) as f64);
    let y_min = (min_value / step).floor() * step;
    let y_max = ((max_value / step).ceil() * step).max(y_min + step);

    let width = options.width;
    let height = options.height;
    let plot_width = width - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_height = height - MARGIN_TOP - MARGIN_BOTTOM;
    let span_days = (last - first).num_days().max(1) as f64;

    let x_scale = |d: NaiveDate| MARGIN_LEFT + (d - first).num_days() as f64 / span_days * plot_width;
    let y_scale = |v: f64| MARGIN_TOP + plot_height - (v - y_min) / (y_max - y_min) * plot_height;

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" xmlns=\"http://www.w3.org/2000/svg\" font-family=\"sans-serif\">\n",
        w = width,
        h = height
    ));
    svg.push_str("  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    svg.push_str(&format!(
        "  <text x=\"{:.1}\" y=\"28\" text-anchor=\"middle\" font-size=\"18\">{}</text>\n",
        width / 2.0,
        escape(&options.title)
    ));

    // Horizontal grid with value labels.
    let mut value = y_min;
    while value <= y_max + step / 2.0 {
        let y = y_scale(value);
        svg.push_str(&format!(
            "  <line x1=\"{:.1}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"#e5e7eb\" stroke-width=\"1\"/>\n",
            MARGIN_LEFT,
            width - MARGIN_RIGHT
        ));
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" font-size=\"11\" fill=\"#666\">{:.2}</text>\n",
            MARGIN_LEFT - 6.0,
            y + 4.0,
            value
        ));
        value += step;
    }

    // Vertical grid with date labels.
    for (date, label) in date_ticks(first, last) {
        let x = x_scale(date);
        svg.push_str(&format!(
            "  <line x1=\"{x:.1}\" y1=\"{:.1}\" x2=\"{x:.1}\" y2=\"{:.1}\" stroke=\"#e5e7eb\" stroke-width=\"1\"/>\n",
            MARGIN_TOP,
            MARGIN_TOP + plot_height
        ));
        svg.push_str(&format!(
            "  <text x=\"{x:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"11\" fill=\"#666\">{}</text>\n",
            MARGIN_TOP + plot_height + 18.0,
            label
        ));
    }

    // Axes.
    svg.push_str(&format!(
        "  <line x1=\"{l:.1}\" y1=\"{t:.1}\" x2=\"{l:.1}\" y2=\"{b:.1}\" stroke=\"#999\" stroke-width=\"1\"/>\n",
        l = MARGIN_LEFT,
        t = MARGIN_TOP,
        b = MARGIN_TOP + plot_height
    ));
    svg.push_str(&format!(
        "  <line x1=\"{l:.1}\" y1=\"{b:.1}\" x2=\"{r:.1}\" y2=\"{b:.1}\" stroke=\"#999\" stroke-width=\"1\"/>\n",
        l = MARGIN_LEFT,
        r = width - MARGIN_RIGHT,
        b = MARGIN_TOP + plot_height
    ));
    svg.push_str(&format!(
        "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"13\">{}</text>\n",
        MARGIN_LEFT + plot_width / 2.0,
        height - 15.0,
        escape(&options.x_label)
    ));
    svg.push_str(&format!(
        "  <text x=\"18\" y=\"{y:.1}\" text-anchor=\"middle\" font-size=\"13\" transform=\"rotate(-90 18 {y:.1})\">{}</text>\n",
        escape(&options.y_label),
        y = MARGIN_TOP + plot_height / 2.0
    ));

    for (i, s) in plotted.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let points: Vec<String> = s
            .points
            .iter()
            .map(|p| format!("{:.1},{:.1}", x_scale(p.date), y_scale(p.equity)))
            .collect();
        svg.push_str(&format!(
            "  <polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\"/>\n",
            points.join(" "),
            color
        ));
    }

    // Legend, top-left inside the plot area.
    for (i, s) in plotted.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let y = MARGIN_TOP + 16.0 + i as f64 * 18.0;
        let x = MARGIN_LEFT + 12.0;
        svg.push_str(&format!(
            "  <line x1=\"{x:.1}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"{color}\" stroke-width=\"2\"/>\n",
            x + 24.0
        ));
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\">{}</text>\n",
            x + 30.0,
            y + 4.0,
            escape(s.label)
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(start: NaiveDate, values: &[f64]) -> Vec<EquityPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &equity)| EquityPoint {
                date: start + chrono::Duration::days(i as i64 * 30),
                equity,
            })
            .collect()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn nice_step_snaps() {
        assert_eq!(nice_step(0.13), 0.2);
        assert_eq!(nice_step(0.9), 1.0);
        assert_eq!(nice_step(3.0), 5.0);
        assert_eq!(nice_step(7.0), 10.0);
        assert_eq!(nice_step(0.0), 1.0);
        assert_eq!(nice_step(f64::NAN), 1.0);
    }

    #[test]
    fn empty_series_render_nothing() {
        let out = render_svg(
            &[ChartSeries {
                label: "Empty",
                points: &[],
            }],
            &ChartOptions::default(),
        );
        assert!(out.is_empty());
    }

    #[test]
    fn chart_has_title_axes_legend_and_lines() {
        let momentum = curve(d(2016, 1, 4), &[1.0, 1.1, 1.3, 1.2, 1.6, 2.0, 2.4]);
        let reversion = curve(d(2015, 6, 1), &[1.0, 0.9, 1.05, 1.1]);
        let out = render_svg(
            &[
                ChartSeries {
                    label: "Momentum Strategy",
                    points: &momentum,
                },
                ChartSeries {
                    label: "Mean Reversion Strategy",
                    points: &reversion,
                },
            ],
            &ChartOptions::default(),
        );

        assert!(out.starts_with("<svg"));
        assert!(out.trim_end().ends_with("</svg>"));
        assert!(out.contains("Cumulative Returns: Momentum vs. Mean Reversion"));
        assert!(out.contains(">Date</text>"));
        assert!(out.contains(">Portfolio Value</text>"));
        assert!(out.contains("Momentum Strategy"));
        assert!(out.contains("Mean Reversion Strategy"));
        assert_eq!(out.matches("<polyline").count(), 2);
        assert!(out.contains(PALETTE[0]));
        assert!(out.contains(PALETTE[1]));
        // Under two year boundaries in range, so months are labelled.
        assert!(out.contains(">2016-01</text>"));
    }

    #[test]
    fn multi_year_span_uses_year_ticks() {
        let points = curve(d(2015, 1, 2), &[1.0; 40]);
        let out = render_svg(
            &[ChartSeries {
                label: "Long",
                points: &points,
            }],
            &ChartOptions::default(),
        );
        assert!(out.contains(">2016</text>"));
        assert!(out.contains(">2017</text>"));
        assert!(!out.contains(">2016-02</text>"));
    }

    #[test]
    fn short_span_uses_month_ticks() {
        let points = curve(d(2024, 1, 15), &[1.0, 1.01, 1.02, 1.0]);
        let out = render_svg(
            &[ChartSeries {
                label: "Only",
                points: &points,
            }],
            &ChartOptions::default(),
        );
        assert!(out.contains(">2024-02</text>"));
        assert!(out.contains(">2024-03</text>"));
    }

    #[test]
    fn flat_curve_still_has_a_value_range() {
        let points = curve(d(2024, 1, 2), &[1.0, 1.0, 1.0]);
        let out = render_svg(
            &[ChartSeries {
                label: "Flat",
                points: &points,
            }],
            &ChartOptions::default(),
        );
        assert!(!out.contains("NaN"));
        assert!(!out.contains("inf"));
    }

    #[test]
    fn every_element_is_on_its_own_line() {
        let points = curve(d(2024, 1, 2), &[1.0, 1.2, 0.9]);
        let out = render_svg(
            &[ChartSeries {
                label: "Lines",
                points: &points,
            }],
            &ChartOptions::default(),
        );
        let lines: Vec<&str> = out.lines().collect();

        assert!(out.ends_with("</svg>\n"));
        assert!(lines[0].starts_with("<svg width=\"1200\" height=\"600\""));
        assert_eq!(lines.last(), Some(&"</svg>"));
        for line in &lines {
            let element = line.trim_start();
            assert!(element.starts_with('<') && element.ends_with('>'), "{line}");
        }
    }

    #[test]
    fn labels_are_escaped() {
        let points = curve(d(2024, 1, 2), &[1.0, 1.1]);
        let options = ChartOptions {
            title: "A & B <test>".to_string(),
            ..ChartOptions::default()
        };
        let out = render_svg(
            &[ChartSeries {
                label: "x",
                points: &points,
            }],
            &options,
        );
        assert!(out.contains("A &amp; B &lt;test&gt;"));
    }
}
