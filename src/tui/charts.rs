use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols,
    text::Line,
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::chart::{ChartBody, ChartSpec, LineSeries, SeriesColor};
use crate::metrics;
use crate::model::RecoveryChart;

pub fn to_color(c: SeriesColor) -> Color {
    match c {
        SeriesColor::Red => Color::Red,
        SeriesColor::Green => Color::Green,
        SeriesColor::Blue => Color::Blue,
        SeriesColor::Cyan => Color::Cyan,
        SeriesColor::Magenta => Color::Magenta,
        SeriesColor::Yellow => Color::Yellow,
    }
}

/// Draw `chart` into `area` with a titled border.
pub fn render_chart(f: &mut Frame, area: Rect, chart: &ChartSpec) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(chart.title.as_str());
    let inner = block.inner(area);
    f.render_widget(block, area);

    match &chart.body {
        ChartBody::Lines { series } => render_lines(f, inner, chart, series),
        ChartBody::Bars { chart: bars } => render_bars(f, inner, chart, bars),
    }
}

/// Axis bounds padded by 10%, with a zero floor for positive data.
fn bounds(values: impl Iterator<Item = f64> + Clone) -> [f64; 2] {
    let min = values.clone().fold(f64::INFINITY, f64::min);
    let max = values.fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return [0.0, 1.0];
    }
    let lo = if min >= 0.0 { 0.0 } else { min * 1.10 };
    let hi = metrics::axis_max([max]);
    if hi <= lo {
        [lo, lo + 1.0]
    } else {
        [lo, hi]
    }
}

fn axis_labels([lo, hi]: [f64; 2]) -> Vec<String> {
    let mid = (lo + hi) / 2.0;
    [lo, mid, hi].iter().map(|v| format!("{:.2}", v)).collect()
}

fn render_lines(f: &mut Frame, area: Rect, chart: &ChartSpec, series: &[LineSeries]) {
    if series.iter().all(|s| s.points.is_empty()) {
        f.render_widget(Paragraph::new("No data."), area);
        return;
    }

    // Chart on top, one metrics line per series below.
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(series.len() as u16)].as_ref())
        .split(area);

    let xs = series.iter().flat_map(|s| s.points.iter().map(|(x, _)| *x));
    let ys = series.iter().flat_map(|s| s.points.iter().map(|(_, y)| *y));
    let x_bounds = bounds(xs);
    let y_bounds = bounds(ys);

    let datasets: Vec<Dataset> = series
        .iter()
        .map(|s| {
            Dataset::default()
                .name(s.label.clone())
                .graph_type(GraphType::Line)
                .marker(symbols::Marker::Braille)
                .style(Style::default().fg(to_color(s.color)))
                .data(&s.points)
        })
        .collect();

    let widget = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title(chart.x_label.as_str())
                .style(Style::default().fg(Color::Gray))
                .bounds(x_bounds)
                .labels(axis_labels(x_bounds)),
        )
        .y_axis(
            Axis::default()
                .title(chart.y_label.as_str())
                .style(Style::default().fg(Color::Gray))
                .bounds(y_bounds)
                .labels(axis_labels(y_bounds)),
        );
    f.render_widget(widget, rows[0]);

    let metric_lines: Vec<Line> = series
        .iter()
        .map(|s| {
            let text = match metrics::compute_point_metrics(&s.points) {
                Some((mean, median, p25, p75)) => format!(
                    "{}  avg {:.2} med {:.2} p25 {:.2} p75 {:.2}",
                    s.label, mean, median, p25, p75
                ),
                None => s.label.clone(),
            };
            Line::styled(text, Style::default().fg(to_color(s.color)))
        })
        .collect();
    f.render_widget(Paragraph::new(metric_lines), rows[1]);
}

fn render_bars(f: &mut Frame, area: Rect, chart: &ChartSpec, bars: &RecoveryChart) {
    if bars.groups.is_empty() {
        f.render_widget(Paragraph::new("No recovery measurements."), area);
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)].as_ref())
        .split(area);
    f.render_widget(
        Paragraph::new(format!("{} by {}", chart.y_label, chart.x_label))
            .style(Style::default().fg(Color::Gray)),
        rows[0],
    );

    // Bar heights are integer milliseconds; the printed value stays in seconds.
    let max_ms = (metrics::axis_max([bars.max_seconds()]) * 1000.0).ceil() as u64;
    let slots = bars.bars().last().map(|(_, b)| b.offset as usize + 1).unwrap_or(1);
    let bar_width = ((rows[1].width as usize / slots.max(1)).saturating_sub(1)).clamp(3, 12) as u16;

    let mut widget = BarChart::default()
        .bar_width(bar_width)
        .bar_gap(1)
        .group_gap(bar_width + 1)
        .max(max_ms.max(1));
    for group in &bars.groups {
        let group_bars: Vec<Bar> = group
            .bars
            .iter()
            .enumerate()
            .map(|(idx, b)| {
                Bar::default()
                    .value((b.seconds * 1000.0).round() as u64)
                    .text_value(format!("{:.3}", b.seconds))
                    .label(Line::from(format!("t={}", b.variant.t)))
                    .style(Style::default().fg(to_color(crate::chart::palette_color(idx))))
            })
            .collect();
        widget = widget.data(
            BarGroup::default()
                .label(Line::from(group.category.to_string()))
                .bars(&group_bars),
        );
    }
    f.render_widget(widget, rows[1]);
}
