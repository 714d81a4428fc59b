use std::{io, time::Duration};

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, BorderType, Borders, Chart, Dataset, Gauge,
        GraphType, Padding, Paragraph,
    },
};
use salescast_core::{
    month_name, ActualComparison, ForecastReport, TrendPoint, WeekdayAverages, WEEKDAYS,
};

// --- THEME ---
struct Theme {
    primary: Color,
    muted: Color,
    text: Color,
    projected: Color,
    flagged: Color,
    today: Color,
    actual: Color,
}

const THEME: Theme = Theme {
    primary: Color::Cyan,
    muted: Color::DarkGray,
    text: Color::White,
    projected: Color::Green,
    flagged: Color::Red,
    today: Color::Yellow,
    actual: Color::Magenta,
};

pub struct DashboardApp {
    pub averages: WeekdayAverages,
    pub trend: Vec<TrendPoint>,
    pub report: ForecastReport,
    /// Present when the current month's actuals were supplied.
    pub comparison: Option<ActualComparison>,
    pub today: NaiveDate,
}

pub fn run(app: DashboardApp) -> Result<()> {
    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = event_loop(&mut terminal, &app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn event_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &DashboardApp) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let KeyCode::Char('q') | KeyCode::Esc = key.code {
                        return Ok(());
                    }
                }
            }
        }
    }
}

fn ui(frame: &mut Frame, app: &DashboardApp) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Charts + KPIs
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    // --- Header ---
    let header_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(20), Constraint::Min(1), Constraint::Length(30)])
        .split(main_layout[0]);

    let app_title = Paragraph::new(Span::styled(
        "SALES FORECAST",
        Style::default().fg(THEME.primary).add_modifier(Modifier::BOLD),
    ))
    .block(Block::default().padding(Padding::new(0, 0, 1, 0)));
    frame.render_widget(app_title, header_layout[0]);

    let period = Paragraph::new(Span::styled(
        format!(" {} {} ", month_name(app.report.month), app.report.year),
        Style::default().fg(THEME.text).add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Right)
    .block(Block::default().padding(Padding::new(0, 0, 1, 0)));
    frame.render_widget(period, header_layout[2]);

    frame.render_widget(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(THEME.muted)),
        main_layout[0],
    );

    // --- Content ---
    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(72),
            Constraint::Length(1),
            Constraint::Percentage(28),
        ])
        .split(main_layout[1]);

    let charts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(30),
            Constraint::Percentage(40),
        ])
        .split(content[0]);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(charts[0]);

    draw_weekday_chart(frame, &app.averages, top[0]);
    draw_trend_chart(frame, &app.trend, top[1]);
    draw_daily_chart(frame, &app.report, app.today, charts[1]);
    match &app.comparison {
        Some(comparison) => draw_comparison_chart(frame, comparison, charts[2]),
        None => frame.render_widget(
            Paragraph::new("Pass --actual with this month's sales to compare")
                .style(Style::default().fg(THEME.muted))
                .block(chart_block(" Actual vs Projected ")),
            charts[2],
        ),
    }
    draw_kpi_panel(frame, &app.report, app.comparison.as_ref(), app.today, content[2]);

    // --- Footer ---
    let help = Line::from(vec![
        Span::styled("QUIT: ", Style::default().fg(THEME.muted)),
        Span::styled("q", Style::default().fg(THEME.text)),
    ]);
    frame.render_widget(
        Paragraph::new(help).alignment(Alignment::Center),
        main_layout[2],
    );
}

fn to_bar_value(amount: f64) -> u64 {
    amount.max(0.0).round() as u64
}

fn chart_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(THEME.muted))
        .title(title)
}

fn draw_weekday_chart(frame: &mut Frame, averages: &WeekdayAverages, area: Rect) {
    let labels: Vec<String> = WEEKDAYS.iter().map(|wd| wd.to_string()).collect();
    let bars: Vec<Bar> = WEEKDAYS
        .iter()
        .zip(labels.iter())
        .map(|(&wd, label)| match averages.get(wd) {
            Some(avg) => Bar::default()
                .label(label.as_str())
                .value(to_bar_value(avg))
                .style(Style::default().fg(THEME.projected))
                .text_value(format!("{:.0}", avg)),
            None => Bar::default()
                .label(label.as_str())
                .value(0)
                .style(Style::default().fg(THEME.flagged))
                .text_value("n/a".to_string()),
        })
        .collect();

    let chart = BarChart::default()
        .block(chart_block(" Weekday Averages "))
        .bar_width(5)
        .bar_gap(2)
        .data(BarGroup::default().bars(&bars));

    frame.render_widget(chart, area);
}

fn draw_daily_chart(frame: &mut Frame, report: &ForecastReport, today: NaiveDate, area: Rect) {
    let labels: Vec<String> = report
        .daily_forecast
        .iter()
        .map(|d| d.date.day().to_string())
        .collect();

    let bars: Vec<Bar> = report
        .daily_forecast
        .iter()
        .zip(labels.iter())
        .map(|(day, label)| {
            let color = if day.date == today {
                THEME.today
            } else if day.estimated {
                THEME.projected
            } else {
                THEME.flagged
            };
            Bar::default()
                .label(label.as_str())
                .value(to_bar_value(day.projected_amount))
                .style(Style::default().fg(color))
                .text_value(String::new())
        })
        .collect();

    let chart = BarChart::default()
        .block(chart_block(" Daily Forecast "))
        .bar_width(2)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));

    frame.render_widget(chart, area);
}

fn value_bounds<'a>(values: impl Iterator<Item = &'a f64>) -> [f64; 2] {
    let max = values.copied().fold(0.0_f64, f64::max);
    [0.0, if max > 0.0 { max * 1.1 } else { 1.0 }]
}

fn amount_labels(bounds: [f64; 2]) -> Vec<Span<'static>> {
    vec![
        Span::raw(format!("{:.0}", bounds[0])),
        Span::raw(format!("{:.0}", (bounds[0] + bounds[1]) / 2.0)),
        Span::raw(format!("{:.0}", bounds[1])),
    ]
}

fn draw_trend_chart(frame: &mut Frame, trend: &[TrendPoint], area: Rect) {
    let (Some(first), Some(last)) = (trend.first(), trend.last()) else {
        frame.render_widget(
            Paragraph::new("No historical sales")
                .style(Style::default().fg(THEME.muted))
                .block(chart_block(" Historical Sales Trend ")),
            area,
        );
        return;
    };

    // Days since the first upload, so gaps between uploads stay visible.
    let points: Vec<(f64, f64)> = trend
        .iter()
        .map(|p| ((p.date - first.date).num_days() as f64, p.total))
        .collect();
    let span = ((last.date - first.date).num_days() as f64).max(1.0);
    let y_bounds = value_bounds(trend.iter().map(|p| &p.total));

    let dataset = Dataset::default()
        .name("Daily total")
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(THEME.primary))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(chart_block(" Historical Sales Trend "))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(THEME.muted))
                .bounds([0.0, span])
                .labels(vec![
                    Span::raw(first.date.format("%d %b").to_string()),
                    Span::raw(last.date.format("%d %b").to_string()),
                ]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(THEME.muted))
                .bounds(y_bounds)
                .labels(amount_labels(y_bounds)),
        );

    frame.render_widget(chart, area);
}

fn draw_comparison_chart(frame: &mut Frame, comparison: &ActualComparison, area: Rect) {
    let projected: Vec<(f64, f64)> = comparison
        .days
        .iter()
        .map(|d| (d.date.day() as f64, d.projected))
        .collect();
    let actual: Vec<(f64, f64)> = comparison
        .days
        .iter()
        .filter_map(|d| d.actual.map(|a| (d.date.day() as f64, a)))
        .collect();
    let y_bounds = value_bounds(projected.iter().chain(actual.iter()).map(|(_, v)| v));
    let last_day = comparison.days.len().max(1) as f64;

    let datasets = vec![
        Dataset::default()
            .name("Projected")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(THEME.projected))
            .data(&projected),
        Dataset::default()
            .name("Actual")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(THEME.actual))
            .data(&actual),
    ];

    let chart = Chart::new(datasets)
        .block(chart_block(" Actual vs Projected "))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(THEME.muted))
                .bounds([1.0, last_day])
                .labels(vec![Span::raw("1"), Span::raw(format!("{}", last_day))]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(THEME.muted))
                .bounds(y_bounds)
                .labels(amount_labels(y_bounds)),
        );

    frame.render_widget(chart, area);
}

fn draw_kpi_panel(
    frame: &mut Frame,
    report: &ForecastReport,
    comparison: Option<&ActualComparison>,
    today: NaiveDate,
    area: Rect,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(15), Constraint::Min(3)])
        .split(area);

    let fmt_opt = |v: Option<f64>, missing: &str| {
        v.map(|x| format!("{:.0}", x)).unwrap_or_else(|| missing.to_string())
    };
    let gap_color = match report.gap_to_target {
        Some(gap) if gap >= 0.0 => THEME.projected,
        Some(_) => THEME.flagged,
        None => THEME.muted,
    };

    let kpi = |label: &'static str, value: String, color: Color| {
        Line::from(vec![
            Span::styled(label, Style::default().fg(THEME.muted)),
            Span::styled(value, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        ])
    };

    let today_missing = match report.projected_on(today) {
        Some(day) if !day.estimated => "no history",
        _ => "-",
    };

    let mut info_text = vec![
        Line::from(Span::styled("Overview", Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        kpi("Today:      ", fmt_opt(report.today_projected, today_missing), THEME.today),
        kpi("To date:    ", fmt_opt(report.month_to_date_projected, "-"), THEME.text),
        kpi("Projection: ", format!("{:.0}", report.total_projected), THEME.projected),
        kpi(
            "Target:     ",
            fmt_opt(report.target.map(|t| t.monthly_amount), "not set"),
            THEME.text,
        ),
        kpi("Gap:        ", fmt_opt(report.gap_to_target, "-"), gap_color),
        Line::from(""),
        kpi(
            "Flagged:    ",
            format!("{} day(s)", report.unestimated_days().len()),
            if report.is_degraded() { THEME.flagged } else { THEME.muted },
        ),
    ];
    if let Some(cmp) = comparison {
        let variance_color = if cmp.variance >= 0.0 { THEME.projected } else { THEME.flagged };
        info_text.push(kpi("Actual:     ", format!("{:.0}", cmp.actual_total), THEME.actual));
        info_text.push(kpi("Variance:   ", format!("{:.0}", cmp.variance), variance_color));
        info_text.push(kpi(
            "Attained:   ",
            cmp.attainment().map(|p| format!("{:.0}%", p)).unwrap_or_else(|| "-".to_string()),
            THEME.text,
        ));
    }

    let info = Paragraph::new(info_text).block(chart_block(" Summary "));
    frame.render_widget(info, chunks[0]);

    if let Some(target) = report.target {
        let ratio = if target.monthly_amount > 0.0 {
            report.total_projected / target.monthly_amount
        } else {
            1.0
        };
        let gauge = Gauge::default()
            .block(chart_block(" Projection vs Target "))
            .gauge_style(Style::default().fg(if ratio >= 1.0 { THEME.projected } else { THEME.flagged }))
            .ratio(ratio.clamp(0.0, 1.0))
            .label(format!("{:.0}%", ratio * 100.0));
        frame.render_widget(gauge, chunks[1]);
    } else {
        frame.render_widget(
            Paragraph::new("Set a target to see comparison")
                .style(Style::default().fg(THEME.muted))
                .block(chart_block(" Projection vs Target ")),
            chunks[1],
        );
    }
}
