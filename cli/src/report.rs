use chrono::NaiveDate;
use salescast_core::{
    month_name, ActualComparison, ForecastReport, TrendPoint, WeekdayAverages, WEEKDAYS,
};
use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct WeekdayRow {
    #[tabled(rename = "Weekday")]
    weekday: String,
    #[tabled(rename = "Average")]
    average: String,
    #[tabled(rename = "Days observed")]
    observed: usize,
}

#[derive(Tabled)]
struct ForecastRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Day")]
    day: String,
    #[tabled(rename = "Projected")]
    projected: String,
    #[tabled(rename = "Note")]
    note: String,
}

#[derive(Tabled)]
struct ComparisonRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Projected")]
    projected: String,
    #[tabled(rename = "Actual")]
    actual: String,
    #[tabled(rename = "Variance")]
    variance: String,
}

#[derive(Tabled)]
struct TrendRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Day")]
    day: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Uploads")]
    uploads: usize,
}

fn amount(value: f64) -> String {
    format!("{:.2}", value)
}

fn optional(value: Option<f64>, missing: &str) -> String {
    value.map(amount).unwrap_or_else(|| missing.to_string())
}

fn render<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    table.to_string()
}

pub fn print_weekdays(averages: &WeekdayAverages) {
    let rows: Vec<WeekdayRow> = WEEKDAYS
        .iter()
        .map(|&wd| WeekdayRow {
            weekday: wd.to_string(),
            average: optional(averages.get(wd), "no data"),
            observed: averages.observations(wd),
        })
        .collect();

    println!("{}", render(rows));
}

pub fn print_summary(report: &ForecastReport, today: NaiveDate) {
    println!(
        "\n\x1b[1;36m{} {} forecast\x1b[0m",
        month_name(report.month),
        report.year
    );
    println!("  Today:               {}", today.format("%d %b %Y"));
    let today_missing = match report.projected_on(today) {
        Some(day) if !day.estimated => "no history",
        _ => "-",
    };
    println!("  Projected today:     {}", optional(report.today_projected, today_missing));
    println!("  Month to date:       {}", optional(report.month_to_date_projected, "-"));
    println!("  Monthly projection:  {}", amount(report.total_projected));
    println!(
        "  Target:              {}",
        optional(report.target.map(|t| t.monthly_amount), "not set")
    );
    println!("  Gap to target:       {}", optional(report.gap_to_target, "-"));

    let flagged = report.unestimated_days();
    if !flagged.is_empty() {
        println!(
            "  \x1b[33m{} day(s) have no weekday history and are projected as 0\x1b[0m",
            flagged.len()
        );
    }
}

pub fn print_forecast(report: &ForecastReport, today: NaiveDate) {
    print_summary(report, today);

    let rows: Vec<ForecastRow> = report
        .daily_forecast
        .iter()
        .map(|day| {
            let mut note = Vec::new();
            if !day.estimated {
                note.push("no history");
            }
            if day.date == today {
                note.push("today");
            }
            ForecastRow {
                date: day.date.format("%Y-%m-%d").to_string(),
                day: day.weekday.to_string(),
                projected: amount(day.projected_amount),
                note: note.join(", "),
            }
        })
        .collect();

    println!("{}", render(rows));
}

pub fn print_comparison(comparison: &ActualComparison) {
    println!("\n\x1b[1;36mActual vs projected\x1b[0m");
    println!(
        "  Days with actuals:   {}\n  Actual total:        {}\n  Projected (same days): {}\n  Variance:            {}",
        comparison.days_with_actuals,
        amount(comparison.actual_total),
        amount(comparison.projected_for_actual_days),
        amount(comparison.variance)
    );
    if let Some(pct) = comparison.attainment() {
        println!("  Attainment:          {:.1}%", pct);
    }

    let rows: Vec<ComparisonRow> = comparison
        .days
        .iter()
        .filter(|d| d.actual.is_some())
        .map(|d| ComparisonRow {
            date: d.date.format("%Y-%m-%d").to_string(),
            projected: amount(d.projected),
            actual: optional(d.actual, "-"),
            variance: optional(d.variance, "-"),
        })
        .collect();

    if !rows.is_empty() {
        println!("{}", render(rows));
    }
}

pub fn print_trend(trend: &[TrendPoint]) {
    let (Some(first), Some(last)) = (trend.first(), trend.last()) else {
        println!("No historical sales recorded.");
        return;
    };
    let total: f64 = trend.iter().map(|p| p.total).sum();
    println!(
        "\n\x1b[1;36mHistorical sales {} to {}\x1b[0m",
        first.date.format("%d %b %Y"),
        last.date.format("%d %b %Y")
    );
    println!(
        "  Days: {}  Total: {}  Daily mean: {}",
        trend.len(),
        amount(total),
        amount(total / trend.len() as f64)
    );

    let rows: Vec<TrendRow> = trend
        .iter()
        .map(|p| TrendRow {
            date: p.date.format("%Y-%m-%d").to_string(),
            day: p.weekday.to_string(),
            total: amount(p.total),
            uploads: p.uploads,
        })
        .collect();

    println!("{}", render(rows));
}
