//! Plain-text rendering of lookups, forecasts, history stats and exports.

use wxdash_core::{
    CityComparison, CitySummary, DailyForecast, ExportSummary, Source, TemperatureUnit,
    WeatherObservation, settings::THEMES,
};

pub fn print_observation(obs: &WeatherObservation, unit: TemperatureUnit, source: Option<Source>) {
    print!("{}", render_observation(obs, unit, source));
}

pub fn print_forecast(city: &str, daily: &[DailyForecast], unit: TemperatureUnit) {
    print!("{}", render_forecast(city, daily, unit));
}

pub fn print_comparison(cmp: &CityComparison, unit: TemperatureUnit) {
    print!("{}", render_comparison(cmp, unit));
}

pub fn print_summary(summary: &[CitySummary], unit: TemperatureUnit) {
    print!("{}", render_summary(summary, unit));
}

pub fn print_export(summary: &ExportSummary) {
    println!("Exported {} record(s) to {}", summary.rows, summary.path.display());
    if summary.skipped > 0 {
        println!("Skipped {} unreadable record(s); run with --verbose for details.", summary.skipped);
    }
}

pub fn print_themes(current: &str) {
    for (key, label) in THEMES {
        let marker = if *key == current { "*" } else { " " };
        println!("{marker} {key:<10} {label}");
    }
}

fn render_observation(
    obs: &WeatherObservation,
    unit: TemperatureUnit,
    source: Option<Source>,
) -> String {
    let mut out = format!("Weather in {}", obs.city);
    if source == Some(Source::History) {
        out.push_str(" (recorded earlier today)");
    }
    out.push('\n');
    out.push_str(&format!("  Temperature:   {}°{unit}\n", unit.format(obs.temperature_f)));
    out.push_str(&format!("  Humidity:      {}%\n", obs.humidity_pct));
    out.push_str(&format!("  Precipitation: {} in\n", obs.precipitation_in));
    out.push_str(&format!("  Conditions:    {}\n", title_case(&obs.description)));
    out
}

fn render_forecast(city: &str, daily: &[DailyForecast], unit: TemperatureUnit) -> String {
    if daily.is_empty() {
        return format!("No forecast available for {city}.\n");
    }

    let mut out = format!("{}-day forecast for {city}\n", daily.len());
    for day in daily {
        out.push_str(&format!(
            "  {}  {:<22} High: {:>6}°{unit}  Low: {:>6}°{unit}\n",
            day.date,
            title_case(&day.description),
            unit.format(day.high_f),
            unit.format(day.low_f),
        ));
    }
    out
}

fn render_comparison(cmp: &CityComparison, unit: TemperatureUnit) -> String {
    let (a, b) = (&cmp.first, &cmp.second);
    // A difference converts by scale only, without the offset.
    let diff = match unit {
        TemperatureUnit::Fahrenheit => cmp.temperature_diff_f,
        TemperatureUnit::Celsius => cmp.temperature_diff_f * 5.0 / 9.0,
    };

    let mut out = format!("{:<16}{:>16}{:>16}\n", "", a.city, b.city);
    out.push_str(&format!(
        "{:<16}{:>16}{:>16}\n",
        format!("Temp (°{unit})"),
        unit.format(a.temperature_f),
        unit.format(b.temperature_f)
    ));
    out.push_str(&format!("{:<16}{:>15}%{:>15}%\n", "Humidity", a.humidity_pct, b.humidity_pct));
    out.push_str(&format!(
        "{:<16}{:>13} in{:>13} in\n",
        "Precipitation", a.precipitation_in, b.precipitation_in
    ));
    out.push_str(&format!(
        "{:<16}{:>16}{:>16}\n",
        "Conditions",
        title_case(&a.description),
        title_case(&b.description)
    ));

    match cmp.warmer() {
        Some(city) => {
            out.push_str(&format!("{city} is warmer by {:.1}°{unit}.\n", diff.abs()));
        }
        None => out.push_str("Both cities report the same temperature.\n"),
    }
    out
}

fn render_summary(summary: &[CitySummary], unit: TemperatureUnit) -> String {
    if summary.is_empty() {
        return "No recorded lookups yet.\n".to_string();
    }

    let mut out = format!(
        "{:<20}{:>8}{:>10}{:>10}{:>10}{:>10}\n",
        "City",
        "Lookups",
        format!("Avg °{unit}"),
        "Min",
        "Max",
        "Range"
    );
    for city in summary {
        let range = match unit {
            TemperatureUnit::Fahrenheit => city.range_f(),
            TemperatureUnit::Celsius => city.range_f() * 5.0 / 9.0,
        };
        out.push_str(&format!(
            "{:<20}{:>8}{:>10}{:>10}{:>10}{:>10.1}\n",
            city.city,
            city.lookups,
            unit.format(city.average_f),
            unit.format(city.min_f),
            unit.format(city.max_f),
            range,
        ));
    }
    out
}

/// "light rain" -> "Light Rain".
fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
