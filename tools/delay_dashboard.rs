//! Informe de retrasos entre alquileres consecutivos
//!
//! Lee el export CSV de retrasos, imprime un resumen y guarda el informe
//! completo en JSON.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use log::{info, warn};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use rental_pricing::analysis::stats::round2;
use rental_pricing::analysis::{
    build_report, load_delay_records, AnalysisError, DelayRecord, DelayReport, ThresholdOptions,
    ThresholdScope,
};

#[derive(Parser)]
#[command(name = "delay_dashboard")]
#[command(about = "Delay analysis between consecutive car rentals", long_about = None)]
struct Cli {
    /// Delay export: .xlsx workbook (first sheet) or CSV with header
    #[arg(short, long)]
    input: PathBuf,

    /// Sweep minimum gaps 0..N minutes (0 disables the simulation)
    #[arg(short, long, default_value_t = 0)]
    max_threshold: u32,

    /// Rentals the threshold applies to (mobile, connect, all)
    #[arg(short, long, default_value = "mobile")]
    scope: ThresholdScope,

    /// Print the first N records
    #[arg(long)]
    show_raw: Option<usize>,

    /// Output file for the JSON report
    #[arg(short, long, default_value = "delay_analysis_report.json")]
    output: PathBuf,
}

#[derive(Serialize)]
struct ReportFile<'a> {
    generated_at: String,
    input: &'a Path,
    #[serde(flatten)]
    report: &'a DelayReport,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    info!("📂 Leyendo {}", cli.input.display());
    let records = load_delay_records(&cli.input)?;
    if records.is_empty() {
        warn!("⚠️ El export no contiene alquileres");
    }

    if let Some(n) = cli.show_raw {
        print_raw(&records, n);
    }

    let options = ThresholdOptions {
        max_threshold: cli.max_threshold,
        scope: cli.scope,
    };
    let report = build_report(&records, Some(options));
    print_summary(&report);

    write_report(&cli.output, &cli.input, &report)
        .with_context(|| format!("writing {}", cli.output.display()))?;
    info!("💾 Informe guardado en {}", cli.output.display());
    Ok(())
}

fn write_report(output: &Path, input: &Path, report: &DelayReport) -> Result<(), AnalysisError> {
    let file = File::create(output).map_err(|source| AnalysisError::Io {
        path: output.to_path_buf(),
        source,
    })?;
    let body = ReportFile {
        generated_at: Utc::now().to_rfc3339(),
        input,
        report,
    };
    serde_json::to_writer_pretty(BufWriter::new(file), &body).map_err(|source| AnalysisError::Report {
        path: output.to_path_buf(),
        source,
    })
}

fn print_raw(records: &[DelayRecord], n: usize) {
    println!("rental_id  car_id  checkin  state     delay  previous  gap");
    for r in records.iter().take(n) {
        println!(
            "{:<10} {:<7} {:<8} {:<9} {:>6} {:>9} {:>5}",
            r.rental_id,
            r.car_id,
            r.checkin_type.to_string(),
            format!("{:?}", r.state).to_lowercase(),
            fmt_opt(r.delay_at_checkout_in_minutes),
            r.previous_ended_rental_id.map_or_else(|| "-".to_string(), |id| id.to_string()),
            fmt_opt(r.time_delta_with_previous_rental_in_minutes),
        );
    }
    println!();
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn fmt_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{}%", round2(v)))
}

fn print_summary(report: &DelayReport) {
    println!("📊 Alquileres: {}", report.total_rentals);
    println!(
        "   a tiempo: {}  tarde: {}",
        report.checkout_status.in_time, report.checkout_status.late
    );
    println!(
        "   tarde (mobile): {}  tarde (connect): {}",
        report.delay_repartition.mobile_and_late, report.delay_repartition.connect_and_late
    );

    for stats in &report.by_checkin_type {
        println!(
            "🚗 {}: {} alquileres, {} tarde ({}), retraso medio {} min",
            stats.checkin_type,
            stats.rentals,
            stats.late,
            fmt_pct(stats.late_rate_pct),
            stats.mean_late_delay_minutes.map_or_else(|| "n/a".to_string(), |m| round2(m).to_string()),
        );
    }

    let impact = &report.impact;
    println!(
        "🔗 Consecutivos: {}  afectados: {} ({} cancelados)",
        impact.consecutive_rentals, impact.impacted, impact.impacted_canceled
    );
    println!(
        "   cancelación base: {}  cancelación afectados: {}",
        fmt_pct(impact.baseline_cancel_rate_pct),
        fmt_pct(impact.impacted_cancel_rate_pct)
    );
    println!(
        "   cancelaciones atribuibles a retrasos: {} del total",
        fmt_pct(impact.delay_attributed_cancel_share_pct)
    );

    if let Some(sim) = &report.threshold {
        println!("⏱️  Umbral ({}): minutos / retrasos evitados / alquileres perdidos", sim.scope);
        for point in sim.points() {
            println!(
                "   {:>4} {:>6} {:>6}",
                point.threshold, point.late_avoided, point.location_missed
            );
        }
    }
}
