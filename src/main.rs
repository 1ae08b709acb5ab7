// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use offsets_pendientes::config::init_logging;
use offsets_pendientes::export::{self, EXPORT_FILE_NAME};
use offsets_pendientes::{process_pdf, OffsetReport};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "offsets-pendientes", version, about = "Offsets pendientes from PDF offset logs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write Datos + Pendientes to an xlsx (or two CSVs when OUT ends in .csv)
    Export {
        pdf: PathBuf,
        #[arg(short, long, default_value = EXPORT_FILE_NAME)]
        out: PathBuf,
    },
    /// Print the Pendientes table
    Summary {
        pdf: PathBuf,
        /// Print both tables as JSON instead
        #[arg(long)]
        json: bool,
    },
    /// Browse both tables in the terminal
    View { pdf: PathBuf },
}

fn main() -> Result<()> {
    init_logging(&["offsets_pendientes=info"]);
    let cli = Cli::parse();

    match cli.command {
        Command::Export { pdf, out } => run_export(&pdf, &out),
        Command::Summary { pdf, json } => run_summary(&pdf, json),
        Command::View { pdf } => run_ui_mode(&pdf),
    }
}

fn load_report(pdf: &Path) -> Result<OffsetReport> {
    let bytes = fs::read(pdf).with_context(|| format!("Failed to read {}", pdf.display()))?;
    let report = process_pdf(&bytes).with_context(|| format!("Failed to process {}", pdf.display()))?;
    Ok(report)
}

fn run_export(pdf: &Path, out: &Path) -> Result<()> {
    let report = load_report(pdf)?;

    let is_csv = out
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    if is_csv {
        let (datos_path, pendientes_path) = csv_paths(out);

        let datos = File::create(&datos_path)
            .with_context(|| format!("Failed to create {}", datos_path.display()))?;
        export::write_datos_csv(BufWriter::new(datos), report.rows.rows())?;

        let pendientes = File::create(&pendientes_path)
            .with_context(|| format!("Failed to create {}", pendientes_path.display()))?;
        export::write_pendientes_csv(BufWriter::new(pendientes), &report.pending)?;

        println!("✓ {}", datos_path.display());
        println!("✓ {}", pendientes_path.display());
    } else {
        let xlsx = report.to_xlsx()?;
        fs::write(out, xlsx).with_context(|| format!("Failed to write {}", out.display()))?;
        println!("✓ {}", out.display());
    }

    println!(
        "  {} registros, {} entities, pendiente total {:.4}",
        report.row_count(),
        report.entity_count(),
        report.total_pending()
    );
    Ok(())
}

/// out.csv → (out_datos.csv, out_pendientes.csv) next to `out`
fn csv_paths(out: &Path) -> (PathBuf, PathBuf) {
    let stem = out
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("offsets_pendientes");
    (
        out.with_file_name(format!("{}_datos.csv", stem)),
        out.with_file_name(format!("{}_pendientes.csv", stem)),
    )
}

fn run_summary(pdf: &Path, json: bool) -> Result<()> {
    let report = load_report(pdf)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.pending.is_empty() {
        println!("No offset records found in {}", pdf.display());
        return Ok(());
    }

    println!("❗ Offsets Pendientes de Regresar ({})", pdf.display());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for p in &report.pending {
        println!("  {}", p.summary());
    }
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "  {} registros, {} entities, pendiente total {:.4}",
        report.row_count(),
        report.entity_count(),
        report.total_pending()
    );
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(pdf: &Path) -> Result<()> {
    let report = load_report(pdf)?;
    let name = pdf
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("offsets.pdf")
        .to_string();

    let mut app = ui::App::new(report, name);
    ui::run_ui(&mut app)
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_pdf: &Path) -> Result<()> {
    anyhow::bail!("TUI mode not available: rebuild with --features tui, or use `export` / `summary`")
}
