use std::io::Write;

use owo_colors::OwoColorize;

use subiecte_batch::FieldSummary;
use subiecte_core::{ProgressEvent, UnitStatus};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print a per-unit status line as it completes.
pub fn print_progress(
    w: &mut dyn Write,
    event: &ProgressEvent,
    color: ColorMode,
) -> std::io::Result<()> {
    match event {
        ProgressEvent::Unit {
            field,
            year,
            version,
            status,
        } => {
            let unit = format!("{field}/{year}/{version}");
            if color.enabled() {
                match status {
                    UnitStatus::Loaded => writeln!(w, "{} {}", "Loaded".cyan(), unit)?,
                    UnitStatus::Processed => writeln!(w, "{} {}", "Processed".green(), unit)?,
                    UnitStatus::Failed => writeln!(w, "{} {}", "Failed".red(), unit)?,
                }
            } else {
                writeln!(w, "{status} {unit}")?;
            }
        }
    }
    Ok(())
}

/// Print the closing summary line for one field run.
pub fn print_field_summary(
    w: &mut dyn Write,
    summary: &FieldSummary,
    color: ColorMode,
) -> std::io::Result<()> {
    let counts = format!(
        "{} loaded, {} processed, {} failed",
        summary.loaded, summary.processed, summary.failed
    );
    if color.enabled() {
        writeln!(
            w,
            "{} {} ({}) -> {}",
            "Done".bold(),
            summary.field.bold(),
            counts,
            summary.output.display()
        )?;
    } else {
        writeln!(
            w,
            "Done {} ({}) -> {}",
            summary.field,
            counts,
            summary.output.display()
        )?;
    }
    writeln!(w)?;
    Ok(())
}
