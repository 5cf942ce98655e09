//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::Style;
use devboot_events::{FailureContext, PackageOperation};
use devboot_types::{ColorChoice, PackageFamily};
use serde::Serialize;
use std::io;
use std::path::PathBuf;

/// Result of one package operation as shown to the user
#[derive(Debug, Clone, Serialize)]
pub struct PackageOutcome {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureContext>,
}

impl PackageOutcome {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

/// Final result of a command
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandOutcome {
    Packages {
        family: PackageFamily,
        operation: PackageOperation,
        outcomes: Vec<PackageOutcome>,
    },
    Which {
        command: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        path: Option<PathBuf>,
    },
}

impl CommandOutcome {
    /// Whether the process should exit 0
    #[must_use]
    pub fn is_success(&self) -> bool {
        match self {
            Self::Packages { outcomes, .. } => outcomes.iter().all(PackageOutcome::succeeded),
            Self::Which { path, .. } => path.is_some(),
        }
    }
}

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    /// Color configuration
    color_choice: ColorChoice,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool, color_choice: ColorChoice) -> Self {
        Self {
            json_output,
            color_choice,
        }
    }

    /// Render command outcome
    pub fn render_outcome(&self, outcome: &CommandOutcome) -> io::Result<()> {
        if self.json_output {
            let json = serde_json::to_string_pretty(outcome).map_err(io::Error::other)?;
            println!("{json}");
            return Ok(());
        }

        match outcome {
            CommandOutcome::Packages {
                family,
                operation,
                outcomes,
            } => {
                self.render_packages(*family, *operation, outcomes);
                Ok(())
            }
            CommandOutcome::Which { command, path } => {
                match path {
                    Some(path) => println!("{} -> {}", self.bold(command), path.display()),
                    None => println!("{} not found on PATH", self.bold(command)),
                }
                Ok(())
            }
        }
    }

    fn render_packages(
        &self,
        family: PackageFamily,
        operation: PackageOperation,
        outcomes: &[PackageOutcome],
    ) {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new(match family {
                PackageFamily::App => "Application",
                PackageFamily::Extension => "Extension",
            })
            .add_attribute(Attribute::Bold),
            Cell::new("Result").add_attribute(Attribute::Bold),
            Cell::new("Exit code").add_attribute(Attribute::Bold),
            Cell::new("Details").add_attribute(Attribute::Bold),
        ]);

        for outcome in outcomes {
            let exit_code = outcome
                .exit_code
                .map_or_else(|| "-".to_string(), |code| code.to_string());
            let (status, details) = match &outcome.failure {
                None => (self.status_cell(format!("{operation}ed"), Color::Green), String::new()),
                Some(failure) => (
                    self.status_cell("failed", Color::Red),
                    failure_details(failure),
                ),
            };
            table.add_row(vec![
                Cell::new(&outcome.name),
                status,
                Cell::new(exit_code),
                Cell::new(details),
            ]);
        }

        println!("{table}");

        let failed = outcomes.iter().filter(|o| !o.succeeded()).count();
        if failed > 0 {
            println!(
                "{}",
                self.paint(
                    Style::new().red(),
                    &format!("{failed} of {} failed", outcomes.len())
                )
            );
        }
    }

    fn status_cell(&self, text: impl Into<String>, color: Color) -> Cell {
        let cell = Cell::new(text.into());
        if self.supports_color() {
            cell.fg(color)
        } else {
            cell
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(Style::new().bold(), text)
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.supports_color() {
            style.force_styling(true).apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Check if color output is supported
    fn supports_color(&self) -> bool {
        match self.color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => console::Term::stdout().features().colors_supported(),
        }
    }
}

fn failure_details(failure: &FailureContext) -> String {
    let mut details = failure.message.clone();
    if let Some(code) = &failure.code {
        details.push_str(&format!(" [{code}]"));
    }
    if let Some(hint) = &failure.hint {
        details.push('\n');
        details.push_str(hint);
    }
    details
}
