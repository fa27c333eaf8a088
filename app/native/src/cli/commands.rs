//! CLI command definitions using Clap.
//!
//! This module defines all CLI commands and their arguments.

use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};
use colored::Colorize;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use super::output;
use crate::config::{self, template};
use crate::constants::{APP_DIR_NAME, APP_NAME};
use crate::error::ZoneSnapError;
use crate::modules::zoning::{
    DesktopCommand, MonitorLayout, Monitors, OverlayEvent, Point, Rect, Scenario, ScenarioReport,
    Zone, ZoneSettings, find_target_zone, run_scenario,
};
use crate::schema;

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Zonesnap CLI - inspect zones and replay snapping scenarios.
#[derive(Parser, Debug)]
#[command(name = "zonesnap")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file to use instead of the default locations.
    #[arg(long, short, global = true, env = "ZONESNAP_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// List the configured zones.
    ///
    /// Zones are printed in priority order: where zones overlap, the first
    /// one listed wins.
    #[command(after_long_help = r#"Examples:
  zonesnap zones                      # Table of zones from the default config
  zonesnap zones --json               # Same, as JSON
  zonesnap zones -c ./config.jsonc    # Zones from a specific file"#)]
    Zones {
        /// Output in JSON format instead of table format.
        #[arg(long, short = 'j')]
        json: bool,
    },

    /// Find the zone under a point.
    ///
    /// Runs zone detection against the configured zones. Work areas describe
    /// the monitors; without any, a single 1920x1080 monitor is assumed.
    #[command(after_long_help = r#"Examples:
  zonesnap detect 400 500
  zonesnap detect 2100 300 --work-area 0,0,1920,1080 --work-area 1920,0,2560,1440
  zonesnap detect 50 50 --monitor 3 --primary 1 --work-area 0,0,1920,1080 --work-area 1920,0,1920,1080"#)]
    Detect {
        /// Horizontal pointer position, in global coordinates.
        #[arg(allow_negative_numbers = true)]
        x: i32,

        /// Vertical pointer position, in global coordinates.
        #[arg(allow_negative_numbers = true)]
        y: i32,

        /// Monitor to test against. Defaults to the monitor under the point.
        #[arg(long, short)]
        monitor: Option<usize>,

        /// Monitor work area as X,Y,WIDTH,HEIGHT. Repeat once per monitor.
        #[arg(long = "work-area", short = 'w', value_name = "X,Y,W,H")]
        work_areas: Vec<WorkAreaArg>,

        /// Index of the primary monitor.
        #[arg(long, default_value_t = 0)]
        primary: usize,

        /// Output in JSON format.
        #[arg(long, short = 'j')]
        json: bool,
    },

    /// Replay a scenario script through the snapping engine.
    ///
    /// The script describes monitors, windows and a list of steps (pointer
    /// moves, drags, window creation and destruction, waits). Every geometry
    /// command and highlight call the engine makes is printed.
    #[command(after_long_help = r#"Example script:
  {
    "monitors": [{ "x": 0, "y": 0, "width": 1920, "height": 1080 }],
    "windows": [{ "id": 1, "frame": { "x": 1000, "y": 100, "width": 800, "height": 600 }, "monitor": 0 }],
    "steps": [
      { "action": "pointer", "x": 1400, "y": 400 },
      { "action": "drag", "window": 1, "x": 400, "y": 500 }
    ]
  }"#)]
    Simulate {
        /// Path to the scenario script (JSON or JSONC).
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Output in JSON format.
        #[arg(long, short = 'j')]
        json: bool,
    },

    /// Write a starter configuration file.
    ///
    /// Writes to the path given with --config, or to
    /// ~/.config/zonesnap/config.jsonc.
    Init {
        /// Overwrite an existing file.
        #[arg(long, short)]
        force: bool,
    },

    /// Output the configuration JSON Schema.
    ///
    /// Can be redirected to a file for use with editors that support JSON
    /// Schema validation.
    Schema,

    /// Generate shell completions.
    ///
    /// Usage:
    ///   eval "$(zonesnap completions --shell zsh)"
    ///   zonesnap completions --shell fish > ~/.config/fish/completions/zonesnap.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },
}

/// A work area given on the command line as `x,y,width,height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkAreaArg(pub Rect);

impl FromStr for WorkAreaArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<i32> = s
            .split(',')
            .map(|part| part.trim().parse::<i32>())
            .collect::<Result<_, _>>()
            .map_err(|_| format!("Invalid work area '{s}'. Expected X,Y,WIDTH,HEIGHT."))?;

        match parts.as_slice() {
            [x, y, width, height] if *width > 0 && *height > 0 => {
                Ok(Self(Rect::new(*x, *y, *width, *height)))
            }
            [_, _, _, _] => Err(format!("Invalid work area '{s}'. Size must be positive.")),
            _ => Err(format!("Invalid work area '{s}'. Expected X,Y,WIDTH,HEIGHT.")),
        }
    }
}

/// Work area used by `detect` when none is given.
const DEFAULT_WORK_AREA: Rect = Rect::new(0, 0, 1920, 1080);

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command execution fails.
    pub fn execute(&self) -> Result<(), ZoneSnapError> {
        match &self.command {
            Commands::Zones { json } => self.execute_zones(*json)?,
            Commands::Detect {
                x,
                y,
                monitor,
                work_areas,
                primary,
                json,
            } => self.execute_detect(Point::new(*x, *y), *monitor, work_areas, *primary, *json)?,
            Commands::Simulate { script, json } => self.execute_simulate(script, *json)?,
            Commands::Init { force } => self.execute_init(*force)?,
            Commands::Schema => println!("{}", schema::generate_schema_json()),
            Commands::Completions { shell } => Self::print_completions(*shell),
        }

        Ok(())
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, APP_NAME, &mut io::stdout());
    }

    fn settings(&self) -> ZoneSettings {
        let (config, _) = config::load_or_default(self.config.as_deref());
        ZoneSettings::from(&config)
    }

    fn execute_zones(&self, json: bool) -> Result<(), ZoneSnapError> {
        let zones = self.settings().zones;

        if json {
            output::print_json(&serde_json::to_value(&*zones)?);
            return Ok(());
        }

        if zones.is_empty() {
            println!("{}", "No zones configured.".yellow());
            return Ok(());
        }

        println!("{}", format!("Zones ({})", zones.len()).bold());
        println!("{}", zone_table(&zones));
        Ok(())
    }

    fn execute_detect(
        &self,
        point: Point,
        monitor: Option<usize>,
        work_areas: &[WorkAreaArg],
        primary: usize,
        json: bool,
    ) -> Result<(), ZoneSnapError> {
        let work_areas = if work_areas.is_empty() {
            vec![DEFAULT_WORK_AREA]
        } else {
            work_areas.iter().map(|area| area.0).collect()
        };
        if primary >= work_areas.len() {
            return Err(ZoneSnapError::InvalidArguments(format!(
                "Primary monitor {primary} does not exist ({} work areas given).",
                work_areas.len()
            )));
        }

        let layout = MonitorLayout { work_areas, primary };
        let monitor = monitor.or_else(|| layout.monitor_at(point));
        let zones = self.settings().zones;
        let work_area = layout.resolve_work_area(monitor);
        let found = find_target_zone(&zones, point, monitor, &layout);

        if json {
            let value = serde_json::json!({
                "point": point,
                "monitor": monitor,
                "zone": found,
                "rect": found.map(|zone| zone.absolute_rect(&work_area)),
            });
            output::print_json(&value);
            return Ok(());
        }

        let monitor_label = monitor.map_or_else(|| "none".to_string(), |m| m.to_string());
        match found {
            Some(zone) => println!(
                "{} {} on monitor {monitor_label} {}",
                "Zone:".bold(),
                output::zone_label(zone).green(),
                output::format_rect(&zone.absolute_rect(&work_area)).dimmed(),
            ),
            None => println!(
                "{} no zone at ({}, {}) on monitor {monitor_label}",
                "Zone:".bold(),
                point.x,
                point.y
            ),
        }
        Ok(())
    }

    fn execute_simulate(&self, script: &Path, json: bool) -> Result<(), ZoneSnapError> {
        let file = std::fs::File::open(script)?;
        let scenario: Scenario = serde_json::from_reader(json_comments::StripComments::new(file))?;
        if scenario.monitors.is_empty() {
            return Err("Scenario needs at least one monitor.".into());
        }

        let report = run_scenario(&scenario, self.settings());

        if json {
            output::print_json(&serde_json::to_value(&report)?);
        } else {
            print_report(&report);
        }
        Ok(())
    }

    fn execute_init(&self, force: bool) -> Result<(), ZoneSnapError> {
        let path = match &self.config {
            Some(path) => path.clone(),
            None => dirs::home_dir()
                .map(|home| home.join(".config").join(APP_DIR_NAME).join("config.jsonc"))
                .ok_or("Cannot determine the home directory.")?,
        };

        if path.exists() && !force {
            return Err(ZoneSnapError::InvalidArguments(format!(
                "{} already exists. Use --force to overwrite it.",
                path.display()
            )));
        }

        template::create_config_file(&path)?;
        println!("{} {}", "Created".green(), path.display());
        Ok(())
    }
}

// ============================================================================
// Tables
// ============================================================================

#[derive(Tabled)]
struct ZoneRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Monitor")]
    monitor: usize,
    #[tabled(rename = "Offset")]
    offset: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Reachable")]
    reachable: String,
}

fn zone_table(zones: &[Zone]) -> String {
    let rows: Vec<ZoneRow> = zones
        .iter()
        .enumerate()
        .map(|(index, zone)| ZoneRow {
            index,
            name: output::truncate(&output::zone_label(zone), 24),
            monitor: zone.monitor_index,
            offset: format!("{}, {}", zone.x, zone.y),
            size: format!("{}x{}", zone.width, zone.height),
            reachable: output::format_bool(zone.is_reachable()),
        })
        .collect();

    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::right()))
        .with(Modify::new(Columns::new(2..5)).with(Alignment::right()))
        .with(Modify::new(Columns::new(5..6)).with(Alignment::center()))
        .to_string()
}

#[derive(Tabled)]
struct CommandRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Window")]
    window: u64,
    #[tabled(rename = "Command")]
    command: String,
    #[tabled(rename = "Target")]
    target: String,
}

#[derive(Tabled)]
struct WindowRow {
    #[tabled(rename = "Window")]
    id: u64,
    #[tabled(rename = "Frame")]
    frame: String,
    #[tabled(rename = "Zoned")]
    zoned: String,
    #[tabled(rename = "Original")]
    original: String,
}

fn print_report(report: &ScenarioReport) {
    let commands: Vec<CommandRow> = report
        .commands
        .iter()
        .enumerate()
        .map(|(index, command)| match command {
            DesktopCommand::MoveResize { window, rect } => CommandRow {
                index,
                window: *window,
                command: "move-resize".to_string(),
                target: output::format_rect(rect),
            },
            DesktopCommand::Unmaximize { window } => CommandRow {
                index,
                window: *window,
                command: "unmaximize".to_string(),
                target: String::new(),
            },
        })
        .collect();

    println!("{}", format!("Commands ({})", commands.len()).bold());
    if !commands.is_empty() {
        println!("{}", Table::new(commands).with(Style::rounded()));
    }

    let shows = report.overlay_events.iter().filter(|e| matches!(e, OverlayEvent::Show { .. }));
    let hides = report.overlay_events.iter().filter(|e| matches!(e, OverlayEvent::Hide { .. }));
    println!(
        "{} {} shown, {} hidden",
        "Highlights:".bold(),
        shows.count(),
        hides.count()
    );
    for event in &report.overlay_events {
        match event {
            OverlayEvent::Show { monitor, rect } => {
                println!("  {} monitor {monitor} {}", "show".green(), output::format_rect(rect));
            }
            OverlayEvent::Hide { monitor } => println!("  {} monitor {monitor}", "hide".red()),
        }
    }

    let windows: Vec<WindowRow> = report
        .windows
        .iter()
        .map(|window| WindowRow {
            id: window.id,
            frame: output::format_rect(&window.frame),
            zoned: output::format_bool(window.zoned),
            original: window.original_rect.as_ref().map_or_else(String::new, output::format_rect),
        })
        .collect();

    println!("{}", format!("Windows ({})", windows.len()).bold());
    if !windows.is_empty() {
        println!("{}", Table::new(windows).with(Style::rounded()));
    }
}
