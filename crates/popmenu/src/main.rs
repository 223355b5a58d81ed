//! popmenu - command-line host for the overlay context menu engine
//!
//! Loads configuration, replays a scripted interaction against a recording
//! backend and prints what a window layer would have been told.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info, warn};

use popmenu_core::{
    Appearance, ClickPart, Config, EstimatedLayout, HitTarget, Key, MenuRenderOptions,
    PhysicalRect, Point, RecordingBackend, Session, WindowBounds, logging,
};

/// popmenu - overlay context menu engine
#[derive(Parser, Debug)]
#[command(name = "popmenu", version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (uses XDG lookup if not specified)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print example configuration and exit
    #[arg(long)]
    print_example_config: bool,

    /// Validate configuration and exit (returns non-zero on errors)
    #[arg(long)]
    check_config: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a menu from a JSON options file and replay an interaction
    Render {
        /// Render options as sent by the window layer
        options: PathBuf,

        /// Hover the row with this item id (repeat to walk a submenu chain)
        #[arg(long = "hover", value_name = "ID")]
        hover: Vec<String>,

        /// Click the row with this item id after hovering
        #[arg(long, value_name = "ID")]
        select: Option<String>,

        /// Press Escape after hovering
        #[arg(long, conflicts_with = "select")]
        escape: bool,

        /// Report the system preference as dark
        #[arg(long)]
        system_dark: bool,

        /// Physical pixels per logical unit
        #[arg(long, default_value = "1")]
        scale_factor: f64,

        /// Logical units per CSS pixel
        #[arg(long, default_value = "1")]
        text_scale: f64,
    },
}

/// What the window layer would have received, printed as JSON.
#[derive(Serialize, Debug)]
struct RenderReport {
    shown: bool,
    appearance: Appearance,
    window: Option<WindowBounds>,
    main_region: Option<PhysicalRect>,
    submenu_regions: Vec<PhysicalRect>,
    open_panels: Vec<PanelReport>,
    submissions: Vec<Option<String>>,
}

#[derive(Serialize, Debug)]
struct PanelReport {
    depth: usize,
    position: Point,
    width: f64,
    height: f64,
    scrollable: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    logging::init(args.verbose);

    // --print-example-config needs no config on disk
    if args.print_example_config {
        print!("{}", popmenu_core::config::DEFAULT_CONFIG_TOML);
        return ExitCode::SUCCESS;
    }

    // Load configuration using XDG lookup chain
    // If --config is specified, it must exist and be valid (no fallback)
    let load_result = match Config::find_and_load(args.config.as_deref()) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Some(ref source) = load_result.source {
        info!("Loaded configuration from {:?}", source);
    } else if load_result.used_defaults {
        info!("Using default configuration (no config file found)");
    }

    let config = load_result.config;

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    debug!("Configuration validated successfully");

    if args.check_config {
        if let Some(ref source) = load_result.source {
            println!("Configuration valid: {}", source.display());
        } else {
            println!("Configuration valid (using defaults)");
        }
        if args.verbose > 0 {
            println!("{}", config.summary());
        }
        return ExitCode::SUCCESS;
    }

    let Some(command) = args.command else {
        eprintln!("Error: nothing to do (try `popmenu render <options.json>`)");
        return ExitCode::FAILURE;
    };

    match handle_command(config, command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn handle_command(config: Config, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Render {
            options,
            hover,
            select,
            escape,
            system_dark,
            scale_factor,
            text_scale,
        } => {
            let options = MenuRenderOptions::from_json_file(&options)
                .with_context(|| format!("reading render options from {}", options.display()))?;

            let mut backend = RecordingBackend::with_options(options);
            backend.scale_factor = Ok(scale_factor);
            backend.text_scale = Ok(text_scale);

            let script = Script {
                hover,
                select,
                escape,
            };
            let report = render(config, backend, system_dark, &script)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}

struct Script {
    hover: Vec<String>,
    select: Option<String>,
    escape: bool,
}

/// Drive one session through `script` and collect the report.
fn render(
    config: Config,
    backend: RecordingBackend,
    system_dark: bool,
    script: &Script,
) -> anyhow::Result<RenderReport> {
    let surface = EstimatedLayout::new(config.layout.clone());
    let mut session = Session::new(config, backend, surface).with_system_dark(system_dark);

    let shown = session.load() && session.layout_settled();
    if !shown {
        warn!("No menu options, nothing rendered");
    }

    for id in &script.hover {
        let target = find_row(&session, id)?;
        session.pointer_moved(Some(target));
    }

    // Snapshot before any dismissal hides everything.
    let open_panels = session
        .tree()
        .map(|tree| {
            tree.visible_panels()
                .map(|p| {
                    let size = p.visible_size();
                    PanelReport {
                        depth: p.depth,
                        position: p.position,
                        width: size.width,
                        height: size.height,
                        scrollable: p.has_scroll,
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    if let Some(id) = &script.select {
        let target = find_row(&session, id)?;
        if !session.click(target, ClickPart::Body) {
            warn!("Item {:?} is not selectable", id);
        }
    } else if script.escape {
        session.key_pressed(Key::Escape);
    }

    let backend = session.backend();
    let (main_region, submenu_regions) = match backend.last_regions() {
        Some((main, submenus)) => (Some(main), submenus),
        None => (None, Vec::new()),
    };

    Ok(RenderReport {
        shown,
        appearance: session.appearance(),
        window: backend.last_resize(),
        main_region,
        submenu_regions,
        open_panels,
        submissions: backend.submissions(),
    })
}

fn find_row(
    session: &Session<RecordingBackend, EstimatedLayout>,
    id: &str,
) -> anyhow::Result<HitTarget> {
    match session.tree().and_then(|tree| tree.find_row(id)) {
        Some(target) => Ok(target),
        None => bail!("no menu item with id {:?}", id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use popmenu_core::MenuItem;

    fn backend() -> RecordingBackend {
        RecordingBackend::with_options(MenuRenderOptions {
            items: vec![
                MenuItem::new("open", "Open"),
                MenuItem::new("send", "Send to").with_children(vec![
                    MenuItem::new("desktop", "Desktop"),
                ]),
            ],
            cursor_x: 50.0,
            cursor_y: 50.0,
            ..Default::default()
        })
    }

    fn script(hover: &[&str], select: Option<&str>) -> Script {
        Script {
            hover: hover.iter().map(|s| s.to_string()).collect(),
            select: select.map(str::to_string),
            escape: false,
        }
    }

    #[test]
    fn test_args_parse_render() {
        let args = Args::parse_from([
            "popmenu", "-vv", "render", "menu.json", "--hover", "a", "--hover", "b",
            "--select", "c",
        ]);
        assert_eq!(args.verbose, 2);
        match args.command {
            Some(Command::Render { hover, select, .. }) => {
                assert_eq!(hover, vec!["a", "b"]);
                assert_eq!(select.as_deref(), Some("c"));
            }
            None => panic!("expected render subcommand"),
        }
    }

    #[test]
    fn test_args_reject_select_with_escape() {
        let result = Args::try_parse_from([
            "popmenu", "render", "menu.json", "--select", "a", "--escape",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_render_hover_and_select() {
        let report = render(
            Config::default(),
            backend(),
            false,
            &script(&["send"], Some("desktop")),
        )
        .unwrap();

        assert!(report.shown);
        assert_eq!(report.open_panels.len(), 2);
        assert_eq!(report.submenu_regions.len(), 1);
        assert_eq!(report.submissions, vec![Some("desktop".to_string())]);
    }

    #[test]
    fn test_render_unknown_item_fails() {
        let result = render(Config::default(), backend(), false, &script(&["nope"], None));
        assert!(result.is_err());
    }

    #[test]
    fn test_render_without_options() {
        let report = render(
            Config::default(),
            RecordingBackend::default(),
            true,
            &script(&[], None),
        )
        .unwrap();
        assert!(!report.shown);
        assert!(report.window.is_none());
        assert!(report.submissions.is_empty());
    }
}
