//! # Pokémon Matrix Widget Host
//!
//! This binary plays the part of the home screen: it runs scheduled updates
//! for widget instances, delivers taps, and writes each widget face to a PNG
//! file. It also supports a development mode (ASCII output) and an offline
//! transform of a local sprite file.

// Test modules
#[cfg(test)]
mod tests;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{ArgGroup, Parser, Subcommand};
use pokemon_matrix_lib::{
    cache::DailyCache,
    config::{parse_color, Config},
    daily,
    dot_matrix::{self, DotMatrixParams},
    pager::Tap,
    pokeapi::PokeApiClient,
    refresh::RefreshSettings,
    renderer::{draw_ascii, render_face},
    state::StateStore,
    widget::{handle_tap, update_widgets, WidgetView},
};
use std::path::{Path, PathBuf};

/// Daily Pokémon widget rendered as dot-matrix art
#[derive(Parser, Debug)]
#[command(name = "pokemon-matrix-widget")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = pokemon_matrix_lib::config::CONFIG_FILE)]
    config: PathBuf,

    /// Use this date instead of today (YYYY-MM-DD)
    #[arg(short, long, global = true)]
    date: Option<NaiveDate>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Refresh today's Pokémon and redraw widget instances
    Update {
        /// Widget instance ids to redraw
        #[arg(short, long = "widget", default_values_t = [1])]
        widgets: Vec<u32>,

        /// Output PNG path; with several widgets the id is appended to the file stem
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print the widget to the terminal instead of writing a PNG
        #[arg(long)]
        stdout: bool,
    },

    /// Deliver a tap to one widget instance
    ///
    /// A tap never fetches. Each invocation starts with an empty image cache,
    /// so the image page shows "NO IMAGE" until the next `update`.
    #[command(group(ArgGroup::new("direction").required(true).args(["next", "prev"])))]
    Tap {
        /// Widget instance id
        #[arg(short, long, default_value_t = 1)]
        widget: u32,

        /// Bottom tap: next page
        #[arg(long)]
        next: bool,

        /// Top tap: previous page
        #[arg(long)]
        prev: bool,

        /// Output PNG path
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print the widget to the terminal instead of writing a PNG
        #[arg(long)]
        stdout: bool,
    },

    /// Print the date and the Pokédex number of the day
    Today,

    /// Convert a local sprite file to dot-matrix art
    Render {
        /// Source image
        #[arg(short, long)]
        input: PathBuf,

        /// Destination PNG
        #[arg(short, long)]
        out: PathBuf,

        /// Grid columns and rows
        #[arg(long, num_args = 2, value_names = ["WIDTH", "HEIGHT"])]
        grid: Option<Vec<u32>>,

        /// Pixels per grid cell
        #[arg(long)]
        cell: Option<u32>,

        /// Nearest-neighbour scale of the result
        #[arg(long)]
        scale: Option<f32>,
    },
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Config::load_from_path(&cli.config);
    let today = cli.date.unwrap_or_else(|| Local::now().date_naive());

    match cli.command {
        Command::Update {
            widgets,
            out,
            stdout,
        } => {
            let settings = RefreshSettings::from_config(&config)?;
            let client = PokeApiClient::new(&config.api)?;
            let cache = DailyCache::new();
            let mut store = StateStore::open(&config.state.path);

            // Create Tokio runtime for async operations
            let rt = tokio::runtime::Runtime::new()?;
            let views = rt.block_on(update_widgets(
                &client, &cache, &mut store, today, &settings, &widgets,
            ))?;

            let several = views.len() > 1;
            for view in &views {
                let path = out
                    .as_deref()
                    .map(|p| output_path(p, view.widget_id, several))
                    .unwrap_or_else(|| default_output(view.widget_id));
                present(view, &config, &settings.params, stdout, &path)?;
            }
        }

        Command::Tap {
            widget,
            next,
            prev: _,
            out,
            stdout,
        } => {
            let settings = RefreshSettings::from_config(&config)?;
            let today_id = daily::select_id(today, settings.max_id)?;
            let cache = DailyCache::new();
            let mut store = StateStore::open(&config.state.path);

            let tap = if next { Tap::Next } else { Tap::Prev };
            let view = handle_tap(&cache, &mut store, widget, tap, today, today_id);
            let path = out.unwrap_or_else(|| default_output(widget));
            present(&view, &config, &settings.params, stdout, &path)?;
        }

        Command::Today => {
            let id = daily::select_id(today, config.selection.max_id)?;
            println!("{} #{:03}", today, id);
        }

        Command::Render {
            input,
            out,
            grid,
            cell,
            scale,
        } => {
            let mut params = config.render.params()?;
            if let Some([width, height]) = grid.as_deref().and_then(|g| <[u32; 2]>::try_from(g).ok()) {
                params.grid_width = width;
                params.grid_height = height;
            }
            if let Some(cell) = cell {
                params.cell_size = cell;
            }
            let scale = scale.unwrap_or(config.render.output_scale);

            let bytes = std::fs::read(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let sprite = dot_matrix::decode_sprite(&bytes)?;
            let art = dot_matrix::render_scaled(&sprite, &params, scale)?;
            dot_matrix::save_png(&art, &out)?;
            log::info!(
                "Wrote {}x{} dot-matrix image to {}",
                art.width(),
                art.height(),
                out.display()
            );
        }
    }

    Ok(())
}

/// Show a widget view in the terminal or write its face to `path`.
fn present(
    view: &WidgetView,
    config: &Config,
    params: &DotMatrixParams,
    stdout: bool,
    path: &Path,
) -> anyhow::Result<()> {
    // Development mode: ASCII output for testing
    if stdout {
        draw_ascii(view, params);
        return Ok(());
    }

    let background = parse_color(&config.render.background)?;
    let face = render_face(view, config.display.width, config.display.height, background);
    dot_matrix::save_png(&face, path).with_context(|| format!("writing {}", path.display()))?;
    log::info!(
        "Widget {} ({:?} page) written to {}",
        view.widget_id,
        view.page,
        path.display()
    );
    Ok(())
}

fn default_output(widget_id: u32) -> PathBuf {
    PathBuf::from(format!("widget-{}.png", widget_id))
}

/// `out` as given for a single widget, `stem-<id>.ext` when there are several.
fn output_path(out: &Path, widget_id: u32, several: bool) -> PathBuf {
    if !several {
        return out.to_path_buf();
    }
    let stem = out
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "widget".to_string());
    let ext = out
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "png".to_string());
    out.with_file_name(format!("{}-{}.{}", stem, widget_id, ext))
}
