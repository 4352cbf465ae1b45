//! `state` command handlers: view and edit the dashboard state saved at
//! `AIVIS_STATE_PATH`.

use aivis_core::{AppConfig, DashboardState, GlobalFilters};
use clap::Subcommand;

/// Sub-commands available under `state`.
#[derive(Debug, Subcommand)]
pub enum StateCommands {
    /// Print the saved state
    Show,
    /// Hide a brand from every table
    Exclude { brand: String },
    /// Stop hiding a brand
    Include { brand: String },
    /// Set global filters; flags not given are left alone, "all" clears one
    Filter {
        #[arg(long)]
        provider: Option<String>,
        #[arg(long)]
        prompt: Option<String>,
        #[arg(long)]
        brand: Option<String>,
    },
    /// Focus per-brand metrics on a brand ("all" resets to the run subject)
    Select { brand: String },
    /// Clear filters, exclusions, and the selected brand
    Reset,
}

/// Load, change, and save the dashboard state, then print it.
///
/// # Errors
///
/// Returns an error if the state file cannot be read, parsed, or written.
pub(crate) fn run_state(config: &AppConfig, command: &StateCommands) -> anyhow::Result<()> {
    let path = &config.state_path;
    let mut state = aivis_core::load_dashboard_state(path)?;

    if apply_state_command(&mut state, command) {
        aivis_core::save_dashboard_state(path, &state)?;
        tracing::info!(path = %path.display(), "dashboard state saved");
    }
    print!("{}", serde_yaml::to_string(&state)?);
    Ok(())
}

/// Applies `command` to `state`. Returns `true` when the state changed.
pub(crate) fn apply_state_command(state: &mut DashboardState, command: &StateCommands) -> bool {
    let before = state.clone();
    match command {
        StateCommands::Show => {}
        StateCommands::Exclude { brand } => {
            if !state.excluded_brands.insert(brand) {
                eprintln!("{brand} is already excluded");
            }
        }
        StateCommands::Include { brand } => {
            if !state.excluded_brands.remove(brand) {
                eprintln!("{brand} was not excluded");
            }
        }
        StateCommands::Filter {
            provider,
            prompt,
            brand,
        } => {
            if let Some(p) = provider {
                state.filters.provider = GlobalFilters::parse_selection(p);
            }
            if let Some(p) = prompt {
                state.filters.prompt = GlobalFilters::parse_selection(p);
            }
            if let Some(b) = brand {
                state.filters.brand = GlobalFilters::parse_selection(b);
            }
        }
        StateCommands::Select { brand } => {
            state.selected_brand = GlobalFilters::parse_selection(brand);
        }
        StateCommands::Reset => *state = DashboardState::default(),
    }
    *state != before
}
