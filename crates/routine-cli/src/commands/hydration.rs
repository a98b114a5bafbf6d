use clap::Subcommand;
use routine_core::plugins::hydration::HydrationState;

use super::{open_app, CliResult};

#[derive(Subcommand)]
pub enum HydrationAction {
    /// Log water intake
    Add {
        /// Amount in ml
        #[arg(default_value_t = 250)]
        ml: u32,
    },
    /// Reset today's intake
    Reset,
    /// Show intake against the target
    Status,
}

pub fn run(action: HydrationAction) -> CliResult {
    let app = open_app()?;
    let tracker = app
        .hydration()
        .ok_or("hydration plugin is disabled (run `routine plugin enable hydration`)")?;

    let state = match action {
        HydrationAction::Add { ml } => tracker.add(ml)?,
        HydrationAction::Reset => tracker.reset()?,
        HydrationAction::Status => tracker.state()?,
    };
    print_state(&state);
    Ok(())
}

fn print_state(state: &HydrationState) {
    println!(
        "{}ml / {}ml ({}%)",
        state.consumed_ml,
        state.target_ml,
        state.percent()
    );
}
