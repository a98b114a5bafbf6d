use clap::Subcommand;
use routine_core::HookPoint;

use super::{open_app, print_json, CliResult};

#[derive(Subcommand)]
pub enum PluginAction {
    /// List registered plugins
    List {
        #[arg(long)]
        json: bool,
    },
    /// Enable a plugin
    Enable { id: String },
    /// Disable a plugin
    Disable { id: String },
    /// Toggle a plugin
    Toggle { id: String },
    /// Render an enabled plugin's widget
    Widget { id: String },
    /// Show which plugins handle each hook point
    Hooks {
        /// Hook point name (e.g. before-event-add)
        point: Option<String>,
    },
}

pub fn run(action: PluginAction) -> CliResult {
    let mut app = open_app()?;

    match action {
        PluginAction::List { json } => {
            let summaries = app.plugins().summaries();
            if json {
                return print_json(&summaries);
            }
            for p in &summaries {
                let state = if p.enabled { "on " } else { "off" };
                println!("[{state}] {:<12} {}: {}", p.id, p.name, p.description);
            }
        }
        PluginAction::Enable { id } => {
            if !app.plugins().is_registered(&id) {
                println!("no plugin with id {id}");
            } else if app.plugins_mut().enable(&id, false)? {
                println!("enabled {id}");
            } else {
                println!("{id} is already enabled");
            }
        }
        PluginAction::Disable { id } => {
            if !app.plugins().is_registered(&id) {
                println!("no plugin with id {id}");
            } else if app.plugins_mut().disable(&id, false)? {
                println!("disabled {id}");
            } else {
                println!("{id} is already disabled");
            }
        }
        PluginAction::Toggle { id } => {
            if !app.plugins().is_registered(&id) {
                println!("no plugin with id {id}");
                return Ok(());
            }
            let enabled = app.plugins_mut().toggle(&id)?;
            println!("{id}: {}", if enabled { "enabled" } else { "disabled" });
        }
        PluginAction::Widget { id } => match app.plugins().widget(&id) {
            Some(widget) => println!("{}", widget.render()?),
            None => println!("{id} has no active widget"),
        },
        PluginAction::Hooks { point } => {
            let points = match point {
                None => HookPoint::ALL.to_vec(),
                Some(name) => match name.parse::<HookPoint>() {
                    Ok(point) => vec![point],
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring unknown hook point");
                        Vec::new()
                    }
                },
            };
            for point in points {
                let owners = app.pipeline().handlers_for(point);
                println!("{point}: {}", owners.join(", "));
            }
        }
    }
    Ok(())
}
