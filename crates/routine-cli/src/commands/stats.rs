use chrono::NaiveDate;
use clap::Args;

use super::{day_or_today, open_app, print_json, CliResult};

#[derive(Args)]
pub struct StatsArgs {
    /// Day (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: StatsArgs) -> CliResult {
    let app = open_app()?;
    let stats = app.ledger().daily_stats(day_or_today(args.date));

    if args.json {
        return print_json(&stats);
    }

    println!("{}", stats.date);
    println!("  total:      {}", stats.total);
    println!("  completed:  {}", stats.completed);
    println!("  skipped:    {}", stats.skipped);
    println!("  pending:    {}", stats.pending);
    println!("  completion: {}%", stats.completion_rate);
    for task in &stats.skipped_tasks {
        match &task.reason {
            Some(reason) => println!("  skipped \"{}\": {reason}", task.event.title),
            None => println!("  skipped \"{}\"", task.event.title),
        }
    }
    Ok(())
}
