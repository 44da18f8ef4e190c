use anyhow::Result;

use melee_elo_ranking::cli::{Cli, Command};
use melee_elo_ranking::{
    handle_completions, handle_history, handle_matchups, handle_missing_dates, handle_process,
    handle_rankings, handle_rebuild, handle_report, handle_set_date, interpret, load_config,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let cli = interpret();
    execute_command(&cli)
}

fn execute_command(cli: &Cli) -> Result<()> {
    if let Command::Completions { shell } = &cli.command {
        return handle_completions(*shell);
    }

    let config = load_config(&cli.config)?;
    match &cli.command {
        Command::Process {
            dates,
            no_fetch,
            no_prompt,
        } => handle_process(&config, dates.as_deref(), *no_fetch, *no_prompt),
        Command::Rebuild => handle_rebuild(&config),
        Command::Rankings { limit } => handle_rankings(&config, *limit),
        Command::History { name } => handle_history(&config, name),
        Command::Matchups => handle_matchups(&config),
        Command::MissingDates => handle_missing_dates(&config),
        Command::SetDate {
            tournament_id,
            date,
        } => handle_set_date(&config, *tournament_id, *date),
        Command::Report { output } => handle_report(&config, output.as_deref()),
        Command::Completions { shell } => handle_completions(*shell),
    }
}
