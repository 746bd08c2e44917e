use clap::Parser;

use frame_stitch::cli::{self, Args, Command, RunArgs};

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let config_path = args.config.as_deref();
    let result = match args.command {
        Some(Command::Formats) => {
            cli::list_formats();
            Ok(())
        }
        Some(Command::Config { action }) => cli::handle_config_action(action, config_path),
        Some(Command::Run(run_args)) => cli::run(config_path, &run_args).map(|_| ()),
        None => cli::run(config_path, &RunArgs::default()).map(|_| ()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
