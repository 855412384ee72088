use clap::Parser;
use repograph::cli::{BuildArgs, Cli, Command};
use repograph::{cmd_build, cmd_init, cmd_serve};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Some(Command::Build(args)) => cmd_build(args),
        Some(Command::Serve(args)) => cmd_serve(args),
        Some(Command::Init(args)) => cmd_init(args),
        None => {
            let args = BuildArgs {
                path: cli.path,
                ..Default::default()
            };
            cmd_build(args)
        }
    };

    std::process::exit(exit_code);
}
