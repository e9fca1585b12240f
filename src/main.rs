use clap::Parser;
use miette::Result;
use scanmaster::cli::{Cli, Commands};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    // Reset SIGPIPE so piping into `head` or `grep -q` ends quietly
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    let default_filter = if global.verbose {
        "scanmaster=debug"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Init(args) => scanmaster::cli::commands::init::run(args, &global),
        Commands::Classify(args) => scanmaster::cli::commands::classify::run(args, &global),
        Commands::Part(cmd) => scanmaster::cli::commands::part::run(cmd, &global),
        Commands::Custom(cmd) => scanmaster::cli::commands::custom::run(cmd, &global),
        Commands::Solid(args) => scanmaster::cli::commands::solid::run(args, &global),
        Commands::Validate(args) => scanmaster::cli::commands::validate::run(args, &global),
        Commands::Completions(args) => scanmaster::cli::commands::completions::run(args),
    }
}
