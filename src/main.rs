use clap::Parser;
use ledgervault::cli::commands;
use ledgervault::cli::{output, Cli, Commands};
use ledgervault::LedgerVaultError;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the diagnostic log filter.
const LOG_ENV: &str = "LEDGERVAULT_LOG";

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(&cli),
        Commands::List => commands::list::execute(&cli),
        Commands::Create { ref name } => commands::create::execute(&cli, name),
        Commands::Rename { id, ref name } => commands::rename::execute(&cli, id, name),
        Commands::Delete { id, force } => commands::delete::execute(&cli, id, force),
        Commands::Show { id } => commands::show::execute(&cli, id),
        Commands::Import { id, ref file } => commands::import_cmd::execute(&cli, id, file),
        Commands::Export {
            id,
            output: ref dest,
        } => commands::export::execute(&cli, id, dest.as_deref()),
        Commands::RotateKey => commands::rotate::execute(&cli),
        Commands::Status => commands::status::execute(&cli),
        Commands::Settings {
            fail_attempts,
            lockout_retries,
        } => commands::settings_cmd::execute(&cli, fail_attempts, lockout_retries),
        Commands::Completions { ref shell } => commands::completions::execute(shell),
        #[cfg(feature = "audit-log")]
        Commands::Audit { last, ref since } => {
            commands::audit_cmd::execute(&cli, last, since.as_deref())
        }
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        if matches!(e, LedgerVaultError::VaultDestroyed) {
            output::tip("Run `ledgervault init` to start a new vault store.");
        }
        std::process::exit(1);
    }
}
