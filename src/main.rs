use clap::Parser;
use crypthub::cli::commands::{add::AddArgs, update::UpdateArgs};
use crypthub::cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => crypthub::cli::commands::init::execute(&cli),
        Commands::List { show_secrets } => {
            crypthub::cli::commands::list::execute(&cli, show_secrets)
        }
        Commands::Add {
            ref label,
            ref username,
            ref category,
            ref notes,
            generate,
        } => crypthub::cli::commands::add::execute(
            &cli,
            &AddArgs {
                label,
                username: username.as_deref(),
                category: category.as_deref(),
                notes: notes.as_deref(),
                generate,
            },
        ),
        Commands::Update {
            id,
            ref label,
            ref username,
            ref category,
            ref notes,
            new_secret,
            generate,
        } => crypthub::cli::commands::update::execute(
            &cli,
            &UpdateArgs {
                id,
                label: label.as_deref(),
                username: username.as_deref(),
                category: category.as_deref(),
                notes: notes.as_deref(),
                new_secret,
                generate,
            },
        ),
        Commands::Delete { id, force } => {
            crypthub::cli::commands::delete::execute(&cli, id, force)
        }
        Commands::Export { ref output } => {
            crypthub::cli::commands::export::execute(&cli, output.as_deref())
        }
        Commands::Import { ref file, force } => {
            crypthub::cli::commands::import_cmd::execute(&cli, file, force)
        }
        Commands::Generate { length, no_symbols } => {
            crypthub::cli::commands::generate::execute(&cli, length, no_symbols)
        }
        Commands::Audit { last, ref since } => {
            crypthub::cli::commands::audit_cmd::execute(&cli, last, since.as_deref())
        }
        Commands::Completions { ref shell } => crypthub::cli::commands::completions::execute(shell),
    };

    if let Err(e) = result {
        crypthub::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
