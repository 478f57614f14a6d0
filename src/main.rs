use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use inkstream_backend::config::InkstreamConfig;
use inkstream_backend::database::Database;
use inkstream_backend::telemetry;

#[derive(Parser)]
#[command(author, version, about = "Inkstream backend daemon and admin tools")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (Axum) for REST/API access
    Serve,
    /// Grant the admin role to an existing user
    MakeAdmin {
        /// Email of the account to promote
        email: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    let args = Args::parse();
    let config = InkstreamConfig::from_env()?;
    let database = Database::connect(&config.paths)?;
    if database.ensure_migrations()? {
        tracing::info!(db_path = %config.paths.db_path.display(), "created new database");
    }

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => inkstream_backend::api::serve_http(config, database).await,
        Command::MakeAdmin { email } => make_admin(&database, &email),
    }
}

fn make_admin(database: &Database, email: &str) -> Result<()> {
    use inkstream_backend::database::repositories::UserRepository;

    let promoted = database.with_repositories(|repos| {
        let users = repos.users();
        let Some(user) = users.find_by_email_or_username(email)? else {
            return Ok(None);
        };
        users.set_role(&user.id, "admin")?;
        Ok(Some(user))
    })?;

    match promoted {
        Some(user) => {
            tracing::info!(user_id = %user.id, email, "user promoted to admin");
            println!("{} is now an admin", user.email);
            Ok(())
        }
        None => bail!("no user found for {email}"),
    }
}
