//! Creates a staff account for the operator screens.

use std::error::Error;

use clap::Parser;
use dotenvy::dotenv;

use bidboard_server::auth::hash_password;
use bidboard_server::config::{Config, StoreBackend};
use bidboard_server::db::{PgStore, Store, StoreError};
use bidboard_server::forms::RegistrationForm;
use bidboard_server::init_tracing;
use bidboard_server::models::NewAccount;

#[derive(Debug, Parser)]
#[command(name = "createsuperuser", about = "Create a staff account")]
struct Args {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    password: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    init_tracing();
    let args = Args::parse();

    let config = Config::from_env()?;
    if config.store_backend != StoreBackend::Postgres {
        return Err("staff accounts can only be created in the postgres store".into());
    }

    let form = RegistrationForm {
        username: args.username,
        email: args.email,
        password1: args.password.clone(),
        password2: args.password,
    };
    let valid = form.clean().map_err(|errors| {
        let detail = serde_json::to_string(&errors).unwrap_or_default();
        format!("{errors}: {detail}")
    })?;

    let store = PgStore::connect(&config.database_url, 1).await?;
    let account = NewAccount {
        username: valid.username,
        email: valid.email,
        password_hash: hash_password(&valid.password)?,
        is_staff: true,
    };

    match store.create_account(account, None).await {
        Ok(account) => {
            tracing::info!(account_id = %account.id, username = %account.username, "Staff account created");
            Ok(())
        }
        Err(StoreError::Conflict(_)) => Err("A user with that username already exists.".into()),
        Err(err) => Err(err.into()),
    }
}
