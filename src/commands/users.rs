//! Users command - principal management from the shell.

use std::sync::Arc;

use crate::cli::args::{UsersAction, UsersArgs};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{Database, UserStore};
use crate::services::{AuthService, Authenticator};

/// Execute the users command
pub async fn execute(args: UsersArgs, config: Config) -> AppResult<()> {
    let db = Database::connect(&config).await?;
    let auth = Authenticator::new(Arc::new(UserStore::new(db.get_connection())), config);

    match args.action {
        UsersAction::Create {
            username,
            password,
            groups,
        } => {
            let user = auth.create_user(username, password, groups).await?;
            println!("Created user {} ({})", user.username, user.id);
            if !user.groups.is_empty() {
                println!("Groups: {}", user.groups.join(", "));
            }
        }
    }

    Ok(())
}
