use std::env;

use anyhow::{Result, anyhow};
use rustyline::DefaultEditor;

use crate::auth::CredentialStore;
use crate::core::StorageConfig;
use crate::core::db::open_and_initialize;

pub async fn run(identifier: &str, config: &StorageConfig) -> Result<()> {
    let secret = match env::var("ADVISOR_SIGNUP_SECRET") {
        Ok(secret) => secret,
        Err(_) => {
            let mut rl = DefaultEditor::new()?;
            rl.readline("Secret: ")?
        }
    };
    if secret.is_empty() {
        return Err(anyhow!("Secret can not be empty"));
    }

    let db = open_and_initialize(&config.db_path).await?;
    let store = CredentialStore::new(db, config.require_email_identifier);
    store.create_user(identifier, &secret).await?;
    println!("Created account {}", identifier.trim());

    Ok(())
}
