use anyhow::Result;

use crate::core::db::open_and_initialize;

pub async fn run(db_path: &str) -> Result<()> {
    println!("Initializing db...");
    open_and_initialize(db_path).await?;
    println!("Finished initializing db at {}", db_path);
    Ok(())
}
