use anyhow::Context;
use wallet_vault_core::{FileBackupStore, VaultConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    wallet_vault_core::init();
    let config = VaultConfig::from_env();

    println!("{} {} Configuration:\n", wallet_vault_core::NAME, wallet_vault_core::VERSION);
    println!("{}", config);

    if !config.backup_dir.exists() {
        println!("  Stored Wallets: 0 (directory not created yet)");
        return Ok(());
    }

    let store = FileBackupStore::open(config.backup_dir.clone())
        .await
        .with_context(|| format!("Failed to open backup directory {}", config.backup_dir.display()))?;
    let addresses = wallet_vault_core::BackupStore::list_addresses(&store)
        .await
        .context("Failed to list wallet backups")?;
    println!("  Stored Wallets: {}", addresses.len());
    Ok(())
}
