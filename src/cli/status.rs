use crate::db::SqliteStorage;
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::settings::{load_settings, DB_FILE};
use crate::store::TransactionStore;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = std::path::PathBuf::from(&settings.data_dir);
    let db_path = data_dir.join(DB_FILE);

    println!("Data dir:      {}", data_dir.display());
    println!("Database:      {}", db_path.display());

    if db_path.exists() {
        let size = std::fs::metadata(&db_path)?.len();
        println!("DB size:       {}", format_bytes(size));

        let store = TransactionStore::open(SqliteStorage::open_existing(&db_path)?)?;
        println!();
        println!("Transactions:  {}", store.len());
        println!("Categories:    {}", store.categories().len());
        println!("Currency:      {}", store.currency());
    } else {
        println!();
        println!("Database not found. Run `pocketbook init` to set up.");
    }

    Ok(())
}
