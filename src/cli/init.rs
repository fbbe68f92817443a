use std::path::PathBuf;

use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{load_settings, save_settings, shellexpand_path, DB_FILE};

pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    let data_path = PathBuf::from(&settings.data_dir);

    std::fs::create_dir_all(&data_path)?;
    std::fs::create_dir_all(data_path.join("exports"))?;
    save_settings(&settings)?;

    let db_path = data_path.join(DB_FILE);
    let conn = get_connection(&db_path)?;
    init_db(&conn)?;

    println!("Initialized pocketbook at {}", data_path.display());
    Ok(())
}
