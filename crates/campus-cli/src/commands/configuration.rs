use std::{
    fs::{DirBuilder, File, OpenOptions},
    io::{BufRead as _, BufReader, Read, Write},
    path::Path,
};

use config::ConfigError;

use crate::CliError;

const CONFIG_TEMPLATE: &str = r#"# Application Configuration
# PORT, DATABASE_URL, DATABASE_NAME and DATABASE_POOL_SIZE override these values.
app_settings:
  name: "University Website Backend"
  port: "8000"
  host: "0.0.0.0"
db_settings:
  url: "./campus.db"
  name: "university"
  pool_size: "4"
"#;

pub fn create_config_template() -> Result<(), CliError> {
    write_template(Path::new("."))
}

fn write_template(root: &Path) -> Result<(), CliError> {
    let config_dir = root.join("configuration");
    let config_path = config_dir.join("config.yml");
    let gitignore_path = root.join(".gitignore");
    let config_entry = "/configuration";

    if config_path.exists() {
        let mut contents = String::new();
        File::open(&config_path)?.read_to_string(&mut contents)?;
        if !contents.trim().is_empty() {
            return Err(ConfigError::Message(
                "Config file already exists and is not empty. Please remove or rename the existing config.yml file.".to_string()
            ).into());
        }
    }

    DirBuilder::new().recursive(true).create(&config_dir)?;

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&config_path)?;
    file.write_all(CONFIG_TEMPLATE.as_bytes())?;

    if !root.join(".git").exists() {
        println!("ℹ️  Not a Git repository - skipping .gitignore update");
    } else if gitignore_path.exists() {
        let reader = BufReader::new(File::open(&gitignore_path)?);
        let mut found_config_entry = false;
        for line in reader.lines() {
            if line?.trim() == config_entry {
                found_config_entry = true;
                break;
            }
        }

        if found_config_entry {
            println!("ℹ️  /configuration already exists in .gitignore");
        } else {
            let mut contents = String::new();
            File::open(&gitignore_path)?.read_to_string(&mut contents)?;

            let mut gitignore_file = OpenOptions::new().append(true).open(&gitignore_path)?;
            if !contents.ends_with('\n') && !contents.is_empty() {
                writeln!(gitignore_file)?;
            }
            writeln!(gitignore_file, "{config_entry}")?;
            println!("✅ Added /configuration to existing .gitignore");
        }
    } else {
        let mut gitignore_file = File::create(&gitignore_path)?;
        writeln!(gitignore_file, "{config_entry}")?;
        println!("✅ Created .gitignore with /configuration entry");
    }

    println!("✅ config.yml created successfully!");
    Ok(())
}
