use campus_server::telemetry::TelemetryError;
use campus_store::{StoreError, pooling::PoolError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to access a file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    ConfigError(#[from] config::ConfigError),
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),
    #[error("Telemetry error: {0}")]
    TelemetryError(#[from] TelemetryError),
    #[error("Other: {0}")]
    Other(#[from] eyre::Report),
}

impl CliError {
    pub fn print_tip(&self) {
        match self {
            CliError::Io(error) => {
                eprintln!("💡 File system error:");
                match error.kind() {
                    std::io::ErrorKind::NotFound => {
                        eprintln!("   • File or directory not found");
                    }
                    std::io::ErrorKind::PermissionDenied => {
                        eprintln!("   • Permission denied - check file permissions");
                    }
                    std::io::ErrorKind::AddrInUse => {
                        eprintln!("   • Address already in use - pick another port with -P");
                    }
                    _ => {
                        eprintln!("   • I/O error: {error}");
                    }
                }
            }
            CliError::ConfigError(error) => {
                eprintln!("⚙️  Configuration error occurred:");
                eprintln!("   • Error details: {error}");
                eprintln!("   • Check configuration/config.yml and the PORT / DATABASE_* variables");
            }
            CliError::StoreError(error) => {
                eprintln!("💡 Document store error:");
                match error {
                    StoreError::NotConfigured => {
                        eprintln!("   • Set DATABASE_URL (a SQLite path or :memory:) and DATABASE_NAME");
                        eprintln!("   • A .env file in the working directory is loaded automatically");
                    }
                    StoreError::Pool(PoolError::Timeout) => {
                        eprintln!("   • Every connection stayed busy, try a larger DATABASE_POOL_SIZE");
                    }
                    StoreError::Database(rusqlite_error) => {
                        eprintln!("   • SQLite reported: {rusqlite_error}");
                        eprintln!("   • Check that DATABASE_URL points to a writable SQLite file");
                    }
                    _ => {
                        eprintln!("   • Error details: {error}");
                    }
                }
            }
            CliError::TelemetryError(error) => {
                eprintln!("💡 Logging could not be initialized:");
                eprintln!("   • Error details: {error}");
            }
            CliError::Other(error) => {
                eprintln!("💡 Unexpected error occurred:");
                eprintln!("   • Error details: {error}");
            }
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::ConfigError(_) | CliError::TelemetryError(_) => 10,
            CliError::Io(_) => 11,
            CliError::StoreError(_) => 12,
            CliError::Other(_) => 99,
        }
    }

    pub fn exit_with_tips(self) -> ! {
        eprintln!("❌ {self}");
        self.print_tip();
        std::process::exit(self.exit_code());
    }
}

pub trait ExitOnError<T> {
    fn or_exit(self) -> T;
}

impl<T> ExitOnError<T> for Result<T, CliError> {
    fn or_exit(self) -> T {
        self.unwrap_or_else(|err| err.exit_with_tips())
    }
}
