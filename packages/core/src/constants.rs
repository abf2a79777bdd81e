// ABOUTME: Shared constants and application directory resolution
// ABOUTME: Central place for file names and on-disk locations

use std::path::PathBuf;

pub const DATABASE_FILE_NAME: &str = "proposalpilot.db";

/// Returns the ProposalPilot application directory (~/.proposalpilot)
pub fn proposalpilot_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".proposalpilot")
}

/// Returns the default database file path
pub fn database_file() -> PathBuf {
    proposalpilot_dir().join(DATABASE_FILE_NAME)
}
