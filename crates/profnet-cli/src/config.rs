//! Command line and environment configuration for the `profnet` binary.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use profnet_db::Database;

/// Database name that keeps everything in memory for the session.
pub const IN_MEMORY: &str = ":memory:";

/// Terminal client for the ProfNetwork professional social network.
///
/// The database lives at `<data dir>/<DBNAME>.db`; the data directory comes
/// from `PROFNET_DATA_DIR` and defaults to the working directory.
#[derive(Parser, Debug)]
#[command(name = "profnet", version, about)]
pub struct Args {
    /// Database name, or `:memory:` for a throwaway store
    pub dbname: String,

    /// Port of the database service (reported in the connection banner)
    pub port: u16,

    /// Database user the session runs as
    pub user: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub dbname: String,
    pub port: u16,
    pub user: String,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn from_args_and_env(args: Args) -> Self {
        let data_dir = std::env::var("PROFNET_DATA_DIR").ok().map(PathBuf::from);
        Self::new(args, data_dir)
    }

    pub fn new(args: Args, data_dir: Option<PathBuf>) -> Self {
        Self {
            dbname: args.dbname,
            port: args.port,
            user: args.user,
            data_dir: data_dir.unwrap_or_else(|| PathBuf::from(".")),
        }
    }

    /// File backing the store; `None` for an in-memory one.
    pub fn database_path(&self) -> Option<PathBuf> {
        if self.dbname == IN_MEMORY {
            return None;
        }
        Some(self.data_dir.join(format!("{}.db", self.dbname)))
    }

    pub fn connection_url(&self) -> String {
        let target = match self.database_path() {
            Some(path) => path.display().to_string(),
            None => IN_MEMORY.to_string(),
        };
        format!("sqlite://{}@localhost:{}/{}", self.user, self.port, target)
    }

    pub fn open_database(&self) -> anyhow::Result<Database> {
        let Some(path) = self.database_path() else {
            return Database::open_in_memory();
        };
        std::fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("creating data directory {}", self.data_dir.display()))?;
        Database::open(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(dbname: &str) -> Args {
        Args {
            dbname: dbname.into(),
            port: 5432,
            user: "carol".into(),
        }
    }

    #[test]
    fn positional_arguments_parse() {
        let args = Args::try_parse_from(["profnet", "prof", "5432", "carol"]).unwrap();
        assert_eq!(args.dbname, "prof");
        assert_eq!(args.port, 5432);
        assert_eq!(args.user, "carol");
    }

    #[test]
    fn missing_or_bad_arguments_are_rejected() {
        assert!(Args::try_parse_from(["profnet", "prof", "5432"]).is_err());
        assert!(Args::try_parse_from(["profnet", "prof", "port", "carol"]).is_err());
        assert!(Args::try_parse_from(["profnet", "prof", "70000", "carol"]).is_err());
    }

    #[test]
    fn database_file_lives_in_the_data_dir() {
        let config = Config::new(args("prof"), Some(PathBuf::from("/var/lib/profnet")));
        assert_eq!(
            config.database_path(),
            Some(PathBuf::from("/var/lib/profnet/prof.db"))
        );
        assert_eq!(
            config.connection_url(),
            "sqlite://carol@localhost:5432//var/lib/profnet/prof.db"
        );

        let default_dir = Config::new(args("prof"), None);
        assert_eq!(default_dir.database_path(), Some(PathBuf::from("./prof.db")));
    }

    #[test]
    fn memory_database_has_no_file() {
        let config = Config::new(args(IN_MEMORY), None);
        assert_eq!(config.database_path(), None);
        assert!(config.connection_url().ends_with(":5432/:memory:"));
        config.open_database().unwrap().close().unwrap();
    }

    #[test]
    fn opening_creates_the_data_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("data");
        let config = Config::new(args("prof"), Some(dir.clone()));

        let db = config.open_database().unwrap();
        db.close().unwrap();
        assert!(dir.join("prof.db").exists());
    }
}
