use crate::report::ReportFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Get the default data directory for equipment-summary
/// Uses platform-specific data directories:
/// - Linux: ~/.local/share/equipment-summary
/// - macOS: ~/Library/Application Support/equipment-summary
/// - Windows: %APPDATA%/equipment-summary
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir().map(|p| p.join("equipment-summary")).unwrap_or_else(|| PathBuf::from(".equipment-summary"))
}

#[derive(Parser, Debug, Clone)]
#[command(name = "equipment-summary")]
#[command(about = "Summarize chemical equipment CSV uploads and render PDF reports")]
#[command(version)]
pub struct CliArgs {
    /// User whose history is read or written
    /// Default: $EQUIPMENT_SUMMARY_USER, then the login name ($USER / $USERNAME)
    #[arg(long, short = 'u', global = true, value_name = "NAME")]
    pub user: Option<String>,

    /// Directory holding history state and retained uploads
    /// Default: $EQUIPMENT_SUMMARY_DATA_DIR, then ~/.local/share/equipment-summary (Linux)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Override console width for table output (default: auto-detect)
    #[arg(long, global = true, value_name = "COLUMNS")]
    pub console_width: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Validate and summarize a CSV file, adding it to your history
    Upload {
        /// CSV file with Equipment Name, Type, Flowrate, Pressure, Temperature columns
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Record the upload under this filename instead of the file's own name
        #[arg(long, value_name = "NAME")]
        name: Option<String>,

        /// Also print every parsed row
        #[arg(long)]
        show_rows: bool,

        /// Output the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// List your most recent uploads, newest first
    History {
        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one summary from your history
    Show {
        /// Summary id (full id or the 8-character prefix shown by `history`)
        #[arg(value_name = "ID")]
        id: String,

        /// Output the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a report for one summary
    Report {
        /// Summary id (full id or the 8-character prefix shown by `history`)
        #[arg(value_name = "ID")]
        id: String,

        /// Report format
        #[arg(long, value_enum, default_value = "pdf")]
        format: ReportFormat,

        /// Output path (default: report_<id>.<ext> in the current directory)
        #[arg(long, short = 'o', value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Delete one summary and its retained upload
    Delete {
        /// Summary id (full id or the 8-character prefix shown by `history`)
        #[arg(value_name = "ID")]
        id: String,
    },
}

impl CliArgs {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        CliArgs::parse()
    }

    /// Validate argument combinations
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref user) = self.user
            && user.trim().is_empty()
        {
            return Err("--user must not be empty".to_string());
        }

        if let Some(width) = self.console_width
            && width < 40
        {
            return Err(format!("--console-width must be at least 40 (got {})", width));
        }

        match &self.command {
            Command::Upload { file, name, .. } => {
                if file.as_os_str().is_empty() {
                    return Err("Upload needs a file path".to_string());
                }
                if let Some(name) = name
                    && name.trim().is_empty()
                {
                    return Err("--name must not be empty".to_string());
                }
            }
            Command::Show { id, .. } | Command::Report { id, .. } | Command::Delete { id } => {
                if id.trim().is_empty() {
                    return Err("A summary id is required".to_string());
                }
            }
            Command::History { .. } => {}
        }

        Ok(())
    }

    /// Should output use terminal colors?
    pub fn use_colors(&self) -> bool {
        !self.no_color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(command: Command) -> CliArgs {
        CliArgs { user: Some("alice".to_string()), data_dir: None, no_color: true, console_width: None, command }
    }

    #[test]
    fn test_parse_upload() {
        let args = CliArgs::try_parse_from(["equipment-summary", "--user", "bob", "upload", "plant.csv", "--show-rows"])
            .expect("parses");

        assert_eq!(args.user.as_deref(), Some("bob"));
        assert_eq!(
            args.command,
            Command::Upload { file: PathBuf::from("plant.csv"), name: None, show_rows: true, json: false }
        );
    }

    #[test]
    fn test_parse_report_defaults_to_pdf() {
        let args = CliArgs::try_parse_from(["equipment-summary", "report", "1234abcd"]).expect("parses");
        match args.command {
            Command::Report { id, format, output } => {
                assert_eq!(id, "1234abcd");
                assert_eq!(format, ReportFormat::Pdf);
                assert!(output.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = CliArgs::try_parse_from(["equipment-summary", "history", "--json", "--user", "carol", "--no-color"])
            .expect("parses");
        assert_eq!(args.user.as_deref(), Some("carol"));
        assert!(!args.use_colors());
        assert_eq!(args.command, Command::History { json: true });
    }

    #[test]
    fn test_validate_empty_user_fails() {
        let mut a = args(Command::History { json: false });
        a.user = Some("  ".to_string());
        assert!(a.validate().is_err());
    }

    #[test]
    fn test_validate_narrow_console_fails() {
        let mut a = args(Command::History { json: false });
        a.console_width = Some(10);
        assert!(a.validate().is_err());
    }

    #[test]
    fn test_validate_blank_id_fails() {
        assert!(args(Command::Delete { id: " ".to_string() }).validate().is_err());
        assert!(args(Command::Show { id: "abcd1234".to_string(), json: false }).validate().is_ok());
    }

    #[test]
    fn test_validate_valid_upload_succeeds() {
        let a = args(Command::Upload { file: PathBuf::from("x.csv"), name: None, show_rows: false, json: false });
        assert!(a.validate().is_ok());
    }
}
