use clap::{Parser, Subcommand};
use sitekit_mcp::Result;
use sitekit_mcp::commands::{ServerKind, eval, serve};
use sitekit_mcp::config::{Config, show_config};

#[derive(Parser)]
#[command(name = "sitekit-mcp")]
#[command(about = "MCP servers for arithmetic, prompt templates, and sitemap analysis")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage fetch configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Start an MCP server on stdio
    Serve {
        /// Which server to run
        #[arg(value_enum)]
        server: ServerKind,
    },
    /// Evaluate an arithmetic operation directly
    Eval {
        /// Operation name (add, subtract, multiply, divide, power, modulo)
        method: String,
        /// Numeric arguments
        #[arg(required = true, num_args = 1..)]
        args: Vec<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                let config = Config::load()?;
                config.save()?;
                let path = Config::config_file_path()?;
                println!("Wrote configuration to {}", path.display());
            }
        }
        Commands::Serve { server } => {
            serve(server).await?;
        }
        Commands::Eval { method, args } => {
            eval(&method, &args)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn cli_parsing() {
        let cli = Cli::try_parse_from(["sitekit-mcp", "serve", "calculator"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Serve { server } = parsed.command {
                assert_eq!(server, ServerKind::Calculator);
            }
        }
    }

    #[test]
    fn serve_requires_known_server() {
        let cli = Cli::try_parse_from(["sitekit-mcp", "serve", "spreadsheet"]);
        assert!(cli.is_err());
    }

    #[test]
    fn eval_command_parses_numbers() {
        let cli = Cli::try_parse_from(["sitekit-mcp", "eval", "add", "1", "2.5", "3"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Eval { method, args } = parsed.command {
                assert_eq!(method, "add");
                assert_eq!(args, vec![1.0, 2.5, 3.0]);
            }
        }
    }

    #[test]
    fn eval_requires_arguments() {
        let cli = Cli::try_parse_from(["sitekit-mcp", "eval", "add"]);
        assert!(cli.is_err());
    }

    #[test]
    fn config_show_flag() {
        let cli = Cli::try_parse_from(["sitekit-mcp", "config", "--show"]);
        assert!(cli.is_ok());

        if let Ok(parsed) = cli {
            if let Commands::Config { show } = parsed.command {
                assert!(show);
            }
        }
    }

    #[test]
    fn invalid_command() {
        let cli = Cli::try_parse_from(["sitekit-mcp", "invalid"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
        }
    }

    #[test]
    fn help_message() {
        let cli = Cli::try_parse_from(["sitekit-mcp", "--help"]);
        assert!(cli.is_err());

        if let Err(err) = cli {
            assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        }
    }
}
