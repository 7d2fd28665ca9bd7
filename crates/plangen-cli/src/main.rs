mod config;
mod export_cmd;
mod extract_cmd;
mod generate_cmd;
mod pages;
mod serve_cmd;
#[cfg(test)]
mod test_util;

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};

use plangen_core::client::GenerationSettings;
use plangen_core::form::FORM_TEMPLATE;

use config::PlangenConfig;
use export_cmd::OutputFormat;

#[derive(Parser)]
#[command(name = "plangen", about = "Weekly lesson log generator")]
struct Cli {
    /// Gemini API key (overrides PLANGEN_API_KEY / GEMINI_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Model name (overrides PLANGEN_MODEL)
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a plangen config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Write a blank form TOML to fill in
    Template {
        /// Output file path (defaults to stdout)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Generate a weekly lesson log from a form file
    Generate {
        /// Path to the form TOML file
        form: PathBuf,
        /// Exemplar document to send along with the prompt
        #[arg(long)]
        exemplar: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value = "html")]
        format: OutputFormat,
        /// Output file path (defaults to stdout, or the export name for doc)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Extract curriculum standards from an exemplar document
    Extract {
        /// Exemplar document (PDF, Word, text or image)
        file: PathBuf,
        /// Form TOML file to merge the standards into
        #[arg(long)]
        form: Option<PathBuf>,
    },
    /// Re-render a saved document JSON without calling the model
    Render {
        /// Path to the document JSON
        document: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value = "html")]
        format: OutputFormat,
        /// Output file path (defaults to stdout, or the export name for doc)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Serve the lesson plan form over HTTP
    Serve {
        /// Address to bind to
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port to listen on
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
    /// Print shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

fn cmd_init(api_key: Option<&str>, model: Option<&str>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        gemini: config::GeminiSection {
            api_key: api_key.map(str::to_string),
            model: Some(
                model
                    .unwrap_or(GenerationSettings::DEFAULT_MODEL)
                    .to_string(),
            ),
            base_url: None,
            temperature: None,
        },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    if let Some(m) = &cfg.gemini.model {
        println!("  gemini.model = {m}");
    }
    match api_key {
        Some(key) if key.len() > 8 => {
            let prefix: String = key.chars().take(4).collect();
            println!("  gemini.api_key = {prefix}...");
        }
        Some(_) => println!("  gemini.api_key = (set)"),
        None => {
            println!();
            println!("No API key stored. Set PLANGEN_API_KEY or rerun with --api-key.");
        }
    }

    Ok(())
}

fn cmd_template(output: Option<&std::path::Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, FORM_TEMPLATE)
                .with_context(|| format!("cannot write template: {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(FORM_TEMPLATE.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let api_key = cli.api_key.as_deref();
    let model = cli.model.as_deref();

    match cli.command {
        Commands::Init { force } => {
            cmd_init(api_key, model, force)?;
        }
        Commands::Template { output } => {
            cmd_template(output.as_deref())?;
        }
        Commands::Generate {
            form,
            exemplar,
            format,
            output,
        } => {
            let resolved = PlangenConfig::resolve(api_key, model)?;
            generate_cmd::run_generate(
                &resolved.client(),
                &form,
                exemplar.as_deref(),
                format,
                output.as_deref(),
            )
            .await?;
        }
        Commands::Extract { file, form } => {
            let resolved = PlangenConfig::resolve(api_key, model)?;
            extract_cmd::run_extract(&resolved.client(), &file, form.as_deref()).await?;
        }
        Commands::Render {
            document,
            format,
            output,
        } => {
            export_cmd::run_render(&document, format, output.as_deref())?;
        }
        Commands::Serve { bind, port } => {
            let resolved = PlangenConfig::resolve(api_key, model)?;
            serve_cmd::run_serve(resolved.client(), &bind, port).await?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "plangen", &mut std::io::stdout());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn generate_defaults_to_html() {
        let cli = Cli::parse_from(["plangen", "generate", "form.toml"]);
        match cli.command {
            Commands::Generate { format, output, .. } => {
                assert_eq!(format, OutputFormat::Html);
                assert!(output.is_none());
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::parse_from([
            "plangen", "render", "doc.json", "--format", "doc", "--api-key", "k",
        ]);
        assert_eq!(cli.api_key.as_deref(), Some("k"));
        assert!(matches!(
            cli.command,
            Commands::Render {
                format: OutputFormat::Doc,
                ..
            }
        ));
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let _lock = test_util::lock_env();
        let tmp = tempfile::TempDir::new().unwrap();
        unsafe { std::env::set_var("XDG_CONFIG_HOME", tmp.path()) };

        cmd_init(Some("secret-key-123"), None, false).unwrap();
        let second = cmd_init(None, None, false);
        cmd_init(None, Some("gemini-2.5-pro"), true).unwrap();
        let loaded = config::load_config().unwrap();
        unsafe { std::env::remove_var("XDG_CONFIG_HOME") };

        assert!(second.unwrap_err().to_string().contains("already exists"));
        assert!(loaded.gemini.api_key.is_none());
        assert_eq!(loaded.gemini.model.as_deref(), Some("gemini-2.5-pro"));
    }

    #[test]
    fn template_writes_form_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("form.toml");
        cmd_template(Some(&path)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), FORM_TEMPLATE);
    }
}
