use clap::{Parser, Subcommand, ValueEnum};
use procfg::desc::ProcessDesc;
use procfg::process::Process;
use procfg::render::{self, Format, PrintOptions};
use procfg::sink::RecordingSink;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "procfg")]
#[command(about = "Assemble and render process configurations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Legacy `process NAME = { ... }` grammar.
    Config,
    /// Source re-emission grammar.
    Python,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a process description in one of the output grammars.
    Dump {
        #[arg(long)]
        desc: String,

        #[arg(long, value_enum, default_value = "config")]
        format: OutputFormat,

        /// Spaces per nesting level.
        #[arg(long, default_value = "4")]
        indent: usize,

        #[arg(short = 'o', long)]
        out: Option<String>,
    },
    /// Place the process into a recording sink and write what it received as JSON.
    Emit {
        #[arg(long)]
        desc: String,

        #[arg(short = 'o', long)]
        out: Option<String>,
    },
    /// Print the per-path module dependency tables as JSON.
    Deps {
        #[arg(long)]
        desc: String,
    },
}

fn load(desc: &str) -> Result<Process> {
    use anyhow::Context;

    let text = std::fs::read_to_string(desc).with_context(|| format!("failed to read {}", desc))?;
    let process = ProcessDesc::from_json(&text)?
        .validate_and_build()
        .with_context(|| format!("invalid process description {}", desc))?;
    info!(process = process.name(), "loaded {}", desc);
    Ok(process)
}

fn write_out(out: Option<&str>, text: &str) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, text)?;
            info!("wrote {}", path);
        }
        None => print!("{}", text),
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Dump {
            desc,
            format,
            indent,
            out,
        } => {
            let process = load(&desc)?;
            let format = match format {
                OutputFormat::Config => Format::Config,
                OutputFormat::Python => Format::Source,
            };
            let options = PrintOptions::default().with_indent_step(indent);
            let text = render::render_process(&process, format, &options)?;
            write_out(out.as_deref(), &text)?;
        }
        Commands::Emit { desc, out } => {
            let process = load(&desc)?;
            let mut sink = RecordingSink::new();
            process.insert_into(&mut sink)?;
            info!(registrations = sink.registrations.len(), "placed process");
            let mut json = serde_json::to_string_pretty(&sink)?;
            json.push('\n');
            write_out(out.as_deref(), &json)?;
        }
        Commands::Deps { desc } => {
            let process = load(&desc)?;
            let deps = process.validate_dependencies()?;
            println!("{}", serde_json::to_string_pretty(&deps)?);
        }
    }

    Ok(())
}
