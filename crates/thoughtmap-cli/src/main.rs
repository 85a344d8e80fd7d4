use serde::Serialize;
use std::io::Read;
use thoughtmap::expand::{ExpandRequest, ExpandResponse, expansion_prompt};
use thoughtmap::{Elements, LayoutConfig, LayoutOptions, RankDir, layouted_elements};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "THOUGHTMAP_LOG";

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Layout(thoughtmap::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Layout(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<thoughtmap::Error> for CliError {
    fn from(value: thoughtmap::Error) -> Self {
        Self::Layout(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy)]
enum Command {
    Layout,
    Ideas,
    Prompt,
}

#[derive(Debug, Default)]
struct Args {
    command: Option<Command>,
    input: Option<String>,
    pretty: bool,
    config: Option<String>,
    rankdir: Option<RankDir>,
    context: Option<String>,
    question: Option<String>,
}

fn usage() -> &'static str {
    "thoughtmap-cli\n\
\n\
USAGE:\n\
  thoughtmap-cli layout [--pretty] [--config <path>] [--rankdir TB|BT|LR|RL] [<path>|-]\n\
  thoughtmap-cli ideas [--pretty] [<path>|-]\n\
  thoughtmap-cli prompt --context <text> --question <text>\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - layout reads {\"nodes\": [...], \"edges\": [...]} and prints the nodes with a top-left position.\n\
  - --config names a JSON object merged over the default layout config; --rankdir wins over it.\n\
  - ideas reads raw model text and prints {\"ideas\": [...]}.\n\
  - Set THOUGHTMAP_LOG (e.g. debug) to see layout diagnostics on stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" if args.command.is_none() => args.command = Some(Command::Layout),
            "ideas" if args.command.is_none() => args.command = Some(Command::Ideas),
            "prompt" if args.command.is_none() => args.command = Some(Command::Prompt),
            "--pretty" => args.pretty = true,
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--rankdir" => {
                let Some(dir) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.rankdir = Some(
                    dir.parse::<RankDir>()
                        .map_err(|_| CliError::Usage(usage()))?,
                );
            }
            "--context" => {
                let Some(text) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.context = Some(text.clone());
            }
            "--question" => {
                let Some(text) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.question = Some(text.clone());
            }
            other if other.starts_with("--") => return Err(CliError::Usage(usage())),
            other => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(other.to_string());
            }
        }
    }

    match args.command {
        None => return Err(CliError::Usage(usage())),
        Some(Command::Prompt) if args.context.is_none() || args.question.is_none() => {
            return Err(CliError::Usage(usage()));
        }
        _ => {}
    }
    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn layout_options(args: &Args) -> Result<LayoutOptions, CliError> {
    let mut cfg = match args.config.as_deref() {
        Some(path) => LayoutConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => LayoutConfig::default(),
    };
    if let Some(dir) = args.rankdir {
        cfg.set_value("rankdir", serde_json::json!(dir.as_str()));
    }
    Ok(LayoutOptions::from_config(&cfg)?)
}

fn run(args: Args) -> Result<(), CliError> {
    match args.command {
        Some(Command::Layout) => {
            let options = layout_options(&args)?;
            let text = read_input(args.input.as_deref())?;
            let elements: Elements = serde_json::from_str(&text)?;
            tracing::debug!(
                nodes = elements.nodes.len(),
                edges = elements.edges.len(),
                "read elements"
            );
            let out = layouted_elements(elements.nodes, elements.edges, &options)?;
            write_json(&out, args.pretty)
        }
        Some(Command::Ideas) => {
            let text = read_input(args.input.as_deref())?;
            write_json(&ExpandResponse::from_raw(&text), args.pretty)
        }
        Some(Command::Prompt) => {
            let req = ExpandRequest {
                context: args.context.unwrap_or_default(),
                question: args.question.unwrap_or_default(),
            };
            print!("{}", expansion_prompt(&req));
            Ok(())
        }
        None => Err(CliError::Usage(usage())),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_tracing();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
