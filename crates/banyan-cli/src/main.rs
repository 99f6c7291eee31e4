use banyan::{Frame, LayoutConfig, NodeKey, Record, Renderer, Tree, Variant};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Layout(banyan::Error),
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

impl From<banyan::Error> for CliError {
    fn from(value: banyan::Error) -> Self {
        Self::Layout(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Layout,
    Crossings,
    Generate,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    config: Option<String>,
    preset: Option<LayoutConfig>,
    variant: Option<Variant>,
    seed: Option<u64>,
    canvas: Option<(f64, f64)>,
    snapshots: Option<usize>,
    nodes: Option<usize>,
    max_children: usize,
}

fn usage() -> &'static str {
    "banyan-cli\n\
\n\
USAGE:\n\
  banyan-cli [layout] [--config <path>|--preset basic|layered|radial] [--variant monolithic|layered] [--seed <n>] [--canvas <w>x<h>] [--snapshots <every>] [--pretty] [<path>|-]\n\
  banyan-cli crossings [<path>|-]\n\
  banyan-cli generate --nodes <n> [--max-children <k>] [--seed <n>] [--pretty]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - Input is a JSON array of {\"id\": ..., \"parent\": ...} records; ids are strings or integers.\n\
  - crossings expects every record to also carry \"x\" and \"y\".\n\
  - --snapshots prints one JSON line per frame before the final layout line.\n\
  - Set BANYAN_LOG (e.g. BANYAN_LOG=debug) to see solver progress on stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        command: Command::Layout,
        max_children: 3,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" => args.command = Command::Layout,
            "crossings" => args.command = Command::Crossings,
            "generate" => args.command = Command::Generate,
            "--pretty" => args.pretty = true,
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--preset" => {
                let Some(name) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.preset = Some(LayoutConfig::preset(name).ok_or(CliError::Usage(usage()))?);
            }
            "--variant" => {
                let Some(v) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.variant = Some(match v.trim().to_ascii_lowercase().as_str() {
                    "monolithic" => Variant::Monolithic,
                    "layered" => Variant::Layered,
                    _ => return Err(CliError::Usage(usage())),
                });
            }
            "--seed" => {
                let Some(seed) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.seed = Some(seed.parse::<u64>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--canvas" => {
                let Some(size) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.canvas = Some(parse_canvas(size).ok_or(CliError::Usage(usage()))?);
            }
            "--snapshots" => {
                let Some(every) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let every = every
                    .parse::<usize>()
                    .map_err(|_| CliError::Usage(usage()))?;
                if every == 0 {
                    return Err(CliError::Usage(usage()));
                }
                args.snapshots = Some(every);
            }
            "--nodes" => {
                let Some(n) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.nodes = Some(n.parse::<usize>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--max-children" => {
                let Some(k) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.max_children = k.parse::<usize>().map_err(|_| CliError::Usage(usage()))?;
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    if args.config.is_some() && args.preset.is_some() {
        return Err(CliError::Usage(usage()));
    }
    if matches!(args.command, Command::Generate) && args.nodes.is_none() {
        return Err(CliError::Usage(usage()));
    }

    Ok(args)
}

fn parse_canvas(raw: &str) -> Option<(f64, f64)> {
    let (w, h) = raw.trim().split_once(['x', 'X'])?;
    let w = w.trim().parse::<f64>().ok()?;
    let h = h.trim().parse::<f64>().ok()?;
    (w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0).then_some((w, h))
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
    let mut out = std::io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut out, value)?;
    } else {
        serde_json::to_writer(&mut out, value)?;
    }
    writeln!(out)?;
    Ok(())
}

fn load_config(args: &Args) -> Result<LayoutConfig, CliError> {
    let mut config = match (&args.config, &args.preset) {
        (Some(path), _) => serde_json::from_str::<LayoutConfig>(&std::fs::read_to_string(path)?)?,
        (None, Some(preset)) => preset.clone(),
        (None, None) => LayoutConfig::default(),
    };
    if let Some(variant) = args.variant {
        config.variant = variant;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some((w, h)) = args.canvas {
        config.canvas_width = w;
        config.canvas_height = h;
    }
    Ok(config)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotOut<'a> {
    iteration: usize,
    phase: banyan::Phase,
    depth: usize,
    positions: Vec<(&'a NodeKey, banyan::Position)>,
    edges: Vec<(&'a NodeKey, &'a NodeKey)>,
}

/// Writes one JSON line per frame to stdout. Only revealed nodes and their edges are included.
#[derive(Default)]
struct SnapshotWriter {
    error: Option<CliError>,
}

impl Renderer for SnapshotWriter {
    fn frame(&mut self, frame: &Frame<'_>) {
        if self.error.is_some() {
            return;
        }
        let tree = frame.tree;
        let mut on_board = vec![false; tree.len()];
        for idx in frame.board {
            on_board[idx.index()] = true;
        }
        let out = SnapshotOut {
            iteration: frame.iteration,
            phase: frame.phase,
            depth: frame.depth,
            positions: frame
                .board
                .iter()
                .map(|&idx| {
                    let position = banyan::Position::from(tree.position(idx));
                    (tree.node(idx).id(), position)
                })
                .collect(),
            edges: frame
                .edges
                .iter()
                .filter(|(_, child)| on_board[child.index()])
                .map(|&(parent, child)| (tree.node(parent).id(), tree.node(child).id()))
                .collect(),
        };
        if let Err(err) = write_json(&out, false) {
            self.error = Some(err);
        }
    }
}

#[derive(Deserialize)]
struct PlacedRecord {
    #[serde(flatten)]
    record: Record,
    x: f64,
    y: f64,
}

fn count_placed_crossings(placed: &[PlacedRecord]) -> Result<usize, CliError> {
    let records: Vec<Record> = placed.iter().map(|p| p.record.clone()).collect();
    let mut tree = Tree::from_records(&records)?;
    for p in placed {
        if let Some(idx) = tree.get(&p.record.id) {
            tree.set_position(idx, banyan::geom::point(p.x, p.y));
        }
    }
    Ok(banyan::count_crossings(&tree))
}

fn run(args: Args) -> Result<(), CliError> {
    match args.command {
        Command::Layout => {
            let config = load_config(&args)?;
            tracing::debug!(
                variant = ?config.variant,
                seed = config.seed,
                snapshots = ?args.snapshots,
                "layout config loaded"
            );
            let text = read_input(args.input.as_deref())?;
            let records: Vec<Record> = serde_json::from_str(&text)?;
            let layout = match args.snapshots {
                Some(every) => {
                    let mut writer = SnapshotWriter::default();
                    let layout = banyan::layout_with(&records, &config, &mut writer, every)?;
                    if let Some(err) = writer.error {
                        return Err(err);
                    }
                    layout
                }
                None => banyan::layout(&records, &config)?,
            };
            write_json(&layout, args.pretty && args.snapshots.is_none())
        }
        Command::Crossings => {
            let text = read_input(args.input.as_deref())?;
            let placed: Vec<PlacedRecord> = serde_json::from_str(&text)?;
            write_json(&count_placed_crossings(&placed)?, false)
        }
        Command::Generate => {
            let nodes = args.nodes.ok_or(CliError::Usage(usage()))?;
            let records =
                banyan::generate::random_records(nodes, args.max_children, args.seed.unwrap_or(1))?;
            write_json(&records, args.pretty)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("BANYAN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
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
