use paddock::table::{links_from_csv, links_from_json_str};
use paddock::{
    DEFAULT_FRAME_STEPS, ForceLayout, ForceLayoutOptions, Graph, InitialPositions, LayoutResult,
    NodeId, Snapshot,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::io::Read;
use std::str::FromStr;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Layout(paddock::Error),
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

impl From<paddock::Error> for CliError {
    fn from(value: paddock::Error) -> Self {
        Self::Layout(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputFormat {
    Csv,
    Json,
}

impl FromStr for InputFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

#[derive(Debug)]
struct Args {
    input: Option<String>,
    format: Option<InputFormat>,
    no_headers: bool,
    steps: usize,
    seed: Option<u64>,
    options: ForceLayoutOptions,
    trace: bool,
    pretty: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            input: None,
            format: None,
            no_headers: false,
            steps: DEFAULT_FRAME_STEPS,
            seed: None,
            options: ForceLayoutOptions::default(),
            trace: false,
            pretty: false,
        }
    }
}

// Positions are a list rather than a map: `1` and `"1"` are different nodes but would share
// a JSON object key.
#[derive(Serialize)]
struct FrameOut<'a> {
    nodes: Vec<&'a NodeId>,
    positions: Vec<NodePosition<'a>>,
}

#[derive(Serialize)]
struct NodePosition<'a> {
    node: &'a NodeId,
    x: f64,
    y: f64,
}

#[derive(Serialize)]
struct TraceOut<'a> {
    nodes: Vec<&'a NodeId>,
    steps: Vec<Snapshot>,
}

enum Output {
    Frame(LayoutResult<NodeId>),
    Trace(Vec<Snapshot>),
}

#[derive(Debug, Default, Clone)]
struct Timings {
    read: std::time::Duration,
    aggregate: std::time::Duration,
    operator: std::time::Duration,
    layout: std::time::Duration,
    output: std::time::Duration,
}

fn usage() -> &'static str {
    "paddock\n\
\n\
USAGE:\n\
  paddock [--format csv|json] [--no-headers] [--steps <n>] [--seed <n>] [--initial-speed <v>] [--final-speed <v>] [--trace] [--pretty] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - Rows are source,target[,weight]. Without a weight column duplicate rows are counted.\n\
  - --format defaults to json for *.json paths and csv otherwise; CSV input has a header row unless --no-headers.\n\
  - Prints the final positions as JSON; --trace prints every step instead.\n\
  - Set PADDOCK_TIMING=1 to print a timing breakdown to stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "--no-headers" => args.no_headers = true,
            "--trace" => args.trace = true,
            "--pretty" => args.pretty = true,
            "--format" => {
                let Some(fmt) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.format = Some(
                    fmt.parse::<InputFormat>()
                        .map_err(|_| CliError::Usage(usage()))?,
                );
            }
            "--steps" => {
                let Some(steps) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.steps = steps.parse::<usize>().map_err(|_| CliError::Usage(usage()))?;
            }
            "--seed" => {
                let Some(seed) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.seed = Some(seed.parse::<u64>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--initial-speed" => {
                let Some(v) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.options.initial_speed = parse_speed(v)?;
            }
            "--final-speed" => {
                let Some(v) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.options.final_speed = parse_speed(v)?;
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
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn parse_speed(v: &str) -> Result<f64, CliError> {
    let speed = v.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
    if !(speed.is_finite() && speed >= 0.0) {
        return Err(CliError::Usage(usage()));
    }
    Ok(speed)
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

fn input_format(args: &Args) -> InputFormat {
    if let Some(fmt) = args.format {
        return fmt;
    }
    match args.input.as_deref() {
        Some(path) if path.to_ascii_lowercase().ends_with(".json") => InputFormat::Json,
        _ => InputFormat::Csv,
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

fn frame_positions<'a>(
    nodes: &[&'a NodeId],
    frame: &LayoutResult<NodeId>,
) -> Vec<NodePosition<'a>> {
    nodes
        .iter()
        .filter_map(|&node| {
            let p = frame.get(node)?;
            Some(NodePosition {
                node,
                x: p.x,
                y: p.y,
            })
        })
        .collect()
}

fn run(args: Args) -> Result<(), CliError> {
    let timing_enabled = std::env::var("PADDOCK_TIMING").ok().as_deref() == Some("1");
    let mut timings = Timings::default();

    let read_start = timing_enabled.then(std::time::Instant::now);
    let text = read_input(args.input.as_deref())?;
    let links = match input_format(&args) {
        InputFormat::Csv => links_from_csv(text.as_bytes(), !args.no_headers)?,
        InputFormat::Json => links_from_json_str(&text)?,
    };
    if let Some(s) = read_start {
        timings.read = s.elapsed();
    }

    let aggregate_start = timing_enabled.then(std::time::Instant::now);
    let rows = links.len();
    let graph = Graph::from_links(links);
    if let Some(s) = aggregate_start {
        timings.aggregate = s.elapsed();
    }

    let operator_start = timing_enabled.then(std::time::Instant::now);
    let layout = ForceLayout::with_options(&graph, args.options)?;
    if let Some(s) = operator_start {
        timings.operator = s.elapsed();
    }

    let nodes: Vec<&NodeId> = graph.nodes().iter().collect();
    let start = InitialPositions::random();

    let layout_start = timing_enabled.then(std::time::Instant::now);
    let output = if args.trace {
        let run = match args.seed {
            Some(seed) => {
                layout.run_with_rng(args.steps, start, &mut StdRng::seed_from_u64(seed))?
            }
            None => layout.run_from(args.steps, start)?,
        };
        Output::Trace(run.collect())
    } else {
        Output::Frame(match args.seed {
            Some(seed) => {
                layout.frame_with_rng(args.steps, start, &mut StdRng::seed_from_u64(seed))?
            }
            None => layout.frame_from(args.steps, start)?,
        })
    };
    if let Some(s) = layout_start {
        timings.layout = s.elapsed();
    }

    let output_start = timing_enabled.then(std::time::Instant::now);
    match output {
        Output::Frame(frame) => {
            let positions = frame_positions(&nodes, &frame);
            write_json(&FrameOut { nodes, positions }, args.pretty)?
        }
        Output::Trace(steps) => write_json(&TraceOut { nodes, steps }, args.pretty)?,
    }
    if let Some(s) = output_start {
        timings.output = s.elapsed();
    }

    if timing_enabled {
        eprintln!(
            "[paddock-timing] read={:?} aggregate={:?} operator={:?} layout={:?} output={:?} rows={} links={} nodes={} steps={}",
            timings.read,
            timings.aggregate,
            timings.operator,
            timings.layout,
            timings.output,
            rows,
            graph.len(),
            graph.nodes().len(),
            args.steps,
        );
    }

    Ok(())
}

fn main() {
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
