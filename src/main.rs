use std::cell::Cell;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::rc::Rc;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rasterboard::api::{ApiError, Authority, HttpAuthority, MutationReply};
use rasterboard::consts::DEFAULT_COLOR;
use rasterboard::input::InputEvent;
use rasterboard::render::{self, Pixmap};
use rasterboard::scene::Pos;
use rasterboard::session::Controller;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("api call failed: {0}")]
    Api(#[from] ApiError),
    #[error("io failure: {0}")]
    Io(#[from] io::Error),
    #[error("invalid JSON input: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid arguments: {0}")]
    Args(String),
}

#[derive(Parser, Debug)]
#[command(name = "rasterboard", about = "Remote drawing-authority client CLI")]
struct Cli {
    #[arg(long, env = "RASTERBOARD_BASE_URL", default_value = "http://127.0.0.1:5000")]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the current scene snapshot as JSON.
    Points,
    /// Print the authority's structured scene dump as JSON.
    Scene,
    /// Render the current scene to a PPM image.
    Snapshot(SnapshotArgs),
    /// Move a shape by a pixel delta.
    Translate { id: String, dx: i64, dy: i64 },
    /// Rotate a shape about a pivot, theta in radians.
    Rotate { id: String, theta: f64, cx: i64, cy: i64 },
    /// Scale a shape about a pivot.
    Scale { id: String, sx: f64, sy: f64, cx: i64, cy: i64 },
    /// Revert the last committed batch or shape.
    Undo,
    /// Empty the scene.
    Clear,
    /// Create a line.
    Line(LineArgs),
    /// Create an axis-aligned rectangle from two corners.
    Rect(LineArgs),
    /// Create the circle through three points.
    Circle(CircleArgs),
    /// Create the circular arc through three points.
    Arc(CircleArgs),
    /// Create a Bézier curve from control points given as x y pairs.
    Bezier(CurveArgs),
    /// Create a B-spline from control points given as x y pairs.
    Bspline(BsplineArgs),
    /// Create a closed polygon from vertices given as x y pairs.
    Polygon(CurveArgs),
    /// Clip a shape to the axis-aligned rectangle spanned by two corners.
    ClipRect { id: String, x1: i64, y1: i64, x2: i64, y2: i64 },
    /// Flood-fill from a seed point.
    Fill(FillArgs),
    /// Replay a JSONL pointer-event stream through the drag controller.
    Gesture(GestureArgs),
}

#[derive(Args, Debug)]
struct SnapshotArgs {
    #[arg(long, default_value = "canvas.ppm")]
    output: String,

    #[arg(long, default_value_t = 800)]
    width: u32,

    #[arg(long, default_value_t = 600)]
    height: u32,
}

#[derive(Args, Debug)]
struct LineArgs {
    x1: i64,
    y1: i64,
    x2: i64,
    y2: i64,

    #[arg(long, default_value = DEFAULT_COLOR)]
    color: String,

    #[arg(long, default_value_t = 1)]
    width: u32,
}

#[derive(Args, Debug)]
struct CircleArgs {
    x1: i64,
    y1: i64,
    x2: i64,
    y2: i64,
    x3: i64,
    y3: i64,

    #[arg(long, default_value = DEFAULT_COLOR)]
    color: String,

    #[arg(long, default_value_t = 1)]
    width: u32,
}

#[derive(Args, Debug)]
struct CurveArgs {
    /// Flat coordinate list: x1 y1 x2 y2 ...
    #[arg(required = true, num_args = 4..)]
    coords: Vec<i64>,

    #[arg(long, default_value = DEFAULT_COLOR)]
    color: String,

    #[arg(long, default_value_t = 1)]
    width: u32,
}

#[derive(Args, Debug)]
struct BsplineArgs {
    /// Flat coordinate list: x1 y1 x2 y2 ...
    #[arg(required = true, num_args = 4..)]
    coords: Vec<i64>,

    #[arg(long, default_value_t = 3)]
    degree: u32,

    #[arg(long, default_value = DEFAULT_COLOR)]
    color: String,

    #[arg(long, default_value_t = 1)]
    width: u32,
}

#[derive(Args, Debug)]
struct FillArgs {
    x: i64,
    y: i64,

    #[arg(long, default_value = DEFAULT_COLOR)]
    color: String,

    #[arg(long, default_value_t = 4)]
    connectivity: u8,

    #[arg(long, default_value_t = 800)]
    width: u32,

    #[arg(long, default_value_t = 600)]
    height: u32,
}

#[derive(Args, Debug)]
struct GestureArgs {
    #[arg(long, default_value = "-", help = "Input file path, or - for stdin")]
    input: String,

    #[arg(long, help = "Pick tolerance in pixels (default 12)")]
    threshold: Option<f64>,

    #[arg(long, help = "Render the final scene to this PPM path")]
    render: Option<String>,

    #[arg(long, help = "Render dimensions as used with --render")]
    render_width: Option<u32>,

    #[arg(long, help = "Render dimensions as used with --render")]
    render_height: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let authority = HttpAuthority::new(cli.base_url);

    match cli.command {
        Command::Points => run_points(&authority).await,
        Command::Scene => {
            let scene = authority.scene_state().await?;
            let rendered = serde_json::to_string_pretty(&scene)?;
            println!("{rendered}");
            Ok(())
        }
        Command::Snapshot(args) => run_snapshot(authority, args).await,
        Command::Translate { id, dx, dy } => {
            print_reply(authority.translate(&id, dx, dy).await?)
        }
        Command::Rotate { id, theta, cx, cy } => {
            print_reply(authority.rotate(&id, theta, Pos::new(cx, cy)).await?)
        }
        Command::Scale { id, sx, sy, cx, cy } => {
            print_reply(authority.scale(&id, sx, sy, Pos::new(cx, cy)).await?)
        }
        Command::Undo => {
            let points = authority.undo().await?;
            eprintln!("undo applied; scene now has {} points", points.len());
            Ok(())
        }
        Command::Clear => {
            let points = authority.clear().await?;
            eprintln!("scene cleared; {} points remain", points.len());
            Ok(())
        }
        Command::Line(args) => {
            let points = authority
                .add_line(Pos::new(args.x1, args.y1), Pos::new(args.x2, args.y2), &args.color, args.width)
                .await?;
            eprintln!("line created; scene now has {} points", points.len());
            Ok(())
        }
        Command::Rect(args) => {
            let points = authority
                .add_rect(Pos::new(args.x1, args.y1), Pos::new(args.x2, args.y2), &args.color, args.width)
                .await?;
            eprintln!("rectangle created; scene now has {} points", points.len());
            Ok(())
        }
        Command::Circle(args) => {
            let points = authority
                .add_circle(
                    Pos::new(args.x1, args.y1),
                    Pos::new(args.x2, args.y2),
                    Pos::new(args.x3, args.y3),
                    &args.color,
                    args.width,
                )
                .await?;
            eprintln!("circle created; scene now has {} points", points.len());
            Ok(())
        }
        Command::Arc(args) => {
            let points = authority
                .add_arc(
                    Pos::new(args.x1, args.y1),
                    Pos::new(args.x2, args.y2),
                    Pos::new(args.x3, args.y3),
                    &args.color,
                    args.width,
                )
                .await?;
            eprintln!("arc created; scene now has {} points", points.len());
            Ok(())
        }
        Command::Bezier(args) => {
            let control = parse_pairs(&args.coords, 2)?;
            let points = authority.add_bezier(&control, &args.color, args.width).await?;
            eprintln!("bezier created; scene now has {} points", points.len());
            Ok(())
        }
        Command::Bspline(args) => {
            let control = parse_pairs(&args.coords, 2)?;
            let points = authority
                .add_bspline(&control, args.degree, &args.color, args.width)
                .await?;
            eprintln!("b-spline created; scene now has {} points", points.len());
            Ok(())
        }
        Command::Polygon(args) => {
            let vertices = parse_pairs(&args.coords, 3)?;
            let points = authority.add_polygon(&vertices, &args.color, args.width).await?;
            eprintln!("polygon created; scene now has {} points", points.len());
            Ok(())
        }
        Command::ClipRect { id, x1, y1, x2, y2 } => {
            print_reply(authority.clip_rect(&id, Pos::new(x1, y1), Pos::new(x2, y2)).await?)
        }
        Command::Fill(args) => {
            let reply = authority
                .fill(Pos::new(args.x, args.y), &args.color, args.connectivity, args.width, args.height)
                .await?;
            match reply.fill_id {
                Some(fill_id) => eprintln!("fill {fill_id} created; scene now has {} points", reply.points.len()),
                None => eprintln!("fill created; scene now has {} points", reply.points.len()),
            }
            Ok(())
        }
        Command::Gesture(args) => run_gesture(authority, args).await,
    }
}

async fn run_points(authority: &HttpAuthority) -> Result<(), CliError> {
    let points = authority.get_points().await?;
    let rendered = serde_json::to_string_pretty(&points)?;
    println!("{rendered}");
    Ok(())
}

async fn run_snapshot(authority: HttpAuthority, args: SnapshotArgs) -> Result<(), CliError> {
    let mut controller = Controller::new(authority);
    controller.refresh().await?;

    let mut pixmap = Pixmap::new(args.width, args.height);
    render::paint(&mut pixmap, controller.store().state());

    let mut file = File::create(&args.output)?;
    pixmap.write_ppm(&mut file)?;
    file.flush()?;
    eprintln!("wrote {}x{} snapshot to {}", args.width, args.height, args.output);
    Ok(())
}

async fn run_gesture(authority: HttpAuthority, args: GestureArgs) -> Result<(), CliError> {
    let mut controller = Controller::new(authority);
    if let Some(threshold) = args.threshold {
        controller.set_pick_threshold(threshold);
    }

    // Count repaint notifications the way a real surface would receive them.
    let repaints = Rc::new(Cell::new(0_usize));
    let counter = Rc::clone(&repaints);
    controller.store_mut().subscribe(move |_| counter.set(counter.get() + 1));

    controller.refresh().await?;

    let mut reader: Box<dyn BufRead> = if args.input == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(File::open(&args.input)?))
    };

    let mut processed = 0_usize;
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let event = serde_json::from_str::<InputEvent>(trimmed)?;
        controller.handle(event).await;
        processed += 1;
    }

    eprintln!(
        "gesture replay complete: events={} repaints={} shapes={}",
        processed,
        repaints.get(),
        controller.store().state().shapes.len()
    );

    if let Some(path) = args.render {
        let mut pixmap = Pixmap::new(args.render_width.unwrap_or(800), args.render_height.unwrap_or(600));
        render::paint(&mut pixmap, controller.store().state());
        let mut file = File::create(&path)?;
        pixmap.write_ppm(&mut file)?;
        file.flush()?;
        eprintln!("wrote final scene to {path}");
    }
    Ok(())
}

fn parse_pairs(coords: &[i64], min_points: usize) -> Result<Vec<Pos>, CliError> {
    if coords.len() % 2 != 0 {
        return Err(CliError::Args("coordinates must come in x y pairs".to_owned()));
    }
    let points: Vec<Pos> = coords.chunks(2).map(|pair| Pos::new(pair[0], pair[1])).collect();
    if points.len() < min_points {
        return Err(CliError::Args(format!("need at least {min_points} points")));
    }
    Ok(points)
}

fn print_reply(reply: MutationReply) -> Result<(), CliError> {
    match reply {
        MutationReply::Points(points) => {
            eprintln!("transform applied; scene now has {} points", points.len());
        }
        MutationReply::Ack { ok } => {
            eprintln!("transform acknowledged: ok={ok}");
        }
    }
    Ok(())
}
