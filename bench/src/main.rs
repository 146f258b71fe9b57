use std::time::{Duration, Instant};

use anyhow::Result;
use astar_core::grid::{chebyshev_scaled, manhattan_scaled};
use astar_core::{manhattan, search_detailed, Graph, GraphError, Grid, GridError, GridPos, NodeId, NodeInfo};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "astar-bench",
    about = "Time A* corner-to-corner searches on synthetic grids"
)]
struct Args {
    /// Which generator to run.
    #[arg(value_enum, default_value_t = Mode::All)]
    mode: Mode,

    /// Grid side length in cells.
    #[arg(default_value_t = 1000)]
    size: usize,

    /// Seed for the deterministic generators.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Allow diagonal moves (Chebyshev heuristic instead of Manhattan).
    #[arg(long)]
    diagonal: bool,

    /// Searches per grid; the fastest is reported.
    #[arg(long, default_value_t = 3)]
    repeat: u32,

    /// Print results as JSON instead of a table.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Run every generator.
    All,
    /// No obstacles, unit cost.
    Open,
    /// Uniform random walls.
    Obstacles,
    /// Recursive-backtracker maze (long winding corridors).
    Maze,
    /// Random entry costs 1-9 with sparse walls.
    Terrain,
    /// Two rooms joined by a single-cell doorway.
    Barbell,
    /// Weighted ring-lattice adjacency graph with `size * size` nodes.
    Network,
}

type Generator = fn(usize, &mut FastRng) -> Result<Grid, GridError>;

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Report {
    Grid(GridReport),
    Network(NetworkReport),
}

#[derive(Debug, Serialize)]
struct GridReport {
    generator: &'static str,
    width: usize,
    height: usize,
    walls: usize,
    start: GridPos,
    goal: GridPos,
    diagonal: bool,
    found: bool,
    path_len: usize,
    cost: Option<f64>,
    expanded: usize,
    discovered: usize,
    generate_ms: f64,
    search_ms: f64,
}

#[derive(Debug, Serialize)]
struct NetworkReport {
    generator: &'static str,
    nodes: usize,
    edges: usize,
    memory_bytes: usize,
    start: NodeId,
    goal: NodeId,
    found: bool,
    path_len: usize,
    cost: Option<f64>,
    expanded: usize,
    discovered: usize,
    generate_ms: f64,
    search_ms: f64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();
    anyhow::ensure!(args.size >= 2, "size must be at least 2, got {}", args.size);
    anyhow::ensure!(args.repeat >= 1, "repeat must be at least 1");

    let generators: Vec<(&'static str, Generator)> = match args.mode {
        Mode::Open => vec![("open", gen_open)],
        Mode::Obstacles => vec![("obstacles", gen_obstacles)],
        Mode::Maze => vec![("maze", gen_maze)],
        Mode::Terrain => vec![("terrain", gen_terrain)],
        Mode::Barbell => vec![("barbell", gen_barbell)],
        Mode::Network => vec![],
        Mode::All => vec![
            ("open", gen_open as Generator),
            ("obstacles", gen_obstacles),
            ("maze", gen_maze),
            ("terrain", gen_terrain),
            ("barbell", gen_barbell),
        ],
    };

    let mut reports = Vec::with_capacity(generators.len() + 1);
    for (name, generator) in generators {
        reports.push(Report::Grid(run_benchmark(name, generator, &args)?));
    }
    if matches!(args.mode, Mode::All | Mode::Network) {
        reports.push(Report::Network(run_network_benchmark(&args)?));
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            match report {
                Report::Grid(r) => print_report(r),
                Report::Network(r) => print_network_report(r),
            }
        }
    }
    Ok(())
}

fn run_benchmark(name: &'static str, generator: Generator, args: &Args) -> Result<GridReport> {
    tracing::info!(generator = name, size = args.size, seed = args.seed, "generating grid");

    let mut rng = FastRng::new(args.seed);
    let t = Instant::now();
    let grid = generator(args.size, &mut rng)?;
    let generate_time = t.elapsed();

    let start = GridPos::new(0, 0);
    let goal = GridPos::new(grid.width() - 1, grid.height() - 1);
    let min_weight = grid.min_weight().unwrap_or(1.0);

    let mut best = Duration::MAX;
    let mut outcome = None;
    for _ in 0..args.repeat {
        let t = Instant::now();
        let result = if args.diagonal {
            search_detailed(&grid, start, goal, true, chebyshev_scaled(goal, min_weight))
        } else {
            search_detailed(&grid, start, goal, false, manhattan_scaled(goal, min_weight))
        };
        best = best.min(t.elapsed());
        outcome = Some(result);
    }
    let outcome = outcome.ok_or_else(|| anyhow::anyhow!("no search was run"))?;

    tracing::info!(
        generator = name,
        found = outcome.found(),
        expanded = outcome.expanded,
        "search finished"
    );

    Ok(GridReport {
        generator: name,
        width: grid.width(),
        height: grid.height(),
        walls: grid.wall_count(),
        start,
        goal,
        diagonal: args.diagonal,
        found: outcome.found(),
        path_len: outcome.path.len(),
        cost: outcome.cost,
        expanded: outcome.expanded,
        discovered: outcome.discovered,
        generate_ms: generate_time.as_secs_f64() * 1000.0,
        search_ms: best.as_secs_f64() * 1000.0,
    })
}

/// Best-of-N search across the ring from node 0 to the opposite node.
fn run_network_benchmark(args: &Args) -> Result<NetworkReport> {
    let node_count = (args.size * args.size) as u64;
    tracing::info!(generator = "network", nodes = node_count, seed = args.seed, "generating graph");

    let mut rng = FastRng::new(args.seed);
    let t = Instant::now();
    let graph = gen_network(node_count, &mut rng)?;
    let generate_time = t.elapsed();

    let start: NodeId = 0;
    let goal: NodeId = node_count / 2;

    let mut best = Duration::MAX;
    let mut outcome = None;
    for _ in 0..args.repeat {
        let t = Instant::now();
        let result = search_detailed(&graph, start, goal, false, manhattan);
        best = best.min(t.elapsed());
        outcome = Some(result);
    }
    let outcome = outcome.ok_or_else(|| anyhow::anyhow!("no search was run"))?;

    tracing::info!(
        generator = "network",
        found = outcome.found(),
        expanded = outcome.expanded,
        "search finished"
    );

    Ok(NetworkReport {
        generator: "network",
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        memory_bytes: graph.memory_usage(),
        start,
        goal,
        found: outcome.found(),
        path_len: outcome.path.len(),
        cost: outcome.cost,
        expanded: outcome.expanded,
        discovered: outcome.discovered,
        generate_ms: generate_time.as_secs_f64() * 1000.0,
        search_ms: best.as_secs_f64() * 1000.0,
    })
}

fn print_report(r: &GridReport) {
    println!("--- {} ---", r.generator);
    println!(
        "Generated {}x{} in {:.1}ms ({} walls, {:.1}%)",
        r.width,
        r.height,
        r.generate_ms,
        r.walls,
        r.walls as f64 * 100.0 / (r.width * r.height) as f64
    );
    println!(
        "Search ({}, {}) -> ({}, {})",
        r.start.x, r.start.y, r.goal.x, r.goal.y
    );
    print_search_row(r.found, r.path_len, r.cost, r.expanded, r.discovered, r.search_ms);
}

fn print_network_report(r: &NetworkReport) {
    println!("--- {} ---", r.generator);
    println!(
        "Generated in {:.1}ms: {} nodes, {} edges, ~{:.0}MB",
        r.generate_ms,
        r.nodes,
        r.edges,
        r.memory_bytes as f64 / 1_048_576.0
    );
    println!("Search {} -> {}", r.start, r.goal);
    print_search_row(r.found, r.path_len, r.cost, r.expanded, r.discovered, r.search_ms);
}

fn print_search_row(
    found: bool,
    path_len: usize,
    cost: Option<f64>,
    expanded: usize,
    discovered: usize,
    search_ms: f64,
) {
    println!(
        "{:>10} {:>12} {:>12} {:>12} {:>10}",
        "path", "cost", "expanded", "discovered", "time"
    );
    println!("{:->10} {:->12} {:->12} {:->12} {:->10}", "", "", "", "", "");
    match cost {
        Some(cost) if found => println!(
            "{:>10} {:>12.1} {:>12} {:>12} {:>8.1}ms",
            path_len, cost, expanded, discovered, search_ms
        ),
        _ => println!(
            "{:>10} {:>12} {:>12} {:>12} {:>8.1}ms",
            "no path", "-", expanded, discovered, search_ms
        ),
    }
    println!();
}

// ---------------------------------------------------------------------------
// Generators: deterministic for a given seed, start and goal corners kept open
// ---------------------------------------------------------------------------

/// Simple LCG for deterministic, fast pseudo-random numbers.
struct FastRng(u64);

impl FastRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next(&mut self, max: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 33) % max
    }
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

fn open_corners(grid: &mut Grid) -> Result<(), GridError> {
    grid.set_weight(GridPos::new(0, 0), 1.0)?;
    grid.set_weight(GridPos::new(grid.width() - 1, grid.height() - 1), 1.0)
}

fn gen_open(size: usize, _rng: &mut FastRng) -> Result<Grid, GridError> {
    Grid::open(size, size)
}

/// Each cell is a wall with probability 0.25. Below the percolation threshold,
/// so a path usually exists but detours are frequent.
fn gen_obstacles(size: usize, rng: &mut FastRng) -> Result<Grid, GridError> {
    let rows = (0..size)
        .map(|_| {
            (0..size)
                .map(|_| if rng.next_f64() < 0.25 { 0.0 } else { 1.0 })
                .collect::<Vec<f64>>()
        })
        .collect();
    let mut grid = Grid::new(rows)?;
    open_corners(&mut grid)?;
    Ok(grid)
}

/// Maze carved by an iterative recursive backtracker.
///
/// Rooms sit on even coordinates; carving knocks out the wall cell between two
/// rooms. An even `size` is bumped to the next odd value so the far corner is
/// a room.
fn gen_maze(size: usize, rng: &mut FastRng) -> Result<Grid, GridError> {
    let n = size | 1;
    let mut grid = Grid::new(vec![vec![0.0; n]; n])?;
    let rooms = n / 2 + 1;
    let mut visited = vec![false; rooms * rooms];
    let mut stack = vec![(0usize, 0usize)];

    visited[0] = true;
    grid.set_weight(GridPos::new(0, 0), 1.0)?;

    while let Some(&(rx, ry)) = stack.last() {
        let mut options = Vec::with_capacity(4);
        if rx > 0 && !visited[ry * rooms + rx - 1] {
            options.push((rx - 1, ry));
        }
        if rx + 1 < rooms && !visited[ry * rooms + rx + 1] {
            options.push((rx + 1, ry));
        }
        if ry > 0 && !visited[(ry - 1) * rooms + rx] {
            options.push((rx, ry - 1));
        }
        if ry + 1 < rooms && !visited[(ry + 1) * rooms + rx] {
            options.push((rx, ry + 1));
        }

        if options.is_empty() {
            stack.pop();
            continue;
        }

        let (nx, ny) = options[rng.next(options.len() as u64) as usize];
        visited[ny * rooms + nx] = true;
        // The wall between two rooms sits at the midpoint of their cells.
        grid.set_weight(GridPos::new(rx + nx, ry + ny), 1.0)?;
        grid.set_weight(GridPos::new(nx * 2, ny * 2), 1.0)?;
        stack.push((nx, ny));
    }

    Ok(grid)
}

/// Entry costs 1-9 with 10% walls.
fn gen_terrain(size: usize, rng: &mut FastRng) -> Result<Grid, GridError> {
    let rows = (0..size)
        .map(|_| {
            (0..size)
                .map(|_| {
                    if rng.next(10) == 0 {
                        0.0
                    } else {
                        (1 + rng.next(9)) as f64
                    }
                })
                .collect::<Vec<f64>>()
        })
        .collect();
    let mut grid = Grid::new(rows)?;
    open_corners(&mut grid)?;
    Ok(grid)
}

/// Two open rooms split by a wall column with one doorway at mid-height.
///
/// Worst case for the heuristic: it pulls the search straight at the wall, so
/// most of the first room is expanded before the doorway is found.
fn gen_barbell(size: usize, rng: &mut FastRng) -> Result<Grid, GridError> {
    let mut grid = Grid::open(size, size)?;
    let wall_x = size / 2;
    let door_y = size / 4 + rng.next((size / 2).max(1) as u64) as usize;
    for y in 0..size {
        if y != door_y {
            grid.set_wall(GridPos::new(wall_x, y))?;
        }
    }
    open_corners(&mut grid)?;
    Ok(grid)
}

/// Nodes this far apart on the ring share an edge in [`gen_network`].
const RING_REACH: u64 = 4;

/// Ring lattice: each node linked both ways to its `RING_REACH` nearest
/// neighbors on either side, entry costs 1-5.
///
/// A hop moves at most `RING_REACH` positions round the ring and costs at
/// least 1, so `ceil(ring distance / RING_REACH)` never overestimates.
fn gen_network(node_count: u64, rng: &mut FastRng) -> Result<Graph, GraphError> {
    let mut graph = Graph::with_capacity(node_count as usize, (node_count * RING_REACH * 2) as usize);
    let goal = node_count / 2;

    for i in 0..node_count {
        let around = i.abs_diff(goal).min(node_count - i.abs_diff(goal));
        let estimate = around.div_ceil(RING_REACH) as f64;
        graph.add_node(i, NodeInfo::open((1 + rng.next(5)) as f64, estimate))?;
    }

    for i in 0..node_count {
        for j in 1..=RING_REACH.min(node_count.saturating_sub(1) / 2) {
            graph.connect(i, (i + j) % node_count)?;
        }
    }

    Ok(graph)
}
