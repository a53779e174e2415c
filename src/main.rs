use std::f32::consts::TAU;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use stepviz::graph::{Graph, Point};
use stepviz::list::{LineProgram, LinkedList, ListSearch};
use stepviz::playback::{Mode, PlaybackConfig, Player, Stepper, DEFAULT_INTERVAL_MS};
use stepviz::pseudocode::Listing;
use stepviz::traversal::{Bfs, Dfs, Frontier, Traversal};
use stepviz::tree::{BinaryTree, BstStepper, TreeWalk, WalkOrder};
use stepviz::util::{parse_csv, parse_edges};
use stepviz::{StepError, Tick};

#[derive(Parser, Debug)]
#[command(
    name = "stepviz",
    about = "Step through textbook algorithms one pseudocode line at a time"
)]
struct Cli {
    /// Log stepper internals (same as RUST_LOG=stepviz=debug).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone, Copy)]
struct PlaybackArgs {
    /// Milliseconds between ticks (100..=1200).
    #[arg(long, default_value_t = DEFAULT_INTERVAL_MS)]
    interval_ms: u64,
    /// Sleep between ticks instead of printing the whole run at once.
    #[arg(long)]
    realtime: bool,
    /// Stop after this many ticks.
    #[arg(long, default_value_t = 10_000)]
    max_ticks: usize,
}

#[derive(Args, Debug)]
struct GraphArgs {
    /// Number of nodes, ids 0..N.
    #[arg(long)]
    nodes: usize,
    /// Edges such as "0-1,1-2".
    #[arg(long, default_value = "")]
    edges: String,
    /// Treat edges as directed u -> v.
    #[arg(long)]
    directed: bool,
    /// Start node.
    #[arg(long, default_value_t = 0)]
    start: usize,
    #[command(flatten)]
    playback: PlaybackArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Breadth-first traversal.
    Bfs(GraphArgs),
    /// Depth-first traversal (explicit stack).
    Dfs(GraphArgs),
    /// Binary search tree operations.
    Bst {
        /// Keys inserted in order, such as "5,3,8,1,4".
        #[arg(long, default_value = "")]
        keys: String,
        #[command(subcommand)]
        op: BstOp,
        #[command(flatten)]
        playback: PlaybackArgs,
    },
    /// Linked list operations.
    List {
        /// Initial values front to back, such as "4,9,2".
        #[arg(long, default_value = "")]
        values: String,
        /// Maintain back links.
        #[arg(long)]
        doubly: bool,
        #[command(subcommand)]
        op: ListOp,
        #[command(flatten)]
        playback: PlaybackArgs,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum OrderArg {
    In,
    Pre,
    Post,
}

impl From<OrderArg> for WalkOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::In => WalkOrder::In,
            OrderArg::Pre => WalkOrder::Pre,
            OrderArg::Post => WalkOrder::Post,
        }
    }
}

#[derive(Subcommand, Debug)]
enum BstOp {
    /// Walk the tree with an explicit frame stack.
    Walk {
        #[arg(value_enum, default_value_t = OrderArg::In)]
        order: OrderArg,
    },
    /// Search for a key.
    Search { key: i64 },
    /// Insert a key.
    Insert { key: i64 },
    /// Delete a key.
    Delete { key: i64 },
}

#[derive(Subcommand, Debug)]
enum ListOp {
    /// Find the first index holding a value.
    Search { value: i64 },
    /// Insert a value at an index (0..=len).
    Insert { index: usize, value: i64 },
    /// Remove the first node holding a value.
    Remove { value: i64 },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Bfs(args) => run_traversal::<Bfs>(args)?,
        Commands::Dfs(args) => run_traversal::<Dfs>(args)?,
        Commands::Bst { keys, op, playback } => run_bst(&keys, op, playback)?,
        Commands::List {
            values,
            doubly,
            op,
            playback,
        } => run_list(&values, doubly, op, playback)?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "stepviz=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_traversal<T>(args: GraphArgs) -> Result<()>
where
    T: TraversalCli,
{
    let mut graph = Graph::with_orientation(args.directed);
    for i in 0..args.nodes {
        let angle = TAU * i as f32 / args.nodes.max(1) as f32;
        graph.add_node(Point::new(angle.cos(), angle.sin()));
    }
    let edges = parse_edges(&args.edges).context("failed to parse --edges")?;
    for (u, v) in edges {
        graph
            .add_edge(u, v)
            .with_context(|| format!("cannot add edge {u}-{v}"))?;
    }

    let mut stepper = T::fresh();
    stepper
        .init_on(&graph, args.start)
        .with_context(|| format!("cannot start at node {}", args.start))?;

    let mut player = Player::new(graph, stepper, playback_config(args.playback)?);
    drive(&mut player, args.playback.realtime)?;

    let order = player.stepper().visit_order();
    println!("order: {order:?}");
    Ok(())
}

/// Bridges the two traversal aliases to the generic runner
trait TraversalCli: Stepper<Model = Graph> {
    fn fresh() -> Self;
    fn init_on(&mut self, graph: &Graph, start: usize) -> Result<(), StepError>;
    fn visit_order(&self) -> Vec<usize>;
}

impl<F: Frontier> TraversalCli for Traversal<F> {
    fn fresh() -> Self {
        Traversal::new()
    }

    fn init_on(&mut self, graph: &Graph, start: usize) -> Result<(), StepError> {
        self.init(graph, start)
    }

    fn visit_order(&self) -> Vec<usize> {
        self.order().to_vec()
    }
}

fn run_bst(keys: &str, op: BstOp, playback: PlaybackArgs) -> Result<()> {
    let keys = parse_csv(keys).context("failed to parse --keys")?;
    let tree = BinaryTree::from_keys(keys);
    let config = playback_config(playback)?;

    let tree = match op {
        BstOp::Walk { order } => {
            let walk = TreeWalk::start(&tree, order.into());
            let mut player = Player::new(tree, walk, config);
            drive(&mut player, playback.realtime)?;
            println!("output: {:?}", player.stepper().output());
            player.into_parts().0
        }
        BstOp::Search { key } => run_bst_stepper(BstStepper::search(&tree, key), tree, config, playback)?,
        BstOp::Insert { key } => run_bst_stepper(BstStepper::insert(&tree, key), tree, config, playback)?,
        BstOp::Delete { key } => run_bst_stepper(BstStepper::delete(&tree, key), tree, config, playback)?,
    };

    println!("in-order: {:?}", tree.in_order());
    Ok(())
}

fn run_bst_stepper(
    stepper: BstStepper,
    tree: BinaryTree,
    config: PlaybackConfig,
    playback: PlaybackArgs,
) -> Result<BinaryTree> {
    let mut player = Player::new(tree, stepper, config);
    drive(&mut player, playback.realtime)?;
    Ok(player.into_parts().0)
}

fn run_list(values: &str, doubly: bool, op: ListOp, playback: PlaybackArgs) -> Result<()> {
    let values = parse_csv(values).context("failed to parse --values")?;
    let mut list = LinkedList::from_values(values);
    list.set_doubly(doubly);
    let config = playback_config(playback)?;

    let list = match op {
        ListOp::Search { value } => {
            let search = ListSearch::start(&list, value);
            let mut player = Player::new(list, search, config);
            drive(&mut player, playback.realtime)?;
            player.into_parts().0
        }
        ListOp::Insert { index, value } => {
            let program = LineProgram::insert(&list, index, value)
                .with_context(|| format!("cannot insert at index {index}"))?;
            let mut player = Player::new(list, program, config);
            drive(&mut player, playback.realtime)?;
            player.into_parts().0
        }
        ListOp::Remove { value } => {
            let program = LineProgram::remove(&list, value);
            let mut player = Player::new(list, program, config);
            drive(&mut player, playback.realtime)?;
            player.into_parts().0
        }
    };

    println!("list: {:?}", list.values());
    if list.is_doubly() {
        println!("back: {:?}", list.back_values());
    }
    Ok(())
}

fn playback_config(args: PlaybackArgs) -> Result<PlaybackConfig> {
    Ok(PlaybackConfig::with_interval_ms(args.interval_ms)
        .context("invalid --interval-ms")?
        .max_ticks(args.max_ticks))
}

/// Run a player to completion, printing the highlighted line per tick
fn drive<S: Stepper>(player: &mut Player<S>, realtime: bool) -> Result<()> {
    println!(
        "{}",
        player.stepper().listing().select_line(0).unwrap_or_default()
    );

    if realtime {
        let PlaybackConfig {
            interval,
            max_ticks,
        } = player.config();
        player.play();
        let mut fired = 0;
        while player.mode() == Mode::Auto && fired < max_ticks {
            std::thread::sleep(interval);
            for tick in player.advance(interval) {
                fired += 1;
                print_tick(player.stepper().listing(), fired, tick);
            }
        }
    } else {
        let ticks = player.run_to_end();
        let listing = player.stepper().listing();
        for (n, tick) in ticks.into_iter().enumerate() {
            print_tick(listing, n + 1, tick);
        }
    }

    println!("status: {}", player.stepper().outcome());
    Ok(())
}

fn print_tick(listing: &Listing, n: usize, tick: Tick) {
    println!(
        "tick {:>4}  line {:>2}  {}",
        n,
        tick.line,
        listing.select_line(tick.line).unwrap_or_default()
    );
}
