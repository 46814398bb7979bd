//! TFM Engine - Main Binary
//!
//! Inspect card catalogs and the board, or watch seeded automatic players
//! run a game through the same actions a server would expose.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tfm_engine::{
    actions::{run_game, Action, AutoPlayer, CreateGame, JoinGame, StartGame},
    core::{Card, CardType, PlayerId, Resources},
    game::{Board, GameRepository, GameSettings, GameState, VerbosityLevel},
    loader::{load_catalog, CardRegistry, InMemoryCardRegistry},
};

/// Verbosity level for game output (names or numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(VerbosityArg)
    }
}

impl From<VerbosityArg> for VerbosityLevel {
    fn from(arg: VerbosityArg) -> Self {
        arg.0
    }
}

#[derive(Parser)]
#[command(name = "tfm")]
#[command(about = "TFM Engine - Mars terraforming rules engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a card catalog and report what was accepted
    Cards {
        /// JSON file or directory of JSON files
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// List every accepted card
        #[arg(long)]
        list: bool,
    },

    /// Print the standard board layout
    Board,

    /// Run a game between seeded automatic players
    Demo {
        /// Number of players
        #[arg(long, default_value = "2")]
        players: usize,

        /// Seed for the deck and the players
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Generations to play before stopping
        #[arg(long, default_value = "5")]
        generations: u32,

        /// Card catalog to deal from (placeholder cards when absent)
        #[arg(long, value_name = "PATH")]
        cards: Option<PathBuf>,

        /// Verbosity level for game output (0=silent, 1=minimal, 2=normal, 3=verbose)
        #[arg(long, default_value = "normal", short = 'v')]
        verbosity: VerbosityArg,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Cards { path, list } => run_cards(&path, list).await?,
        Commands::Board => run_board(),
        Commands::Demo {
            players,
            seed,
            generations,
            cards,
            verbosity,
        } => run_demo(players, seed, generations, cards, verbosity.into()).await?,
    }

    Ok(())
}

async fn run_cards(path: &Path, list: bool) -> anyhow::Result<()> {
    let catalog = load_catalog(path)
        .await
        .with_context(|| format!("loading cards from {}", path.display()))?;

    println!(
        "Loaded {} cards from {} files in {:.2}ms",
        catalog.cards.len(),
        catalog.files,
        catalog.duration.as_secs_f64() * 1000.0
    );
    for rejected in &catalog.rejected {
        println!("  rejected {}: {}", rejected.source.display(), rejected.reason);
    }
    if list {
        for card in &catalog.cards {
            println!(
                "  {:<8} {:<32} {:>3}  {:?}",
                card.id.as_str(),
                card.name,
                card.cost,
                card.card_type
            );
        }
    }
    Ok(())
}

fn run_board() {
    let board = Board::generate();
    for tile in board.tiles() {
        let bonuses: Vec<String> = tile
            .bonuses
            .iter()
            .map(|b| format!("{}x{}", b.amount, b.resource))
            .collect();
        println!(
            "{:<10} {:<12} {:<24} {}",
            tile.position.to_string(),
            format!("{:?}", tile.kind),
            tile.name.as_deref().unwrap_or(""),
            bonuses.join(" ")
        );
    }
}

/// Numbered projects and corporations without behaviors
fn placeholder_cards() -> Vec<Card> {
    let mut cards: Vec<Card> = (1..=80)
        .map(|i| {
            let mut card = Card::new(
                format!("P{i:03}"),
                format!("Project {i}"),
                CardType::Automated,
                3 + i % 20,
            );
            card.pack = GameSettings::BASE_PACK.to_string();
            card
        })
        .collect();
    cards.extend((1..=10).map(|i| {
        let mut corp = Card::new(format!("C{i:02}"), format!("Corporation {i}"), CardType::Corporation, 0);
        corp.pack = GameSettings::BASE_PACK.to_string();
        corp.starting_resources = Some(Resources {
            credits: 40 + i,
            ..Default::default()
        });
        corp
    }));
    cards
}

async fn run_demo(
    players: usize,
    seed: u64,
    generations: u32,
    cards: Option<PathBuf>,
    verbosity: VerbosityLevel,
) -> anyhow::Result<()> {
    if players == 0 || players > GameSettings::DEFAULT_MAX_PLAYERS {
        bail!(
            "--players must be between 1 and {}",
            GameSettings::DEFAULT_MAX_PLAYERS
        );
    }
    println!("=== TFM Engine - Demo ===\n");

    let registry: Arc<dyn CardRegistry> = match cards {
        Some(path) => {
            let catalog = load_catalog(&path)
                .await
                .with_context(|| format!("loading cards from {}", path.display()))?;
            println!(
                "Loaded {} cards ({} rejected)",
                catalog.cards.len(),
                catalog.rejected.len()
            );
            Arc::new(catalog.into_registry()?)
        }
        None => Arc::new(InMemoryCardRegistry::new(placeholder_cards())?),
    };

    let repo = GameRepository::new(registry);
    let settings = GameSettings {
        verbosity,
        ..GameSettings::default().with_seed(seed)
    };
    let game = CreateGame::new(settings).execute(&repo);

    let ids = (1..=players)
        .map(|i| JoinGame::new(format!("Player {i}")).execute(&repo, game.id()))
        .collect::<tfm_engine::Result<Vec<PlayerId>>>()?;
    StartGame.execute(&repo, game.id(), &ids[0])?;

    let mut autos: Vec<AutoPlayer> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| AutoPlayer::with_seed(id.clone(), seed.wrapping_add(i as u64 + 1)))
        .collect();
    let steps = run_game(&repo, game.id(), &mut autos, generations)?;

    println!();
    game.read(|state| print_summary(state, steps));
    Ok(())
}

fn print_summary(state: &GameState, steps: usize) {
    let params = &state.global_parameters;
    println!("=== {} after {steps} actions ===", state.status());
    println!(
        "Generation {}: temperature {}C, oxygen {}%, oceans {}",
        state.generation(),
        params.temperature(),
        params.oxygen(),
        params.oceans()
    );
    for player in &state.players {
        let r = player.resources();
        println!(
            "  {:<10} TR {:>2}  credits {:>3}  hand {:>2}  played {:>2}",
            player.name,
            player.terraform_rating(),
            r.credits,
            player.hand().len(),
            player.played_cards().len()
        );
    }
    if let Some(scores) = &state.final_scores {
        for score in &scores.standings {
            let b = &score.breakdown;
            println!(
                "  #{} {:<10} {:>3} VP (TR {}, cards {}, greeneries {}, cities {})",
                score.placement,
                score.player_name,
                b.total,
                b.terraform_rating,
                b.card_vp,
                b.greenery_vp,
                b.city_vp
            );
        }
        if scores.is_tie {
            println!("  tied on VP and credits");
        }
    }
    println!("  {} history entries", state.history.len());
}
