use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use voice_grocer::{
    Action, Assistant, Catalog, ChannelListener, CommandData, CommandSink, Config, ConsoleHost,
    Interpretation, Interpreter, Product, SpeechOutputController, VoiceError,
    VoiceSessionController,
};

#[derive(Parser, Debug)]
#[command(name = "voice-grocer", version, about = "Hands-free grocery assistant in the terminal")]
struct Args {
    /// Configuration file (extension optional)
    #[arg(long, default_value = "config/voice-grocer")]
    config: String,

    /// Start with speech output muted
    #[arg(long)]
    muted: bool,

    /// Listen for a single command instead of continuously
    #[arg(long)]
    one_shot: bool,

    /// Override the reconnect attempt limit
    #[arg(long)]
    max_reconnect_attempts: Option<u32>,

    /// Print session statistics as JSON on exit
    #[arg(long)]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut cfg = Config::load(&args.config)?;
    if args.muted {
        cfg.speech.start_muted = true;
    }
    if args.one_shot {
        cfg.voice.auto_restart = false;
    }
    if let Some(attempts) = args.max_reconnect_attempts {
        cfg.voice.max_reconnect_attempts = attempts;
    }

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Type a command and press enter. :end, :net and :quit simulate recognizer events.");

    let host = ConsoleHost::new();
    let quit = host.quit_signal();

    let speech = Arc::new(SpeechOutputController::new(&host, cfg.speech.output_config()));
    let (listener, notices) = ChannelListener::new();
    let session =
        VoiceSessionController::new(&host, cfg.voice.session_config(), Arc::new(listener));

    let assistant = Assistant::new(
        Box::new(KeywordInterpreter),
        Arc::new(DemoCatalog::new()),
        Arc::clone(&speech),
        ConsoleSink,
    );
    assistant.welcome();
    session.start();

    let assistant_task = tokio::spawn(assistant.run(notices));

    tokio::select! {
        _ = quit.notified() => info!("Quit requested"),
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }

    session.stop();
    let stats = session.stats();
    session.dispose();
    assistant_task.abort();

    if args.stats {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }

    Ok(())
}

/// Minimal verb-first command parser for the console demo
struct KeywordInterpreter;

impl Interpreter for KeywordInterpreter {
    fn interpret(&self, transcript: &str, catalog: &dyn Catalog) -> Interpretation {
        let lower = transcript.to_lowercase();
        let mut words = lower.split_whitespace();
        let verb = words.next().unwrap_or_default();
        let rest = words.collect::<Vec<_>>().join(" ");

        match verb {
            "search" | "find" | "show" => {
                let found = catalog.find_by_name(&rest).len();
                Interpretation {
                    action: Action::Search,
                    response: format!("I found {} products for {}.", found, rest),
                    data: CommandData {
                        query: Some(rest),
                        ..Default::default()
                    },
                }
            }
            "add" | "remove" => match catalog.find_by_name(&rest).into_iter().next() {
                Some(product) => {
                    let (action, response) = if verb == "add" {
                        (Action::Add, format!("Added {} to your cart.", product.name))
                    } else {
                        (Action::Remove, format!("Removed {} from your cart.", product.name))
                    };
                    Interpretation {
                        action,
                        response,
                        data: CommandData {
                            product: Some(product),
                            quantity: Some(1),
                            ..Default::default()
                        },
                    }
                }
                None => Interpretation {
                    action: Action::Unknown,
                    response: format!("Sorry, I couldn't find {}.", rest),
                    data: CommandData::default(),
                },
            },
            "checkout" => Interpretation {
                action: Action::Checkout,
                response: "Taking you to checkout.".to_string(),
                data: CommandData::default(),
            },
            "help" => Interpretation {
                action: Action::Help,
                response: "You can say search for a product, add an item, remove an item, or checkout."
                    .to_string(),
                data: CommandData::default(),
            },
            _ => Interpretation {
                action: Action::Unknown,
                response: "Sorry, I didn't understand that. Say help to hear what I can do."
                    .to_string(),
                data: CommandData::default(),
            },
        }
    }
}

struct DemoCatalog {
    products: Vec<Product>,
}

impl DemoCatalog {
    fn new() -> Self {
        let product = |id: u32, name: &str, price: f64, category: &str, description: &str| Product {
            id,
            name: name.to_string(),
            price,
            category: category.to_string(),
            description: description.to_string(),
        };

        Self {
            products: vec![
                product(1, "Fresh Organic Apples", 2.99, "fruits", "Sweet and crisp organic apples."),
                product(2, "Whole Wheat Bread", 3.49, "bakery", "Hearty whole wheat bread."),
                product(3, "Free Range Eggs", 4.99, "dairy", "Farm fresh free-range eggs."),
                product(4, "Organic Milk", 3.79, "dairy", "Creamy organic milk."),
                product(5, "Ripe Bananas", 1.99, "fruits", "Sweet and ripe bananas."),
            ],
        }
    }
}

impl Catalog for DemoCatalog {
    fn products(&self) -> &[Product] {
        &self.products
    }

    fn find_by_name(&self, query: &str) -> Vec<Product> {
        let query = query.to_lowercase();
        self.products
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&query)
                    || p.category.contains(&query)
                    || p.description.to_lowercase().contains(&query)
            })
            .cloned()
            .collect()
    }

    fn find_by_category(&self, category_id: &str) -> Vec<Product> {
        if category_id == "all" {
            return self.products.clone();
        }
        self.products
            .iter()
            .filter(|p| p.category == category_id)
            .cloned()
            .collect()
    }
}

struct ConsoleSink;

impl CommandSink for ConsoleSink {
    fn apply(&mut self, interpretation: &Interpretation) {
        println!("> {:?} {:?}", interpretation.action, interpretation.data);
    }

    fn report_error(&mut self, error: &VoiceError) {
        eprintln!("! {}", error);
    }
}
