//! nasa-media - search the NASA Image and Video Library from a terminal
//!
//! Prints each result page as it renders, then the resolved media of every
//! card, and follows next-page links up to `--pages` pages.

use clap::Parser;
use color_eyre::{eyre::Result, install};
use nasa_media::prelude::*;
use nasa_media::render::{MessageKind, UserMessage};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "nasa-media", version, about = "Search the NASA Image and Video Library")]
struct Args {
    /// Search text
    #[arg(default_value = "")]
    text: String,

    /// all, image, audio or video
    #[arg(long, default_value = "all")]
    media_type: String,

    /// Only items created in or after this year
    #[arg(long, default_value = "")]
    year_start: String,

    /// Comma-separated keywords
    #[arg(long, default_value = "")]
    tags: String,

    /// Open a results URL query such as "q=mars&media_type=audio" instead
    #[arg(long, conflicts_with = "text")]
    url: Option<String>,

    /// Number of pages to show (at least one)
    #[arg(long, default_value_t = 1)]
    pages: usize,

    /// Reject searches with empty text even when filters are set
    #[arg(long)]
    require_text: bool,
}

impl Args {
    fn page_limit(&self) -> usize {
        self.pages.max(1)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let mut config = Config::from_env()?;
    if args.require_text {
        config.validation = ValidationPolicy::RequireText;
    }
    info!("Using endpoint {}", config.base_url);

    let mut app = App::new(config);
    let state = AppState::default();

    let mut transition = match &args.url {
        Some(url) => app.open_url(&state, url).await,
        None => {
            let form = FormState::new(&args.text)
                .media_type(&args.media_type)
                .year_start(&args.year_start)
                .tags(&args.tags);
            app.submit(&state, &form).await
        }
    };

    let page_limit = args.page_limit();
    for page_number in 1..=page_limit {
        paint(&transition);
        if transition.cards.is_empty() {
            break;
        }

        let summary = app.resolve(&transition).await;
        info!(
            "Page {}: {} resolved, {} unavailable",
            page_number, summary.resolved, summary.unavailable
        );
        paint_media(&transition.cards);

        if page_number == page_limit {
            break;
        }
        let state = transition.state.clone();
        transition = app.next_page(&state).await;
    }

    Ok(())
}

fn paint(transition: &Transition) {
    for update in &transition.updates {
        match update {
            ViewUpdate::ShowBase | ViewUpdate::ClearResults => {}
            ViewUpdate::ShowCards { count } => {
                println!("{} results", count);
                for (i, card) in transition.cards.iter().enumerate() {
                    let placeholder = card.placeholder();
                    println!();
                    println!("[{}] {} ({:?})", i + 1, placeholder.title, placeholder.media_type);
                    println!("    {}", placeholder.description);
                    println!("    preview: {}", placeholder.preview_url);
                    if !placeholder.keyword_links.is_empty() {
                        let keywords: Vec<&str> = placeholder
                            .keyword_links
                            .iter()
                            .map(|k| k.keyword.as_str())
                            .collect();
                        println!("    keywords: {}", keywords.join(", "));
                    }
                }
            }
            ViewUpdate::Message(UserMessage { kind, text }) => match kind {
                MessageKind::Error => eprintln!("{}", text),
                MessageKind::Info => println!("{}", text),
            },
            ViewUpdate::NextPage {
                heading, prompt, ..
            } => {
                println!();
                println!("{} {}", heading, prompt);
            }
        }
    }
}

fn paint_media(cards: &[RenderedCard]) {
    println!();
    for (i, card) in cards.iter().enumerate() {
        match card.slot() {
            Some(MediaSlot::Image { href, .. }) => {
                println!("[{}] image: {}", i + 1, href.as_deref().unwrap_or("-"))
            }
            Some(MediaSlot::Audio { src }) => println!("[{}] audio: {}", i + 1, src),
            Some(MediaSlot::Video { src, subtitles, .. }) => match subtitles {
                Some(vtt) => println!("[{}] video: {} (captions: {})", i + 1, src, vtt),
                None => println!("[{}] video: {}", i + 1, src),
            },
            Some(MediaSlot::Unavailable) | None => println!("[{}] unavailable", i + 1),
        }
    }
}
