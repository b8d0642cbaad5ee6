use anyhow::Context;
use clap::{Parser, Subcommand};
use std::sync::Arc;

use media_courier::config;
use media_courier::media::{AlbumReference, ChatId, MediaKind, MediaReference};
use media_courier::uploader::{Courier, DeliveryRequest, HttpDownloader, TelegramClient, UploadContext};

#[derive(Parser, Debug)]
#[command(name = "media-courier", version, about = "Send remote media to a Telegram chat")]
struct Cli {
    /// Destination chat id
    #[arg(long, allow_hyphen_values = true)]
    chat: i64,

    /// Bot token; overrides the config file
    #[arg(long, env = config::BOT_TOKEN_ENV, hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send a photo (as a document when it is too large for a photo)
    Photo(SingleArgs),
    /// Send an image as a document
    Document(SingleArgs),
    /// Send a short looping clip
    Gif(SingleArgs),
    /// Send a video
    Video(SingleArgs),
    /// Send several items as an album; kinds are guessed from extensions
    Album {
        #[arg(required = true)]
        urls: Vec<String>,
    },
}

#[derive(clap::Args, Debug)]
struct SingleArgs {
    url: String,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    thumbnail: Option<String>,
}

fn build_request(command: Command) -> DeliveryRequest {
    match command {
        Command::Photo(args) => DeliveryRequest::Photo {
            url: args.url,
            title: args.title,
            thumbnail_url: args.thumbnail,
            as_photo: true,
        },
        Command::Document(args) => DeliveryRequest::Photo {
            url: args.url,
            title: args.title,
            thumbnail_url: args.thumbnail,
            as_photo: false,
        },
        Command::Gif(args) => DeliveryRequest::Gif {
            url: args.url,
            title: args.title,
            thumbnail_url: args.thumbnail,
        },
        Command::Video(args) => DeliveryRequest::Video {
            url: args.url,
            title: args.title,
            thumbnail_url: args.thumbnail,
        },
        Command::Album { urls } => DeliveryRequest::Album(AlbumReference::new(
            urls.into_iter()
                .map(|url| MediaReference::new(MediaKind::from_url(&url), url))
                .collect(),
        )),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let app_config = config::load_config().context("Failed to load configuration")?;

    // RUST_LOG, when set, wins over the configured level
    env_logger::Builder::new()
        .filter_level(app_config.log_level.parse().unwrap_or(log::LevelFilter::Info))
        .parse_default_env()
        .init();

    log::info!("Starting media-courier");

    let token = match cli.token {
        Some(token) => token,
        None => app_config.resolve_bot_token()?,
    };

    let transport = TelegramClient::new(&app_config.api_base_url, &token, app_config.request_timeout())
        .context("Failed to create Telegram client")?;
    let downloader = HttpDownloader::new(app_config.request_timeout())
        .context("Failed to create downloader")?;
    config::get_temp_directory().context("Failed to prepare temp directory")?;

    let ctx = UploadContext::from_config(&app_config, Arc::new(transport), Arc::new(downloader));
    let courier = Courier::new(ctx);

    let result = courier
        .spawn_delivery(build_request(cli.command), ChatId(cli.chat))
        .await
        .context("Delivery task failed")?;

    println!("{}", result);
    Ok(())
}
