//! Jikan CLI application.
//!
//! Looks up anime, manga, characters, genres, users and clubs. Detail views
//! fetch their sections concurrently; a failed section is reported in place
//! and does not hide the others.

mod output;

use anyhow::{anyhow, Context, Result};
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use jikan::{
    AnimeSearch, GenreFilter, Id, JikanClient, JikanError, MangaFull, MangaSearch,
    RequestContext, ReviewFilter,
};
use output::{field, heading, names, or_dash, page_footer, truncate, unavailable};
use shared::{Config, LogConfig};
use std::fmt::Display;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Entries shown per list section of a detail view.
const SECTION_ROWS: usize = 10;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Abort the whole command after this many seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show an anime with statistics, relations, themes and links, or search anime
    Anime(AnimeArgs),
    /// Show a character with appearances, voice actors and pictures, or search characters
    Character(CharacterArgs),
    /// Show a manga with characters, statistics and recommendations, or search manga
    Manga(MangaArgs),
    /// List anime or manga genres
    Genre(GenreArgs),
    /// Show a user profile or update history
    User(UserArgs),
    /// Show a club or its members, or search clubs
    Club(ClubArgs),
}

#[derive(clap::Args, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["id", "search"])))]
struct AnimeArgs {
    /// MyAnimeList ID
    #[arg(long)]
    id: Option<i64>,

    /// Search query
    #[arg(short, long)]
    search: Option<String>,

    /// Media type filter for search (tv, movie, ova, special, ona, music)
    #[arg(long = "type", requires = "search")]
    kind: Option<String>,

    /// Search results per page (1-25)
    #[arg(long, default_value_t = 10)]
    limit: u32,

    #[arg(long, default_value_t = 1)]
    page: u32,
}

#[derive(clap::Args, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["id", "search"])))]
struct CharacterArgs {
    /// MyAnimeList ID
    #[arg(long)]
    id: Option<i64>,

    /// Search query
    #[arg(short, long)]
    search: Option<String>,

    #[arg(long, default_value_t = 1)]
    page: u32,
}

#[derive(clap::Args, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["id", "search"])))]
struct MangaArgs {
    /// MyAnimeList ID
    #[arg(long)]
    id: Option<i64>,

    /// Search query
    #[arg(short, long)]
    search: Option<String>,

    /// Include relations and external links
    #[arg(long, conflicts_with = "search")]
    full: bool,

    /// List news articles instead of details
    #[arg(long, conflicts_with_all = ["search", "full", "reviews"])]
    news: bool,

    /// List reviews instead of details
    #[arg(long, conflicts_with_all = ["search", "full"])]
    reviews: bool,

    /// Include preliminary reviews
    #[arg(long, requires = "reviews")]
    preliminary: bool,

    /// Include reviews containing spoilers
    #[arg(long, requires = "reviews")]
    spoilers: bool,

    /// Search results per page (1-25)
    #[arg(long, default_value_t = 10)]
    limit: u32,

    #[arg(long, default_value_t = 1)]
    page: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Media {
    Anime,
    Manga,
}

#[derive(clap::Args, Debug)]
struct GenreArgs {
    #[arg(value_enum)]
    media: Media,

    /// genres, explicit_genres, themes or demographics
    #[arg(long)]
    filter: Option<GenreFilter>,
}

#[derive(clap::Args, Debug)]
struct UserArgs {
    username: String,

    /// Show recent list updates instead of the profile
    #[arg(long)]
    history: bool,

    #[arg(long, default_value_t = 1)]
    page: u32,
}

#[derive(clap::Args, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["id", "search"])))]
struct ClubArgs {
    /// MyAnimeList ID
    #[arg(long)]
    id: Option<i64>,

    /// Search query
    #[arg(short, long)]
    search: Option<String>,

    /// List members instead of details
    #[arg(long, conflicts_with = "search")]
    members: bool,

    #[arg(long, default_value_t = 1)]
    page: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Initialize logging
    shared::logging::init(LogConfig::from_settings(&config, "jikan-cli", args.verbose)?)?;

    info!(config_file = %args.config.display(), "Loaded configuration");

    let client = JikanClient::with_config(config.client_config())
        .context("Failed to create Jikan client")?;

    let (ctx, cancel) = RequestContext::cancellable();
    let ctx = match args.timeout {
        Some(secs) => ctx.and_timeout(Duration::from_secs(secs)),
        None => ctx,
    };

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling requests");
            cancel.cancel();
        }
    });

    let app = App { client, ctx };
    match args.command {
        Command::Anime(args) => app.anime(args).await,
        Command::Character(args) => app.character(args).await,
        Command::Manga(args) => app.manga(args).await,
        Command::Genre(args) => app.genre(args).await,
        Command::User(args) => app.user(args).await,
        Command::Club(args) => app.club(args).await,
    }
}

/// Converts a library error into the message shown to the user.
fn explain(err: JikanError, what: impl Display) -> anyhow::Error {
    if err.is_not_found() {
        anyhow!("{} was not found", what)
    } else if err.is_cancelled() {
        anyhow!("Interrupted while fetching {}", what)
    } else if err.is_rate_limited() {
        anyhow::Error::new(err).context("Rate limited by the Jikan API, try again in a few seconds")
    } else if err.is_timeout() {
        anyhow::Error::new(err).context(format!("Timed out fetching {}", what))
    } else {
        anyhow::Error::new(err).context(format!("Failed to fetch {}", what))
    }
}

/// Logs a failed detail section and prints a marker in its place.
fn section_failed(section: &str, err: &JikanError) {
    warn!(section = section, error = %err, "Sub-request failed");
    unavailable(section, err);
}

fn more_rows(total: usize) {
    if total > SECTION_ROWS {
        println!("  ... and {} more", total - SECTION_ROWS);
    }
}

struct App {
    client: JikanClient,
    ctx: RequestContext,
}

impl App {
    async fn anime(&self, args: AnimeArgs) -> Result<()> {
        match (args.id, args.search) {
            (Some(id), _) => self.anime_details(Id(id)).await,
            (None, Some(query)) => {
                let mut search = AnimeSearch::new(query).page(args.page).limit(args.limit);
                if let Some(kind) = args.kind {
                    search = search.kind(kind);
                }
                self.anime_search(&search).await
            }
            (None, None) => Err(anyhow!("Either --id or --search is required")),
        }
    }

    async fn anime_details(&self, id: Id) -> Result<()> {
        let anime = self.client.anime();
        let ctx = &self.ctx;
        let (details, stats, relations, themes, external) = tokio::join!(
            anime.by_id(ctx, id),
            anime.statistics(ctx, id),
            anime.relations(ctx, id),
            anime.themes(ctx, id),
            anime.external(ctx, id),
        );
        let details = details.map_err(|e| explain(e, format!("Anime {}", id)))?;

        println!("{} (#{})", details.title, details.mal_id);
        if let Some(english) = &details.title_english {
            field("English", english);
        }
        field("Type", or_dash(details.kind.as_deref()));
        field("Episodes", or_dash(details.episodes));
        field("Status", or_dash(details.status.as_deref()));
        field("Aired", or_dash(details.aired.display.as_deref()));
        field(
            "Score",
            format!(
                "{} (rank {}, {} members)",
                or_dash(details.score),
                or_dash(details.rank.map(|r| format!("#{}", r))),
                or_dash(details.members)
            ),
        );
        field("Studios", names(&details.studios));
        field("Genres", names(&details.genres));
        field("URL", &details.url);
        if let Some(synopsis) = &details.synopsis {
            field("Synopsis", truncate(synopsis, 300));
        }

        match stats {
            Ok(stats) => {
                heading("Statistics");
                field("Watching", stats.watching);
                field("Completed", stats.completed);
                field("On hold", stats.on_hold);
                field("Dropped", stats.dropped);
                field("Plan to watch", stats.plan_to_watch);
                field("Total", stats.total);
            }
            Err(err) => section_failed("Statistics", &err),
        }

        match relations {
            Ok(relations) => {
                heading("Relations");
                if relations.is_empty() {
                    println!("  (none)");
                }
                for relation in &relations {
                    field(&relation.relation, names(&relation.entry));
                }
            }
            Err(err) => section_failed("Relations", &err),
        }

        match themes {
            Ok(themes) => {
                heading("Themes");
                for opening in &themes.openings {
                    println!("  OP  {}", opening);
                }
                for ending in &themes.endings {
                    println!("  ED  {}", ending);
                }
            }
            Err(err) => section_failed("Themes", &err),
        }

        match external {
            Ok(links) => {
                heading("External links");
                if links.is_empty() {
                    println!("  (none)");
                }
                for link in &links {
                    println!("  {:<20} {}", link.name, link.url);
                }
            }
            Err(err) => section_failed("External links", &err),
        }

        Ok(())
    }

    async fn anime_search(&self, search: &AnimeSearch) -> Result<()> {
        let page = self
            .client
            .search()
            .anime(&self.ctx, search)
            .await
            .map_err(|e| explain(e, "Anime search results"))?;

        if page.is_empty() {
            println!("No anime found for \"{}\"", search.options.query);
            return Ok(());
        }

        println!("{:>7}  {:<50} {:<8} {:>5} {:>6}", "ID", "Title", "Type", "Eps", "Score");
        for anime in &page.items {
            println!(
                "{:>7}  {:<50} {:<8} {:>5} {:>6}",
                anime.mal_id,
                truncate(&anime.title, 50),
                or_dash(anime.kind.as_deref()),
                or_dash(anime.episodes),
                or_dash(anime.score)
            );
        }
        page_footer(search.options.page.unwrap_or(1), &page.pagination);
        Ok(())
    }

    async fn character(&self, args: CharacterArgs) -> Result<()> {
        let Some(id) = args.id.map(Id) else {
            let query = args.search.unwrap_or_default();
            return self.character_search(&query, args.page).await;
        };

        let characters = self.client.characters();
        let ctx = &self.ctx;
        let (details, anime, manga, voices, pictures) = tokio::join!(
            characters.by_id(ctx, id),
            characters.anime(ctx, id),
            characters.manga(ctx, id),
            characters.voices(ctx, id),
            characters.pictures(ctx, id),
        );
        let details = details.map_err(|e| explain(e, format!("Character {}", id)))?;

        println!("{} (#{})", details.name, details.mal_id);
        field("Kanji", or_dash(details.name_kanji.as_deref()));
        if !details.nicknames.is_empty() {
            field("Nicknames", details.nicknames.join(", "));
        }
        field("Favorites", details.favorites);
        field("URL", &details.url);
        if let Some(about) = &details.about {
            field("About", truncate(about, 300));
        }

        match anime {
            Ok(anime) => {
                heading("Anime appearances");
                for appearance in anime.iter().take(SECTION_ROWS) {
                    println!("  {:<12} {}", appearance.role, appearance.anime.title);
                }
                more_rows(anime.len());
            }
            Err(err) => section_failed("Anime appearances", &err),
        }

        match manga {
            Ok(manga) => {
                heading("Manga appearances");
                for appearance in manga.iter().take(SECTION_ROWS) {
                    println!("  {:<12} {}", appearance.role, appearance.manga.title);
                }
                more_rows(manga.len());
            }
            Err(err) => section_failed("Manga appearances", &err),
        }

        match voices {
            Ok(voices) => {
                heading("Voice actors");
                for voice in voices.iter().take(SECTION_ROWS) {
                    println!("  {:<12} {}", voice.language, voice.person.name);
                }
                more_rows(voices.len());
            }
            Err(err) => section_failed("Voice actors", &err),
        }

        match pictures {
            Ok(pictures) => {
                heading("Pictures");
                for url in pictures.iter().filter_map(|p| p.best_url()).take(SECTION_ROWS) {
                    println!("  {}", url);
                }
                more_rows(pictures.len());
            }
            Err(err) => section_failed("Pictures", &err),
        }

        Ok(())
    }

    async fn character_search(&self, query: &str, page_number: u32) -> Result<()> {
        let page = self
            .client
            .characters()
            .search(&self.ctx, query, page_number)
            .await
            .map_err(|e| explain(e, "Character search results"))?;

        if page.is_empty() {
            println!("No characters found for \"{}\"", query);
            return Ok(());
        }

        println!("{:>7}  {:<40} {:>9}", "ID", "Name", "Favorites");
        for character in &page.items {
            println!(
                "{:>7}  {:<40} {:>9}",
                character.mal_id,
                truncate(&character.name, 40),
                character.favorites
            );
        }
        page_footer(page_number, &page.pagination);
        Ok(())
    }

    async fn manga(&self, args: MangaArgs) -> Result<()> {
        let Some(id) = args.id.map(Id) else {
            let query = args.search.unwrap_or_default();
            let search = MangaSearch::new(query).page(args.page).limit(args.limit);
            return self.manga_search(&search).await;
        };

        if args.news {
            self.manga_news(id, args.page).await
        } else if args.reviews {
            let filter = ReviewFilter {
                preliminary: args.preliminary,
                spoilers: args.spoilers,
            };
            self.manga_reviews(id, args.page, filter).await
        } else {
            self.manga_details(id, args.full).await
        }
    }

    async fn manga_details(&self, id: Id, full: bool) -> Result<()> {
        let manga = self.client.manga();
        let ctx = &self.ctx;
        let details = async {
            if full {
                manga.full(ctx, id).await
            } else {
                manga.by_id(ctx, id).await.map(|manga| MangaFull {
                    manga,
                    ..Default::default()
                })
            }
        };
        let (details, characters, stats, recommendations) = tokio::join!(
            details,
            manga.characters(ctx, id),
            manga.statistics(ctx, id),
            manga.recommendations(ctx, id),
        );
        let MangaFull {
            manga: details,
            relations,
            external,
        } = details.map_err(|e| explain(e, format!("Manga {}", id)))?;

        println!("{} (#{})", details.title, details.mal_id);
        if let Some(english) = &details.title_english {
            field("English", english);
        }
        field("Type", or_dash(details.kind.as_deref()));
        field("Chapters", or_dash(details.chapters));
        field("Volumes", or_dash(details.volumes));
        field("Status", or_dash(details.status.as_deref()));
        field("Published", or_dash(details.published.display.as_deref()));
        field(
            "Score",
            format!(
                "{} (rank {}, {} members)",
                or_dash(details.score),
                or_dash(details.rank.map(|r| format!("#{}", r))),
                or_dash(details.members)
            ),
        );
        field("Authors", names(&details.authors));
        field("Genres", names(&details.genres));
        field("URL", &details.url);
        if let Some(synopsis) = &details.synopsis {
            field("Synopsis", truncate(synopsis, 300));
        }

        if full {
            heading("Relations");
            if relations.is_empty() {
                println!("  (none)");
            }
            for relation in &relations {
                field(&relation.relation, names(&relation.entry));
            }

            heading("External links");
            for link in &external {
                println!("  {:<20} {}", link.name, link.url);
            }
        }

        match characters {
            Ok(characters) => {
                heading("Characters");
                for character in characters.iter().take(SECTION_ROWS) {
                    println!("  {:<12} {}", character.role, character.character.name);
                }
                more_rows(characters.len());
            }
            Err(err) => section_failed("Characters", &err),
        }

        match stats {
            Ok(stats) => {
                heading("Statistics");
                field("Reading", stats.reading);
                field("Completed", stats.completed);
                field("On hold", stats.on_hold);
                field("Dropped", stats.dropped);
                field("Plan to read", stats.plan_to_read);
                field("Total", stats.total);
            }
            Err(err) => section_failed("Statistics", &err),
        }

        match recommendations {
            Ok(recommendations) => {
                heading("Recommendations");
                for rec in recommendations.iter().take(SECTION_ROWS) {
                    println!("  {:>4} votes  {}", rec.votes, rec.entry.title);
                }
                more_rows(recommendations.len());
            }
            Err(err) => section_failed("Recommendations", &err),
        }

        Ok(())
    }

    async fn manga_news(&self, id: Id, page_number: u32) -> Result<()> {
        let page = self
            .client
            .manga()
            .news(&self.ctx, id, page_number)
            .await
            .map_err(|e| explain(e, format!("News for manga {}", id)))?;

        if page.is_empty() {
            println!("No news for manga {}", id);
            return Ok(());
        }

        for item in &page.items {
            println!(
                "{}  {} ({} comments)",
                or_dash(item.date.map(|d| d.format("%Y-%m-%d"))),
                item.title,
                item.comments
            );
            println!("            by {}  {}", item.author_username, item.url);
        }
        page_footer(page_number, &page.pagination);
        Ok(())
    }

    async fn manga_reviews(&self, id: Id, page_number: u32, filter: ReviewFilter) -> Result<()> {
        let page = self
            .client
            .manga()
            .reviews(&self.ctx, id, page_number, filter)
            .await
            .map_err(|e| explain(e, format!("Reviews for manga {}", id)))?;

        if page.is_empty() {
            println!("No reviews for manga {}", id);
            return Ok(());
        }

        for review in &page.items {
            let mut flags = Vec::new();
            if review.is_preliminary {
                flags.push("preliminary");
            }
            if review.is_spoiler {
                flags.push("spoiler");
            }
            heading(&format!(
                "{}/10 by {} on {}{}",
                review.score,
                review.user.username,
                or_dash(review.date.map(|d| d.format("%Y-%m-%d"))),
                if flags.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", flags.join(", "))
                }
            ));
            if !review.tags.is_empty() {
                field("Tags", review.tags.join(", "));
            }
            println!("  {}", truncate(&review.review, 400));
        }
        page_footer(page_number, &page.pagination);
        Ok(())
    }

    async fn manga_search(&self, search: &MangaSearch) -> Result<()> {
        let page = self
            .client
            .search()
            .manga(&self.ctx, search)
            .await
            .map_err(|e| explain(e, "Manga search results"))?;

        if page.is_empty() {
            println!("No manga found for \"{}\"", search.options.query);
            return Ok(());
        }

        println!("{:>7}  {:<50} {:<10} {:>5} {:>6}", "ID", "Title", "Type", "Ch", "Score");
        for manga in &page.items {
            println!(
                "{:>7}  {:<50} {:<10} {:>5} {:>6}",
                manga.mal_id,
                truncate(&manga.title, 50),
                or_dash(manga.kind.as_deref()),
                or_dash(manga.chapters),
                or_dash(manga.score)
            );
        }
        page_footer(search.options.page.unwrap_or(1), &page.pagination);
        Ok(())
    }

    async fn genre(&self, args: GenreArgs) -> Result<()> {
        let genres = self.client.genres();
        let genres = match args.media {
            Media::Anime => genres.anime(&self.ctx, args.filter).await,
            Media::Manga => genres.manga(&self.ctx, args.filter).await,
        }
        .map_err(|e| explain(e, "Genre list"))?;

        println!("{:>5}  {:<30} {:>8}", "ID", "Name", "Entries");
        for genre in &genres {
            println!("{:>5}  {:<30} {:>8}", genre.mal_id, genre.name, genre.count);
        }
        println!("\n{} genres", genres.len());
        Ok(())
    }

    async fn user(&self, args: UserArgs) -> Result<()> {
        let users = self.client.users();

        if args.history {
            let page = users
                .history(&self.ctx, &args.username, args.page)
                .await
                .map_err(|e| explain(e, format!("History of user {}", args.username)))?;

            if page.is_empty() {
                println!("No recent updates for {}", args.username);
                return Ok(());
            }
            for entry in &page.items {
                println!(
                    "{}  {:<8} {:<50} +{}",
                    or_dash(entry.date.map(|d| d.format("%Y-%m-%d %H:%M"))),
                    or_dash(entry.entry.kind.as_deref()),
                    truncate(&entry.entry.name, 50),
                    entry.increment
                );
            }
            page_footer(args.page, &page.pagination);
            return Ok(());
        }

        let profile = users
            .by_username(&self.ctx, &args.username)
            .await
            .map_err(|e| explain(e, format!("User {}", args.username)))?;

        println!("{}", profile.username);
        field("Gender", or_dash(profile.gender.as_deref()));
        field("Location", or_dash(profile.location.as_deref()));
        field("Joined", or_dash(profile.joined.map(|d| d.format("%Y-%m-%d"))));
        field(
            "Last online",
            or_dash(profile.last_online.map(|d| d.format("%Y-%m-%d %H:%M"))),
        );
        field("URL", &profile.url);

        let anime = &profile.statistics.anime;
        heading("Anime list");
        field("Days watched", anime.days_watched);
        field("Mean score", anime.mean_score);
        field("Completed", anime.completed);
        field("Total entries", anime.total_entries);
        field("Episodes", anime.episodes_watched);

        let manga = &profile.statistics.manga;
        heading("Manga list");
        field("Days read", manga.days_read);
        field("Mean score", manga.mean_score);
        field("Completed", manga.completed);
        field("Total entries", manga.total_entries);
        field("Chapters", manga.chapters_read);

        Ok(())
    }

    async fn club(&self, args: ClubArgs) -> Result<()> {
        let clubs = self.client.clubs();

        let Some(id) = args.id.map(Id) else {
            let query = args.search.unwrap_or_default();
            let page = clubs
                .search(&self.ctx, &query, args.page)
                .await
                .map_err(|e| explain(e, "Club search results"))?;

            if page.is_empty() {
                println!("No clubs found for \"{}\"", query);
                return Ok(());
            }
            println!("{:>7}  {:<45} {:<12} {:>8}", "ID", "Name", "Category", "Members");
            for club in &page.items {
                println!(
                    "{:>7}  {:<45} {:<12} {:>8}",
                    club.mal_id,
                    truncate(&club.name, 45),
                    or_dash(club.category.as_deref()),
                    club.members
                );
            }
            page_footer(args.page, &page.pagination);
            return Ok(());
        };

        if args.members {
            let page = clubs
                .members(&self.ctx, id, args.page)
                .await
                .map_err(|e| explain(e, format!("Members of club {}", id)))?;

            for member in &page.items {
                println!("  {:<24} {}", member.username, member.url);
            }
            page_footer(args.page, &page.pagination);
            return Ok(());
        }

        let club = clubs
            .by_id(&self.ctx, id)
            .await
            .map_err(|e| explain(e, format!("Club {}", id)))?;

        println!("{} (#{})", club.name, club.mal_id);
        field("Category", or_dash(club.category.as_deref()));
        field("Access", or_dash(club.access.as_deref()));
        field("Members", club.members);
        field("Created", or_dash(club.created.map(|d| d.format("%Y-%m-%d"))));
        field("URL", &club.url);
        Ok(())
    }
}
