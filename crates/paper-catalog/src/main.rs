//! Paper Catalog - command line entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::{Datelike, Utc};
use clap::{Args, Parser, Subcommand};
use tokio::sync::broadcast;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use paper_catalog::error::ViewResult;
use paper_catalog::events::{Notification, NotificationLevel, drain_pending};
use paper_catalog::formatters;
use paper_catalog::forms::{AuthorForm, PaperForm, parse_author_list};
use paper_catalog::models::{AuthorSort, JournalSort, PaperInput, PaperSort, RegisterRequest, ResponseFormat, SortOrder};
use paper_catalog::query::{AuthorsSource, FilterName, JournalsSource, PapersSource};
use paper_catalog::session::MemorySessionStore;
use paper_catalog::views::{DashboardView, PaperDetailsView, ProfileEditor};
use paper_catalog::{
    AuthService, CatalogClient, Config, EventBus, FileSessionStore, Route, SessionContext, SessionStore, UiEvent,
};

#[derive(Parser, Debug)]
#[command(name = "paper-catalog")]
#[command(about = "Browse, search and edit a research-paper catalog")]
#[command(version)]
struct Cli {
    /// Catalog API base URL
    #[arg(long, env = "PAPER_CATALOG_API_URL")]
    api_url: Option<String>,

    /// Session file (token and email)
    #[arg(long, env = "PAPER_CATALOG_SESSION_FILE")]
    session_file: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "markdown")]
    format: Format,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum Format {
    /// Human-readable Markdown
    #[default]
    Markdown,
    /// Compact JSON
    Json,
}

impl From<Format> for ResponseFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Markdown => Self::Markdown,
            Format::Json => Self::Json,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "PAPER_CATALOG_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Defaults to --password
        #[arg(long)]
        confirm_password: Option<String>,
    },
    /// Request password reset instructions
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    /// Show the signed-in user
    Whoami,
    /// Catalog statistics
    Dashboard,
    /// List or search papers
    Papers {
        #[command(flatten)]
        list: ListArgs,
        #[arg(long)]
        year_from: Option<String>,
        #[arg(long)]
        year_to: Option<String>,
        #[arg(long)]
        journal: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        min_citations: Option<String>,
    },
    /// Show one paper
    Paper { id: String },
    /// List or search authors
    Authors {
        #[command(flatten)]
        list: ListArgs,
    },
    /// List or search journals
    Journals {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Create a paper
    AddPaper {
        #[command(flatten)]
        fields: PaperArgs,
    },
    /// Edit a paper
    EditPaper {
        id: String,
        #[command(flatten)]
        fields: PaperArgs,
    },
    /// Delete a paper
    DeletePaper {
        id: String,
        #[arg(long)]
        yes: bool,
    },
    /// Create an author linked to a paper
    AddAuthor {
        #[arg(long)]
        name: String,
        /// Paper to link
        #[arg(long)]
        paper_id: String,
    },
    /// Rename an author
    EditAuthor {
        id: String,
        #[arg(long)]
        name: String,
    },
    /// Delete an author
    DeleteAuthor {
        id: String,
        #[arg(long)]
        yes: bool,
    },
    /// Bulk-create papers from a JSON array
    Import { file: PathBuf },
    /// Show or edit the profile
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Free-text query; empty lists everything
    #[arg(long, short)]
    query: Option<String>,
    /// Sort order
    #[arg(long)]
    sort: Option<String>,
    /// Page number
    #[arg(long, default_value_t = 1)]
    page: u32,
}

#[derive(Args, Debug)]
struct PaperArgs {
    /// Identifier for a new paper (generated when omitted)
    #[arg(long)]
    id: Option<String>,
    #[arg(long)]
    title: Option<String>,
    #[arg(long = "abstract")]
    summary: Option<String>,
    #[arg(long)]
    year: Option<String>,
    #[arg(long)]
    doi: Option<String>,
    #[arg(long)]
    journal: Option<String>,
    /// Comma-separated author names
    #[arg(long)]
    authors: Option<String>,
    #[arg(long)]
    covid19: Option<bool>,
    #[arg(long)]
    full_text: Option<bool>,
}

impl Command {
    fn route(&self) -> Route {
        match self {
            Self::Login { .. } => Route::Login,
            Self::Register { .. } => Route::Register,
            Self::ForgotPassword { .. } => Route::ForgotPassword,
            Self::Logout | Self::Whoami | Self::Dashboard => Route::Dashboard,
            Self::Papers { .. } | Self::DeletePaper { .. } | Self::Import { .. } => Route::Papers,
            Self::Paper { id } => Route::PaperDetails(id.clone()),
            Self::Authors { .. } | Self::DeleteAuthor { .. } => Route::Authors,
            Self::Journals { .. } => Route::Journals,
            Self::AddPaper { .. } => Route::NewPaper,
            Self::EditPaper { id, .. } => Route::EditPaper(id.clone()),
            Self::AddAuthor { .. } => Route::NewAuthor,
            Self::EditAuthor { id, .. } => Route::EditAuthor(id.clone()),
            Self::Profile { .. } => Route::Profile,
        }
    }
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr)).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    let mut config = Config::from_env()?;
    if let Some(api_url) = cli.api_url.clone() {
        url::Url::parse(&api_url).context("invalid --api-url")?;
        config.api_url = api_url;
    }
    if let Some(path) = cli.session_file.clone() {
        config = config.with_session_path(path);
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), api_url = %config.api_url, "Starting");

    let events = EventBus::default();
    let mut receiver = events.subscribe();

    let store: Arc<dyn SessionStore> = match &config.session_path {
        Some(path) => Arc::new(FileSessionStore::new(path.clone())),
        None => Arc::new(MemorySessionStore::default()),
    };
    let session = SessionContext::new(store, events.clone());
    session.init().await?;

    let client = CatalogClient::new(&config, session.clone())?;
    let format = ResponseFormat::from(cli.format);

    let requested = cli.command.route();
    let authenticated = session.is_authenticated().await;
    let landed = requested.clone().guard(authenticated);
    let outcome = if landed == requested || matches!(cli.command, Command::Logout | Command::Whoami) {
        run(cli.command, client, format).await
    } else if landed == Route::Login {
        Err(anyhow::anyhow!("Not logged in. Run `paper-catalog login` first."))
    } else {
        eprintln!("Already logged in; run `paper-catalog logout` first.");
        Ok(())
    };

    drain_events(&mut receiver);
    outcome
}

async fn run(command: Command, client: CatalogClient, format: ResponseFormat) -> anyhow::Result<()> {
    let current_year = Utc::now().year();

    match command {
        Command::Login { email, password } => {
            let session = AuthService::new(client).login(&email, &password).await?;
            println!("Logged in as {}", session.user_email);
        }
        Command::Logout => AuthService::new(client).logout().await?,
        Command::Register { name, email, password, confirm_password } => {
            let confirm = confirm_password.unwrap_or_else(|| password.clone());
            let request = RegisterRequest { name, email, password };
            AuthService::new(client).register(&request, &confirm).await?;
        }
        Command::ForgotPassword { email } => {
            AuthService::new(client).forgot_password(&email).await?;
        }
        Command::Whoami => match client.session().current().await {
            Some(session) => println!("{}", session.user_email),
            None => println!("Not logged in"),
        },
        Command::Dashboard => {
            let dashboard = DashboardView::new(client).load().await?;
            if format.is_json() {
                println!("{}", formatters::dashboard_json(&dashboard));
            } else {
                println!("{}", formatters::format_dashboard(&dashboard));
            }
        }
        Command::Papers { list, year_from, year_to, journal, author, min_citations } => {
            let view = PapersSource::view(client);
            let filters = [
                (FilterName::YearFrom, year_from),
                (FilterName::YearTo, year_to),
                (FilterName::Journal, journal),
                (FilterName::Author, author),
                (FilterName::MinCitations, min_citations),
            ];
            let sort = list.sort.as_deref().map(parse_sort::<PaperSort>).transpose()?;
            view.stage(|state| {
                state.set_free_text(list.query.unwrap_or_default());
                for (name, value) in filters {
                    if let Some(value) = value {
                        state.set_filter(name, &value)?;
                    }
                }
                if let Some(sort) = sort {
                    state.set_sort(sort);
                }
                state.set_page(list.page);
                ViewResult::Ok(())
            })
            .await?;
            view.submit_search().await;

            let snapshot = view.view().await;
            if format.is_json() {
                println!("{}", formatters::list_page_json(&snapshot, formatters::compact_paper));
            } else {
                println!("{}", formatters::format_papers_page(&snapshot));
            }
        }
        Command::Paper { id } => {
            let paper = PaperDetailsView::new(client, id).load().await?;
            if format.is_json() {
                println!("{}", serde_json::to_string_pretty(&paper)?);
            } else {
                println!("{}", formatters::format_paper_details(&paper));
            }
        }
        Command::Authors { list } => {
            let view = AuthorsSource::view(client);
            let sort = list.sort.as_deref().map(parse_sort::<AuthorSort>).transpose()?;
            view.stage(|state| {
                state.set_free_text(list.query.unwrap_or_default());
                if let Some(sort) = sort {
                    state.set_sort(sort);
                }
                state.set_page(list.page);
            })
            .await;
            view.submit_search().await;

            let snapshot = view.view().await;
            if format.is_json() {
                println!("{}", formatters::list_page_json(&snapshot, formatters::compact_author));
            } else {
                println!("{}", formatters::format_authors_page(&snapshot, current_year));
            }
        }
        Command::Journals { list } => {
            let view = JournalsSource::view(client);
            let sort = list.sort.as_deref().map(parse_sort::<JournalSort>).transpose()?;
            view.stage(|state| {
                state.set_free_text(list.query.unwrap_or_default());
                if let Some(sort) = sort {
                    state.set_sort(sort);
                }
                state.set_page(list.page);
            })
            .await;
            view.submit_search().await;

            let snapshot = view.view().await;
            if format.is_json() {
                println!("{}", formatters::list_page_json(&snapshot, formatters::compact_journal));
            } else {
                println!("{}", formatters::format_journals_page(&snapshot, current_year));
            }
        }
        Command::AddPaper { fields } => {
            let form = PaperForm::create(client);
            form.update(|draft| fields.apply(draft)).await?;
            form.submit().await?;
        }
        Command::EditPaper { id, fields } => {
            let form = PaperForm::edit(client, &id).await?;
            form.update(|draft| fields.apply(draft)).await?;
            form.submit().await?;
        }
        Command::DeletePaper { id, yes } => {
            anyhow::ensure!(yes, "Refusing to delete paper {id} without --yes");
            PaperDetailsView::new(client, id).delete().await?;
        }
        Command::AddAuthor { name, paper_id } => {
            let paper = client.get_paper(&paper_id).await?;
            let form = AuthorForm::create(client);
            form.set_name(name).await?;
            form.select_paper(paper).await?;
            form.submit().await?;
        }
        Command::EditAuthor { id, name } => {
            let form = AuthorForm::edit(client, &id).await?;
            form.set_name(name).await?;
            form.submit().await?;
        }
        Command::DeleteAuthor { id, yes } => {
            anyhow::ensure!(yes, "Refusing to delete author {id} without --yes");
            AuthorsSource::view(client).delete_item(&id).await?;
        }
        Command::Import { file } => {
            let raw = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let papers: Vec<PaperInput> = serde_json::from_str(&raw).context("expected a JSON array of papers")?;
            if let Some(i) = papers.iter().position(|p| p.title.trim().is_empty()) {
                anyhow::bail!("paper #{} has no title", i + 1);
            }
            client.bulk_create_papers(&papers).await?;
            let events = client.session().events();
            events.success(format!("Imported {} papers", papers.len()));
            events.invalidate(paper_catalog::events::ListKind::Papers);
        }
        Command::Profile { name, email } => {
            let editor = ProfileEditor::new(client).await;
            let mut profile = editor.load().await?;
            if name.is_some() || email.is_some() {
                editor.begin_edit().await;
                editor
                    .update(|draft| {
                        if let Some(name) = name {
                            draft.name = name;
                        }
                        if let Some(email) = email {
                            draft.email = email;
                        }
                    })
                    .await?;
                profile = editor.save().await?;
            }
            if format.is_json() {
                println!("{}", serde_json::to_string_pretty(&profile)?);
            } else {
                println!("{}", formatters::format_profile(&profile));
            }
        }
    }

    Ok(())
}

impl PaperArgs {
    fn apply(self, draft: &mut paper_catalog::forms::PaperDraft) {
        if let Some(id) = self.id {
            draft.paper_id = id;
        }
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(summary) = self.summary {
            draft.r#abstract = summary;
        }
        if let Some(year) = self.year {
            draft.year = year;
        }
        if let Some(doi) = self.doi {
            draft.doi = doi;
        }
        if let Some(journal) = self.journal {
            draft.journal = journal;
        }
        if let Some(authors) = self.authors {
            draft.authors = parse_author_list(&authors).join(", ");
        }
        if let Some(flag) = self.covid19 {
            draft.is_covid19 = flag;
        }
        if let Some(flag) = self.full_text {
            draft.has_full_text = flag;
        }
    }
}

fn parse_sort<S: SortOrder>(value: &str) -> anyhow::Result<S> {
    S::parse(value).ok_or_else(|| {
        let choices: Vec<&str> = S::ALL.iter().map(|s| s.as_str()).collect();
        anyhow::anyhow!("unknown sort '{value}', expected one of: {}", choices.join(", "))
    })
}

fn drain_events(receiver: &mut broadcast::Receiver<UiEvent>) {
    for event in drain_pending(receiver) {
        match event {
            UiEvent::Notify(Notification { level, message }) => {
                let tag = match level {
                    NotificationLevel::Success => "ok",
                    NotificationLevel::Info => "info",
                    NotificationLevel::Error => "error",
                };
                eprintln!("[{tag}] {message}");
            }
            UiEvent::Navigate(route) => tracing::debug!(%route, "Navigation"),
            UiEvent::ListInvalidated(list) => tracing::debug!(?list, "List invalidated"),
        }
    }
}
