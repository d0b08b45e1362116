use anyhow::Result;
use bandbook_core::model::{
    AvailabilityStatus, DayKey, Energy, GigStatus, Language, SongDuration, Vocalist,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod output;

use commands::Session;

#[derive(Debug, Parser)]
#[command(name = "bandbook", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the database (default: ~/.local/share/bandbook/bandbook.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Act as this band member instead of as the local administrator
    #[arg(long = "as", value_name = "MEMBER_ID", global = true)]
    as_member: Option<String>,

    /// Print records as JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Manage the song catalog
    #[command(subcommand)]
    Song(SongCommand),

    /// Manage band members
    #[command(subcommand)]
    Member(MemberCommand),

    /// Record and review who can play when
    ///
    /// Each core member answers available, maybe or unavailable per date.
    /// A date is `full` when every core member is available, `partial` when
    /// someone is a maybe, `conflict` when someone is unavailable, and
    /// `unknown` until every core member has answered.
    #[command(subcommand)]
    Avail(AvailCommand),

    /// Build and inspect setlists
    #[command(subcommand)]
    Set(SetCommand),

    /// Manage gigs
    #[command(subcommand)]
    Gig(GigCommand),

    /// Ask the text-generation service for a setlist
    ///
    /// The catalog and your constraints are sent to an OpenAI-compatible
    /// chat completions API (see `bandbook config`). Songs the service
    /// invents or repeats are dropped before the result is shown.
    Suggest {
        /// Name for the setlist
        name: String,

        /// Target total playing time in minutes
        #[arg(long)]
        minutes: Option<u32>,

        /// Approximate number of songs
        #[arg(long)]
        count: Option<usize>,

        /// Language to favour (danish or english)
        #[arg(long)]
        language: Option<Language>,

        /// Desired energy curve, e.g. "start high, dip in the middle"
        #[arg(long)]
        energy_arc: Option<String>,

        /// Any other instructions
        #[arg(long)]
        notes: Option<String>,

        /// Store the result as a new setlist
        #[arg(long)]
        save: bool,
    },

    /// Show catalog and calendar totals
    Status,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Subcommand)]
enum SongCommand {
    /// Add a song to the catalog
    Add {
        title: String,
        artist: String,
        #[command(flatten)]
        fields: SongFields,
    },
    /// List songs, optionally filtered
    List {
        #[arg(long)]
        language: Option<Language>,
        #[arg(long)]
        vocalist: Option<Vocalist>,
        #[arg(long)]
        energy: Option<Energy>,
        #[arg(long)]
        tag: Option<String>,
        /// Case-insensitive match on title or artist
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one song
    Show { id: String },
    /// Change fields of a song
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        artist: Option<String>,
        #[command(flatten)]
        fields: SongFields,
    },
    /// Remove a song from the catalog
    ///
    /// Setlists that use the song keep working; the missing reference is
    /// skipped when they are read.
    Remove { id: String },
}

#[derive(Debug, Default, clap::Args)]
pub struct SongFields {
    /// Musical key, e.g. "Am"
    #[arg(long)]
    pub key: Option<String>,
    /// Minutes ("4.5") or minutes and seconds ("4:30")
    #[arg(long)]
    pub duration: Option<SongDuration>,
    #[arg(long)]
    pub language: Option<Language>,
    #[arg(long)]
    pub vocalist: Option<Vocalist>,
    #[arg(long)]
    pub energy: Option<Energy>,
    /// Bass instrument used for the song
    #[arg(long)]
    pub bass: Option<String>,
    /// Guitar used for the song
    #[arg(long)]
    pub guitar: Option<String>,
    /// Tag; repeat for several
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    /// Medley the song belongs to
    #[arg(long)]
    pub medley: Option<String>,
    /// Position within the medley
    #[arg(long, requires = "medley")]
    pub medley_position: Option<u32>,
}

#[derive(Debug, Subcommand)]
enum MemberCommand {
    /// Add a band member
    Add {
        name: String,
        instrument: String,
        /// Part of the fixed roster used for availability
        #[arg(long)]
        core: bool,
        /// Login account linked to the member
        #[arg(long)]
        user: Option<String>,
    },
    /// List band members
    List,
    /// Remove a band member
    Remove { id: String },
}

#[derive(Debug, Subcommand)]
enum AvailCommand {
    /// Record an answer for a date (DD-MM-YYYY)
    Set {
        date: DayKey,
        status: AvailabilityStatus,
        /// Member to answer for (defaults to yourself)
        #[arg(long)]
        member: Option<String>,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Show the status and answers for one date
    Day { date: DayKey },
    /// Show the status of every date in a month
    Month { year: i32, month: u32 },
}

#[derive(Debug, Subcommand)]
enum SetCommand {
    /// Create a setlist from song ids, in playing order
    Create {
        name: String,
        songs: Vec<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List setlists
    List,
    /// Show a setlist with its songs and figures
    Show { id: String },
    /// Append songs to a setlist
    Add { id: String, songs: Vec<String> },
    /// Take a song out of a setlist
    Drop { id: String, song: String },
    /// Replace the running order
    Reorder { id: String, songs: Vec<String> },
    /// Delete a setlist
    Remove { id: String },
}

#[derive(Debug, Subcommand)]
enum GigCommand {
    /// Add a gig (date as YYYY-MM-DD)
    Add {
        name: String,
        date: NaiveDate,
        venue: String,
        #[arg(long)]
        status: Option<GigStatus>,
    },
    /// List the gigs you can see
    List,
    /// Show one gig
    Show { id: String },
    /// Change a gig's status
    Status { id: String, status: GigStatus },
    /// Book a member for a gig
    Book {
        id: String,
        member: String,
        instrument: String,
        /// The member stands in for a core player
        #[arg(long)]
        replacement: bool,
    },
    /// Attach a setlist to a gig
    Attach { id: String, setlist: String },
    /// Add to a gig's comment thread
    Comment { id: String, text: String },
    /// Delete a gig
    Remove { id: String },
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file if it does not exist
    Init,
    /// Print one value, or the whole file
    Get { key: Option<String> },
    /// Set a value in the config file
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Config(command) = cli.command {
        return match command {
            ConfigCommand::Show => commands::config::show_config(),
            ConfigCommand::Path => commands::config::show_path(),
            ConfigCommand::Example => commands::config::show_example(),
            ConfigCommand::Init => commands::config::init_config(),
            ConfigCommand::Get { key } => commands::config::get_config(key),
            ConfigCommand::Set { key, value } => commands::config::set_config(&key, &value),
        };
    }

    let config = match cli.db {
        Some(path) => bandbook_ai::Config::load_with_db_path(path)?,
        None => bandbook_ai::Config::load()?,
    };
    let session = Session::open(config, cli.as_member.as_deref(), cli.json)?;
    tracing::debug!(
        db = %session.config.database_path.display(),
        user = %session.principal.user_id,
        "session opened"
    );

    match cli.command {
        Commands::Song(command) => match command {
            SongCommand::Add {
                title,
                artist,
                fields,
            } => commands::song::add(&session, title, artist, fields)?,
            SongCommand::List {
                language,
                vocalist,
                energy,
                tag,
                search,
            } => {
                let filter = bandbook_core::model::SongFilter {
                    language,
                    vocalist,
                    energy,
                    tag,
                    text: search,
                };
                commands::song::list(&session, &filter)?;
            }
            SongCommand::Show { id } => commands::song::show(&session, &id)?,
            SongCommand::Edit {
                id,
                title,
                artist,
                fields,
            } => commands::song::edit(&session, &id, title, artist, fields)?,
            SongCommand::Remove { id } => commands::song::remove(&session, &id)?,
        },
        Commands::Member(command) => match command {
            MemberCommand::Add {
                name,
                instrument,
                core,
                user,
            } => commands::member::add(&session, name, instrument, core, user)?,
            MemberCommand::List => commands::member::list(&session)?,
            MemberCommand::Remove { id } => commands::member::remove(&session, &id)?,
        },
        Commands::Avail(command) => match command {
            AvailCommand::Set {
                date,
                status,
                member,
                comment,
            } => commands::avail::set(&session, date, status, member, comment)?,
            AvailCommand::Day { date } => commands::avail::day(&session, date)?,
            AvailCommand::Month { year, month } => commands::avail::month(&session, year, month)?,
        },
        Commands::Set(command) => match command {
            SetCommand::Create { name, songs, notes } => {
                commands::set::create(&session, name, songs, notes)?;
            }
            SetCommand::List => commands::set::list(&session)?,
            SetCommand::Show { id } => commands::set::show(&session, &id)?,
            SetCommand::Add { id, songs } => commands::set::add(&session, &id, songs)?,
            SetCommand::Drop { id, song } => commands::set::drop_song(&session, &id, &song)?,
            SetCommand::Reorder { id, songs } => commands::set::reorder(&session, &id, songs)?,
            SetCommand::Remove { id } => commands::set::remove(&session, &id)?,
        },
        Commands::Gig(command) => match command {
            GigCommand::Add {
                name,
                date,
                venue,
                status,
            } => commands::gig::add(&session, name, date, venue, status)?,
            GigCommand::List => commands::gig::list(&session)?,
            GigCommand::Show { id } => commands::gig::show(&session, &id)?,
            GigCommand::Status { id, status } => commands::gig::set_status(&session, &id, status)?,
            GigCommand::Book {
                id,
                member,
                instrument,
                replacement,
            } => commands::gig::book(&session, &id, member, instrument, replacement)?,
            GigCommand::Attach { id, setlist } => commands::gig::attach(&session, &id, &setlist)?,
            GigCommand::Comment { id, text } => commands::gig::comment(&session, &id, text)?,
            GigCommand::Remove { id } => commands::gig::remove(&session, &id)?,
        },
        Commands::Suggest {
            name,
            minutes,
            count,
            language,
            energy_arc,
            notes,
            save,
        } => {
            let mut request = bandbook_ai::SuggestRequest::new(name);
            request.target_minutes = minutes;
            request.song_count = count;
            request.preferred_language = language;
            request.energy_arc = energy_arc;
            request.notes = notes;
            commands::suggest::run(&session, &request, save).await?;
        }
        Commands::Status => commands::status::show_status(&session)?,
        Commands::Config(_) => {}
    }

    Ok(())
}
