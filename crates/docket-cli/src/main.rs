mod cmd_advance;
mod cmd_hold;
mod cmd_index;
mod cmd_init;
mod cmd_letter;
mod cmd_project;
mod cmd_report;
mod cmd_retract;
mod cmd_revision;
mod cmd_transmittal;
mod db;
mod input;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "docket",
    version,
    about = "Vendor document register and transmittal tracking"
)]
struct Cli {
    /// Database file (falls back to DOCKET_DB, then ./docket.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the docket database
    Init,
    /// Register projects and their correspondence party codes
    Project {
        #[command(subcommand)]
        cmd: ProjectCmd,
    },
    /// Manage vendor document registers
    Index {
        #[command(subcommand)]
        cmd: IndexCmd,
    },
    /// Register and manage transmittals
    Transmittal {
        #[command(subcommand)]
        cmd: TransmittalCmd,
    },
    /// Record a workflow step on a transmittal or a single revision
    Advance {
        /// Transmittal id to advance (the step fans out to its members)
        #[arg(long)]
        transmittal: Option<String>,
        /// Revision id to advance
        #[arg(long)]
        revision: Option<String>,
        /// Direction code: 01 vendor in, 02 to client, 03 client return, 04 back to vendor
        #[arg(long)]
        direction: String,
        /// Status code the step produces (10, 11, 20, 21, 30)
        #[arg(long)]
        status: String,
        /// Correspondence ref carrying the step
        #[arg(long = "ref")]
        reference: String,
        /// Review result code, required with direction 03
        #[arg(long)]
        result: Option<String>,
        /// Vendor instruction code, required with direction 04
        #[arg(long)]
        reply: Option<String>,
        /// Timestamp of the step (RFC 3339, defaults to now)
        #[arg(long)]
        at: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a recorded step from a ledger (the opening step stays)
    Retract {
        /// Transmittal id holding the event
        #[arg(long)]
        transmittal: Option<String>,
        /// Revision id holding the event
        #[arg(long)]
        revision: Option<String>,
        /// Event id to retract
        #[arg(long)]
        event: String,
    },
    /// Put a revision on hold, or release it
    Hold {
        /// Revision id
        #[arg(long)]
        revision: String,
        /// Reason for the change
        #[arg(long)]
        reason: String,
        /// Release the open hold instead of opening one
        #[arg(long)]
        release: bool,
    },
    /// Inspect or retire single revisions
    Revision {
        #[command(subcommand)]
        cmd: RevisionCmd,
    },
    /// Number, file, and track correspondence
    Letter {
        #[command(subcommand)]
        cmd: LetterCmd,
    },
    /// Progress reports over the register
    Report {
        #[command(subcommand)]
        cmd: ReportCmd,
    },
}

#[derive(Subcommand)]
enum ProjectCmd {
    /// Register a project with its contractor and client codes
    Register {
        /// Project name
        #[arg(long)]
        name: String,
        /// Contractor party code used in correspondence refs
        #[arg(long)]
        contractor: String,
        /// Client party code used in correspondence refs
        #[arg(long)]
        client: String,
    },
    /// List registered projects
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum IndexCmd {
    /// Open a register for a vendor from a planned-documents CSV
    Create {
        /// Vendor engagement reference
        #[arg(long)]
        vendor: String,
        /// CSV with document_number, document_title, category_ref, target_date
        #[arg(long)]
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Append further planned documents to a register
    Import {
        /// Register id
        #[arg(long)]
        index: String,
        /// CSV with document_number, document_title, category_ref, target_date
        #[arg(long)]
        file: PathBuf,
    },
    /// Rewrite, add, or retire register entries in one pass
    Edit {
        /// Register id
        #[arg(long)]
        index: String,
        /// Entry id to rewrite; title, category, and target are replaced together
        #[arg(long)]
        entry: Option<String>,
        /// New document title for --entry
        #[arg(long)]
        title: Option<String>,
        /// New category ref for --entry (omit to clear)
        #[arg(long)]
        category: Option<String>,
        /// New planned return date for --entry, YYYY-MM-DD (omit to clear)
        #[arg(long)]
        target: Option<String>,
        /// CSV of additional entries to append
        #[arg(long)]
        add: Option<PathBuf>,
        /// Entry id to retire (repeatable)
        #[arg(long = "remove")]
        removes: Vec<String>,
        /// Reason recorded on retired entries
        #[arg(long)]
        reason: Option<String>,
    },
    /// Attach a received batch straight onto the register, without a transmittal
    Receive {
        /// Register id
        #[arg(long)]
        index: String,
        /// CSV with document_number, document_title, revision_label
        #[arg(long)]
        file: PathBuf,
    },
    /// Retire a register together with its entries and revisions
    Remove {
        /// Register id
        #[arg(long)]
        index: String,
        /// Reason for the removal
        #[arg(long)]
        reason: String,
    },
    /// List registers
    List {
        /// Page number (8 per page)
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum TransmittalCmd {
    /// Register an incoming transmittal from a received-documents CSV
    Create {
        /// Vendor engagement reference
        #[arg(long)]
        vendor: String,
        /// Correspondence ref of the transmittal
        #[arg(long = "ref")]
        reference: String,
        /// Sending party
        #[arg(long)]
        sender: String,
        /// Receiving party
        #[arg(long)]
        receiver: String,
        /// CSV with document_number, document_title, revision_label
        #[arg(long)]
        file: PathBuf,
        /// Receipt timestamp (RFC 3339, defaults to now)
        #[arg(long)]
        at: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Attach further received documents to an existing transmittal
    Extend {
        /// Transmittal id
        #[arg(long)]
        transmittal: String,
        /// CSV with document_number, document_title, revision_label
        #[arg(long)]
        file: PathBuf,
    },
    /// Cancel a transmittal and retire its active members
    Cancel {
        /// Transmittal id
        #[arg(long)]
        transmittal: String,
        /// Reason for the cancellation
        #[arg(long)]
        reason: String,
    },
    /// List transmittals
    List {
        /// Filter by vendor engagement reference
        #[arg(long)]
        vendor: Option<String>,
        /// Page number (10 per page)
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a transmittal with its members and ledger
    Show {
        /// Transmittal id
        #[arg(long)]
        transmittal: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum RevisionCmd {
    /// Show a revision with its ledger and holds
    Show {
        /// Revision id
        #[arg(long)]
        revision: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Retire a revision; its ledger history stays
    Remove {
        /// Revision id
        #[arg(long)]
        revision: String,
        /// Reason for the removal
        #[arg(long)]
        reason: String,
    },
}

#[derive(Subcommand)]
enum LetterCmd {
    /// Issue the next correspondence ref without filing a record
    Number {
        /// Project id
        #[arg(long)]
        project: String,
        /// Correspondence kind: T or L
        #[arg(long)]
        kind: String,
        /// Sender party code (01 contractor, 02 client)
        #[arg(long)]
        sender: String,
        /// Receiver party code (01 contractor, 02 client)
        #[arg(long)]
        receiver: String,
    },
    /// Number and file a correspondence record in one step
    File {
        /// Project id
        #[arg(long)]
        project: String,
        /// Correspondence kind: T or L
        #[arg(long)]
        kind: String,
        /// Sender party code (01 contractor, 02 client)
        #[arg(long)]
        sender: String,
        /// Receiver party code (01 contractor, 02 client)
        #[arg(long)]
        receiver: String,
        /// Document number or transmittal ref the letter is about (repeatable)
        #[arg(long = "link")]
        links: Vec<String>,
        /// Pre-issued correspondence ref (from `letter number`); generated
        /// when omitted
        #[arg(long = "ref")]
        reference: Option<String>,
        /// Send date, YYYY-MM-DD
        #[arg(long)]
        sent: Option<String>,
        /// Date a reply is expected by, YYYY-MM-DD
        #[arg(long)]
        reply_by: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record the reply date on a filed letter
    Reply {
        /// Correspondence id
        #[arg(long)]
        letter: String,
        /// Date the reply arrived, YYYY-MM-DD
        #[arg(long)]
        date: String,
    },
    /// Cancel a filed letter
    Cancel {
        /// Correspondence id
        #[arg(long)]
        letter: String,
        /// Reason for the cancellation
        #[arg(long)]
        reason: String,
    },
    /// List filed correspondence
    List {
        /// Filter by project id
        #[arg(long)]
        project: Option<String>,
        /// Page number (10 per page)
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Letters past their target reply date with no reply recorded
    Overdue {
        /// Project id
        #[arg(long)]
        project: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ReportCmd {
    /// Register totals: entries, revisions received, first submissions, flags
    Overview {
        /// Register id
        #[arg(long)]
        index: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Entry counts grouped by current status
    Breakdown {
        /// Register id
        #[arg(long)]
        index: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Entries with their revision chains, five per page
    Drilldown {
        /// Register id
        #[arg(long)]
        index: String,
        /// Page number; entries and chain windows page together
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Latest submission per entry across a vendor's registers
    Latest {
        /// Vendor engagement reference
        #[arg(long)]
        vendor: String,
        /// Page number (30 per page)
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let db_path = db::resolve_path(cli.db);

    match cli.cmd {
        Command::Init => cmd_init::execute(&db_path),
        Command::Project { cmd } => match cmd {
            ProjectCmd::Register {
                name,
                contractor,
                client,
            } => cmd_project::register(&db_path, &name, &contractor, &client),
            ProjectCmd::List { json } => cmd_project::list(&db_path, json),
        },
        Command::Index { cmd } => match cmd {
            IndexCmd::Create { vendor, file, json } => {
                cmd_index::create(&db_path, &vendor, &file, json)
            }
            IndexCmd::Import { index, file } => cmd_index::import(&db_path, &index, &file),
            IndexCmd::Edit {
                index,
                entry,
                title,
                category,
                target,
                add,
                removes,
                reason,
            } => cmd_index::edit(&cmd_index::EditParams {
                db_path: &db_path,
                index: &index,
                entry: entry.as_deref(),
                title: title.as_deref(),
                category: category.as_deref(),
                target: target.as_deref(),
                add: add.as_deref(),
                removes: &removes,
                reason: reason.as_deref(),
            }),
            IndexCmd::Receive { index, file } => cmd_index::receive(&db_path, &index, &file),
            IndexCmd::Remove { index, reason } => cmd_index::remove(&db_path, &index, &reason),
            IndexCmd::List { page, json } => cmd_index::list(&db_path, page, json),
        },
        Command::Transmittal { cmd } => match cmd {
            TransmittalCmd::Create {
                vendor,
                reference,
                sender,
                receiver,
                file,
                at,
                json,
            } => cmd_transmittal::create(&cmd_transmittal::CreateParams {
                db_path: &db_path,
                vendor: &vendor,
                reference: &reference,
                sender: &sender,
                receiver: &receiver,
                file: &file,
                at: at.as_deref(),
                json,
            }),
            TransmittalCmd::Extend { transmittal, file } => {
                cmd_transmittal::extend(&db_path, &transmittal, &file)
            }
            TransmittalCmd::Cancel {
                transmittal,
                reason,
            } => cmd_transmittal::cancel(&db_path, &transmittal, &reason),
            TransmittalCmd::List { vendor, page, json } => {
                cmd_transmittal::list(&db_path, vendor.as_deref(), page, json)
            }
            TransmittalCmd::Show { transmittal, json } => {
                cmd_transmittal::show(&db_path, &transmittal, json)
            }
        },
        Command::Advance {
            transmittal,
            revision,
            direction,
            status,
            reference,
            result,
            reply,
            at,
            json,
        } => cmd_advance::execute(&cmd_advance::AdvanceParams {
            db_path: &db_path,
            transmittal: transmittal.as_deref(),
            revision: revision.as_deref(),
            direction: &direction,
            status: &status,
            reference: &reference,
            result: result.as_deref(),
            reply: reply.as_deref(),
            at: at.as_deref(),
            json,
        }),
        Command::Retract {
            transmittal,
            revision,
            event,
        } => cmd_retract::execute(&db_path, transmittal.as_deref(), revision.as_deref(), &event),
        Command::Hold {
            revision,
            reason,
            release,
        } => cmd_hold::execute(&db_path, &revision, &reason, release),
        Command::Revision { cmd } => match cmd {
            RevisionCmd::Show { revision, json } => cmd_revision::show(&db_path, &revision, json),
            RevisionCmd::Remove { revision, reason } => {
                cmd_revision::remove(&db_path, &revision, &reason)
            }
        },
        Command::Letter { cmd } => match cmd {
            LetterCmd::Number {
                project,
                kind,
                sender,
                receiver,
            } => cmd_letter::number(&db_path, &project, &kind, &sender, &receiver),
            LetterCmd::File {
                project,
                kind,
                sender,
                receiver,
                links,
                reference,
                sent,
                reply_by,
                json,
            } => cmd_letter::file(&cmd_letter::FileParams {
                db_path: &db_path,
                project: &project,
                kind: &kind,
                sender: &sender,
                receiver: &receiver,
                links,
                reference: reference.as_deref(),
                sent: sent.as_deref(),
                reply_by: reply_by.as_deref(),
                json,
            }),
            LetterCmd::Reply { letter, date } => cmd_letter::reply(&db_path, &letter, &date),
            LetterCmd::Cancel { letter, reason } => cmd_letter::cancel(&db_path, &letter, &reason),
            LetterCmd::List {
                project,
                page,
                json,
            } => cmd_letter::list(&db_path, project.as_deref(), page, json),
            LetterCmd::Overdue { project, json } => cmd_letter::overdue(&db_path, &project, json),
        },
        Command::Report { cmd } => match cmd {
            ReportCmd::Overview { index, json } => cmd_report::overview(&db_path, &index, json),
            ReportCmd::Breakdown { index, json } => cmd_report::breakdown(&db_path, &index, json),
            ReportCmd::Drilldown { index, page, json } => {
                cmd_report::drilldown(&db_path, &index, page, json)
            }
            ReportCmd::Latest { vendor, page, json } => {
                cmd_report::latest(&db_path, &vendor, page, json)
            }
        },
    }
}
