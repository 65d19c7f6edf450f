//! `studybadge` command-line front end over `studybadge_core`.
//!
//! Every command prints JSON to stdout. The wall clock is read here and
//! passed into the engine.

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use rusqlite::Connection;
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use studybadge_core::{
    init_logging_from_config, open_db, CoreConfig, EditScope, LogNotificationScheduler,
    MemberId, MemberRole, RepeatCycle, RepeatScheduleCreateRequest, RepeatScheduleEdit,
    RepeatSituation, ScheduleChanges, ScheduleDeleteRequest, ScheduleDetails, ScheduleEditRequest,
    ScheduleService, ScheduleType, SingleScheduleCreateRequest, SingleScheduleEdit,
    SqliteScheduleRepository, SqliteStudyDirectory, StudyChannelId,
};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "studybadge")]
#[command(about = "Manage study channel meeting schedules")]
struct Cli {
    /// Path to a TOML config file (defaults are used when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print core health and version
    Ping,
    /// Create a study channel
    CreateChannel { name: String },
    /// Add a member to a channel or change their role
    AddMember {
        #[arg(long)]
        channel: StudyChannelId,
        #[arg(long)]
        member: MemberId,
        #[arg(long)]
        leader: bool,
    },
    /// Create a one-off meeting
    CreateSingle {
        #[command(flatten)]
        target: Target,
        /// Meeting date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        #[command(flatten)]
        details: DetailsArgs,
    },
    /// Create a repeating meeting
    CreateRepeat {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        start_date: NaiveDate,
        #[arg(long)]
        end_date: NaiveDate,
        #[arg(long, value_enum)]
        cycle: CycleArg,
        /// `everyday`, a weekday name, or a day of month; derived from
        /// the start date when omitted
        #[arg(long)]
        situation: Option<String>,
        #[command(flatten)]
        details: DetailsArgs,
    },
    /// Change the fields of a one-off meeting; its date is kept
    EditSingle {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        schedule: Uuid,
        #[arg(long)]
        date: NaiveDate,
        #[command(flatten)]
        details: DetailsArgs,
    },
    /// Turn a one-off meeting into a series, or move a series' start
    EditRepeat {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        schedule: Uuid,
        /// Kind of the schedule being edited
        #[arg(long, value_enum)]
        origin: OriginArg,
        /// New series start (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        end_date: NaiveDate,
        #[arg(long, value_enum)]
        cycle: CycleArg,
        #[arg(long)]
        situation: Option<String>,
        #[command(flatten)]
        details: DetailsArgs,
    },
    /// Replace one occurrence of a repeating meeting with a one-off meeting
    EditOccurrence {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        schedule: Uuid,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, value_enum, default_value = "this")]
        scope: ScopeArg,
        #[command(flatten)]
        details: DetailsArgs,
    },
    /// Delete a one-off meeting
    DeleteSingle {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        schedule: Uuid,
        #[arg(long)]
        date: NaiveDate,
    },
    /// Delete one occurrence of a repeating meeting
    DeleteOccurrence {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        schedule: Uuid,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, value_enum, default_value = "this")]
        scope: ScopeArg,
    },
    /// List schedules, optionally limited to one month
    List {
        #[command(flatten)]
        target: Target,
        #[arg(long, requires = "month")]
        year: Option<i32>,
        #[arg(long, requires = "year")]
        month: Option<u32>,
    },
    /// Expand schedules into dated occurrences
    Occurrences {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
    },
}

#[derive(clap::Args)]
struct Target {
    #[arg(long)]
    channel: StudyChannelId,
    /// Acting member
    #[arg(long)]
    member: MemberId,
}

#[derive(clap::Args)]
struct DetailsArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    content: String,
    /// Start time (HH:MM)
    #[arg(long, value_parser = parse_time)]
    start_time: NaiveTime,
    /// End time (HH:MM)
    #[arg(long, value_parser = parse_time)]
    end_time: NaiveTime,
    #[arg(long)]
    place: Option<i64>,
}

impl From<DetailsArgs> for ScheduleDetails {
    fn from(args: DetailsArgs) -> Self {
        Self {
            name: args.name,
            content: args.content,
            start_time: args.start_time,
            end_time: args.end_time,
            place_id: args.place,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CycleArg {
    Daily,
    Weekly,
    Monthly,
}

impl From<CycleArg> for RepeatCycle {
    fn from(value: CycleArg) -> Self {
        match value {
            CycleArg::Daily => Self::Daily,
            CycleArg::Weekly => Self::Weekly,
            CycleArg::Monthly => Self::Monthly,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OriginArg {
    Single,
    Repeat,
}

impl From<OriginArg> for ScheduleType {
    fn from(value: OriginArg) -> Self {
        match value {
            OriginArg::Single => Self::Single,
            OriginArg::Repeat => Self::Repeat,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ScopeArg {
    /// Only the selected occurrence
    This,
    /// The selected occurrence and every later one
    Future,
}

impl From<ScopeArg> for EditScope {
    fn from(value: ScopeArg) -> Self {
        match value {
            ScopeArg::This => Self::ThisOnly,
            ScopeArg::Future => Self::ThisAndFuture,
        }
    }
}

fn parse_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|err| format!("invalid time `{value}`: {err}"))
}

fn parse_situation(
    value: Option<String>,
    date: NaiveDate,
    cycle: RepeatCycle,
) -> Result<RepeatSituation> {
    match value {
        Some(value) => match RepeatSituation::parse(&value) {
            Some(parsed) => Ok(parsed),
            None => bail!("invalid repeat situation `{value}`"),
        },
        None => Ok(RepeatSituation::for_date(date, cycle)),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CoreConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => CoreConfig::default(),
    };
    init_logging_from_config(&config.logging).map_err(anyhow::Error::msg)?;

    let conn = open_db(&config.database.path)
        .with_context(|| format!("opening database {}", config.database.path.display()))?;
    let now = Local::now().naive_local();
    info!("event=cli_command module=cli status=start now={now}");

    run(cli.command, &conn, config.notifications.enabled, now)
}

fn run(
    command: Commands,
    conn: &Connection,
    notifications_enabled: bool,
    now: NaiveDateTime,
) -> Result<()> {
    match command {
        Commands::Ping => print_json(&json!({
            "ping": studybadge_core::ping(),
            "version": studybadge_core::core_version(),
        })),
        Commands::CreateChannel { name } => {
            let directory = SqliteStudyDirectory::try_new(conn)?;
            print_json(&directory.create_channel(&name)?)
        }
        Commands::AddMember {
            channel,
            member,
            leader,
        } => {
            let role = if leader {
                MemberRole::Leader
            } else {
                MemberRole::Participant
            };
            SqliteStudyDirectory::try_new(conn)?.upsert_member(channel, member, role)?;
            print_json(&json!({
                "channel_id": channel,
                "member_id": member,
                "role": role,
            }))
        }
        Commands::CreateSingle {
            target,
            date,
            details,
        } => {
            let request = SingleScheduleCreateRequest {
                member_id: target.member,
                date,
                details: details.into(),
            };
            let service = schedule_service(conn, notifications_enabled)?;
            print_json(&service.create_single_schedule(target.channel, &request)?)
        }
        Commands::CreateRepeat {
            target,
            start_date,
            end_date,
            cycle,
            situation,
            details,
        } => {
            let cycle = RepeatCycle::from(cycle);
            let situation = parse_situation(situation, start_date, cycle)?;
            let request = RepeatScheduleCreateRequest {
                member_id: target.member,
                start_date,
                end_date,
                cycle,
                situation,
                details: details.into(),
            };
            let service = schedule_service(conn, notifications_enabled)?;
            print_json(&service.create_repeat_schedule(target.channel, &request)?)
        }
        Commands::EditSingle {
            target,
            schedule,
            date,
            details,
        } => {
            let request = ScheduleEditRequest::Single(SingleScheduleEdit {
                origin_type: ScheduleType::Single,
                schedule_id: schedule,
                member_id: target.member,
                selected_date: date,
                details: details.into(),
            });
            let service = schedule_service(conn, notifications_enabled)?;
            let changes = service.edit_schedule(target.channel, request, now)?;
            print_changes(&changes)
        }
        Commands::EditRepeat {
            target,
            schedule,
            origin,
            date,
            end_date,
            cycle,
            situation,
            details,
        } => {
            let cycle = RepeatCycle::from(cycle);
            let request = ScheduleEditRequest::Repeat(RepeatScheduleEdit {
                origin_type: origin.into(),
                schedule_id: schedule,
                member_id: target.member,
                selected_date: date,
                end_date,
                cycle,
                situation: parse_situation(situation, date, cycle)?,
                details: details.into(),
            });
            let service = schedule_service(conn, notifications_enabled)?;
            let changes = service.edit_schedule(target.channel, request, now)?;
            print_changes(&changes)
        }
        Commands::EditOccurrence {
            target,
            schedule,
            date,
            scope,
            details,
        } => {
            let edit = SingleScheduleEdit {
                origin_type: ScheduleType::Repeat,
                schedule_id: schedule,
                member_id: target.member,
                selected_date: date,
                details: details.into(),
            };
            let service = schedule_service(conn, notifications_enabled)?;
            let changes =
                service.edit_repeat_occurrence(target.channel, scope.into(), edit, now)?;
            print_changes(&changes)
        }
        Commands::DeleteSingle {
            target,
            schedule,
            date,
        } => {
            let request = ScheduleDeleteRequest {
                schedule_id: schedule,
                member_id: target.member,
                selected_date: date,
            };
            let service = schedule_service(conn, notifications_enabled)?;
            let changes = service.delete_single_schedule(target.channel, &request, now)?;
            print_changes(&changes)
        }
        Commands::DeleteOccurrence {
            target,
            schedule,
            date,
            scope,
        } => {
            let request = ScheduleDeleteRequest {
                schedule_id: schedule,
                member_id: target.member,
                selected_date: date,
            };
            let service = schedule_service(conn, notifications_enabled)?;
            let changes =
                service.delete_repeat_occurrence(target.channel, scope.into(), &request, now)?;
            print_changes(&changes)
        }
        Commands::List {
            target,
            year,
            month,
        } => {
            let service = schedule_service(conn, notifications_enabled)?;
            let schedules = match (year, month) {
                (Some(year), Some(month)) => {
                    service.list_schedules_in_month(target.member, target.channel, year, month)?
                }
                _ => service.list_schedules(target.member, target.channel)?,
            };
            print_json(&schedules)
        }
        Commands::Occurrences { target, from, to } => {
            let service = schedule_service(conn, notifications_enabled)?;
            print_json(&service.list_occurrences(target.member, target.channel, from, to)?)
        }
    }
}

type CliScheduleService<'conn> = ScheduleService<
    SqliteScheduleRepository<'conn>,
    SqliteStudyDirectory<'conn>,
    LogNotificationScheduler,
>;

fn schedule_service(
    conn: &Connection,
    notifications_enabled: bool,
) -> Result<CliScheduleService<'_>> {
    Ok(ScheduleService::new(
        SqliteScheduleRepository::try_new(conn)?,
        SqliteStudyDirectory::try_new(conn)?,
        LogNotificationScheduler::new(notifications_enabled),
    ))
}

fn print_changes(changes: &ScheduleChanges) -> Result<()> {
    let mutations: Vec<_> = changes
        .mutations
        .iter()
        .map(|mutation| {
            json!({
                "kind": mutation.kind(),
                "schedule_id": mutation.schedule_id(),
            })
        })
        .collect();
    print_json(&json!({
        "notice": changes.notice,
        "mutations": mutations,
    }))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
