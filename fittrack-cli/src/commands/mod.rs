mod build;
mod calendar;
mod challenges;
mod config_cmd;
mod dashboard;
mod exercises;
mod goals;
mod login;
mod logout;
mod register;
mod whoami;
mod workout;

use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

use crate::api::ApiClient;
use crate::auth::AuthService;
use crate::config::Config;
use crate::storage::Storage;

pub use calendar::CalendarCommand;
pub use dashboard::DashboardCommand;
pub use login::{LoginCommand, ResetPasswordCommand};
pub use logout::LogoutCommand;
pub use register::RegisterCommand;
pub use whoami::WhoamiCommand;

#[derive(Parser)]
#[command(name = "fittrack")]
#[command(about = "Terminal client for the FitTrack workout and goal tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "FITTRACK_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to FitTrack
    Login(LoginCommand),

    /// Create a FitTrack account
    Register(RegisterCommand),

    /// Request a password reset email
    ResetPassword(ResetPasswordCommand),

    /// Log out and forget the stored session
    Logout(LogoutCommand),

    /// Show current user information
    Whoami(WhoamiCommand),

    /// Launch interactive dashboard
    Dashboard(DashboardCommand),

    /// Show the workout calendar
    Calendar(CalendarCommand),

    /// Manage goals
    #[command(subcommand)]
    Goals(GoalsSubcommands),

    /// Manage workouts
    #[command(subcommand)]
    Workouts(WorkoutSubcommands),

    /// Browse the exercise library
    #[command(subcommand)]
    Exercises(ExerciseSubcommands),

    /// Browse and join challenges
    #[command(subcommand)]
    Challenges(ChallengeSubcommands),

    /// Show achievements and score
    Achievements,

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigSubcommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum GoalsSubcommands {
    /// List goals
    List {
        /// Include completed and abandoned goals
        #[arg(short, long)]
        all: bool,
    },

    /// Create a new goal
    Create,

    /// Record progress towards a goal
    Progress {
        /// Goal ID
        id: String,

        /// New current value
        value: f64,
    },

    /// Mark goal as complete
    Complete {
        /// Goal ID
        id: String,
    },

    /// Delete a goal
    Delete {
        /// Goal ID
        id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum WorkoutSubcommands {
    /// List workouts
    List {
        /// Filter by workout type (strength, cardio, hiit, flexibility, mixed)
        #[arg(short, long)]
        r#type: Option<String>,

        /// Filter by status (planned, in_progress, completed, skipped)
        #[arg(short, long)]
        status: Option<String>,

        /// Filter from date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Filter to date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// List templates instead of sessions
        #[arg(long)]
        templates: bool,

        /// Number of workouts to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Show workout details
    Show {
        /// Workout ID
        id: String,
    },

    /// Build a workout step by step
    Build {
        /// Discard any saved draft and start over
        #[arg(long)]
        fresh: bool,
    },

    /// Mark a workout as completed
    Complete {
        /// Workout ID
        id: String,
    },

    /// Delete a workout
    Delete {
        /// Workout ID
        id: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum ExerciseSubcommands {
    /// Search the exercise library
    List {
        /// Text to search in names and descriptions
        #[arg(short, long)]
        search: Option<String>,

        /// Category (e.g. strength, cardio)
        #[arg(short, long)]
        category: Option<String>,

        /// Difficulty (beginner, intermediate, advanced)
        #[arg(short, long)]
        difficulty: Option<String>,
    },

    /// Show exercise details and instructions
    Show {
        /// Exercise ID
        id: String,
    },

    /// Open the exercise video, falling back to mirrors
    Watch {
        /// Exercise ID
        id: String,

        /// Start from the beginning instead of the saved position
        #[arg(long)]
        restart: bool,
    },
}

#[derive(Subcommand)]
enum ChallengeSubcommands {
    /// List challenges
    List,

    /// Join a challenge
    Join {
        /// Challenge ID
        id: String,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigSubcommands {
    /// Show current configuration
    Show,

    /// Edit configuration file
    Edit,

    /// Initialize configuration with defaults
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

/// Everything a command needs: configuration, the local store and an
/// authenticated client
pub struct AppContext {
    pub config: Config,
    pub auth: AuthService,
}

impl AppContext {
    pub async fn init(config_path: &std::path::Path) -> Result<Self> {
        let config = Config::load_from(config_path)?;

        let data_dir = config.data_dir()?;
        let storage = Storage::open(&data_dir)
            .with_context(|| format!("Failed to open local store at {}", data_dir.display()))?;
        let client = ApiClient::new(&config)?;

        let max_age = config
            .storage
            .session_max_age_hours
            .map(chrono::Duration::hours);
        let auth = AuthService::new(client, storage).with_session_max_age(max_age);

        if auth.restore().await? {
            tracing::debug!("Restored stored session");
        }

        Ok(Self { config, auth })
    }

    pub fn client(&self) -> &ApiClient {
        self.auth.client()
    }

    pub fn storage(&self) -> &Storage {
        self.auth.storage()
    }

    pub fn today() -> NaiveDate {
        chrono::Local::now().date_naive()
    }

    pub fn format_date(&self, date: NaiveDate) -> String {
        date.format(&self.config.ui.date_format).to_string()
    }
}

/// Spinner shown while a request is in flight
pub(crate) fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Parse an optional `YYYY-MM-DD` argument
pub(crate) fn parse_date_arg(raw: Option<&str>, name: &str) -> Result<Option<NaiveDate>> {
    raw.map(|s| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("Invalid {} date '{}', expected YYYY-MM-DD", name, s))
    })
    .transpose()
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        if self.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        let config_path = Config::resolve_path(self.config.as_deref())?;

        // Commands that never touch the network or the local store
        match &self.command {
            Commands::Completions { shell } => {
                generate_completions(*shell);
                return Ok(());
            }
            Commands::Config(subcmd) => return config_cmd::execute(subcmd, &config_path),
            _ => {}
        }

        let ctx = AppContext::init(&config_path).await?;
        let result = self.command.run(&ctx).await;

        if let Err(e) = &result {
            // Forget an expired session before the error is reported
            ctx.auth.handle_error(e).await;
        }
        result
    }
}

impl Commands {
    async fn run(self, ctx: &AppContext) -> Result<()> {
        match self {
            Commands::Login(cmd) => cmd.execute(ctx).await,
            Commands::Register(cmd) => cmd.execute(ctx).await,
            Commands::ResetPassword(cmd) => cmd.execute(ctx).await,
            Commands::Logout(cmd) => cmd.execute(ctx).await,
            Commands::Whoami(cmd) => cmd.execute(ctx).await,
            Commands::Dashboard(cmd) => cmd.execute(ctx).await,
            Commands::Calendar(cmd) => cmd.execute(ctx).await,
            Commands::Goals(subcmd) => {
                ctx.auth.require_auth().await?;
                match subcmd {
                    GoalsSubcommands::List { all } => goals::list_goals(ctx, all).await,
                    GoalsSubcommands::Create => goals::create_goal(ctx).await,
                    GoalsSubcommands::Progress { id, value } => {
                        goals::update_progress(ctx, &id, value).await
                    }
                    GoalsSubcommands::Complete { id } => goals::complete_goal(ctx, &id).await,
                    GoalsSubcommands::Delete { id, force } => {
                        goals::delete_goal(ctx, &id, force).await
                    }
                }
            }
            Commands::Workouts(subcmd) => {
                ctx.auth.require_auth().await?;
                match subcmd {
                    WorkoutSubcommands::List {
                        r#type,
                        status,
                        from,
                        to,
                        templates,
                        limit,
                    } => {
                        let filter = workout::build_filter(
                            r#type.as_deref(),
                            status.as_deref(),
                            from.as_deref(),
                            to.as_deref(),
                            templates,
                        )?;
                        workout::list_workouts(ctx, &filter, limit).await
                    }
                    WorkoutSubcommands::Show { id } => workout::show_workout(ctx, &id).await,
                    WorkoutSubcommands::Build { fresh } => build::run_wizard(ctx, fresh).await,
                    WorkoutSubcommands::Complete { id } => {
                        workout::complete_workout(ctx, &id).await
                    }
                    WorkoutSubcommands::Delete { id, force } => {
                        workout::delete_workout(ctx, &id, force).await
                    }
                }
            }
            Commands::Exercises(subcmd) => {
                ctx.auth.require_auth().await?;
                match subcmd {
                    ExerciseSubcommands::List {
                        search,
                        category,
                        difficulty,
                    } => exercises::list_exercises(ctx, search, category, difficulty).await,
                    ExerciseSubcommands::Show { id } => exercises::show_exercise(ctx, &id).await,
                    ExerciseSubcommands::Watch { id, restart } => {
                        exercises::watch_exercise(ctx, &id, restart).await
                    }
                }
            }
            Commands::Challenges(subcmd) => {
                ctx.auth.require_auth().await?;
                match subcmd {
                    ChallengeSubcommands::List => challenges::list_challenges(ctx).await,
                    ChallengeSubcommands::Join { id } => {
                        challenges::join_challenge(ctx, &id).await
                    }
                }
            }
            Commands::Achievements => {
                ctx.auth.require_auth().await?;
                challenges::show_achievements(ctx).await
            }
            // Handled before a context exists
            Commands::Config(_) | Commands::Completions { .. } => Ok(()),
        }
    }
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
