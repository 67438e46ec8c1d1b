use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "strato",
    about = "Strato — compute cluster admin CLI",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Output raw JSON (for scripting/piping)
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the information about the given group
    Group {
        /// Group ID
        gid: String,
    },

    /// List and manage groups (admin privilege required)
    Groups {
        /// Domain name to list groups belonging to it
        #[arg(short = 'd', long)]
        domain_name: Option<String>,

        #[command(subcommand)]
        command: Option<GroupsCommand>,
    },

    /// List compute sessions
    Sessions {
        /// Filter by the given status
        #[arg(long, value_enum, default_value = "RUNNING")]
        status: SessionStatus,
        /// Get sessions for a specific access key (super-admin only)
        #[arg(long)]
        access_key: Option<String>,
    },

    /// Show detailed information for a compute session
    Session {
        /// The session ID or its alias given when creating the session
        name: String,
    },

    /// Manager-related operations
    #[command(subcommand)]
    Manager(ManagerCommand),

    /// Global announcement commands
    #[command(subcommand)]
    Announcement(AnnouncementCommand),

    /// Get available resources from the scaling groups
    GetResources {
        /// Scaling group to inspect
        #[arg(default_value = "default")]
        scaling_group: String,
        /// Group to inspect
        #[arg(default_value = "default")]
        group: String,
        /// Get resources of every scaling group
        #[arg(short, long)]
        all: bool,
    },

    /// Manage CLI configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
pub enum GroupsCommand {
    /// Add a new group to a domain
    Add {
        /// Name of the domain where the new group belongs to
        domain_name: String,
        /// Name of the new group
        name: String,
        /// Description of the new group
        #[arg(short = 'd', long, default_value = "")]
        description: String,
        /// Create the group as inactive
        #[arg(short = 'i', long)]
        inactive: bool,
    },
    /// Update an existing group (group IDs are unique across domains)
    Update {
        /// Group ID to update
        gid: String,
        /// New name of the group
        #[arg(short = 'n', long)]
        name: Option<String>,
        /// New description of the group
        #[arg(short = 'd', long)]
        description: Option<String>,
        /// Set the group active or inactive
        #[arg(long)]
        is_active: Option<bool>,
    },
    /// Delete an existing group
    Delete {
        /// Group ID to delete
        gid: String,
    },
    /// Add users to a group
    AddUsers {
        /// Group ID the users will belong to
        gid: String,
        /// UUIDs of the users to add
        #[arg(required = true)]
        user_uuids: Vec<String>,
    },
    /// Remove users from a group
    RemoveUsers {
        /// Group ID the users currently belong to
        gid: String,
        /// UUIDs of the users to remove
        #[arg(required = true)]
        user_uuids: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum ManagerCommand {
    /// Show the manager's current status
    Status,
    /// Freeze the manager so that no new session is scheduled
    Freeze {
        /// Hold up freezing until there are no running sessions left
        #[arg(long)]
        wait: bool,
        /// Kill all running sessions immediately, then freeze
        #[arg(long)]
        force_kill: bool,
    },
    /// Unfreeze the manager
    Unfreeze,
    /// Scheduler operations
    #[command(subcommand)]
    Scheduler(SchedulerCommand),
}

#[derive(Subcommand)]
pub enum SchedulerCommand {
    /// Include agents in scheduling so they accept new session containers
    IncludeAgents {
        #[arg(required = true)]
        agent_ids: Vec<String>,
    },
    /// Exclude agents from scheduling until they are included again
    ExcludeAgents {
        #[arg(required = true)]
        agent_ids: Vec<String>,
    },
}

#[derive(Subcommand)]
pub enum AnnouncementCommand {
    /// Get the current announcement
    Get,
    /// Post a new announcement
    Update {
        /// Announcement message; opens an editor when omitted
        #[arg(short = 'm', long)]
        message: Option<String>,
    },
    /// Delete the current announcement
    Delete,
    /// Do not show the last announcement again
    Dismiss,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Key name (endpoint, endpoint_type, access_key)
        key: String,
        /// Value to set
        value: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "UPPER")]
pub enum SessionStatus {
    Preparing,
    Building,
    Running,
    Restarting,
    Resizing,
    Suspended,
    Terminating,
    Terminated,
    Error,
    All,
}

impl SessionStatus {
    /// The status filter sent to the server; `ALL` means no filter.
    pub fn as_filter(self) -> Option<&'static str> {
        match self {
            SessionStatus::Preparing => Some("PREPARING"),
            SessionStatus::Building => Some("BUILDING"),
            SessionStatus::Running => Some("RUNNING"),
            SessionStatus::Restarting => Some("RESTARTING"),
            SessionStatus::Resizing => Some("RESIZING"),
            SessionStatus::Suspended => Some("SUSPENDED"),
            SessionStatus::Terminating => Some("TERMINATING"),
            SessionStatus::Terminated => Some("TERMINATED"),
            SessionStatus::Error => Some("ERROR"),
            SessionStatus::All => None,
        }
    }
}
