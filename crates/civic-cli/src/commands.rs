//! One-shot subcommands. Each returns the JSON value the binary prints.

use anyhow::Result;
use clap::Subcommand;
use serde_json::{Value, json};

use civic_core::{ComplaintFilter, DiscussionFilter, DiscussionSort, Portal, projections};
use civic_types::api::{COMPLAINT_CATEGORIES, DISCUSSION_CATEGORIES, NewComplaint, NewDiscussion};
use civic_types::models::ComplaintStatus;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start a session; the role is taken from the email address
    Login {
        email: String,
        #[arg(long, default_value = "")]
        password: String,
    },
    /// Start a session as a newly registered voter
    Register {
        name: String,
        email: String,
        voter_reference: String,
        #[arg(long, default_value = "")]
        password: String,
    },
    Logout,
    /// Show the current session identity
    Whoami,
    /// List complaints visible to the current user
    Complaints {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<ComplaintStatus>,
        #[arg(long)]
        category: Option<String>,
    },
    #[command(subcommand)]
    Complaint(ComplaintCommand),
    Discussions {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Most liked first instead of newest first
        #[arg(long)]
        popular: bool,
    },
    #[command(subcommand)]
    Discussion(DiscussionCommand),
    /// Representative dashboard
    Dashboard,
    Notifications {
        #[arg(long)]
        mark_all_read: bool,
        /// Mark a single notification read
        #[arg(long, value_name = "ID")]
        read: Option<String>,
    },
    Profile,
    /// Suggested categories plus those already in use
    Categories,
}

#[derive(Subcommand, Debug)]
pub enum ComplaintCommand {
    New {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        location: String,
    },
    Status {
        id: String,
        status: ComplaintStatus,
    },
    Comment {
        id: String,
        text: String,
    },
    /// Show one complaint with its comment thread
    Show {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum DiscussionCommand {
    New {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        category: String,
    },
    Comment {
        id: String,
        text: String,
    },
    Like {
        id: String,
    },
    LikeComment {
        id: String,
        comment_id: String,
    },
    Show {
        id: String,
    },
}

pub fn run(portal: &mut Portal, command: Command) -> Result<Value> {
    let output = match command {
        Command::Login { email, password } => json!(portal.login(&email, &password)?),
        Command::Register { name, email, voter_reference, password } => {
            json!(portal.register(&name, &email, &voter_reference, &password)?)
        }
        Command::Logout => {
            portal.logout()?;
            json!({ "authenticated": false })
        }
        Command::Whoami => match portal.current_user() {
            Some(user) => json!({ "authenticated": true, "user": user }),
            None => json!({ "authenticated": false }),
        },
        Command::Complaints { search, status, category } => {
            let filter = ComplaintFilter { search, status, category };
            json!(portal.visible_complaints(&filter)?)
        }
        Command::Complaint(cmd) => run_complaint(portal, cmd)?,
        Command::Discussions { search, category, popular } => {
            let sort = if popular { DiscussionSort::Popular } else { DiscussionSort::Recent };
            json!(portal.visible_discussions(&DiscussionFilter { search, category, sort }))
        }
        Command::Discussion(cmd) => run_discussion(portal, cmd)?,
        Command::Dashboard => json!(portal.dashboard()?),
        Command::Notifications { mark_all_read, read } => {
            if let Some(id) = read {
                portal.mark_notification_read(&id)?;
            }
            if mark_all_read {
                portal.mark_all_notifications_read()?;
            }
            let feed = portal.notifications()?;
            json!({ "unread": civic_core::notifications::unread_count(&feed), "notifications": feed })
        }
        Command::Profile => {
            let stats = portal.profile()?;
            json!({ "user": portal.current_user(), "stats": stats })
        }
        Command::Categories => json!({
            "complaints": merge_categories(
                COMPLAINT_CATEGORIES,
                projections::complaint_categories(portal.complaints()),
            ),
            "discussions": merge_categories(
                DISCUSSION_CATEGORIES,
                projections::discussion_categories(portal.discussions()),
            ),
        }),
    };
    Ok(output)
}

fn merge_categories(known: &[&str], in_use: Vec<String>) -> Vec<String> {
    let mut all: Vec<String> = known.iter().map(|c| c.to_string()).collect();
    for category in in_use {
        if !all.contains(&category) {
            all.push(category);
        }
    }
    all
}

fn run_complaint(portal: &mut Portal, cmd: ComplaintCommand) -> Result<Value> {
    let output = match cmd {
        ComplaintCommand::New { title, description, category, location } => {
            json!(portal.create_complaint(&NewComplaint { title, description, category, location })?)
        }
        ComplaintCommand::Status { id, status } => {
            let update = portal.update_complaint_status(&id, status)?;
            json!({
                "previous": update.previous,
                "changed": update.changed(),
                "complaint": update.complaint,
            })
        }
        ComplaintCommand::Comment { id, text } => json!(portal.add_complaint_comment(&id, &text)?),
        ComplaintCommand::Show { id } => {
            let complaint = portal
                .complaint(&id)
                .ok_or_else(|| civic_core::CivicError::NotFound { kind: "complaint", id: id.clone() })?;
            json!({
                "complaint": complaint,
                "canChangeStatus": portal.can_change_status(&id),
                "comments": projections::comments_newest_first(&complaint.comments),
            })
        }
    };
    Ok(output)
}

fn run_discussion(portal: &mut Portal, cmd: DiscussionCommand) -> Result<Value> {
    let output = match cmd {
        DiscussionCommand::New { title, content, category } => {
            json!(portal.create_discussion(&NewDiscussion { title, content, category })?)
        }
        DiscussionCommand::Comment { id, text } => json!(portal.add_discussion_comment(&id, &text)?),
        DiscussionCommand::Like { id } => json!(portal.toggle_discussion_like(&id)?),
        DiscussionCommand::LikeComment { id, comment_id } => {
            json!(portal.toggle_comment_like(&id, &comment_id)?)
        }
        DiscussionCommand::Show { id } => {
            let discussion = portal
                .discussion(&id)
                .ok_or_else(|| civic_core::CivicError::NotFound { kind: "discussion", id: id.clone() })?;
            let liked = portal
                .current_user()
                .is_some_and(|user| projections::has_liked(discussion, user));
            json!({
                "discussion": discussion,
                "liked": liked,
                "comments": projections::comments_newest_first(&discussion.comments),
            })
        }
    };
    Ok(output)
}
