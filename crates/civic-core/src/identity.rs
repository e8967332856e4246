//! Session identity: who is acting, and in which role.
//!
//! Login is a demonstration stub. The password is never checked and the role
//! is read off the email address; nothing here is a security boundary.

use std::sync::Arc;

use rand::Rng;
use tracing::{info, warn};
use uuid::Uuid;

use civic_db::{Database, keys};
use civic_types::api::{LoginRequest, RegisterRequest};
use civic_types::models::{Role, User};

use crate::error::Result;
use crate::snapshot::{self, Loaded};
use crate::validation::required;

pub struct IdentityHolder {
    db: Arc<Database>,
    current: Option<User>,
}

impl IdentityHolder {
    /// Restore the persisted session identity, dropping it if unreadable.
    pub fn open(db: Arc<Database>) -> Self {
        let current = match snapshot::load::<User>(&db, keys::USER) {
            Loaded::Present(user) => {
                info!("Restored session for {} ({})", user.email, user.role);
                Some(user)
            }
            Loaded::Absent => None,
            Loaded::Corrupt => {
                if let Err(e) = db.delete_record(keys::USER) {
                    warn!("Failed to clear corrupt session record: {}", e);
                }
                None
            }
        };

        Self { db, current }
    }

    pub fn login(&mut self, req: &LoginRequest) -> Result<User> {
        let email = required("email", &req.email)?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            name: display_name(&email),
            voter_reference: fabricate_voter_reference(),
            role: role_for_email(&email),
            email,
        };

        self.activate(user)
    }

    /// Registration always yields a voter.
    pub fn register(&mut self, req: &RegisterRequest) -> Result<User> {
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: required("name", &req.name)?,
            email: required("email", &req.email)?,
            voter_reference: req.voter_reference.trim().to_string(),
            role: Role::Voter,
        };

        self.activate(user)
    }

    pub fn logout(&mut self) -> Result<()> {
        self.db.delete_record(keys::USER)?;
        if let Some(user) = self.current.take() {
            info!("Logged out {}", user.email);
        }
        Ok(())
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    fn activate(&mut self, user: User) -> Result<User> {
        snapshot::save(&self.db, keys::USER, &user)?;
        info!("Session started for {} as {}", user.email, user.role);
        self.current = Some(user.clone());
        Ok(user)
    }
}

/// Demo role assignment: the first of "mla", "district", "central" found in
/// the address wins, otherwise voter.
pub fn role_for_email(email: &str) -> Role {
    let email = email.to_lowercase();
    if email.contains("mla") {
        Role::Mla
    } else if email.contains("district") {
        Role::District
    } else if email.contains("central") {
        Role::Central
    } else {
        Role::Voter
    }
}

fn display_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

fn fabricate_voter_reference() -> String {
    let digits: u32 = rand::rng().random_range(0..100_000_000);
    format!("V{:08}", digits)
}
