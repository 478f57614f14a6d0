//! Account lifecycle and profile lookups: registration, login, profile
//! edits, user search, and the follower/following read side.

use crate::auth;
use crate::database::models::UserRecord;
use crate::database::repositories::{FollowRepository, UserRepository};
use crate::database::Database;
use crate::error::{DomainError, DomainResult};
use crate::utils::now_utc_iso;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone)]
pub struct AccountService {
    database: Database,
}

impl AccountService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    pub fn register(&self, input: RegisterInput) -> DomainResult<UserRecord> {
        if input.name.trim().is_empty()
            || input.email.trim().is_empty()
            || input.password.is_empty()
        {
            return Err(DomainError::validation(
                "Name, email and password are required",
            ));
        }
        let password_hash = auth::hash_password(&input.password)?;
        let record = UserRecord {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            username: input
                .username
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty()),
            email: input.email.trim().to_lowercase(),
            password_hash,
            avatar_url: None,
            bio: None,
            place: None,
            role: "user".to_string(),
            suspended: false,
            created_at: now_utc_iso(),
            updated_at: None,
        };

        self.database
            .with_repositories(|repos| {
                if repos.users().email_exists(&record.email)? {
                    return Err(DomainError::conflict("User already exists").into_anyhow());
                }
                repos.users().create(&record)?;
                Ok(())
            })
            .map_err(DomainError::from_db)?;
        Ok(record)
    }

    /// Credential check for login. The stored hash never leaves the
    /// repository layer; a wrong password and an unknown account are
    /// indistinguishable to the caller.
    pub fn login(&self, email_or_username: &str, password: &str) -> DomainResult<UserRecord> {
        if email_or_username.trim().is_empty() || password.is_empty() {
            return Err(DomainError::validation(
                "Email/username and password required",
            ));
        }
        let user = self
            .database
            .with_repositories(|repos| repos.users().find_by_email_or_username(email_or_username))
            .map_err(DomainError::from_db)?
            .ok_or_else(|| DomainError::unauthorized("Invalid credentials"))?;
        if !auth::verify_password(password, &user.password_hash) {
            return Err(DomainError::unauthorized("Invalid credentials"));
        }
        if user.suspended {
            return Err(DomainError::forbidden("Account suspended"));
        }
        Ok(user)
    }

    pub fn get(&self, id: &str) -> DomainResult<UserRecord> {
        self.database
            .with_repositories(|repos| repos.users().get(id))
            .map_err(DomainError::from_db)?
            .ok_or_else(|| DomainError::not_found("User not found"))
    }

    /// Public profile with follower/following cardinalities and, when a
    /// viewer is known, whether that viewer currently follows the user.
    pub fn profile(&self, id: &str, viewer_id: Option<&str>) -> DomainResult<UserProfile> {
        self.database
            .with_repositories(|repos| {
                let user = repos
                    .users()
                    .get(id)?
                    .ok_or_else(|| DomainError::not_found("User not found").into_anyhow())?;
                let counts = repos.follows().counts(id)?;
                let is_following = match viewer_id {
                    Some(viewer) if viewer != id => repos.follows().is_following(viewer, id)?,
                    _ => false,
                };
                Ok(UserProfile {
                    user: UserSummary::from_record(&user),
                    followers_count: counts.followers,
                    following_count: counts.following,
                    is_following,
                })
            })
            .map_err(DomainError::from_db)
    }

    pub fn update_profile(&self, id: &str, update: ProfileUpdate) -> DomainResult<UserRecord> {
        self.database
            .with_repositories(|repos| {
                let mut user = repos
                    .users()
                    .get(id)?
                    .ok_or_else(|| DomainError::not_found("User not found").into_anyhow())?;
                if let Some(name) = update.name {
                    if name.trim().is_empty() {
                        return Err(
                            DomainError::validation("Name may not be empty").into_anyhow()
                        );
                    }
                    user.name = name.trim().to_string();
                }
                if let Some(username) = update.username {
                    user.username = Some(username.trim().to_string()).filter(|u| !u.is_empty());
                }
                if let Some(bio) = update.bio {
                    user.bio = Some(bio).filter(|b| !b.is_empty());
                }
                if let Some(place) = update.place {
                    user.place = Some(place).filter(|p| !p.is_empty());
                }
                if let Some(avatar_url) = update.avatar_url {
                    user.avatar_url = Some(avatar_url).filter(|a| !a.is_empty());
                }
                user.updated_at = Some(now_utc_iso());
                repos.users().update(&user)?;
                Ok(user)
            })
            .map_err(DomainError::from_db)
    }

    pub fn change_password(&self, id: &str, current: &str, new: &str) -> DomainResult<()> {
        if new.is_empty() {
            return Err(DomainError::validation("New password may not be empty"));
        }
        let user = self.get(id)?;
        if !auth::verify_password(current, &user.password_hash) {
            return Err(DomainError::validation("Incorrect current password"));
        }
        let hash = auth::hash_password(new)?;
        self.database
            .with_repositories(|repos| {
                repos.users().set_password_hash(id, &hash)?;
                Ok(())
            })
            .map_err(DomainError::from_db)
    }

    /// Self-deletion; the user's posts go with the account.
    pub fn delete_account(&self, id: &str) -> DomainResult<()> {
        let deleted = self
            .database
            .with_repositories(|repos| repos.users().delete(id))
            .map_err(DomainError::from_db)?;
        if deleted {
            Ok(())
        } else {
            Err(DomainError::not_found("User not found"))
        }
    }

    pub fn search(&self, query: &str) -> DomainResult<Vec<UserSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let users = self
            .database
            .with_repositories(|repos| repos.users().search(query, 20))
            .map_err(DomainError::from_db)?;
        Ok(users.iter().map(UserSummary::from_record).collect())
    }

    pub fn followers(&self, id: &str) -> DomainResult<Vec<UserSummary>> {
        self.follow_listing(id, true)
    }

    pub fn following(&self, id: &str) -> DomainResult<Vec<UserSummary>> {
        self.follow_listing(id, false)
    }

    fn follow_listing(&self, id: &str, followers: bool) -> DomainResult<Vec<UserSummary>> {
        let users = self
            .database
            .with_repositories(|repos| {
                if repos.users().get(id)?.is_none() {
                    return Err(DomainError::not_found("User not found").into_anyhow());
                }
                if followers {
                    repos.follows().followers_of(id)
                } else {
                    repos.follows().following_of(id)
                }
            })
            .map_err(DomainError::from_db)?;
        Ok(users.iter().map(UserSummary::from_record).collect())
    }
}

/// The denormalized user info attached to posts, comments, notifications
/// and follow listings. Never carries the credential hash or role.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub place: Option<String>,
    pub bio: Option<String>,
}

impl UserSummary {
    pub fn from_record(record: &UserRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            username: record.username.clone(),
            avatar_url: record.avatar_url.clone(),
            place: record.place.clone(),
            bio: record.bio.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user: UserSummary,
    pub followers_count: usize,
    pub following_count: usize,
    pub is_following: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub name: String,
    #[serde(default)]
    pub username: Option<String>,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub place: Option<String>,
    pub avatar_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::open_in_memory;
    use crate::error::DomainError;

    fn setup() -> AccountService {
        AccountService::new(open_in_memory())
    }

    fn register(service: &AccountService, name: &str, email: &str) -> UserRecord {
        service
            .register(RegisterInput {
                name: name.into(),
                username: Some(name.into()),
                email: email.into(),
                password: "secret".into(),
            })
            .expect("register")
    }

    #[test]
    fn register_then_login_round_trip() {
        let service = setup();
        let user = register(&service, "alice", "alice@example.com");

        let by_email = service.login("alice@example.com", "secret").expect("login");
        assert_eq!(by_email.id, user.id);
        let by_handle = service.login("alice", "secret").expect("login");
        assert_eq!(by_handle.id, user.id);
    }

    #[test]
    fn login_accepts_the_email_casing_used_at_registration() {
        let service = setup();
        let user = register(&service, "alice", "Alice@Example.com");

        // Stored lowercased, but the as-typed form must still work.
        assert_eq!(user.email, "alice@example.com");
        let by_typed = service.login("Alice@Example.com", "secret").expect("login");
        assert_eq!(by_typed.id, user.id);
        let by_stored = service.login("alice@example.com", "secret").expect("login");
        assert_eq!(by_stored.id, user.id);
    }

    #[test]
    fn wrong_password_and_unknown_user_are_unauthorized() {
        let service = setup();
        register(&service, "alice", "alice@example.com");

        assert!(matches!(
            service.login("alice@example.com", "wrong"),
            Err(DomainError::Unauthorized(_))
        ));
        assert!(matches!(
            service.login("nobody@example.com", "secret"),
            Err(DomainError::Unauthorized(_))
        ));
    }

    #[test]
    fn duplicate_email_is_a_conflict() {
        let service = setup();
        register(&service, "alice", "alice@example.com");
        let result = service.register(RegisterInput {
            name: "imposter".into(),
            username: None,
            email: "alice@example.com".into(),
            password: "other".into(),
        });
        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }

    #[test]
    fn change_password_requires_the_current_one() {
        let service = setup();
        let user = register(&service, "alice", "alice@example.com");

        assert!(matches!(
            service.change_password(&user.id, "wrong", "next"),
            Err(DomainError::Validation(_))
        ));
        service
            .change_password(&user.id, "secret", "next")
            .expect("change password");
        service.login("alice", "next").expect("login with new");
        assert!(service.login("alice", "secret").is_err());
    }

    #[test]
    fn profile_reports_follow_state_for_viewer() {
        let service = setup();
        let alice = register(&service, "alice", "alice@example.com");
        let bob = register(&service, "bob", "bob@example.com");

        let profile = service.profile(&bob.id, Some(&alice.id)).expect("profile");
        assert!(!profile.is_following);
        assert_eq!(profile.followers_count, 0);
        // hash must never appear in the public view
        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("user").unwrap().get("passwordHash").is_none());
        assert!(json.get("user").unwrap().get("password_hash").is_none());
    }
}
