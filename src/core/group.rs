//! Group membership store operations.
//!
//! Groups are the join target for users and own the shared habit list. The
//! surface here is deliberately small: the completion engine's membership
//! check and the group-achievement evaluator are the real consumers.

use crate::{
    entities::{Group, User, group, user},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};

/// Creates a new group with the given name.
pub async fn create_group(db: &DatabaseConnection, name: String) -> Result<group::Model> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Group name cannot be empty".to_string(),
        });
    }

    let group = group::ActiveModel {
        name: Set(name.trim().to_string()),
        chat_id: Set(None),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    group.insert(db).await.map_err(Into::into)
}

/// Fetches a group by id.
pub async fn get_group<C>(db: &C, group_id: i64) -> Result<Option<group::Model>>
where
    C: ConnectionTrait,
{
    Group::find_by_id(group_id).one(db).await.map_err(Into::into)
}

/// Finds a group by exact name, used when joining via an invite message.
pub async fn get_group_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<group::Model>> {
    Group::find()
        .filter(group::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Adds a user to a group. Fails with `GroupNotFound` / `UserNotFound` when
/// either side is missing.
pub async fn join_group(
    db: &DatabaseConnection,
    user_id: i64,
    group_id: i64,
) -> Result<user::Model> {
    get_group(db, group_id)
        .await?
        .ok_or(Error::GroupNotFound { id: group_id })?;

    let user = crate::core::user::require_user(db, user_id).await?;

    let mut active: user::ActiveModel = user.into();
    active.group_id = Set(Some(group_id));
    active.update(db).await.map_err(Into::into)
}

/// All members of a group.
pub async fn get_group_members<C>(db: &C, group_id: i64) -> Result<Vec<user::Model>>
where
    C: ConnectionTrait,
{
    User::find()
        .filter(user::Column::GroupId.eq(group_id))
        .all(db)
        .await
        .map_err(Into::into)
}

/// Links a broadcast chat to a group.
pub async fn set_group_chat(
    db: &DatabaseConnection,
    group_id: i64,
    chat_id: i64,
) -> Result<group::Model> {
    let group = get_group(db, group_id)
        .await?
        .ok_or(Error::GroupNotFound { id: group_id })?;

    let mut active: group::ActiveModel = group.into();
    active.chat_id = Set(Some(chat_id));
    active.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_group_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_group(&db, "   ".to_string()).await;
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_join_group_and_members() -> Result<()> {
        let db = setup_test_db().await?;
        let group = create_group(&db, "Morning Crew".to_string()).await?;
        let user = create_test_user(&db, 1).await?;

        let joined = join_group(&db, user.id, group.id).await?;
        assert_eq!(joined.group_id, Some(group.id));

        let members = get_group_members(&db, group.id).await?;
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].id, user.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_join_missing_group() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, 1).await?;

        let result = join_group(&db, user.id, 999).await;
        assert!(matches!(result.unwrap_err(), Error::GroupNotFound { id: 999 }));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_group_by_name() -> Result<()> {
        let db = setup_test_db().await?;
        let group = create_group(&db, "Evening Crew".to_string()).await?;

        let found = get_group_by_name(&db, "Evening Crew").await?;
        assert_eq!(found.unwrap().id, group.id);

        assert!(get_group_by_name(&db, "Nobody").await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_set_group_chat() -> Result<()> {
        let db = setup_test_db().await?;
        let group = create_group(&db, "Crew".to_string()).await?;

        let updated = set_group_chat(&db, group.id, -100_123).await?;
        assert_eq!(updated.chat_id, Some(-100_123));

        Ok(())
    }
}
