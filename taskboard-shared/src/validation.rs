/// Input normalization and validation
///
/// Validation is independent of any store: every rule here can be exercised
/// without a database. Repositories call these before any write.
///
/// # Rules
///
/// - Titles are trimmed and must be non-empty, at most 200 characters
/// - Descriptions are trimmed; an all-whitespace description becomes absent
/// - Due dates must not be negative
/// - User profiles need a non-empty id, a valid email, and a URL avatar if any
///
/// # Example
///
/// ```
/// use taskboard_shared::models::task::{NewTask, Priority};
/// use taskboard_shared::validation::validate_new_task;
///
/// let task = validate_new_task(NewTask {
///     title: " Buy milk ".to_string(),
///     description: Some("   ".to_string()),
///     priority: Priority::Low,
///     due_date: None,
/// })
/// .unwrap();
///
/// assert_eq!(task.title, "Buy milk");
/// assert_eq!(task.description, None);
/// ```

use crate::error::{FieldError, RepositoryError, RepositoryResult};
use crate::models::task::{NewTask, TaskPatch, MAX_DESCRIPTION_LEN, MAX_TITLE_LEN};
use crate::models::user::UpsertUser;
use validator::Validate;

/// Trims the title and description, then validates
pub fn validate_new_task(input: NewTask) -> RepositoryResult<NewTask> {
    let normalized = NewTask {
        title: input.title.trim().to_string(),
        description: normalize_description(input.description),
        priority: input.priority,
        due_date: input.due_date,
    };

    normalized.validate()?;
    Ok(normalized)
}

/// Normalizes a patch the same way as a new task
///
/// Only the supplied fields are checked.
pub fn validate_patch(patch: TaskPatch) -> RepositoryResult<TaskPatch> {
    let mut errors = Vec::new();

    let title = patch.title.map(|t| t.trim().to_string());
    if let Some(ref title) = title {
        if let Err(e) = check_title(title) {
            errors.push(e);
        }
    }

    let description = patch.description.map(normalize_description);
    if let Some(Some(ref description)) = description {
        if description.chars().count() as u64 > MAX_DESCRIPTION_LEN {
            errors.push(FieldError::new(
                "description",
                "Description must be at most 2000 characters",
            ));
        }
    }

    if let Some(Some(due)) = patch.due_date {
        if due < 0 {
            errors.push(FieldError::new("due_date", "Due date must not be negative"));
        }
    }

    if !errors.is_empty() {
        return Err(RepositoryError::Validation(errors));
    }

    Ok(TaskPatch {
        title,
        description,
        completed: patch.completed,
        priority: patch.priority,
        due_date: patch.due_date,
    })
}

/// Trims the descriptive profile fields, then validates
///
/// `user_id` is an opaque key from the identity provider and is kept verbatim.
pub fn validate_profile(input: UpsertUser) -> RepositoryResult<UpsertUser> {
    let normalized = UpsertUser {
        user_id: input.user_id,
        email: input.email.trim().to_string(),
        name: input
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        avatar: input
            .avatar
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty()),
    };

    normalized.validate()?;
    Ok(normalized)
}

fn check_title(title: &str) -> Result<(), FieldError> {
    let len = title.chars().count() as u64;
    if len == 0 || len > MAX_TITLE_LEN {
        return Err(FieldError::new(
            "title",
            "Title must be between 1 and 200 characters",
        ));
    }
    Ok(())
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}
