use super::ApiError;
use crate::domain::{ProgressId, TitleId};

fn positive_id(kind: &str, id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid {kind} ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

pub fn validate_title_id(id: i32) -> Result<TitleId, ApiError> {
    positive_id("title", id).map(TitleId::new)
}

pub fn validate_progress_id(id: i32) -> Result<ProgressId, ApiError> {
    positive_id("progress", id).map(ProgressId::new)
}

pub fn validate_episode(episode: i32) -> Result<i32, ApiError> {
    if episode < 0 {
        return Err(ApiError::validation(format!(
            "Invalid episode: {episode}. Episode must be zero or greater"
        )));
    }
    Ok(episode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_ids() {
        assert_eq!(validate_title_id(3).unwrap(), TitleId::new(3));
        assert!(validate_title_id(0).is_err());
        assert!(validate_progress_id(-1).is_err());
    }

    #[test]
    fn test_validate_episode() {
        assert!(validate_episode(0).is_ok());
        assert!(validate_episode(24).is_ok());
        assert!(validate_episode(-1).is_err());
    }
}
