use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::resume::extract::extract_text;
use crate::resume::skills::extract_skills;
use crate::state::AppState;

const MIN_RESUME_CHARS: usize = 50;

#[derive(Debug, Serialize)]
pub struct UploadDetails {
    pub user_id: Uuid,
    pub filename: String,
    pub text_length: usize,
    pub embedding_dimensions: usize,
    pub detected_skills: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub details: UploadDetails,
}

#[derive(Debug, Serialize)]
pub struct ResumeStatusResponse {
    pub user_id: Uuid,
    pub has_resume: bool,
    pub has_embedding: bool,
    pub status: &'static str,
}

/// The two multipart fields the upload form carries.
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<(String, Bytes)>,
    user_id: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        match field.name().map(str::to_owned).as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
                form.file = Some((filename, data));
            }
            Some("user_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read user_id: {e}")))?;
                form.user_id = Some(text);
            }
            _ => {}
        }
    }

    Ok(form)
}

fn check_file(filename: &str, data: &[u8]) -> Result<(), AppError> {
    if !filename.to_ascii_lowercase().ends_with(".pdf") {
        return Err(AppError::Validation("Only PDF files are supported".to_string()));
    }
    if data.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }
    Ok(())
}

fn check_text(text: &str) -> Result<(), AppError> {
    if text.chars().count() < MIN_RESUME_CHARS {
        return Err(AppError::Validation(
            "Resume does not contain enough text content".to_string(),
        ));
    }
    Ok(())
}

/// POST /resume/upload (multipart: `file`, `user_id`)
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let form = read_form(multipart).await?;

    let raw_user_id = form
        .user_id
        .ok_or_else(|| AppError::Validation("Missing 'user_id' field".to_string()))?;
    let user_id = Uuid::parse_str(raw_user_id.trim())
        .map_err(|e| AppError::Validation(format!("Invalid user_id '{raw_user_id}': {e}")))?;
    let (filename, data) = form
        .file
        .ok_or_else(|| AppError::Validation("Missing 'file' field".to_string()))?;

    check_file(&filename, &data)?;

    let text = extract_text(data).await?;
    check_text(&text)?;

    let embedding = state.embedder.embed(&text).await?;

    if !state
        .store
        .update_profile_embedding(user_id, embedding.as_slice())
        .await?
    {
        return Err(AppError::NotFound(format!(
            "User profile with id '{user_id}' not found"
        )));
    }

    let detected_skills = extract_skills(&text);
    info!(
        %user_id,
        text_length = text.chars().count(),
        skills = detected_skills.len(),
        "Resume processed"
    );

    Ok(Json(UploadResponse {
        status: "success",
        message: "Resume processed successfully",
        details: UploadDetails {
            user_id,
            filename,
            text_length: text.chars().count(),
            embedding_dimensions: embedding.dimension(),
            detected_skills,
        },
    }))
}

/// GET /resume/status/:user_id
pub async fn handle_resume_status(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ResumeStatusResponse>, AppError> {
    let profile = state
        .store
        .profile(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User profile with id '{user_id}' not found")))?;

    let has_resume = profile.resume_url.as_deref() == Some("uploaded");
    let has_embedding = profile.has_embedding();

    Ok(Json(ResumeStatusResponse {
        user_id,
        has_resume,
        has_embedding,
        status: if has_resume && has_embedding {
            "complete"
        } else {
            "incomplete"
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_pdf_filenames_accepted() {
        assert!(check_file("resume.pdf", b"%PDF-1.4").is_ok());
        assert!(check_file("Resume.PDF", b"%PDF-1.4").is_ok());
        assert!(matches!(
            check_file("resume.docx", b"PK"),
            Err(AppError::Validation(msg)) if msg == "Only PDF files are supported"
        ));
        assert!(check_file("", b"%PDF-1.4").is_err());
    }

    #[test]
    fn test_empty_file_rejected() {
        assert!(matches!(
            check_file("resume.pdf", b""),
            Err(AppError::Validation(msg)) if msg == "Uploaded file is empty"
        ));
    }

    #[test]
    fn test_text_length_threshold() {
        assert!(check_text(&"a".repeat(49)).is_err());
        assert!(check_text(&"a".repeat(50)).is_ok());
    }
}
