use actix_web::{post, web, HttpResponse};

#[derive(Debug, super::Error, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    #[status_code(400)]
    InvalidForm(#[from] crate::upload::ReadFormError),
    #[error("Missing required fields")]
    #[status_code(400)]
    MissingRequiredFields,
    #[error("Failed to store image")]
    StoreImageFailed(#[source] crate::upload::StoreFileError),
    #[error("Failed to record submission in database")]
    RecordSubmissionFailed(#[source] crate::db::QueryError),
}

#[post("/submit")]
pub async fn endpoint(
    payload: actix_multipart::Multipart,
    db: web::Data<crate::db::System>,
    upload_dir: web::Data<crate::api::UploadDirPath>,
    file_names: web::Data<crate::upload::FileNameGenerator>,
) -> Result<actix_web::HttpResponse, Error> {
    log::debug!("POST /api/submit");

    let submission = crate::upload::SubmissionForm::read(payload)
        .await?
        .validate()
        .ok_or(Error::MissingRequiredFields)?;

    let mut stored_file_names = Vec::with_capacity(submission.images.len());
    for image in submission.images.iter() {
        match crate::upload::store(&upload_dir, &file_names, image).await {
            Ok(file_name) => {
                log::debug!("  STORED {:?} AS {:?}", image.original_file_name, file_name);
                stored_file_names.push(file_name);
            }
            Err(err) => {
                crate::upload::discard(&upload_dir, stored_file_names).await;
                return Err(Error::StoreImageFailed(err));
            }
        }
    }

    let submitter_id = match crate::db::model::Submission::record(
        &db,
        submission.name,
        submission.social_media,
        stored_file_names.clone(),
    )
    .await
    {
        Ok(submitter_id) => submitter_id,
        Err(err) => {
            crate::upload::discard(&upload_dir, stored_file_names).await;
            return Err(Error::RecordSubmissionFailed(err));
        }
    };

    log::debug!("  SUBMITTER ID {}", submitter_id);

    Ok(HttpResponse::Created().json(submissions_web_core::Receipt::new(
        "User and images added successfully",
    )))
}
