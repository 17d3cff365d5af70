use actix_web::{get, web, HttpResponse};

#[derive(Debug, super::Error, thiserror::Error)]
pub enum Error {
    #[error("Failed to fetch submissions")]
    DatabaseQueryError(#[from] crate::db::QueryError),
}

#[get("/submissions")]
pub async fn endpoint(
    db: web::Data<crate::db::System>,
) -> Result<actix_web::HttpResponse, Error> {
    log::debug!("GET /api/submissions");

    Ok(crate::db::model::Submission::fetch_all(&db)
        .await
        .map(|submissions| {
            HttpResponse::Ok().json(
                submissions
                    .into_iter()
                    .map(submissions_web_core::Submission::from)
                    .collect::<Vec<_>>(),
            )
        })?)
}
