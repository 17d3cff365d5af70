mod get_submissions;
mod post_submit;

pub use submissions_web_server_derive::ApiError as Error;

pub struct UploadDirPath(std::path::PathBuf);

impl From<std::path::PathBuf> for UploadDirPath {
    fn from(path: std::path::PathBuf) -> Self {
        Self(path)
    }
}

impl std::ops::Deref for UploadDirPath {
    type Target = std::path::Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(get_submissions::endpoint)
        .service(post_submit::endpoint);
}
