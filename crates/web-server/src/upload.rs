use actix_web::web;

pub const NAME_FIELD: &str = "name";
pub const SOCIAL_MEDIA_FIELD: &str = "socialMedia";
pub const IMAGES_FIELD: &str = "images";

pub const MAX_IMAGES: usize = 5;

const MAX_FILE_NAME_ATTEMPTS: usize = 16;

/// Hands out `<millisecond-timestamp><.extension>` file names. Timestamps are
/// strictly increasing across every clone of a generator, so two uploads in
/// the same millisecond still get distinct names.
#[derive(Clone)]
pub struct FileNameGenerator {
    last_millis: std::sync::Arc<std::sync::atomic::AtomicI64>,
}

impl FileNameGenerator {
    pub fn new() -> Self {
        Self {
            last_millis: std::sync::Arc::new(std::sync::atomic::AtomicI64::new(0)),
        }
    }

    fn next_millis(&self) -> i64 {
        use std::sync::atomic::Ordering;

        let now = chrono::Utc::now().timestamp_millis();
        let mut last = self.last_millis.load(Ordering::Acquire);
        loop {
            let next = std::cmp::max(now, last + 1);
            match self.last_millis.compare_exchange_weak(
                last,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return next,
                Err(actual) => last = actual,
            }
        }
    }

    pub fn generate(&self, original_file_name: &str) -> String {
        format!(
            "{}{}",
            self.next_millis(),
            file_extension(original_file_name).unwrap_or_default()
        )
    }
}

/// Extension of a client supplied file name, dot included. Anything that is
/// not plain ASCII alphanumerics is dropped rather than written to disk.
fn file_extension(file_name: &str) -> Option<String> {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|extension| extension.to_str())
        .filter(|extension| {
            !extension.is_empty() && extension.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|extension| format!(".{}", extension))
}

pub struct UploadedFile {
    pub original_file_name: String,
    pub bytes: web::Bytes,
}

#[derive(Debug, thiserror::Error)]
pub enum ReadFormError {
    #[error("Failed to parse multipart body: {0}")]
    MalformedBody(String),
    #[error("Field '{0}' is not valid UTF-8")]
    NonUtf8Field(&'static str, #[source] std::string::FromUtf8Error),
    #[error("Too many images")]
    TooManyImages,
}

#[derive(Default)]
pub struct SubmissionForm {
    pub name: Option<String>,
    pub social_media: Option<String>,
    pub images: Vec<UploadedFile>,
}

pub struct ValidSubmission {
    pub name: String,
    pub social_media: String,
    pub images: Vec<UploadedFile>,
}

/// Buffers a whole part in memory. Parts have no size cap; the form is
/// validated before anything touches the disk, so every image of a
/// submission is held at once.
async fn read_field(field: &mut actix_multipart::Field) -> Result<web::Bytes, ReadFormError> {
    use futures::StreamExt;

    let mut bytes = web::BytesMut::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|err| ReadFormError::MalformedBody(err.to_string()))?;
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes.freeze())
}

fn read_text(field_name: &'static str, bytes: web::Bytes) -> Result<String, ReadFormError> {
    String::from_utf8(bytes.to_vec()).map_err(|err| ReadFormError::NonUtf8Field(field_name, err))
}

impl SubmissionForm {
    /// Drains `payload`, keeping the known text fields and every non-empty
    /// file part under `images`. Unknown fields are read and discarded.
    pub async fn read(mut payload: actix_multipart::Multipart) -> Result<Self, ReadFormError> {
        use futures::TryStreamExt;

        let mut form = Self::default();

        while let Some(mut field) = payload
            .try_next()
            .await
            .map_err(|err| ReadFormError::MalformedBody(err.to_string()))?
        {
            let content_disposition = field.content_disposition();
            let field_name = content_disposition
                .as_ref()
                .and_then(|content_disposition| content_disposition.get_name())
                .map(String::from);
            let file_name = content_disposition
                .as_ref()
                .and_then(|content_disposition| content_disposition.get_filename())
                .map(String::from);

            let bytes = read_field(&mut field).await?;

            match (field_name.as_deref(), file_name) {
                (Some(IMAGES_FIELD), Some(file_name)) => {
                    // Browsers send an empty part when no file was picked.
                    if file_name.is_empty() {
                        continue;
                    }
                    if form.images.len() == MAX_IMAGES {
                        return Err(ReadFormError::TooManyImages);
                    }
                    log::debug!("  IMAGE {:?} ({} bytes)", file_name, bytes.len());
                    form.images.push(UploadedFile {
                        original_file_name: file_name,
                        bytes,
                    });
                }
                (Some(NAME_FIELD), None) => form.name = Some(read_text(NAME_FIELD, bytes)?),
                (Some(SOCIAL_MEDIA_FIELD), None) => {
                    form.social_media = Some(read_text(SOCIAL_MEDIA_FIELD, bytes)?)
                }
                (field_name, _) => log::debug!("  IGNORED FIELD {:?}", field_name),
            }
        }

        Ok(form)
    }

    /// `None` unless both text fields are non-empty and at least one image
    /// was attached.
    pub fn validate(self) -> Option<ValidSubmission> {
        match self {
            Self {
                name: Some(name),
                social_media: Some(social_media),
                images,
            } if !name.is_empty() && !social_media.is_empty() && !images.is_empty() => {
                Some(ValidSubmission {
                    name,
                    social_media,
                    images,
                })
            }
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreFileError {
    #[error("Failed to write {0:?}")]
    WriteFailed(std::path::PathBuf, #[source] std::io::Error),
    #[error("No free file name found after {0} attempts")]
    NoFreeFileName(usize),
    #[error("Operation cancelled")]
    OperationCancelled,
}

fn write_new_file(path: &std::path::Path, bytes: &[u8]) -> std::io::Result<()> {
    use std::io::Write;

    let mut writer = std::io::BufWriter::new(
        std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)?,
    );
    writer.write_all(bytes)?;
    writer.flush()
}

/// Writes `file` into `upload_dir` under a freshly generated name and returns
/// that name. Existing files are never overwritten; a taken name moves on to
/// the next timestamp.
pub async fn store(
    upload_dir: &std::path::Path,
    file_names: &FileNameGenerator,
    file: &UploadedFile,
) -> Result<String, StoreFileError> {
    use actix_web::error::BlockingError;

    for _ in 0..MAX_FILE_NAME_ATTEMPTS {
        let file_name = file_names.generate(&file.original_file_name);
        let file_path = upload_dir.join(&file_name);

        let result = web::block({
            let file_path = file_path.clone();
            let bytes = file.bytes.clone();
            move || write_new_file(&file_path, &bytes)
        })
        .await;

        match result {
            Ok(()) => return Ok(file_name),
            Err(BlockingError::Error(err)) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                log::warn!("{:?} already exists, trying another name", file_path);
            }
            Err(BlockingError::Error(err)) => {
                return Err(StoreFileError::WriteFailed(file_path, err))
            }
            Err(BlockingError::Canceled) => return Err(StoreFileError::OperationCancelled),
        }
    }

    Err(StoreFileError::NoFreeFileName(MAX_FILE_NAME_ATTEMPTS))
}

/// Best-effort removal of files written for a submission that was not
/// recorded.
pub async fn discard(upload_dir: &std::path::Path, file_names: Vec<String>) {
    for file_name in file_names {
        let file_path = upload_dir.join(&file_name);
        let result = web::block({
            let file_path = file_path.clone();
            move || std::fs::remove_file(file_path)
        })
        .await;
        if let Err(err) = result {
            log::warn!("Failed to remove {:?}: {:?}", file_path, err);
        }
    }
}
