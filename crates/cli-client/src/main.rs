#[derive(Debug, thiserror::Error)]
enum ClientError {
    #[error("Failed to read {0:?}")]
    FileReadError(std::path::PathBuf, #[source] std::io::Error),
    #[error("Request failed")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Server responded {0}: {1}")]
    Rejected(reqwest::StatusCode, String),
    #[error("Unexpected response body")]
    MalformedResponse(#[source] serde_json::Error),
}

struct Client {
    http_client: reqwest::Client,
    host: String,
}

impl Client {
    pub fn new(host: String) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            host,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.host, path)
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            serde_json::from_slice(&body).map_err(ClientError::MalformedResponse)
        } else {
            Err(ClientError::Rejected(
                status,
                serde_json::from_slice::<submissions_web_core::ErrorDesc>(&body)
                    .map(|desc| desc.to_string())
                    .unwrap_or_else(|_| String::from_utf8_lossy(&body).into_owned()),
            ))
        }
    }

    pub async fn submit(
        &self,
        name: String,
        social_media: String,
        file_paths: Vec<std::path::PathBuf>,
    ) -> Result<submissions_web_core::Receipt, ClientError> {
        let mut form = reqwest::multipart::Form::new()
            .text("name", name)
            .text("socialMedia", social_media);

        for file_path in file_paths {
            let bytes = tokio::fs::read(&file_path)
                .await
                .map_err(|err| ClientError::FileReadError(file_path.clone(), err))?;
            let file_name = file_path
                .file_name()
                .map(|file_name| file_name.to_string_lossy().into_owned())
                .unwrap_or_default();
            form = form.part(
                "images",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name),
            );
        }

        self.send(self.http_client.post(self.url("/api/submit")).multipart(form))
            .await
    }

    pub async fn list(&self) -> Result<Vec<submissions_web_core::Submission>, ClientError> {
        self.send(self.http_client.get(self.url("/api/submissions")))
            .await
    }
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Send a submission with one to five images
    Submit {
        host: String,
        #[structopt(long)]
        name: String,
        #[structopt(long)]
        social_media: String,
        #[structopt(required = true, max_values = 5)]
        files: Vec<std::path::PathBuf>,
    },
    /// Print every recorded submission
    List { host: String },
}

async fn run(command: Command) -> Result<(), ClientError> {
    match command {
        Command::Submit {
            host,
            name,
            social_media,
            files,
        } => {
            let receipt = Client::new(host).submit(name, social_media, files).await?;
            println!("{}", receipt.message);
        }
        Command::List { host } => {
            for submission in Client::new(host).list().await? {
                println!(
                    "{} {} ({}): {}",
                    submission.id,
                    submission.name,
                    submission.social_media,
                    submission.images.join(", ")
                );
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    use structopt::StructOpt;

    if let Err(error) = run(Command::from_args()).await {
        use std::error::Error;

        println!("Error: {}", error);

        let mut current = error.source();
        if current.is_some() {
            println!("");
            println!("Caused by:");
            while let Some(error) = current {
                println!("  {}", error);
                current = error.source();
            }
        }

        std::process::exit(1);
    }
}
