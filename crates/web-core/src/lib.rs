#[derive(Debug, serde::Deserialize, serde::Serialize)]
pub struct ErrorDesc {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<ErrorDesc>>,
}

impl From<&dyn std::error::Error> for ErrorDesc {
    fn from(error: &dyn std::error::Error) -> Self {
        Self {
            error: format!("{}", error),
            cause: error
                .source()
                .map(|source| Box::new(ErrorDesc::from(source))),
        }
    }
}

impl std::fmt::Display for ErrorDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)?;
        let mut current = self.cause.as_ref();
        while let Some(cause) = current {
            write!(f, ": {}", cause.error)?;
            current = cause.cause.as_ref();
        }
        Ok(())
    }
}

/// Body of a successful `POST /api/submit`.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct Receipt {
    pub message: String,
}

impl Receipt {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// One submitter together with the generated names of the images they sent,
/// in upload order.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Submission {
    pub id: i32,
    pub name: String,
    pub social_media: String,
    pub images: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Leaf;

    impl std::fmt::Display for Leaf {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "disk full")
        }
    }

    impl std::error::Error for Leaf {}

    #[derive(Debug)]
    struct Outer(Leaf);

    impl std::fmt::Display for Outer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "Failed to store image")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn error_desc_follows_source_chain() {
        let error = Outer(Leaf);
        let desc = ErrorDesc::from(&error as &dyn std::error::Error);

        assert_eq!(
            serde_json::to_value(&desc).unwrap(),
            serde_json::json!({
                "error": "Failed to store image",
                "cause": { "error": "disk full" }
            })
        );
        assert_eq!(desc.to_string(), "Failed to store image: disk full");
    }

    #[test]
    fn error_desc_without_cause_has_only_error_field() {
        let desc = ErrorDesc::from(&Leaf as &dyn std::error::Error);

        assert_eq!(
            serde_json::to_string(&desc).unwrap(),
            r#"{"error":"disk full"}"#
        );
    }

    #[test]
    fn submission_serialises_with_snake_case_handle() {
        let submission = Submission {
            id: 1,
            name: String::from("Alice"),
            social_media: String::from("@alice"),
            images: vec![String::from("1700000000000.png")],
        };

        assert_eq!(
            serde_json::to_value(&submission).unwrap(),
            serde_json::json!({
                "id": 1,
                "name": "Alice",
                "social_media": "@alice",
                "images": ["1700000000000.png"]
            })
        );
    }
}
