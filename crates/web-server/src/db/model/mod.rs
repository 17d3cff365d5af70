pub mod image;
pub mod submission;
pub mod submitter;

pub use image::Image;
pub use submission::Submission;
pub use submitter::Submitter;

no_arg_sql_function!(
    last_insert_rowid,
    diesel::sql_types::Integer,
    "Id of the row most recently inserted on this connection"
);
