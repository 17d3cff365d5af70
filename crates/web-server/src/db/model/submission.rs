use crate::db::{
    model::{Image, Submitter},
    schema::{images, submitters},
};
use diesel::{QueryDsl, RunQueryDsl};

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub submitter: Submitter,
    pub images: Vec<String>,
}

impl Submission {
    /// Records a submitter and one image row per file name in a single
    /// transaction. Nothing is persisted unless every insert succeeds.
    pub async fn record(
        db: &crate::db::System,
        name: String,
        social_media: String,
        file_names: Vec<String>,
    ) -> Result<i32, crate::db::QueryError> {
        db.run_insertion(move |db_connection| {
            let submitter_id = Submitter::insert(db_connection, &name, &social_media)?;
            for file_name in file_names.iter() {
                Image::insert(db_connection, submitter_id, file_name)?;
            }
            Ok(submitter_id)
        })
        .await
    }

    /// Every submitter, ordered by id, with its image file names in upload
    /// order. Submitters without images are included with no file names.
    pub async fn fetch_all(db: &crate::db::System) -> Result<Vec<Self>, crate::db::QueryError> {
        db.run_query(|db_connection| {
            submitters::table
                .left_join(images::table)
                .order_by(submitters::id)
                .then_order_by(images::id)
                .load::<(Submitter, Option<Image>)>(&db_connection)
        })
        .await
        .map(|rows| {
            use itertools::Itertools;

            let groups = rows.into_iter().group_by(|(submitter, _)| submitter.id);
            groups
                .into_iter()
                .filter_map(|(_, mut group)| {
                    let (submitter, image) = group.next()?;
                    Some(Self {
                        submitter,
                        images: image
                            .into_iter()
                            .chain(group.filter_map(|(_, image)| image))
                            .map(|image| image.filename)
                            .collect(),
                    })
                })
                .collect()
        })
    }
}

impl From<Submission> for submissions_web_core::Submission {
    fn from(submission: Submission) -> Self {
        Self {
            id: submission.submitter.id,
            name: submission.submitter.name,
            social_media: submission.submitter.social_media,
            images: submission.images,
        }
    }
}
