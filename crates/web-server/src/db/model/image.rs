use crate::db::schema::images;
use diesel::RunQueryDsl;

#[derive(diesel::Insertable)]
#[table_name = "images"]
struct NewImage<'a> {
    pub submitter_id: i32,
    pub filename: &'a str,
}

#[derive(Debug, Clone, PartialEq, diesel::Queryable)]
pub struct Image {
    pub id: i32,
    pub submitter_id: i32,
    pub filename: String,
}

impl Image {
    pub fn insert(
        db_connection: &diesel::SqliteConnection,
        submitter_id: i32,
        filename: &str,
    ) -> Result<(), diesel::result::Error> {
        diesel::insert_into(images::table)
            .values(&NewImage {
                submitter_id,
                filename,
            })
            .execute(db_connection)
            .map(|_| ())
    }
}
