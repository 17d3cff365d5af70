use crate::db::schema::submitters;
use diesel::RunQueryDsl;

#[derive(diesel::Insertable)]
#[table_name = "submitters"]
struct NewSubmitter<'a> {
    pub name: &'a str,
    pub social_media: &'a str,
}

#[derive(Debug, Clone, PartialEq, diesel::Queryable)]
pub struct Submitter {
    pub id: i32,
    pub name: String,
    pub social_media: String,
}

impl Submitter {
    /// Inserts a submitter on `db_connection` and returns its id. Callers
    /// writing more than one row wrap this in a transaction.
    pub fn insert(
        db_connection: &diesel::SqliteConnection,
        name: &str,
        social_media: &str,
    ) -> Result<i32, diesel::result::Error> {
        diesel::insert_into(submitters::table)
            .values(&NewSubmitter { name, social_media })
            .execute(db_connection)?;

        diesel::select(crate::db::model::last_insert_rowid).get_result::<i32>(db_connection)
    }
}
