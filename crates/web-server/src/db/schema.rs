table! {
    images (id) {
        id -> Integer,
        submitter_id -> Integer,
        filename -> Text,
    }
}

table! {
    submitters (id) {
        id -> Integer,
        name -> Text,
        social_media -> Text,
    }
}

joinable!(images -> submitters (submitter_id));

allow_tables_to_appear_in_same_query!(images, submitters,);
