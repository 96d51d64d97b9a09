// Catalog tables owned by the administration side of the system.

diesel::table! {
    universities (id) {
        id -> Integer,
        name -> Text,
    }
}

diesel::table! {
    university_courses (id) {
        id -> Integer,
        title -> Text,
        description -> Nullable<Text>,
        credits -> Nullable<Integer>,
        department -> Nullable<Text>,
        prerequisites -> Nullable<Text>,
        language -> Nullable<Text>,
        university_id -> Nullable<Integer>,
    }
}

diesel::joinable!(university_courses -> universities (university_id));

diesel::allow_tables_to_appear_in_same_query!(universities, university_courses);
