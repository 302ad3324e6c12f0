//! Diesel table definitions for the portfolio.
//!
//! Tables: portfolio_profile (singleton), portfolio_projects.

diesel::table! {
    portfolio_profile (id) {
        id -> Int4,
        name -> Nullable<Text>,
        role -> Nullable<Text>,
        bio -> Nullable<Text>,
        avatar_url -> Nullable<Text>,
        avatar_data -> Nullable<Bytea>,
        github_link -> Nullable<Text>,
        linkedin_link -> Nullable<Text>,
        resume_link -> Nullable<Text>,
    }
}

diesel::table! {
    portfolio_projects (id) {
        id -> Int4,
        title -> Text,
        description -> Nullable<Text>,
        github_link -> Nullable<Text>,
        project_link -> Nullable<Text>,
        doc_link -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(portfolio_profile, portfolio_projects);
