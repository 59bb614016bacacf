//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are used
//! by Diesel for compile-time query validation and type-safe SQL generation.
//! Regenerate with `diesel print-schema` after changing a migration.

diesel::table! {
    /// Fixed status catalog seeded by the initial migration.
    consultation_status (code) {
        code -> Int4,
        name -> Varchar,
    }
}

diesel::table! {
    /// End users who request consultations.
    users (id) {
        id -> Int8,
        name -> Varchar,
        email -> Nullable<Varchar>,
        phone -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Managers responsible for one or more brands.
    brand_managers (id) {
        id -> Int8,
        name -> Varchar,
        email -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    brand_categories (id) {
        id -> Int8,
        name -> Varchar,
    }
}

diesel::table! {
    /// Franchise brands. `manager_id` is null until a manager is assigned.
    brands (id) {
        id -> Int8,
        name -> Varchar,
        category_id -> Nullable<Int8>,
        manager_id -> Nullable<Int8>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Consultation requests and their lifecycle state.
    ///
    /// The partial unique index `consultations_one_active_per_user_brand`
    /// allows one active row per (user, brand) among status codes 1 to 3.
    consultations (id) {
        id -> Int8,
        user_id -> Int8,
        brand_id -> Int8,
        /// Foreign key into `consultation_status`.
        status_code -> Int4,
        preferred_date -> Date,
        preferred_time -> Time,
        manager_note -> Nullable<Varchar>,
        adjusted_date -> Nullable<Date>,
        adjusted_time -> Nullable<Time>,
        adjustment_reason -> Nullable<Varchar>,
        adjustment_requested_at -> Nullable<Timestamptz>,
        /// `ACCEPT` or `REJECT`.
        user_response -> Nullable<Varchar>,
        user_response_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        confirmed_at -> Nullable<Timestamptz>,
        is_active -> Bool,
        /// Optimistic concurrency counter, starting at 1.
        revision -> Int4,
    }
}

diesel::table! {
    /// Status change messages addressed to a user or a manager.
    notifications (id) {
        id -> Int8,
        recipient_id -> Int8,
        /// `USER` or `MANAGER`.
        recipient_role -> Varchar,
        consultation_id -> Int8,
        status_code -> Int4,
        message -> Text,
        created_at -> Timestamptz,
        is_read -> Bool,
    }
}

diesel::joinable!(brands -> brand_categories (category_id));
diesel::joinable!(brands -> brand_managers (manager_id));
diesel::joinable!(consultations -> brands (brand_id));
diesel::joinable!(consultations -> consultation_status (status_code));
diesel::joinable!(consultations -> users (user_id));
diesel::joinable!(notifications -> consultations (consultation_id));

diesel::allow_tables_to_appear_in_same_query!(
    brand_categories,
    brand_managers,
    brands,
    consultation_status,
    consultations,
    notifications,
    users,
);
