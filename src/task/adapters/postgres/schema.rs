//! Diesel schema for task persistence.

diesel::table! {
    /// Task records.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Trimmed task name.
        #[max_length = 1000]
        name -> Varchar,
        /// Trimmed task text.
        #[max_length = 1000]
        text -> Varchar,
        /// Task status.
        #[max_length = 20]
        status -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
        /// Soft-delete marker, reserved.
        deleted_at -> Nullable<Timestamptz>,
    }
}
