//! Database layer (Firestore).

pub mod firestore;

pub use firestore::{user_doc_id, FirestoreDb, GeneratedFields};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
}
