//! Access policy — the single decision point for view/download/admin
//! permissions.
//!
//! All functions are pure predicates over the caller identity, role name,
//! and document fields. Side effects (audit, counters) belong to the
//! services that consult this module.

use uuid::Uuid;

use docsense_core::error::AppError;
use docsense_entity::document::Document;
use docsense_entity::role::SUPERUSER;

/// Whether the caller may view (read metadata and inline content of) a
/// document: public documents, superusers, and owners.
pub fn can_view(doc: &Document, user_id: Uuid, role: &str) -> bool {
    doc.is_public || role == SUPERUSER || doc.uploaded_by == user_id
}

/// Whether the caller may delete a document. Public visibility grants
/// nothing here: only owners and superusers qualify.
pub fn can_delete_document(doc: &Document, user_id: Uuid, role: &str) -> bool {
    role == SUPERUSER || doc.uploaded_by == user_id
}

/// Whether the caller's role may decide download requests and manage
/// users and roles.
pub fn can_manage_requests(role: &str) -> bool {
    role == SUPERUSER
}

/// Guard helper: error unless the role is administrative.
pub fn require_admin(role: &str) -> Result<(), AppError> {
    if can_manage_requests(role) {
        Ok(())
    } else {
        Err(AppError::forbidden("Insufficient permissions. Access denied."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use docsense_entity::document::DocumentStatus;
    use sqlx::types::Json;

    fn doc(owner: Uuid, is_public: bool, allow_download: bool) -> Document {
        Document {
            id: Uuid::new_v4(),
            title: "report".into(),
            original_name: "report.pdf".into(),
            filename: "key-report.pdf".into(),
            file_type: "pdf".into(),
            mime_type: "application/pdf".into(),
            file_size: 10,
            content: String::new(),
            uploaded_by: owner,
            status: DocumentStatus::Processed,
            is_public,
            allow_download,
            download_count: 0,
            last_accessed: None,
            tags: Json(vec![]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn public_documents_are_viewable_by_anyone() {
        let stranger = Uuid::new_v4();
        assert!(can_view(&doc(Uuid::new_v4(), true, false), stranger, "user"));
    }

    #[test]
    fn private_documents_restricted_to_owner_and_admin() {
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let d = doc(owner, false, false);
        assert!(can_view(&d, owner, "user"));
        assert!(can_view(&d, stranger, SUPERUSER));
        assert!(!can_view(&d, stranger, "user"));
    }

    #[test]
    fn public_visibility_does_not_grant_delete() {
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let d = doc(owner, true, false);
        assert!(!can_delete_document(&d, stranger, "user"));
        assert!(can_delete_document(&d, owner, "user"));
        assert!(can_delete_document(&d, stranger, SUPERUSER));
    }

    #[test]
    fn only_superuser_manages_requests() {
        assert!(can_manage_requests(SUPERUSER));
        assert!(!can_manage_requests("user"));
        assert!(!can_manage_requests("moderator"));
        assert!(require_admin("user").is_err());
    }
}
