use std::sync::Arc;

use chrono::Utc;

use bridgecms_auth::Action;
use bridgecms_content::{Contact, ContactFilter, ContactInput, ContactStatus, EmailContent};
use bridgecms_core::{ContactId, DomainError, Page, PageRequest};
use bridgecms_infra::{ContactStore, Notifier, OutgoingEmail};

use super::{ServiceResult, require};
use crate::context::PrincipalContext;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

pub struct ContactService {
    store: Arc<dyn ContactStore>,
    notifier: Arc<dyn Notifier>,
    admin_email: String,
}

impl ContactService {
    pub fn new(store: Arc<dyn ContactStore>, notifier: Arc<dyn Notifier>, admin_email: String) -> Self {
        Self {
            store,
            notifier,
            admin_email,
        }
    }

    /// Store a form submission, then email the site owner and the submitter.
    ///
    /// Email failures are logged and never fail the submission.
    pub async fn submit(&self, input: ContactInput) -> ServiceResult<ContactId> {
        let contact = Contact::submit(input, Utc::now())?;
        self.store.insert_contact(contact.clone()).await?;
        tracing::info!(contact_id = %contact.id, "contact form submitted");

        let alert = self.envelope(self.admin_email.clone(), contact.admin_alert());
        let ack = self.envelope(contact.email.clone(), contact.acknowledgement());
        let (alert_result, ack_result) = tokio::join!(self.notifier.send(alert), self.notifier.send(ack));

        if let Err(error) = alert_result {
            tracing::warn!(contact_id = %contact.id, %error, "failed to send admin alert");
        }
        if let Err(error) = ack_result {
            tracing::warn!(contact_id = %contact.id, %error, "failed to send acknowledgement");
        }

        Ok(contact.id)
    }

    /// Newest submissions first, optionally narrowed to one status.
    pub async fn list(
        &self,
        principal: &PrincipalContext,
        status: Option<&str>,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> ServiceResult<Page<Contact>> {
        require(principal, Action::ListContacts)?;
        let status = status
            .map(|s| ContactStatus::parse_field("status", Some(s)))
            .transpose()?;
        let request = PageRequest::new(page, limit, DEFAULT_PAGE_SIZE)?;
        Ok(self.store.list_contacts(ContactFilter { status }, request).await?)
    }

    /// Move a submission to any status.
    pub async fn update_status(
        &self,
        principal: &PrincipalContext,
        id: &str,
        status: Option<&str>,
    ) -> ServiceResult<Contact> {
        require(principal, Action::UpdateContactStatus)?;
        let id: ContactId = id.parse()?;
        let status = ContactStatus::parse_field("status", status)?;

        let mut contact = self
            .store
            .find_contact(id)
            .await?
            .ok_or(DomainError::not_found("contact"))?;
        let previous = contact.status;
        contact.status = status;

        if !self.store.update_contact(contact.clone()).await? {
            return Err(DomainError::not_found("contact").into());
        }
        tracing::info!(contact_id = %id, from = %previous, to = %status, "contact status changed");
        Ok(contact)
    }

    fn envelope(&self, to: String, content: EmailContent) -> OutgoingEmail {
        OutgoingEmail {
            to,
            subject: content.subject,
            html: content.html,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bridgecms_auth::Role;
    use bridgecms_infra::{InMemoryStore, NotifyError};

    use super::*;
    use crate::app::services::ServiceError;
    use crate::app::services::testing::principal;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<OutgoingEmail>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, email: OutgoingEmail) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(email);
            if self.fail {
                Err(NotifyError::Transport("connection refused".into()))
            } else {
                Ok(())
            }
        }
    }

    fn form() -> ContactInput {
        ContactInput {
            name: Some("Ada".into()),
            email: Some("ada@example.com".into()),
            message: Some("Hello".into()),
            ..Default::default()
        }
    }

    fn service(fail: bool) -> (ContactService, Arc<RecordingNotifier>, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let notifier = Arc::new(RecordingNotifier { fail, ..Default::default() });
        let svc = ContactService::new(store.clone(), notifier.clone(), "owner@bridgeaitech.com".into());
        (svc, notifier, store)
    }

    #[tokio::test]
    async fn submit_sends_both_emails() {
        let (svc, notifier, _) = service(false);
        svc.submit(form()).await.unwrap();

        let sent = notifier.sent.lock().unwrap();
        let mut recipients: Vec<&str> = sent.iter().map(|e| e.to.as_str()).collect();
        recipients.sort();
        assert_eq!(recipients, vec!["ada@example.com", "owner@bridgeaitech.com"]);
    }

    #[tokio::test]
    async fn email_failure_does_not_fail_submission() {
        let (svc, _, store) = service(true);
        let id = svc.submit(form()).await.unwrap();
        assert!(store.find_contact(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn invalid_submission_persists_nothing() {
        let (svc, notifier, store) = service(false);
        let err = svc.submit(ContactInput { message: None, ..form() }).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));

        let page = PageRequest::new(None, None, DEFAULT_PAGE_SIZE).unwrap();
        assert_eq!(store.list_contacts(ContactFilter::default(), page).await.unwrap().total, 0);
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn status_update_rules() {
        let (svc, _, _) = service(false);
        let id = svc.submit(form()).await.unwrap().to_string();
        let editor = principal(Role::Editor);

        let updated = svc.update_status(&editor, &id, Some("qualified")).await.unwrap();
        assert_eq!(updated.status, ContactStatus::Qualified);

        let back = svc.update_status(&editor, &id, Some("new")).await.unwrap();
        assert_eq!(back.status, ContactStatus::New);

        let err = svc.update_status(&editor, &id, Some("archived")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));

        let err = svc.update_status(&principal(Role::Viewer), &id, Some("closed")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let missing = ContactId::new().to_string();
        let err = svc.update_status(&editor, &missing, Some("closed")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_defaults_to_twenty_per_page() {
        let (svc, _, _) = service(false);
        for _ in 0..25 {
            svc.submit(form()).await.unwrap();
        }
        let page = svc.list(&principal(Role::Admin), None, None, None).await.unwrap();
        assert_eq!(page.items.len(), 20);
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 2);
    }
}
