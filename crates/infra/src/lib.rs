//! Infrastructure layer: persistence adapters and outbound email.

pub mod notify;
pub mod store;

pub use notify::{LogNotifier, Notifier, NotifyError, OutgoingEmail, SmtpNotifier, SmtpSettings};
pub use store::{
    BlogStore, CaseStudyStore, ContactStore, InMemoryStore, PostgresStore, SettingsStore, StoreError,
    StoreResult, UserStore,
};
