//! Form state and the two independent busy lanes, generate and send.
//!
//! The controller runs on a single thread. Each lane is `idle → busy → idle`
//! and its busy flag is the only synchronization: an action whose lane (or the
//! other lane) is busy returns [`LaneOutcome::Busy`] without doing anything.
//! `RefCell` borrows are never held across an `.await`.

use std::cell::RefCell;

use cloudmail::recipients::parse_recipients;

use crate::api::ComposeApi;
use crate::notifications::{NotificationKind, NotificationQueue};

/// Everything the user can see and edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub recipients: String,
    pub prompt: String,
    pub draft: String,
    pub generating: bool,
    pub sending: bool,
    /// Shown on the first successful generation, hidden again only by a successful send.
    pub editor_visible: bool,
}

impl FormState {
    fn busy(&self) -> bool {
        self.generating || self.sending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneOutcome {
    /// A lane was already busy; nothing happened.
    Busy,
    /// A pre-flight check failed; an error notification was pushed and no call was made.
    Rejected,
    Succeeded,
    Failed,
}

#[derive(Clone, Copy)]
enum Lane {
    Generate,
    Send,
}

/// Returns its lane to idle when dropped, even if the call future is dropped early.
struct BusyGuard<'a> {
    form: &'a RefCell<FormState>,
    lane: Lane,
}

impl<'a> BusyGuard<'a> {
    /// Caller must already hold no borrow of `form`.
    fn enter(form: &'a RefCell<FormState>, lane: Lane) -> Self {
        let mut state = form.borrow_mut();
        match lane {
            Lane::Generate => state.generating = true,
            Lane::Send => state.sending = true,
        }
        BusyGuard { form, lane }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.form.borrow_mut();
        match self.lane {
            Lane::Generate => state.generating = false,
            Lane::Send => state.sending = false,
        }
    }
}

pub struct Controller<A> {
    api: A,
    form: RefCell<FormState>,
    notifications: NotificationQueue,
}

impl<A: ComposeApi> Controller<A> {
    pub fn new(api: A, notifications: NotificationQueue) -> Self {
        Controller {
            api,
            form: RefCell::new(FormState::default()),
            notifications,
        }
    }

    pub fn state(&self) -> FormState {
        self.form.borrow().clone()
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub fn can_generate(&self) -> bool {
        !self.form.borrow().busy()
    }

    pub fn can_send(&self) -> bool {
        let form = self.form.borrow();
        !form.busy() && !form.recipients.trim().is_empty() && !form.draft.trim().is_empty()
    }

    /// The prompt is locked while either lane is busy.
    pub fn prompt_editable(&self) -> bool {
        !self.form.borrow().busy()
    }

    /// Recipients and draft are locked while sending.
    pub fn fields_editable(&self) -> bool {
        !self.form.borrow().sending
    }

    /// Returns false (and changes nothing) while the field is locked.
    pub fn set_prompt(&self, text: impl Into<String>) -> bool {
        if !self.prompt_editable() {
            return false;
        }
        self.form.borrow_mut().prompt = text.into();
        true
    }

    pub fn set_recipients(&self, text: impl Into<String>) -> bool {
        if !self.fields_editable() {
            return false;
        }
        self.form.borrow_mut().recipients = text.into();
        true
    }

    pub fn set_draft(&self, text: impl Into<String>) -> bool {
        if !self.fields_editable() {
            return false;
        }
        self.form.borrow_mut().draft = text.into();
        true
    }

    pub async fn generate(&self) -> LaneOutcome {
        let prompt = {
            let form = self.form.borrow();
            if form.busy() {
                return LaneOutcome::Busy;
            }
            form.prompt.clone()
        };

        if prompt.trim().is_empty() {
            self.error("Please enter a prompt for email generation");
            return LaneOutcome::Rejected;
        }

        let guard = BusyGuard::enter(&self.form, Lane::Generate);
        let result = self.api.generate(&prompt).await;
        drop(guard);

        match result {
            Ok(draft) => {
                {
                    let mut form = self.form.borrow_mut();
                    form.draft = draft;
                    form.editor_visible = true;
                }
                self.notifications
                    .push("Email generated successfully!", NotificationKind::Success);
                LaneOutcome::Succeeded
            }
            Err(e) => {
                log::warn!("generation failed: {e}");
                self.error(format!("Failed to generate email: {e}"));
                LaneOutcome::Failed
            }
        }
    }

    pub async fn send(&self) -> LaneOutcome {
        let (recipients, body) = {
            let form = self.form.borrow();
            if form.busy() {
                return LaneOutcome::Busy;
            }
            (form.recipients.clone(), form.draft.clone())
        };

        if recipients.trim().is_empty() {
            self.error("Please enter at least one recipient email address");
            return LaneOutcome::Rejected;
        }
        if body.trim().is_empty() {
            self.error("Please generate or enter email content");
            return LaneOutcome::Rejected;
        }
        let count = match parse_recipients(&recipients) {
            Ok(list) => list.len(),
            Err(e) => {
                self.error(e.to_string());
                return LaneOutcome::Rejected;
            }
        };

        let guard = BusyGuard::enter(&self.form, Lane::Send);
        let result = self.api.send(&recipients, &body).await;
        drop(guard);

        match result {
            Ok(()) => {
                *self.form.borrow_mut() = FormState::default();
                self.notifications.push(
                    format!("Email sent successfully to {count} recipient(s)!"),
                    NotificationKind::Success,
                );
                LaneOutcome::Succeeded
            }
            Err(e) => {
                log::warn!("send failed: {e}");
                self.error(format!("Failed to send email: {e}"));
                LaneOutcome::Failed
            }
        }
    }

    fn error(&self, message: impl Into<String>) {
        self.notifications.push(message, NotificationKind::Error);
    }
}
