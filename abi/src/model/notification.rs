use crate::model::User;

/// Delivery switches for a single `notify` call.
#[derive(Debug, Clone)]
pub struct NotifyOptions {
    /// when false no sms is sent, whatever the device coverage
    pub allow_sms: bool,
    pub added_friend: bool,
    pub from_identity: Option<User>,
    pub related_event: Option<String>,
}

impl Default for NotifyOptions {
    fn default() -> Self {
        Self {
            allow_sms: true,
            added_friend: false,
            from_identity: None,
            related_event: None,
        }
    }
}

impl NotifyOptions {
    pub fn added_friend() -> Self {
        Self {
            added_friend: true,
            ..Default::default()
        }
    }

    pub fn invitation(event_id: impl Into<String>, from: User) -> Self {
        Self {
            from_identity: Some(from),
            related_event: Some(event_id.into()),
            ..Default::default()
        }
    }

    pub fn push_only() -> Self {
        Self {
            allow_sms: false,
            ..Default::default()
        }
    }
}

/// Computed per request, handed to the notifier and dropped.
#[derive(Debug, Clone)]
pub struct NotificationIntent {
    pub recipients: Vec<String>,
    pub message: String,
    pub options: NotifyOptions,
}

impl NotificationIntent {
    pub fn new(recipients: Vec<String>, message: impl Into<String>, options: NotifyOptions) -> Self {
        Self {
            recipients,
            message: message.into(),
            options,
        }
    }
}
