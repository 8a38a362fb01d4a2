use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// User-facing message raised by the controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn success(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn info(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            title: title.into(),
            body: body.into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Routes notifications into the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => log::error!("{}: {}", notification.title, notification.body),
            NotificationLevel::Success | NotificationLevel::Info => {
                log::info!("{}: {}", notification.title, notification.body)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub(crate) struct RecordingNotifier {
        pub(crate) seen: Mutex<Vec<Notification>>,
    }

    impl RecordingNotifier {
        pub(crate) fn count(&self, level: NotificationLevel) -> usize {
            self.seen.lock().unwrap().iter().filter(|n| n.level == level).count()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: Notification) {
            self.seen.lock().unwrap().push(notification);
        }
    }

    #[test]
    fn test_recording() {
        let notifier = RecordingNotifier::default();
        notifier.notify(Notification::error("Refresh failed", "boom"));
        notifier.notify(Notification::success("Settings saved", "ok"));
        LogNotifier.notify(Notification::info("Dashboard", "started"));

        assert_eq!(notifier.count(NotificationLevel::Error), 1);
        assert_eq!(notifier.count(NotificationLevel::Success), 1);
    }
}
