pub mod controller;
pub mod notifier;
pub mod scheduler;

pub use controller::{ChartKind, ConnectionState, DashboardController, DashboardState, RefreshOutcome};
pub use notifier::{LogNotifier, Notification, NotificationLevel, Notifier};
pub use scheduler::{CycleRunner, RefreshScheduler, SchedulerState, Visibility};
