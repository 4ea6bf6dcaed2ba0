use std::collections::HashMap;

use hangout_core::model::UserId;

use super::{DisplayIdentity, Notifier, NotifyFuture};

/// Notifier used when no chat platform is configured: announcements go to the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn post_message<'a>(&'a self, channel_id: &'a str, text: &'a str) -> NotifyFuture<'a, ()> {
        Box::pin(async move {
            tracing::info!(channel_id, text, "Announcement");
            Ok(())
        })
    }

    fn lookup_display_names<'a>(
        &'a self,
        _group_id: &'a str,
        _user_ids: &'a [UserId],
    ) -> NotifyFuture<'a, HashMap<UserId, DisplayIdentity>> {
        Box::pin(async { Ok(HashMap::new()) })
    }
}
