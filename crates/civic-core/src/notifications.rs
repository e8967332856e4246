//! Notification feed derived from complaint and discussion snapshots.
//!
//! Notifications are never stored. Their ids are built from the source event
//! (entity kind and id, event kind, comment index), so deriving twice over the same
//! snapshots yields the same ids and read receipts can be merged back in.

use civic_types::events::{Notification, NotificationKind};
use civic_types::models::{Complaint, ComplaintStatus, Discussion, Likeable, User};

use crate::receipts::ReadReceipts;

/// Every notification addressed to `user`, newest event first, all unread.
pub fn notifications_for(user: &User, complaints: &[Complaint], discussions: &[Discussion]) -> Vec<Notification> {
    let mut feed = Vec::new();

    for complaint in complaints.iter().filter(|c| c.author_id == user.id) {
        let link = format!("/complaints/{}", complaint.id);

        if complaint.status != ComplaintStatus::Pending {
            feed.push(Notification {
                id: format!("notif-complaint-{}-status", complaint.id),
                kind: NotificationKind::ComplaintStatus,
                title: "Complaint Status Updated".into(),
                description: format!(
                    "Your complaint \"{}\" has been updated to {}",
                    complaint.title, complaint.status
                ),
                created_at: complaint.updated_at,
                read: false,
                target_link: link.clone(),
            });
        }

        for (index, comment) in complaint.comments.iter().enumerate() {
            if comment.author_id == user.id {
                continue;
            }
            feed.push(Notification {
                id: format!("notif-complaint-{}-comment-{}", complaint.id, index),
                kind: NotificationKind::ComplaintComment,
                title: "New Comment on Your Complaint".into(),
                description: format!(
                    "{} commented on your complaint \"{}\"",
                    comment.author_name, complaint.title
                ),
                created_at: comment.created_at,
                read: false,
                target_link: link.clone(),
            });
        }
    }

    for discussion in discussions.iter().filter(|d| d.author_id == user.id) {
        let link = format!("/discussions/{}", discussion.id);

        for (index, comment) in discussion.comments.iter().enumerate() {
            if comment.author_id == user.id {
                continue;
            }
            feed.push(Notification {
                id: format!("notif-discussion-{}-comment-{}", discussion.id, index),
                kind: NotificationKind::DiscussionComment,
                title: "New Comment on Your Discussion".into(),
                description: format!(
                    "{} commented on your discussion \"{}\"",
                    comment.author_name, discussion.title
                ),
                created_at: comment.created_at,
                read: false,
                target_link: link.clone(),
            });
        }

        let likes = discussion.like_count();
        if likes > 0 {
            feed.push(Notification {
                id: format!("notif-discussion-{}-likes", discussion.id),
                kind: NotificationKind::DiscussionLike,
                title: "Your Discussion is Getting Attention".into(),
                description: format!(
                    "Your discussion \"{}\" has received {} {}",
                    discussion.title,
                    likes,
                    if likes == 1 { "like" } else { "likes" }
                ),
                created_at: discussion.updated_at,
                read: false,
                target_link: link,
            });
        }
    }

    // id breaks timestamp ties so the order is fully determined by the input
    feed.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
    feed
}

/// Mark the notifications `receipts` has recorded for `user` as read.
pub fn apply_receipts(user: &User, feed: &mut [Notification], receipts: &ReadReceipts) {
    for notification in feed.iter_mut() {
        notification.read = receipts.is_read(&user.id, &notification.id);
    }
}

pub fn unread_count(feed: &[Notification]) -> usize {
    feed.iter().filter(|n| !n.read).count()
}
