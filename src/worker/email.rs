//! Invitation email rendering

use crate::mail::Email;
use crate::models::NotificationTask;

/// Renders the collaboration-invitation email for a task.
///
/// Subject and body are built entirely from the task snapshot; rendering
/// never consults the directory or the note store, so a redelivered task
/// renders identically on any worker instance.
pub fn render_invitation(task: &NotificationTask, from: &str, app_url: &str) -> Email {
    let inviter_name = format!("{} {}", task.inviter.first_name, task.inviter.last_name);
    let subject = format!("{} shared a note with you", inviter_name);
    let note_url = format!("{}/notes/{}", app_url.trim_end_matches('/'), task.note_id);

    let html_body = format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
  <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
    <div style="background-color: #4CAF50; color: white; padding: 20px; text-align: center;">
      <h1>Notekeep Collaboration</h1>
    </div>
    <div style="padding: 20px; background-color: #f9f9f9;">
      <p>Hello,</p>
      <p><strong>{inviter_name}</strong> ({inviter_email}) has shared a note with you on Notekeep.</p>
      <div style="font-size: 18px; font-weight: bold; color: #4CAF50; margin: 10px 0;">"{note_title}"</div>
      <p>You can now view and collaborate on this note.</p>
      <a href="{note_url}" style="display: inline-block; padding: 10px 20px; background-color: #4CAF50; color: white; text-decoration: none; border-radius: 5px;">View Note</a>
    </div>
    <div style="text-align: center; padding: 20px; color: #666; font-size: 12px;">
      <p>This is an automated email from Notekeep. Please do not reply.</p>
    </div>
  </div>
</body>
</html>"#,
        inviter_name = inviter_name,
        inviter_email = task.inviter.email,
        note_title = task.note_title,
        note_url = note_url,
    );

    Email {
        to: task.target_email.clone(),
        from: from.to_string(),
        subject,
        html_body,
    }
}
